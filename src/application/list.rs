//! List machines created by apker

use crate::application::provision::DEFAULT_TAGS;
use crate::domain::ports::{CloudProvider, Droplet, ProviderError};

/// Droplets carrying the apker tag, newest first
pub fn list_machines<P: CloudProvider + ?Sized>(provider: &P) -> Result<Vec<Droplet>, ProviderError> {
    let mut droplets = provider.list_droplets(DEFAULT_TAGS[0])?;
    droplets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Ok(droplets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::provision::testing::FakeProvider;

    #[test]
    fn lists_by_apker_tag() {
        let provider = FakeProvider::new();
        let calls = provider.calls();

        assert!(list_machines(&provider).unwrap().is_empty());
        assert_eq!(*calls.lock().unwrap(), vec!["list_droplets apker".to_string()]);
    }
}
