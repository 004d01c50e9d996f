//! Where the droplet image comes from

use serde::Serialize;

/// Image source resolved from `image.from`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Build a custom image from a downloadable URL
    Custom { url: String, distribution: String },
    /// Use a provider distribution image by slug (e.g. `ubuntu-22-04-x64`)
    Distribution(String),
}

impl ImageSource {
    /// Classify `image.from`: URLs become custom images, anything else a slug
    pub fn parse(from: &str, distribution: Option<&str>) -> Option<Self> {
        let from = from.trim();
        if from.is_empty() {
            return None;
        }
        if from.starts_with("https://") || from.starts_with("http://") {
            Some(Self::Custom {
                url: from.to_string(),
                distribution: distribution.unwrap_or("Unknown").to_string(),
            })
        } else {
            Some(Self::Distribution(from.to_string()))
        }
    }
}

/// Image reference used when creating a droplet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ImageRef {
    Id(u64),
    Slug(String),
}
