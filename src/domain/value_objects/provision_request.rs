//! What the provision worker should create

/// Provisioning request
///
/// Identifiers supplied by the user are trusted and never re-validated;
/// a bad id surfaces as a provider error while polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProvisionRequest {
    /// Create the image (if custom) and a new droplet
    #[default]
    CreateNew,
    /// Skip image creation, create a droplet from this image
    UseExistingImage(u64),
    /// Skip all creation, poll this droplet until active
    UseExistingDroplet(u64),
}

impl ProvisionRequest {
    /// Build from optional CLI ids; zero means "not given"
    ///
    /// A droplet id takes precedence over an image id.
    pub fn from_ids(image_id: Option<u64>, droplet_id: Option<u64>) -> Self {
        match (image_id.filter(|id| *id != 0), droplet_id.filter(|id| *id != 0)) {
            (_, Some(droplet)) => Self::UseExistingDroplet(droplet),
            (Some(image), None) => Self::UseExistingImage(image),
            (None, None) => Self::CreateNew,
        }
    }

    /// Interactive prompts (name, size, region) only make sense when
    /// something is going to be created from scratch.
    pub fn skips_prompts(&self) -> bool {
        !matches!(self, Self::CreateNew)
    }

    pub fn image_id(&self) -> Option<u64> {
        match self {
            Self::UseExistingImage(id) => Some(*id),
            _ => None,
        }
    }

    pub fn droplet_id(&self) -> Option<u64> {
        match self {
            Self::UseExistingDroplet(id) => Some(*id),
            _ => None,
        }
    }
}
