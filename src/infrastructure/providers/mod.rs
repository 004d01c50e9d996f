//! Cloud provider implementations

mod digitalocean;

pub use digitalocean::{DigitalOcean, DEFAULT_BASE_URL};
