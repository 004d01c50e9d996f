//! Domain value objects

mod image_source;
mod provision_request;

pub use image_source::{ImageRef, ImageSource};
pub use provision_request::ProvisionRequest;
