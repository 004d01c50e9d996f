//! DigitalOcean provider
//!
//! Implements the CloudProvider port over the v2 REST API with a blocking
//! reqwest client and a bearer token.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::domain::ports::{
    CloudProvider, Droplet, DropletSpec, Image, ImageSpec, NetworkAddress, ProviderError, Region,
    Size,
};

pub const DEFAULT_BASE_URL: &str = "https://api.digitalocean.com/v2";

/// Largest page the API hands out
const PER_PAGE: u32 = 200;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct DigitalOcean {
    client: Client,
    base_url: String,
    token: String,
}

impl DigitalOcean {
    pub fn new(token: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ProviderError::Unsupported(
                "DigitalOcean API key is missing (set provider.credentials.API_KEY or APKER_API_KEY)"
                    .to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("apker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ProviderError> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        debug!(status = status.as_u16(), bytes = body.len(), "digitalocean response");

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        self.send(self.client.get(self.url(path)))
    }
}

impl CloudProvider for DigitalOcean {
    fn create_image(&self, spec: &ImageSpec) -> Result<Image, ProviderError> {
        debug!(name = %spec.name, url = %spec.url, "creating custom image");
        let wrapper: ImageWrapper = self.send(self.client.post(self.url("/images")).json(spec))?;
        Ok(wrapper.image.into())
    }

    fn get_image(&self, id: u64) -> Result<Image, ProviderError> {
        let wrapper: ImageWrapper = self.get(&format!("/images/{}", id))?;
        Ok(wrapper.image.into())
    }

    fn create_droplet(&self, spec: &DropletSpec) -> Result<Droplet, ProviderError> {
        debug!(name = %spec.name, region = %spec.region, size = %spec.size, "creating droplet");
        let wrapper: DropletWrapper =
            self.send(self.client.post(self.url("/droplets")).json(spec))?;
        Ok(wrapper.droplet.into())
    }

    fn get_droplet(&self, id: u64) -> Result<Droplet, ProviderError> {
        let wrapper: DropletWrapper = self.get(&format!("/droplets/{}", id))?;
        Ok(wrapper.droplet.into())
    }

    fn list_droplets(&self, tag: &str) -> Result<Vec<Droplet>, ProviderError> {
        let request = self
            .client
            .get(self.url("/droplets"))
            .query(&[("tag_name", tag.to_string()), ("per_page", PER_PAGE.to_string())]);
        let list: DropletList = self.send(request)?;
        Ok(list.droplets.into_iter().map(Droplet::from).collect())
    }

    fn list_sizes(&self) -> Result<Vec<Size>, ProviderError> {
        let list: SizeList = self.get(&format!("/sizes?per_page={}", PER_PAGE))?;
        Ok(list.sizes.into_iter().map(Size::from).collect())
    }

    fn list_regions(&self) -> Result<Vec<Region>, ProviderError> {
        let list: RegionList = self.get(&format!("/regions?per_page={}", PER_PAGE))?;
        Ok(list.regions.into_iter().map(Region::from).collect())
    }
}

fn api_error(status: u16, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.trim().to_string());
    ProviderError::Api { status, message }
}

// Wire types

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ImageWrapper {
    image: WireImage,
}

#[derive(Debug, Deserialize)]
struct WireImage {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
}

impl From<WireImage> for Image {
    fn from(w: WireImage) -> Self {
        Image {
            id: w.id,
            name: w.name,
            status: w.status,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DropletWrapper {
    droplet: WireDroplet,
}

#[derive(Debug, Deserialize)]
struct DropletList {
    #[serde(default)]
    droplets: Vec<WireDroplet>,
}

#[derive(Debug, Deserialize)]
struct WireDroplet {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
    region: Option<WireRegion>,
    #[serde(default)]
    networks: WireNetworks,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
struct WireNetworks {
    #[serde(default)]
    v4: Vec<WireNetwork>,
}

#[derive(Debug, Deserialize)]
struct WireNetwork {
    ip_address: String,
    #[serde(rename = "type", default)]
    kind: String,
}

impl From<WireDroplet> for Droplet {
    fn from(w: WireDroplet) -> Self {
        Droplet {
            id: w.id,
            name: w.name,
            status: w.status,
            region: w.region.map(|r| r.slug).unwrap_or_default(),
            ipv4: w
                .networks
                .v4
                .into_iter()
                .map(|n| NetworkAddress {
                    ip_address: n.ip_address,
                    kind: n.kind,
                })
                .collect(),
            created_at: w.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SizeList {
    #[serde(default)]
    sizes: Vec<WireSize>,
}

#[derive(Debug, Deserialize)]
struct WireSize {
    slug: String,
    #[serde(default)]
    memory: u64,
    #[serde(default)]
    vcpus: u64,
    #[serde(default)]
    disk: u64,
    #[serde(default)]
    price_monthly: f64,
}

impl From<WireSize> for Size {
    fn from(w: WireSize) -> Self {
        Size {
            slug: w.slug,
            memory_mb: w.memory,
            vcpus: w.vcpus,
            disk_gb: w.disk,
            price_monthly: w.price_monthly,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RegionList {
    #[serde(default)]
    regions: Vec<WireRegion>,
}

#[derive(Debug, Deserialize)]
struct WireRegion {
    slug: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    available: bool,
}

impl From<WireRegion> for Region {
    fn from(w: WireRegion) -> Self {
        Region {
            slug: w.slug,
            name: w.name,
            available: w.available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_droplet_with_networks() {
        let body = r#"{
            "droplet": {
                "id": 3164494,
                "name": "apker-image-web",
                "status": "active",
                "region": {"slug": "nyc3", "name": "New York 3", "available": true},
                "networks": {"v4": [
                    {"ip_address": "10.128.0.2", "type": "private"},
                    {"ip_address": "104.236.32.182", "type": "public"}
                ]},
                "created_at": "2024-05-01T12:00:00Z"
            }
        }"#;

        let droplet: Droplet = serde_json::from_str::<DropletWrapper>(body)
            .unwrap()
            .droplet
            .into();

        assert_eq!(droplet.id, 3164494);
        assert!(droplet.is_active());
        assert_eq!(droplet.region, "nyc3");
        assert_eq!(droplet.first_ipv4(), Some("104.236.32.182"));
        assert!(droplet.created_at.is_some());
    }

    #[test]
    fn decodes_new_droplet_without_networks() {
        let body = r#"{"droplet": {"id": 1, "name": "x", "status": "new", "created_at": null}}"#;
        let droplet: Droplet = serde_json::from_str::<DropletWrapper>(body)
            .unwrap()
            .droplet
            .into();
        assert!(droplet.ipv4.is_empty());
        assert_eq!(droplet.first_ipv4(), None);
    }

    #[test]
    fn decodes_custom_image() {
        let body = r#"{"image": {"id": 38413969, "name": "ubuntu", "status": "NEW", "distribution": "Ubuntu"}}"#;
        let image: Image = serde_json::from_str::<ImageWrapper>(body).unwrap().image.into();
        assert_eq!(image.id, 38413969);
        assert!(!image.is_available());
    }

    #[test]
    fn decodes_sizes() {
        let body = r#"{"sizes": [{"slug": "s-1vcpu-1gb", "memory": 1024, "vcpus": 1, "disk": 25,
            "price_monthly": 6.0, "available": true}], "links": {}, "meta": {"total": 1}}"#;
        let list: SizeList = serde_json::from_str(body).unwrap();
        let size = Size::from(list.sizes.into_iter().next().unwrap());
        assert_eq!(size.slug, "s-1vcpu-1gb");
        assert_eq!(size.memory_mb, 1024);
    }

    #[test]
    fn api_error_uses_message_field() {
        let err = api_error(
            422,
            r#"{"id": "unprocessable_entity", "message": "You specified an invalid size."}"#,
        );
        assert_eq!(err.to_string(), "You specified an invalid size. (HTTP 422)");
    }

    #[test]
    fn api_error_falls_back_to_body() {
        let err = api_error(502, "Bad Gateway\n");
        assert_eq!(
            err,
            ProviderError::Api {
                status: 502,
                message: "Bad Gateway".to_string()
            }
        );
    }

    #[test]
    fn missing_token_is_rejected() {
        assert!(matches!(
            DigitalOcean::new("  "),
            Err(ProviderError::Unsupported(_))
        ));
    }
}
