//! Address to coordinate resolution.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::models::Location;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("no location matches the address")]
    NotFound,

    #[error("{0}")]
    Upstream(String),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        GeocodeError::Upstream(err.to_string())
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, address: &str) -> Result<Location, GeocodeError>;
}

#[derive(Debug, Clone)]
pub struct MapboxConfig {
    pub base_url: String,
    pub access_token: String,
}

/// Mapbox forward geocoding
#[derive(Debug, Clone)]
pub struct MapboxGeocoder {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    /// `[lng, lat]`
    center: [f64; 2],
}

impl MapboxGeocoder {
    pub fn new(config: MapboxConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url,
            access_token: config.access_token,
        })
    }

    fn lookup_url(&self, address: &str) -> Result<Url, GeocodeError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| GeocodeError::Upstream(format!("invalid geocoder base url: {}", e)))?;

        let query = format!("{}.json", address);
        url.path_segments_mut()
            .map_err(|_| GeocodeError::Upstream("geocoder base url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["geocoding", "v5", "mapbox.places", query.as_str()]);

        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token);

        Ok(url)
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    async fn resolve(&self, address: &str) -> Result<Location, GeocodeError> {
        let url = self.lookup_url(address)?;
        tracing::debug!(address = %address, "Resolving address");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Geocoding request rejected");
            return Err(GeocodeError::Upstream(format!(
                "geocoding request failed with status {}",
                status
            )));
        }

        let collection: FeatureCollection = response.json().await?;
        let [lng, lat] = collection
            .features
            .first()
            .map(|f| f.center)
            .ok_or(GeocodeError::NotFound)?;

        Ok(Location { lat, lng })
    }
}
