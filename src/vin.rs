use crate::config::VPIC_ROOT;
use crate::http::build_client;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use urlencoding::encode;

#[derive(Debug, Error)]
pub enum VinError {
    #[error("vin must be a non-empty alphanumeric string")]
    InvalidVin,
    #[error("vin lookup failed: {0}")]
    Upstream(String),
    #[error("vin lookup returned no result")]
    Empty,
}

/// Simplified field subset the detail pages actually render; everything else
/// vPIC returns is dropped at the proxy.
#[derive(Debug, Clone, Serialize)]
pub struct VinDecoded {
    pub vin: String,
    pub make: String,
    pub model: String,
    pub year: String,
    pub trim: String,
    pub body: String,
    pub fuel: String,
    pub transmission: String,
}

#[derive(Debug, Deserialize)]
struct VpicResponse {
    #[serde(rename = "Results", default)]
    results: Vec<VpicRow>,
}

// vPIC reports unknown fields as empty strings or nulls interchangeably.
#[derive(Debug, Clone, Deserialize)]
struct VpicRow {
    #[serde(rename = "Make", default)]
    make: Option<String>,
    #[serde(rename = "Model", default)]
    model: Option<String>,
    #[serde(rename = "ModelYear", default)]
    model_year: Option<String>,
    #[serde(rename = "Trim", default)]
    trim: Option<String>,
    #[serde(rename = "BodyClass", default)]
    body_class: Option<String>,
    #[serde(rename = "FuelTypePrimary", default)]
    fuel_type_primary: Option<String>,
    #[serde(rename = "TransmissionStyle", default)]
    transmission_style: Option<String>,
}

impl VpicRow {
    fn into_decoded(self, vin: &str) -> VinDecoded {
        let clean = |value: Option<String>| value.unwrap_or_default().trim().to_string();
        VinDecoded {
            vin: vin.to_string(),
            make: clean(self.make),
            model: clean(self.model),
            year: clean(self.model_year),
            trim: clean(self.trim),
            body: clean(self.body_class),
            fuel: clean(self.fuel_type_primary),
            transmission: clean(self.transmission_style),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VinClient {
    http: Client,
}

impl Default for VinClient {
    fn default() -> Self {
        Self::new()
    }
}

impl VinClient {
    pub fn new() -> Self {
        Self {
            http: build_client(),
        }
    }

    pub async fn decode(&self, vin: &str) -> Result<VinDecoded, VinError> {
        let vin = vin.trim();
        if vin.is_empty() || !vin.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(VinError::InvalidVin);
        }

        let url = format!(
            "{}/vehicles/DecodeVinValues/{}?format=json",
            *VPIC_ROOT,
            encode(vin)
        );
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| VinError::Upstream(err.to_string()))?;

        if !response.status().is_success() {
            return Err(VinError::Upstream(format!("HTTP {}", response.status())));
        }

        let mut payload: VpicResponse = response
            .json()
            .await
            .map_err(|err| VinError::Upstream(err.to_string()))?;

        if payload.results.is_empty() {
            return Err(VinError::Empty);
        }
        Ok(payload.results.remove(0).into_decoded(vin))
    }
}
