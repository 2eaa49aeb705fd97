pub mod catalog;
pub mod normalize;
pub mod photos;
pub mod provider;

use serde::{Deserialize, Serialize};

/// Canonical record every endpoint consumes, whichever provider produced it.
/// String fields are empty when the source had nothing; numeric fields are
/// `None` (JSON `null`) when absent or unparseable, never NaN.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
    pub make: String,
    pub model: String,
    #[serde(default)]
    pub trim: String,
    pub mileage: Option<i64>,
    pub price: Option<f64>,
    #[serde(default)]
    pub transmission: String,
    #[serde(default)]
    pub fuel: String,
    #[serde(default)]
    pub exterior: String,
    #[serde(default)]
    pub interior: String,
    #[serde(default)]
    pub vin: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub description: String,
    pub photos: Vec<String>,
}
