use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A laptop as scraped from a retailer page, before any device identity
/// extraction. `cpu` and `gpu` hold the vendor's free-text descriptions;
/// a missing `gpu` means the laptop only has an integrated GPU.
///
/// Fields other than `cpu` are allowed to be missing here - records that
/// turn out to be unusable are dropped at join time, not while scraping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawLaptop {
    pub url: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub price: Option<f64>,
    pub ram: Option<u32>,
    pub weight: Option<f64>,
    pub cpu: String,
    pub gpu: Option<String>,
    pub image_urls: Vec<String>,
}

/// A [`RawLaptop`] whose `cpu`/`gpu` fields have been replaced with canonical
/// device ids usable as benchmark-site search keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Laptop {
    pub url: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub price: Option<f64>,
    pub ram: Option<u32>,
    pub weight: Option<f64>,
    /// Canonical CPU id.
    pub cpu: String,
    /// Canonical GPU id. `None` when the laptop carried no GPU description.
    pub gpu: Option<String>,
    /// Whether the laptop's GPU is integrated into its CPU.
    pub integrated: bool,
    pub image_urls: Vec<String>,
}

/// The finished output record: a laptop with both of its devices renamed to
/// their precise benchmark-site names and their score maps attached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JoinedLaptop {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub url: String,
    pub price: f64,
    pub cpu: String,
    pub gpu: String,
    pub cpu_bench: HashMap<String, f64>,
    pub gpu_bench: HashMap<String, f64>,
    pub image_urls: Vec<String>,
}
