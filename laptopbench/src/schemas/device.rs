use std::collections::HashMap;

use serde::{Deserialize, Serialize};

const CPU_SEARCH_URL: &str =
    "https://www.notebookcheck.net/Mobile-Processors-Benchmark-List.2436.0.html";
const GPU_SEARCH_URL: &str =
    "https://www.notebookcheck.net/Mobile-Graphics-Cards-Benchmark-List.844.0.html";

/// The two kinds of processing unit the benchmark site knows about.
/// Each variant carries the constants that drive its search requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PuType {
    Cpu,
    Gpu,
}

impl PuType {
    pub fn search_url(self) -> &'static str {
        match self {
            Self::Cpu => CPU_SEARCH_URL,
            Self::Gpu => GPU_SEARCH_URL,
        }
    }

    /// Name of the search form field that makes the results include a link
    /// to the device's own page.
    pub fn fullname_field(self) -> &'static str {
        match self {
            Self::Cpu => "cpu_fullname",
            Self::Gpu => "gpu_fullname",
        }
    }
}

/// One device to resolve against the benchmark site.
///
/// Dedicated devices (CPUs, discrete GPUs) are looked up by searching for
/// their canonical `id`. An integrated GPU has no usable id of its own until
/// its parent CPU's page has been fetched, so integrated refs carry the
/// parent CPU id in `parent_cpu` and are deduplicated by it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceRef {
    pub id: String,
    pub pu_type: PuType,
    /// CPUs only: the laptop that contributed this ref relies on the CPU's
    /// integrated GPU, so the CPU page must also yield that GPU's URL.
    pub has_integrated_gpu: bool,
    pub parent_cpu: Option<String>,
}

/// The resolved identity and scores of one device. Immutable once cached;
/// every laptop referencing the same device key observes the same record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub name: String,
    pub benchmarks: HashMap<String, f64>,
}
