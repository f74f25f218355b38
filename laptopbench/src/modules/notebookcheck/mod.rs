//! Benchmark resolution against notebookcheck.net: a caching, dependency-aware
//! fetch scheduler over the two-tier laptop -> device -> benchmark-page graph.

pub mod device_id;
pub mod graph;
pub mod page;

use std::collections::{HashMap, HashSet};

use anyhow::Context;
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::schemas::device::{BenchmarkRecord, DeviceRef, PuType};
use crate::schemas::laptop::{JoinedLaptop, Laptop};

use graph::device_graph;
use page::{parse_device_page, parse_search_results, DevicePage};

/// Upper bound on concurrent requests against the benchmark site. Devices
/// are independent of each other, so a handful in flight is safe; more would
/// just hammer the site.
const MAX_IN_FLIGHT: usize = 4;

/// All shared resolution state, guarded by a single lock. A device key is
/// fetched at most once per run: the cache check and the in-flight marker
/// insertion happen under one lock acquisition, and a late duplicate
/// completion simply overwrites a cache entry with an equivalent value.
#[derive(Default)]
struct Caches {
    /// Benchmarks of dedicated devices, keyed by canonical device id.
    dedicated: HashMap<String, BenchmarkRecord>,
    /// Benchmarks of integrated GPUs, keyed by their page URL.
    integrated: HashMap<String, BenchmarkRecord>,
    /// Integrated-GPU page URL discovered on each flagged CPU's page.
    /// `None` means the site publishes no page for that CPU's GPU.
    integrated_urls: HashMap<String, Option<String>>,
    /// Keys (device ids or page URLs) with a fetch currently in flight.
    in_flight: HashSet<String>,
}

impl Caches {
    fn needs_dedicated_fetch(&self, device: &DeviceRef) -> bool {
        if !self.dedicated.contains_key(&device.id) {
            return true;
        }
        // a cached CPU may still owe us its integrated gpu's url
        device.has_integrated_gpu && !self.integrated_urls.contains_key(&device.id)
    }
}

/// The resolution orchestrator. Owns the HTTP client and the caches; a
/// single instance can resolve any number of laptop sets, reusing already
/// fetched devices across calls.
pub struct NotebookCheck {
    client: reqwest::Client,
    caches: Mutex<Caches>,
}

impl NotebookCheck {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().cookie_store(true).build()?,
            caches: Mutex::new(Caches::default()),
        })
    }

    /// Resolves every device the given laptops reference and joins the
    /// benchmark data back onto them. Laptops whose devices cannot be
    /// resolved, or which lack the fields needed for the final record, are
    /// dropped - a finished record is never emitted half-filled.
    pub async fn with_benchmarks(&self, laptops: Vec<Laptop>) -> Vec<JoinedLaptop> {
        let (dedicated, integrated) = device_graph(&laptops);

        // integrated gpu pages are only discoverable through their parent
        // cpus, so the dedicated queue drains fully first
        self.resolve_dedicated_set(dedicated).await;
        self.resolve_integrated_set(integrated).await;

        let caches = self.caches.lock().await;
        laptops
            .into_iter()
            .filter_map(|laptop| {
                let url = laptop.url.clone();
                let joined = join_laptop(&caches, laptop);
                if joined.is_none() {
                    debug!(
                        "dropping laptop {} (unresolved device or missing fields)",
                        url
                    );
                }
                joined
            })
            .collect()
    }

    /// Searches for a single device and fetches its benchmark record.
    /// `Ok(None)` means the search found nothing.
    pub async fn device_record(
        &self,
        pu_type: PuType,
        id: &str,
    ) -> anyhow::Result<Option<BenchmarkRecord>> {
        let device = DeviceRef {
            id: id.to_string(),
            pu_type,
            has_integrated_gpu: false,
            parent_cpu: None,
        };
        Ok(self.fetch_dedicated(&device).await?.map(|page| BenchmarkRecord {
            name: page.name,
            benchmarks: page.benchmarks,
        }))
    }

    async fn resolve_dedicated_set(&self, devices: Vec<DeviceRef>) {
        stream::iter(devices)
            .for_each_concurrent(MAX_IN_FLIGHT, |device| async move {
                if let Err(error) = self.resolve_dedicated(&device).await {
                    warn!("failed to resolve device {:?}: {:#}", device, error);
                }
            })
            .await;
    }

    async fn resolve_dedicated(&self, device: &DeviceRef) -> anyhow::Result<()> {
        {
            let mut caches = self.caches.lock().await;
            if !caches.needs_dedicated_fetch(device) {
                return Ok(());
            }
            if !caches.in_flight.insert(device.id.clone()) {
                // someone else is already fetching this key
                return Ok(());
            }
        }

        let result = self.fetch_dedicated(device).await;

        let mut caches = self.caches.lock().await;
        caches.in_flight.remove(&device.id);
        match result? {
            None => {
                // non-fatal: laptops depending on this device are dropped at
                // join time, nothing else is affected
                warn!("no search results for device {:?}", device);
            }
            Some(page) => {
                if device.pu_type == PuType::Cpu && device.has_integrated_gpu {
                    caches
                        .integrated_urls
                        .insert(device.id.clone(), page.integrated_gpu_url.clone());
                }
                caches.dedicated.insert(
                    device.id.clone(),
                    BenchmarkRecord {
                        name: page.name,
                        benchmarks: page.benchmarks,
                    },
                );
            }
        }
        Ok(())
    }

    async fn fetch_dedicated(&self, device: &DeviceRef) -> anyhow::Result<Option<DevicePage>> {
        let page_url = match self.search_device(device).await? {
            Some(url) => url,
            None => return Ok(None),
        };
        let html = self
            .client
            .get(&page_url)
            .send()
            .await?
            .text()
            .await?;
        Ok(Some(parse_device_page(&html)?))
    }

    async fn search_device(&self, device: &DeviceRef) -> anyhow::Result<Option<String>> {
        let form = [
            ("search", device.id.as_str()),
            // '0' asks the site to require *all* words of the search string,
            // so the canonical id matches exactly one device
            ("or", "0"),
            // make the results link to the device's own page
            (device.pu_type.fullname_field(), "1"),
        ];
        let response = self
            .client
            .post(device.pu_type.search_url())
            .form(&form)
            .send()
            .await?;
        let html = response.text().await?;
        Ok(parse_search_results(&html))
    }

    async fn resolve_integrated_set(&self, devices: Vec<DeviceRef>) {
        stream::iter(devices)
            .for_each_concurrent(MAX_IN_FLIGHT, |device| async move {
                if let Err(error) = self.resolve_integrated(&device).await {
                    warn!("failed to resolve integrated gpu {:?}: {:#}", device, error);
                }
            })
            .await;
    }

    async fn resolve_integrated(&self, device: &DeviceRef) -> anyhow::Result<()> {
        let parent_cpu = device
            .parent_cpu
            .as_deref()
            .context("integrated device ref without a parent cpu")?;

        let page_url = {
            let mut caches = self.caches.lock().await;
            let page_url = match caches.integrated_urls.get(parent_cpu) {
                Some(Some(url)) => url.clone(),
                // the parent cpu failed to resolve, or the site publishes no
                // page for its integrated gpu - skip without a fetch
                _ => return Ok(()),
            };
            if caches.integrated.contains_key(&page_url)
                || !caches.in_flight.insert(page_url.clone())
            {
                return Ok(());
            }
            page_url
        };

        let result = async {
            let html = self.client.get(&page_url).send().await?.text().await?;
            parse_device_page(&html)
        }
        .await;

        let mut caches = self.caches.lock().await;
        caches.in_flight.remove(&page_url);
        let page = result?;
        caches.integrated.insert(
            page_url,
            BenchmarkRecord {
                name: page.name,
                benchmarks: page.benchmarks,
            },
        );
        Ok(())
    }
}

/// Attaches both resolved benchmark records to a laptop, producing the final
/// output record. Returns `None` - dropping the laptop - when any dependency
/// is unresolved or a required field is missing.
fn join_laptop(caches: &Caches, laptop: Laptop) -> Option<JoinedLaptop> {
    let cpu = caches.dedicated.get(&laptop.cpu)?;
    let gpu = if laptop.integrated {
        let page_url = caches.integrated_urls.get(&laptop.cpu)?.as_ref()?;
        caches.integrated.get(page_url)?
    } else {
        caches.dedicated.get(laptop.gpu.as_deref()?)?
    };

    let brand = laptop.brand?;
    let model = laptop.model?;
    let price = laptop.price?;
    let ram = laptop.ram?;
    let weight = laptop.weight.filter(|w| *w > 0.0)?;

    let mut cpu_bench = cpu.benchmarks.clone();
    cpu_bench.insert("ram".to_string(), f64::from(ram));
    // inverted so that lighter laptops score higher, like every other
    // benchmark; the factor keeps the value out of precision-losing ranges
    cpu_bench.insert("weight".to_string(), 1000.0 / weight);

    let name = format!("{} {}", brand, model);
    Some(JoinedLaptop {
        name,
        brand,
        model,
        url: laptop.url,
        price,
        cpu: cpu.name.clone(),
        gpu: gpu.name.clone(),
        cpu_bench,
        gpu_bench: gpu.benchmarks.clone(),
        image_urls: laptop.image_urls,
    })
}
