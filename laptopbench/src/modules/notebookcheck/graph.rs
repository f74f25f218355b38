//! Builds the deduplicated device sets that drive the fetch schedule.

use crate::schemas::device::{DeviceRef, PuType};
use crate::schemas::laptop::Laptop;

/// Computes the two fetch queues for a set of laptops: `dedicated` holds
/// every unique CPU and discrete GPU, `integrated` holds one entry per
/// unique CPU whose integrated GPU is needed. Order follows first
/// appearance; every distinct key appears exactly once, so the scheduler
/// never issues a duplicate search for the same device.
pub fn device_graph(laptops: &[Laptop]) -> (Vec<DeviceRef>, Vec<DeviceRef>) {
    let mut dedicated: Vec<DeviceRef> = Vec::new();
    let mut integrated: Vec<DeviceRef> = Vec::new();

    for laptop in laptops {
        // cpus deduplicate by id alone: a cpu referenced by both an
        // integrated-gpu laptop and a discrete-gpu laptop must end up as a
        // single ref carrying the integration flag, or the scheduler could
        // race one ref against the other and lose the url discovery
        match dedicated
            .iter_mut()
            .find(|device| device.pu_type == PuType::Cpu && device.id == laptop.cpu)
        {
            Some(cpu) => cpu.has_integrated_gpu |= laptop.integrated,
            None => dedicated.push(DeviceRef {
                id: laptop.cpu.clone(),
                pu_type: PuType::Cpu,
                has_integrated_gpu: laptop.integrated,
                parent_cpu: None,
            }),
        }

        if laptop.integrated {
            // the true gpu id is unknown until the parent cpu's page is
            // fetched, so integrated refs deduplicate by parent cpu
            let already_queued = integrated
                .iter()
                .any(|device| device.parent_cpu.as_deref() == Some(laptop.cpu.as_str()));
            if !already_queued {
                integrated.push(DeviceRef {
                    id: laptop.gpu.clone().unwrap_or_default(),
                    pu_type: PuType::Gpu,
                    has_integrated_gpu: false,
                    parent_cpu: Some(laptop.cpu.clone()),
                });
            }
        } else if let Some(gpu_id) = &laptop.gpu {
            let gpu = DeviceRef {
                id: gpu_id.clone(),
                pu_type: PuType::Gpu,
                has_integrated_gpu: false,
                parent_cpu: None,
            };
            if !dedicated.contains(&gpu) {
                dedicated.push(gpu);
            }
        }
    }

    (dedicated, integrated)
}
