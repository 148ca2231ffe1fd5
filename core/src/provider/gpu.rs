//! NVIDIA GPU metrics via NVML.
//!
//! NVML is loaded dynamically, so this works against whatever driver is
//! installed; on machines without an NVIDIA GPU, [`GpuSession::connect`]
//! fails and the caller degrades to absent readings.

use nvml_wrapper::Nvml;
use nvml_wrapper::enum_wrappers::device::{Clock, TemperatureSensor};

use crate::error::ProviderError;
use crate::metrics::MetricKind;

/// An open NVML session bound to one GPU.
pub struct GpuSession {
    nvml: Nvml,
    device_index: u32,
    name: String,
}

impl GpuSession {
    /// Initialize NVML and bind to the first GPU in the list.
    pub fn connect() -> Result<Self, ProviderError> {
        let nvml = Nvml::init()?;
        if nvml.device_count()? == 0 {
            return Err(ProviderError::NoGpu);
        }

        let name = {
            let device = nvml.device_by_index(0)?;
            device.name().unwrap_or_else(|_| "unknown GPU".into())
        };

        Ok(Self { nvml, device_index: 0, name })
    }

    pub fn device_name(&self) -> &str {
        &self.name
    }

    /// Read one GPU metric. Device handles are cheap to re-fetch, and doing
    /// so per query survives driver restarts mid-session.
    pub fn query(&self, kind: MetricKind) -> Option<f64> {
        let device = self.nvml.device_by_index(self.device_index).ok()?;

        match kind {
            // Usage is ceiled at the source; every other metric is left raw
            // and rounded at display time.
            MetricKind::GpuUsage => {
                device.utilization_rates().ok().map(|u| f64::from(u.gpu).ceil())
            }
            MetricKind::GpuTemperature => {
                device.temperature(TemperatureSensor::Gpu).ok().map(f64::from)
            }
            // NVML exposes only the primary thermal sensor.
            MetricKind::GpuHotspotTemperature => None,
            // Milliwatts from the driver.
            MetricKind::GpuPower => device.power_usage().ok().map(|mw| f64::from(mw) / 1000.0),
            // Core voltage is not part of the NVML surface.
            MetricKind::GpuVoltage => None,
            MetricKind::GpuClockSpeed => device.clock_info(Clock::Graphics).ok().map(f64::from),
            // NVML reports fan duty cycle (%), not RPM.
            MetricKind::GpuFanSpeed => None,
            MetricKind::GpuVram => {
                device.memory_info().ok().map(|m| m.used as f64 / (1024.0 * 1024.0))
            }
            MetricKind::GpuVramClockSpeed => device.clock_info(Clock::Memory).ok().map(f64::from),
            // System metrics are answered by the sysinfo session.
            MetricKind::CpuUsage | MetricKind::SystemRam => None,
        }
    }
}
