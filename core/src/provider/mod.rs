//! Metrics-provider capability.
//!
//! A provider answers "what is metric X right now?" with an optional numeric
//! reading. Absence means the metric is unsupported on this hardware or the
//! query failed; either way the overlay renders `N/A` and retries naturally
//! on the next metric tick. Queries never raise.

mod gpu;
mod system;

pub use gpu::GpuSession;
pub use system::SystemSession;

use tracing::{info, warn};

use crate::metrics::MetricKind;

/// Capability to read a single metric.
pub trait MetricsProvider {
    /// Current reading for `kind`, or `None` when unsupported or failed.
    fn query(&mut self, kind: MetricKind) -> Option<f64>;
}

/// Any `FnMut(MetricKind) -> Option<f64>` is a provider; tests and demos pass
/// closures instead of standing up hardware sessions.
impl<F> MetricsProvider for F
where
    F: FnMut(MetricKind) -> Option<f64>,
{
    fn query(&mut self, kind: MetricKind) -> Option<f64> {
        self(kind)
    }
}

/// The real provider: an NVML session for the GPU metrics and a sysinfo
/// session for CPU/RAM.
pub struct HardwareProvider {
    gpu: Option<GpuSession>,
    system: SystemSession,
}

impl HardwareProvider {
    /// Set up sessions against the local hardware.
    ///
    /// A missing GPU (or driver) is not fatal: GPU readings degrade to
    /// absent and the overlay still runs for the system metrics.
    pub fn connect() -> Self {
        let gpu = match GpuSession::connect() {
            Ok(session) => {
                info!(gpu = session.device_name(), "GPU metrics session established");
                Some(session)
            }
            Err(err) => {
                warn!(%err, "GPU metrics unavailable; GPU readings will show N/A");
                None
            }
        };

        Self { gpu, system: SystemSession::new() }
    }
}

impl MetricsProvider for HardwareProvider {
    fn query(&mut self, kind: MetricKind) -> Option<f64> {
        match kind {
            MetricKind::CpuUsage | MetricKind::SystemRam => self.system.query(kind),
            _ => self.gpu.as_ref()?.query(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_providers() {
        let mut provider = |kind: MetricKind| match kind {
            MetricKind::CpuUsage => Some(12.5),
            _ => None,
        };

        assert_eq!(provider.query(MetricKind::CpuUsage), Some(12.5));
        assert_eq!(provider.query(MetricKind::GpuUsage), None);
    }
}
