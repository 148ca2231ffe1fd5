//! CPU and RAM metrics via sysinfo.

use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

use crate::metrics::MetricKind;

/// System-wide CPU/RAM readings.
///
/// CPU usage is computed from the delta between refreshes, so the very first
/// reading after connect reports 0; the 1 s metric cadence gives every later
/// reading a full sampling window.
pub struct SystemSession {
    sys: System,
}

impl SystemSession {
    pub fn new() -> Self {
        Self {
            sys: System::new_with_specifics(
                RefreshKind::nothing()
                    .with_cpu(CpuRefreshKind::everything())
                    .with_memory(MemoryRefreshKind::everything()),
            ),
        }
    }

    pub fn query(&mut self, kind: MetricKind) -> Option<f64> {
        match kind {
            MetricKind::CpuUsage => {
                self.sys.refresh_cpu_all();
                Some(f64::from(self.sys.global_cpu_usage()))
            }
            MetricKind::SystemRam => {
                self.sys.refresh_memory();
                Some(self.sys.used_memory() as f64 / (1024.0 * 1024.0))
            }
            _ => None,
        }
    }
}

impl Default for SystemSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_only_system_metrics() {
        let mut session = SystemSession::new();
        assert!(session.query(MetricKind::SystemRam).is_some());
        assert!(session.query(MetricKind::GpuUsage).is_none());
    }
}
