//! The metric catalog.
//!
//! A fixed, ordered table of every metric the overlay can display. The table
//! order is the canonical display order; a metric's `id` is its index into
//! the table and doubles as its bit position in [`crate::SelectionSet`].

/// The closed set of metrics the overlay knows how to display.
///
/// Dispatch is by variant, keeping the registry itself data-only: the
/// provider decides how (and whether) each kind can be read on the current
/// hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    GpuUsage,
    GpuTemperature,
    GpuHotspotTemperature,
    GpuPower,
    GpuVoltage,
    GpuClockSpeed,
    GpuFanSpeed,
    GpuVram,
    GpuVramClockSpeed,
    CpuUsage,
    SystemRam,
}

/// One row of the metric catalog.
#[derive(Debug, Clone, Copy)]
pub struct MetricDescriptor {
    /// Stable index into [`REGISTRY`], and the metric's selection bit.
    pub id: u8,
    pub kind: MetricKind,
    /// Display name, rendered as `"<label>: "` on the overlay's left edge.
    pub label: &'static str,
    /// Display suffix appended to the rounded reading. Units that need a
    /// separator carry a leading space; `"%"` and `"°C"` attach directly.
    pub unit: &'static str,
}

/// Every available metric, in display order.
pub const REGISTRY: [MetricDescriptor; 11] = [
    MetricDescriptor { id: 0, kind: MetricKind::GpuUsage, label: "GPU Usage", unit: "%" },
    MetricDescriptor { id: 1, kind: MetricKind::GpuTemperature, label: "GPU Temperature", unit: "°C" },
    MetricDescriptor {
        id: 2,
        kind: MetricKind::GpuHotspotTemperature,
        label: "GPU Hotspot Temperature",
        unit: "°C",
    },
    MetricDescriptor { id: 3, kind: MetricKind::GpuPower, label: "GPU Power", unit: " W" },
    MetricDescriptor { id: 4, kind: MetricKind::GpuVoltage, label: "GPU Voltage", unit: " mV" },
    MetricDescriptor { id: 5, kind: MetricKind::GpuClockSpeed, label: "GPU Clock Speed", unit: " MHz" },
    MetricDescriptor { id: 6, kind: MetricKind::GpuFanSpeed, label: "GPU Fan Speed", unit: " RPM" },
    MetricDescriptor { id: 7, kind: MetricKind::GpuVram, label: "GPU VRAM", unit: " MB" },
    MetricDescriptor {
        id: 8,
        kind: MetricKind::GpuVramClockSpeed,
        label: "GPU VRAM Clock Speed",
        unit: " MHz",
    },
    MetricDescriptor { id: 9, kind: MetricKind::CpuUsage, label: "CPU Usage", unit: "%" },
    MetricDescriptor { id: 10, kind: MetricKind::SystemRam, label: "System RAM", unit: " MB" },
];

/// Number of metrics in the catalog.
pub const METRIC_COUNT: usize = REGISTRY.len();

/// Look up a descriptor by id. Returns `None` for ids outside the catalog.
pub fn descriptor(id: u8) -> Option<&'static MetricDescriptor> {
    REGISTRY.get(id as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_table_positions() {
        for (index, desc) in REGISTRY.iter().enumerate() {
            assert_eq!(desc.id as usize, index);
        }
    }

    #[test]
    fn catalog_order_is_display_order() {
        let labels: Vec<_> = REGISTRY.iter().map(|d| d.label).collect();
        assert_eq!(
            labels,
            [
                "GPU Usage",
                "GPU Temperature",
                "GPU Hotspot Temperature",
                "GPU Power",
                "GPU Voltage",
                "GPU Clock Speed",
                "GPU Fan Speed",
                "GPU VRAM",
                "GPU VRAM Clock Speed",
                "CPU Usage",
                "System RAM",
            ]
        );
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(descriptor(0).unwrap().label, "GPU Usage");
        assert_eq!(descriptor(10).unwrap().label, "System RAM");
        assert!(descriptor(11).is_none());
        assert!(descriptor(u8::MAX).is_none());
    }
}
