//! Core domain for the EasyMetrics overlay.
//!
//! This crate is renderer- and window-free: it defines the metric catalog,
//! the selection encoding exchanged with the host UI, the overlay style, and
//! the metrics-provider capability (with a hardware implementation on top of
//! NVML and sysinfo). The `easymetrics-overlay` crate builds the window,
//! layout, and refresh machinery on top of these types.

pub mod error;
pub mod metrics;
pub mod provider;
pub mod selection;
pub mod style;

pub use error::ProviderError;
pub use metrics::{METRIC_COUNT, MetricDescriptor, MetricKind, REGISTRY, descriptor};
pub use provider::{HardwareProvider, MetricsProvider};
pub use selection::SelectionSet;
pub use style::OverlayStyle;
