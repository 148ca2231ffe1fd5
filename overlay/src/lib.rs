//! EasyMetrics Overlay Engine
//!
//! Renders user-selected hardware metrics as a borderless, click-through,
//! always-on-top window, re-queried once per second.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   controller                        │
//! │      OverlayController: start / terminate,          │
//! │        one dedicated thread per overlay             │
//! ├─────────────────────────────────────────────────────┤
//! │              runtime + scheduler                    │
//! │   presentation tick (~60 Hz) / metric tick (1 s)    │
//! ├─────────────────────────────────────────────────────┤
//! │                layout + renderer                    │
//! │     line geometry · tiny-skia + cosmic-text         │
//! ├─────────────────────────────────────────────────────┤
//! │                   platform/                         │
//! │     windows, x11 (topmost · layered · no taskbar)   │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod controller;
pub mod layout;
pub mod platform;
pub mod renderer;
pub mod runtime;
pub mod scheduler;
pub mod utils;
pub mod window;

// Re-export commonly used types
pub use controller::{OverlayController, OverlayState, StartError};
pub use layout::{LayoutEngine, format_reading};
pub use platform::{NativeOverlay, OverlayConfig, OverlayPlatform, PlatformError};
pub use renderer::Renderer;
pub use window::OverlayWindow;

// Re-export tiny_skia Color for external use
pub use tiny_skia::Color;
