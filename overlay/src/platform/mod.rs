//! Platform abstraction for the overlay window
//!
//! This module defines the trait every platform backend implements, so the
//! engine above it never touches OS windowing directly. All backends create
//! the same kind of window: borderless, layered/alpha-blended, always on
//! top, click-through, and hidden from the task switcher.

#[cfg(all(unix, not(target_os = "macos")))]
pub mod x11;

#[cfg(target_os = "windows")]
pub mod windows;

/// Information about a connected monitor
#[derive(Debug, Clone)]
pub struct MonitorInfo {
    /// Unique identifier for this monitor (platform-specific)
    pub id: String,
    /// Human-readable name/description
    pub name: String,
    /// X position of the monitor in virtual screen space
    pub x: i32,
    /// Y position of the monitor in virtual screen space
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Whether this is the primary monitor
    pub is_primary: bool,
}

/// Configuration for creating an overlay window
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// X position in screen coordinates
    pub x: i32,
    /// Y position in screen coordinates
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Window title / surface identifier
    pub title: String,
    /// Whole-window alpha (0 = invisible, 255 = opaque)
    pub alpha: u8,
    /// Whether clicks pass through the overlay
    pub click_through: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 300,
            height: 150,
            title: "easymetrics-overlay".to_string(),
            alpha: 128,
            click_through: true,
        }
    }
}

/// Errors that can occur in platform operations
#[derive(Debug)]
pub enum PlatformError {
    /// Failed to connect to display server
    ConnectionFailed(String),
    /// Required protocol/feature not available
    UnsupportedFeature(String),
    /// Buffer/memory allocation failed
    BufferError(String),
    /// Generic platform error
    Other(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::ConnectionFailed(s) => write!(f, "Connection failed: {}", s),
            PlatformError::UnsupportedFeature(s) => write!(f, "Unsupported feature: {}", s),
            PlatformError::BufferError(s) => write!(f, "Buffer error: {}", s),
            PlatformError::Other(s) => write!(f, "Platform error: {}", s),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Trait that all platform backends must implement
pub trait OverlayPlatform: Sized {
    /// Create a new overlay window with the given configuration.
    /// The window comes up with the full overlay attribute set applied.
    fn create(config: OverlayConfig) -> Result<Self, PlatformError>;

    /// Get the current width of the overlay
    fn width(&self) -> u32;

    /// Get the current height of the overlay
    fn height(&self) -> u32;

    /// Reapply the always-on-top, layered/alpha, and tool-window attributes.
    ///
    /// The OS silently strips these when another application takes foreground
    /// or enters exclusive fullscreen, so callers re-assert them on a cadence
    /// rather than trusting the values set at creation.
    fn assert_overlay_attributes(&mut self, alpha: u8);

    /// Get mutable access to the pixel buffer (RGBA format)
    /// Returns None if buffer is not ready
    fn pixel_buffer(&mut self) -> Option<&mut [u8]>;

    /// Commit the current pixel buffer to the screen
    fn commit(&mut self);

    /// Process pending platform events (non-blocking)
    /// Returns false if the overlay was closed
    fn poll_events(&mut self) -> bool;

    /// Get information about all connected monitors
    fn monitors() -> Vec<MonitorInfo>;

    /// The primary monitor, falling back to the first one found.
    fn primary_monitor() -> Option<MonitorInfo> {
        let monitors = Self::monitors();
        monitors
            .iter()
            .find(|m| m.is_primary)
            .or(monitors.first())
            .cloned()
    }
}

/// Re-export the appropriate platform for the current target
#[cfg(all(unix, not(target_os = "macos")))]
pub use x11::X11Overlay as NativeOverlay;

#[cfg(target_os = "windows")]
pub use windows::WindowsOverlay as NativeOverlay;

// ─────────────────────────────────────────────────────────────────────────────
// Test fake
// ─────────────────────────────────────────────────────────────────────────────

/// A windowless backend that records the calls the engine makes against it.
/// Tests that use it must hold [`fake::guard`] since the recorded state is
/// process-global (the backend is constructed inside the overlay thread).
#[cfg(test)]
pub(crate) mod fake {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard, OnceLock};

    use super::{MonitorInfo, OverlayConfig, OverlayPlatform, PlatformError};

    #[derive(Default)]
    pub struct FakeState {
        pub created: AtomicUsize,
        pub attribute_asserts: AtomicUsize,
        pub commits: AtomicUsize,
        pub polls: AtomicUsize,
        pub alive: AtomicBool,
        /// When set, the next poll reports the window as closed.
        pub close_requested: AtomicBool,
        /// When set, creation fails with a platform error.
        pub fail_creation: AtomicBool,
    }

    fn state() -> &'static FakeState {
        static STATE: OnceLock<FakeState> = OnceLock::new();
        STATE.get_or_init(FakeState::default)
    }

    fn lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    /// Serialize fake-backed tests and reset the recorded state.
    pub fn guard() -> MutexGuard<'static, ()> {
        let guard = lock().lock().unwrap_or_else(|e| e.into_inner());
        let s = state();
        s.created.store(0, Ordering::SeqCst);
        s.attribute_asserts.store(0, Ordering::SeqCst);
        s.commits.store(0, Ordering::SeqCst);
        s.polls.store(0, Ordering::SeqCst);
        s.alive.store(false, Ordering::SeqCst);
        s.close_requested.store(false, Ordering::SeqCst);
        s.fail_creation.store(false, Ordering::SeqCst);
        guard
    }

    pub fn recorded() -> &'static FakeState {
        state()
    }

    pub struct FakeOverlay {
        width: u32,
        height: u32,
        buffer: Vec<u8>,
    }

    impl OverlayPlatform for FakeOverlay {
        fn create(config: OverlayConfig) -> Result<Self, PlatformError> {
            if state().fail_creation.load(Ordering::SeqCst) {
                return Err(PlatformError::Other("forced creation failure".into()));
            }
            state().created.fetch_add(1, Ordering::SeqCst);
            state().alive.store(true, Ordering::SeqCst);
            Ok(Self {
                width: config.width,
                height: config.height,
                buffer: vec![0u8; (config.width * config.height * 4) as usize],
            })
        }

        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn assert_overlay_attributes(&mut self, _alpha: u8) {
            state().attribute_asserts.fetch_add(1, Ordering::SeqCst);
        }

        fn pixel_buffer(&mut self) -> Option<&mut [u8]> {
            Some(&mut self.buffer)
        }

        fn commit(&mut self) {
            state().commits.fetch_add(1, Ordering::SeqCst);
        }

        fn poll_events(&mut self) -> bool {
            state().polls.fetch_add(1, Ordering::SeqCst);
            !state().close_requested.load(Ordering::SeqCst)
        }

        fn monitors() -> Vec<MonitorInfo> {
            vec![MonitorInfo {
                id: "fake-0".to_string(),
                name: "Fake Monitor".to_string(),
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
                is_primary: true,
            }]
        }
    }

    impl Drop for FakeOverlay {
        fn drop(&mut self) {
            state().alive.store(false, Ordering::SeqCst);
        }
    }
}
