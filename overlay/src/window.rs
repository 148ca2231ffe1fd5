//! Overlay window wrapper
//!
//! Pairs a platform backend with the software renderer so the runtime can
//! draw without touching either directly. Generic over the backend, which is
//! what lets the engine run against the test fake.

use tiny_skia::Color;

use crate::platform::{OverlayConfig, OverlayPlatform, PlatformError};
use crate::renderer::Renderer;

/// A managed overlay window with its own renderer
pub struct OverlayWindow<P> {
    platform: P,
    renderer: Renderer,
}

impl<P: OverlayPlatform> OverlayWindow<P> {
    /// Create a new overlay window.
    ///
    /// The renderer is passed in rather than built here: the caller needs it
    /// before the window exists, to measure text for the window dimensions.
    pub fn create(config: OverlayConfig, renderer: Renderer) -> Result<Self, PlatformError> {
        let platform = P::create(config)?;
        Ok(Self { platform, renderer })
    }

    /// Get the window width
    pub fn width(&self) -> u32 {
        self.platform.width()
    }

    /// Get the window height
    pub fn height(&self) -> u32 {
        self.platform.height()
    }

    /// Clear the overlay with a color
    pub fn clear(&mut self, color: Color) {
        let width = self.platform.width();
        let height = self.platform.height();
        if let Some(buffer) = self.platform.pixel_buffer() {
            self.renderer.clear(buffer, width, height, color);
        }
    }

    /// Draw text with its baseline at the specified position
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Color) {
        let width = self.platform.width();
        let height = self.platform.height();
        if let Some(buffer) = self.platform.pixel_buffer() {
            self.renderer
                .draw_text(buffer, width, height, text, x, y, font_size, color);
        }
    }

    /// Measure text dimensions
    pub fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        self.renderer.measure_text(text, font_size)
    }

    /// Commit the current frame to the screen
    pub fn commit(&mut self) {
        self.platform.commit();
    }

    /// Poll for events (non-blocking)
    /// Returns false if the window was closed
    pub fn poll_events(&mut self) -> bool {
        self.platform.poll_events()
    }

    /// Reapply the topmost/layered/tool-window attributes and alpha
    pub fn assert_overlay_attributes(&mut self, alpha: u8) {
        self.platform.assert_overlay_attributes(alpha);
    }
}
