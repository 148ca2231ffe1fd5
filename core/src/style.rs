//! Overlay appearance settings.
//!
//! Captured by value when the overlay starts; the running overlay never sees
//! later edits. Color channels and transparency are normalized to [0, 1] the
//! way the host's color pickers produce them.

/// Allowed overlay text sizes, in points at the 1080p baseline resolution.
pub const TEXT_SIZE_MIN: u32 = 10;
pub const TEXT_SIZE_MAX: u32 = 38;

/// Appearance of the overlay window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    /// Window background color, RGB channels in [0, 1].
    pub background: [f32; 3],
    /// Metric label color.
    pub label: [f32; 3],
    /// Metric value color.
    pub value: [f32; 3],
    /// Whole-window transparency in [0, 1]; 1.0 is fully opaque.
    pub transparency: f32,
    /// Base text size, clamped to [`TEXT_SIZE_MIN`]..=[`TEXT_SIZE_MAX`].
    pub text_size: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            background: [0.0, 0.0, 0.0],
            label: [1.0, 0.0, 0.0],
            value: [0.0, 1.0, 0.0],
            transparency: 0.5,
            text_size: 24,
        }
    }
}

impl OverlayStyle {
    /// Clamp every field into its valid range.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        for channel in self
            .background
            .iter_mut()
            .chain(self.label.iter_mut())
            .chain(self.value.iter_mut())
        {
            *channel = channel.clamp(0.0, 1.0);
        }
        self.transparency = self.transparency.clamp(0.0, 1.0);
        self.text_size = self.text_size.clamp(TEXT_SIZE_MIN, TEXT_SIZE_MAX);
        self
    }

    /// Transparency scaled to the platform's discrete alpha range.
    pub fn alpha(&self) -> u8 {
        (self.transparency.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_channels_and_text_size() {
        let style = OverlayStyle {
            background: [-0.5, 2.0, 0.5],
            label: [0.0, 0.0, 0.0],
            value: [1.0, 1.0, 1.0],
            transparency: 1.7,
            text_size: 99,
        }
        .clamped();

        assert_eq!(style.background, [0.0, 1.0, 0.5]);
        assert_eq!(style.transparency, 1.0);
        assert_eq!(style.text_size, TEXT_SIZE_MAX);

        let tiny = OverlayStyle { text_size: 1, ..OverlayStyle::default() }.clamped();
        assert_eq!(tiny.text_size, TEXT_SIZE_MIN);
    }

    #[test]
    fn alpha_scaling() {
        assert_eq!(OverlayStyle { transparency: 0.0, ..Default::default() }.alpha(), 0);
        assert_eq!(OverlayStyle { transparency: 1.0, ..Default::default() }.alpha(), 255);
        // Default 0.5 rounds up, matching the host's slider midpoint.
        assert_eq!(OverlayStyle::default().alpha(), 128);
    }
}
