//! Common utility functions for overlay rendering

use tiny_skia::Color;

/// Convert a unit-range RGB triple (the host UI's color-picker format) to an
/// opaque tiny_skia Color
#[inline]
pub fn color_from_unit_rgb(rgb: [f32; 3]) -> Color {
    Color::from_rgba8(
        (rgb[0].clamp(0.0, 1.0) * 255.0) as u8,
        (rgb[1].clamp(0.0, 1.0) * 255.0) as u8,
        (rgb[2].clamp(0.0, 1.0) * 255.0) as u8,
        255,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_unit_rgb() {
        let red = color_from_unit_rgb([1.0, 0.0, 0.0]);
        assert_eq!(red, Color::from_rgba8(255, 0, 0, 255));

        // Out-of-range channels clamp instead of wrapping
        let clamped = color_from_unit_rgb([2.0, -1.0, 0.5]);
        assert_eq!(clamped, Color::from_rgba8(255, 0, 127, 255));
    }
}
