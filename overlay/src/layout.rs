//! Text layout for the metrics overlay.
//!
//! Computes the window dimensions and per-line text positions for a metric
//! selection, scaled uniformly from a 1080p baseline. Geometry is fixed at
//! creation; only the value strings change from tick to tick.

use easymetrics_core::{MetricDescriptor, SelectionSet, descriptor};

/// Baseline vertical resolution the style's text size is specified against.
pub const BASE_RESOLUTION_HEIGHT: f32 = 1080.0;

/// Margin on every window edge, in pixels at the baseline resolution.
const BASE_MARGIN: f32 = 20.0;

/// Inter-line spacing as a fraction of the font size.
const LINE_SPACING_FACTOR: f32 = 0.4;

/// Longest line the overlay can produce; the window width is sized from it
/// once at creation rather than re-measured per tick.
const WIDTH_SAMPLE: &str = "GPU VRAM Clock Speed: 20000 MHz";

/// Uniform scale from the primary monitor's height.
pub fn scale_factor(screen_height: u32) -> f32 {
    screen_height as f32 / BASE_RESOLUTION_HEIGHT
}

/// One display line: a metric's label text and where it goes.
#[derive(Debug, Clone)]
pub struct LayoutLine {
    pub descriptor: &'static MetricDescriptor,
    /// Rendered label, `"<label>: "`.
    pub label: String,
    /// Left edge of the label.
    pub label_x: f32,
    /// Text baseline shared by the label and its value.
    pub baseline_y: f32,
}

/// Window geometry and line placement for one overlay instance.
pub struct LayoutEngine {
    font_size: f32,
    margin: f32,
    line_height: f32,
    width: u32,
    height: u32,
    lines: Vec<LayoutLine>,
}

impl LayoutEngine {
    /// Build the layout for `selection` at the given scale.
    ///
    /// `measure` returns the rendered width of a string at a font size; the
    /// runtime passes the renderer's measurement, tests pass a stub.
    pub fn new(
        selection: SelectionSet,
        text_size: u32,
        scale: f32,
        mut measure: impl FnMut(&str, f32) -> f32,
    ) -> Self {
        // Truncate like the integer pixel math this reproduces.
        let font_size = (text_size as f32 * scale).floor();
        let line_spacing = (font_size * LINE_SPACING_FACTOR).floor();
        let line_height = font_size + line_spacing;
        let margin = (BASE_MARGIN * scale).floor();

        let lines: Vec<LayoutLine> = selection
            .iter()
            .filter_map(descriptor)
            .enumerate()
            .map(|(row, desc)| LayoutLine {
                descriptor: desc,
                label: format!("{}: ", desc.label),
                label_x: margin,
                baseline_y: margin + row as f32 * line_height + font_size,
            })
            .collect();

        let height = margin + line_height * lines.len() as f32 + margin;
        let width = margin + measure(WIDTH_SAMPLE, font_size) + margin;

        Self {
            font_size,
            margin,
            line_height,
            width: width.ceil() as u32,
            height: height.ceil() as u32,
            lines,
        }
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Window dimensions in pixels.
    pub fn window_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Display lines in registry order (never toggle order).
    pub fn lines(&self) -> &[LayoutLine] {
        &self.lines
    }

    /// Left edge for a value of the given rendered width: right-aligned
    /// against the window's right edge minus the margin.
    pub fn value_x(&self, value_width: f32) -> f32 {
        self.width as f32 - self.margin - value_width
    }
}

/// Render a reading for display: nearest-integer rounding plus the metric's
/// unit suffix, or the literal `N/A` (no suffix) when the reading is absent.
pub fn format_reading(reading: Option<f64>, unit: &str) -> String {
    match reading {
        Some(value) => format!("{}{}", value.round() as i64, unit),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic stand-in for glyph measurement.
    fn fake_measure(text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * 0.5
    }

    #[test]
    fn lines_follow_registry_order() {
        // 0b101: ids 0 and 2.
        let layout = LayoutEngine::new(SelectionSet::from_bits(0b101), 24, 1.0, fake_measure);

        let labels: Vec<_> = layout.lines().iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, ["GPU Usage: ", "GPU Hotspot Temperature: "]);
    }

    #[test]
    fn window_height_from_selected_count() {
        let layout = LayoutEngine::new(SelectionSet::from_bits(0b101), 24, 1.0, fake_measure);

        // 24pt font, 40% spacing floored to 9 -> 33px lines, 20px margins.
        assert_eq!(layout.line_height(), 33.0);
        let (_, height) = layout.window_size();
        assert_eq!(height, 20 + 2 * 33 + 20);
    }

    #[test]
    fn window_width_from_sample_string() {
        let layout = LayoutEngine::new(SelectionSet::from_bits(0b1), 24, 1.0, fake_measure);

        let expected = 20.0 + fake_measure(WIDTH_SAMPLE, 24.0) + 20.0;
        let (width, _) = layout.window_size();
        assert_eq!(width, expected.ceil() as u32);
    }

    #[test]
    fn baselines_step_by_line_height() {
        let layout = LayoutEngine::new(SelectionSet::full(), 24, 1.0, fake_measure);

        for (row, line) in layout.lines().iter().enumerate() {
            assert_eq!(line.label_x, 20.0);
            assert_eq!(line.baseline_y, 20.0 + row as f32 * 33.0 + 24.0);
        }
    }

    #[test]
    fn values_right_align_against_margin() {
        let layout = LayoutEngine::new(SelectionSet::from_bits(0b1), 24, 1.0, fake_measure);

        let (width, _) = layout.window_size();
        assert_eq!(layout.value_x(50.0), width as f32 - 20.0 - 50.0);
    }

    #[test]
    fn scale_applies_to_margins_text_and_spacing() {
        let scale = scale_factor(2160); // 4K: 2x
        let layout = LayoutEngine::new(SelectionSet::from_bits(0b1), 24, scale, fake_measure);

        assert_eq!(layout.font_size(), 48.0);
        assert_eq!(layout.line_height(), 48.0 + 19.0);
        assert_eq!(layout.lines()[0].label_x, 40.0);
    }

    #[test]
    fn format_rounds_to_nearest_and_appends_unit() {
        assert_eq!(format_reading(Some(42.3), "%"), "42%");
        assert_eq!(format_reading(Some(41.5), "%"), "42%");
        assert_eq!(format_reading(Some(1499.7), " MHz"), "1500 MHz");
    }

    #[test]
    fn absent_reading_formats_as_na_without_unit() {
        assert_eq!(format_reading(None, " MHz"), "N/A");
    }
}
