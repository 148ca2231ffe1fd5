//! The running overlay.
//!
//! `OverlayRuntime` owns everything a live overlay needs (window, layout,
//! provider session, scheduler, and the latest value texts) and advances it
//! one presentation tick at a time. The controller's thread loop is a thin
//! wrapper around [`OverlayRuntime::tick`]; tests drive `tick` directly with
//! synthetic instants.

use std::time::{Duration, Instant};

use tiny_skia::Color;
use tracing::{debug, info};

use easymetrics_core::{MetricsProvider, OverlayStyle, SelectionSet};

use crate::layout::{self, LayoutEngine};
use crate::platform::{OverlayConfig, OverlayPlatform, PlatformError};
use crate::renderer::Renderer;
use crate::scheduler::RefreshScheduler;
use crate::utils::color_from_unit_rgb;
use crate::window::OverlayWindow;

pub struct OverlayRuntime<P: OverlayPlatform> {
    window: OverlayWindow<P>,
    layout: LayoutEngine,
    provider: Box<dyn MetricsProvider + Send>,
    scheduler: RefreshScheduler,
    background: Color,
    label_color: Color,
    value_color: Color,
    alpha: u8,
    /// Latest value text per layout line. The metric tick writes these, the
    /// presentation tick reads them; nothing else is shared between the two
    /// cadences.
    values: Vec<String>,
}

impl<P: OverlayPlatform> OverlayRuntime<P> {
    /// Create the window sized for `selection` and open a provider session.
    ///
    /// The window goes to the top-left corner of the primary monitor, and
    /// all geometry scales with that monitor's height against the 1080p
    /// baseline.
    pub fn create(
        selection: SelectionSet,
        style: OverlayStyle,
        provider: Box<dyn MetricsProvider + Send>,
    ) -> Result<Self, PlatformError> {
        let style = style.clamped();

        let (scale, origin) = match P::primary_monitor() {
            Some(monitor) => (layout::scale_factor(monitor.height), (monitor.x, monitor.y)),
            None => (1.0, (0, 0)),
        };

        // The renderer exists before the window: the window width comes from
        // measuring the worst-case line.
        let mut renderer = Renderer::new();
        let layout = LayoutEngine::new(selection, style.text_size, scale, |text, size| {
            renderer.measure_text(text, size).0
        });

        let (width, height) = layout.window_size();
        let alpha = style.alpha();
        let config = OverlayConfig {
            x: origin.0,
            y: origin.1,
            width,
            height,
            alpha,
            ..OverlayConfig::default()
        };

        let window = OverlayWindow::create(config, renderer)?;
        info!(width, height, lines = layout.lines().len(), "overlay window created");

        let values = vec![String::from("N/A"); layout.lines().len()];

        Ok(Self {
            window,
            layout,
            provider,
            scheduler: RefreshScheduler::new(),
            background: color_from_unit_rgb(style.background),
            label_color: color_from_unit_rgb(style.label),
            value_color: color_from_unit_rgb(style.value),
            alpha,
            values,
        })
    }

    /// One presentation tick: pump events, run the metric cadence if due,
    /// redraw. Returns false once the window has been closed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.scheduler.presentation_tick(now);

        // A window-manager close is equivalent to a terminate request.
        if !self.window.poll_events() {
            return false;
        }

        if self.scheduler.metric_due(now) {
            // Queries come first, then the value texts computed from them,
            // then the attribute re-assertion.
            self.refresh_values();
            self.window.assert_overlay_attributes(self.alpha);
        }

        self.redraw();
        true
    }

    /// How long the tick loop may sleep before the next presentation tick.
    pub fn frame_budget(&self, now: Instant) -> Duration {
        self.scheduler.frame_budget(now)
    }

    /// Latest formatted value per display line.
    pub fn value_texts(&self) -> &[String] {
        &self.values
    }

    fn refresh_values(&mut self) {
        for (slot, line) in self.values.iter_mut().zip(self.layout.lines()) {
            let reading = self.provider.query(line.descriptor.kind);
            *slot = layout::format_reading(reading, line.descriptor.unit);
        }
    }

    fn redraw(&mut self) {
        self.window.clear(self.background);

        let font_size = self.layout.font_size();
        for (line, value) in self.layout.lines().iter().zip(&self.values) {
            self.window
                .draw_text(&line.label, line.label_x, line.baseline_y, font_size, self.label_color);

            let (value_width, _) = self.window.measure_text(value, font_size);
            let value_x = self.layout.value_x(value_width);
            self.window
                .draw_text(value, value_x, line.baseline_y, font_size, self.value_color);
        }

        self.window.commit();
    }

    /// Ordered teardown: the tick loop has already stopped by the time this
    /// runs; release the provider session, then destroy the window.
    pub fn shutdown(self) {
        let Self { window, provider, .. } = self;
        drop(provider);
        drop(window);
        debug!("overlay torn down");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use easymetrics_core::MetricKind;

    use super::*;
    use crate::platform::fake::{FakeOverlay, guard, recorded};
    use crate::scheduler::METRIC_PERIOD;

    fn boxed_provider(
        f: impl FnMut(MetricKind) -> Option<f64> + Send + 'static,
    ) -> Box<dyn MetricsProvider + Send> {
        Box::new(f)
    }

    fn runtime_for(
        bits: u32,
        provider: impl FnMut(MetricKind) -> Option<f64> + Send + 'static,
    ) -> OverlayRuntime<FakeOverlay> {
        OverlayRuntime::create(
            SelectionSet::from_bits(bits),
            OverlayStyle::default(),
            boxed_provider(provider),
        )
        .expect("fake window creation")
    }

    #[test]
    fn metric_tick_queries_then_reasserts_attributes() {
        let _guard = guard();
        let mut runtime = runtime_for(0b1, |_| Some(42.0));

        let t0 = Instant::now();
        assert!(runtime.tick(t0));
        // First tick runs the metric cadence: one re-assertion, one commit.
        assert_eq!(recorded().attribute_asserts.load(Ordering::SeqCst), 1);
        assert_eq!(recorded().commits.load(Ordering::SeqCst), 1);

        // Presentation ticks inside the metric period redraw without
        // re-asserting.
        assert!(runtime.tick(t0 + Duration::from_millis(16)));
        assert!(runtime.tick(t0 + Duration::from_millis(32)));
        assert_eq!(recorded().attribute_asserts.load(Ordering::SeqCst), 1);
        assert_eq!(recorded().commits.load(Ordering::SeqCst), 3);

        // The next metric tick restores the attributes, whatever a
        // focus-stealing app did to them in between.
        assert!(runtime.tick(t0 + METRIC_PERIOD));
        assert_eq!(recorded().attribute_asserts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn values_render_rounded_with_unit() {
        let _guard = guard();
        // id 0 = GPU Usage, unit "%"
        let mut runtime = runtime_for(0b1, |kind| match kind {
            MetricKind::GpuUsage => Some(42.3),
            _ => None,
        });

        runtime.tick(Instant::now());
        assert_eq!(runtime.value_texts(), ["42%"]);
    }

    #[test]
    fn absent_readings_render_na_and_keep_line_order() {
        let _guard = guard();
        // ids 0 and 2 selected; id 2 has no reading.
        let mut runtime = runtime_for(0b101, |kind| match kind {
            MetricKind::GpuUsage => Some(55.0),
            _ => None,
        });

        runtime.tick(Instant::now());
        assert_eq!(runtime.value_texts(), ["55%", "N/A"]);
    }

    #[test]
    fn stale_values_persist_between_metric_ticks() {
        let _guard = guard();
        let mut readings = vec![Some(10.0), Some(20.0)].into_iter();
        let mut runtime = runtime_for(0b1, move |_| readings.next().flatten());

        let t0 = Instant::now();
        runtime.tick(t0);
        assert_eq!(runtime.value_texts(), ["10%"]);

        // Presentation ticks redraw the stale value.
        runtime.tick(t0 + Duration::from_millis(16));
        assert_eq!(runtime.value_texts(), ["10%"]);

        runtime.tick(t0 + METRIC_PERIOD);
        assert_eq!(runtime.value_texts(), ["20%"]);
    }

    #[test]
    fn window_close_stops_the_tick_loop() {
        let _guard = guard();
        let mut runtime = runtime_for(0b1, |_| None);

        let t0 = Instant::now();
        assert!(runtime.tick(t0));

        recorded().close_requested.store(true, Ordering::SeqCst);
        assert!(!runtime.tick(t0 + Duration::from_millis(16)));
    }

    #[test]
    fn shutdown_destroys_the_window() {
        let _guard = guard();
        let runtime = runtime_for(0b1, |_| None);
        assert!(recorded().alive.load(Ordering::SeqCst));

        runtime.shutdown();
        assert!(!recorded().alive.load(Ordering::SeqCst));
    }

    #[test]
    fn frame_budget_stays_within_a_tick() {
        let _guard = guard();
        let mut runtime = runtime_for(0b1, |_| None);

        let t0 = Instant::now();
        runtime.tick(t0);
        assert!(runtime.frame_budget(t0) <= Duration::from_millis(16));
    }
}
