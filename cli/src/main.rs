//! EasyMetrics host binary.
//!
//! The thin configuration surface in front of the overlay engine: picks a
//! metric selection and style from the command line, starts the overlay, and
//! polls the running flag until Ctrl-C or the window is closed.
//!
//! ```bash
//! easymetrics --metrics gpu-usage,gpu-temperature,cpu-usage
//! easymetrics --all --transparency 0.8 --text-size 30
//! ```

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use easymetrics_core::{OverlayStyle, REGISTRY, SelectionSet};
use easymetrics_overlay::OverlayController;

#[derive(Parser, Debug)]
#[command(name = "easymetrics", version, about = "Hardware metrics overlay")]
struct Args {
    /// Metrics to display, comma-separated (see --list for names)
    #[arg(long, value_delimiter = ',')]
    metrics: Vec<String>,

    /// Display every metric in the catalog
    #[arg(long, conflicts_with = "metrics")]
    all: bool,

    /// List available metric names and exit
    #[arg(long)]
    list: bool,

    /// Overlay background color as "r,g,b" with channels in [0,1]
    #[arg(long, default_value = "0,0,0", value_parser = parse_rgb)]
    background: [f32; 3],

    /// Metric label color as "r,g,b"
    #[arg(long, default_value = "1,0,0", value_parser = parse_rgb)]
    label_color: [f32; 3],

    /// Metric value color as "r,g,b"
    #[arg(long, default_value = "0,1,0", value_parser = parse_rgb)]
    value_color: [f32; 3],

    /// Overlay transparency in [0,1]; 1 is opaque
    #[arg(long, default_value_t = 0.5)]
    transparency: f32,

    /// Text size at the 1080p baseline
    #[arg(long, default_value_t = 24, value_parser = clap::value_parser!(u32).range(10..=38))]
    text_size: u32,
}

/// Parse "r,g,b" with unit-range channels.
fn parse_rgb(input: &str) -> Result<[f32; 3], String> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected \"r,g,b\", got '{}'", input));
    }

    let mut rgb = [0.0f32; 3];
    for (slot, part) in rgb.iter_mut().zip(&parts) {
        let channel: f32 = part
            .parse()
            .map_err(|_| format!("invalid channel '{}'", part))?;
        if !(0.0..=1.0).contains(&channel) {
            return Err(format!("channel '{}' outside [0,1]", part));
        }
        *slot = channel;
    }
    Ok(rgb)
}

/// CLI name for a metric: its label, lowercased and dash-separated.
fn metric_flag(label: &str) -> String {
    label.to_lowercase().replace(' ', "-")
}

fn build_selection(args: &Args) -> Result<SelectionSet, String> {
    if args.all {
        return Ok(SelectionSet::full());
    }

    let mut selection = SelectionSet::empty();
    for name in &args.metrics {
        let wanted = name.trim().to_lowercase();
        let desc = REGISTRY
            .iter()
            .find(|d| metric_flag(d.label) == wanted)
            .ok_or_else(|| format!("unknown metric '{}' (see --list)", name))?;
        selection = selection.insert(desc.id);
    }
    Ok(selection)
}

fn print_metric_list() {
    println!("Available metrics:");
    for desc in &REGISTRY {
        println!("  {:<24} {}", metric_flag(desc.label), desc.label);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    if args.list {
        print_metric_list();
        return ExitCode::SUCCESS;
    }

    let selection = match build_selection(&args) {
        Ok(selection) => selection,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if selection.is_empty() {
        error!("no metrics selected; pass --metrics <names> or --all");
        return ExitCode::FAILURE;
    }

    let style = OverlayStyle {
        background: args.background,
        label: args.label_color,
        value: args.value_color,
        transparency: args.transparency,
        text_size: args.text_size,
    }
    .clamped();

    let mut controller = OverlayController::new();
    if let Err(e) = controller.start(selection, style) {
        error!("could not start overlay: {e}");
        return ExitCode::FAILURE;
    }
    info!("overlay running; press Ctrl+C to terminate");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                controller.request_terminate();
                break;
            }
            _ = tokio::time::sleep(Duration::from_millis(200)) => {
                // The window can also be closed from the window manager.
                if !controller.is_running() {
                    info!("overlay window closed");
                    break;
                }
            }
        }
    }

    // Bounded join so teardown (provider session, window) completes before
    // the process exits.
    if !controller.join(Duration::from_secs(5)) {
        error!("overlay did not finish teardown in time");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rgb_accepts_unit_range_triples() {
        assert_eq!(parse_rgb("0,0,0").unwrap(), [0.0, 0.0, 0.0]);
        assert_eq!(parse_rgb("1, 0.5, 0.25").unwrap(), [1.0, 0.5, 0.25]);
        assert!(parse_rgb("1,2,3").is_err());
        assert!(parse_rgb("0,0").is_err());
        assert!(parse_rgb("a,b,c").is_err());
    }

    #[test]
    fn metric_names_match_catalog() {
        assert_eq!(metric_flag("GPU Usage"), "gpu-usage");
        assert_eq!(metric_flag("GPU VRAM Clock Speed"), "gpu-vram-clock-speed");
        assert_eq!(metric_flag("System RAM"), "system-ram");
    }

    #[test]
    fn selection_from_names() {
        let args = Args::parse_from(["easymetrics", "--metrics", "gpu-usage,cpu-usage"]);
        let selection = build_selection(&args).unwrap();
        assert_eq!(selection.bits(), (1 << 0) | (1 << 9));
    }

    #[test]
    fn selection_all() {
        let args = Args::parse_from(["easymetrics", "--all"]);
        assert!(build_selection(&args).unwrap().is_full());
    }

    #[test]
    fn unknown_metric_is_rejected() {
        let args = Args::parse_from(["easymetrics", "--metrics", "gpu-flux"]);
        assert!(build_selection(&args).is_err());
    }
}
