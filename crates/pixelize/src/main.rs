//! pixelize: turn an image into pixel art from the command line.
//!
//! Reads one image, runs the pixelize pipeline, and writes an indexed
//! PNG next to a configurable output directory.
//!
//! # Usage
//!
//! ```text
//! pixelize [OPTIONS] <INPUT>
//! pixelize --height 32 --border hero.png          # -> pixelized/hero.pix.png
//! pixelize -c 48x48+8x8 -o sprite.png hero.png
//! pixelize --diagnostics --json hero.png
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod logger;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use pixelize_io::{Input, Output, PixelizeError, default_output_path, persist};
use pixelize_pipeline::{BackgroundRemoverKind, CropBox, PixelizeConfig, StdClock};

/// Turn arbitrary images into stylized low-resolution pixel art.
///
/// The image is thresholded on alpha, optionally isolated from its
/// background and trimmed, resized onto a small canvas, posterized,
/// cleaned up, optionally outlined, then scaled back up and saved as an
/// indexed PNG.
#[derive(Parser)]
#[command(name = "pixelize", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, GIF, WebP).
    input: PathBuf,

    /// Output file. Defaults to `<output-dir>/<input stem>.pix.png`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for the default output file.
    #[arg(long, default_value = pixelize_io::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Target width before scaling. Derived from the aspect ratio when
    /// only the height is given.
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    width: Option<u32>,

    /// Target height before scaling. Derived from the aspect ratio when
    /// only the width is given.
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    height: Option<u32>,

    /// Integer upscale factor applied last.
    #[arg(short, long, default_value_t = PixelizeConfig::DEFAULT_SCALE, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    scale: u32,

    /// Crop after scaling, as WIDTHxHEIGHT+XxY (e.g. 100x100+150x150).
    #[arg(short, long, value_name = "WxH+XxY")]
    crop: Option<CropBox>,

    /// Posterization exponent: channels are floored to multiples of
    /// 2^N. 0 disables posterization.
    #[arg(long, default_value_t = PixelizeConfig::DEFAULT_COLOR_REDUCTION)]
    color_reduction: u8,

    /// Remove the background before processing.
    #[arg(long)]
    rembg: bool,

    /// Trim to the visible content before resizing.
    #[arg(long)]
    inner: bool,

    /// Draw a one-pixel black outline around the silhouette.
    #[arg(long)]
    border: bool,

    /// Alpha below which pixels become fully transparent.
    #[arg(long, default_value_t = PixelizeConfig::DEFAULT_ALPHA_MIN)]
    alpha_min: u8,

    /// Alpha at or above which pixels become fully opaque.
    #[arg(long, default_value_t = PixelizeConfig::DEFAULT_ALPHA_MAX)]
    alpha_max: u8,

    /// Transparent padding around the content, in pre-scale pixels.
    #[arg(long, default_value_t = PixelizeConfig::DEFAULT_MARGIN)]
    margin: u32,

    /// Log every pipeline stage.
    #[arg(short, long)]
    verbose: bool,

    /// Print per-stage timings and metrics.
    #[arg(long)]
    diagnostics: bool,

    /// With `--diagnostics`, print JSON instead of a report.
    #[arg(long, requires = "diagnostics")]
    json: bool,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// The JSON must be a valid `PixelizeConfig` serialization; missing
    /// fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,
}

/// Build a [`PixelizeConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<PixelizeConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("error parsing --config-json: {e}"));
    }

    Ok(PixelizeConfig {
        rembg: cli.rembg,
        inner: cli.inner,
        color_reduction: cli.color_reduction,
        alpha_min: cli.alpha_min,
        alpha_max: cli.alpha_max,
        margin: cli.margin,
        border: cli.border,
        width: cli.width,
        height: cli.height,
        scale: cli.scale,
        crop: cli.crop,
    })
}

fn output_path(cli: &Cli) -> PathBuf {
    cli.output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input, &cli.output_dir))
}

/// Run the pipeline and save the result, optionally printing
/// diagnostics.
fn run(cli: &Cli, config: &PixelizeConfig) -> Result<PathBuf, PixelizeError> {
    let output = output_path(cli);
    log::debug!("config: {config:?}");

    if !cli.diagnostics {
        pixelize_io::pixelize(
            cli.input.as_path(),
            Some(Output::Path(output.clone())),
            config,
        )?;
        return Ok(output);
    }

    let source = Input::from(cli.input.as_path()).into_source()?;
    let (result, diagnostics) = pixelize_pipeline::process_with_diagnostics(
        source,
        config,
        &BackgroundRemoverKind::default(),
        &StdClock,
    )?;
    persist(&result.indexed, Output::Path(output.clone()))?;

    if cli.json {
        match serde_json::to_string_pretty(&diagnostics) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("error serializing diagnostics: {e}"),
        }
    } else {
        println!("{}", diagnostics.report());
    }
    Ok(output)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            log::error!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, &config) {
        Ok(path) => {
            log::debug!("done: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}: {e}", cli.input.display());
            log::error!("please report this error to {}", issues_url());
            ExitCode::FAILURE
        }
    }
}

/// Issue tracker of the repository this binary was built from.
fn issues_url() -> String {
    format!(
        "{}/issues",
        env!("CARGO_PKG_REPOSITORY").trim_end_matches('/')
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_pipeline_defaults() {
        let cli = Cli::try_parse_from(["pixelize", "hero.png"]).unwrap();
        assert_eq!(config_from_cli(&cli).unwrap(), PixelizeConfig::default());
        assert_eq!(output_path(&cli), PathBuf::from("pixelized/hero.pix.png"));
    }

    #[test]
    fn flags_map_onto_config() {
        let cli = Cli::try_parse_from([
            "pixelize",
            "hero.png",
            "--height",
            "32",
            "-s",
            "4",
            "-c",
            "100x100+150x150",
            "--border",
            "--inner",
            "--margin",
            "2",
            "--alpha-min",
            "10",
        ])
        .unwrap();
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.height, Some(32));
        assert_eq!(config.scale, 4);
        assert_eq!(config.crop, Some(CropBox::new(100, 100, 150, 150)));
        assert!(config.border);
        assert!(config.inner);
        assert_eq!(config.margin, 2);
        assert_eq!(config.alpha_min, 10);
    }

    #[test]
    fn negative_crop_is_rejected() {
        assert!(Cli::try_parse_from(["pixelize", "a.png", "-c", "10x10+-1x0"]).is_err());
    }

    #[test]
    fn zero_scale_is_rejected() {
        assert!(Cli::try_parse_from(["pixelize", "a.png", "-s", "0"]).is_err());
    }

    #[test]
    fn explicit_output_wins() {
        let cli =
            Cli::try_parse_from(["pixelize", "a.png", "-o", "out/x.png", "--output-dir", "d"])
                .unwrap();
        assert_eq!(output_path(&cli), PathBuf::from("out/x.png"));
    }

    #[test]
    fn config_json_overrides_flags() {
        let cli = Cli::try_parse_from([
            "pixelize",
            "a.png",
            "--border",
            "--config-json",
            r#"{"width": 16, "crop": "8x8+0x0"}"#,
        ])
        .unwrap();
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.width, Some(16));
        assert!(!config.border);
        assert_eq!(config.crop, Some(CropBox::new(8, 8, 0, 0)));
    }

    #[test]
    fn bad_config_json_is_an_error() {
        let cli = Cli::try_parse_from(["pixelize", "a.png", "--config-json", "{"]).unwrap();
        assert!(config_from_cli(&cli).is_err());
    }

    #[test]
    fn failure_hint_points_at_issue_tracker() {
        let url = issues_url();
        assert!(url.starts_with("https://"));
        assert!(url.ends_with("/issues"));
        assert!(!url.contains("//issues"));
    }

    #[test]
    fn json_requires_diagnostics() {
        assert!(Cli::try_parse_from(["pixelize", "a.png", "--json"]).is_err());
    }
}
