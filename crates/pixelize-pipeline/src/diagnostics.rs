//! Pipeline diagnostics: timing and per-stage metrics.
//!
//! [`process_with_diagnostics`] drives the same stage chain as
//! [`crate::process`] and records how long each stage took and what it
//! did. Time comes from an injectable [`Clock`].
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::background::BackgroundRemover;
use crate::crop_box::CropBox;
use crate::palette::PaletteMethod;
use crate::pipeline::Pipeline;
use crate::trim::Bounds;
use crate::types::{Dimensions, PipelineError, PixelizeConfig, PixelizeResult, Source};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of monotonic time for stage timing.
///
/// Abstracted so the pipeline never reads the system clock itself and
/// tests can substitute a deterministic clock.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// Capture the current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Diagnostics collected from a single pipeline run.
///
/// Stages that are conditionally skipped (background removal, trim,
/// outline, crop) have `Option` fields that are `None` when the stage
/// did nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Image decoding.
    pub decode: StageDiagnostics,
    /// Background removal (only when `config.rembg == true`).
    pub background: Option<StageDiagnostics>,
    /// Alpha thresholding.
    pub threshold: StageDiagnostics,
    /// Trim to content (only when `config.inner == true`).
    pub trim: Option<StageDiagnostics>,
    /// Resize and margin composite.
    pub composite: StageDiagnostics,
    /// Posterization.
    pub posterize: StageDiagnostics,
    /// Cleanup sweep.
    pub cleanup: StageDiagnostics,
    /// Outline (only when `config.border == true`).
    pub outline: Option<StageDiagnostics>,
    /// Final upscale.
    pub rescale: StageDiagnostics,
    /// Crop (only when `config.crop` is set).
    pub crop: Option<StageDiagnostics>,
    /// Palette reduction.
    pub palette: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the encoded input, or `None` for a pre-decoded image.
        input_bytes: Option<usize>,
        /// Decoded size.
        size: Dimensions,
    },
    /// Background removal metrics.
    Background {
        /// Fully transparent pixels after removal.
        transparent_pixels: u64,
    },
    /// Alpha threshold metrics.
    Threshold {
        /// Pixels made fully transparent.
        cleared: u64,
        /// Pixels made fully opaque.
        made_opaque: u64,
    },
    /// Trim metrics.
    Trim {
        /// Content rectangle in the thresholded image.
        bounds: Bounds,
    },
    /// Composite metrics.
    Composite {
        /// Canvas size.
        target: Dimensions,
        /// Content area inside the margin.
        inner: Dimensions,
    },
    /// Posterization metrics.
    Posterize {
        /// Exponent used.
        color_reduction: u8,
    },
    /// Cleanup metrics.
    Cleanup {
        /// Fully transparent pixels after the sweep.
        transparent_pixels: u64,
    },
    /// Outline metrics.
    Outline {
        /// Pixels painted black.
        painted: u64,
    },
    /// Upscale metrics.
    Rescale {
        /// Scale factor.
        scale: u32,
        /// Size after scaling.
        size: Dimensions,
    },
    /// Crop metrics.
    Crop {
        /// The applied rectangle.
        crop: CropBox,
    },
    /// Palette metrics.
    Palette {
        /// Number of palette entries.
        colors: usize,
        /// How the palette was built.
        method: PaletteMethod,
    },
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let stages: Vec<(&str, &StageDiagnostics)> = [
            ("Decode", Some(&self.decode)),
            ("Background Removal", self.background.as_ref()),
            ("Threshold", Some(&self.threshold)),
            ("Trim", self.trim.as_ref()),
            ("Composite", Some(&self.composite)),
            ("Posterize", Some(&self.posterize)),
            ("Cleanup", Some(&self.cleanup)),
            ("Outline", self.outline.as_ref()),
            ("Rescale", Some(&self.rescale)),
            ("Crop", self.crop.as_ref()),
            ("Palette", Some(&self.palette)),
        ]
        .into_iter()
        .filter_map(|(name, diag)| diag.map(|d| (name, d)))
        .collect();

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode { input_bytes, size } => match input_bytes {
            Some(n) => format!("{n} bytes -> {}x{}", size.width, size.height),
            None => format!("pre-decoded {}x{}", size.width, size.height),
        },
        StageMetrics::Background { transparent_pixels }
        | StageMetrics::Cleanup { transparent_pixels } => {
            format!("transparent={transparent_pixels}")
        }
        StageMetrics::Threshold {
            cleared,
            made_opaque,
        } => format!("cleared={cleared} opaque={made_opaque}"),
        StageMetrics::Trim { bounds } => format!(
            "{}x{} at ({}, {})",
            bounds.width, bounds.height, bounds.x, bounds.y
        ),
        StageMetrics::Composite { target, inner } => format!(
            "{}x{} in {}x{}",
            inner.width, inner.height, target.width, target.height
        ),
        StageMetrics::Posterize { color_reduction } => format!("k={color_reduction}"),
        StageMetrics::Outline { painted } => format!("painted={painted}"),
        StageMetrics::Rescale { scale, size } => {
            format!("x{scale} -> {}x{}", size.width, size.height)
        }
        StageMetrics::Crop { crop } => format!("{crop}"),
        StageMetrics::Palette { colors, method } => format!("{colors} colors ({method:?})"),
    }
}

/// Count fully transparent pixels.
fn transparent_pixels(image: &crate::RgbaImage) -> u64 {
    image
        .pixels()
        .map(|p| u64::from(u8::from(p.0[3] == 0)))
        .sum()
}

/// Run the full pipeline, collecting per-stage diagnostics.
///
/// # Errors
///
/// Same as [`crate::process_with_remover`].
#[allow(clippy::too_many_lines)]
pub fn process_with_diagnostics<C: Clock>(
    source: impl Into<Source>,
    config: &PixelizeConfig,
    remover: &dyn BackgroundRemover,
    clock: &C,
) -> Result<(PixelizeResult, PipelineDiagnostics), PipelineError> {
    let pipeline_start = clock.now();

    let start = clock.now();
    let decoded = Pipeline::new(source, config.clone()).decode()?;
    let decode = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Decode {
            input_bytes: decoded.source_len(),
            size: Dimensions::of(decoded.image()),
        },
    };

    let start = clock.now();
    let isolated = decoded.remove_background(remover)?;
    let background = isolated.applied().then(|| StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Background {
            transparent_pixels: transparent_pixels(isolated.image()),
        },
    });

    let start = clock.now();
    let thresholded = isolated.threshold();
    let counts = thresholded.counts();
    let threshold = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Threshold {
            cleared: counts.cleared,
            made_opaque: counts.made_opaque,
        },
    };

    let start = clock.now();
    let trimmed = thresholded.trim()?;
    let trim_elapsed = clock.elapsed(&start);
    let trim = trimmed.bounds().map(|bounds| StageDiagnostics {
        duration: trim_elapsed,
        metrics: StageMetrics::Trim { bounds },
    });

    let start = clock.now();
    let composited = trimmed.composite()?;
    let composite = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Composite {
            target: composited.target(),
            inner: composited.inner(),
        },
    };

    let start = clock.now();
    let posterized = composited.posterize();
    let posterize = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Posterize {
            color_reduction: config.color_reduction,
        },
    };

    let start = clock.now();
    let cleaned = posterized.cleanup();
    let cleanup = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Cleanup {
            transparent_pixels: transparent_pixels(cleaned.image()),
        },
    };

    let start = clock.now();
    let outlined = cleaned.outline();
    let outline_elapsed = clock.elapsed(&start);
    let outline = outlined.painted().map(|painted| StageDiagnostics {
        duration: outline_elapsed,
        metrics: StageMetrics::Outline { painted },
    });

    let start = clock.now();
    let rescaled = outlined.rescale()?;
    let rescale = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Rescale {
            scale: config.scale,
            size: Dimensions::of(rescaled.image()),
        },
    };

    let start = clock.now();
    let cropped = rescaled.crop()?;
    let crop_elapsed = clock.elapsed(&start);
    let crop = config
        .crop
        .filter(|_| cropped.applied())
        .map(|crop| StageDiagnostics {
            duration: crop_elapsed,
            metrics: StageMetrics::Crop { crop },
        });

    let start = clock.now();
    let reduced = cropped.reduce_palette();
    let palette = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Palette {
            colors: reduced.indexed().palette.len(),
            method: reduced.method(),
        },
    };

    let total_duration = clock.elapsed(&pipeline_start);

    Ok((
        reduced.into_result(),
        PipelineDiagnostics {
            decode,
            background,
            threshold,
            trim,
            composite,
            posterize,
            cleanup,
            outline,
            rescale,
            crop,
            palette,
            total_duration,
        },
    ))
}
