use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context as _;

use crate::{
    foundation::core::Rgba8,
    foundation::error::{InkgridError, InkgridResult},
    palette::Palette,
    scheduler::{BoostSpec, DEFAULT_TARGET_FPS},
    structures::DEFAULT_ATTEMPTS,
    surface::LineStyle,
};

/// Tunables for a grid background. Every field has a default, so a JSON file only needs
/// the keys it overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub cell_size: f64,
    pub attempts: u32,
    pub target_fps: f64,
    pub palette: Palette,
    pub background: Rgba8,
    pub grid_line: LineStyle,
    pub start_delay_ms: f64,
    pub reduced_motion_coverage: f64, // fraction of the queue drawn without motion
    pub pause_threshold: f64,         // gate pauses only past this fraction
    pub scroll_boost: BoostSpec,
    pub hover_boost: BoostSpec,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 32.0,
            attempts: DEFAULT_ATTEMPTS,
            target_fps: DEFAULT_TARGET_FPS,
            palette: Palette::journal(),
            background: Rgba8::rgb(0xed, 0xe6, 0xd6),
            grid_line: LineStyle::default(),
            start_delay_ms: 400.0,
            reduced_motion_coverage: 0.6,
            pause_threshold: 0.5,
            scroll_boost: BoostSpec {
                multiplier: 1.5,
                duration_ms: Some(500.0),
            },
            hover_boost: BoostSpec {
                multiplier: 1.3,
                duration_ms: None,
            },
        }
    }
}

impl GridConfig {
    pub fn from_json_str(s: &str) -> InkgridResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> InkgridResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> InkgridResult<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(InkgridError::validation("cell_size must be finite and > 0"));
        }
        if !(self.target_fps.is_finite() && self.target_fps > 0.0) {
            return Err(InkgridError::validation("target_fps must be finite and > 0"));
        }
        if self.palette.is_empty() {
            return Err(InkgridError::validation(
                "palette must contain at least one color",
            ));
        }
        if !(self.start_delay_ms.is_finite() && self.start_delay_ms >= 0.0) {
            return Err(InkgridError::validation(
                "start_delay_ms must be finite and >= 0",
            ));
        }
        for (name, v) in [
            ("reduced_motion_coverage", self.reduced_motion_coverage),
            ("pause_threshold", self.pause_threshold),
            ("grid_line.alpha", self.grid_line.alpha),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(InkgridError::validation(format!("{name} must be in [0, 1]")));
            }
        }
        if !(self.grid_line.width.is_finite() && self.grid_line.width >= 0.0) {
            return Err(InkgridError::validation(
                "grid_line.width must be finite and >= 0",
            ));
        }
        for (name, boost) in [
            ("scroll_boost", self.scroll_boost),
            ("hover_boost", self.hover_boost),
        ] {
            if !(boost.multiplier.is_finite() && boost.multiplier > 0.0) {
                return Err(InkgridError::validation(format!(
                    "{name}.multiplier must be finite and > 0"
                )));
            }
            if let Some(d) = boost.duration_ms
                && !(d.is_finite() && d >= 0.0)
            {
                return Err(InkgridError::validation(format!(
                    "{name}.duration_ms must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }
}
