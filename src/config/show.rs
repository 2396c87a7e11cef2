use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{KineticaError, KineticaResult};
use crate::scenes::bouncing::BouncingConfig;
use crate::scenes::hex_grid::HexGridConfig;
use crate::timing::bus::TimingBand;

/// Show-wide settings, loaded from JSON.
///
/// Every field is optional in the file; missing fields take their defaults. Unknown
/// fields are rejected so typos surface early.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShowConfig {
    pub canvas: Canvas,
    pub fps: Fps,
    /// Seed for every random choice a scene makes.
    pub seed: u64,
    pub background: Color,
    /// Timing bands, registered in order.
    pub timing: Vec<TimingBand>,
    /// Idle time on the selection screen before the first scene opens.
    pub auto_advance_ms: f64,
    pub bouncing: BouncingConfig,
    pub hex_grid: HexGridConfig,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: Fps::default(),
            seed: 0,
            background: Color(0x1a1a2e),
            timing: TimingBand::defaults(),
            auto_advance_ms: 5000.0,
            bouncing: BouncingConfig::default(),
            hex_grid: HexGridConfig::default(),
        }
    }
}

impl ShowConfig {
    /// Parse from a JSON string. Does not validate.
    pub fn from_json_str(s: &str) -> KineticaResult<Self> {
        serde_json::from_str(s).map_err(|e| KineticaError::serde(format!("parse show config: {e}")))
    }

    /// Parse from a JSON reader. Does not validate.
    pub fn from_reader<R: std::io::Read>(r: R) -> KineticaResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| KineticaError::serde(format!("parse show config: {e}")))
    }

    /// Load and validate a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> KineticaResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("open show config '{}'", path.display()))?;
        let cfg = Self::from_reader(BufReader::new(f))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json_pretty(&self) -> KineticaResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| KineticaError::serde(e.to_string()))
    }

    pub fn validate(&self) -> KineticaResult<()> {
        self.canvas.validate()?;
        self.fps.validate()?;
        positive("auto_advance_ms", self.auto_advance_ms, true)?;

        for (i, band) in self.timing.iter().enumerate() {
            if band.name.trim().is_empty() {
                return Err(KineticaError::validation(format!(
                    "timing[{i}] name must be non-empty"
                )));
            }
            positive(&format!("timing band \"{}\" interval_ms", band.name), band.interval_ms, false)?;
            if self.timing[..i].iter().any(|b| b.name == band.name) {
                return Err(KineticaError::validation(format!(
                    "timing band \"{}\" is declared twice",
                    band.name
                )));
            }
        }

        self.bouncing.validate()?;
        self.hex_grid.validate()?;
        Ok(())
    }
}

/// Require a finite value `> 0` (or `>= 0` when `allow_zero`).
pub(crate) fn positive(what: &str, v: f64, allow_zero: bool) -> KineticaResult<()> {
    let ok = v.is_finite() && (v > 0.0 || (allow_zero && v == 0.0));
    if ok {
        Ok(())
    } else {
        let bound = if allow_zero { ">= 0" } else { "> 0" };
        Err(KineticaError::validation(format!(
            "{what} must be finite and {bound}, got {v}"
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/show.rs"]
mod tests;
