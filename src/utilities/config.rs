//! Engine configuration.
//!
//! Every section falls back to its defaults, so an empty document (or no
//! file at all) yields the stock engine: 12-point budget, 600 ms
//! animation, 200x200 chart.
//!
//! ```yaml
//! points:
//!   budget: 11
//! projector:
//!   base_radius: 96.0
//! animation:
//!   duration_ms: 450
//! ```
//!
//! Environment overrides are applied after the file:
//!
//! | Variable               | Field                   |
//! |------------------------|-------------------------|
//! | `PERSONA_POINT_BUDGET` | `points.budget`         |
//! | `PERSONA_ANIMATION_MS` | `animation.duration_ms` |

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::persona::animator::AnimationConfig;
use crate::persona::archetype::ClassifierThresholds;
use crate::persona::points::PointRules;
use crate::persona::projection::ProjectorConfig;
use crate::utilities::errors::{PersonaError, Result};

pub const ENV_POINT_BUDGET: &str = "PERSONA_POINT_BUDGET";
pub const ENV_ANIMATION_MS: &str = "PERSONA_ANIMATION_MS";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub points: PointRules,
    #[serde(default)]
    pub projector: ProjectorConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub classifier: ClassifierThresholds,
}

impl EngineConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: EngineConfig = if yaml.trim().is_empty() {
            EngineConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        log::info!("loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Apply `PERSONA_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable lookup, then revalidate.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(budget) = parse_override::<u8, _>(&lookup, ENV_POINT_BUDGET)? {
            self.points.budget = budget;
        }
        if let Some(ms) = parse_override::<u64, _>(&lookup, ENV_ANIMATION_MS)? {
            self.animation.duration_ms = ms;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        self.points.validate()?;
        self.projector.validate()?;
        self.animation.validate()?;
        self.classifier.validate()?;
        Ok(())
    }
}

fn parse_override<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            PersonaError::Config(format!("{} has invalid value {:?}", name, raw))
        }),
    }
}
