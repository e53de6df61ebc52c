//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/forestviz/forestviz.toml`
//! 3. Explicit config file passed with `--config`
//! 4. Environment variables: `FORESTVIZ__SECTION__KEY`

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, DemoOptions, Timing};
use crate::domain::builder::MAX_LEAVES;
use crate::domain::Canvas;

/// Prefix of environment overrides, e.g. `FORESTVIZ__DEMO__AUTO_MAX_LEAVES`.
pub const ENV_PREFIX: &str = "FORESTVIZ";

/// Timing and limits of the interactive demo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DemoSettings {
    /// Minimum visible duration of a manual add/remove
    pub transition_delay_ms: u64,
    /// Period between auto-sequence steps
    pub auto_interval_ms: u64,
    /// Auto-sequence stops after this many leaves
    pub auto_max_leaves: usize,
    /// Leaf count shown on start
    pub initial_leaves: usize,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            transition_delay_ms: 300,
            auto_interval_ms: 1000,
            auto_max_leaves: 8,
            initial_leaves: 4,
        }
    }
}

impl DemoSettings {
    pub fn timing(&self) -> Timing {
        Timing {
            transition_delay: Duration::from_millis(self.transition_delay_ms),
            auto_interval: Duration::from_millis(self.auto_interval_ms),
        }
    }

    pub fn options(&self) -> DemoOptions {
        DemoOptions {
            initial_leaves: self.initial_leaves,
            auto_max_leaves: self.auto_max_leaves,
        }
    }
}

/// Raw canvas for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawCanvas {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub level_height: Option<f64>,
    pub node_spacing: Option<f64>,
    pub margin: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDemoSettings {
    pub transition_delay_ms: Option<u64>,
    pub auto_interval_ms: Option<u64>,
    pub auto_max_leaves: Option<usize>,
    pub initial_leaves: Option<usize>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub layout: RawCanvas,
    pub demo: RawDemoSettings,
}

/// Unified configuration for forestviz.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Canvas geometry used by the layout engine and the SVG renderer
    pub layout: Canvas,
    /// Demo timing and limits
    pub demo: DemoSettings,
}

/// Get the XDG config directory for forestviz.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "forestviz").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("forestviz.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    parse_raw_settings(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn parse_raw_settings(content: &str) -> Result<RawSettings, toml::de::Error> {
    toml::from_str(content)
}

impl Settings {
    /// Overlay specified fields onto self; unspecified fields keep their value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let (layout, demo) = (&overlay.layout, &overlay.demo);
        Self {
            layout: Canvas {
                width: layout.width.unwrap_or(self.layout.width),
                height: layout.height.unwrap_or(self.layout.height),
                level_height: layout.level_height.unwrap_or(self.layout.level_height),
                node_spacing: layout.node_spacing.unwrap_or(self.layout.node_spacing),
                margin: layout.margin.unwrap_or(self.layout.margin),
            },
            demo: DemoSettings {
                transition_delay_ms: demo
                    .transition_delay_ms
                    .unwrap_or(self.demo.transition_delay_ms),
                auto_interval_ms: demo.auto_interval_ms.unwrap_or(self.demo.auto_interval_ms),
                auto_max_leaves: demo.auto_max_leaves.unwrap_or(self.demo.auto_max_leaves),
                initial_leaves: demo.initial_leaves.unwrap_or(self.demo.initial_leaves),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Config file given on the command line; must exist
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/forestviz/forestviz.toml` (if present)
    /// 3. Explicit config file
    /// 4. Environment variables: `FORESTVIZ__*`
    ///
    /// The merged result is validated before it is returned.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|path| path.exists());
        let current = Self::load_files(global.as_deref(), explicit)?;
        let current = Self::apply_env_overrides(current, Environment::with_prefix(ENV_PREFIX))?;
        current.validate()?;
        Ok(current)
    }

    /// Defaults overlaid with the given files, in order. No env, no validation.
    pub fn load_files(
        global: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = global {
            current = current.merge_with(&load_raw_settings(path)?);
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            current = current.merge_with(&load_raw_settings(path)?);
        }

        Ok(current)
    }

    /// Apply environment variables as explicit overrides.
    ///
    /// `source` is normally `Environment::with_prefix(ENV_PREFIX)`; tests pass
    /// a fixed map instead of the process environment.
    pub fn apply_env_overrides(
        mut settings: Self,
        source: Environment,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(source.separator("__"))
            .build()
            .map_err(config_err)?;

        let layout = &mut settings.layout;
        for (key, field) in [
            ("layout.width", &mut layout.width),
            ("layout.height", &mut layout.height),
            ("layout.level_height", &mut layout.level_height),
            ("layout.node_spacing", &mut layout.node_spacing),
            ("layout.margin", &mut layout.margin),
        ] {
            if let Some(val) = optional(config.get_float(key))? {
                *field = val;
            }
        }

        let demo = &mut settings.demo;
        for (key, field) in [
            ("demo.transition_delay_ms", &mut demo.transition_delay_ms),
            ("demo.auto_interval_ms", &mut demo.auto_interval_ms),
        ] {
            if let Some(val) = optional(config.get::<u64>(key))? {
                *field = val;
            }
        }
        for (key, field) in [
            ("demo.auto_max_leaves", &mut demo.auto_max_leaves),
            ("demo.initial_leaves", &mut demo.initial_leaves),
        ] {
            if let Some(val) = optional(config.get::<usize>(key))? {
                *field = val;
            }
        }

        Ok(settings)
    }

    /// Reject settings the demo cannot run with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        self.layout.validate()?;
        if self.demo.auto_max_leaves == 0 {
            return Err(ApplicationError::Config {
                message: "demo.auto_max_leaves must be at least 1".into(),
            });
        }
        for (key, count) in [
            ("demo.auto_max_leaves", self.demo.auto_max_leaves),
            ("demo.initial_leaves", self.demo.initial_leaves),
        ] {
            if count > MAX_LEAVES {
                return Err(ApplicationError::Config {
                    message: format!("{key} must be at most {MAX_LEAVES}"),
                });
            }
        }
        if self.demo.auto_interval_ms == 0 {
            return Err(ApplicationError::Config {
                message: "demo.auto_interval_ms must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# forestviz configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/forestviz/forestviz.toml
#   File:   forestviz --config <FILE>
#   Env:    FORESTVIZ__SECTION__KEY, e.g. FORESTVIZ__DEMO__AUTO_MAX_LEAVES=16

[layout]
# Drawing extent in pixels
# width = 800.0
# height = 400.0

# Vertical distance between levels
# level_height = 60.0

# Preferred horizontal distance between neighbours (shrinks to fit)
# node_spacing = 80.0

# Distance nodes keep from every edge
# margin = 40.0

[demo]
# Minimum visible duration of a manual add/remove
# transition_delay_ms = 300

# Period between auto-sequence steps
# auto_interval_ms = 1000

# Auto-sequence builds 1, 2, ... up to this many leaves
# auto_max_leaves = 8

# Leaf count shown when a session starts
# initial_leaves = 4
"#
        .to_string()
    }
}

/// Missing keys are `None`; present but malformed values are errors.
fn optional<T>(result: Result<T, ConfigError>) -> Result<Option<T>, ApplicationError> {
    match result {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
