//! User configuration loaded from TOML.
//!
//! Every section and key is optional; missing values fall back to defaults.
//!
//! ```toml
//! [parser]
//! print_title_page = true
//! print_notes = false
//! scene_numbers = "left"
//!
//! [preview]
//! synchronized_markup_and_preview = true
//! parenthetical_newline_helper = true
//!
//! [telemetry]
//! enabled = true
//! parse_sample_period = 5
//! ```

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use slugline_document::ParserConfig;
use tracing::debug;

/// File name inside the per-user config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Default telemetry sampling period for parse timings.
pub const DEFAULT_PARSE_SAMPLE_PERIOD: u32 = 5;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SluglineConfig {
	pub parser: ParserConfig,
	pub preview: PreviewConfig,
	pub telemetry: TelemetryConfig,
}

/// Preview and editing behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
	/// Scroll previews along when jumping to a line in the editor.
	pub synchronized_markup_and_preview: bool,
	/// Skip past the closing parenthesis when Enter is typed before it.
	pub parenthetical_newline_helper: bool,
}

impl Default for PreviewConfig {
	fn default() -> Self {
		Self {
			synchronized_markup_and_preview: true,
			parenthetical_newline_helper: true,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
	pub enabled: bool,
	/// Report parse timings once every this many reparses.
	pub parse_sample_period: u32,
}

impl Default for TelemetryConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			parse_sample_period: DEFAULT_PARSE_SAMPLE_PERIOD,
		}
	}
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read {}: {source}", path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("invalid config: {0}")]
	Toml(#[from] toml::de::Error),
	#[error("telemetry.parse_sample_period must be at least 1")]
	ZeroSamplePeriod,
}

impl SluglineConfig {
	/// `<config dir>/slugline/config.toml`, when the platform has a config dir.
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join("slugline").join(CONFIG_FILE))
	}

	pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(raw)?;
		config.validate()
	}

	/// Loads `path`; a missing file yields the defaults.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		match std::fs::read_to_string(path) {
			Ok(raw) => Self::from_toml_str(&raw),
			Err(err) if err.kind() == io::ErrorKind::NotFound => {
				debug!(path = %path.display(), "no config file, using defaults");
				Ok(Self::default())
			}
			Err(source) => Err(ConfigError::Read {
				path: path.to_path_buf(),
				source,
			}),
		}
	}

	fn validate(self) -> Result<Self, ConfigError> {
		if self.telemetry.parse_sample_period == 0 {
			return Err(ConfigError::ZeroSamplePeriod);
		}
		Ok(self)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use slugline_document::SceneNumbers;

	use super::*;

	#[test]
	fn empty_file_is_default() {
		assert_eq!(SluglineConfig::from_toml_str("").unwrap(), SluglineConfig::default());
	}

	#[test]
	fn partial_sections_keep_other_defaults() {
		let config = SluglineConfig::from_toml_str(
			r#"
[parser]
scene_numbers = "both"

[preview]
synchronized_markup_and_preview = false
"#,
		)
		.unwrap();

		assert_eq!(config.parser.scene_numbers, SceneNumbers::Both);
		assert!(config.parser.print_title_page);
		assert!(!config.preview.synchronized_markup_and_preview);
		assert!(config.preview.parenthetical_newline_helper);
		assert_eq!(config.telemetry, TelemetryConfig::default());
	}

	#[test]
	fn zero_sample_period_is_rejected() {
		let err = SluglineConfig::from_toml_str("[telemetry]\nparse_sample_period = 0\n").unwrap_err();
		assert!(matches!(err, ConfigError::ZeroSamplePeriod));
	}

	#[test]
	fn unknown_scene_number_mode_is_an_error() {
		let err = SluglineConfig::from_toml_str("[parser]\nscene_numbers = \"middle\"\n").unwrap_err();
		assert!(matches!(err, ConfigError::Toml(_)));
	}

	#[test]
	fn load_missing_file_and_real_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join(CONFIG_FILE);
		assert_eq!(SluglineConfig::load(&path).unwrap(), SluglineConfig::default());

		std::fs::write(&path, "[telemetry]\nenabled = false\n").unwrap();
		let config = SluglineConfig::load(&path).unwrap();
		assert!(!config.telemetry.enabled);
		assert_eq!(config.telemetry.parse_sample_period, DEFAULT_PARSE_SAMPLE_PERIOD);
	}
}
