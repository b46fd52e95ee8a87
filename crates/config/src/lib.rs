//! Configuration for starlog search surfaces.
//!
//! Configuration is written in TOML. Every field has a default, so an empty
//! or missing file is valid.
//!
//! # Configuration Files
//!
//! Starlog looks for `$XDG_CONFIG_HOME/starlog/config.toml` (or
//! `~/.config/starlog/config.toml`) unless a path is given explicitly.
//!
//! ```toml
//! [search]
//! debounce_ms = 300
//! min_query_chars = 2
//! suggestion_limit = 8
//! key_strategy = "per-box"
//!
//! [resolver]
//! accept_threshold = 0.92
//! min_threshold = 0.75
//! per_provider_limit = 10
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

mod error;

pub use error::{ConfigError, Result};

/// Upper bound for `search.debounce_ms`.
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Autocomplete input settings.
	pub search: SearchConfig,
	/// Digital copy resolution settings.
	pub resolver: ResolverConfig,
}

/// How an autocomplete input derives its debounce key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyStrategy {
	/// One key per input box: every keystroke supersedes the previous search.
	#[default]
	PerBox,
	/// One key per box and query text: only repeats of the same query collapse.
	PerQuery,
}

/// Autocomplete input settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
	/// Quiet period before a lookup fires, in milliseconds.
	pub debounce_ms: u64,
	/// Queries shorter than this (after trimming) clear suggestions instead of searching.
	pub min_query_chars: usize,
	/// Maximum suggestions requested from a provider.
	pub suggestion_limit: usize,
	pub key_strategy: KeyStrategy,
}

impl Default for SearchConfig {
	fn default() -> Self {
		Self {
			debounce_ms: 300,
			min_query_chars: 2,
			suggestion_limit: 8,
			key_strategy: KeyStrategy::PerBox,
		}
	}
}

impl SearchConfig {
	/// Returns the debounce window.
	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}
}

/// Digital copy resolution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
	/// Score at which a candidate is accepted without asking further providers.
	pub accept_threshold: f64,
	/// Minimum score for the best candidate to count as a match.
	pub min_threshold: f64,
	/// Candidates requested from each provider.
	pub per_provider_limit: usize,
}

impl Default for ResolverConfig {
	fn default() -> Self {
		Self {
			accept_threshold: 0.92,
			min_threshold: 0.75,
			per_provider_limit: 10,
		}
	}
}

impl Config {
	/// Returns the default config file location, if a config directory exists.
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join("starlog").join("config.toml"))
	}

	/// Parses and validates configuration from TOML text.
	pub fn from_toml_str(input: &str) -> Result<Self> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Loads configuration from `path`, or from [`Self::default_path`].
	///
	/// An explicit path must exist. A missing default file yields defaults.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		let (path, explicit) = match path {
			Some(path) => (path.to_path_buf(), true),
			None => match Self::default_path() {
				Some(path) => (path, false),
				None => return Ok(Self::default()),
			},
		};

		match std::fs::read_to_string(&path) {
			Ok(text) => Self::from_toml_str(&text),
			Err(error) if !explicit && error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
			Err(error) => Err(ConfigError::Io { path, error }),
		}
	}

	/// Checks ranges and cross-field consistency.
	pub fn validate(&self) -> Result<()> {
		let search = &self.search;
		if search.debounce_ms > MAX_DEBOUNCE_MS {
			return Err(ConfigError::Invalid(format!("search.debounce_ms must be at most {MAX_DEBOUNCE_MS}, got {}", search.debounce_ms)));
		}
		if search.suggestion_limit == 0 {
			return Err(ConfigError::Invalid("search.suggestion_limit must be greater than 0".into()));
		}

		let resolver = &self.resolver;
		for (name, value) in [("accept_threshold", resolver.accept_threshold), ("min_threshold", resolver.min_threshold)] {
			if !(0.0..=1.0).contains(&value) {
				return Err(ConfigError::Invalid(format!("resolver.{name} must be within 0.0..=1.0, got {value}")));
			}
		}
		if resolver.min_threshold > resolver.accept_threshold {
			return Err(ConfigError::Invalid(format!(
				"resolver.min_threshold ({}) exceeds resolver.accept_threshold ({})",
				resolver.min_threshold, resolver.accept_threshold
			)));
		}
		if resolver.per_provider_limit == 0 {
			return Err(ConfigError::Invalid("resolver.per_provider_limit must be greater than 0".into()));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests;
