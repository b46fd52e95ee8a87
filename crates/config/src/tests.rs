use std::io::Write;

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn empty_input_yields_defaults() {
	let config = Config::from_toml_str("").unwrap();
	assert_eq!(config, Config::default());
	assert_eq!(config.search.debounce(), Duration::from_millis(300));
	assert_eq!(config.search.key_strategy, KeyStrategy::PerBox);
}

#[test]
fn partial_sections_keep_other_defaults() {
	let config = Config::from_toml_str(
		r#"
[search]
debounce_ms = 150
key_strategy = "per-query"

[resolver]
min_threshold = 0.6
"#,
	)
	.unwrap();

	assert_eq!(config.search.debounce_ms, 150);
	assert_eq!(config.search.key_strategy, KeyStrategy::PerQuery);
	assert_eq!(config.search.min_query_chars, 2);
	assert_eq!(config.resolver.min_threshold, 0.6);
	assert_eq!(config.resolver.accept_threshold, 0.92);
}

#[test]
fn unknown_fields_are_rejected() {
	let err = Config::from_toml_str("[search]\ndebounce = 10\n").unwrap_err();
	assert!(matches!(err, ConfigError::Toml(_)), "got {err:?}");
}

#[test]
fn thresholds_out_of_range_are_invalid() {
	let err = Config::from_toml_str("[resolver]\naccept_threshold = 1.5\n").unwrap_err();
	assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("accept_threshold")), "got {err:?}");
}

#[test]
fn min_above_accept_is_invalid() {
	let err = Config::from_toml_str("[resolver]\naccept_threshold = 0.7\nmin_threshold = 0.8\n").unwrap_err();
	assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn zero_limits_are_invalid() {
	assert!(Config::from_toml_str("[search]\nsuggestion_limit = 0\n").is_err());
	assert!(Config::from_toml_str("[resolver]\nper_provider_limit = 0\n").is_err());
	assert!(Config::from_toml_str("[search]\ndebounce_ms = 60000\n").is_err());
}

#[test]
fn load_reads_explicit_file() {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	writeln!(file, "[search]\nsuggestion_limit = 3").unwrap();

	let config = Config::load(Some(file.path())).unwrap();
	assert_eq!(config.search.suggestion_limit, 3);
}

#[test]
fn load_missing_explicit_file_is_an_error() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("absent.toml");

	let err = Config::load(Some(&path)).unwrap_err();
	assert!(matches!(err, ConfigError::Io { path: ref p, .. } if p == &path), "got {err:?}");
}
