//! Configuration loading.

use crate::{ConfigError, RfqConfig};
use std::path::{Path, PathBuf};
use tracing::info;

/// Loads configuration from a TOML file.
///
/// `${VAR}` references anywhere in the file are substituted from the
/// environment before parsing, so secrets like API keys stay out of the
/// file itself.
pub struct ConfigLoader {
	path: Option<PathBuf>,
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self { path: None }
	}

	pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
		self.path = Some(path.as_ref().to_path_buf());
		self
	}

	pub async fn load(self) -> Result<RfqConfig, ConfigError> {
		let path = self
			.path
			.ok_or_else(|| ConfigError::Validation("no config file path provided".into()))?;

		let raw = match tokio::fs::read_to_string(&path).await {
			Ok(raw) => raw,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(ConfigError::FileNotFound(path.display().to_string()));
			}
			Err(e) => return Err(ConfigError::Io(e)),
		};

		let substituted = substitute_env_vars(&raw)?;
		let config: RfqConfig =
			toml::from_str(&substituted).map_err(|e| ConfigError::Parse(e.to_string()))?;
		config.validate()?;

		info!(
			exchange = %config.exchange.name,
			network_id = config.exchange.network_id,
			"configuration loaded"
		);
		Ok(config)
	}
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

/// Replaces every `${VAR}` occurrence with the environment value.
fn substitute_env_vars(raw: &str) -> Result<String, ConfigError> {
	let mut out = String::with_capacity(raw.len());
	let mut rest = raw;
	while let Some(start) = rest.find("${") {
		out.push_str(&rest[..start]);
		let after = &rest[start + 2..];
		let end = after
			.find('}')
			.ok_or_else(|| ConfigError::Parse("unterminated ${ reference".into()))?;
		let name = &after[..end];
		let value =
			std::env::var(name).map_err(|_| ConfigError::EnvVarNotFound(name.to_string()))?;
		out.push_str(&value);
		rest = &after[end + 1..];
	}
	out.push_str(rest);
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn substitutes_environment_references() {
		std::env::set_var("RFQ_TEST_KEY", "secret");
		let out = substitute_env_vars("api_key = \"${RFQ_TEST_KEY}\"").unwrap();
		assert_eq!(out, "api_key = \"secret\"");
	}

	#[test]
	fn missing_variables_are_errors() {
		let err = substitute_env_vars("key = \"${RFQ_TEST_UNSET_VAR}\"").unwrap_err();
		assert!(matches!(err, ConfigError::EnvVarNotFound(_)));
	}

	#[test]
	fn plain_files_pass_through() {
		let raw = "name = \"rfqx\"";
		assert_eq!(substitute_env_vars(raw).unwrap(), raw);
	}

	#[test]
	fn parses_a_minimal_file() {
		let raw = r#"
			[exchange]
			name = "rfqx"
			network_id = 43114
			approved_takers = ["0xdef171fe48cf0115b1d80b88dc8eab59176fee57"]

			[maker_api]
			base_url = "https://rfq.example.com/api"
		"#;
		let config: RfqConfig = toml::from_str(raw).unwrap();
		assert!(config.validate().is_ok());
		assert_eq!(config.maker_api.timeout_ms, 150);
		assert_eq!(config.cache.levels_ttl_secs, 30);
	}
}
