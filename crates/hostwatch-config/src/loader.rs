//! Configuration loading

use crate::{Config, ConfigFormat};
use hostwatch_core::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::env;
use std::fs;
use std::path::Path;

static ENV_VAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(:-([^}]*))?\}").expect("env var pattern is valid")
});

/// Load configuration from a file
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {e}", path.display()))
    })?;

    let format = ConfigFormat::from_path(path)?;

    load_from_str(&content, format)
}

/// Expand environment variables in configuration text.
/// Supports `${VAR}` and `${VAR:-default}`.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut last_match = 0;

    for cap in ENV_VAR.captures_iter(content) {
        let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let var_name = var_name.as_str();
        let default_value = cap.get(3).map(|m| m.as_str());

        let value = match (env::var(var_name), default_value) {
            (Ok(val), _) => val,
            (Err(_), Some(default)) => default.to_string(),
            (Err(_), None) => {
                return Err(Error::Config(format!(
                    "Environment variable '{var_name}' not set and no default provided"
                )));
            }
        };

        result.push_str(&content[last_match..full_match.start()]);
        result.push_str(&value);
        last_match = full_match.end();
    }

    result.push_str(&content[last_match..]);

    Ok(result)
}

/// Load configuration from a string
pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<Config> {
    let expanded_content = expand_env_vars(content)?;

    let config = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse YAML: {e}")))?,
        ConfigFormat::Toml => toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {e}")))?,
        ConfigFormat::Json => serde_json::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse JSON: {e}")))?,
    };

    Ok(config)
}

/// Load and validate configuration
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let config = load_from_file(path)?;
    crate::validator::validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostwatch_core::CheckKind;
    use std::io::Write;
    use std::time::Duration;

    const YAML_CONFIG: &str = r#"
hosts: ["example.com", "10.0.0.1"]
response_timeout: 2s
max_threads: 8
report:
  url: "http://collector:8080/report"
checks:
  icmp:
    interval: 5s
  tcp:
    interval: 300ms
  trace:
    enabled: false
observability:
  logging:
    level: "debug"
    format: "json"
"#;

    #[test]
    fn test_load_yaml() {
        let config = load_from_str(YAML_CONFIG, ConfigFormat::Yaml).unwrap();

        assert_eq!(config.hosts.len(), 2);
        assert_eq!(config.response_timeout, Duration::from_secs(2));
        assert_eq!(config.max_threads.get(), 8);
        assert_eq!(config.checks.tcp.interval, Duration::from_millis(300));
        assert_eq!(config.enabled_checks(), vec![CheckKind::Icmp, CheckKind::Tcp]);
    }

    #[test]
    fn test_load_toml() {
        let toml = r#"
hosts = "a;b;c"

[report]
url = "collector:9000"
timeout = "1s"

[checks.icmp]
interval = "10s"
"#;
        let config = load_from_str(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(config.hosts.as_slice(), ["a", "b", "c"]);
        assert_eq!(config.report.timeout, Duration::from_secs(1));
        assert_eq!(config.checks.icmp.interval, Duration::from_secs(10));
    }

    #[test]
    fn test_load_json() {
        let json = r#"{"hosts": ["h1"], "report": {"url": "c:1"}, "max_threads": "x"}"#;
        let config = load_from_str(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.hosts.as_slice(), ["h1"]);
        assert_eq!(config.max_threads.get(), crate::DEFAULT_MAX_THREADS);
    }

    #[test]
    fn test_invalid_yaml() {
        let invalid = "hosts: [yaml";
        let result = load_from_str(invalid, ConfigFormat::Yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        env::set_var("HOSTWATCH_TEST_COLLECTOR", "collector.internal:8080");

        let config = load_from_str(
            "hosts: [a]\nreport:\n  url: \"http://${HOSTWATCH_TEST_COLLECTOR}/report\"\n",
            ConfigFormat::Yaml,
        )
        .unwrap();
        assert_eq!(config.report.url, "http://collector.internal:8080/report");

        env::remove_var("HOSTWATCH_TEST_COLLECTOR");
    }

    #[test]
    fn test_env_var_with_default() {
        env::remove_var("HOSTWATCH_UNDEFINED_VAR");

        let config = load_from_str(
            "hosts: \"${HOSTWATCH_UNDEFINED_VAR:-a;b}\"\n",
            ConfigFormat::Yaml,
        )
        .unwrap();
        assert_eq!(config.hosts.as_slice(), ["a", "b"]);
    }

    #[test]
    fn test_missing_env_var_no_default() {
        env::remove_var("HOSTWATCH_MISSING_VAR");

        let result = load_from_str("hosts: \"${HOSTWATCH_MISSING_VAR}\"\n", ConfigFormat::Yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("HOSTWATCH_MISSING_VAR"));
    }

    #[test]
    fn test_multiple_env_vars() {
        env::set_var("HOSTWATCH_HOST", "localhost");
        env::set_var("HOSTWATCH_PORT", "5432");

        let expanded = expand_env_vars("http://${HOSTWATCH_HOST}:${HOSTWATCH_PORT}/r").unwrap();
        assert_eq!(expanded, "http://localhost:5432/r");

        env::remove_var("HOSTWATCH_HOST");
        env::remove_var("HOSTWATCH_PORT");
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(YAML_CONFIG.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.report.url, "http://collector:8080/report");
    }

    #[test]
    fn test_load_config_validates() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(b"hosts: [a]\n").unwrap();

        let result = load_config(file.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().is_fatal());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_from_file("/nonexistent/hostwatch.yaml");
        assert!(result.is_err());
    }
}
