//! XML configuration support.
//! - Loads settings from config.xml (quick_xml).
//! - `$VERIFY_MOVE_CONFIG` picks the file; otherwise the per-OS default path.
//! - A missing file means defaults. Anything unparsable, including unknown
//!   elements, is a hard config error so typos do not silently fall back.
//!
//! Example:
//! ```xml
//! <config>
//!   <log_level>info</log_level>
//!   <log_file>/var/log/verify_move.log</log_file>
//!   <retry_interval_seconds>10</retry_interval_seconds>
//!   <failure_backoff_seconds>5</failure_backoff_seconds>
//!   <tick_millis>50</tick_millis>
//!   <plain_snapshot_seconds>5</plain_snapshot_seconds>
//!   <preserve_metadata>true</preserve_metadata>
//! </config>
//! ```

use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::paths::resolve_config_path;
use super::types::{Config, LogLevel};
use crate::errors::MoveError;

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(rename = "log_level")]
    log_level: Option<String>,
    #[serde(rename = "log_file")]
    log_file: Option<String>,
    #[serde(rename = "retry_interval_seconds", default, deserialize_with = "de_u64_trimmed_opt")]
    retry_interval_seconds: Option<u64>,
    #[serde(rename = "failure_backoff_seconds", default, deserialize_with = "de_u64_trimmed_opt")]
    failure_backoff_seconds: Option<u64>,
    #[serde(rename = "tick_millis", default, deserialize_with = "de_u64_trimmed_opt")]
    tick_millis: Option<u64>,
    #[serde(rename = "plain_snapshot_seconds", default, deserialize_with = "de_u64_trimmed_opt")]
    plain_snapshot_seconds: Option<u64>,
    #[serde(rename = "preserve_metadata", default, deserialize_with = "de_bool_trimmed_opt")]
    preserve_metadata: Option<bool>,
}

// Numbers may be padded with whitespace; a non-number is an error.
fn de_u64_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<u64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected a whole number, got '{s}'"))),
    }
}

fn de_bool_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(Some(true)),
            "false" | "no" | "0" => Ok(Some(false)),
            _ => Err(serde::de::Error::custom(format!("expected true or false, got '{s}'"))),
        },
    }
}

fn config_error(path: &Path, message: impl Into<String>) -> MoveError {
    MoveError::Config {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

// Map XmlConfig -> Config over defaults.
fn xml_to_config(parsed: XmlConfig, path: &Path) -> Result<Config, MoveError> {
    let mut cfg = Config::default();

    if let Some(s) = parsed.log_level.as_deref() {
        cfg.log_level = s.trim().parse::<LogLevel>().map_err(|e| config_error(path, e))?;
    }
    if let Some(s) = parsed.log_file.as_deref() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            cfg.log_file = Some(PathBuf::from(trimmed));
        }
    }
    if let Some(secs) = parsed.retry_interval_seconds {
        cfg.retry_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = parsed.failure_backoff_seconds {
        cfg.failure_backoff = Duration::from_secs(secs);
    }
    if let Some(ms) = parsed.tick_millis {
        if ms == 0 {
            return Err(config_error(path, "tick_millis must be greater than 0"));
        }
        cfg.tick_interval = Duration::from_millis(ms);
    }
    if let Some(secs) = parsed.plain_snapshot_seconds {
        cfg.plain_every = Duration::from_secs(secs);
    }
    if let Some(b) = parsed.preserve_metadata {
        cfg.preserve_metadata = b;
    }
    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config, MoveError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| config_error(path, format!("cannot read: {e}")))?;
    // An empty file carries no settings.
    let parsed: XmlConfig = if contents.trim().is_empty() {
        XmlConfig::default()
    } else {
        from_xml_str(&contents).map_err(|e| config_error(path, e.to_string()))?
    };
    xml_to_config(parsed, path)
}

/// Load the effective file config: env override or default path, defaults
/// when the file does not exist.
pub fn load_config() -> Result<Config, MoveError> {
    let Some(path) = resolve_config_path() else {
        debug!("No config directory on this platform; using defaults");
        return Ok(Config::default());
    };
    if !path.exists() {
        debug!(path = %path.display(), "No config file; using defaults");
        return Ok(Config::default());
    }
    if path.is_dir() {
        return Err(config_error(&path, "is a directory, expected an XML file"));
    }
    debug!(path = %path.display(), "Loading config");
    load_config_from_xml_path(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn reads_all_fields() {
        let f = write_tmp(
            "<config>\n  <log_level> debug </log_level>\n  <log_file>/tmp/vm.log</log_file>\n  \
             <retry_interval_seconds> 10 </retry_interval_seconds>\n  \
             <failure_backoff_seconds>2</failure_backoff_seconds>\n  <tick_millis>100</tick_millis>\n  \
             <plain_snapshot_seconds>30</plain_snapshot_seconds>\n  \
             <preserve_metadata>false</preserve_metadata>\n</config>\n",
        );
        let cfg = load_config_from_xml_path(f.path()).unwrap();
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert_eq!(cfg.log_file, Some(PathBuf::from("/tmp/vm.log")));
        assert_eq!(cfg.retry_interval, Duration::from_secs(10));
        assert_eq!(cfg.failure_backoff, Duration::from_secs(2));
        assert_eq!(cfg.tick_interval, Duration::from_millis(100));
        assert_eq!(cfg.plain_every, Duration::from_secs(30));
        assert!(!cfg.preserve_metadata);
    }

    #[test]
    fn missing_elements_keep_defaults() {
        let f = write_tmp("<config><log_file>  </log_file></config>");
        let cfg = load_config_from_xml_path(f.path()).unwrap();
        assert_eq!(cfg.log_file, None);
        assert_eq!(cfg.retry_interval, Duration::from_secs(5));
        assert!(cfg.preserve_metadata);
    }

    #[test]
    fn unknown_element_is_an_error() {
        let f = write_tmp("<config><retry_secs>3</retry_secs></config>");
        let err = load_config_from_xml_path(f.path()).unwrap_err();
        assert!(matches!(err, MoveError::Config { .. }));
        assert_eq!(err.code(), 2);
    }

    #[test]
    fn bad_values_are_errors() {
        for body in [
            "<config><tick_millis>fast</tick_millis></config>",
            "<config><tick_millis>0</tick_millis></config>",
            "<config><log_level>loud</log_level></config>",
            "<config><preserve_metadata>maybe</preserve_metadata></config>",
        ] {
            let f = write_tmp(body);
            assert!(load_config_from_xml_path(f.path()).is_err(), "{body}");
        }
    }
}
