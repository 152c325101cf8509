//! Configuration loading: layered defaults, files, and environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::Config;

/// Load configuration with the following precedence (highest last):
/// 1) compiled-in defaults
/// 2) `config.json` next to the executable
/// 3) `config.json` in the current working directory
/// 4) the file named by `PARLOUR_CONFIG_PATH`
/// 5) inline JSON in `PARLOUR_CONFIG_JSON`
/// 6) the plain aliases `PORT`, `DATABASE_URL`, `LOG_LEVEL`, `LOG_FORMAT`
/// 7) individual `PARLOUR__`-nested environment overrides (`__` separates
///    path segments, e.g. `PARLOUR__SERVER__PONG_WAIT_SECS=45`)
///
/// Errors while reading or parsing any layer are printed to stderr and that
/// layer is skipped; `load()` always returns a `Config`.
#[must_use]
pub fn load() -> Config {
    let defaults = Config::default();
    let mut merged = serde_json::to_value(&defaults).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            merge_file_source(&mut merged, &exe_dir.join("config.json"));
        }
    }
    merge_file_source(&mut merged, &PathBuf::from("config.json"));

    if let Ok(path) = std::env::var("PARLOUR_CONFIG_PATH") {
        merge_file_source(&mut merged, &PathBuf::from(path));
    }

    if let Ok(json) = std::env::var("PARLOUR_CONFIG_JSON") {
        if let Some(value) = parse_json_document(&json, "PARLOUR_CONFIG_JSON") {
            merge_values(&mut merged, value);
        }
    }

    apply_plain_aliases(&mut merged);
    apply_nested_overrides(&mut merged);

    match serde_json::from_value::<Config>(merged) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to deserialize config; using defaults: {err}");
            defaults
        }
    }
}

fn parse_json_document(raw: &str, label: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            eprintln!("Failed to parse config from {label}: {err}");
            None
        }
    }
}

fn merge_file_source(target: &mut Value, path: &Path) {
    if path.as_os_str().is_empty() || !path.exists() {
        return;
    }
    match fs::read_to_string(path) {
        Ok(contents) => {
            if let Some(value) = parse_json_document(&contents, &format!("file {}", path.display())) {
                merge_values(target, value);
            }
        }
        Err(err) => eprintln!("Failed to read config from {}: {err}", path.display()),
    }
}

/// Objects merge key-by-key; any other value (including arrays) overwrites
/// the target wholesale.
fn merge_values(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (target_slot, source_value) => *target_slot = source_value,
    }
}

/// The environment names listed in the external-interfaces section: plain,
/// un-prefixed aliases for the handful of settings an operator reaches for
/// first. These apply after file/inline-JSON layers but before the
/// exhaustive `PARLOUR__` overrides, which have the final word.
fn apply_plain_aliases(root: &mut Value) {
    if let Ok(port) = std::env::var("PORT") {
        if let Ok(port) = port.trim().parse::<u16>() {
            set_nested_value(root, &["port".to_string()], Value::from(port));
        }
    }
    if let Ok(database_url) = std::env::var("DATABASE_URL") {
        set_nested_value(root, &["database_url".to_string()], Value::String(database_url));
    }
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        set_nested_value(root, &["logging".to_string(), "level".to_string()], Value::String(level));
    }
    if let Ok(format) = std::env::var("LOG_FORMAT") {
        set_nested_value(root, &["logging".to_string(), "format".to_string()], Value::String(format));
    }
}

fn apply_nested_overrides(root: &mut Value) {
    for (key, raw_value) in std::env::vars() {
        let Some(stripped) = key.strip_prefix("PARLOUR__") else {
            continue;
        };
        let segments: Vec<String> =
            stripped.split("__").filter(|segment| !segment.is_empty()).map(str::to_ascii_lowercase).collect();
        if segments.is_empty() {
            continue;
        }
        set_nested_value(root, &segments, parse_env_value(&raw_value));
    }
}

fn parse_env_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::String(String::new());
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

fn set_nested_value(target: &mut Value, segments: &[String], value: Value) {
    if segments.len() == 1 {
        ensure_object(target).insert(segments[0].clone(), value);
        return;
    }
    let map = ensure_object(target);
    let entry = map.entry(segments[0].clone()).or_insert_with(|| Value::Object(serde_json::Map::new()));
    set_nested_value(entry, &segments[1..], value);
}

fn ensure_object(value: &mut Value) -> &mut serde_json::Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(serde_json::Map::new());
    }
    value.as_object_mut().expect("value was just coerced into an object")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_values_overlays_objects_key_by_key() {
        let mut target = serde_json::json!({"a": 1, "b": {"c": 2, "d": 3}});
        let source = serde_json::json!({"b": {"c": 99}});
        merge_values(&mut target, source);
        assert_eq!(target, serde_json::json!({"a": 1, "b": {"c": 99, "d": 3}}));
    }

    #[test]
    fn set_nested_value_creates_intermediate_objects() {
        let mut target = Value::Object(serde_json::Map::new());
        set_nested_value(&mut target, &["server".to_string(), "pong_wait_secs".to_string()], Value::from(45));
        assert_eq!(target["server"]["pong_wait_secs"], 45);
    }

    #[test]
    fn parse_env_value_parses_numbers_and_falls_back_to_strings() {
        assert_eq!(parse_env_value("45"), Value::from(45));
        assert_eq!(parse_env_value("true"), Value::from(true));
        assert_eq!(parse_env_value("postgres://x"), Value::String("postgres://x".to_string()));
    }

    #[test]
    fn load_applies_defaults_when_no_environment_is_set() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, "*");
    }
}
