//! Schema validation for Agenda JSON5 configuration layers.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(map, &["$schema", "llm", "memory", "assistant"], layer, "")?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("llm") {
        validate_llm(value, layer, "llm")?;
    }
    if let Some(value) = map.get("memory") {
        validate_memory(value, layer, "memory")?;
    }
    if let Some(value) = map.get("assistant") {
        validate_assistant(value, layer, "assistant")?;
    }
    Ok(())
}

/// Validate the "llm" block.
fn validate_llm(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let allowed = [
        "provider",
        "model",
        "api_key_env",
        "base_url",
        "temperature",
        "max_tool_rounds",
    ];
    ensure_allowed_keys(map, &allowed, layer, path)?;

    for key in ["provider", "model", "api_key_env", "base_url"] {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("temperature") {
        expect_f64(value, layer, &join_path(path, "temperature"))?;
    }
    if let Some(value) = map.get("max_tool_rounds") {
        expect_u64(value, layer, &join_path(path, "max_tool_rounds"))?;
    }
    Ok(())
}

/// Validate the "memory" block.
fn validate_memory(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &["provider", "path", "recall_k", "recall", "capture"],
        layer,
        path,
    )?;

    if let Some(value) = map.get("provider") {
        expect_string(value, layer, &join_path(path, "provider"))?;
    }
    if let Some(value) = map.get("path") {
        expect_string(value, layer, &join_path(path, "path"))?;
    }
    if let Some(value) = map.get("recall_k") {
        expect_u64(value, layer, &join_path(path, "recall_k"))?;
    }
    if let Some(value) = map.get("recall") {
        validate_memory_recall(value, layer, &join_path(path, "recall"))?;
    }
    if let Some(value) = map.get("capture") {
        validate_memory_capture(value, layer, &join_path(path, "capture"))?;
    }
    Ok(())
}

/// Validate memory recall configuration.
fn validate_memory_recall(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let allowed = ["mode", "text_weight", "vector_weight", "min_score"];
    ensure_allowed_keys(map, &allowed, layer, path)?;

    if let Some(value) = map.get("mode") {
        let mode_path = join_path(path, "mode");
        let Some(mode) = value.as_str() else {
            return Err(invalid_field(layer, &mode_path, "expected string"));
        };
        if !matches!(mode, "text" | "vector" | "hybrid") {
            return Err(invalid_field(layer, &mode_path, "invalid recall mode"));
        }
    }
    for key in ["text_weight", "vector_weight", "min_score"] {
        if let Some(value) = map.get(key) {
            expect_f64(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

/// Validate memory capture configuration.
fn validate_memory_capture(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let allowed = [
        "capture_exchanges",
        "deny_patterns",
        "redact_patterns",
        "max_chars",
    ];
    ensure_allowed_keys(map, &allowed, layer, path)?;

    if let Some(value) = map.get("capture_exchanges") {
        expect_bool(value, layer, &join_path(path, "capture_exchanges"))?;
    }
    if let Some(value) = map.get("deny_patterns") {
        validate_string_array(value, layer, &join_path(path, "deny_patterns"))?;
    }
    if let Some(value) = map.get("redact_patterns") {
        validate_string_array(value, layer, &join_path(path, "redact_patterns"))?;
    }
    if let Some(value) = map.get("max_chars") {
        expect_u64(value, layer, &join_path(path, "max_chars"))?;
    }
    Ok(())
}

/// Validate the "assistant" block.
fn validate_assistant(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &["additional_instructions", "transcript_window"],
        layer,
        path,
    )?;

    if let Some(value) = map.get("additional_instructions") {
        expect_string(value, layer, &join_path(path, "additional_instructions"))?;
    }
    if let Some(value) = map.get("transcript_window") {
        expect_u64(value, layer, &join_path(path, "transcript_window"))?;
    }
    Ok(())
}

fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_string() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

fn expect_bool(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_boolean() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected bool"))
    }
}

/// Non-negative integers only; counts and limits never go below zero.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

fn expect_f64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_number() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected number"))
    }
}

fn validate_string_array(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let Value::Array(arr) = value else {
        return Err(invalid_field(layer, path, "expected array"));
    };
    for (idx, entry) in arr.iter().enumerate() {
        if !entry.is_string() {
            return Err(invalid_field(
                layer,
                &format!("{path}[{idx}]"),
                "expected string",
            ));
        }
    }
    Ok(())
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
