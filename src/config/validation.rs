//! Config validation: unknown-key detection with Levenshtein suggestions
//! and hard checks for impossible values.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Warnings never break existing configs;
//! only impossible values block startup.

use std::collections::HashSet;

use super::{AppConfig, ModelMode};

/// A non-fatal config warning (typo, unknown key).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " - did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for `AppConfig`.
///
/// Maintained manually to match the struct hierarchy in app_config.rs.
/// Any new field added there must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [server]
        "server",
        "server.addr",
        // [model]
        "model",
        "model.mode",
        "model.endpoint",
        "model.request_timeout_secs",
        // [session]
        "session",
        "session.idle_ttl_secs",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_len = a.len();
    let b_len = b.len();
    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &k in known {
        let dist = levenshtein(unknown, k);
        if dist <= 3 {
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((k, dist)),
            }
        }
    }
    best.map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Does NOT fail on unknown keys — it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    let mut warnings = Vec::new();

    for key in walk_toml_keys(&value, "") {
        if !known.contains(key.as_str()) {
            let suggestion = suggest_correction(&key, &known);
            warnings.push(ValidationWarning {
                message: format!("Unknown config key '{key}'"),
                field: key,
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Value Validation
// ============================================================================

/// Impossible values that must prevent startup.
pub fn validate_values(config: &AppConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if config.model.mode == ModelMode::Http
        && config
            .model
            .endpoint
            .as_deref()
            .map_or(true, |e| e.trim().is_empty())
    {
        errors.push("model.endpoint is required when model.mode = \"http\"".to_string());
    }

    if config.model.request_timeout_secs == Some(0) {
        errors.push(
            "model.request_timeout_secs = 0 is not a valid timeout (omit the key to disable)"
                .to_string(),
        );
    }

    if config.session.idle_ttl_secs == 0 {
        errors.push("session.idle_ttl_secs must be > 0".to_string());
    }

    if config.server.addr.trim().is_empty() {
        errors.push("server.addr must not be empty".to_string());
    }

    errors
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("endpoint", "endpoint"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("endpont", "endpoint"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [model]
            mode = "surrogate"
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"model".to_string()));
        assert!(keys.contains(&"model.mode".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let warnings = validate_unknown_keys(
            r#"
[model]
endpont = "http://model-server:9000"
"#,
        );
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].field.contains("endpont"));
        assert_eq!(warnings[0].suggestion.as_deref(), Some("model.endpoint"));
    }

    #[test]
    fn test_all_valid_keys_produce_zero_warnings() {
        let warnings = validate_unknown_keys(
            r#"
[server]
addr = "0.0.0.0:8080"

[model]
mode = "http"
endpoint = "http://model-server:9000"

[session]
idle_ttl_secs = 600
"#,
        );
        assert!(warnings.is_empty(), "Expected 0 warnings, got: {warnings:?}");
    }

    #[test]
    fn test_unknown_section_produces_warning() {
        let warnings = validate_unknown_keys(
            r#"
[typo_section]
some_field = 42
"#,
        );
        assert!(warnings.iter().any(|w| w.field.contains("typo_section")));
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_http_without_endpoint_is_error() {
        let config = AppConfig {
            model: crate::config::ModelSection {
                mode: ModelMode::Http,
                endpoint: None,
                request_timeout_secs: None,
            },
            ..AppConfig::default()
        };
        let errors = validate_values(&config);
        assert!(errors.iter().any(|e| e.contains("model.endpoint")));
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let config = AppConfig {
            model: crate::config::ModelSection {
                mode: ModelMode::Surrogate,
                endpoint: None,
                request_timeout_secs: Some(0),
            },
            ..AppConfig::default()
        };
        let errors = validate_values(&config);
        assert!(errors.iter().any(|e| e.contains("request_timeout_secs")));
    }

    #[test]
    fn test_zero_idle_ttl_is_error() {
        let mut config = AppConfig::default();
        config.session.idle_ttl_secs = 0;
        let errors = validate_values(&config);
        assert!(errors.iter().any(|e| e.contains("idle_ttl_secs")));
    }

    #[test]
    fn test_defaults_produce_no_errors() {
        assert!(validate_values(&AppConfig::default()).is_empty());
    }
}
