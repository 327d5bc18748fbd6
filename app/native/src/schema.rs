//! JSON Schema for the configuration file.

use crate::config::PaneltoneConfig;
use crate::constants::SCHEMA_ID;

/// Generates a JSON Schema for the paneltone configuration.
#[must_use]
pub fn generate_schema() -> schemars::Schema {
    let mut schema = schemars::schema_for!(PaneltoneConfig);

    if let Some(obj) = schema.as_object_mut() {
        obj.insert("$id".to_string(), serde_json::json!(SCHEMA_ID));
    }

    schema
}

/// Returns the schema as pretty-printed JSON.
#[must_use]
pub fn print_schema() -> String {
    serde_json::to_string_pretty(&generate_schema()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_valid_json_with_id() {
        let parsed: serde_json::Value = serde_json::from_str(&print_schema()).unwrap();

        assert!(parsed["$id"].as_str().unwrap().ends_with("paneltone.schema.json"));
        assert_eq!(parsed["title"], "PaneltoneConfig");
        assert!(parsed["properties"]["analysis"].is_object());
        assert!(parsed["properties"]["watch"].is_object());
    }

    #[test]
    fn test_schema_uses_camel_case_fields() {
        let schema = print_schema();
        assert!(schema.contains("luminanceThreshold"));
        assert!(schema.contains("panelHeight"));
        assert!(schema.contains("debounceMs"));
    }

    #[test]
    fn test_schema_only_describes_config_types() {
        let parsed: serde_json::Value = serde_json::from_str(&print_schema()).unwrap();
        let defs = parsed["$defs"].as_object().map(|defs| defs.keys().cloned().collect::<Vec<_>>());

        assert_eq!(defs, Some(vec!["AnalysisConfig".to_string(), "WatchConfig".to_string()]));
    }
}
