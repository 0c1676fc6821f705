//! Character template fixtures: presets loaded from a JSON file on disk and
//! shallow-merged with caller-supplied customizations at instantiation time.

use crate::error::AppError;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One preset from the fixtures file. Fields mirror the character create payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CharacterTemplate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "empty_edges")]
    pub relationships: Value,
}

fn empty_edges() -> Value {
    Value::Array(Vec::new())
}

/// Load the template map (template name -> preset) from `path`.
pub async fn load_templates(path: &str) -> Result<HashMap<String, CharacterTemplate>, AppError> {
    let raw = tokio::fs::read_to_string(path).await?;
    let templates = serde_json::from_str(&raw)?;
    Ok(templates)
}

/// Shallow-merge caller overrides onto a preset, caller keys winning.
/// Both sides are JSON objects; non-object overrides are rejected upstream.
pub fn merge_overrides(base: Value, overrides: &Map<String, Value>) -> Value {
    let mut out = match base {
        Value::Object(m) => m,
        _ => Map::new(),
    };
    for (k, v) in overrides {
        out.insert(k.clone(), v.clone());
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn caller_overrides_win_over_preset() {
        let base = json!({"name": "The Rival", "tags": ["antagonist"], "description": "preset"});
        let overrides = json!({"name": "Vess Harrow", "description": null})
            .as_object()
            .cloned()
            .unwrap();
        let merged = merge_overrides(base, &overrides);
        assert_eq!(merged["name"], "Vess Harrow");
        assert_eq!(merged["description"], Value::Null);
        assert_eq!(merged["tags"], json!(["antagonist"]));
    }

    #[test]
    fn empty_overrides_keep_preset_intact() {
        let base = json!({"name": "The Guide", "tags": ["supporting"]});
        let merged = merge_overrides(base.clone(), &Map::new());
        assert_eq!(merged, base);
    }

    #[test]
    fn fixtures_file_shape_parses() {
        let raw = r#"{
            "protagonist": {"name": "Unnamed Lead", "tags": ["protagonist"], "relationships": []},
            "antagonist": {"name": "Unnamed Rival", "tags": ["antagonist"]}
        }"#;
        let templates: HashMap<String, CharacterTemplate> = serde_json::from_str(raw).unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates["antagonist"].relationships, json!([]));
    }
}
