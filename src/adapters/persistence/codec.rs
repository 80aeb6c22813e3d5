//! Document blob codec. JSON in, JSON out, with additive legacy backfill.
//!
//! Blobs written before `brandStoryAndPurpose`, `enableAudiences` and
//! `enableRegions` existed are detected by field presence (there is no version
//! number) and filled with defaults. Nothing else in the blob is rewritten.

use crate::domain::{Document, DomainError};
use serde_json::{Map, Value};
use tracing::debug;

fn legacy_defaults() -> [(&'static str, Value); 3] {
    [
        ("brandStoryAndPurpose", Value::String(String::new())),
        ("enableAudiences", Value::Bool(true)),
        ("enableRegions", Value::Bool(true)),
    ]
}

/// Inserts missing `brandFoundations` fields. Returns the names that were added.
pub fn backfill_legacy_fields(value: &mut Value) -> Vec<&'static str> {
    let Some(root) = value.as_object_mut() else {
        return Vec::new();
    };
    let foundations = root
        .entry("brandFoundations")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(foundations) = foundations.as_object_mut() else {
        return Vec::new();
    };

    let mut added = Vec::new();
    for (field, default) in legacy_defaults() {
        if !foundations.contains_key(field) {
            foundations.insert(field.to_string(), default);
            added.push(field);
        }
    }
    added
}

pub fn encode(doc: &Document) -> Result<String, DomainError> {
    serde_json::to_string_pretty(doc)
        .map_err(|e| DomainError::Store(format!("encode document: {}", e)))
}

pub fn decode(raw: &str) -> Result<Document, DomainError> {
    let mut value: Value = serde_json::from_str(raw)
        .map_err(|e| DomainError::Store(format!("parse document: {}", e)))?;
    let added = backfill_legacy_fields(&mut value);
    if !added.is_empty() {
        debug!(fields = ?added, "backfilled legacy document fields");
    }
    serde_json::from_value(value).map_err(|e| DomainError::Store(format!("decode document: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Audience, ContentType, Sample, WritingRule};

    #[test]
    fn test_round_trip() {
        let mut doc = Document::empty();
        doc.brand_foundations.brand_name = "Acme".to_string();
        doc.brand_foundations.enable_regions = false;
        let mut a = Audience::named("Gen Z");
        a.writing_rules.push(WritingRule::new("r", "d", ["Gen Z"]));
        a.icon = Some("🧢".to_string());
        doc.audiences.push(a);
        let mut c = ContentType::named("Email");
        c.samples.push(Sample {
            title: Some("Hi".to_string()),
            body: "Body".to_string(),
            notes: None,
            attachment: Some("tone-guide.csv".to_string()),
            tags: vec!["Email".to_string()],
        });
        doc.content_types.push(c);
        doc.examples.push(serde_json::json!({"anything": [1, 2, 3]}));

        let decoded = decode(&encode(&doc).unwrap()).unwrap();
        assert_eq!(decoded, doc);
    }

    #[test]
    fn test_legacy_blob_gets_defaults_only() {
        let raw = r#"{
            "brandFoundations": {
                "brandName": "Old Co",
                "aboutYourBrand": "We sell things",
                "writingRules": [{"id": "1", "name": "n", "description": "d", "tags": ["global"]}]
            },
            "audiences": [{"name": "Gen Z", "description": "young", "writingRules": []}]
        }"#;

        let doc = decode(raw).unwrap();
        let f = &doc.brand_foundations;
        assert_eq!(f.brand_story_and_purpose, "");
        assert!(f.enable_audiences);
        assert!(f.enable_regions);
        assert_eq!(f.brand_name, "Old Co");
        assert_eq!(f.about_your_brand, "We sell things");
        assert_eq!(f.writing_rules[0].tags, vec!["global"]);
        assert_eq!(doc.audiences[0].name, "Gen Z");
        assert_eq!(doc.audiences[0].description, "young");
    }

    #[test]
    fn test_backfill_keeps_present_values() {
        let mut value = serde_json::json!({
            "brandFoundations": {"enableRegions": false, "brandStoryAndPurpose": "Why"}
        });
        let added = backfill_legacy_fields(&mut value);
        assert_eq!(added, vec!["enableAudiences"]);
        assert_eq!(value["brandFoundations"]["enableRegions"], false);
        assert_eq!(value["brandFoundations"]["brandStoryAndPurpose"], "Why");
    }

    #[test]
    fn test_missing_foundations_object_is_created() {
        let mut value = serde_json::json!({});
        let added = backfill_legacy_fields(&mut value);
        assert_eq!(added.len(), 3);
        assert!(value["brandFoundations"].is_object());
    }

    #[test]
    fn test_malformed_blob_is_store_error() {
        assert!(matches!(decode("{not json"), Err(DomainError::Store(_))));
        assert!(matches!(decode("[1, 2]"), Err(DomainError::Store(_))));
    }
}
