//! CSV export of the aggregated writing rules. Uses the `csv` crate for quoting.
//!
//! Format: `Name;Description;Tags;Locations` (semicolon-delimited). Multi-valued
//! cells are joined with `, `.

use crate::domain::{AggregatedRule, DomainError};
use std::path::Path;
use tracing::info;

pub fn rules_to_csv(rules: &[AggregatedRule]) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_writer(Vec::new());

    wtr.write_record(["Name", "Description", "Tags", "Locations"])?;

    for rule in rules {
        // One line per rule; the csv crate handles quoting of ';' and '"'.
        let description = rule.rule.description.replace('\n', " ").replace('\r', "");
        let tags = rule.rule.tags.join(", ");
        let locations = rule
            .locations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        wtr.write_record([&rule.rule.name, &description, &tags, &locations])?;
    }

    wtr.flush()?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))?;

    String::from_utf8(bytes).map_err(|e| {
        csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })
}

/// Writes the CSV export to `path`, creating parent directories.
pub async fn write_rules_csv(path: &Path, rules: &[AggregatedRule]) -> Result<(), DomainError> {
    let csv = rules_to_csv(rules).map_err(|e| DomainError::Export(e.to_string()))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DomainError::Export(format!("create dir: {}", e)))?;
    }
    tokio::fs::write(path, csv)
        .await
        .map_err(|e| DomainError::Export(format!("write {}: {}", path.display(), e)))?;
    info!(path = %path.display(), rules = rules.len(), "exported writing rules");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Audience, ContentType, Document, WritingRule, collect_all_rules};

    fn doc() -> Document {
        let mut doc = Document::empty();
        doc.brand_foundations
            .writing_rules
            .push(WritingRule::new("Tone", "Warm; never \"salesy\"", ["Global"]));
        let shared = WritingRule::new("Short", "Keep it\nshort", ["Gen Z", "Email"]);
        let mut a = Audience::named("Gen Z");
        a.writing_rules.push(shared.clone());
        doc.audiences.push(a);
        let mut c = ContentType::named("Email");
        c.content_type_rules.push(shared);
        doc.content_types.push(c);
        doc
    }

    #[test]
    fn test_header_and_rows() {
        let csv = rules_to_csv(&collect_all_rules(&doc())).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Name;Description;Tags;Locations");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "Tone;\"Warm; never \"\"salesy\"\"\";Global;Global");
        assert_eq!(
            lines[2],
            "Short;Keep it short;Gen Z, Email;Audience: Gen Z, Content type: Email"
        );
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let csv = rules_to_csv(&[]).unwrap();
        assert_eq!(csv.trim_end(), "Name;Description;Tags;Locations");
    }

    #[tokio::test]
    async fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("rules.csv");
        write_rules_csv(&path, &collect_all_rules(&doc()))
            .await
            .unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Name;Description;Tags;Locations"));
    }
}
