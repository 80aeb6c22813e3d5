//! Local file import: images become data URLs, other attachments are kept by name only.

use crate::domain::DomainError;
use base64::Engine;
use std::path::Path;

/// MIME type for an image path, by extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// Reads an image into a `data:<mime>;base64,...` URL, e.g. for `brandHeaderImage`.
pub async fn image_data_url(path: &Path) -> Result<String, DomainError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| DomainError::Import(format!("read {}: {}", path.display(), e)))?;
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{};base64,{}", mime_for_path(path), payload))
}

/// Attachments are recorded by file name; their contents are never read.
pub fn attachment_placeholder(path: &Path) -> Result<String, DomainError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| DomainError::Import(format!("no file name in {}", path.display())))
}

/// Attachment field input: a blank path clears it, anything else keeps the file name.
pub fn attachment_from_input(input: &str) -> Result<Option<String>, DomainError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    attachment_placeholder(Path::new(input)).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_by_extension() {
        assert_eq!(mime_for_path(Path::new("logo.PNG")), "image/png");
        assert_eq!(mime_for_path(Path::new("a/b.jpeg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("icon.svg")), "image/svg+xml");
        assert_eq!(mime_for_path(Path::new("favicon.ico")), "image/x-icon");
        assert_eq!(mime_for_path(Path::new("notes")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_image_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.gif");
        std::fs::write(&path, b"GIF89a").unwrap();

        let url = image_data_url(&path).await.unwrap();
        assert_eq!(url, "data:image/gif;base64,R0lGODlh");
    }

    #[tokio::test]
    async fn test_missing_image_is_import_error() {
        let err = image_data_url(Path::new("/nonexistent/logo.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Import(_)));
    }

    #[test]
    fn test_attachment_placeholder_is_file_name() {
        assert_eq!(
            attachment_placeholder(Path::new("/home/me/Brand Guide.pdf")).unwrap(),
            "Brand Guide.pdf"
        );
        assert!(attachment_placeholder(Path::new("/")).is_err());
    }

    #[test]
    fn test_attachment_from_input() {
        assert_eq!(attachment_from_input("   ").unwrap(), None);
        assert_eq!(
            attachment_from_input(" ./exports/subject-lines.csv ").unwrap(),
            Some("subject-lines.csv".to_string())
        );
        // Nothing is read: the file does not need to exist.
        assert_eq!(
            attachment_from_input("/nowhere/brief.docx").unwrap(),
            Some("brief.docx".to_string())
        );
        assert!(attachment_from_input("/").is_err());
    }
}
