use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Folder,
    File,
    Link,
}

/// One entry of a project document folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub name: String,
    pub kind: DocumentKind,
    #[serde(default)]
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    /// Target URL for links.
    #[serde(default)]
    pub url: Option<String>,
}

impl DocumentEntry {
    pub fn is_folder(&self) -> bool {
        self.kind == DocumentKind::Folder
    }
}

/// Human-readable file size.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

/// Public URL of a stored object: base, project, folder path and file name
/// joined by single slashes.
pub fn public_url(base: &str, project_id: &str, path: &str, filename: &str) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    let segments = std::iter::once(project_id)
        .chain(path.split('/'))
        .chain(std::iter::once(filename))
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty());
    for segment in segments {
        url.push('/');
        url.push_str(segment);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_joins_segments() {
        assert_eq!(
            public_url("https://files.example.com/storage/", "p1", "drawings/floor", "plan.pdf"),
            "https://files.example.com/storage/p1/drawings/floor/plan.pdf"
        );
        assert_eq!(
            public_url("https://files.example.com", "p1", "", "brief.docx"),
            "https://files.example.com/p1/brief.docx"
        );
        assert_eq!(
            public_url("https://files.example.com", "p1", "/a//b/", "x.png"),
            "https://files.example.com/p1/a/b/x.png"
        );
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
