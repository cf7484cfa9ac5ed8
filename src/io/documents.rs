//! Project-scoped document storage: folders, uploaded files and saved links.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::StoreError;
use crate::model::document::{public_url, DocumentEntry, DocumentKind};

/// Links are stored as small JSON files with this suffix. User-supplied
/// names may not end with it.
const LINK_SUFFIX: &str = ".studio-link";

#[derive(Serialize, Deserialize)]
struct LinkFile {
    url: String,
}

/// Document operations, scoped by project id and a `/`-separated folder path.
pub trait DocumentStore {
    fn list(&self, project_id: &str, path: &str) -> Result<Vec<DocumentEntry>, StoreError>;

    fn create_folder(&self, project_id: &str, path: &str, name: &str) -> Result<(), StoreError>;

    /// Copy a local file into the folder.
    fn upload(&self, project_id: &str, path: &str, source: &Path) -> Result<DocumentEntry, StoreError>;

    fn add_link(&self, project_id: &str, path: &str, name: &str, url: &str) -> Result<(), StoreError>;

    fn rename(&self, project_id: &str, path: &str, from: &str, to: &str) -> Result<(), StoreError>;

    /// Delete a file, link, or folder with its contents.
    fn delete(&self, project_id: &str, path: &str, name: &str) -> Result<(), StoreError>;

    /// URL stored in a saved link.
    fn read_link(&self, project_id: &str, path: &str, name: &str) -> Result<String, StoreError>;

    /// Local path of a stored file, for opening it.
    fn local_path(&self, project_id: &str, path: &str, name: &str) -> Result<PathBuf, StoreError>;

    fn public_url(&self, project_id: &str, path: &str, name: &str) -> String;
}

/// Stores documents under `<root>/<project_id>/<path>`.
pub struct FsDocumentStore {
    root: PathBuf,
    base_url: String,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self { root: root.into(), base_url: base_url.into() }
    }

    fn folder(&self, project_id: &str, path: &str) -> Result<PathBuf, StoreError> {
        let mut dir = self.root.join(checked_name(project_id)?);
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            dir.push(checked_name(segment)?);
        }
        Ok(dir)
    }

    fn entry_path(&self, project_id: &str, path: &str, name: &str) -> Result<PathBuf, StoreError> {
        Ok(self.folder(project_id, path)?.join(checked_name(name)?))
    }

    fn link_path(&self, project_id: &str, path: &str, name: &str) -> Result<PathBuf, StoreError> {
        let file_name = format!("{}{}", checked_name(name)?, LINK_SUFFIX);
        Ok(self.folder(project_id, path)?.join(file_name))
    }
}

/// Reject names that could escape their folder.
fn checked_name(name: &str) -> Result<&str, StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
    {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

/// A name for a new folder, file or link.
fn new_name(name: &str) -> Result<&str, StoreError> {
    let checked = checked_name(name)?;
    if checked.ends_with(LINK_SUFFIX) {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(checked)
}

fn read_link_file(path: &Path) -> Result<LinkFile, StoreError> {
    Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}

fn modified_at(meta: &std::fs::Metadata) -> Option<DateTime<Utc>> {
    meta.modified().ok().map(DateTime::<Utc>::from)
}

impl DocumentStore for FsDocumentStore {
    fn list(&self, project_id: &str, path: &str) -> Result<Vec<DocumentEntry>, StoreError> {
        let dir = self.folder(project_id, path)?;
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            let file_name = entry.file_name().to_string_lossy().to_string();
            let file = DocumentEntry {
                name: file_name.clone(),
                kind: DocumentKind::File,
                size: meta.len(),
                modified: modified_at(&meta),
                url: None,
            };
            let doc = if meta.is_dir() {
                DocumentEntry { kind: DocumentKind::Folder, size: 0, ..file }
            } else if let Some(stem) = file_name.strip_suffix(LINK_SUFFIX) {
                match read_link_file(&entry.path()) {
                    Ok(link) => DocumentEntry {
                        name: stem.to_string(),
                        kind: DocumentKind::Link,
                        size: 0,
                        url: Some(link.url),
                        ..file
                    },
                    Err(e) => {
                        warn!(project = project_id, path, name = %file_name, error = %e, "unreadable link file");
                        file
                    }
                }
            } else {
                file
            };
            entries.push(doc);
        }
        entries.sort_by(|a, b| {
            b.is_folder()
                .cmp(&a.is_folder())
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(entries)
    }

    fn create_folder(&self, project_id: &str, path: &str, name: &str) -> Result<(), StoreError> {
        let target = self.entry_path(project_id, path, new_name(name)?)?;
        if target.exists() {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        std::fs::create_dir_all(&target)?;
        info!(project = project_id, path, name, "folder created");
        Ok(())
    }

    fn upload(&self, project_id: &str, path: &str, source: &Path) -> Result<DocumentEntry, StoreError> {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| StoreError::InvalidName(source.display().to_string()))?;
        let target = self.entry_path(project_id, path, new_name(&name)?)?;
        if target.exists() {
            return Err(StoreError::AlreadyExists(name));
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let size = std::fs::copy(source, &target)?;
        info!(project = project_id, path, name = %name, size, "document uploaded");
        Ok(DocumentEntry { name, kind: DocumentKind::File, size, modified: Some(Utc::now()), url: None })
    }

    fn add_link(&self, project_id: &str, path: &str, name: &str, url: &str) -> Result<(), StoreError> {
        let target = self.link_path(project_id, path, new_name(name)?)?;
        if target.exists() {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let link = LinkFile { url: url.trim().to_string() };
        std::fs::write(&target, serde_json::to_string_pretty(&link)?)?;
        Ok(())
    }

    fn rename(&self, project_id: &str, path: &str, from: &str, to: &str) -> Result<(), StoreError> {
        let mut source = self.entry_path(project_id, path, from)?;
        let mut target = self.entry_path(project_id, path, new_name(to)?)?;
        if !source.exists() {
            // Links are listed without their extension.
            let link_source = self.link_path(project_id, path, from)?;
            if !link_source.exists() {
                return Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("'{}' does not exist", from),
                )));
            }
            source = link_source;
            target = self.link_path(project_id, path, to)?;
        }
        if target.exists() {
            return Err(StoreError::AlreadyExists(to.to_string()));
        }
        std::fs::rename(&source, &target)?;
        info!(project = project_id, path, from, to, "document renamed");
        Ok(())
    }

    fn delete(&self, project_id: &str, path: &str, name: &str) -> Result<(), StoreError> {
        let target = self.entry_path(project_id, path, name)?;
        if target.is_dir() {
            std::fs::remove_dir_all(&target)?;
        } else if target.exists() {
            std::fs::remove_file(&target)?;
        } else {
            std::fs::remove_file(self.link_path(project_id, path, name)?)?;
        }
        info!(project = project_id, path, name, "document deleted");
        Ok(())
    }

    fn read_link(&self, project_id: &str, path: &str, name: &str) -> Result<String, StoreError> {
        Ok(read_link_file(&self.link_path(project_id, path, name)?)?.url)
    }

    fn local_path(&self, project_id: &str, path: &str, name: &str) -> Result<PathBuf, StoreError> {
        self.entry_path(project_id, path, name)
    }

    fn public_url(&self, project_id: &str, path: &str, name: &str) -> String {
        public_url(&self.base_url, project_id, path, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PROJECT: &str = "3f2a";

    fn store() -> (tempfile::TempDir, FsDocumentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path().join("docs"), "https://files.example.com");
        (dir, store)
    }

    fn names(entries: &[DocumentEntry]) -> Vec<(String, DocumentKind)> {
        entries.iter().map(|e| (e.name.clone(), e.kind)).collect()
    }

    #[test]
    fn test_empty_project_lists_nothing() {
        let (_dir, store) = store();
        assert!(store.list(PROJECT, "").unwrap().is_empty());
    }

    #[test]
    fn test_folders_files_and_links_are_listed_folders_first() {
        let (dir, store) = store();
        let source = dir.path().join("Brief.pdf");
        std::fs::write(&source, b"%PDF-1.4").unwrap();

        store.upload(PROJECT, "", &source).unwrap();
        store.create_folder(PROJECT, "", "drawings").unwrap();
        store.add_link(PROJECT, "", "Supplier catalogue", "https://supplier.example.com").unwrap();

        let entries = store.list(PROJECT, "").unwrap();
        assert_eq!(
            names(&entries),
            vec![
                ("drawings".to_string(), DocumentKind::Folder),
                ("Brief.pdf".to_string(), DocumentKind::File),
                ("Supplier catalogue".to_string(), DocumentKind::Link),
            ]
        );
        assert_eq!(entries[1].size, 8);
        assert_eq!(entries[2].url.as_deref(), Some("https://supplier.example.com"));
    }

    #[test]
    fn test_nested_upload_and_public_url() {
        let (dir, store) = store();
        let source = dir.path().join("plan.dwg");
        std::fs::write(&source, b"dwg").unwrap();
        store.create_folder(PROJECT, "", "drawings").unwrap();
        store.upload(PROJECT, "drawings", &source).unwrap();
        assert_eq!(store.list(PROJECT, "drawings").unwrap().len(), 1);
        assert_eq!(
            store.public_url(PROJECT, "drawings", "plan.dwg"),
            "https://files.example.com/3f2a/drawings/plan.dwg"
        );
    }

    #[test]
    fn test_rename_file_and_link() {
        let (dir, store) = store();
        let source = dir.path().join("a.txt");
        std::fs::write(&source, b"a").unwrap();
        store.upload(PROJECT, "", &source).unwrap();
        store.add_link(PROJECT, "", "Old link", "https://x.example").unwrap();

        store.rename(PROJECT, "", "a.txt", "b.txt").unwrap();
        store.rename(PROJECT, "", "Old link", "New link").unwrap();
        let entries = store.list(PROJECT, "").unwrap();
        assert_eq!(
            names(&entries),
            vec![
                ("b.txt".to_string(), DocumentKind::File),
                ("New link".to_string(), DocumentKind::Link),
            ]
        );
        assert!(store.rename(PROJECT, "", "missing", "x").is_err());
        assert_eq!(store.read_link(PROJECT, "", "New link").unwrap(), "https://x.example");
    }

    #[test]
    fn test_delete_removes_folder_recursively() {
        let (dir, store) = store();
        let source = dir.path().join("photo.jpg");
        std::fs::write(&source, b"jpg").unwrap();
        store.create_folder(PROJECT, "", "site").unwrap();
        store.upload(PROJECT, "site", &source).unwrap();
        store.add_link(PROJECT, "", "Board", "https://board.example").unwrap();

        store.delete(PROJECT, "", "site").unwrap();
        store.delete(PROJECT, "", "Board").unwrap();
        assert!(store.list(PROJECT, "").unwrap().is_empty());
    }

    #[test]
    fn test_escaping_names_are_rejected() {
        let (_dir, store) = store();
        assert!(matches!(store.create_folder(PROJECT, "", "../etc"), Err(StoreError::InvalidName(_))));
        assert!(matches!(store.list(PROJECT, "a/../.."), Err(StoreError::InvalidName(_))));
        assert!(matches!(store.create_folder(PROJECT, "", "  "), Err(StoreError::InvalidName(_))));
    }

    #[test]
    fn test_dotted_names_are_allowed() {
        let (dir, store) = store();
        let source = dir.path().join("v2..final.pdf");
        std::fs::write(&source, b"pdf").unwrap();
        store.upload(PROJECT, "", &source).unwrap();
        assert_eq!(names(&store.list(PROJECT, "").unwrap()), vec![("v2..final.pdf".to_string(), DocumentKind::File)]);
        assert!(matches!(store.list(PROJECT, ".."), Err(StoreError::InvalidName(_))));
    }

    #[test]
    fn test_uploaded_link_lookalike_is_a_plain_file() {
        let (dir, store) = store();
        let source = dir.path().join("minutes.link");
        std::fs::write(&source, b"site meeting notes").unwrap();
        store.upload(PROJECT, "", &source).unwrap();
        store.add_link(PROJECT, "", "Board", "https://board.example").unwrap();

        let entries = store.list(PROJECT, "").unwrap();
        assert_eq!(
            names(&entries),
            vec![
                ("Board".to_string(), DocumentKind::Link),
                ("minutes.link".to_string(), DocumentKind::File),
            ]
        );
    }

    #[test]
    fn test_reserved_link_suffix_is_rejected_for_new_names() {
        let (dir, store) = store();
        let source = dir.path().join("notes.studio-link");
        std::fs::write(&source, b"not json").unwrap();
        assert!(matches!(store.upload(PROJECT, "", &source), Err(StoreError::InvalidName(_))));
        assert!(matches!(store.create_folder(PROJECT, "", "x.studio-link"), Err(StoreError::InvalidName(_))));

        store.add_link(PROJECT, "", "Board", "https://board.example").unwrap();
        assert!(matches!(store.rename(PROJECT, "", "Board", "b.studio-link"), Err(StoreError::InvalidName(_))));
    }

    #[test]
    fn test_corrupt_link_is_listed_as_file() {
        let (_dir, store) = store();
        store.create_folder(PROJECT, "", "refs").unwrap();
        store.add_link(PROJECT, "refs", "Good", "https://good.example").unwrap();
        let corrupt = store.folder(PROJECT, "refs").unwrap().join("Broken.studio-link");
        std::fs::write(&corrupt, b"{ nope").unwrap();

        let entries = store.list(PROJECT, "refs").unwrap();
        assert_eq!(
            names(&entries),
            vec![
                ("Broken.studio-link".to_string(), DocumentKind::File),
                ("Good".to_string(), DocumentKind::Link),
            ]
        );
        store.delete(PROJECT, "refs", "Broken.studio-link").unwrap();
        assert_eq!(store.list(PROJECT, "refs").unwrap().len(), 1);
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let (_dir, store) = store();
        store.create_folder(PROJECT, "", "finishes").unwrap();
        assert!(matches!(store.create_folder(PROJECT, "", "finishes"), Err(StoreError::AlreadyExists(_))));
    }
}
