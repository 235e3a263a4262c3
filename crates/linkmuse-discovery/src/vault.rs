//! Filesystem vault: a directory tree of markdown notes.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use linkmuse_core::{Document, DocumentSource, Error, Result};

/// [`DocumentSource`] over every `.md` file below a root directory.
///
/// Paths are relative to the root with `/` separators. Hidden directories
/// (`.obsidian`, `.git`, `.trash`) are skipped.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Vault-relative paths of every note, sorted.
    pub fn note_paths(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(Error::NotFound(format!(
                "Vault directory {}",
                self.root.display()
            )));
        }

        let mut paths = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable vault entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                paths.push(to_vault_path(relative));
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// Normalize a vault-relative path. `./A.md` and `a//b.md` resolve to
    /// the same form [`note_paths`](Self::note_paths) produces.
    fn resolve(&self, path: &str) -> Result<(PathBuf, String)> {
        let mut relative = PathBuf::new();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(Error::InvalidInput(format!(
                        "Note path must stay inside the vault: {}",
                        path
                    )));
                }
            }
        }
        if relative.as_os_str().is_empty() {
            return Err(Error::InvalidInput(format!("Empty note path: {:?}", path)));
        }
        let vault_path = to_vault_path(&relative);
        Ok((self.root.join(relative), vault_path))
    }
}

#[async_trait]
impl DocumentSource for Vault {
    async fn list_all(&self) -> Result<Vec<Document>> {
        let paths = self.note_paths()?;
        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            match self.read(&path).await {
                Ok(doc) => documents.push(doc),
                Err(e) => warn!(
                    subsystem = "discovery",
                    component = "vault",
                    note_path = %path,
                    error = %e,
                    "Skipping unreadable note"
                ),
            }
        }
        debug!(
            subsystem = "discovery",
            component = "vault",
            root = %self.root.display(),
            note_count = documents.len(),
            "Loaded vault notes"
        );
        Ok(documents)
    }

    async fn read(&self, path: &str) -> Result<Document> {
        let (full, vault_path) = self.resolve(path)?;
        let content = tokio::fs::read_to_string(&full).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(format!("Note {}", path))
            } else {
                Error::Io(e)
            }
        })?;
        Ok(Document::new(vault_path, content))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

fn to_vault_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn vault_with(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn test_lists_markdown_notes() {
        let dir = vault_with(&[
            ("Alpha.md", "alpha"),
            ("topics/Beta.md", "beta"),
            ("image.png", "binary"),
            (".obsidian/workspace.md", "hidden"),
        ]);
        let vault = Vault::new(dir.path());

        let docs = vault.list_all().await.unwrap();
        let paths: Vec<_> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["Alpha.md", "topics/Beta.md"]);
        assert_eq!(docs[1].name, "Beta");
        assert_eq!(docs[1].content, "beta");
    }

    #[tokio::test]
    async fn test_read_single_note() {
        let dir = vault_with(&[("notes/Gamma.md", "gamma body")]);
        let doc = Vault::new(dir.path()).read("notes/Gamma.md").await.unwrap();
        assert_eq!(doc.name, "Gamma");
        assert_eq!(doc.content, "gamma body");
    }

    #[tokio::test]
    async fn test_read_missing_note() {
        let dir = vault_with(&[]);
        let err = Vault::new(dir.path()).read("Nope.md").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_read_rejects_escape() {
        let dir = vault_with(&[]);
        let err = Vault::new(dir.path()).read("../secret.md").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_read_normalizes_path() {
        let dir = vault_with(&[("A.md", "a"), ("notes/B.md", "b")]);
        let vault = Vault::new(dir.path());

        assert_eq!(vault.read("./A.md").await.unwrap().path, "A.md");
        assert_eq!(vault.read("notes//./B.md").await.unwrap().path, "notes/B.md");
    }

    #[tokio::test]
    async fn test_read_rejects_absolute_and_empty() {
        let dir = vault_with(&[("A.md", "a")]);
        let vault = Vault::new(dir.path());

        let err = vault.read("/etc/passwd").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        let err = vault.read("./").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_list_all_skips_invalid_utf8_note() {
        let dir = vault_with(&[("A.md", "a"), ("C.md", "c")]);
        fs::write(dir.path().join("Bad.md"), [0xff, 0xfe, 0x00]).unwrap();
        let vault = Vault::new(dir.path());

        let docs = vault.list_all().await.unwrap();
        let paths: Vec<_> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["A.md", "C.md"]);

        let err = vault.read("Bad.md").await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_missing_root() {
        let err = Vault::new("/nonexistent/linkmuse-vault").note_paths().unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
