//! Whitelisted file access.
//!
//! Caller-supplied relative paths are resolved against a fixed list of
//! named roots. String sanitization runs first but is only advisory: a
//! path is accepted only after its canonical (symlink-resolved) form is
//! found inside the canonical form of the matching root.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ActionError, ActionResult};

const NOT_ALLOWED: &str = "File not allowed or does not exist.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootKind {
    Directory,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRoot {
    pub key: String,
    pub label: String,
    pub path: PathBuf,
    pub kind: RootKind,
}

/// A path proven to sit inside one configured root. Only
/// `PathSandbox::resolve` builds these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
    root_key: String,
}

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    pub fn root_key(&self) -> &str {
        &self.root_key
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexedFile {
    pub label: String,
    pub path: PathBuf,
    pub relative: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileGroup {
    pub group: String,
    pub files: Vec<IndexedFile>,
}

#[derive(Debug, Clone)]
pub struct PathSandbox {
    roots: Vec<FileRoot>,
}

impl PathSandbox {
    pub fn new(roots: Vec<FileRoot>) -> Self {
        Self { roots }
    }

    /// Configured roots whose path currently exists
    pub fn available_roots(&self) -> impl Iterator<Item = &FileRoot> {
        self.roots.iter().filter(|root| root.path.exists())
    }

    pub fn resolve(&self, relative_path: &str) -> ActionResult<ResolvedPath> {
        let normalized = normalize(relative_path);

        for root in self.available_roots() {
            let candidate = match root.kind {
                RootKind::File => {
                    let base_name = root.path.file_name().and_then(|n| n.to_str());
                    if normalized == root.key || Some(normalized.as_str()) == base_name {
                        Some(root.path.clone())
                    } else {
                        None
                    }
                }
                RootKind::Directory => match strip_key(&normalized, &root.key) {
                    Some(suffix) if !suffix.is_empty() => Some(root.path.join(suffix)),
                    _ => None,
                },
            };

            let Some(candidate) = candidate else { continue };

            if let Some(path) = contained(root, &candidate) {
                return Ok(ResolvedPath {
                    path,
                    root_key: root.key.clone(),
                });
            }
        }

        Err(ActionError::not_allowed(NOT_ALLOWED))
    }

    /// Files available for editing, grouped per root. Display only; every
    /// edit still goes through `resolve`.
    pub fn index(&self, per_root_limit: usize) -> Vec<FileGroup> {
        let mut index = Vec::new();

        for root in self.available_roots() {
            if root.kind == RootKind::File {
                index.push(FileGroup {
                    group: root.label.clone(),
                    files: vec![IndexedFile {
                        label: root.label.clone(),
                        path: root.path.clone(),
                        relative: root.key.clone(),
                    }],
                });
                continue;
            }

            let files = WalkDir::new(&root.path)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|entry| entry.file_type().is_file())
                .take(per_root_limit)
                .filter_map(|entry| {
                    let inner = entry.path().strip_prefix(&root.path).ok()?;
                    let label = slash_path(inner);
                    Some(IndexedFile {
                        relative: format!("{}/{}", root.key, label),
                        label,
                        path: entry.path().to_path_buf(),
                    })
                })
                .collect();

            index.push(FileGroup {
                group: root.label.clone(),
                files,
            });
        }

        index
    }

    pub fn read(&self, path: &ResolvedPath) -> ActionResult<String> {
        if !path.as_path().is_file() {
            return Err(ActionError::not_found("File not found."));
        }
        Ok(fs::read_to_string(path.as_path())?)
    }

    /// Replace the file's content. The new content is written to a
    /// sibling temp file and renamed over the target, so readers see
    /// either the old or the new file.
    pub fn write(&self, path: &ResolvedPath, content: &str) -> ActionResult<()> {
        let target = path.as_path();
        let metadata = match fs::metadata(target) {
            Ok(m) if m.is_file() => m,
            _ => return Err(ActionError::not_found("File not found.")),
        };
        if metadata.permissions().readonly() {
            return Err(ActionError::not_writable("File is not writable."));
        }

        let parent = target
            .parent()
            .ok_or_else(|| ActionError::not_found("File not found."))?;

        let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(not_writable)?;
        temp.write_all(content.as_bytes()).map_err(not_writable)?;
        temp.as_file().sync_all().map_err(not_writable)?;
        fs::set_permissions(temp.path(), metadata.permissions()).map_err(not_writable)?;
        temp.persist(target).map_err(|e| not_writable(e.error))?;

        Ok(())
    }
}

fn not_writable(err: std::io::Error) -> ActionError {
    match err.kind() {
        std::io::ErrorKind::PermissionDenied => ActionError::not_writable("File is not writable."),
        _ => err.into(),
    }
}

/// Advisory first pass: drop `..` and `./`, unify separators, trim
/// slashes and collapse repeated ones.
fn normalize(relative_path: &str) -> String {
    let stripped = relative_path
        .replace("..", "")
        .replace("./", "")
        .replace('\\', "/");

    stripped
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// `Some(rest)` when `path` is the key itself or starts with `key/`.
fn strip_key<'a>(path: &'a str, key: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(key)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('/')
    }
}

/// Canonicalize the candidate and the root and accept only a regular
/// file inside the root (or the root itself for file roots).
fn contained(root: &FileRoot, candidate: &Path) -> Option<PathBuf> {
    let real_root = root.path.canonicalize().ok()?;
    let real = candidate.canonicalize().ok()?;

    if !real.is_file() {
        return None;
    }

    let inside = match root.kind {
        RootKind::File => real == real_root,
        RootKind::Directory => real != real_root && real.starts_with(&real_root),
    };

    inside.then_some(real)
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
