use crate::config::AppConfig;
use crate::error::Error;
use glob::Pattern;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, trace, warn};
use walkdir::WalkDir;

/// One leaf file under the scan root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileAsset {
    pub path: PathBuf,
    pub parent: PathBuf,
    /// File name without its extension.
    pub base_name: String,
    /// Lower-cased, without the dot. Empty when the file has no extension.
    pub extension: String,
    /// `/`-separated path relative to the scan root.
    pub relative_path: String,
}

impl FileAsset {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Sibling path with the same stem and a different extension. Built from
    /// the on-disk name, so names that are not valid UTF-8 keep their bytes.
    pub fn sibling_with_extension(&self, extension: &str) -> PathBuf {
        self.path.with_extension(extension)
    }
}

/// A directory under the scan root. The root has depth 0 and is never yielded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryNode {
    pub path: PathBuf,
    pub parent: PathBuf,
    pub name: String,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File(FileAsset),
    Dir(DirectoryNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthOrder {
    DeepestFirst,
    ShallowestFirst,
}

/// An entry the walk could not read. The subtree below it was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalkFailure {
    /// `/`-separated path relative to the scan root.
    pub relative_path: String,
    pub reason: String,
}

/// A directory that directly contains at least one image file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductFolder {
    pub path: PathBuf,
    pub relative_path: String,
    pub name: String,
    /// Image files directly inside the folder, sorted by file name.
    pub images: Vec<FileAsset>,
}

/// Depth-first traversal of an image store root.
///
/// Every call to [`Walker::entries`] starts a fresh walk; nothing is cached
/// between calls, so results always reflect the tree as it is right now.
pub struct Walker {
    root: PathBuf,
    ignore_patterns: Vec<Pattern>,
    failures: RefCell<Vec<WalkFailure>>,
}

impl Walker {
    /// Fails with [`Error::RootNotFound`] when `root` is missing or not a directory.
    pub fn new(root: impl AsRef<Path>, ignore_globs: &[String]) -> Result<Self, Error> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::RootNotFound(root.to_path_buf()));
        }
        let root = root
            .canonicalize()
            .map_err(|_| Error::RootNotFound(root.to_path_buf()))?;

        let ignore_patterns = ignore_globs
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Invalid glob pattern '{}': {}", glob, e);
                    None
                }
            })
            .collect();

        Ok(Self {
            root,
            ignore_patterns,
            failures: RefCell::new(Vec::new()),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(&config.root, &config.ignore_patterns)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazy sequence of every file and directory below the root.
    pub fn entries(&self) -> Entries<'_> {
        Entries {
            walker: self,
            inner: WalkDir::new(&self.root)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter(),
        }
    }

    /// Unreadable entries met by every walk since the last call, oldest first.
    pub fn take_failures(&self) -> Vec<WalkFailure> {
        self.failures.take()
    }

    pub fn files(&self) -> impl Iterator<Item = FileAsset> + '_ {
        self.entries().filter_map(|entry| match entry {
            Entry::File(file) => Some(file),
            Entry::Dir(_) => None,
        })
    }

    /// All directories, materialized and sorted by depth. Ties are ordered by
    /// path so the result is deterministic.
    pub fn directories(&self, order: DepthOrder) -> Vec<DirectoryNode> {
        let mut dirs: Vec<DirectoryNode> = self
            .entries()
            .filter_map(|entry| match entry {
                Entry::Dir(dir) => Some(dir),
                Entry::File(_) => None,
            })
            .collect();

        dirs.sort_by(|a, b| {
            let by_depth = match order {
                DepthOrder::DeepestFirst => b.depth.cmp(&a.depth),
                DepthOrder::ShallowestFirst => a.depth.cmp(&b.depth),
            };
            by_depth.then_with(|| a.path.cmp(&b.path))
        });
        dirs
    }

    /// Group image files by parent directory, keeping only directories that
    /// hold images directly. Intermediate category folders are left out.
    pub fn product_folders(&self, config: &AppConfig) -> Vec<ProductFolder> {
        let mut by_parent: BTreeMap<PathBuf, Vec<FileAsset>> = BTreeMap::new();
        for file in self.files().filter(|f| config.is_image(&f.extension)) {
            by_parent.entry(file.parent.clone()).or_default().push(file);
        }

        by_parent
            .into_iter()
            .filter(|(path, _)| path != &self.root)
            .map(|(path, mut images)| {
                images.sort_by(|a, b| a.path.cmp(&b.path));
                ProductFolder {
                    relative_path: self.relative(&path),
                    name: file_name_of(&path),
                    path,
                    images,
                }
            })
            .collect()
    }

    fn relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Patterns are tried against both the absolute and the root-relative path.
    fn is_ignored(&self, path: &Path) -> bool {
        if self.ignore_patterns.is_empty() {
            return false;
        }
        let relative = self.relative(path);
        self.ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path) || pattern.matches(&relative))
    }
}

/// Iterator returned by [`Walker::entries`].
pub struct Entries<'a> {
    walker: &'a Walker,
    inner: walkdir::IntoIter,
}

impl Iterator for Entries<'_> {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(self.walker.root());
                    warn!("Skipping unreadable entry {}: {}", path.display(), err);
                    let failure = WalkFailure {
                        relative_path: self.walker.relative(path),
                        reason: match err.io_error() {
                            Some(io) => io.to_string(),
                            None => err.to_string(),
                        },
                    };
                    self.walker.failures.borrow_mut().push(failure);
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            let file_type = entry.file_type();

            if self.walker.is_ignored(path) {
                trace!("Ignoring {}", path.display());
                if file_type.is_dir() {
                    self.inner.skip_current_dir();
                }
                continue;
            }

            if file_type.is_symlink() {
                debug!("Skipping symlink {}", path.display());
                continue;
            }

            let parent = path.parent().unwrap_or(self.walker.root()).to_path_buf();

            if file_type.is_dir() {
                return Some(Entry::Dir(DirectoryNode {
                    path: path.to_path_buf(),
                    parent,
                    name: file_name_of(path),
                    depth: entry.depth(),
                }));
            }

            let extension = path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            let base_name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();

            return Some(Entry::File(FileAsset {
                path: path.to_path_buf(),
                parent,
                base_name,
                extension,
                relative_path: self.walker.relative(path),
            }));
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default()
}
