//! File resolution across an ordered list of roots.

use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::root::RootHandle;

/// File served for a request.
#[derive(Debug, Clone, PartialEq)]
pub struct ServedFile {
    /// Name of the file that was read (the index file for directory requests).
    pub filename: String,
    pub body: Bytes,
    /// Position of the root that supplied the file.
    pub root: usize,
}

/// Outcome of resolving a path suffix.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(ServedFile),
    Missing,
}

/// Outcome of looking up a target under a single root.
enum Lookup {
    Hit { filename: String, body: Bytes },
    Miss,
}

/// Directory segments to walk and file names to try, in order.
#[derive(Debug, PartialEq)]
struct Target {
    dirs: Vec<String>,
    candidates: Vec<String>,
}

/// Resolves path suffixes against root lists.
#[derive(Debug, Clone)]
pub struct FileResolver {
    index_files: Arc<[String]>,
}

impl FileResolver {
    /// `index_files` are tried in order for directory requests.
    pub fn new(index_files: Vec<String>) -> Self {
        Self {
            index_files: index_files.into(),
        }
    }

    /// Resolve `suffix` against `roots`, first root first.
    ///
    /// A root that cannot supply the file (missing directory, missing file,
    /// unreadable entry) is skipped; only when every root misses is the
    /// result [`Resolution::Missing`].
    pub async fn resolve(&self, suffix: &str, roots: &[RootHandle]) -> Resolution {
        let Some(target) = self.target(suffix) else {
            debug!("Unresolvable suffix {:?}", suffix);
            return Resolution::Missing;
        };

        for (index, root) in roots.iter().enumerate() {
            match lookup(root, &target).await {
                Lookup::Hit { filename, body } => {
                    debug!("Resolved {:?} from {} ({} bytes)", suffix, root, body.len());
                    return Resolution::Found(ServedFile {
                        filename,
                        body,
                        root: index,
                    });
                }
                Lookup::Miss => continue,
            }
        }

        Resolution::Missing
    }

    /// Split a suffix into directory segments and candidate file names.
    ///
    /// Empty segments are dropped. A suffix that is empty or ends in `/` names a
    /// directory and is served by its index file; otherwise the last segment is
    /// the file name. Segments are percent-decoded; undecodable input yields `None`.
    fn target(&self, suffix: &str) -> Option<Target> {
        let mut segments = suffix
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| urlencoding::decode(s).ok().map(Cow::into_owned))
            .collect::<Option<Vec<String>>>()?;

        if suffix.is_empty() || suffix.ends_with('/') {
            return Some(Target {
                dirs: segments,
                candidates: self.index_files.to_vec(),
            });
        }

        let filename = segments.pop()?;
        Some(Target {
            dirs: segments,
            candidates: vec![filename],
        })
    }
}

async fn lookup(root: &RootHandle, target: &Target) -> Lookup {
    let mut dir = root.open();
    for name in &target.dirs {
        match dir.subdirectory(name).await {
            Ok(next) => dir = next,
            Err(e) => {
                debug!("Skipping {}: {}", root, e);
                return Lookup::Miss;
            }
        }
    }

    for filename in &target.candidates {
        match dir.read_file(filename).await {
            Ok(body) => {
                return Lookup::Hit {
                    filename: filename.clone(),
                    body,
                };
            }
            Err(e) => debug!("No {:?} in {}: {}", filename, root, e),
        }
    }

    Lookup::Miss
}
