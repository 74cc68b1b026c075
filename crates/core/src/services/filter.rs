use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::model::Declaration;
use crate::services::ExtractError;

/// Path-prefix selection of declarations.
///
/// A declaration is kept when its lexically normalized absolute path starts with
/// the normalized target root and with none of the normalized exclusion roots.
/// Symlinks are not resolved on either side. Matching is textual: a root of
/// `/a/b` also matches `/a/bc/X.sol`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFilter {
    target: String,
    excludes: Vec<String>,
}

impl PathFilter {
    /// Normalize `target` and `excludes`.
    ///
    /// Relative paths resolve against `base_dir`. With `strict`, the target must
    /// exist and be a directory. Exclusion roots that do not exist are dropped.
    pub fn new<P: AsRef<Path>>(
        target: &Path,
        excludes: &[P],
        strict: bool,
        base_dir: &Path,
    ) -> Result<Self, ExtractError> {
        let target_abs = absolutize(target, base_dir);
        if strict {
            if !target_abs.exists() {
                return Err(ExtractError::MissingTarget(target.to_path_buf()));
            }
            if !target_abs.is_dir() {
                return Err(ExtractError::InvalidTarget(target.to_path_buf()));
            }
        }
        let target = normalized_string(&target_abs);

        let excludes = excludes
            .iter()
            .filter_map(|raw| {
                let raw = raw.as_ref();
                let abs = absolutize(raw, base_dir);
                if abs.exists() {
                    Some(normalized_string(&abs))
                } else {
                    warn!(path = %raw.display(), "ignoring exclusion path that does not exist");
                    None
                }
            })
            .collect();

        Ok(Self { target, excludes })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    pub fn includes(&self, declaration: &Declaration) -> bool {
        let path = normalized_string(&declaration.absolute_path);
        path.starts_with(self.target.as_str())
            && !self.excludes.iter().any(|exclude| path.starts_with(exclude.as_str()))
    }

    /// Stable filter: results keep input order.
    pub fn filter<'a>(&self, declarations: &'a [Declaration]) -> Vec<&'a Declaration> {
        let selected: Vec<&Declaration> =
            declarations.iter().filter(|decl| self.includes(decl)).collect();
        debug!(
            target = %self.target,
            excludes = self.excludes.len(),
            considered = declarations.len(),
            selected = selected.len(),
            "filtered declarations"
        );
        selected
    }
}

fn absolutize(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn normalized_string(path: &Path) -> String {
    lexical_normalize(path).to_string_lossy().into_owned()
}

/// Drop `.` components and fold `..` without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
