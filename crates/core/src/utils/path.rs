//! Lexical path helpers
//!
//! Nothing here touches the file system: a source file that does not exist
//! yet must still normalize the same way as one that does.

use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against `cwd` and fold `.` and `..` components
pub fn normalize(path: &Path, cwd: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    fold_components(&absolute)
}

/// Fold `.` and `..` in a relative path such as a `srcs` entry
pub fn normalize_relative(path: &Path) -> PathBuf {
    fold_components(path)
}

/// `path` relative to `base`, when `path` lies beneath it
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(Path::to_path_buf)
}

fn fold_components(path: &Path) -> PathBuf {
    let mut folded = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    folded.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    folded.pop();
                } else if !folded.has_root() {
                    // Leading `..` in a relative path has nothing to fold into
                    folded.push("..");
                }
            }
            other => folded.push(other.as_os_str()),
        }
    }
    folded
}
