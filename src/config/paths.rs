//! Path resolution for settings values.
//!
//! Paths written in the settings document may be relative to the working
//! root or start with `~`. They are normalised lexically so that a path found
//! by auto-detection and the same path typed by the user compare equal.

use std::path::{Component, Path, PathBuf};

/// Expand `~`, anchor relative paths at `root`, and normalise.
pub fn resolve_path(root: &Path, raw: &str) -> PathBuf {
    let expanded = expand_tilde(raw);
    let anchored = if expanded.is_absolute() {
        expanded
    } else {
        root.join(expanded)
    };
    normalize(&anchored)
}

/// Replace a leading `~` with the home directory.
pub fn expand_tilde(raw: &str) -> PathBuf {
    if raw == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(raw));
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Remove `.` components, fold `..`, and drop trailing separators without
/// touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Last path component as text, ignoring trailing separators.
pub fn basename(raw: &str) -> Option<String> {
    normalize(Path::new(raw))
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_are_anchored_at_root() {
        let resolved = resolve_path(Path::new("/work"), "./lmod");
        assert_eq!(resolved, PathBuf::from("/work/lmod"));
    }

    #[test]
    fn absolute_paths_are_kept() {
        let resolved = resolve_path(Path::new("/work"), "/opt/apps/lmod/");
        assert_eq!(resolved, PathBuf::from("/opt/apps/lmod"));
    }

    #[test]
    fn parent_components_are_folded() {
        let resolved = resolve_path(Path::new("/work/sub"), "../lmod/./x/..");
        assert_eq!(resolved, PathBuf::from("/work/lmod"));
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/.cc_images"), home.join(".cc_images"));
        }
    }

    #[test]
    fn basename_ignores_trailing_separator() {
        assert_eq!(basename("./opt/lmod/").as_deref(), Some("lmod"));
        assert_eq!(basename("lmod").as_deref(), Some("lmod"));
        assert_eq!(basename("/opt/modules").as_deref(), Some("modules"));
    }
}
