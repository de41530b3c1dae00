use crate::error::VfsError;

pub type Result<T> = std::result::Result<T, VfsError>;

pub mod utils {
    use std::path::{Component, Path, PathBuf};

    /// Lexically normalizes `path`: skips `.` and empty segments, resolves `..`
    /// (never climbing above the root) and drops trailing separators.
    pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
        let mut result = PathBuf::new();
        for component in path.as_ref().components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    // `pop()` is a no-op on `/`, which clamps `..` at the root
                    result.pop();
                }
                _ => result.push(component),
            }
        }
        result
    }

    /// Names of the normal segments of `path`, root marker excluded.
    pub fn segments<P: AsRef<Path>>(path: P) -> Vec<String> {
        path.as_ref()
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect()
    }

    /// Converts an archive member name (`./home/docs/`, `/home/docs`, `home//docs`)
    /// into its canonical form `home/docs`.
    /// Returns `None` for names that denote the root itself.
    pub fn member_key<P: AsRef<Path>>(name: P) -> Option<String> {
        let segments = segments(normalize(Path::new("/").join(name)));
        if segments.is_empty() {
            return None;
        }
        Some(segments.join("/"))
    }

    /// Archive member name of an inner absolute path (root marker stripped).
    pub fn member_name<P: AsRef<Path>>(inner_path: P) -> String {
        segments(inner_path).join("/")
    }
}
