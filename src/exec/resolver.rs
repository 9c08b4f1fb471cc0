// src/exec/resolver.rs

//! Binary resolution: logical tool name → executable path.
//!
//! A missing tool is an ordinary outcome in this domain (optional tools are
//! simply skipped), so lookups return `Option` rather than an error.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Looks tools up on `PATH`, then on a list of extra directories.
#[derive(Debug, Clone, Default)]
pub struct BinaryResolver {
    extra_dirs: Vec<PathBuf>,
}

impl BinaryResolver {
    /// `extra_dirs` are searched after `PATH`. A leading `~/` is expanded
    /// against `$HOME`.
    pub fn new<I, P>(extra_dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let extra_dirs = extra_dirs
            .into_iter()
            .map(|p| expand_home(p.as_ref()))
            .collect();
        Self { extra_dirs }
    }

    pub fn extra_dirs(&self) -> &[PathBuf] {
        &self.extra_dirs
    }

    /// Locate `name`.
    ///
    /// Names containing a path separator are treated as paths and only
    /// checked for existence.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.contains(std::path::MAIN_SEPARATOR) || name.contains('/') {
            let path = PathBuf::from(name);
            return path.is_file().then_some(path);
        }

        if let Ok(path) = which::which(name) {
            debug!(tool = name, path = %path.display(), "resolved on PATH");
            return Some(path);
        }

        if self.extra_dirs.is_empty() {
            debug!(tool = name, "tool not found");
            return None;
        }

        let paths = std::env::join_paths(&self.extra_dirs).ok()?;
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        match which::which_in(name, Some(paths), cwd) {
            Ok(path) => {
                debug!(tool = name, path = %path.display(), "resolved in extra search path");
                Some(path)
            }
            Err(_) => {
                debug!(tool = name, "tool not found");
                None
            }
        }
    }

    /// Convenience: is `name` available at all?
    pub fn is_available(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }
}

fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tool_is_none() {
        let resolver = BinaryResolver::default();
        assert_eq!(resolver.resolve("definitely-not-a-real-tool"), None);
        assert!(!resolver.is_available("definitely-not-a-real-tool"));
    }

    #[cfg(unix)]
    #[test]
    fn finds_tool_in_extra_dir() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("reconrun-fake-tool");
        std::fs::write(&tool, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let resolver = BinaryResolver::new([dir.path()]);
        assert_eq!(resolver.resolve("reconrun-fake-tool"), Some(tool));
    }

    #[cfg(unix)]
    #[test]
    fn explicit_paths_are_checked_directly() {
        let resolver = BinaryResolver::default();
        assert_eq!(resolver.resolve("/bin/sh"), Some(PathBuf::from("/bin/sh")));
        assert_eq!(resolver.resolve("/no/such/binary"), None);
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = std::env::var_os("HOME") else {
            return;
        };
        let resolver = BinaryResolver::new(["~/go/bin"]);
        assert_eq!(resolver.extra_dirs(), [PathBuf::from(home).join("go/bin")]);
    }
}
