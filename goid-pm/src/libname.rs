// Shared-library naming for `-buildmode=shared` style builds
//
// The name is derived from the command-line patterns when they are the
// reserved tree names, from the common import path prefix when a wildcard was
// expanded, and from the package list otherwise.

use crate::importpath::{common_path_prefix, is_local_import, is_reserved, is_wildcard};
use crate::platform::SharedLibStyle;
use crate::workspace::WorkspaceContext;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamingError {
    /// `std`/`cmd` given together with ordinary packages
    #[error("mixing of meta and non-meta packages is not allowed: {}", .args.join(" "))]
    MixedReserved { args: Vec<String> },

    /// Wildcard expansion produced packages under unrelated roots
    #[error(
        "cannot name shared library for {}: packages share no import path prefix ({})",
        .args.join(" "),
        .packages.join(", ")
    )]
    NoCommonPrefix {
        args: Vec<String>,
        packages: Vec<String>,
    },

    #[error("cannot name shared library for {}: no packages", .args.join(" "))]
    Empty { args: Vec<String> },
}

/// Derives shared-library file names for one platform
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedLibNamer {
    style: SharedLibStyle,
}

impl SharedLibNamer {
    pub fn new(style: SharedLibStyle) -> Self {
        Self { style }
    }

    /// Full file name, e.g. `libgopkg.in-lib1,gopkg.in-lib2.so`
    pub fn name<A, P>(
        &self,
        args: &[A],
        packages: &[P],
        workspace: &dyn WorkspaceContext,
    ) -> Result<String, NamingError>
    where
        A: AsRef<str>,
        P: AsRef<str>,
    {
        let base = base_name(args, packages, workspace)?;
        Ok(self.style.file_name(&base))
    }
}

/// File name using the reference (`lib<name>.so`) convention
pub fn libname<A, P>(
    args: &[A],
    packages: &[P],
    workspace: &dyn WorkspaceContext,
) -> Result<String, NamingError>
where
    A: AsRef<str>,
    P: AsRef<str>,
{
    SharedLibNamer::default().name(args, packages, workspace)
}

/// Library name without platform prefix or suffix; never contains `/`
pub fn base_name<A, P>(
    args: &[A],
    packages: &[P],
    workspace: &dyn WorkspaceContext,
) -> Result<String, NamingError>
where
    A: AsRef<str>,
    P: AsRef<str>,
{
    let core = core_name(args, packages, workspace)?;
    Ok(core.replace('/', "-"))
}

fn core_name<A, P>(
    args: &[A],
    packages: &[P],
    workspace: &dyn WorkspaceContext,
) -> Result<String, NamingError>
where
    A: AsRef<str>,
    P: AsRef<str>,
{
    let reserved = args.iter().filter(|arg| is_reserved(arg.as_ref())).count();
    if reserved > 0 {
        if reserved < args.len() {
            return Err(NamingError::MixedReserved {
                args: to_strings(args),
            });
        }
        return Ok(join(args));
    }

    if args.iter().any(|arg| is_wildcard(arg.as_ref())) {
        return wildcard_name(args, packages, workspace);
    }

    let mut seen = HashSet::new();
    let unique: Vec<&str> = packages
        .iter()
        .map(|path| path.as_ref())
        .filter(|path| seen.insert(*path))
        .collect();
    if unique.is_empty() {
        return Err(NamingError::Empty {
            args: to_strings(args),
        });
    }
    Ok(unique.join(","))
}

fn wildcard_name<A, P>(
    args: &[A],
    packages: &[P],
    workspace: &dyn WorkspaceContext,
) -> Result<String, NamingError>
where
    A: AsRef<str>,
    P: AsRef<str>,
{
    if packages.is_empty() {
        // Nothing expanded yet: name the tree after the directory the pattern starts at
        if let Some(root) = local_pattern_root(args, workspace) {
            log::debug!("naming shared library after workspace import path {root}");
            return Ok(root);
        }
    }

    let prefix = common_path_prefix(packages);
    if prefix.is_empty() {
        return Err(NamingError::NoCommonPrefix {
            args: to_strings(args),
            packages: to_strings(packages),
        });
    }
    Ok(prefix)
}

/// Import path of the base directory of a lone `./...`-style pattern
fn local_pattern_root<A: AsRef<str>>(
    args: &[A],
    workspace: &dyn WorkspaceContext,
) -> Option<String> {
    let [only] = args else {
        return None;
    };
    let dir = only.as_ref().strip_suffix("/...")?;
    if !is_local_import(dir) {
        return None;
    }
    workspace
        .import_path_for(dir)
        .filter(|root| !root.is_empty())
}

fn to_strings<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items.iter().map(|s| s.as_ref().to_string()).collect()
}

fn join<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| item.as_ref())
        .collect::<Vec<&str>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::{GopathWorkspace, NoWorkspace};
    use std::path::PathBuf;

    const NO_PKGS: &[&str] = &[];

    #[test]
    fn test_reserved_patterns() {
        assert_eq!(libname(&["std"], NO_PKGS, &NoWorkspace).unwrap(), "libstd.so");
        assert_eq!(
            libname(&["std", "cmd"], NO_PKGS, &NoWorkspace).unwrap(),
            "libstd,cmd.so"
        );
    }

    #[test]
    fn test_reserved_mixed_with_package() {
        let err = libname(&["std", "../lib2"], NO_PKGS, &NoWorkspace).unwrap_err();
        assert_eq!(
            err,
            NamingError::MixedReserved {
                args: vec!["std".to_string(), "../lib2".to_string()]
            }
        );
        assert!(err.to_string().contains("std ../lib2"));

        assert!(matches!(
            libname(&["cmd", "fmt"], NO_PKGS, &NoWorkspace),
            Err(NamingError::MixedReserved { .. })
        ));
    }

    #[test]
    fn test_explicit_packages() {
        let args: &[&str] = &[];
        assert_eq!(
            libname(args, &["gopkg.in/somelib"], &NoWorkspace).unwrap(),
            "libgopkg.in-somelib.so"
        );
        assert_eq!(
            libname(
                &["../lib1", "../lib2"],
                &["gopkg.in/lib1", "gopkg.in/lib2"],
                &NoWorkspace
            )
            .unwrap(),
            "libgopkg.in-lib1,gopkg.in-lib2.so"
        );
    }

    #[test]
    fn test_explicit_packages_deduplicated() {
        assert_eq!(
            libname(&["../somelib", "../somelib"], &["somelib", "somelib"], &NoWorkspace)
                .unwrap(),
            "libsomelib.so"
        );
        assert_eq!(
            base_name(&["a", "b", "c"], &["x/a", "x/b", "x/a"], &NoWorkspace).unwrap(),
            "x-a,x-b"
        );
    }

    #[test]
    fn test_wildcard_common_prefix() {
        let pkgs = ["gopkg.in/dir/lib1", "gopkg.in/lib2", "gopkg.in/lib3"];
        assert_eq!(
            libname(&["./..."], &pkgs, &NoWorkspace).unwrap(),
            "libgopkg.in.so"
        );
        assert_eq!(
            libname(&["./..."], &["somelib"], &NoWorkspace).unwrap(),
            "libsomelib.so"
        );
        assert_eq!(
            libname(&["net/..."], &["net/http", "net/http/httptest", "net/url"], &NoWorkspace)
                .unwrap(),
            "libnet.so"
        );
    }

    #[test]
    fn test_wildcard_without_common_prefix() {
        let err = libname(&["./..."], &["a/x", "b/y"], &NoWorkspace).unwrap_err();
        assert_eq!(
            err,
            NamingError::NoCommonPrefix {
                args: vec!["./...".to_string()],
                packages: vec!["a/x".to_string(), "b/y".to_string()],
            }
        );
        assert!(matches!(
            libname(&["./..."], NO_PKGS, &NoWorkspace),
            Err(NamingError::NoCommonPrefix { .. })
        ));
    }

    #[test]
    fn test_wildcard_named_after_workspace_directory() {
        let ws = GopathWorkspace::new(
            PathBuf::from("/go/src/gopkg.in"),
            vec![PathBuf::from("/go")],
        );
        assert_eq!(libname(&["./..."], NO_PKGS, &ws).unwrap(), "libgopkg.in.so");

        // Resolved packages take precedence over the directory lookup
        assert_eq!(
            libname(&["./..."], &["gopkg.in/dir/a", "gopkg.in/dir/b"], &ws).unwrap(),
            "libgopkg.in-dir.so"
        );
    }

    #[test]
    fn test_nothing_to_name() {
        assert!(matches!(
            libname(&["all", "./"], NO_PKGS, &NoWorkspace),
            Err(NamingError::Empty { .. })
        ));
    }

    #[test]
    fn test_platform_style() {
        let namer = SharedLibNamer::new(SharedLibStyle::MACHO);
        assert_eq!(
            namer.name(&["std"], NO_PKGS, &NoWorkspace).unwrap(),
            "libstd.dylib"
        );
    }
}
