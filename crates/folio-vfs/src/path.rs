//! Path normalization and resolution.
//!
//! All paths handed to the tree are absolute and normalized: leading `/`,
//! no empty or `.` components, `..` applied, no trailing `/` except root.

use std::borrow::Cow;

/// Check whether a path is already in normal form.
fn is_normalized(path: &str) -> bool {
    if !path.starts_with('/') {
        return false;
    }
    if path == "/" {
        return true;
    }
    if path.ends_with('/') {
        return false;
    }
    path[1..]
        .split('/')
        .all(|seg| !seg.is_empty() && seg != "." && seg != "..")
}

/// Normalize an absolute-or-rooted path.
///
/// `..` pops one component; extra `..` at the root are dropped. Returns the
/// input unchanged (zero-alloc) when already in normal form.
pub fn normalize(path: &str) -> Cow<'_, str> {
    if is_normalized(path) {
        return Cow::Borrowed(path);
    }
    let mut parts: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {},
            ".." => {
                parts.pop();
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        Cow::Owned("/".to_string())
    } else {
        Cow::Owned(format!("/{}", parts.join("/")))
    }
}

/// Resolve user input against the working directory and home directory.
///
/// - anything starting with `~` is relative to `home` (`~x` is `home/x`)
/// - `/...` is absolute
/// - anything else is relative to `cwd`
pub fn resolve(cwd: &str, home: &str, input: &str) -> String {
    let raw = if let Some(rest) = input.strip_prefix('~') {
        format!("{home}/{}", rest.trim_start_matches('/'))
    } else if input.starts_with('/') {
        input.to_string()
    } else if input.is_empty() {
        cwd.to_string()
    } else {
        format!("{cwd}/{input}")
    };
    normalize(&raw).into_owned()
}

/// Return the parent of a normalized path.
pub fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &path[..i],
    }
}

/// Return the last component of a normalized path (`""` for root).
pub fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

/// Join a directory path and a child name.
pub fn join(dir: &str, name: &str) -> String {
    if dir == "/" {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Collapse the home prefix to `~` for display.
pub fn display(path: &str, home: &str) -> String {
    if path == home {
        "~".to_string()
    } else if let Some(rest) = path.strip_prefix(home).and_then(|r| r.strip_prefix('/')) {
        format!("~/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_borrowed_when_clean() {
        assert!(matches!(normalize("/a/b"), Cow::Borrowed(_)));
        assert!(matches!(normalize("/"), Cow::Borrowed(_)));
    }

    #[test]
    fn normalize_collapses_and_pops() {
        assert_eq!(normalize("/a//b/./c/../d/"), "/a/b/d");
        assert_eq!(normalize("/.."), "/");
        assert_eq!(normalize("/a/../../.."), "/");
        assert_eq!(normalize("a/b"), "/a/b");
    }

    #[test]
    fn resolve_relative_absolute_home() {
        assert_eq!(resolve("/home/u", "/home/u", "docs"), "/home/u/docs");
        assert_eq!(resolve("/home/u", "/home/u", "/etc"), "/etc");
        assert_eq!(resolve("/", "/home/u", "~"), "/home/u");
        assert_eq!(resolve("/", "/home/u", "~/p/../q"), "/home/u/q");
        assert_eq!(resolve("/a/b", "/home/u", ".."), "/a");
        assert_eq!(resolve("/a/b", "/home/u", "../../../.."), "/");
        assert_eq!(resolve("/a", "/home/u", ""), "/a");
    }

    #[test]
    fn tilde_prefix_is_home_relative() {
        assert_eq!(resolve("/x", "/home/u", "~other"), "/home/u/other");
        assert_eq!(resolve("/x", "/home/u", "~//a"), "/home/u/a");
        assert_eq!(resolve("/x", "/", "~"), "/");
    }

    #[test]
    fn parent_and_file_name() {
        assert_eq!(parent("/a/b"), "/a");
        assert_eq!(parent("/a"), "/");
        assert_eq!(parent("/"), "/");
        assert_eq!(file_name("/a/b.txt"), "b.txt");
        assert_eq!(file_name("/"), "");
    }

    #[test]
    fn join_handles_root() {
        assert_eq!(join("/", "a"), "/a");
        assert_eq!(join("/a", "b"), "/a/b");
    }

    #[test]
    fn display_collapses_home() {
        assert_eq!(display("/home/u", "/home/u"), "~");
        assert_eq!(display("/home/u/docs", "/home/u"), "~/docs");
        assert_eq!(display("/home/user2", "/home/u"), "/home/user2");
        assert_eq!(display("/etc", "/home/u"), "/etc");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normalize_is_idempotent(path in "[/a-z0-9_.]{1,50}") {
                let once = normalize(&path).into_owned();
                let twice = normalize(&once).into_owned();
                prop_assert_eq!(&once, &twice, "normalize must be idempotent");
            }

            #[test]
            fn normalize_never_has_dot_segments(path in "[/a-z.]{0,40}") {
                let normed = normalize(&path);
                prop_assert!(normed.starts_with('/'));
                prop_assert!(!normed.contains("//"));
                for seg in normed.split('/').skip(1) {
                    prop_assert!(seg != "." && seg != "..", "dot segment in {}", normed);
                }
            }

            #[test]
            fn resolve_is_idempotent_for_absolute(path in "/[a-z0-9_./~]{0,40}") {
                let once = resolve("/cwd", "/home/u", &path);
                let twice = resolve("/cwd", "/home/u", &once);
                prop_assert_eq!(once, twice);
            }
        }
    }
}
