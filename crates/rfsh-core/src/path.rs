//! Remote path expression resolution.
//!
//! Converts a user-typed path expression plus the tracked current directory
//! into an absolute remote path. Resolution is intentionally shallow: it
//! strips a single leading `./` or `../` and trailing slashes, nothing more.
//! An embedded `a/../b` token or a repeated `..` prefix is passed through
//! untouched, and an already-absolute input is returned verbatim. Downstream
//! behavior depends on this exact scope, so the tests below pin it.

/// Parent of an absolute path: strips the last `/`-delimited segment.
/// The root is its own parent.
pub fn parent_dir(path: &str) -> String {
    if path == "/" {
        return "/".to_string();
    }
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// Resolve a path expression against the current directory.
///
/// Pure and infallible; malformed input is normalized best-effort.
pub fn resolve(input: &str, cwd: &str) -> String {
    if input == "/" {
        return "/".to_string();
    }
    if input.starts_with('/') {
        // Absolute inputs are taken as canonical without further
        // normalization.
        return input.to_string();
    }
    if input == "." {
        return cwd.to_string();
    }
    if input == ".." {
        return parent_dir(cwd);
    }

    let input = input.trim_end_matches('/');
    let cwd = cwd.trim_end_matches('/');

    if let Some(rest) = input.strip_prefix("../") {
        return join(&parent_dir(cwd), rest);
    }
    if let Some(rest) = input.strip_prefix("./") {
        return join(cwd, rest);
    }
    join(cwd, input)
}

/// Join a base directory and a relative remainder without doubling the
/// separator when the base is the root (or was trimmed down to nothing).
fn join(base: &str, rest: &str) -> String {
    if base.is_empty() || base == "/" {
        format!("/{rest}")
    } else {
        format!("{base}/{rest}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_root() {
        assert_eq!(resolve("/", "/a/b"), "/");
    }

    #[test]
    fn absolute_input_is_verbatim() {
        assert_eq!(resolve("/x/y", "/a/b"), "/x/y");
        // Deliberately no normalization of absolute inputs.
        assert_eq!(resolve("/x/../y", "/a/b"), "/x/../y");
    }

    #[test]
    fn dot_is_current_directory() {
        assert_eq!(resolve(".", "/a/b"), "/a/b");
        assert_eq!(resolve(".", "/"), "/");
    }

    #[test]
    fn dotdot_is_parent() {
        assert_eq!(resolve("..", "/a/b"), "/a");
        assert_eq!(resolve("..", "/a"), "/");
        assert_eq!(resolve("..", "/"), "/");
    }

    #[test]
    fn relative_appends_to_current_directory() {
        assert_eq!(resolve("c", "/a/b"), "/a/b/c");
        assert_eq!(resolve("c", "/"), "/c");
    }

    #[test]
    fn dot_slash_prefix_is_stripped() {
        assert_eq!(resolve("./c", "/a/b"), "/a/b/c");
        assert_eq!(resolve("./c", "/"), "/c");
    }

    #[test]
    fn dotdot_slash_prefix_resolves_against_parent() {
        assert_eq!(resolve("../c", "/a/b"), "/a/c");
        assert_eq!(resolve("../c", "/a"), "/c");
    }

    #[test]
    fn trailing_slashes_are_ignored() {
        assert_eq!(resolve("c/", "/a/b"), resolve("c", "/a/b"));
        assert_eq!(resolve("c///", "/a/b"), "/a/b/c");
        assert_eq!(resolve("c", "/a/b/"), "/a/b/c");
    }

    #[test]
    fn single_level_stripping_only() {
        // Only the leading ./ or ../ is interpreted; anything deeper
        // passes through untouched.
        assert_eq!(resolve("../../c", "/a/b"), "/a/../c");
        assert_eq!(resolve("x/../y", "/a"), "/a/x/../y");
    }

    #[test]
    fn parent_dir_of_nested_path() {
        assert_eq!(parent_dir("/a/b/c"), "/a/b");
        assert_eq!(parent_dir("/a"), "/");
        assert_eq!(parent_dir("/"), "/");
    }
}
