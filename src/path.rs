// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Path helpers used by the driver for diagnostics and location expansion.
//!
//! POSIX recognizes `/` as the only separator; on Windows both `/` and `\`
//! are recognized.

#[cfg(windows)]
fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

#[cfg(not(windows))]
fn is_separator(c: char) -> bool {
    c == '/'
}

/// Returns the trailing path segment of `path`, with trailing separators
/// stripped first.
///
/// `path_base("/foo/bar///")` is `"bar"`; `path_base("bar")` is `"bar"`.
pub fn path_base(path: &str) -> &str {
    let trimmed = path.trim_end_matches(is_separator);

    match trimmed.rfind(is_separator) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Joins path components with the platform separator, avoiding doubled
/// separators at the seams.
pub fn path_build(components: &[&str]) -> String {
    #[cfg(windows)]
    const SEP: char = '\\';
    #[cfg(not(windows))]
    const SEP: char = '/';

    let mut out = String::new();

    for component in components {
        if out.is_empty() {
            out.push_str(component);
            continue;
        }

        let needs_sep = !out.ends_with(is_separator) && !component.starts_with(is_separator);
        if needs_sep {
            out.push(SEP);
        } else if out.ends_with(is_separator) && component.starts_with(is_separator) {
            out.pop();
        }
        out.push_str(component);
    }

    out
}

fn is_component_boundary(rest: &str) -> bool {
    match rest.chars().next() {
        None => true,
        Some(c) => is_separator(c),
    }
}

/// Expands a leading `~`, `$HOME`, or `$TEMP` prefix, provided it's followed
/// by a separator or the end of the string.
pub fn path_expand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if is_component_boundary(rest) {
            if let Ok(home) = std::env::var("HOME") {
                return path_build(&[&home, rest.trim_start_matches(is_separator)]);
            }
        }
    } else if let Some(rest) = path.strip_prefix("$HOME") {
        if is_component_boundary(rest) {
            if let Ok(home) = std::env::var("HOME") {
                return path_build(&[&home, rest.trim_start_matches(is_separator)]);
            }
        }
    } else if let Some(rest) = path.strip_prefix("$TEMP") {
        if is_component_boundary(rest) {
            let tmp = std::env::var("TEMP").unwrap_or_else(|_| "/tmp".to_string());
            return path_build(&[&tmp, rest.trim_start_matches(is_separator)]);
        }
    }

    path.to_string()
}

/// True iff `path` is absolute: starts with `/` on POSIX, or a drive letter
/// followed by `:\` on Windows.
pub fn path_absolute(path: &str) -> bool {
    #[cfg(windows)]
    {
        let bytes = path.as_bytes();
        bytes.len() >= 3
            && bytes[0].is_ascii_alphabetic()
            && bytes[1] == b':'
            && (bytes[2] == b'\\' || bytes[2] == b'/')
    }
    #[cfg(not(windows))]
    {
        path.starts_with('/')
    }
}
