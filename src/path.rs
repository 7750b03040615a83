//! Lexical path handling.
//!
//! Every function here works on strings only. Nothing touches the
//! filesystem, so symbolic links are never resolved: a link inside an
//! allowed directory that points elsewhere is still considered contained.

use std::path::{MAIN_SEPARATOR, MAIN_SEPARATOR_STR};

fn is_sep(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Length of a leading `\\server\share` prefix.
fn unc_prefix_len(path: &str) -> Option<usize> {
    let mut chars = path.chars();
    if !(chars.next().is_some_and(is_sep) && chars.next().is_some_and(is_sep)) {
        return None;
    }
    let rest = &path[2..];
    let server = rest.find(is_sep)?;
    if server == 0 {
        return None;
    }
    let after = &rest[server + 1..];
    let share = after.find(is_sep).unwrap_or(after.len());
    if share == 0 {
        return None;
    }
    Some(2 + server + 1 + share)
}

/// Drive (`C:`) or UNC (`\\server\share`) prefix; always empty off Windows.
fn drive_prefix(path: &str) -> &str {
    if cfg!(windows) {
        if let Some(len) = unc_prefix_len(path) {
            return &path[..len];
        }
        let b = path.as_bytes();
        if b.len() >= 2 && b[0].is_ascii_alphabetic() && b[1] == b':' {
            return &path[..2];
        }
    }
    ""
}

fn segment_eq(a: &str, b: &str) -> bool {
    if cfg!(windows) {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

/// A path split into its drive prefix, root marker and resolved segments.
struct Parsed<'a> {
    /// Prefix with separators already converted to the platform one.
    prefix: String,
    rooted: bool,
    segments: Vec<&'a str>,
}

impl<'a> Parsed<'a> {
    fn new(path: &'a str) -> Self {
        let raw = drive_prefix(path);
        let rest = &path[raw.len()..];
        // a UNC share is always rooted
        let rooted = rest.starts_with(is_sep) || raw.starts_with(is_sep);
        let prefix: String = raw
            .chars()
            .map(|c| if is_sep(c) { MAIN_SEPARATOR } else { c })
            .collect();
        let mut segments: Vec<&str> = Vec::new();
        for seg in rest.split(is_sep) {
            match seg {
                "" | "." => {}
                ".." => match segments.last().copied() {
                    Some(last) if last != ".." => {
                        segments.pop();
                    }
                    // `..` above the root stays at the root
                    _ if rooted => {}
                    _ => segments.push(".."),
                },
                s => segments.push(s),
            }
        }
        Self { prefix, rooted, segments }
    }

    fn render(&self) -> String {
        let mut out = String::with_capacity(self.prefix.len() + 1 + self.segments.len() * 8);
        out.push_str(&self.prefix);
        if self.rooted {
            out.push(MAIN_SEPARATOR);
        }
        out.push_str(&self.segments.join(MAIN_SEPARATOR_STR));
        if out.is_empty() {
            out.push('.');
        }
        out
    }
}

/// Normalize a path lexically.
///
/// Both `/` and `\` are accepted as separators; the result uses the
/// platform separator. Empty and `.` segments are dropped, `..` is resolved
/// against the preceding segment, and trailing separators are removed.
///
/// ```
/// use safeinc::path::normalize;
/// use std::path::MAIN_SEPARATOR as S;
///
/// assert_eq!(normalize("a//b/./c/../d/"), format!("a{S}b{S}d"));
/// assert_eq!(normalize("a\\b"), normalize("a/b"));
/// assert_eq!(normalize(""), ".");
/// ```
pub fn normalize(path: &str) -> String {
    Parsed::new(path).render()
}

/// Whether a segment is absolute. Any segment starting with `/` or `\`
/// counts, as does a drive-rooted path on Windows.
pub fn is_absolute(segment: &str) -> bool {
    let prefix = drive_prefix(segment);
    segment.starts_with(is_sep) || segment[prefix.len()..].starts_with(is_sep)
}

/// Join segments left to right and normalize the result.
///
/// An absolute segment replaces everything accumulated before it, so the
/// last absolute segment wins. No segments yields an empty string.
///
/// ```
/// use safeinc::path::{normalize, normalize_join};
///
/// assert_eq!(normalize_join::<&str>(&[]), "");
/// assert_eq!(
///     normalize_join(&["dir1", "/abs/path", "file.txt"]),
///     normalize("/abs/path/file.txt")
/// );
/// ```
pub fn normalize_join<S: AsRef<str>>(segments: &[S]) -> String {
    let Some((first, rest)) = segments.split_first() else {
        return String::new();
    };
    let mut acc = first.as_ref().to_string();
    for segment in rest {
        let segment = segment.as_ref();
        if is_absolute(segment) || acc.is_empty() {
            acc = segment.to_string();
        } else if !segment.is_empty() {
            acc.push(MAIN_SEPARATOR);
            acc.push_str(segment);
        }
    }
    normalize(&acc)
}

/// Containing directory of `path`: `.` for a bare relative name, the root
/// for an entry directly under it.
pub fn dirname(path: &str) -> String {
    let mut parsed = Parsed::new(path);
    match parsed.segments.last().copied() {
        None => {}
        Some("..") => parsed.segments.push(".."),
        Some(_) => {
            parsed.segments.pop();
        }
    }
    parsed.render()
}

/// Join `segments` onto the directory containing `anchor`.
pub fn resolve_relative_to<S: AsRef<str>>(anchor: &str, segments: &[S]) -> String {
    let mut all = Vec::with_capacity(segments.len() + 1);
    all.push(dirname(anchor));
    all.extend(segments.iter().map(|s| s.as_ref().to_string()));
    normalize_join(&all)
}

fn anchor_at_cwd(path: &str) -> Option<String> {
    let cwd = std::env::current_dir().ok()?;
    let cwd = cwd.to_str()?;
    Some(normalize_join(&[cwd, path]))
}

/// Lexical path from `from` to `to`.
///
/// Unless both sides are absolute, both are anchored at the process working
/// directory first, so a leading `..` in `from` is resolved instead of
/// compared as a name. Returns `None` when no relative path can express the
/// step: across Windows drives or UNC shares, or when the working directory
/// is unavailable.
pub fn relative(from: &str, to: &str) -> Option<String> {
    let (from, to) = if is_absolute(from) && is_absolute(to) {
        (normalize(from), normalize(to))
    } else {
        (anchor_at_cwd(from)?, anchor_at_cwd(to)?)
    };
    let a = Parsed::new(&from);
    let b = Parsed::new(&to);
    if !segment_eq(&a.prefix, &b.prefix) || a.rooted != b.rooted {
        return None;
    }

    let common = a
        .segments
        .iter()
        .zip(&b.segments)
        .take_while(|(x, y)| segment_eq(x, y))
        .count();
    let mut parts: Vec<&str> = vec![".."; a.segments.len() - common];
    parts.extend_from_slice(&b.segments[common..]);
    Some(parts.join(MAIN_SEPARATOR_STR))
}

/// Whether `path` lies within `directory` (the directory itself included).
///
/// The relative path from `directory` to `path` must neither climb with a
/// leading `..` segment nor be absolute.
pub fn is_contained(path: &str, directory: &str) -> bool {
    match relative(directory, path) {
        Some(rel) => rel.split(is_sep).next() != Some("..") && !is_absolute(&rel),
        None => false,
    }
}
