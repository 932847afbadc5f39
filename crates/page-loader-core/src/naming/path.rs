//! Extension extraction from a URL path.

/// Splits the extension off the last segment of `path`.
///
/// Returns the path without `.ext` and the extension itself. Only a non-empty,
/// alphanumeric suffix after the last `.` counts; dotfiles like `/.well-known`
/// have no extension.
pub fn split_extension(path: &str) -> (&str, Option<&str>) {
    let segment_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let segment = &path[segment_start..];
    let Some(dot) = segment.rfind('.') else {
        return (path, None);
    };
    let ext = &segment[dot + 1..];
    if dot == 0 || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return (path, None);
    }
    (&path[..segment_start + dot], Some(ext))
}
