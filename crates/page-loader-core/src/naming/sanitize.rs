//! Filesystem-safe name normalization.

/// Separator written in place of every run of non-alphanumeric characters.
pub const SEPARATOR: char = '-';

/// Longest file name, in bytes, most Linux filesystems accept.
pub const NAME_MAX: usize = 255;

/// Collapses each maximal run of characters outside `[A-Za-z0-9]` into a single
/// [`SEPARATOR`] and trims separators from both ends.
///
/// - `ru.hexlet.io/courses` → `ru-hexlet-io-courses`
/// - `example.com/` → `example-com`
pub fn collapse_non_alphanumeric(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_separator = false;

    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            prev_separator = false;
        } else if !prev_separator {
            out.push(SEPARATOR);
            prev_separator = true;
        }
    }

    out.trim_matches(SEPARATOR).to_string()
}

/// Cuts `name` to at most `max` bytes on a char boundary, then drops any
/// trailing [`SEPARATOR`] the cut exposed.
pub fn truncate_name(name: &str, max: usize) -> &str {
    if name.len() <= max {
        return name;
    }
    let mut take = max;
    while take > 0 && !name.is_char_boundary(take) {
        take -= 1;
    }
    name[..take].trim_end_matches(SEPARATOR)
}
