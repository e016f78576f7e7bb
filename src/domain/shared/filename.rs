use once_cell::sync::Lazy;
use regex::Regex;

/// Default cap on the base name length (extension excluded)
pub const DEFAULT_MAX_LENGTH: usize = 80;

/// Base name used whenever the input sanitizes down to nothing
pub const PLACEHOLDER_NAME: &str = "tts";

const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const EDGE_CHARS: &[char] = &['.', '_', ' '];

/// Windows device names that cannot be used as file names, whatever the case
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

static SEPARATOR_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s_]+").expect("separator pattern is valid"));

/// Turn arbitrary text into a file name that is safe on the most restrictive
/// common filesystem.
///
/// - Forbidden characters `<>:"/\|?*` and control characters become underscores
/// - Runs of whitespace and underscores collapse to a single underscore
/// - Leading/trailing dots, underscores and spaces are removed
/// - Reserved device names (CON, PRN, AUX, NUL, COM1-9, LPT1-9) get a `_` prefix
/// - The base is truncated to `max_length` characters (0 disables truncation)
/// - `extension`, if any, is appended after stripping its leading dots
pub fn sanitize_filename(text: &str, max_length: usize, extension: Option<&str>) -> String {
    let trimmed = text.trim();
    let source = if trimmed.is_empty() {
        PLACEHOLDER_NAME
    } else {
        trimmed
    };

    let replaced: String = source
        .chars()
        .map(|c| {
            if c.is_control() || FORBIDDEN_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();
    let collapsed = SEPARATOR_RUNS.replace_all(&replaced, "_");

    let mut name = or_placeholder(collapsed.trim_matches(EDGE_CHARS), 0);

    if is_reserved(&name) {
        name = format!("_{name}");
    }

    if max_length > 0 && name.chars().count() > max_length {
        let truncated: String = name.chars().take(max_length).collect();
        name = or_placeholder(truncated.trim_end_matches(EDGE_CHARS), max_length);

        // Cutting "CONSOLE" down can land exactly on a device name
        if is_reserved(&name) {
            name = if name.chars().count() < max_length {
                format!("_{name}")
            } else {
                or_placeholder("", max_length)
            };
        }
    }

    match extension
        .map(|ext| ext.trim_start_matches('.'))
        .filter(|ext| !ext.is_empty())
    {
        Some(ext) => format!("{name}.{ext}"),
        None => name,
    }
}

fn or_placeholder(name: &str, max_length: usize) -> String {
    if !name.is_empty() {
        return name.to_string();
    }
    if max_length > 0 {
        PLACEHOLDER_NAME.chars().take(max_length).collect()
    } else {
        PLACEHOLDER_NAME.to_string()
    }
}

fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}
