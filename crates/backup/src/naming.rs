use chrono::NaiveDateTime;

/// Timestamp layout used in archive file names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

const FORBIDDEN: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Used when nothing usable is left of a game name.
pub const FALLBACK_NAME: &str = "Unnamed";

/// Removes characters that are not allowed in Windows file names.
///
/// A name left empty, blank or made only of dots becomes [`FALLBACK_NAME`]
/// so the archive never lands in, or above, the backup root.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name.chars().filter(|c| !FORBIDDEN.contains(c)).collect();
    if cleaned.trim().trim_matches('.').is_empty() {
        return FALLBACK_NAME.to_string();
    }
    cleaned
}

/// Returns `<sanitized>_<YYYY-MM-DD_HH-MM-SS>.zip`.
pub fn archive_file_name(game_name: &str, at: NaiveDateTime) -> String {
    format!(
        "{}_{}.zip",
        sanitize_name(game_name),
        at.format(TIMESTAMP_FORMAT)
    )
}
