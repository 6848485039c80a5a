/// Replaces characters that are invalid in Windows (and awkward elsewhere)
/// file names with `_`.
///
/// # Example
///
/// ```
/// use tunedrop::core::utils::sanitize_filename;
///
/// assert_eq!(sanitize_filename("AC/DC - T.N.T.mp3"), "AC_DC - T.N.T.mp3");
/// assert_eq!(sanitize_filename("What? <Live>.mp3"), "What_ _Live_.mp3");
/// ```
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect()
}

/// Builds the local file name for a track: `"{artist} - {title}.mp3"`, sanitized.
pub fn track_filename(artist: &str, title: &str) -> String {
    sanitize_filename(&format!("{} - {}.mp3", artist, title))
}

/// Shortens text for log lines and user notices, appending `…` when cut.
pub fn truncate_for_display(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push('…');
    cut
}
