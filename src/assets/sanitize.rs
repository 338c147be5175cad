//! Filename sanitization for thumbnail assets

/// Characters that are not allowed in asset filenames
pub const RESERVED_CHARS: [char; 8] = ['/', ':', '*', '?', '"', '<', '>', '|'];

/// Replaces every reserved filename character with `_`
///
/// Total and idempotent: the output never contains a reserved character, and
/// sanitizing an already sanitized string returns it unchanged.
///
/// # Example
///
/// ```
/// use event_harvester::assets::sanitize_filename;
///
/// assert_eq!(sanitize_filename("Q&A: 10/10?"), "Q&A_ 10_10_");
/// ```
pub fn sanitize_filename(text: &str) -> String {
    text.chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Builds the thumbnail filename for an event
///
/// Each component is sanitized on its own before joining, so a reserved
/// character at a component edge can never blur the boundary between them.
/// Spaces in the date are turned into underscores first.
pub fn thumbnail_filename(date_time: &str, event_name: &str) -> String {
    let date_part = sanitize_filename(&date_time.replace(' ', "_"));
    let name_part = sanitize_filename(event_name);
    format!("{}_{}.jpg", date_part, name_part)
}
