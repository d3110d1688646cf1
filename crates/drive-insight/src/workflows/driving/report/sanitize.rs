/// Emphasis sequences the generator is told not to emit.
pub const EMPHASIS_MARKERS: [&str; 3] = ["**", "###", "--"];

/// Strips emphasis sequences and surrounding whitespace. Removal repeats until
/// no marker remains, since deleting one can join the halves of another.
pub fn sanitize_report_text(raw: &str) -> String {
    let mut text = raw.to_string();
    while EMPHASIS_MARKERS.iter().any(|marker| text.contains(marker)) {
        for marker in EMPHASIS_MARKERS {
            text = text.replace(marker, "");
        }
    }
    text.trim().to_string()
}
