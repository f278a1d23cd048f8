//! Collision-resistant object naming.

use chrono::Utc;
use uuid::Uuid;

/// Fallback stem when the title sanitizes to nothing.
const DEFAULT_STEM: &str = "document";

/// Derive a collision-resistant object name from a document title.
///
/// Non-alphanumeric runs in the title collapse to single dashes; a UTC
/// timestamp plus a short random identifier keep repeated uploads of the
/// same title from overwriting each other.
#[must_use]
pub fn object_name(title: &str) -> String {
    let mut stem = String::with_capacity(title.len());
    let mut last_dash = true;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            stem.push(ch);
            last_dash = false;
        } else if !last_dash {
            stem.push('-');
            last_dash = true;
        }
    }
    let stem = stem.trim_end_matches('-');
    let stem = if stem.is_empty() { DEFAULT_STEM } else { stem };

    let timestamp = Utc::now().format("%Y%m%dT%H%M%S");
    let unique = Uuid::new_v4().simple().to_string();
    format!("{stem}-{timestamp}-{}.pdf", &unique[..8])
}
