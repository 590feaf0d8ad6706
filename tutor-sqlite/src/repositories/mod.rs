//! Stateless repositories, one per table group.
//!
//! Every method takes a `&Connection` and translates rows into the core's
//! record types. Nothing here writes.

mod context;
mod dialogue;
mod learner;
mod material;
mod outcome;

pub use context::ContextRepo;
pub use dialogue::DialogueRepo;
pub use learner::LearnerRepo;
pub use material::MaterialRepo;
pub use outcome::OutcomeRepo;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::debug;

/// Formats SQLite and the backend have used for timestamp columns.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a stored timestamp: RFC 3339, or a naive UTC `YYYY-MM-DD HH:MM:SS`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    let parsed = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc());
    if parsed.is_none() && !raw.is_empty() {
        debug!(raw, "unparseable timestamp");
    }
    parsed
}

fn parse_optional_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.as_deref().and_then(parse_timestamp)
}
