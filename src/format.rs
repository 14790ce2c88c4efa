use crate::state::Reading;

pub const UNIT: &str = "W";
pub const PLACEHOLDER: &str = "—";

/// Whole units with the unit suffix, or the placeholder for a resolution gap.
pub fn format_reading(reading: Reading) -> String {
    match reading {
        Reading::Value(value) => format!("{} {}", value.round() as i64, UNIT),
        Reading::Unresolved => PLACEHOLDER.to_string(),
    }
}
