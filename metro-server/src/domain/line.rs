//! Metro line metadata.

use serde::Serialize;

use super::LineId;

/// A metro line as shown to riders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Line {
    /// Timetable route id
    pub id: LineId,
    /// Short public name (e.g. "7bis")
    pub name: String,
    /// Background color, hex without the leading `#`
    pub color: String,
}

impl Line {
    /// Create a new line.
    pub fn new(id: LineId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
        }
    }
}
