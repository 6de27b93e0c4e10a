use serde::{Deserialize, Serialize};

/// The in-world date and what is coming up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub day: u32,
    pub month: String,
    pub season: String,
    pub weather: String,
    /// Upcoming event bullets flattened into one line, separated by ` · `.
    pub upcoming: String,
}
