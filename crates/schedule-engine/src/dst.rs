//! DST transition policies for wall-clock availability times.

use serde::{Deserialize, Serialize};

/// Policy for wall-clock times that fall into a spring-forward gap.
///
/// Ambiguous times (the repeated hour when clocks fall back) always resolve
/// to the earlier instant; only the gap needs a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Reject the time; the row that produced it is skipped.
    Skip,
    /// Move to the first valid instant after the gap (02:30 becomes 03:00).
    #[default]
    ShiftForward,
}
