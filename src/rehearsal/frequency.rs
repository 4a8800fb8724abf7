/*!
 * Preset recurrence frequencies offered to users.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named recurrence options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RehearsalFrequency {
    Daily,
    EveryOtherDay,
    TwiceAWeek,
    Weekly,
    BiWeekly,
    Monthly,
}

impl RehearsalFrequency {
    /// Every preset, shortest first
    pub const ALL: [RehearsalFrequency; 6] = [
        RehearsalFrequency::Daily,
        RehearsalFrequency::EveryOtherDay,
        RehearsalFrequency::TwiceAWeek,
        RehearsalFrequency::Weekly,
        RehearsalFrequency::BiWeekly,
        RehearsalFrequency::Monthly,
    ];

    /// Days between occurrences
    pub fn days(&self) -> u32 {
        match self {
            Self::Daily => 1,
            Self::EveryOtherDay => 2,
            Self::TwiceAWeek => 3,
            Self::Weekly => 7,
            Self::BiWeekly => 14,
            Self::Monthly => 30,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::EveryOtherDay => "Every Other Day",
            Self::TwiceAWeek => "Twice a Week",
            Self::Weekly => "Weekly",
            Self::BiWeekly => "Bi-weekly",
            Self::Monthly => "Monthly",
        }
    }

    /// Preset with exactly this many days, if any
    pub fn from_days(days: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.days() == days)
    }
}

impl fmt::Display for RehearsalFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} days)", self.label(), self.days())
    }
}
