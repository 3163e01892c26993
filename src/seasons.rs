/// Season partition for the composite pipeline.
///
/// Groups the 12 calendar months into the wet and dry season of the target
/// region. The two sets are complementary and exhaustive — every month
/// belongs to exactly one season — and the partition never depends on the
/// polarization or on anything but the scene's own acquisition timestamp.

use chrono::{DateTime, Datelike, Utc};

use crate::model::{Scene, SceneMeta};

// ---------------------------------------------------------------------------
// Month sets
// ---------------------------------------------------------------------------

/// Months of the wet season (December through May).
pub const WET_MONTHS: [u32; 6] = [12, 1, 2, 3, 4, 5];

/// Months of the dry season (June through November).
pub const DRY_MONTHS: [u32; 6] = [6, 7, 8, 9, 10, 11];

/// The two season partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Wet,
    Dry,
}

impl Season {
    /// Months belonging to this season.
    pub fn months(&self) -> &'static [u32] {
        match self {
            Season::Wet => &WET_MONTHS,
            Season::Dry => &DRY_MONTHS,
        }
    }

    /// Whether a calendar month (1-12) falls in this season.
    pub fn contains(&self, month: u32) -> bool {
        self.months().contains(&month)
    }

    /// Season of a calendar month. Returns `None` for out-of-range input
    /// (months outside 1-12 belong to neither partition).
    pub fn of_month(month: u32) -> Option<Season> {
        if WET_MONTHS.contains(&month) {
            Some(Season::Wet)
        } else if DRY_MONTHS.contains(&month) {
            Some(Season::Dry)
        } else {
            None
        }
    }

    /// Label used in the contributing-scene report ("Wet" / "Dry").
    pub fn label(&self) -> &'static str {
        match self {
            Season::Wet => "Wet",
            Season::Dry => "Dry",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Month tagging
// ---------------------------------------------------------------------------

/// Calendar month (1-12) of an acquisition timestamp.
///
/// Purely a function of the scene's own timestamp; wall-clock time is
/// never consulted.
pub fn month_of(acquired: DateTime<Utc>) -> u32 {
    acquired.month()
}

/// Attach the derived month attribute to scene metadata.
pub fn tag_month(mut meta: SceneMeta) -> SceneMeta {
    meta.month = month_of(meta.acquired);
    meta
}

// ---------------------------------------------------------------------------
// Partitioning
// ---------------------------------------------------------------------------

/// Scenes of one season, in collection order.
///
/// A scene whose tagged month belongs to neither set (impossible for
/// months 1-12, by the partition invariant) is excluded from both.
pub fn partition<'a>(scenes: &'a [Scene], season: Season) -> Vec<&'a Scene> {
    scenes
        .iter()
        .filter(|s| season.contains(s.meta.month))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
