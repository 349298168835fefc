//! Point-based rank ladder.

use serde::Serialize;

/// One rung of the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rank {
    pub name: &'static str,
    /// Minimum total points for this rank.
    pub threshold: u64,
}

/// Ranks in ascending threshold order. The first threshold is zero.
pub const RANKS: [Rank; 5] = [
    Rank { name: "Aspirant", threshold: 0 },
    Rank { name: "Junior Manager", threshold: 500 },
    Rank { name: "Senior Auditor", threshold: 1500 },
    Rank { name: "Chief Inspector", threshold: 4000 },
    Rank { name: "Elite Commissioner", threshold: 10000 },
];

/// Highest rank whose threshold `points` meets.
pub fn rank_for(points: u64) -> &'static Rank {
    RANKS
        .iter()
        .rev()
        .find(|r| points >= r.threshold)
        .unwrap_or(&RANKS[0])
}

/// Next rank above the one `points` currently holds, if any.
pub fn next_rank(points: u64) -> Option<&'static Rank> {
    RANKS.iter().find(|r| r.threshold > points)
}

/// Current rank plus distance to the next one.
#[derive(Debug, Clone, Serialize)]
pub struct RankProgress {
    pub current: &'static Rank,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<&'static Rank>,
    pub points_to_next: u64,
}

impl RankProgress {
    pub fn for_points(points: u64) -> Self {
        let next = next_rank(points);
        Self {
            current: rank_for(points),
            next,
            points_to_next: next.map(|r| r.threshold - points).unwrap_or(0),
        }
    }
}
