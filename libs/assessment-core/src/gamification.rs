//! Streak, points, rank and achievement transitions.
//!
//! One transition happens per finalized session. The engine is pure: it takes
//! the previous [`UserStats`] and returns the next one, leaving persistence
//! to the caller.

use crate::rank::{rank_for, Rank};
use crate::scoring::{CompositeScorer, ScoreCard};
use crate::types::{Achievement, SessionOutcome, TrackTallies, UserStats};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum questions for a perfect session to count.
pub const PERFECT_SESSION_MIN_QUESTIONS: u32 = 10;

/// Points at which the veteran achievement unlocks.
pub const VETERAN_POINTS: u64 = 1500;

/// Get the study day an instant belongs to.
///
/// Instants before `daily_reset_hour` count towards the previous day, so a
/// late-night session extends the same streak day.
pub fn study_day(at: DateTime<Utc>, daily_reset_hour: u32) -> NaiveDate {
    (at - Duration::hours(i64::from(daily_reset_hour))).date_naive()
}

/// Gamification settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamificationConfig {
    /// Hour of day (0-23, UTC) when a new study day begins.
    pub daily_reset_hour: u32,
}

/// Applies a finished session to the user's gamification state.
#[derive(Debug, Clone, Copy, Default)]
pub struct GamificationEngine {
    pub scorer: CompositeScorer,
    pub config: GamificationConfig,
}

/// Everything that changed for one session.
#[derive(Debug, Clone)]
pub struct GamificationUpdate {
    pub stats: UserStats,
    pub score: ScoreCard,
    pub rank_before: &'static Rank,
    pub rank_after: &'static Rank,
    pub new_achievements: Vec<Achievement>,
}

impl GamificationUpdate {
    pub fn rank_changed(&self) -> bool {
        self.rank_before != self.rank_after
    }

    pub fn into_outcome(self, session_id: Uuid, tallies: TrackTallies) -> SessionOutcome {
        let rank_changed = self.rank_changed();
        SessionOutcome {
            session_id,
            tallies,
            composite: self.score.composite,
            passed: self.score.passed,
            points_earned: self.score.points,
            current_streak: self.stats.current_streak,
            total_points: self.stats.total_points,
            rank: self.rank_after.name.to_string(),
            rank_changed,
            new_achievements: self.new_achievements,
        }
    }
}

impl GamificationEngine {
    pub fn new(scorer: CompositeScorer, config: GamificationConfig) -> Self {
        Self { scorer, config }
    }

    /// Streak after a session at `now`.
    pub fn next_streak(&self, stats: &UserStats, now: DateTime<Utc>) -> u32 {
        let today = study_day(now, self.config.daily_reset_hour);
        let Some(last) = stats.last_activity else {
            return 1;
        };
        let last = study_day(last, self.config.daily_reset_hour);

        if last >= today {
            stats.current_streak
        } else if last.succ_opt() == Some(today) {
            stats.current_streak + 1
        } else {
            1
        }
    }

    pub fn apply(&self, stats: &UserStats, tallies: &TrackTallies, now: DateTime<Utc>) -> GamificationUpdate {
        let current_streak = self.next_streak(stats, now);
        let score = self.scorer.score(tallies, current_streak);

        let rank_before = rank_for(stats.total_points);
        let total_points = stats.total_points + score.points;
        let rank_after = rank_for(total_points);

        let mut next = UserStats {
            current_streak,
            max_streak: stats.max_streak.max(current_streak),
            total_points,
            last_activity: Some(now),
            achievements: stats.achievements.clone(),
        };

        let new_achievements: Vec<Achievement> = earned_achievements(&next, tallies)
            .into_iter()
            .filter(|a| !stats.achievements.contains(a))
            .collect();
        next.achievements.extend(new_achievements.iter().copied());

        GamificationUpdate {
            stats: next,
            score,
            rank_before,
            rank_after,
            new_achievements,
        }
    }
}

/// Achievements satisfied by the post-session state, in declaration order.
fn earned_achievements(stats: &UserStats, tallies: &TrackTallies) -> Vec<Achievement> {
    let total = tallies.total();
    Achievement::ALL
        .into_iter()
        .filter(|achievement| match achievement {
            Achievement::FirstSession => true,
            Achievement::ThreeDayStreak => stats.current_streak >= 3,
            Achievement::SevenDayStreak => stats.current_streak >= 7,
            Achievement::PerfectSession => {
                total >= PERFECT_SESSION_MIN_QUESTIONS && tallies.correct() == total
            }
            Achievement::Veteran => stats.total_points >= VETERAN_POINTS,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tally;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    fn tallies(correct: u32, total: u32) -> TrackTallies {
        TrackTallies {
            functional: Tally::new(correct, total),
            ..Default::default()
        }
    }

    fn stats(streak: u32, points: u64, last: Option<DateTime<Utc>>) -> UserStats {
        UserStats {
            current_streak: streak,
            max_streak: streak,
            total_points: points,
            last_activity: last,
            achievements: Default::default(),
        }
    }

    #[test]
    fn first_session_starts_streak() {
        let engine = GamificationEngine::default();
        let update = engine.apply(&UserStats::default(), &tallies(1, 2), at(10, 12));
        assert_eq!(update.stats.current_streak, 1);
        assert_eq!(update.stats.max_streak, 1);
        assert_eq!(update.new_achievements, vec![Achievement::FirstSession]);
    }

    #[test]
    fn same_day_keeps_streak() {
        let engine = GamificationEngine::default();
        let prev = stats(4, 0, Some(at(10, 8)));
        assert_eq!(engine.next_streak(&prev, at(10, 22)), 4);
    }

    #[test]
    fn consecutive_day_increments_streak() {
        let engine = GamificationEngine::default();
        let prev = stats(4, 0, Some(at(10, 23)));
        assert_eq!(engine.next_streak(&prev, at(11, 1)), 5);
    }

    #[test]
    fn gap_resets_streak_to_one() {
        let engine = GamificationEngine::default();
        let prev = stats(9, 0, Some(at(10, 12)));
        assert_eq!(engine.next_streak(&prev, at(12, 12)), 1);
    }

    #[test]
    fn reset_hour_shifts_the_study_day() {
        let engine = GamificationEngine::new(
            CompositeScorer::default(),
            GamificationConfig { daily_reset_hour: 4 },
        );
        // 02:00 on the 11th still belongs to the 10th.
        let prev = stats(2, 0, Some(at(10, 10)));
        assert_eq!(engine.next_streak(&prev, at(11, 2)), 2);
        assert_eq!(engine.next_streak(&prev, at(11, 5)), 3);
        assert_eq!(study_day(at(11, 3), 4), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
    }

    #[test]
    fn max_streak_never_decreases() {
        let engine = GamificationEngine::default();
        let mut prev = stats(2, 0, Some(at(1, 12)));
        prev.max_streak = 6;
        let update = engine.apply(&prev, &tallies(1, 1), at(2, 12));
        assert_eq!(update.stats.current_streak, 3);
        assert_eq!(update.stats.max_streak, 6);
    }

    #[test]
    fn points_accumulate_with_streak_bonus() {
        let engine = GamificationEngine::default();
        let prev = stats(1, 100, Some(at(10, 12)));
        // composite 60 -> 120 points, streak 2 -> +10
        let update = engine.apply(&prev, &tallies(10, 10), at(11, 12));
        assert_eq!(update.score.points, 130);
        assert_eq!(update.stats.total_points, 230);
    }

    #[test]
    fn rank_up_fires_once_when_crossing_threshold() {
        let engine = GamificationEngine::default();
        let prev = stats(1, 450, Some(at(10, 12)));

        let crossing = engine.apply(&prev, &tallies(10, 10), at(10, 13));
        assert!(crossing.rank_changed());
        assert_eq!(crossing.rank_after.name, "Junior Manager");

        let after = engine.apply(&crossing.stats, &tallies(10, 10), at(10, 14));
        assert!(!after.rank_changed());
    }

    #[test]
    fn streak_achievements_unlock_once() {
        let engine = GamificationEngine::default();
        let mut current = stats(2, 0, Some(at(1, 12)));
        current.achievements.insert(Achievement::FirstSession);

        let day3 = engine.apply(&current, &tallies(0, 1), at(2, 12));
        assert_eq!(day3.new_achievements, vec![Achievement::ThreeDayStreak]);

        let day3_again = engine.apply(&day3.stats, &tallies(0, 1), at(2, 18));
        assert!(day3_again.new_achievements.is_empty());

        let mut state = day3_again.stats;
        for day in 3..=6 {
            state = engine.apply(&state, &tallies(0, 1), at(day, 12)).stats;
        }
        assert_eq!(state.current_streak, 7);
        assert!(state.achievements.contains(&Achievement::SevenDayStreak));
    }

    #[test]
    fn perfect_session_requires_ten_questions() {
        let engine = GamificationEngine::default();
        let small = engine.apply(&UserStats::default(), &tallies(9, 9), at(10, 12));
        assert!(!small.new_achievements.contains(&Achievement::PerfectSession));

        let full = engine.apply(&UserStats::default(), &tallies(10, 10), at(10, 12));
        assert!(full.new_achievements.contains(&Achievement::PerfectSession));
    }

    #[test]
    fn veteran_unlocks_at_senior_auditor_points() {
        let engine = GamificationEngine::default();
        let prev = stats(1, 1450, Some(at(10, 12)));
        let update = engine.apply(&prev, &tallies(10, 10), at(10, 13));
        assert!(update.stats.total_points >= VETERAN_POINTS);
        assert!(update.new_achievements.contains(&Achievement::Veteran));
    }

    #[test]
    fn outcome_carries_session_summary() {
        let engine = GamificationEngine::default();
        let session_id = Uuid::new_v4();
        let t = tallies(7, 10);
        let outcome = engine
            .apply(&UserStats::default(), &t, at(10, 12))
            .into_outcome(session_id, t);

        assert_eq!(outcome.session_id, session_id);
        assert!(outcome.passed);
        assert_eq!(outcome.points_earned, 84);
        assert_eq!(outcome.total_points, 84);
        assert_eq!(outcome.rank, "Aspirant");
        assert!(!outcome.rank_changed);
        assert_eq!(outcome.current_streak, 1);
    }
}
