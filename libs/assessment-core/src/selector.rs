//! Adaptive question selection biased toward weak skills.
//!
//! Candidates are split into weak / medium / strong tiers by the mastery of
//! their skill. Each tier is sampled up to its quota, shortfalls cascade to
//! the next tier, and any slots still open are filled from whatever is left.

use crate::types::{Question, SkillMap};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Mastery band of a candidate's skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Weak,
    Medium,
    Strong,
}

/// How questions are drawn within a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Every candidate in a tier is equally likely.
    #[default]
    Uniform,
    /// Candidates are drawn with probability proportional to their skill's
    /// priority weight.
    PriorityWeighted,
}

impl SelectionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::PriorityWeighted => "priority_weighted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "uniform" => Some(Self::Uniform),
            "priority_weighted" => Some(Self::PriorityWeighted),
            _ => None,
        }
    }
}

/// Adaptive selector with configurable tier bounds and quotas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveSelector {
    /// Mastery strictly below this is weak.
    pub weak_below: f64,
    /// Mastery at or above this is strong.
    pub strong_from: f64,
    pub weak_share: f64,
    pub medium_share: f64,
    pub strategy: SelectionStrategy,
}

impl Default for AdaptiveSelector {
    fn default() -> Self {
        Self {
            weak_below: 50.0,
            strong_from: 80.0,
            weak_share: 0.60,
            medium_share: 0.25,
            strategy: SelectionStrategy::Uniform,
        }
    }
}

/// Per-tier target counts for a session of `n` questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quotas {
    pub weak: usize,
    pub medium: usize,
    pub strong: usize,
}

impl AdaptiveSelector {
    pub fn tier_of(&self, question: &Question, skills: &SkillMap) -> Tier {
        let mastery = skills
            .get(&question.skill_key())
            .map(|s| s.mastery_score)
            .unwrap_or(0.0);
        self.tier_for(mastery)
    }

    /// Tier a mastery score falls into.
    pub fn tier_for(&self, mastery: f64) -> Tier {
        if mastery < self.weak_below {
            Tier::Weak
        } else if mastery < self.strong_from {
            Tier::Medium
        } else {
            Tier::Strong
        }
    }

    pub fn quotas(&self, n: usize) -> Quotas {
        let weak = (n as f64 * self.weak_share).floor() as usize;
        let medium = (n as f64 * self.medium_share).floor() as usize;
        Quotas {
            weak,
            medium,
            strong: n.saturating_sub(weak + medium),
        }
    }

    /// Select up to `n` distinct questions using the thread-local RNG.
    pub fn select<'a>(&self, candidates: &'a [Question], skills: &SkillMap, n: usize) -> Vec<&'a Question> {
        self.select_with_rng(candidates, skills, n, &mut rand::thread_rng())
    }

    /// Select up to `n` distinct questions.
    ///
    /// Returns every candidate (shuffled) when the pool holds fewer than `n`.
    /// The result is shuffled so tier order is not observable.
    pub fn select_with_rng<'a, R: Rng + ?Sized>(
        &self,
        candidates: &'a [Question],
        skills: &SkillMap,
        n: usize,
        rng: &mut R,
    ) -> Vec<&'a Question> {
        let mut weak = Vec::new();
        let mut medium = Vec::new();
        let mut strong = Vec::new();
        for (idx, question) in candidates.iter().enumerate() {
            match self.tier_of(question, skills) {
                Tier::Weak => weak.push(idx),
                Tier::Medium => medium.push(idx),
                Tier::Strong => strong.push(idx),
            }
        }

        let quotas = self.quotas(n);
        let weight = |idx: &usize| -> f64 {
            skills
                .get(&candidates[*idx].skill_key())
                .map(|s| s.priority_weight)
                .unwrap_or(1.0)
        };

        let mut picked: Vec<usize> = Vec::with_capacity(n.min(candidates.len()));

        picked.extend(self.sample(&weak, quotas.weak, &weight, rng));

        let weak_shortfall = quotas.weak.saturating_sub(picked.len());
        picked.extend(self.sample(&medium, quotas.medium + weak_shortfall, &weight, rng));

        let open = n.saturating_sub(picked.len());
        picked.extend(self.sample(&strong, open, &weight, rng));

        if picked.len() < n {
            let taken: HashSet<usize> = picked.iter().copied().collect();
            let rest: Vec<usize> = (0..candidates.len()).filter(|i| !taken.contains(i)).collect();
            let open = n - picked.len();
            picked.extend(self.sample(&rest, open, &weight, rng));
        }

        picked.shuffle(rng);
        picked.into_iter().map(|idx| &candidates[idx]).collect()
    }

    fn sample<R, F>(&self, pool: &[usize], k: usize, weight: &F, rng: &mut R) -> Vec<usize>
    where
        R: Rng + ?Sized,
        F: Fn(&usize) -> f64,
    {
        let k = k.min(pool.len());
        if k == 0 {
            return Vec::new();
        }

        match self.strategy {
            SelectionStrategy::Uniform => pool.choose_multiple(rng, k).copied().collect(),
            SelectionStrategy::PriorityWeighted => match pool.choose_multiple_weighted(rng, k, weight) {
                Ok(chosen) => chosen.copied().collect(),
                Err(_) => pool.choose_multiple(rng, k).copied().collect(),
            },
        }
    }
}
