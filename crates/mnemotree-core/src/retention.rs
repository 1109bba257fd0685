//! Stability/difficulty memory model.
//!
//! A stateless FSRS-style model. Given the current stability `S`, difficulty
//! `D`, the time since the last review and a rating, it returns the new `S`,
//! the new `D` and the interval in days until the next review.
//!
//! ## Core formulas
//! - Retrievability: `R = (1 + FACTOR * t / S)^DECAY`, with `FACTOR = 19/81`
//!   and `DECAY = -0.5` so that `R = 0.9` when `t = S`.
//! - Interval: `I = S * 9 * (1 / 0.9 - 1)`, rounded and clamped to
//!   `[1, 36500]` days.
//!
//! Stability and difficulty are rounded to four decimal places on the way
//! out so that recomputing from a serialized snapshot gives the same bits.

use serde::{Deserialize, Serialize};

use crate::model::{Millis, Rating, SchedulingState, DAY_MS};

/// Default weight vector `w0..w16`.
pub const WEIGHTS: [f64; 17] = [
    0.4, 0.6, 2.4, 5.8, 4.93, 0.94, 0.86, 0.01, 1.49, 0.14, 0.94, 2.18, 0.05, 0.34, 1.26, 0.29,
    2.61,
];

/// Target probability of recall at the scheduled review.
pub const REQUEST_RETENTION: f64 = 0.9;
/// Exponent of the power forgetting curve.
pub const DECAY: f64 = -0.5;
/// Scale of the forgetting curve, `0.9^(1 / DECAY) - 1`.
pub const FACTOR: f64 = 19.0 / 81.0;

pub const MIN_STABILITY: f64 = 0.01;
pub const MAX_STABILITY: f64 = 36_500.0;
pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 10.0;
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

const PRECISION: f64 = 10_000.0;

/// Output of one review step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub stability: f64,
    pub difficulty: f64,
    pub interval_days: u32,
}

/// Apply one review with `rating` at `reviewed_at` to `(current_s, current_d)`.
///
/// `current_s == 0` means the item has never been reviewed, in which case
/// `current_d` and `last_review` are ignored. A `reviewed_at` earlier than
/// `last_review` counts as zero elapsed time.
pub fn transition(
    current_s: f64,
    current_d: f64,
    last_review: Millis,
    rating: Rating,
    reviewed_at: Millis,
) -> Transition {
    let (stability, difficulty) = if current_s <= 0.0 {
        (initial_stability(rating), initial_difficulty(rating))
    } else {
        let elapsed = elapsed_days(last_review, reviewed_at);
        let r = retrievability(current_s, elapsed);
        let difficulty = next_difficulty(current_d, rating);
        let stability = match rating {
            Rating::Again => next_forget_stability(current_d, current_s, r),
            _ => next_recall_stability(difficulty, current_s, r, rating),
        };
        (stability, difficulty)
    };

    let stability = round4(stability.clamp(MIN_STABILITY, MAX_STABILITY));
    let difficulty = round4(difficulty);
    Transition {
        stability,
        difficulty,
        interval_days: next_interval(stability),
    }
}

/// Days between two timestamps, never negative.
pub fn elapsed_days(from: Millis, to: Millis) -> f64 {
    to.saturating_sub(from).max(0) as f64 / DAY_MS as f64
}

/// Probability of recall after `elapsed_days` at the given stability.
pub fn retrievability(stability: f64, elapsed_days: f64) -> f64 {
    if stability <= 0.0 {
        return 0.0;
    }
    (1.0 + FACTOR * elapsed_days / stability).powf(DECAY)
}

/// Retrievability of a scheduling state at `now`; 0 for unreviewed items.
pub fn current_retrievability(state: &SchedulingState, now: Millis) -> f64 {
    retrievability(state.stability, elapsed_days(state.last_review, now))
}

/// Interval in whole days for a stability, 0 for an unreviewed item.
pub fn next_interval(stability: f64) -> u32 {
    if stability <= 0.0 {
        return 0;
    }
    let days = (stability * 9.0 * (1.0 / REQUEST_RETENTION - 1.0)).round();
    days.clamp(1.0, MAX_INTERVAL_DAYS as f64) as u32
}

/// Stability after the first review.
pub fn initial_stability(rating: Rating) -> f64 {
    WEIGHTS[(rating.grade() - 1) as usize]
}

/// Difficulty after the first review.
pub fn initial_difficulty(rating: Rating) -> f64 {
    clamp_difficulty(WEIGHTS[4] - rating.offset_from_good() * WEIGHTS[5])
}

/// Difficulty after a subsequent review.
pub fn next_difficulty(difficulty: f64, rating: Rating) -> f64 {
    clamp_difficulty(difficulty - WEIGHTS[6] * rating.offset_from_good())
}

/// Stability after a successful (Hard, Good or Easy) recall.
pub fn next_recall_stability(difficulty: f64, stability: f64, r: f64, rating: Rating) -> f64 {
    let hard_penalty = if rating == Rating::Hard { WEIGHTS[15] } else { 1.0 };
    let easy_bonus = if rating == Rating::Easy { WEIGHTS[16] } else { 1.0 };
    stability
        * (1.0
            + WEIGHTS[8].exp()
                * (11.0 - difficulty)
                * stability.powf(-WEIGHTS[9])
                * ((WEIGHTS[10] * (1.0 - r)).exp() - 1.0)
                * hard_penalty
                * easy_bonus)
}

/// Stability after a lapse. Never exceeds the stability before the lapse.
pub fn next_forget_stability(difficulty: f64, stability: f64, r: f64) -> f64 {
    let lapse = WEIGHTS[11]
        * difficulty.powf(-WEIGHTS[12])
        * ((stability + 1.0).powf(WEIGHTS[13]) - 1.0)
        * (WEIGHTS[14] * (1.0 - r)).exp();
    lapse.min(stability)
}

/// What each rating would produce if given at `at`, in rating order.
pub fn preview(state: &SchedulingState, at: Millis) -> [Transition; 4] {
    Rating::ALL.map(|rating| {
        transition(
            state.stability,
            state.difficulty,
            state.last_review,
            rating,
            at,
        )
    })
}

fn clamp_difficulty(d: f64) -> f64 {
    d.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

fn round4(x: f64) -> f64 {
    (x * PRECISION).round() / PRECISION
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: Millis = 1_700_000_000_000;

    #[test]
    fn first_review_uses_initial_tables() {
        let t = transition(0.0, 0.0, 0, Rating::Good, T0);
        assert_eq!(t.stability, 2.4);
        assert_eq!(t.difficulty, 4.93);
        assert_eq!(t.interval_days, (2.4f64 * 9.0 * (1.0 / 0.9 - 1.0)).round() as u32);
        assert_eq!(t.interval_days, 2);
    }

    #[test]
    fn initial_stability_is_positive_for_every_rating() {
        for rating in Rating::ALL {
            assert!(initial_stability(rating) > 0.0, "{rating}");
        }
        assert!(initial_stability(Rating::Again) < initial_stability(Rating::Easy));
    }

    #[test]
    fn initial_difficulty_orders_by_rating() {
        assert!(initial_difficulty(Rating::Again) > initial_difficulty(Rating::Good));
        assert!(initial_difficulty(Rating::Easy) < initial_difficulty(Rating::Good));
    }

    #[test]
    fn retrievability_is_target_at_stability() {
        assert!((retrievability(10.0, 10.0) - REQUEST_RETENTION).abs() < 1e-9);
        assert_eq!(retrievability(10.0, 0.0), 1.0);
        assert_eq!(retrievability(0.0, 5.0), 0.0);
        assert!(retrievability(10.0, 30.0) < retrievability(10.0, 5.0));
    }

    #[test]
    fn lapse_shrinks_stability() {
        let t = transition(10.0, 5.0, T0, Rating::Again, T0 + 5 * DAY_MS);
        assert!(t.stability < 10.0, "got {}", t.stability);
        assert!(t.stability > 0.0);
        assert!((t.difficulty - (5.0 + 2.0 * WEIGHTS[6])).abs() < 1e-9);
        assert_eq!(t.interval_days, next_interval(t.stability));
    }

    #[test]
    fn success_grows_stability() {
        for rating in [Rating::Hard, Rating::Good, Rating::Easy] {
            let t = transition(10.0, 5.0, T0, rating, T0 + 10 * DAY_MS);
            assert!(t.stability > 10.0, "{rating}: {}", t.stability);
        }
        let good = transition(10.0, 5.0, T0, Rating::Good, T0 + 10 * DAY_MS);
        let easy = transition(10.0, 5.0, T0, Rating::Easy, T0 + 10 * DAY_MS);
        let hard = transition(10.0, 5.0, T0, Rating::Hard, T0 + 10 * DAY_MS);
        assert!(easy.stability > good.stability);
        assert!(good.stability > hard.stability);
    }

    #[test]
    fn difficulty_stays_in_bounds() {
        for d in [0.0, 1.0, 3.3, 5.0, 9.9, 10.0] {
            for rating in Rating::ALL {
                let s = if d == 0.0 { 0.0 } else { 4.0 };
                let t = transition(s, d, T0, rating, T0 + 3 * DAY_MS);
                assert!(
                    (MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&t.difficulty),
                    "d={d} {rating}: {}",
                    t.difficulty
                );
            }
        }
    }

    #[test]
    fn interval_bounds() {
        assert_eq!(next_interval(0.0), 0);
        assert_eq!(next_interval(0.01), 1);
        assert_eq!(next_interval(1e9), MAX_INTERVAL_DAYS);
        let t = transition(30_000.0, 1.0, T0, Rating::Easy, T0 + 30_000 * DAY_MS);
        assert!((1..=MAX_INTERVAL_DAYS).contains(&t.interval_days));
    }

    #[test]
    fn negative_elapsed_is_clamped() {
        let backdated = transition(10.0, 5.0, T0, Rating::Good, T0 - 3 * DAY_MS);
        let same_time = transition(10.0, 5.0, T0, Rating::Good, T0);
        assert_eq!(backdated, same_time);
        assert_eq!(elapsed_days(T0, T0 - DAY_MS), 0.0);
    }

    #[test]
    fn transition_is_deterministic_and_rounded() {
        let a = transition(7.3, 6.1, T0, Rating::Hard, T0 + 4 * DAY_MS + 1234);
        let b = transition(7.3, 6.1, T0, Rating::Hard, T0 + 4 * DAY_MS + 1234);
        assert_eq!(a.stability.to_bits(), b.stability.to_bits());
        assert_eq!(a.difficulty.to_bits(), b.difficulty.to_bits());
        assert_eq!(round4(a.stability), a.stability);
    }

    #[test]
    fn preview_is_ordered_by_rating() {
        let state = SchedulingState {
            stability: 10.0,
            difficulty: 5.0,
            last_review: T0,
            ..SchedulingState::default()
        };
        let [again, hard, good, easy] = preview(&state, T0 + 10 * DAY_MS);
        assert!(again.interval_days <= hard.interval_days);
        assert!(hard.interval_days <= good.interval_days);
        assert!(good.interval_days <= easy.interval_days);
    }
}
