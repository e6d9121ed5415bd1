//! Patience-based early stopping on a validation score.

use serde::{Deserialize, Serialize};

/// Tracks the best validation score and how many rounds have passed without
/// beating it by more than `min_change`.
///
/// # Examples
///
/// ```
/// use cartboost::ensemble::EarlyStopping;
///
/// let mut stopper = EarlyStopping::new(0.01, 2);
/// assert!(!stopper.update(0.50));
/// assert!(!stopper.update(0.505)); // not enough improvement
/// assert!(stopper.update(0.40));   // second stale round
/// assert_eq!(stopper.best_round(), Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyStopping {
    min_change: f32,
    window: usize,
    best: f32,
    best_round: Option<usize>,
    stale_rounds: usize,
    rounds_seen: usize,
}

impl EarlyStopping {
    /// Creates a tracker that stops after `window` consecutive rounds whose
    /// score does not exceed the best by more than `min_change`.
    #[must_use]
    pub fn new(min_change: f32, window: usize) -> Self {
        Self {
            min_change,
            window,
            best: f32::NEG_INFINITY,
            best_round: None,
            stale_rounds: 0,
            rounds_seen: 0,
        }
    }

    /// Feeds the next round's score. Returns `true` when training should stop.
    ///
    /// A NaN score never counts as an improvement.
    pub fn update(&mut self, score: f32) -> bool {
        let round = self.rounds_seen;
        self.rounds_seen += 1;

        if score > self.best + self.min_change {
            self.best = score;
            self.best_round = Some(round);
            self.stale_rounds = 0;
        } else {
            self.stale_rounds += 1;
        }
        self.stale_rounds >= self.window
    }

    /// Best score seen so far, `-inf` before the first improvement.
    #[must_use]
    pub fn best(&self) -> f32 {
        self.best
    }

    /// Zero-based round of the best score.
    #[must_use]
    pub fn best_round(&self) -> Option<usize> {
        self.best_round
    }

    /// Consecutive rounds without improvement.
    #[must_use]
    pub fn stale_rounds(&self) -> usize {
        self.stale_rounds
    }
}
