use rand::Rng;
use rand::seq::SliceRandom;

use crate::quiz::fall::FallScheduler;
use crate::quiz::options::Direction;
use crate::quiz::question::Question;
use crate::quiz::round::{Resolution, RoundState};

/// Number of wrong answers offered next to the right one.
pub const DISTRACTOR_COUNT: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// How a question was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cause {
    Choice,
    Expiry,
}

/// Shuffled labels offered for one question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceSet {
    labels: Vec<String>,
    correct: String,
}

impl ChoiceSet {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn correct(&self) -> &str {
        &self.correct
    }

    pub fn is_correct(&self, label: &str) -> bool {
        label == self.correct
    }

    pub fn label_at(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn correct_index(&self) -> Option<usize> {
        self.labels.iter().position(|l| *l == self.correct)
    }
}

/// Build the choices for `active`: its correct label plus up to
/// `DISTRACTOR_COUNT` distinct wrong labels drawn from the rest of the pool.
///
/// Pools with too few distinct labels yield a smaller set instead of failing.
pub fn build_choices<R: Rng + ?Sized>(
    pool: &[Question],
    active: &Question,
    direction: Direction,
    rng: &mut R,
) -> ChoiceSet {
    let correct = active.label(direction);

    let mut candidates: Vec<&str> = pool
        .iter()
        .filter(|q| *q != active)
        .map(|q| q.label(direction))
        .filter(|label| *label != correct)
        .collect();
    candidates.shuffle(rng);

    let mut labels: Vec<String> = vec![correct.to_string()];
    for label in candidates {
        if labels.len() > DISTRACTOR_COUNT {
            break;
        }
        if !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }
    labels.shuffle(rng);

    ChoiceSet {
        labels,
        correct: correct.to_string(),
    }
}

/// Resolve the active question with the player's pick.
///
/// Only the first resolution per question counts: with nothing active, the
/// round not running, or the question already resolved (by an earlier pick
/// or by expiry) this returns `None` and leaves the state alone.
pub fn resolve(
    state: &mut RoundState,
    fall: &mut FallScheduler,
    selected: &str,
    now_ms: u64,
) -> Option<(Outcome, Resolution)> {
    let Some(active) = state.claim_active() else {
        log::debug!("ignored answer '{selected}': no unresolved question");
        return None;
    };
    fall.cancel(active.fall_token);

    let outcome = if active.choices.is_correct(selected) {
        Outcome::Correct
    } else {
        Outcome::Incorrect
    };
    let resolution = match outcome {
        Outcome::Correct => state.apply_correct(now_ms)?,
        Outcome::Incorrect => state.apply_incorrect(now_ms)?,
    };
    Some((outcome, resolution))
}

/// Resolve the active question as missed because its fall ran out.
pub fn expire(state: &mut RoundState, now_ms: u64) -> Option<Resolution> {
    if state.claim_active().is_none() {
        log::debug!("ignored expiry: question already resolved");
        return None;
    }
    state.apply_incorrect(now_ms)
}
