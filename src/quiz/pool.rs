use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::PoolError;
use crate::quiz::options::QuantityMode;
use crate::quiz::question::{PlayEntry, Question};
use crate::quiz::source::{QuestionSource, set_label};

/// Every question loaded for one set. Distractors are drawn from here.
#[derive(Clone, Debug)]
pub struct QuestionPool {
    pub set_id: String,
    pub set_label: String,
    questions: Vec<Question>,
}

impl QuestionPool {
    pub fn new(set_id: &str, questions: Vec<Question>) -> Result<Self, PoolError> {
        if questions.is_empty() {
            return Err(PoolError::EmptyPool {
                set_id: set_id.to_string(),
            });
        }
        Ok(Self {
            set_id: set_id.to_string(),
            set_label: set_label(set_id),
            questions,
        })
    }

    pub fn load(source: &dyn QuestionSource, set_id: &str) -> Result<Self, PoolError> {
        let questions = source.fetch(set_id)?;
        let pool = Self::new(set_id, questions)?;
        log::info!("loaded {} questions for set {}", pool.len(), set_id);
        Ok(pool)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn select_round<R: Rng + ?Sized>(&self, mode: QuantityMode, rng: &mut R) -> Vec<PlayEntry> {
        select_round(&self.questions, mode, rng)
    }
}

/// Draw the entries asked in one round.
///
/// `Fixed(n)` samples `min(n, all.len())` distinct questions without
/// replacement; `All` asks every question. The goal of the round is the
/// length of the returned vector.
pub fn select_round<R: Rng + ?Sized>(
    all: &[Question],
    mode: QuantityMode,
    rng: &mut R,
) -> Vec<PlayEntry> {
    match mode {
        QuantityMode::Fixed(count) => all
            .choose_multiple(rng, count.min(all.len()))
            .cloned()
            .map(PlayEntry::new)
            .collect(),
        QuantityMode::All => {
            let mut entries: Vec<PlayEntry> = all.iter().cloned().map(PlayEntry::new).collect();
            entries.shuffle(rng);
            entries
        }
    }
}
