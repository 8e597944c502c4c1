use rand::Rng;
use rand::seq::IteratorRandom;

use crate::quiz::fall::{CancelToken, FallScheduler};
use crate::quiz::options::{Direction, RoundOptions};
use crate::quiz::question::{PlayEntry, Question};
use crate::quiz::resolver::{ChoiceSet, build_choices};

/// Per-round parameters, fixed at start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundConfig {
    pub goal_count: usize,
    pub fall_duration_ms: u64,
    pub lives_max: u32,
    pub settle_delay_ms: u64,
    pub direction: Direction,
}

impl RoundConfig {
    pub fn from_options(options: &RoundOptions, entry_count: usize) -> Self {
        Self {
            goal_count: entry_count,
            fall_duration_ms: options.fall_duration_ms(),
            lives_max: options.lives_max.max(1),
            settle_delay_ms: options.settle_delay_ms,
            direction: options.direction,
        }
    }
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self::from_options(&RoundOptions::default(), 0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundStatus {
    Idle,
    Running,
    GameOver,
    Finished,
}

/// The entry currently falling.
#[derive(Clone, Debug)]
pub struct ActiveQuestion {
    pub index: usize,
    pub choices: ChoiceSet,
    pub fall_token: CancelToken,
    /// Set by the first resolution; every later one is ignored.
    pub resolved: bool,
}

/// A deferred `advance`, tagged with the round it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingAdvance {
    pub generation: u64,
    pub due_at_ms: u64,
}

/// What a resolution leads to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Settling(PendingAdvance),
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    Activated(usize),
    Finished,
    /// Not running, or a question is still active.
    Ignored,
}

/// Authoritative state of one play session.
///
/// Lives and the solved counter change only in `start`, `apply_correct`
/// and `apply_incorrect`.
#[derive(Debug)]
pub struct RoundState {
    config: RoundConfig,
    entries: Vec<PlayEntry>,
    active: Option<ActiveQuestion>,
    lives: u32,
    solved_count: usize,
    started_at_ms: u64,
    finished_at_ms: Option<u64>,
    status: RoundStatus,
    generation: u64,
}

impl RoundState {
    pub fn new() -> Self {
        Self {
            config: RoundConfig::default(),
            entries: Vec::new(),
            active: None,
            lives: 0,
            solved_count: 0,
            started_at_ms: 0,
            finished_at_ms: None,
            status: RoundStatus::Idle,
            generation: 0,
        }
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn entries(&self) -> &[PlayEntry] {
        &self.entries
    }

    pub fn active(&self) -> Option<&ActiveQuestion> {
        self.active.as_ref()
    }

    pub fn active_question(&self) -> Option<&Question> {
        self.active
            .as_ref()
            .map(|a| &self.entries[a.index].question)
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn solved_count(&self) -> usize {
        self.solved_count
    }

    pub fn goal_count(&self) -> usize {
        self.config.goal_count
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn unsolved_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.solved).count()
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.status {
            RoundStatus::Idle => 0,
            _ => self
                .finished_at_ms
                .unwrap_or(now_ms)
                .saturating_sub(self.started_at_ms),
        }
    }

    /// Begin a new round. Returns false (and changes nothing) while a round
    /// is already running.
    pub fn start(&mut self, config: RoundConfig, mut entries: Vec<PlayEntry>, now_ms: u64) -> bool {
        if self.status == RoundStatus::Running {
            log::debug!("ignored start: round {} is still running", self.generation);
            return false;
        }
        for entry in &mut entries {
            entry.solved = false;
        }
        self.config = RoundConfig {
            goal_count: config.goal_count.min(entries.len()),
            ..config
        };
        self.entries = entries;
        self.active = None;
        self.lives = self.config.lives_max;
        self.solved_count = 0;
        self.started_at_ms = now_ms;
        self.finished_at_ms = None;
        self.status = RoundStatus::Running;
        self.generation += 1;
        log::info!(
            "round {} started: goal {}, fall {}ms, lives {}",
            self.generation,
            self.config.goal_count,
            self.config.fall_duration_ms,
            self.lives
        );
        true
    }

    /// Pick the next unsolved entry and start its fall, or finish the round.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        pool: &[Question],
        fall: &mut FallScheduler,
        now_ms: u64,
        rng: &mut R,
    ) -> Advance {
        if self.status != RoundStatus::Running || self.active.is_some() {
            log::debug!("ignored advance in {:?}", self.status);
            return Advance::Ignored;
        }

        let next = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.solved)
            .map(|(i, _)| i)
            .choose(rng);

        let index = match next {
            Some(index) if self.solved_count < self.config.goal_count => index,
            _ => {
                self.status = RoundStatus::Finished;
                self.finished_at_ms = Some(now_ms);
                log::info!(
                    "round {} finished in {}ms with {} lives left",
                    self.generation,
                    self.elapsed_ms(now_ms),
                    self.lives
                );
                return Advance::Finished;
            }
        };

        let question = &self.entries[index].question;
        let choices = build_choices(pool, question, self.config.direction, rng);
        let fall_token = fall.begin(now_ms, self.config.fall_duration_ms);
        self.active = Some(ActiveQuestion {
            index,
            choices,
            fall_token,
            resolved: false,
        });
        Advance::Activated(index)
    }

    /// Mark the active question as resolved. Returns it only for the first
    /// caller; later callers get `None`.
    pub fn claim_active(&mut self) -> Option<&ActiveQuestion> {
        if self.status != RoundStatus::Running {
            return None;
        }
        let active = self.active.as_mut()?;
        if active.resolved {
            return None;
        }
        active.resolved = true;
        Some(&*active)
    }

    fn take_claimed(&mut self) -> Option<ActiveQuestion> {
        match self.active.take() {
            Some(active) if active.resolved && self.status == RoundStatus::Running => Some(active),
            other => {
                self.active = other;
                None
            }
        }
    }

    pub fn apply_correct(&mut self, now_ms: u64) -> Option<Resolution> {
        let active = self.take_claimed()?;
        self.entries[active.index].solved = true;
        self.solved_count = (self.solved_count + 1).min(self.config.goal_count);
        Some(Resolution::Settling(self.settle(now_ms)))
    }

    /// Lose a life. Reaching zero ends the round on the spot, without the
    /// settle delay.
    pub fn apply_incorrect(&mut self, now_ms: u64) -> Option<Resolution> {
        self.take_claimed()?;
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.status = RoundStatus::GameOver;
            self.finished_at_ms = Some(now_ms);
            log::info!("round {} over: out of lives", self.generation);
            return Some(Resolution::GameOver);
        }
        Some(Resolution::Settling(self.settle(now_ms)))
    }

    fn settle(&self, now_ms: u64) -> PendingAdvance {
        PendingAdvance {
            generation: self.generation,
            due_at_ms: now_ms + self.config.settle_delay_ms,
        }
    }

    /// Abandon the round. Any pending advance becomes stale.
    pub fn quit(&mut self, fall: &mut FallScheduler) {
        if let Some(active) = self.active.take() {
            fall.cancel(active.fall_token);
        }
        fall.cancel_all();
        if self.status == RoundStatus::Running {
            log::info!("round {} quit", self.generation);
        }
        self.status = RoundStatus::Idle;
        self.finished_at_ms = None;
        self.generation += 1;
    }
}

impl Default for RoundState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question::new(&format!("字{i}"), &format!("じ{i}")))
            .collect()
    }

    fn config(goal: usize, lives: u32) -> RoundConfig {
        RoundConfig {
            goal_count: goal,
            fall_duration_ms: 2000,
            lives_max: lives,
            settle_delay_ms: 400,
            direction: Direction::WordGiven,
        }
    }

    fn started(n: usize, lives: u32) -> (RoundState, Vec<Question>) {
        let pool = questions(n);
        let mut state = RoundState::new();
        let entries = pool.iter().cloned().map(PlayEntry::new).collect();
        assert!(state.start(config(n, lives), entries, 0));
        (state, pool)
    }

    #[test]
    fn start_resets_counters() {
        let (state, _) = started(3, 3);
        assert_eq!(state.status(), RoundStatus::Running);
        assert_eq!(state.lives(), 3);
        assert_eq!(state.solved_count(), 0);
        assert_eq!(state.generation(), 1);
        assert!(state.active().is_none());
    }

    #[test]
    fn start_while_running_is_ignored() {
        let (mut state, pool) = started(3, 3);
        let entries = pool.iter().cloned().map(PlayEntry::new).collect();
        assert!(!state.start(config(3, 5), entries, 100));
        assert_eq!(state.lives(), 3);
        assert_eq!(state.generation(), 1);
    }

    #[test]
    fn start_clears_solved_flags_and_caps_goal() {
        let pool = questions(2);
        let mut entries: Vec<PlayEntry> = pool.iter().cloned().map(PlayEntry::new).collect();
        entries[0].solved = true;
        let mut state = RoundState::new();
        state.start(config(5, 3), entries, 0);
        assert!(state.entries().iter().all(|e| !e.solved));
        assert_eq!(state.goal_count(), 2);
    }

    #[test]
    fn advance_activates_an_unsolved_entry() {
        let (mut state, pool) = started(3, 3);
        let mut fall = FallScheduler::new();
        let mut rng = SmallRng::seed_from_u64(5);
        let Advance::Activated(index) = state.advance(&pool, &mut fall, 0, &mut rng) else {
            panic!("expected activation");
        };
        assert!(!state.entries()[index].solved);
        assert!(fall.is_falling());
        // A second advance while a question is active does nothing.
        assert_eq!(state.advance(&pool, &mut fall, 0, &mut rng), Advance::Ignored);
    }

    #[test]
    fn correct_resolution_counts_once() {
        let (mut state, pool) = started(3, 3);
        let mut fall = FallScheduler::new();
        let mut rng = SmallRng::seed_from_u64(5);
        state.advance(&pool, &mut fall, 0, &mut rng);

        assert!(state.claim_active().is_some());
        assert!(state.claim_active().is_none());
        let res = state.apply_correct(100);
        assert_eq!(
            res,
            Some(Resolution::Settling(PendingAdvance {
                generation: 1,
                due_at_ms: 500
            }))
        );
        assert_eq!(state.solved_count(), 1);
        assert!(state.active().is_none());
        assert_eq!(state.apply_correct(100), None);
        assert_eq!(state.solved_count(), 1);
    }

    #[test]
    fn unclaimed_question_cannot_be_applied() {
        let (mut state, pool) = started(3, 3);
        let mut fall = FallScheduler::new();
        let mut rng = SmallRng::seed_from_u64(5);
        state.advance(&pool, &mut fall, 0, &mut rng);
        assert_eq!(state.apply_incorrect(0), None);
        assert_eq!(state.lives(), 3);
        assert!(state.active().is_some());
    }

    #[test]
    fn losing_every_life_is_game_over() {
        let (mut state, pool) = started(5, 3);
        let mut fall = FallScheduler::new();
        let mut rng = SmallRng::seed_from_u64(9);
        for round in 0..3 {
            state.advance(&pool, &mut fall, 0, &mut rng);
            state.claim_active();
            let res = state.apply_incorrect(0).unwrap();
            if round < 2 {
                assert!(matches!(res, Resolution::Settling(_)));
            } else {
                assert_eq!(res, Resolution::GameOver);
            }
        }
        assert_eq!(state.status(), RoundStatus::GameOver);
        assert_eq!(state.lives(), 0);
        assert_eq!(state.solved_count(), 0);
        assert_eq!(state.advance(&pool, &mut fall, 0, &mut rng), Advance::Ignored);
    }

    #[test]
    fn advance_with_everything_solved_finishes() {
        let (mut state, pool) = started(2, 3);
        let mut fall = FallScheduler::new();
        let mut rng = SmallRng::seed_from_u64(1);
        for t in [0, 1000] {
            state.advance(&pool, &mut fall, t, &mut rng);
            state.claim_active();
            state.apply_correct(t);
        }
        assert_eq!(state.advance(&pool, &mut fall, 4200, &mut rng), Advance::Finished);
        assert_eq!(state.status(), RoundStatus::Finished);
        assert!(state.active().is_none());
        assert_eq!(state.elapsed_ms(9999), 4200);
    }

    #[test]
    fn quit_invalidates_pending_advances() {
        let (mut state, pool) = started(3, 3);
        let mut fall = FallScheduler::new();
        let mut rng = SmallRng::seed_from_u64(2);
        state.advance(&pool, &mut fall, 0, &mut rng);
        state.quit(&mut fall);
        assert_eq!(state.status(), RoundStatus::Idle);
        assert_eq!(state.generation(), 2);
        assert!(!fall.is_falling());
        assert!(state.claim_active().is_none());
    }
}
