use rand::rngs::SmallRng;

use crate::quiz::clock::Clock;
use crate::quiz::fall::{FallEvent, FallScheduler, FallTick};
use crate::quiz::options::RoundOptions;
use crate::quiz::pool::QuestionPool;
use crate::quiz::prompt::ConfirmPrompt;
use crate::quiz::question::Question;
use crate::quiz::resolver::{self, Cause, ChoiceSet, Outcome};
use crate::quiz::round::{Advance, PendingAdvance, Resolution, RoundConfig, RoundState, RoundStatus};

pub const QUIT_MESSAGE: &str = "Quit this round and go back to the menu?";

/// Something the host should present after a `tick`.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Fall(FallTick),
    Resolved { outcome: Outcome, cause: Cause },
    Activated { index: usize },
    Finished { elapsed_ms: u64 },
    GameOver,
}

/// The most recent resolution, kept for presentation during the settle delay.
#[derive(Clone, Debug, PartialEq)]
pub struct LastResolution {
    pub outcome: Outcome,
    pub cause: Cause,
    pub question: Question,
    pub selected: Option<String>,
    pub at_ms: u64,
}

/// Round controller: owns the round state, the fall scheduler, the queue of
/// deferred advances and the clock. The host calls `tick` every frame and
/// `choose` on input; nothing else mutates the round.
///
/// Resolutions caused by `choose` are reported by the following `tick`, so
/// the event stream carries every resolution and game over.
pub struct Game<C: Clock> {
    pool: QuestionPool,
    options: RoundOptions,
    state: RoundState,
    fall: FallScheduler,
    pending: Vec<PendingAdvance>,
    queued: Vec<GameEvent>,
    last_resolution: Option<LastResolution>,
    clock: C,
    rng: SmallRng,
}

impl<C: Clock> Game<C> {
    pub fn new(pool: QuestionPool, options: RoundOptions, clock: C, rng: SmallRng) -> Self {
        Self {
            pool,
            options,
            state: RoundState::new(),
            fall: FallScheduler::new(),
            pending: Vec::new(),
            queued: Vec::new(),
            last_resolution: None,
            clock,
            rng,
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn pool(&self) -> &QuestionPool {
        &self.pool
    }

    pub fn options(&self) -> &RoundOptions {
        &self.options
    }

    pub fn status(&self) -> RoundStatus {
        self.state.status()
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.state.elapsed_ms(self.clock.now_ms())
    }

    pub fn active_question(&self) -> Option<&Question> {
        self.state.active_question()
    }

    pub fn choices(&self) -> Option<&ChoiceSet> {
        self.state.active().map(|a| &a.choices)
    }

    pub fn last_resolution(&self) -> Option<&LastResolution> {
        self.last_resolution.as_ref()
    }

    pub fn has_pending_advance(&self) -> bool {
        let generation = self.state.generation();
        self.pending.iter().any(|p| p.generation == generation)
    }

    /// Sample a fresh entry set and begin a round. Returns false if a round
    /// is already running.
    pub fn start(&mut self) -> bool {
        let now = self.clock.now_ms();
        let entries = self.pool.select_round(self.options.quantity, &mut self.rng);
        let config = RoundConfig::from_options(&self.options, entries.len());
        if !self.state.start(config, entries, now) {
            return false;
        }
        self.queued.clear();
        self.last_resolution = None;
        self.advance(now, &mut Vec::new());
        true
    }

    /// Abandon whatever is in progress and start over with a re-sampled set.
    pub fn retry(&mut self) -> bool {
        self.state.quit(&mut self.fall);
        self.start()
    }

    /// Quit without asking.
    pub fn quit(&mut self) {
        self.state.quit(&mut self.fall);
        self.queued.clear();
    }

    /// Ask the player first; nothing changes unless they confirm.
    pub fn quit_with(&mut self, prompt: &mut dyn ConfirmPrompt) -> bool {
        if !prompt.ask(QUIT_MESSAGE, true) {
            return false;
        }
        self.quit();
        true
    }

    /// Answer with the label at `index` of the current choice set.
    pub fn choose_index(&mut self, index: usize) -> Option<Outcome> {
        let label = self.choices()?.label_at(index)?.to_string();
        self.choose(&label)
    }

    /// Answer the active question. A pick that arrives once the fall has
    /// reached the deadline is ignored and the question expires instead,
    /// even if no frame has polled the fall since.
    pub fn choose(&mut self, label: &str) -> Option<Outcome> {
        let now = self.clock.now_ms();

        if self.fall.peek(now).is_some_and(|t| t.progress >= 1.0) {
            log::debug!("ignored answer '{label}': deadline passed at {now}ms");
            let mut events = Vec::new();
            if let Some(FallEvent::Expired) = self.fall.poll(now) {
                self.expire(now, &mut events);
            }
            self.queued.extend(events);
            return None;
        }

        let question = self.state.active_question().cloned();
        let (outcome, resolution) = resolver::resolve(&mut self.state, &mut self.fall, label, now)?;
        self.last_resolution = question.map(|question| LastResolution {
            outcome,
            cause: Cause::Choice,
            question,
            selected: Some(label.to_string()),
            at_ms: now,
        });
        self.queued.push(GameEvent::Resolved {
            outcome,
            cause: Cause::Choice,
        });
        if self.after_resolution(resolution) {
            self.queued.push(GameEvent::GameOver);
        }
        Some(outcome)
    }

    /// Drive one frame: queued resolutions, fall progress, expiry, then any
    /// due advances.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let now = self.clock.now_ms();
        let mut events = std::mem::take(&mut self.queued);

        match self.fall.poll(now) {
            Some(FallEvent::Tick(tick)) => events.push(GameEvent::Fall(tick)),
            Some(FallEvent::Expired) => self.expire(now, &mut events),
            None => {}
        }

        self.run_due(now, &mut events);
        events
    }

    fn expire(&mut self, now: u64, events: &mut Vec<GameEvent>) {
        let question = self.state.active_question().cloned();
        let Some(resolution) = resolver::expire(&mut self.state, now) else {
            return;
        };
        log::debug!("question expired at {now}ms");
        self.last_resolution = question.map(|question| LastResolution {
            outcome: Outcome::Incorrect,
            cause: Cause::Expiry,
            question,
            selected: None,
            at_ms: now,
        });
        events.push(GameEvent::Resolved {
            outcome: Outcome::Incorrect,
            cause: Cause::Expiry,
        });
        if self.after_resolution(resolution) {
            events.push(GameEvent::GameOver);
        }
    }

    /// Returns true when the round just ended in game over.
    fn after_resolution(&mut self, resolution: Resolution) -> bool {
        match resolution {
            Resolution::Settling(pending) => {
                self.pending.push(pending);
                false
            }
            Resolution::GameOver => true,
        }
    }

    fn run_due(&mut self, now: u64, events: &mut Vec<GameEvent>) {
        let (due, waiting): (Vec<PendingAdvance>, Vec<PendingAdvance>) = self
            .pending
            .drain(..)
            .partition(|p| p.due_at_ms <= now);
        self.pending = waiting;

        for pending in due {
            if pending.generation != self.state.generation() {
                log::debug!(
                    "discarded stale advance from round {} (now {})",
                    pending.generation,
                    self.state.generation()
                );
                continue;
            }
            self.advance(now, events);
        }
    }

    fn advance(&mut self, now: u64, events: &mut Vec<GameEvent>) {
        match self
            .state
            .advance(self.pool.questions(), &mut self.fall, now, &mut self.rng)
        {
            Advance::Activated(index) => events.push(GameEvent::Activated { index }),
            Advance::Finished => events.push(GameEvent::Finished {
                elapsed_ms: self.state.elapsed_ms(now),
            }),
            Advance::Ignored => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::clock::ManualClock;
    use crate::quiz::options::QuantityMode;
    use rand::SeedableRng;

    fn pool(n: usize) -> QuestionPool {
        let questions = (0..n)
            .map(|i| Question::new(&format!("漢{i}"), &format!("かん{i}")))
            .collect();
        QuestionPool::new("1nen", questions).unwrap()
    }

    fn game(n: usize, quantity: QuantityMode) -> (Game<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let options = RoundOptions {
            quantity,
            base_fall_ms: 2000,
            ..RoundOptions::default()
        };
        let game = Game::new(pool(n), options, clock.clone(), SmallRng::seed_from_u64(42));
        (game, clock)
    }

    fn correct_label(game: &Game<ManualClock>) -> String {
        game.choices().unwrap().correct().to_string()
    }

    #[test]
    fn start_activates_first_question() {
        let (mut game, _) = game(5, QuantityMode::Fixed(3));
        assert!(game.start());
        assert_eq!(game.status(), RoundStatus::Running);
        assert_eq!(game.state().goal_count(), 3);
        assert!(game.active_question().is_some());
        assert!(game.tick().is_empty());
        assert!(!game.start());
    }

    #[test]
    fn settle_delay_gates_next_question() {
        let (mut game, clock) = game(5, QuantityMode::Fixed(3));
        game.start();
        let label = correct_label(&game);
        assert_eq!(game.choose(&label), Some(Outcome::Correct));
        assert!(game.active_question().is_none());

        clock.advance(399);
        assert_eq!(
            game.tick(),
            vec![GameEvent::Resolved {
                outcome: Outcome::Correct,
                cause: Cause::Choice
            }]
        );
        assert!(game.active_question().is_none());

        clock.advance(1);
        let events = game.tick();
        assert!(events.iter().any(|e| matches!(e, GameEvent::Activated { .. })));
        assert!(game.active_question().is_some());
    }

    #[test]
    fn stale_advance_after_retry_is_discarded() {
        let (mut game, clock) = game(5, QuantityMode::Fixed(3));
        game.start();
        let label = correct_label(&game);
        game.choose(&label);
        assert!(game.has_pending_advance());

        // Retry before the settle delay elapses.
        game.retry();
        let fresh = game.active_question().cloned();
        assert!(!game.has_pending_advance());
        clock.advance(500);
        let events = game.tick();
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Activated { .. })));
        assert_eq!(game.active_question().cloned(), fresh);
        assert_eq!(game.state().solved_count(), 0);
    }

    #[test]
    fn declined_quit_changes_nothing() {
        let (mut game, _) = game(5, QuantityMode::Fixed(3));
        game.start();
        let mut asked = Vec::new();
        let mut decline = |msg: &str, cancel: bool| {
            asked.push((msg.to_string(), cancel));
            false
        };
        assert!(!game.quit_with(&mut decline));
        assert_eq!(game.status(), RoundStatus::Running);
        assert_eq!(asked, vec![(QUIT_MESSAGE.to_string(), true)]);

        let mut accept = |_: &str, _: bool| true;
        assert!(game.quit_with(&mut accept));
        assert_eq!(game.status(), RoundStatus::Idle);
        assert!(game.active_question().is_none());
    }

    #[test]
    fn quit_during_settle_never_advances() {
        let (mut game, clock) = game(5, QuantityMode::Fixed(3));
        game.start();
        let label = correct_label(&game);
        game.choose(&label);
        game.quit();
        clock.advance(1000);
        assert!(game.tick().is_empty());
        assert_eq!(game.status(), RoundStatus::Idle);
    }

    #[test]
    fn choose_index_uses_current_choice_set() {
        let (mut game, _) = game(5, QuantityMode::Fixed(3));
        game.start();
        let idx = game.choices().unwrap().correct_index().unwrap();
        assert_eq!(game.choose_index(idx), Some(Outcome::Correct));
        assert_eq!(game.choose_index(0), None);
        assert_eq!(game.choose_index(99), None);
    }

    #[test]
    fn expiry_reports_one_resolution_and_remembers_it() {
        let (mut game, clock) = game(5, QuantityMode::Fixed(3));
        game.start();
        clock.advance(1000);
        let events = game.tick();
        assert!(matches!(events.as_slice(), [GameEvent::Fall(t)] if (t.progress - 0.5).abs() < 1e-9));

        clock.advance(1000);
        let events = game.tick();
        assert_eq!(
            events,
            vec![GameEvent::Resolved {
                outcome: Outcome::Incorrect,
                cause: Cause::Expiry
            }]
        );
        let last = game.last_resolution().unwrap();
        assert_eq!(last.cause, Cause::Expiry);
        assert!(last.selected.is_none());
        assert_eq!(game.state().lives(), 2);
    }

    #[test]
    fn late_pick_after_deadline_counts_as_expiry() {
        let (mut game, clock) = game(5, QuantityMode::Fixed(3));
        game.start();
        let label = correct_label(&game);

        // No frame runs between the deadline and the pick.
        clock.advance(2500);
        assert_eq!(game.choose(&label), None);
        assert_eq!(game.state().solved_count(), 0);
        assert_eq!(game.state().lives(), 2);
        assert_eq!(game.last_resolution().unwrap().cause, Cause::Expiry);

        assert_eq!(
            game.tick(),
            vec![GameEvent::Resolved {
                outcome: Outcome::Incorrect,
                cause: Cause::Expiry
            }]
        );
        assert_eq!(game.choose(&label), None);
        assert_eq!(game.state().lives(), 2);
    }

    #[test]
    fn pick_just_before_deadline_still_counts() {
        let (mut game, clock) = game(5, QuantityMode::Fixed(3));
        game.start();
        let label = correct_label(&game);
        clock.advance(1999);
        assert_eq!(game.choose(&label), Some(Outcome::Correct));
        assert_eq!(game.state().solved_count(), 1);
    }

    #[test]
    fn wrong_pick_taking_last_life_reports_game_over() {
        let (mut game, clock) = game(5, QuantityMode::Fixed(3));
        game.start();
        for _ in 0..3 {
            let choices = game.choices().unwrap();
            let wrong = choices
                .labels()
                .iter()
                .find(|l| *l != choices.correct())
                .unwrap()
                .clone();
            assert_eq!(game.choose(&wrong), Some(Outcome::Incorrect));
            if game.status() == RoundStatus::GameOver {
                break;
            }
            clock.advance(400);
            game.tick();
        }
        assert_eq!(game.status(), RoundStatus::GameOver);
        assert_eq!(
            game.tick(),
            vec![
                GameEvent::Resolved {
                    outcome: Outcome::Incorrect,
                    cause: Cause::Choice
                },
                GameEvent::GameOver
            ]
        );
        assert!(game.tick().is_empty());
    }
}
