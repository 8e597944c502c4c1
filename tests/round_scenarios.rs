use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;

use yomifall::quiz::clock::ManualClock;
use yomifall::quiz::options::{Direction, QuantityMode, RoundOptions};
use yomifall::quiz::pool::QuestionPool;
use yomifall::quiz::question::Question;
use yomifall::quiz::resolver::{Cause, Outcome};
use yomifall::quiz::source::{EmbeddedSource, QuestionSource};
use yomifall::quiz::{Game, GameEvent, RoundStatus};
use yomifall::store::history::HistoryStore;
use yomifall::store::kv::FileKvStore;
use yomifall::store::schema::HistoryRecord;

const WORDS: &[(&str, &str)] = &[
    ("山", "やま"),
    ("川", "かわ"),
    ("空", "そら"),
    ("雨", "あめ"),
    ("花", "はな"),
];

fn pool() -> QuestionPool {
    let questions = WORDS.iter().map(|(w, r)| Question::new(w, r)).collect();
    QuestionPool::new("1nen", questions).unwrap()
}

fn new_game(quantity: QuantityMode, seed: u64) -> (Game<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let options = RoundOptions {
        quantity,
        base_fall_ms: 2000,
        ..RoundOptions::default()
    };
    let game = Game::new(pool(), options, clock.clone(), SmallRng::seed_from_u64(seed));
    (game, clock)
}

fn correct(game: &Game<ManualClock>) -> String {
    game.choices().unwrap().correct().to_string()
}

fn wrong(game: &Game<ManualClock>) -> String {
    let choices = game.choices().unwrap();
    choices
        .labels()
        .iter()
        .find(|l| !choices.is_correct(l))
        .cloned()
        .unwrap()
}

#[test]
fn three_correct_answers_finish_the_round() {
    let (mut game, clock) = new_game(QuantityMode::Fixed(3), 1);
    assert!(game.start());

    let mut finished = None;
    for _ in 0..3 {
        let label = correct(&game);
        assert_eq!(game.choose(&label), Some(Outcome::Correct));
        clock.advance(400);
        for event in game.tick() {
            if let GameEvent::Finished { elapsed_ms } = event {
                finished = Some(elapsed_ms);
            }
        }
    }

    assert_eq!(game.status(), RoundStatus::Finished);
    assert_eq!(finished, Some(1200));
    assert_eq!(game.state().solved_count(), 3);
    assert_eq!(game.state().lives(), 3);
    assert!(game.active_question().is_none());
}

#[test]
fn three_wrong_answers_end_in_game_over() {
    let (mut game, clock) = new_game(QuantityMode::Fixed(3), 2);
    game.start();

    for n in 0..3 {
        let label = wrong(&game);
        assert_eq!(game.choose(&label), Some(Outcome::Incorrect));
        if n < 2 {
            clock.advance(400);
            game.tick();
            assert!(game.active_question().is_some());
        }
    }

    assert_eq!(game.status(), RoundStatus::GameOver);
    assert_eq!(game.state().lives(), 0);
    assert_eq!(game.state().solved_count(), 0);

    // The next frame reports the last wrong pick and the game over.
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

    // Nothing revives a finished round.
    clock.advance(5000);
    assert!(game.tick().is_empty());
    assert_eq!(game.state().lives(), 0);
}

#[test]
fn correct_pick_landing_after_deadline_is_an_expiry() {
    let (mut game, clock) = new_game(QuantityMode::Fixed(3), 3);
    game.start();
    let label = correct(&game);

    clock.advance(2500);
    assert_eq!(game.choose(&label), None);
    assert_eq!(game.state().solved_count(), 0);
    assert_eq!(game.state().lives(), 2);

    let events = game.tick();
    assert_eq!(
        events,
        vec![GameEvent::Resolved {
            outcome: Outcome::Incorrect,
            cause: Cause::Expiry
        }]
    );
    assert_eq!(game.state().lives(), 2);
}

#[test]
fn deadline_expiry_costs_exactly_one_life() {
    let (mut game, clock) = new_game(QuantityMode::Fixed(3), 3);
    game.start();

    clock.advance(2000);
    let events = game.tick();
    let expiries = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                GameEvent::Resolved {
                    cause: Cause::Expiry,
                    ..
                }
            )
        })
        .count();
    assert_eq!(expiries, 1);
    assert_eq!(game.state().lives(), 2);

    // A late click on the expired question is ignored.
    assert_eq!(game.choose("やま"), None);
    assert!(game.tick().is_empty());
    assert_eq!(game.state().lives(), 2);

    clock.advance(400);
    let events = game.tick();
    assert!(events.iter().any(|e| matches!(e, GameEvent::Activated { .. })));
    // The missed question stays unsolved and may come back.
    assert_eq!(game.state().unsolved_count(), 3);
}

#[test]
fn retry_resamples_and_ignores_the_old_round() {
    let (mut game, clock) = new_game(QuantityMode::Fixed(3), 4);
    game.start();
    let label = correct(&game);
    game.choose(&label);
    let old_generation = game.state().generation();

    assert!(game.retry());
    assert!(game.state().generation() > old_generation);
    assert_eq!(game.state().solved_count(), 0);
    assert_eq!(game.state().lives(), 3);
    let active = game.active_question().cloned();

    clock.advance(400);
    let events = game.tick();
    assert!(!events.iter().any(|e| matches!(e, GameEvent::Activated { .. })));
    assert_eq!(game.active_question().cloned(), active);
}

#[test]
fn all_mode_asks_every_question() {
    let (mut game, clock) = new_game(QuantityMode::All, 5);
    game.start();
    assert_eq!(game.state().goal_count(), WORDS.len());

    let mut asked = Vec::new();
    while game.status() == RoundStatus::Running {
        asked.push(game.active_question().unwrap().prompt.clone());
        let label = correct(&game);
        game.choose(&label);
        clock.advance(400);
        game.tick();
    }
    asked.sort();
    asked.dedup();
    assert_eq!(asked.len(), WORDS.len());
    assert_eq!(game.status(), RoundStatus::Finished);
}

#[test]
fn reading_given_round_offers_words() {
    let clock = ManualClock::new();
    let options = RoundOptions {
        quantity: QuantityMode::Fixed(2),
        direction: Direction::ReadingGiven,
        ..RoundOptions::default()
    };
    let mut game = Game::new(pool(), options, clock, SmallRng::seed_from_u64(6));
    game.start();
    let question = game.active_question().cloned().unwrap();
    assert_eq!(game.choices().unwrap().correct(), question.prompt);
}

#[test]
fn finished_round_lands_in_history_on_disk() {
    let dir = TempDir::new().unwrap();
    let (mut game, clock) = new_game(QuantityMode::Fixed(3), 7);
    game.start();

    let mut elapsed = None;
    while game.status() == RoundStatus::Running {
        clock.advance(150);
        let label = correct(&game);
        game.choose(&label);
        clock.advance(400);
        for event in game.tick() {
            if let GameEvent::Finished { elapsed_ms } = event {
                elapsed = Some(elapsed_ms);
            }
        }
    }
    let elapsed = elapsed.unwrap();

    let store = HistoryStore::new(FileKvStore::with_base_dir(dir.path().to_path_buf()).unwrap());
    let rank = store.record(HistoryRecord::today(
        game.options().direction,
        &game.pool().set_label,
        elapsed,
    ));
    assert_eq!(rank, Some(1));

    let reopened =
        HistoryStore::new(FileKvStore::with_base_dir(dir.path().to_path_buf()).unwrap());
    let records = reopened.list();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].elapsed_ms, 1650);
    assert_eq!(records[0].set_label, "Grade 1");
}

#[test]
fn bundled_sets_load_into_pools() {
    let source = EmbeddedSource;
    for set_id in ["1nen", "2nen_1", "2nen_2"] {
        let questions = source.fetch(set_id).unwrap();
        assert!(questions.len() >= 3, "{set_id} too small");
        let pool = QuestionPool::new(set_id, questions).unwrap();
        assert!(!pool.is_empty());
    }
}
