use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use yomifall::config::Config;
use yomifall::quiz::clock::SystemClock;
use yomifall::quiz::options::Difficulty;
use yomifall::quiz::pool::QuestionPool;
use yomifall::quiz::prompt::ConfirmPrompt;
use yomifall::quiz::source::{self, LayeredSource, QuestionSource};
use yomifall::quiz::{Game, GameEvent, RoundStatus};
use yomifall::store::history::HistoryStore;
use yomifall::store::kv::{FileKvStore, KvStore, MemoryKvStore};
use yomifall::store::schema::HistoryRecord;

use crate::ui::components::menu::{Menu, MenuItem, MenuValues};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Game,
    Result,
    History,
}

/// How the last finished round went, for the result screen.
#[derive(Clone, Debug)]
pub struct RoundSummary {
    pub elapsed_ms: u64,
    pub goal: usize,
    pub rank: Option<usize>,
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: &'static Theme,
    pub menu: Menu<'static>,
    pub game: Option<Game<SystemClock>>,
    /// Fall progress of the active question, 0.0 at the top of the lane.
    pub lane_progress: f64,
    pub last_summary: Option<RoundSummary>,
    pub records: Vec<HistoryRecord>,
    pub should_quit: bool,
    set_ids: Vec<String>,
    source: Box<dyn QuestionSource>,
    history: HistoryStore<Box<dyn KvStore>>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let sets_dir = PathBuf::from(&config.sets_dir);
        let source = LayeredSource::standard(sets_dir, config.sets_url.as_deref());

        let kv: Box<dyn KvStore> = match FileKvStore::new() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("history will not be saved: {e:#}");
                Box::new(MemoryKvStore::new())
            }
        };

        let theme = Theme::load(&config.theme).unwrap_or_default();
        Self::with_parts(config, Box::new(source), kv, Box::leak(Box::new(theme)))
    }

    pub fn with_parts(
        config: Config,
        source: Box<dyn QuestionSource>,
        kv: Box<dyn KvStore>,
        theme: &'static Theme,
    ) -> Self {
        let set_ids = source::available_set_ids(Some(&PathBuf::from(&config.sets_dir)));
        let mut app = Self {
            screen: AppScreen::Menu,
            menu: Menu::new(theme, MenuValues::default()),
            theme,
            config,
            game: None,
            lane_progress: 0.0,
            last_summary: None,
            records: Vec::new(),
            should_quit: false,
            set_ids,
            source,
            history: HistoryStore::new(kv),
        };
        app.refresh_menu();
        app
    }

    pub fn set_theme(&mut self, theme: &'static Theme) {
        self.theme = theme;
        self.menu.theme = theme;
    }

    pub fn refresh_menu(&mut self) {
        self.menu.values = MenuValues {
            set_label: source::set_label(&self.config.set_id),
            quantity: self.config.quantity.to_string(),
            direction: self.config.direction.label().to_string(),
            difficulty: self.config.difficulty.level(),
        };
    }

    /// Step the option under the cursor.
    pub fn cycle_option(&mut self, forward: bool) {
        match self.menu.current() {
            MenuItem::Set => {
                if self.set_ids.is_empty() {
                    return;
                }
                let len = self.set_ids.len();
                let pos = self
                    .set_ids
                    .iter()
                    .position(|id| *id == self.config.set_id)
                    .unwrap_or(0);
                let next = if forward {
                    (pos + 1) % len
                } else {
                    (pos + len - 1) % len
                };
                self.config.set_id = self.set_ids[next].clone();
            }
            MenuItem::Quantity => self.config.quantity = self.config.quantity.cycle(forward),
            MenuItem::Direction => self.config.direction = self.config.direction.toggle(),
            MenuItem::Difficulty => {
                self.config.difficulty = if forward {
                    self.config.difficulty.harder()
                } else {
                    self.config.difficulty.easier()
                };
            }
            MenuItem::Start | MenuItem::History | MenuItem::Quit => return,
        }
        self.refresh_menu();
    }

    /// Persist the menu choices so the next launch starts from them.
    pub fn save_config(&self) {
        if let Err(e) = self.config.save() {
            log::warn!("could not save config: {e:#}");
        }
    }

    pub fn set_difficulty(&mut self, level: u8) {
        self.config.difficulty = Difficulty::new(level);
        self.refresh_menu();
    }

    /// Load the selected set and begin a round. A set that cannot be
    /// loaded is reported through `prompt` and leaves the app on the menu.
    pub fn start_game(&mut self, prompt: &mut dyn ConfirmPrompt) {
        let pool = match QuestionPool::load(self.source.as_ref(), &self.config.set_id) {
            Ok(pool) => pool,
            Err(e) => {
                log::error!("{e}");
                prompt.ask(&format!("Could not load questions: {e}"), false);
                return;
            }
        };

        let mut game = Game::new(
            pool,
            self.config.round_options(),
            SystemClock::new(),
            SmallRng::from_entropy(),
        );
        game.start();
        self.game = Some(game);
        self.lane_progress = 0.0;
        self.last_summary = None;
        self.screen = AppScreen::Game;
    }

    /// Advance the round by one frame.
    pub fn on_frame(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        if self.screen != AppScreen::Game {
            return;
        }

        for event in game.tick() {
            match event {
                GameEvent::Fall(tick) => self.lane_progress = tick.progress,
                GameEvent::Activated { .. } => self.lane_progress = 0.0,
                GameEvent::Finished { elapsed_ms } => {
                    let record = HistoryRecord::today(
                        game.options().direction,
                        &game.pool().set_label,
                        elapsed_ms,
                    );
                    let rank = self.history.record(record);
                    self.records = self.history.list();
                    self.last_summary = Some(RoundSummary {
                        elapsed_ms,
                        goal: game.state().goal_count(),
                        rank,
                    });
                    self.screen = AppScreen::Result;
                }
                GameEvent::GameOver => log::info!("round ended in game over"),
                GameEvent::Resolved { .. } => {}
            }
        }
    }

    pub fn choose(&mut self, index: usize) {
        if let Some(game) = self.game.as_mut() {
            game.choose_index(index);
        }
    }

    pub fn retry(&mut self) {
        if let Some(game) = self.game.as_mut() {
            game.retry();
            self.lane_progress = 0.0;
            self.last_summary = None;
            self.screen = AppScreen::Game;
        }
    }

    /// Leave a running round after confirmation. Rounds that already ended
    /// need no confirmation.
    pub fn quit_round(&mut self, prompt: &mut dyn ConfirmPrompt) {
        let Some(game) = self.game.as_mut() else {
            self.go_to_menu();
            return;
        };
        if game.status() == RoundStatus::Running {
            if !game.quit_with(prompt) {
                return;
            }
        } else {
            game.quit();
        }
        self.go_to_menu();
    }

    pub fn is_game_over(&self) -> bool {
        self.game
            .as_ref()
            .is_some_and(|g| g.status() == RoundStatus::GameOver)
    }

    pub fn go_to_history(&mut self) {
        self.records = self.history.list();
        self.screen = AppScreen::History;
    }

    pub fn go_to_menu(&mut self) {
        self.game = None;
        self.screen = AppScreen::Menu;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yomifall::error::PoolError;
    use yomifall::quiz::question::Question;

    struct FixedSource(Vec<Question>);

    impl QuestionSource for FixedSource {
        fn fetch(&self, set_id: &str) -> Result<Vec<Question>, PoolError> {
            if set_id == "missing" {
                return Err(PoolError::unavailable(set_id, "not found"));
            }
            Ok(self.0.clone())
        }
    }

    fn app() -> App {
        let questions = vec![
            Question::new("山", "やま"),
            Question::new("川", "かわ"),
            Question::new("空", "そら"),
            Question::new("雨", "あめ"),
        ];
        let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
        let mut config = Config::default();
        config.sets_dir = "/nonexistent/yomifall-sets".to_string();
        App::with_parts(
            config,
            Box::new(FixedSource(questions)),
            Box::new(MemoryKvStore::new()),
            theme,
        )
    }

    #[test]
    fn load_failure_is_reported_once_and_keeps_menu() {
        let mut app = app();
        app.config.set_id = "missing".to_string();
        let mut notices = Vec::new();
        let mut prompt = |msg: &str, cancel: bool| {
            notices.push((msg.to_string(), cancel));
            true
        };
        app.start_game(&mut prompt);
        assert_eq!(app.screen, AppScreen::Menu);
        assert!(app.game.is_none());
        assert_eq!(notices.len(), 1);
        assert!(!notices[0].1);
    }

    #[test]
    fn declined_quit_stays_in_round() {
        let mut app = app();
        app.start_game(&mut |_: &str, _: bool| true);
        assert_eq!(app.screen, AppScreen::Game);

        app.quit_round(&mut |_: &str, _: bool| false);
        assert_eq!(app.screen, AppScreen::Game);
        app.quit_round(&mut |_: &str, _: bool| true);
        assert_eq!(app.screen, AppScreen::Menu);
        assert!(app.game.is_none());
    }

    #[test]
    fn frames_move_the_lane_and_retry_resets_it() {
        let mut app = app();
        app.start_game(&mut |_: &str, _: bool| true);
        assert_eq!(app.lane_progress, 0.0);

        app.lane_progress = 0.7;
        app.on_frame();
        assert!((0.0..=1.0).contains(&app.lane_progress));

        app.lane_progress = 0.7;
        app.retry();
        assert_eq!(app.lane_progress, 0.0);
        assert_eq!(app.screen, AppScreen::Game);
    }

    #[test]
    fn cycling_options_updates_menu_values() {
        let mut app = app();
        app.menu.selected = 2;
        assert_eq!(app.menu.current(), MenuItem::Direction);
        let before = app.menu.values.direction.clone();
        app.cycle_option(true);
        assert_ne!(app.menu.values.direction, before);

        app.menu.selected = 0;
        app.cycle_option(true);
        assert_eq!(app.config.set_id, "2nen_1");
        app.cycle_option(false);
        app.cycle_option(false);
        assert_eq!(app.config.set_id, "6nen_2");
    }
}
