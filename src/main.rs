mod app;
mod event;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};

use yomifall::config::Config;
use yomifall::quiz::RoundStatus;
use yomifall::quiz::clock::format_elapsed;
use yomifall::quiz::options::{Direction as QuizDirection, QuantityMode};
use yomifall::quiz::prompt::ConfirmPrompt;

use app::{App, AppScreen};
use event::{AppEvent, EventHandler};
use ui::components::choices::ChoiceBar;
use ui::components::lane::{FallLane, Flash};
use ui::components::menu::MenuItem;
use ui::components::modal::Modal;
use ui::components::progress_bar::ProgressBar;
use ui::components::ranking_table::RankingTable;
use ui::components::round_header::RoundHeader;
use ui::layout::{GameLayout, centered_rect, pack_hint_lines};
use ui::theme::Theme;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

#[derive(Parser)]
#[command(name = "yomifall", version, about = "Terminal kanji reading quiz with falling words")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Question set id (e.g. 1nen, 2nen_1)")]
    set: Option<String>,

    #[arg(short, long, help = "Questions per round (5, 10, 20 or all)")]
    quantity: Option<String>,

    #[arg(long, value_enum, help = "Which side of the card falls")]
    direction: Option<CliDirection>,

    #[arg(short, long, help = "Fall speed, 1 (slow) to 5 (fast)")]
    difficulty: Option<u8>,

    #[arg(long, help = "Directory with extra question set JSON files")]
    sets_dir: Option<String>,

    #[arg(long, help = "Print the bundled theme names and exit")]
    list_themes: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CliDirection {
    /// Kanji falls, pick the reading.
    Word,
    /// Reading falls, pick the kanji.
    Reading,
}

fn init_logging() {
    let Some(dir) = dirs::data_dir().map(|d| d.join("yomifall")) else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("yomifall.log"))
    else {
        return;
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn apply_cli(config: &mut Config, cli: &Cli) -> Result<()> {
    if let Some(ref set) = cli.set {
        config.set_id = set.clone();
    }
    if let Some(ref quantity) = cli.quantity {
        config.quantity = QuantityMode::try_from(quantity.clone()).map_err(anyhow::Error::msg)?;
    }
    if let Some(direction) = cli.direction {
        config.direction = match direction {
            CliDirection::Word => QuizDirection::WordGiven,
            CliDirection::Reading => QuizDirection::ReadingGiven,
        };
    }
    if let Some(ref dir) = cli.sets_dir {
        config.sets_dir = dir.clone();
    }
    config.validate();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.list_themes {
        for name in Theme::available_themes() {
            println!("{name}");
        }
        return Ok(());
    }
    init_logging();

    let mut config = Config::load().unwrap_or_else(|e| {
        log::warn!("config unreadable, using defaults: {e:#}");
        Config::default()
    });
    apply_cli(&mut config, &cli)?;
    log::info!("starting with set {} ({})", config.set_id, config.quantity);

    let frame_rate = Duration::from_millis(config.frame_ms);
    let mut app = App::new(config);

    if let Some(level) = cli.difficulty {
        app.set_difficulty(level);
    }
    if let Some(theme_name) = cli.theme {
        if let Some(theme) = Theme::load(&theme_name) {
            let theme: &'static Theme = Box::leak(Box::new(theme));
            app.set_theme(theme);
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(frame_rate);

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        log::error!("{err:?}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Term, app: &mut App, events: &EventHandler) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => {
                let mut prompt = TerminalPrompt {
                    terminal: &mut *terminal,
                    events,
                    theme: app.theme,
                };
                handle_key(app, key, &mut prompt);
            }
            AppEvent::Frame => app.on_frame(),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Blocking yes/no (or acknowledge-only) dialog drawn over a blank screen.
struct TerminalPrompt<'a> {
    terminal: &'a mut Term,
    events: &'a EventHandler,
    theme: &'static Theme,
}

impl ConfirmPrompt for TerminalPrompt<'_> {
    fn ask(&mut self, message: &str, with_cancel: bool) -> bool {
        let theme = self.theme;
        loop {
            let drawn = self.terminal.draw(|frame| {
                let area = frame.area();
                frame.render_widget(
                    Block::default().style(Style::default().bg(theme.colors.bg())),
                    area,
                );
                let dialog = centered_rect(56, 8, area);
                frame.render_widget(Modal::new(message, with_cancel, theme), dialog);
            });
            if let Err(e) = drawn {
                log::error!("prompt draw failed: {e}");
                return false;
            }

            match self.events.next() {
                Ok(AppEvent::Key(key)) => {
                    if !with_cancel {
                        return true;
                    }
                    match key.code {
                        KeyCode::Char('y') | KeyCode::Enter => return true,
                        KeyCode::Char('n') | KeyCode::Esc => return false,
                        _ => {}
                    }
                }
                Ok(_) => {}
                Err(_) => return false,
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, prompt: &mut dyn ConfirmPrompt) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key, prompt),
        AppScreen::Game => handle_game_key(app, key, prompt),
        AppScreen::Result => handle_result_key(app, key),
        AppScreen::History => handle_history_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent, prompt: &mut dyn ConfirmPrompt) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Left | KeyCode::Char('h') => app.cycle_option(false),
        KeyCode::Right | KeyCode::Char('l') => app.cycle_option(true),
        KeyCode::Char('s') => {
            app.save_config();
            app.start_game(prompt);
        }
        KeyCode::Char('b') => app.go_to_history(),
        KeyCode::Enter => match app.menu.current() {
            MenuItem::Start => {
                app.save_config();
                app.start_game(prompt);
            }
            MenuItem::History => app.go_to_history(),
            MenuItem::Quit => app.should_quit = true,
            item if item.is_option() => app.cycle_option(true),
            _ => {}
        },
        _ => {}
    }
}

fn handle_game_key(app: &mut App, key: KeyEvent, prompt: &mut dyn ConfirmPrompt) {
    if app.is_game_over() {
        match key.code {
            KeyCode::Char('r') => app.retry(),
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => app.go_to_menu(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char(ch @ '1'..='9') => {
            let index = ch as usize - '1' as usize;
            app.choose(index);
        }
        KeyCode::Char('r') => app.retry(),
        KeyCode::Char('q') | KeyCode::Esc => app.quit_round(prompt),
        _ => {}
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.retry(),
        KeyCode::Char('b') => app.go_to_history(),
        KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => app.go_to_menu(),
        _ => {}
    }
}

fn handle_history_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => app.go_to_menu(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Game => render_game(frame, app),
        AppScreen::Result => render_result(frame, app),
        AppScreen::History => render_history(frame, app),
    }
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, hints: &[&str], area: ratatui::layout::Rect) {
    let lines: Vec<Line> = pack_hint_lines(hints, area.width as usize)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(app.theme.colors.accent_dim()))))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let menu_area = centered_rect(48, 16, layout[0]);
    frame.render_widget(&app.menu, menu_area);

    render_footer(
        frame,
        app,
        &["[↑↓] Select", "[←→] Change", "[Enter/s] Start", "[b] Best times", "[q] Quit"],
        layout[1],
    );
}

fn render_game(frame: &mut ratatui::Frame, app: &App) {
    let Some(ref game) = app.game else {
        return;
    };
    let area = frame.area();
    let colors = &app.theme.colors;
    let layout = GameLayout::new(area);
    let direction = game.options().direction;
    let state = game.state();

    let header = RoundHeader {
        set_label: &game.pool().set_label,
        direction: direction.label(),
        elapsed_ms: game.elapsed_ms(),
        solved: state.solved_count(),
        goal: state.goal_count(),
        lives: state.lives(),
        lives_max: state.config().lives_max,
        theme: app.theme,
    };
    frame.render_widget(header, layout.header);

    if let Some(progress_area) = layout.progress {
        let bar = ProgressBar::new(state.solved_count(), state.goal_count(), app.theme);
        frame.render_widget(bar, progress_area);
    }

    let flash = game.last_resolution().map(|last| Flash {
        outcome: last.outcome,
        shown: last.question.shown(direction),
        answer: last.question.label(direction),
    });
    let lane = FallLane::new(
        game.active_question().map(|q| q.shown(direction)),
        app.lane_progress,
        app.theme,
    )
    .flash(flash);
    frame.render_widget(lane, layout.lane);

    let labels: &[String] = game.choices().map(|c| c.labels()).unwrap_or(&[]);
    let enabled = game.status() == RoundStatus::Running;
    frame.render_widget(ChoiceBar::new(labels, enabled, app.theme), layout.choices);

    render_footer(
        frame,
        app,
        &["[1-3] Answer", "[r] Retry", "[Esc] Quit"],
        layout.footer,
    );

    if game.status() == RoundStatus::GameOver {
        let overlay = centered_rect(40, 7, layout.lane);
        frame.render_widget(Clear, overlay);
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "GAME OVER",
                Style::default()
                    .fg(colors.error())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("{} / {} solved", state.solved_count(), state.goal_count()),
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "[r] Retry  [Esc] Menu",
                Style::default().fg(colors.accent()),
            )),
        ];
        let panel = Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::bordered()
                .border_style(Style::default().fg(colors.error()))
                .style(Style::default().bg(colors.bg())),
        );
        frame.render_widget(panel, overlay);
    }
}

fn render_result(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let Some(ref summary) = app.last_summary else {
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(centered_rect(64, 22, area));

    let rank_line = match summary.rank {
        Some(1) => "New best time!".to_string(),
        Some(rank) => format!("Ranked #{rank}"),
        None => "Not in the top times".to_string(),
    };
    let lines = vec![
        Line::from(Span::styled(
            "CLEAR!",
            Style::default()
                .fg(colors.success())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{} questions in {}", summary.goal, format_elapsed(summary.elapsed_ms)),
            Style::default().fg(colors.fg()),
        )),
        Line::from(Span::styled(rank_line, Style::default().fg(colors.accent()))),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(Block::bordered()),
        layout[0],
    );

    let table = RankingTable::new(&app.records, app.theme).highlight(summary.rank);
    frame.render_widget(table, layout[1]);

    render_footer(
        frame,
        app,
        &["[r] Retry", "[b] Best times", "[Esc] Menu"],
        layout[2],
    );
}

fn render_history(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(1)])
        .split(centered_rect(64, 16, area));

    frame.render_widget(RankingTable::new(&app.records, app.theme), layout[0]);
    render_footer(frame, app, &["[Esc] Back"], layout[1]);
}
