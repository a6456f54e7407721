pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use mathrush::{
    aggregator::SessionSummary,
    analytics::{overall_qpm, DerivedSeries},
    app_dirs::AppDirs,
    config::{ConfigStore, Difficulty, FileConfigStore, Preferences, SessionConfig},
    error::ConfigError,
    problem::Operator,
    runtime::{AppEvent, AppEventSource, CrosstermEventSource, Runner},
    session::{Session, SessionEvent},
    store::{persist_summary, HistoryTotals, SessionHistory, SessionStore, SqliteSummaryStore},
    time_class::TimeClass,
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

const TICK_RATE_MS: u64 = 100;
/// Sessions listed on the history screen
const HISTORY_LIMIT: usize = 20;

/// timed mental arithmetic drills with a per-question performance chart
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Answer as many arithmetic problems as you can before the clock runs out, then study a chart of how your pace and accuracy moved question by question."
)]
pub struct Cli {
    /// number of seconds to run the session
    #[clap(short = 's', long)]
    secs: Option<u64>,

    /// operand range preset
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// operators to drill, comma separated
    #[clap(short = 'o', long, value_enum, value_delimiter = ',')]
    operators: Option<Vec<Operator>>,

    /// seed the problem generator for a repeatable sequence
    #[clap(long)]
    seed: Option<u64>,

    /// do not record finished sessions
    #[clap(long)]
    no_save: bool,
}

impl Cli {
    /// Command line flags win over remembered preferences
    fn apply(&self, mut prefs: Preferences) -> Preferences {
        if let Some(secs) = self.secs {
            prefs.duration_secs = secs;
        }
        if let Some(difficulty) = self.difficulty {
            prefs.difficulty = difficulty;
        }
        if let Some(operators) = &self.operators {
            prefs.operators = operators.clone();
        }
        prefs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Game,
    Results,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    SettingsChanged,
    Quit,
}

/// A finished session as shown on the results screen
#[derive(Debug, Clone)]
pub struct Results {
    pub summary: SessionSummary,
    pub series: DerivedSeries,
    pub qpm: f64,
    pub hovered: Option<usize>,
}

impl Results {
    fn new(summary: SessionSummary, smoothing_window: usize) -> Self {
        Self {
            series: DerivedSeries::with_window(&summary.problem_history, smoothing_window),
            qpm: overall_qpm(summary.total_problems, summary.duration_secs as f64),
            hovered: None,
            summary,
        }
    }
}

/// Past sessions as listed on the history screen
#[derive(Debug, Clone, Default)]
pub struct History {
    pub sessions: Vec<SessionSummary>,
    pub totals: HistoryTotals,
    pub selected: usize,
    /// False when nothing is being recorded
    pub available: bool,
}

impl History {
    fn select_next(&mut self) {
        if self.selected + 1 < self.sessions.len() {
            self.selected += 1;
        }
    }

    fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

pub struct App {
    pub prefs: Preferences,
    pub state: AppState,
    pub session: Session<StdRng>,
    pub results: Option<Results>,
    pub history: History,
    seed: Option<u64>,
    round: u64,
    store: Option<Box<dyn SessionStore>>,
}

impl App {
    pub fn new(
        prefs: Preferences,
        seed: Option<u64>,
        store: Option<Box<dyn SessionStore>>,
    ) -> Result<Self, ConfigError> {
        let mut session = Self::build_session(&prefs, seed, 0)?;
        session.start();
        Ok(Self {
            prefs,
            state: AppState::Game,
            session,
            results: None,
            history: History::default(),
            seed,
            round: 0,
            store,
        })
    }

    fn build_session(
        prefs: &Preferences,
        seed: Option<u64>,
        round: u64,
    ) -> Result<Session<StdRng>, ConfigError> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(round)),
            None => StdRng::from_entropy(),
        };
        Session::new(SessionConfig::from(prefs), rng)
    }

    pub fn restart(&mut self) -> Result<(), ConfigError> {
        self.round += 1;
        let mut session = Self::build_session(&self.prefs, self.seed, self.round)?;
        session.start();
        self.session = session;
        self.results = None;
        self.state = AppState::Game;
        Ok(())
    }

    pub fn advance(&mut self, elapsed: Duration) {
        if self.state != AppState::Game {
            return;
        }
        for event in self.session.advance(elapsed) {
            if let SessionEvent::Ended(summary) = event {
                self.finish(summary);
            }
        }
    }

    /// Stop the clock now and go to results
    pub fn end_early(&mut self) {
        if let Some(summary) = self.session.end() {
            self.finish(summary);
        }
    }

    fn finish(&mut self, summary: SessionSummary) {
        if let Some(store) = self.store.as_mut() {
            persist_summary(store.as_mut(), &summary);
        }
        self.results = Some(Results::new(summary, self.prefs.smoothing_window));
        self.state = AppState::Results;
    }

    /// Reload the stored sessions and switch to the history screen
    pub fn open_history(&mut self) {
        let mut history = History::default();
        if let Some(store) = self.store.as_ref() {
            history.available = true;
            match store.recent(HISTORY_LIMIT) {
                Ok(sessions) => history.sessions = sessions,
                Err(e) => tracing::warn!("could not read session history: {e}"),
            }
            match store.totals() {
                Ok(totals) => history.totals = totals,
                Err(e) => tracing::warn!("could not read history totals: {e}"),
            }
        }
        self.history = history;
        self.state = AppState::History;
    }

    /// Show the selected past session on the results screen
    fn open_selected(&mut self) {
        if let Some(summary) = self.history.sessions.get(self.history.selected) {
            self.results = Some(Results::new(summary.clone(), self.prefs.smoothing_window));
            self.state = AppState::Results;
        }
    }

    pub fn type_char(&mut self, c: char) {
        let mut value = self.session.field().to_string();
        value.push(c);
        self.session.on_answer_changed(&value);
    }

    pub fn backspace(&mut self) {
        let mut value = self.session.field().to_string();
        if value.pop().is_some() {
            self.session.on_answer_changed(&value);
        }
    }

    pub fn on_mouse(&mut self, chart_area: Rect, column: u16, row: u16) {
        if self.state != AppState::Results {
            return;
        }
        if let Some(results) = self.results.as_mut() {
            results.hovered =
                ui::charting::hovered_question(chart_area, &results.series, column, row);
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.session.cancel();
            return KeyOutcome::Quit;
        }

        match self.state {
            AppState::Game => match key.code {
                KeyCode::Esc => {
                    self.session.cancel();
                    return KeyOutcome::Quit;
                }
                KeyCode::Tab => self.end_early(),
                KeyCode::Backspace => self.backspace(),
                KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => self.type_char(c),
                _ => {}
            },
            AppState::Results => match key.code {
                KeyCode::Esc => return KeyOutcome::Quit,
                KeyCode::Char('r') | KeyCode::Char('n') | KeyCode::Char(' ') | KeyCode::Enter => {
                    if let Err(e) = self.restart() {
                        tracing::error!("cannot start session: {e}");
                    }
                }
                KeyCode::Char('h') => self.open_history(),
                KeyCode::Char('t') => {
                    self.prefs.duration_secs = next_duration(self.prefs.duration_secs);
                    return KeyOutcome::SettingsChanged;
                }
                KeyCode::Char('d') => {
                    self.prefs.difficulty = next_difficulty(self.prefs.difficulty);
                    return KeyOutcome::SettingsChanged;
                }
                KeyCode::Char(c) => {
                    if let Some(op) = operator_for_key(c) {
                        if toggle_operator(&mut self.prefs.operators, op) {
                            return KeyOutcome::SettingsChanged;
                        }
                    }
                }
                _ => {}
            },
            AppState::History => match key.code {
                KeyCode::Esc => return KeyOutcome::Quit,
                KeyCode::Up | KeyCode::Char('k') => self.history.select_previous(),
                KeyCode::Down | KeyCode::Char('j') => self.history.select_next(),
                KeyCode::Enter => self.open_selected(),
                KeyCode::Char('b') | KeyCode::Char('h') | KeyCode::Backspace => {
                    self.state = AppState::Results;
                }
                KeyCode::Char('r') | KeyCode::Char('n') => {
                    if let Err(e) = self.restart() {
                        tracing::error!("cannot start session: {e}");
                    }
                }
                _ => {}
            },
        }
        KeyOutcome::Continue
    }
}

/// Next preset duration, wrapping to the shortest
fn next_duration(current: u64) -> u64 {
    let presets: Vec<u64> = TimeClass::ALL
        .iter()
        .flat_map(|class| class.presets().iter().copied())
        .collect();
    presets
        .iter()
        .copied()
        .find(|p| *p > current)
        .or_else(|| presets.first().copied())
        .unwrap_or(current)
}

fn next_difficulty(current: Difficulty) -> Difficulty {
    match current {
        Difficulty::Easy => Difficulty::Medium,
        Difficulty::Medium => Difficulty::Hard,
        Difficulty::Hard => Difficulty::Easy,
    }
}

fn operator_for_key(c: char) -> Option<Operator> {
    match c {
        '+' => Some(Operator::Add),
        '-' => Some(Operator::Sub),
        '*' | 'x' => Some(Operator::Mul),
        '/' => Some(Operator::Div),
        _ => None,
    }
}

/// Flip `op` on or off, refusing to disable the last one
fn toggle_operator(operators: &mut Vec<Operator>, op: Operator) -> bool {
    if let Some(pos) = operators.iter().position(|o| *o == op) {
        if operators.len() == 1 {
            return false;
        }
        operators.remove(pos);
    } else {
        operators.push(op);
        operators.sort_by_key(|o| Operator::ALL.iter().position(|a| a == o));
    }
    true
}

/// Log to a file in the state dir; the terminal belongs to the TUI
fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mathrush=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn open_store() -> Option<Box<dyn SessionStore>> {
    match SqliteSummaryStore::new() {
        Ok(store) => Some(Box::new(store)),
        Err(e) => {
            tracing::warn!("session history disabled: {e}");
            None
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();

    let config_store = FileConfigStore::new();
    let prefs = cli.apply(config_store.load());
    if let Err(e) = SessionConfig::from(&prefs).validate() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::InvalidValue, e).exit();
    }
    if let Err(e) = config_store.save(&prefs) {
        tracing::warn!("could not save preferences: {e}");
    }

    let store = if cli.no_save { None } else { open_store() };
    let mut app = App::new(prefs, cli.seed, store)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut runner = Runner::new(
        CrosstermEventSource::spawn(),
        Duration::from_millis(TICK_RATE_MS),
    );
    let res = start_tui(&mut terminal, &mut app, &mut runner, &config_store);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend, E: AppEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &mut Runner<E>,
    config_store: &dyn ConfigStore,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        let step = runner.step();
        app.advance(step.elapsed);

        match step.event {
            AppEvent::Tick | AppEvent::Resize => {}
            AppEvent::Key(key) => match app.on_key(key) {
                KeyOutcome::Quit => break,
                KeyOutcome::SettingsChanged => {
                    if let Err(e) = config_store.save(&app.prefs) {
                        tracing::warn!("could not save preferences: {e}");
                    }
                }
                KeyOutcome::Continue => {}
            },
            AppEvent::Mouse(mouse) => {
                if matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) {
                    let size = terminal.size()?;
                    let area = ui::chart_area(Rect::new(0, 0, size.width, size.height));
                    app.on_mouse(area, mouse.column, mouse.row);
                }
            }
        }

        terminal.draw(|f| ui::draw(app, f))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use mathrush::error::PersistenceError;
    use mathrush::store::SummarySink;
    use std::{cell::RefCell, rc::Rc};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn prefs(secs: u64) -> Preferences {
        Preferences {
            duration_secs: secs,
            difficulty: Difficulty::Easy,
            operators: vec![Operator::Add, Operator::Mul],
            smoothing_window: 3,
        }
    }

    fn app(secs: u64) -> App {
        App::new(prefs(secs), Some(42), None).unwrap()
    }

    fn answer(app: &mut App) {
        let answer = app.session.current_problem().unwrap().answer.to_string();
        for c in answer.chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
    }

    #[derive(Clone, Default)]
    struct SharedSink(Rc<RefCell<Vec<SessionSummary>>>);

    impl SummarySink for SharedSink {
        fn save(&mut self, summary: &SessionSummary) -> Result<(), PersistenceError> {
            self.0.borrow_mut().push(summary.clone());
            Ok(())
        }
    }

    impl SessionHistory for SharedSink {
        fn recent(&self, limit: usize) -> Result<Vec<SessionSummary>, PersistenceError> {
            Ok(self.0.borrow().iter().rev().take(limit).cloned().collect())
        }

        fn totals(&self) -> Result<HistoryTotals, PersistenceError> {
            Ok(HistoryTotals::from_summaries(&self.0.borrow()))
        }
    }

    #[test]
    fn test_cli_defaults_leave_preferences_alone() {
        let cli = Cli::parse_from(["mathrush"]);
        assert_eq!(cli.apply(Preferences::default()), Preferences::default());
        assert!(!cli.no_save);
        assert_eq!(cli.seed, None);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "mathrush", "-s", "120", "-d", "hard", "-o", "mul,div", "--seed", "3", "--no-save",
        ]);
        let prefs = cli.apply(Preferences::default());
        assert_eq!(prefs.duration_secs, 120);
        assert_eq!(prefs.difficulty, Difficulty::Hard);
        assert_eq!(prefs.operators, vec![Operator::Mul, Operator::Div]);
        assert_eq!(cli.seed, Some(3));
        assert!(cli.no_save);

        let cli = Cli::parse_from(["mathrush", "--secs", "45", "--operators", "add"]);
        let prefs = cli.apply(Preferences::default());
        assert_eq!(prefs.duration_secs, 45);
        assert_eq!(prefs.operators, vec![Operator::Add]);
    }

    #[test]
    fn test_cli_rejects_unknown_operator() {
        assert!(Cli::try_parse_from(["mathrush", "-o", "pow"]).is_err());
    }

    #[test]
    fn test_app_starts_in_game_with_a_problem() {
        let app = app(60);
        assert_eq!(app.state, AppState::Game);
        assert!(app.session.current_problem().is_some());
        assert_eq!(app.session.remaining_secs(), 60);
    }

    #[test]
    fn test_invalid_preferences_are_rejected() {
        let mut p = prefs(60);
        p.operators.clear();
        assert!(App::new(p, None, None).is_err());
    }

    #[test]
    fn test_typing_the_answer_moves_on() {
        let mut app = app(60);
        answer(&mut app);
        answer(&mut app);
        assert_eq!(app.session.total_problems(), 2);
        assert_eq!(app.session.first_try_correct(), 2);
        assert_eq!(app.session.field(), "");
    }

    #[test]
    fn test_letters_never_reach_the_field() {
        let mut app = app(60);
        app.on_key(key(KeyCode::Char('a')));
        assert_eq!(app.session.field(), "");
        // no enabled operator has an answer below 4
        app.on_key(key(KeyCode::Char('0')));
        app.on_key(key(KeyCode::Char('0')));
        app.on_key(key(KeyCode::Char('0')));
        app.on_key(key(KeyCode::Backspace));
        assert_eq!(app.session.field(), "00");
    }

    #[test]
    fn test_expiry_shows_results_and_persists() {
        let sink = SharedSink::default();
        let mut app = App::new(prefs(2), Some(1), Some(Box::new(sink.clone()))).unwrap();
        answer(&mut app);
        app.advance(Duration::from_millis(1500));
        assert_eq!(app.state, AppState::Game);
        app.advance(Duration::from_millis(600));
        assert_eq!(app.state, AppState::Results);

        let results = app.results.as_ref().unwrap();
        assert_eq!(results.summary.total_problems, 1);
        assert_eq!(results.qpm, 30.0);
        assert_eq!(results.series.len(), 1);
        assert_eq!(sink.0.borrow().len(), 1);

        // late ticks after the end change nothing
        app.advance(Duration::from_secs(5));
        assert_eq!(sink.0.borrow().len(), 1);
    }

    #[test]
    fn test_tab_ends_early_and_escape_cancels() {
        let mut app = app(60);
        app.on_key(key(KeyCode::Tab));
        assert_eq!(app.state, AppState::Results);

        let mut app = self::app(60);
        assert_eq!(app.on_key(key(KeyCode::Esc)), KeyOutcome::Quit);
        assert!(app.results.is_none());
    }

    #[test]
    fn test_restart_from_results() {
        let mut app = app(60);
        answer(&mut app);
        app.end_early();
        let first = app.results.as_ref().unwrap().summary.clone();
        assert_eq!(first.total_problems, 1);

        assert_eq!(app.on_key(key(KeyCode::Char('r'))), KeyOutcome::Continue);
        assert_eq!(app.state, AppState::Game);
        assert!(app.results.is_none());
        assert_eq!(app.session.total_problems(), 0);
    }

    #[test]
    fn test_settings_keys() {
        let mut app = app(60);
        app.end_early();

        assert_eq!(app.on_key(key(KeyCode::Char('t'))), KeyOutcome::SettingsChanged);
        assert_eq!(app.prefs.duration_secs, 120);
        assert_eq!(app.on_key(key(KeyCode::Char('d'))), KeyOutcome::SettingsChanged);
        assert_eq!(app.prefs.difficulty, Difficulty::Medium);
        assert_eq!(app.on_key(key(KeyCode::Char('/'))), KeyOutcome::SettingsChanged);
        assert_eq!(
            app.prefs.operators,
            vec![Operator::Add, Operator::Mul, Operator::Div]
        );

        app.on_key(key(KeyCode::Char('r')));
        assert_eq!(app.session.remaining_secs(), 120);
        assert_eq!(app.session.config().difficulty, Difficulty::Medium);
    }

    #[test]
    fn test_next_duration_cycles_through_presets() {
        assert_eq!(next_duration(30), 45);
        assert_eq!(next_duration(300), 600);
        assert_eq!(next_duration(1800), 30);
        assert_eq!(next_duration(50), 60);
    }

    #[test]
    fn test_toggle_operator_keeps_one_and_canonical_order() {
        let mut ops = vec![Operator::Div];
        assert!(!toggle_operator(&mut ops, Operator::Div));
        assert_eq!(ops, vec![Operator::Div]);
        assert!(toggle_operator(&mut ops, Operator::Add));
        assert_eq!(ops, vec![Operator::Add, Operator::Div]);
        assert!(toggle_operator(&mut ops, Operator::Div));
        assert_eq!(ops, vec![Operator::Add]);
    }

    #[test]
    fn test_mouse_hover_picks_a_question() {
        let mut app = app(60);
        for _ in 0..3 {
            answer(&mut app);
        }
        app.end_early();

        let area = ui::chart_area(Rect::new(0, 0, 100, 40));
        let results = app.results.as_ref().unwrap();
        let chart = mathrush::chart::ChartProjector::new(
            &results.series,
            ui::charting::extents_for(area),
        );
        let target = chart.cumulative[1];
        let column = area.x + (target.x / ui::charting::DOTS_PER_COL) as u16;
        let row = area.y + (target.y / ui::charting::DOTS_PER_ROW) as u16;

        app.on_mouse(area, column, row);
        assert_eq!(app.results.as_ref().unwrap().hovered, Some(1));
        app.on_mouse(area, 0, 0);
        assert_eq!(app.results.as_ref().unwrap().hovered, None);
    }

    #[test]
    fn test_history_lists_finished_sessions() {
        let sink = SharedSink::default();
        let mut app = App::new(prefs(60), Some(7), Some(Box::new(sink.clone()))).unwrap();
        for round in 1..=3 {
            for _ in 0..round {
                answer(&mut app);
            }
            app.end_early();
            if round < 3 {
                app.on_key(key(KeyCode::Char('n')));
            }
        }
        assert_eq!(sink.0.borrow().len(), 3);

        assert_eq!(app.on_key(key(KeyCode::Char('h'))), KeyOutcome::Continue);
        assert_eq!(app.state, AppState::History);
        assert!(app.history.available);
        let totals: Vec<usize> = app
            .history
            .sessions
            .iter()
            .map(|s| s.total_problems)
            .collect();
        assert_eq!(totals, vec![3, 2, 1]);
        assert_eq!(app.history.totals.sessions, 3);
        assert_eq!(app.history.totals.problems, 6);
        assert_eq!(app.history.totals.best_qpm, 3.0);
        assert_eq!(app.history.totals.average_qpm, 2.0);
    }

    #[test]
    fn test_history_opens_a_past_session() {
        let sink = SharedSink::default();
        let mut app = App::new(prefs(60), Some(7), Some(Box::new(sink.clone()))).unwrap();
        answer(&mut app);
        app.end_early();
        app.on_key(key(KeyCode::Char('n')));
        answer(&mut app);
        answer(&mut app);
        app.end_early();

        app.on_key(key(KeyCode::Char('h')));
        app.on_key(key(KeyCode::Up));
        app.on_key(key(KeyCode::Down));
        app.on_key(key(KeyCode::Down));
        assert_eq!(app.history.selected, 1);
        app.on_key(key(KeyCode::Enter));

        assert_eq!(app.state, AppState::Results);
        let results = app.results.as_ref().unwrap();
        assert_eq!(results.summary.total_problems, 1);
        assert_eq!(results.series.len(), 1);
        // viewing history never records it again
        assert_eq!(sink.0.borrow().len(), 2);
    }

    #[test]
    fn test_history_without_a_store() {
        let mut app = app(60);
        app.end_early();
        app.on_key(key(KeyCode::Char('h')));
        assert_eq!(app.state, AppState::History);
        assert!(!app.history.available);
        assert!(app.history.sessions.is_empty());

        // nothing to open, back returns to the results
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::History);
        app.on_key(key(KeyCode::Char('b')));
        assert_eq!(app.state, AppState::Results);

        app.on_key(key(KeyCode::Char('h')));
        assert_eq!(app.on_key(key(KeyCode::Esc)), KeyOutcome::Quit);
    }
}
