use std::io;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph,
    Row, Table,
};

use scout_dash::api_fetch::{Backend as DataBackend, HttpBackend};
use scout_dash::charts::{ChartSlot, ChartSpec};
use scout_dash::config::{self, DashConfig};
use scout_dash::demo_feed::{DEMO_PLAYERS, DemoBackend};
use scout_dash::orchestrator::Dashboard;
use scout_dash::prediction::PredictionField;
use scout_dash::provider::{ProviderOptions, spawn_provider};
use scout_dash::state::{LogLevel, ProviderCommand};
use scout_dash::terminal_view::{ChartReader, TerminalCharts, TerminalView, heatmap_rows};
use scout_dash::view::{MATCH_TABLE_HEADER, ViewTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Players,
    Search,
    Prediction,
}

struct App {
    dashboard: Dashboard<TerminalView, TerminalCharts>,
    charts: ChartReader,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    source_label: String,
    players: Vec<String>,
    selected: usize,
    focus: Focus,
    search: String,
    pred_field: usize,
    help_overlay: bool,
    should_quit: bool,
}

impl App {
    fn new(
        cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
        players: Vec<String>,
        source_label: String,
    ) -> Self {
        let chart_backend = TerminalCharts::new();
        let charts = chart_backend.reader();
        let mut dashboard = Dashboard::new(TerminalView::new(), chart_backend);
        for field in PredictionField::ALL {
            let value = dashboard.prediction_form().value(field).to_string();
            dashboard.on_prediction_input(field, &value);
        }
        dashboard.push_log(LogLevel::Info, format!("Data source: {source_label}"));
        Self {
            dashboard,
            charts,
            cmd_tx,
            source_label,
            players,
            selected: 0,
            focus: Focus::Players,
            search: String::new(),
            pred_field: 0,
            help_overlay: false,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.dashboard.surface().pending_alert().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.dashboard.surface_mut().dismiss_alert();
            }
            return;
        }
        match self.focus {
            Focus::Search => self.on_search_key(key),
            Focus::Players => self.on_players_key(key),
            Focus::Prediction => self.on_prediction_key(key),
        }
    }

    fn on_players_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => {
                if !self.players.is_empty() {
                    self.selected = (self.selected + 1) % self.players.len();
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if !self.players.is_empty() {
                    self.selected = (self.selected + self.players.len() - 1) % self.players.len();
                }
            }
            KeyCode::Enter => {
                if let Some(player) = self.players.get(self.selected).cloned() {
                    self.request_player(&player);
                }
            }
            KeyCode::Char('/') => {
                self.search.clear();
                self.focus = Focus::Search;
            }
            KeyCode::Tab => self.focus = Focus::Prediction,
            KeyCode::Char('?') => self.help_overlay = !self.help_overlay,
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.focus = Focus::Players,
            KeyCode::Enter => {
                let name = self.search.trim().to_string();
                self.focus = Focus::Players;
                if !name.is_empty() {
                    self.request_player(&name);
                }
            }
            KeyCode::Backspace => {
                self.search.pop();
            }
            KeyCode::Char(c) => self.search.push(c),
            _ => {}
        }
    }

    fn on_prediction_key(&mut self, key: KeyEvent) {
        let field = PredictionField::ALL[self.pred_field];
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab | KeyCode::Esc => self.focus = Focus::Players,
            KeyCode::Char('j') | KeyCode::Down => {
                self.pred_field = (self.pred_field + 1) % PredictionField::ALL.len();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.pred_field =
                    (self.pred_field + PredictionField::ALL.len() - 1) % PredictionField::ALL.len();
            }
            KeyCode::Char('h') | KeyCode::Left => self.dashboard.nudge_prediction(field, -1),
            KeyCode::Char('l') | KeyCode::Right => self.dashboard.nudge_prediction(field, 1),
            KeyCode::Char('H') => self.dashboard.nudge_prediction(field, -10),
            KeyCode::Char('L') => self.dashboard.nudge_prediction(field, 10),
            KeyCode::Enter => self.request_prediction(),
            KeyCode::Char('?') => self.help_overlay = !self.help_overlay,
            _ => {}
        }
    }

    fn request_player(&mut self, player: &str) {
        let ticket = self.dashboard.begin_load(player);
        let Some(tx) = &self.cmd_tx else {
            self.dashboard.push_log(LogLevel::Warn, "Player fetch unavailable");
            return;
        };
        if tx.send(ProviderCommand::LoadPlayer(ticket)).is_err() {
            self.dashboard.push_log(LogLevel::Warn, "Player request failed");
        }
    }

    fn request_prediction(&mut self) {
        let Some(ticket) = self.dashboard.begin_prediction() else {
            return;
        };
        let Some(tx) = &self.cmd_tx else {
            self.dashboard.push_log(LogLevel::Warn, "Prediction unavailable");
            return;
        };
        if tx.send(ProviderCommand::Predict(ticket)).is_err() {
            self.dashboard.push_log(LogLevel::Warn, "Prediction request failed");
        } else {
            self.dashboard.push_log(LogLevel::Info, "Prediction request sent");
        }
    }
}

fn main() -> io::Result<()> {
    config::load_dotenv();
    let cfg = DashConfig::from_env();

    let (backend, source_label): (Arc<dyn DataBackend>, String) = if cfg.demo {
        (Arc::new(DemoBackend::new()), "demo".to_string())
    } else {
        match HttpBackend::new(&cfg.api_base) {
            Ok(http) => (Arc::new(http), cfg.api_base.clone()),
            Err(err) => {
                eprintln!("invalid SCOUT_API_BASE ({err:#}), falling back to demo data");
                (Arc::new(DemoBackend::new()), "demo".to_string())
            }
        }
    };
    let players = if cfg.players.is_empty() {
        DEMO_PLAYERS.iter().map(|p| p.to_string()).collect()
    } else {
        cfg.players.clone()
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(term_backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let options = ProviderOptions {
        secondary_retries: cfg.secondary_retries,
        ..ProviderOptions::default()
    };
    spawn_provider(backend, tx, cmd_rx, options);

    let mut app = App::new(Some(cmd_tx), players, source_label);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<scout_dash::state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            app.dashboard.apply_delta(delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(34),
            Constraint::Percentage(45),
            Constraint::Min(32),
        ])
        .split(chunks[1]);

    render_sidebar(frame, columns[0], app);
    let view = app.dashboard.surface();
    if view.is_visible(ViewTarget::Dashboard) {
        render_player(frame, columns[1], app);
        render_field_and_matches(frame, columns[2], app);
    } else {
        let hint = Paragraph::new("Select a player and press Enter, or / to search")
            .block(Block::default().title("Player").borders(Borders::ALL));
        frame.render_widget(hint, columns[1]);
        let console = Paragraph::new(console_text(app, 20))
            .block(Block::default().title("Console").borders(Borders::ALL));
        frame.render_widget(console, columns[2]);
    }

    let footer = Paragraph::new(footer_text(app))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if let Some(message) = view.pending_alert() {
        render_alert(frame, frame.size(), message);
    } else if app.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let view = app.dashboard.surface();
    let status = if view.is_visible(ViewTarget::LoadingIndicator) {
        "LOADING...".to_string()
    } else {
        match app.dashboard.current_player() {
            Some(player) => player.to_string(),
            None => "No player".to_string(),
        }
    };
    let line1 = format!("  .-.  SCOUT DASH | {status}");
    let line2 = format!(" /___\\  source: {}", app.source_label);
    format!("{line1}\n{line2}")
}

fn footer_text(app: &App) -> String {
    match app.focus {
        Focus::Players => {
            "j/k/↑/↓ Move | Enter Load | / Search | Tab Prediction | ? Help | q Quit".to_string()
        }
        Focus::Search => format!("Search: {}_   (Enter load, Esc cancel)", app.search),
        Focus::Prediction => {
            "j/k Field | h/l Nudge | H/L Nudge x10 | Enter Predict | Tab Players | q Quit"
                .to_string()
        }
    }
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(15)])
        .split(area);

    let players_focus = matches!(app.focus, Focus::Players | Focus::Search);
    let lines: Vec<Line> = app
        .players
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let style = if idx == app.selected && players_focus {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else if idx == app.selected {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::styled(format!(" {name}"), style)
        })
        .collect();
    let list = Paragraph::new(lines).block(panel("Players", players_focus));
    frame.render_widget(list, rows[0]);

    let view = app.dashboard.surface();
    let form_focus = app.focus == Focus::Prediction;
    let mut lines: Vec<Line> = PredictionField::ALL
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let text = format!(
                " {:<19}{:>6}",
                field.label(),
                view.text(ViewTarget::PredictionReadout(*field))
            );
            if form_focus && idx == app.pred_field {
                Line::styled(text, Style::default().fg(Color::Black).bg(Color::Cyan))
            } else {
                Line::raw(text)
            }
        })
        .collect();
    lines.push(Line::raw(""));
    let result_style = if view.is_emphasized(ViewTarget::PredictionResult, Instant::now()) {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let pending = if app.dashboard.prediction_pending() {
        " (pending)"
    } else {
        ""
    };
    lines.push(Line::styled(
        format!(
            " Predicted rating: {}{pending}",
            view.text(ViewTarget::PredictionResult)
        ),
        result_style,
    ));
    let form = Paragraph::new(lines).block(panel("Prediction", form_focus));
    frame.render_widget(form, rows[1]);
}

fn render_player(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Min(8),
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let profile = Paragraph::new(profile_text(app)).block(panel("Profile", false));
    frame.render_widget(profile, top[0]);
    let details = Paragraph::new(details_text(app)).block(panel("Season", false));
    frame.render_widget(details, top[1]);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    match app.charts.spec(ChartSlot::Radar) {
        Some(spec) => frame.render_widget(radar_chart(&spec), charts[0]),
        None => frame.render_widget(empty_panel("Profile radar"), charts[0]),
    }
    match app.charts.spec(ChartSlot::Importance) {
        Some(spec) => frame.render_widget(importance_chart(&spec), charts[1]),
        None => frame.render_widget(empty_panel("Feature importance"), charts[1]),
    }

    match app.charts.spec(ChartSlot::Trend) {
        Some(spec) => render_trend(frame, rows[2], &spec),
        None => frame.render_widget(empty_panel("Performance trend"), rows[2]),
    }
}

fn profile_text(app: &App) -> String {
    let view = app.dashboard.surface();
    let photo = match view.photo() {
        Some((src, _)) if !src.is_empty() => src.to_string(),
        _ => "no photo".to_string(),
    };
    [
        view.text(ViewTarget::PlayerFullName).to_string(),
        format!(
            "{} | {}",
            view.text(ViewTarget::PlayerPosition),
            view.text(ViewTarget::PlayerNationality)
        ),
        format!(
            "Born {} ({})",
            view.text(ViewTarget::PlayerBirthdate),
            view.text(ViewTarget::PlayerAge)
        ),
        format!(
            "{} / {} | foot {}",
            view.text(ViewTarget::PlayerHeight),
            view.text(ViewTarget::PlayerWeight),
            view.text(ViewTarget::PlayerFoot)
        ),
        format!("Rating {}", view.text(ViewTarget::PlayerRating)),
        format!("Photo: {photo}"),
    ]
    .join("\n")
}

fn details_text(app: &App) -> String {
    let view = app.dashboard.surface();
    let pair = |label: &str, target: ViewTarget| format!("{label:<10}{:>8}", view.text(target));
    [
        format!(
            "{}  {}  {}",
            pair("Matches", ViewTarget::StatMatches),
            pair("Goals", ViewTarget::StatGoals),
            pair("Assists", ViewTarget::StatAssists),
        ),
        format!(
            "{}  {}",
            pair("Perf", ViewTarget::StatPerformance),
            pair("Role", ViewTarget::StatPosition),
        ),
        format!(
            "{}  {}",
            pair("Shots/m", ViewTarget::DetailShots),
            pair("Shot acc", ViewTarget::DetailShotAccuracy),
        ),
        format!(
            "{}  {}",
            pair("Passes", ViewTarget::DetailPasses),
            pair("Pass acc", ViewTarget::DetailPassAcc),
        ),
        format!(
            "{}  {}",
            pair("Passes/m", ViewTarget::DetailAvgPasses),
            pair("Dribbles", ViewTarget::DetailDribbles),
        ),
        format!(
            "{}  {}",
            pair("Tackles", ViewTarget::DetailTackles),
            pair("Intercept", ViewTarget::DetailInterceptions),
        ),
    ]
    .join("\n")
}

fn radar_chart(spec: &ChartSpec) -> BarChart<'static> {
    let bars: Vec<Bar> = spec
        .labels
        .iter()
        .zip(&spec.values)
        .map(|(label, value)| {
            Bar::default()
                .value(value.max(0.0).round() as u64)
                .label(Line::from(short_label(label)))
                .style(Style::default().fg(Color::Cyan))
        })
        .collect();
    BarChart::default()
        .block(Block::default().title("Profile radar").borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .bar_width(4)
        .bar_gap(1)
        .max(spec.value_axis.max.unwrap_or(100.0) as u64)
}

fn importance_chart(spec: &ChartSpec) -> BarChart<'static> {
    let bars: Vec<Bar> = spec
        .labels
        .iter()
        .zip(&spec.values)
        .map(|(label, value)| {
            Bar::default()
                .value((value.max(0.0) * 1000.0).round() as u64)
                .text_value(format!("{value:.3}"))
                .label(Line::from(label.clone()))
                .style(Style::default().fg(Color::Green))
        })
        .collect();
    let title = spec.value_axis.title.unwrap_or(spec.series_label);
    BarChart::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
}

fn render_trend(frame: &mut Frame, area: Rect, spec: &ChartSpec) {
    let points: Vec<(f64, f64)> = spec
        .values
        .iter()
        .enumerate()
        .map(|(idx, rating)| (idx as f64, *rating))
        .collect();
    let x_max = (points.len().max(2) - 1) as f64;
    let y_min = spec.value_axis.min.unwrap_or(0.0);
    let y_max = spec.value_axis.max.unwrap_or(100.0);
    let first = spec.labels.first().cloned().unwrap_or_default();
    let last = spec.labels.last().cloned().unwrap_or_default();

    let dataset = Dataset::default()
        .name(spec.series_label)
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Magenta))
        .data(&points);
    let x_title = spec
        .category_axis
        .as_ref()
        .and_then(|a| a.title)
        .unwrap_or("");
    let chart = Chart::new(vec![dataset])
        .block(Block::default().title("Performance trend").borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .title(x_title)
                .bounds([0.0, x_max])
                .labels(vec![Span::raw(first), Span::raw(last)]),
        )
        .y_axis(
            Axis::default()
                .title(spec.value_axis.title.unwrap_or(""))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{y_min:.0}")),
                    Span::raw(format!("{y_max:.0}")),
                ]),
        );
    frame.render_widget(chart, area);
}

fn render_field_and_matches(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(22),
            Constraint::Min(6),
            Constraint::Length(6),
        ])
        .split(area);

    let view = app.dashboard.surface();
    match view.heatmap() {
        Some(plot) => {
            let lines: Vec<Line> = heatmap_rows(plot)
                .into_iter()
                .map(|row| Line::styled(row, Style::default().fg(Color::LightGreen)))
                .collect();
            let title = format!("Heatmap ({} touches)", plot.grid.total());
            let widget = Paragraph::new(lines).block(panel(&title, false));
            frame.render_widget(widget, rows[0]);
        }
        None => frame.render_widget(empty_panel("Heatmap"), rows[0]),
    }

    let table_rows: Vec<Row> = view
        .match_rows()
        .iter()
        .map(|cells| Row::new(cells.clone()))
        .collect();
    let widths = [Constraint::Length(7); MATCH_TABLE_HEADER.len()];
    let table = Table::new(table_rows, widths)
        .header(
            Row::new(MATCH_TABLE_HEADER.to_vec())
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(panel("Recent matches", false));
    frame.render_widget(table, rows[1]);

    let console = Paragraph::new(console_text(app, 4)).block(panel("Console", false));
    frame.render_widget(console, rows[2]);
}

fn console_text(app: &App, count: usize) -> String {
    let log = app.dashboard.log();
    if log.is_empty() {
        return "No log entries yet".to_string();
    }
    let mut lines: Vec<&str> = log.entries().rev().take(count).collect();
    lines.reverse();
    lines.join("\n")
}

fn short_label(label: &str) -> String {
    label.chars().take(4).collect()
}

fn panel(title: &str, focused: bool) -> Block<'static> {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL);
    if focused {
        block.border_style(Style::default().fg(Color::Cyan))
    } else {
        block
    }
}

fn empty_panel(title: &str) -> Paragraph<'static> {
    Paragraph::new("No data").block(panel(title, false))
}

fn render_alert(frame: &mut Frame, area: Rect, message: &str) {
    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);
    let alert = Paragraph::new(format!("{message}\n\n[Enter] OK"))
        .block(Block::default().title("Alert").borders(Borders::ALL))
        .style(Style::default().fg(Color::Red));
    frame.render_widget(alert, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Scout Dash - Help",
        "",
        "Players:",
        "  j/k or ↑/↓   Move selection",
        "  Enter        Load player",
        "  /            Search by name",
        "  Tab          Prediction form",
        "",
        "Prediction:",
        "  j/k or ↑/↓   Pick field",
        "  h/l or ←/→   Nudge value (H/L x10)",
        "  Enter        Predict rating",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
