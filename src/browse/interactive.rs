//! Interactive TUI for reviewing, reshuffling and exporting a setlist

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use rand::Rng;
use ratatui::{
    Frame, Terminal,
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};
use reqwest::Client;
use std::io;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::render::{self, ExportOptions, total_label, track_label};
use crate::setlist::{Session, Setlist, TargetDuration};
use crate::utils::TuiModeGuard;

/// How long a status message stays on screen
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Target change per +/- key press, in hours
const TARGET_STEP_HOURS: f64 = 0.25;

/// View state that survives between frames
struct ViewState {
    table_state: TableState,
    status_message: String,
    /// When the status message was set (for auto-clear timeout)
    status_message_time: Option<Instant>,
    show_help: bool,
    /// Number of times the setlist was regenerated
    generation: usize,
}

impl ViewState {
    fn new() -> Self {
        let mut table_state = TableState::default();
        table_state.select(Some(0));

        Self {
            table_state,
            status_message: String::new(),
            status_message_time: None,
            show_help: false,
            generation: 1,
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.status_message_time = Some(Instant::now());
    }

    fn check_status_timeout(&mut self) {
        if let Some(set_at) = self.status_message_time
            && set_at.elapsed() >= STATUS_TIMEOUT
        {
            self.status_message.clear();
            self.status_message_time = None;
        }
    }

    fn move_up(&mut self) {
        let selected = self.table_state.selected().unwrap_or(0);
        self.table_state.select(Some(selected.saturating_sub(1)));
    }

    fn move_down(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let selected = self.table_state.selected().unwrap_or(0);
        self.table_state.select(Some((selected + 1).min(len - 1)));
    }

    fn reset_selection(&mut self) {
        self.table_state.select(Some(0));
    }
}

/// Run the setlist view until the user quits
///
/// `r` reshuffles the session, `+`/`-` move the target and refit, `e`
/// exports the current setlist with `export_options`.
pub async fn run_setlist_view<R: Rng + ?Sized>(
    session: &mut Session,
    rng: &mut R,
    http_client: &Client,
    export_options: &ExportOptions,
) -> Result<()> {
    // Suppress stderr logging while the view owns the terminal
    let _tui_mode = TuiModeGuard::enter();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = ViewState::new();
    let result = run_view_loop(
        &mut terminal,
        &mut state,
        session,
        rng,
        http_client,
        export_options,
    )
    .await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

async fn run_view_loop<R: Rng + ?Sized>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut ViewState,
    session: &mut Session,
    rng: &mut R,
    http_client: &Client,
    export_options: &ExportOptions,
) -> Result<()> {
    loop {
        state.check_status_timeout();

        terminal.draw(|f| draw_ui(f, state, session))?;

        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            // Any key closes help
            if state.show_help {
                state.show_help = false;
                continue;
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Up | KeyCode::Char('k') => state.move_up(),
                KeyCode::Down | KeyCode::Char('j') => state.move_down(session.setlist().len()),
                KeyCode::Char('r') => {
                    let setlist = session.reshuffle(rng);
                    let message = format!(
                        "Reshuffled: {} tracks, {}",
                        setlist.len(),
                        total_label(setlist.total_duration_secs)
                    );
                    state.generation += 1;
                    state.reset_selection();
                    state.set_status(message);
                    debug!("Setlist regenerated (#{})", state.generation);
                }
                KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Char('-') => {
                    let step = if key.code == KeyCode::Char('-') {
                        -TARGET_STEP_HOURS
                    } else {
                        TARGET_STEP_HOURS
                    };
                    match TargetDuration::from_hours(session.target().hours() + step) {
                        Ok(target) => {
                            session.set_target(target);
                            let setlist = session.generate(rng);
                            let message = format!(
                                "Target {}: {} tracks, {}",
                                target,
                                setlist.len(),
                                total_label(setlist.total_duration_secs)
                            );
                            state.generation += 1;
                            state.reset_selection();
                            state.set_status(message);
                        }
                        Err(_) => state.set_status("Target cannot go below zero"),
                    }
                }
                KeyCode::Char('e') => {
                    state.set_status(format!("Exporting {}...", export_options.format));
                    terminal.draw(|f| draw_ui(f, state, session))?;

                    match render::export(http_client, session.setlist(), export_options).await {
                        Ok(path) => state.set_status(format!("Saved {}", path.display())),
                        Err(e) => state.set_status(format!("Export failed: {:#}", e)),
                    }
                }
                KeyCode::Char('?') => state.show_help = true,
                _ => {}
            }
        }
    }
}

fn setlist_rows(setlist: &Setlist) -> Vec<Row<'_>> {
    setlist
        .tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let image_marker = if track.image_url.is_some() { "*" } else { " " };
            Row::new(vec![
                Cell::from(format!("{:>3}", i + 1)),
                Cell::from(image_marker),
                Cell::from(track.name.as_str()),
                Cell::from(track_label(track.duration_secs)),
            ])
        })
        .collect()
}

fn draw_ui(f: &mut Frame, state: &mut ViewState, session: &Session) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Table
            Constraint::Length(3), // Footer/help
        ])
        .split(f.area());

    let setlist = session.setlist();

    // Header
    let header_text = format!(
        "Setlist #{}  -  {} of {} tracks  -  Total Setlist Time: {} (target {})",
        state.generation,
        setlist.len(),
        session.tracks().len(),
        total_label(setlist.total_duration_secs),
        session.target()
    );
    let header = Paragraph::new(header_text)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, chunks[0]);

    // Table
    if setlist.is_empty() {
        let empty = Paragraph::new("No track fits the target. Press r to reshuffle.")
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, chunks[1]);
    } else {
        let table = Table::new(
            setlist_rows(setlist),
            [
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(20),
                Constraint::Length(8),
            ],
        )
        .header(
            Row::new(vec!["#", "", "Song", "Duration"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL))
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
        f.render_stateful_widget(table, chunks[1], &mut state.table_state);
    }

    // Footer
    let footer = Paragraph::new("r: reshuffle  +/-: target  e: export  j/k: scroll  ?: help  q: quit")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(footer, chunks[2]);

    if state.show_help {
        draw_help(f);
    } else if !state.status_message.is_empty() {
        let status = Paragraph::new(state.status_message.clone())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL));
        let area = centered_rect(50, 3, f.area());
        f.render_widget(Clear, area);
        f.render_widget(status, area);
    }
}

fn draw_help(f: &mut Frame) {
    let lines = vec![
        Line::styled("Keys", Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  r         Shuffle again and refit"),
        Line::from("  + / -     Raise or lower the target by 15 minutes"),
        Line::from("  e         Export the current setlist"),
        Line::from("  j / Down  Next track"),
        Line::from("  k / Up    Previous track"),
        Line::from("  q / Esc   Quit"),
        Line::from(""),
        Line::styled("Press any key to close", Style::default().fg(Color::DarkGray)),
    ];
    let help = Paragraph::new(lines)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    let area = centered_rect(50, 12, f.area());
    f.render_widget(Clear, area);
    f.render_widget(help, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setlist::Track;

    #[test]
    fn test_selection_clamped() {
        let mut state = ViewState::new();
        state.move_up();
        assert_eq!(state.table_state.selected(), Some(0));

        state.move_down(2);
        state.move_down(2);
        state.move_down(2);
        assert_eq!(state.table_state.selected(), Some(1));

        state.reset_selection();
        assert_eq!(state.table_state.selected(), Some(0));
    }

    #[test]
    fn test_move_down_on_empty_setlist() {
        let mut state = ViewState::new();
        state.move_down(0);
        assert_eq!(state.table_state.selected(), Some(0));
    }

    #[test]
    fn test_status_kept_until_timeout() {
        let mut state = ViewState::new();
        state.set_status("Saved");
        state.check_status_timeout();
        assert_eq!(state.status_message, "Saved");

        state.status_message_time = Some(Instant::now() - STATUS_TIMEOUT);
        state.check_status_timeout();
        assert!(state.status_message.is_empty());
    }

    #[test]
    fn test_rows_match_setlist() {
        let setlist = Setlist {
            tracks: vec![
                Track::new("One", 61, None),
                Track::new("Two", 5, Some("https://img".to_string())),
            ],
            total_duration_secs: 66,
        };
        assert_eq!(setlist_rows(&setlist).len(), 2);
    }
}
