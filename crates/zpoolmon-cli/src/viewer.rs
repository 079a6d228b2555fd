use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};
use tracing::{info, warn};
use zpoolmon_core::{FetchOutcome, Reconciler, RefreshConfig, RefreshScheduler, Severity, StatusFetcher, Trigger};

use crate::input::{handle_key, Action, KEY_HINTS};
use crate::panel::{line_height, PoolPanel};
use crate::theme::Theme;

/// Everything the dashboard shows, owned by the UI loop.
pub struct Dashboard {
    pub panels: Reconciler<PoolPanel>,
    pub theme: Theme,
    pub focus: usize,
    pub last_error: Option<String>,
    pub last_refresh: Option<DateTime<Local>>,
}

impl Dashboard {
    pub fn new(theme: Theme) -> Self {
        Self {
            panels: Reconciler::new(),
            theme,
            focus: 0,
            last_error: None,
            last_refresh: None,
        }
    }

    /// Fold a finished fetch into the panels. A failed fetch leaves the
    /// panels as they were and only raises the error line.
    pub fn apply(&mut self, outcome: FetchOutcome) {
        match outcome {
            Ok(snapshot) => {
                for (name, err) in snapshot.failures() {
                    warn!(pool = %name, error = %err, "pool status could not be parsed");
                }
                let report = self.panels.reconcile(&snapshot);
                if report.changed_layout() {
                    self.focus = self.focus.min(self.panels.len().saturating_sub(1));
                }
                self.last_error = None;
                self.last_refresh = Some(snapshot.taken_at.with_timezone(&Local));
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
            }
        }
    }

    pub fn focus_next(&mut self) {
        if self.focus + 1 < self.panels.len() {
            self.focus += 1;
        }
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    pub fn focused_mut(&mut self) -> Option<&mut PoolPanel> {
        let name = self.panels.names().get(self.focus)?.clone();
        self.panels.get_mut(&name)
    }
}

pub async fn run_dashboard<F>(fetcher: Arc<F>, pools: Vec<String>, config: &RefreshConfig) -> Result<()>
where
    F: StatusFetcher + 'static,
{
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut scheduler = RefreshScheduler::new(fetcher, pools, config);
    let mut dashboard = Dashboard::new(Theme::default());
    scheduler.start();

    let run_result = async {
        loop {
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match handle_key(key) {
                        Action::Quit => break,
                        Action::Refresh => {
                            scheduler.trigger(Trigger::Manual);
                        }
                        Action::IncreasePeriod => {
                            scheduler.increase_period();
                        }
                        Action::DecreasePeriod => {
                            scheduler.decrease_period();
                        }
                        Action::ToggleTheme => dashboard.theme = dashboard.theme.toggled(),
                        Action::FocusPrev => dashboard.focus_prev(),
                        Action::FocusNext => dashboard.focus_next(),
                        Action::ScrollUp => {
                            if let Some(panel) = dashboard.focused_mut() {
                                panel.scroll_up();
                            }
                        }
                        Action::ScrollDown => {
                            let theme = dashboard.theme.clone();
                            if let Some(panel) = dashboard.focused_mut() {
                                let height = line_height(panel.lines(&theme).len());
                                panel.scroll_down(height);
                            }
                        }
                        Action::None => {}
                    }
                }
            }

            if let Some(outcome) = scheduler.poll() {
                dashboard.apply(outcome);
            }

            let status = HeaderStatus {
                period_secs: scheduler.period().as_secs(),
                fetching: scheduler.is_fetching(),
            };
            terminal.draw(|frame| draw_ui(frame, &dashboard, status))?;
        }

        Ok::<(), anyhow::Error>(())
    }
    .await;

    info!("dashboard closing");
    scheduler.shutdown();
    dashboard.panels.dispose();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

#[derive(Debug, Clone, Copy)]
struct HeaderStatus {
    period_secs: u64,
    fetching: bool,
}

fn draw_ui(frame: &mut Frame<'_>, dashboard: &Dashboard, status: HeaderStatus) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
        .split(frame.size());

    frame.render_widget(render_header(dashboard, status), rows[0]);
    render_panels(frame, rows[1], dashboard);
    frame.render_widget(render_footer(&dashboard.theme), rows[2]);
}

fn render_header(dashboard: &Dashboard, status: HeaderStatus) -> Paragraph<'static> {
    let theme = &dashboard.theme;
    let clock = Local::now().format("%H:%M:%S").to_string();

    let mut lines = vec![Line::from(vec![
        Span::styled(" ZPool Monitor  ", theme.title),
        Span::styled(clock, theme.text),
        Span::styled(format!("   Refresh period: ({}s)", status.period_secs), theme.text_dim),
    ])];

    let detail = match (&dashboard.last_error, dashboard.last_refresh) {
        (Some(err), _) => Span::styled(format!(" ⚠️ refresh failed: {err}"), theme.crit),
        (None, _) if status.fetching && dashboard.panels.is_empty() => {
            Span::styled(" Fetching pool status...", theme.text_dim)
        }
        (None, Some(at)) => Span::styled(
            format!(" Last refresh {}  {} pool(s)", at.format("%H:%M:%S"), dashboard.panels.len()),
            theme.text_dim,
        ),
        (None, None) => Span::styled(" Waiting for first refresh...", theme.text_dim),
    };
    lines.push(Line::from(detail));

    Paragraph::new(lines).style(theme.header)
}

fn render_panels(frame: &mut Frame<'_>, area: Rect, dashboard: &Dashboard) {
    let theme = &dashboard.theme;

    if dashboard.panels.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled("  No pools to show.", theme.text_dim)))
            .block(Block::default().borders(Borders::ALL).border_style(theme.border));
        frame.render_widget(empty, area);
        return;
    }

    let contents: Vec<(&PoolPanel, Vec<Line<'static>>)> = dashboard
        .panels
        .iter()
        .map(|(_, panel)| (panel, panel.lines(theme)))
        .collect();

    let mut constraints: Vec<Constraint> = contents
        .iter()
        .map(|(_, lines)| Constraint::Length(line_height(lines.len()).saturating_add(2)))
        .collect();
    constraints.push(Constraint::Min(0));

    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (idx, (panel, lines)) in contents.into_iter().enumerate() {
        let border = if idx == dashboard.focus {
            theme.border_focused
        } else {
            theme.border
        };
        let title_style = match panel.severity() {
            Severity::Ok => theme.title,
            other => theme.severity(other),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled(panel.title(), title_style));
        let widget = Paragraph::new(lines).block(block).scroll((panel.scroll, 0));
        frame.render_widget(widget, areas[idx]);
    }
}

fn render_footer(theme: &Theme) -> Paragraph<'static> {
    let mut spans = vec![Span::styled(" ", theme.footer_bg)];
    for (key, desc) in KEY_HINTS {
        spans.push(Span::styled(format!(" {key} "), theme.footer_key));
        spans.push(Span::styled(format!("{desc}  "), theme.footer_text));
    }
    Paragraph::new(Line::from(spans)).style(theme.footer_bg)
}
