use log::error;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::bracket::{BracketView, snake_color};
use crate::state::app_state::{DraftField, InputMode};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::state::sync::SyncPhase;
use crate::ui::bracket_layout::compute_layout_with;
use crate::ui::layout::LayoutAreas;

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Bracket => draw_bracket(f, layout.main, app),
            MenuItem::Players => draw_players(f, layout.main, app),
            MenuItem::Controls => draw_controls(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if app.state.show_logs {
            draw_logs(f, layout.logs);
        }
        draw_status(f, layout.status, app);

        if app.state.input_mode == InputMode::NewPlayer {
            draw_player_form(f, layout.main, app);
        }

        draw_loading_spinner(f, layout.status, loading);
    });

    if let Err(e) = result {
        error!("failed to draw frame: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = MenuItem::ALL
        .iter()
        .position(|item| *item == app.state.active_tab)
        .unwrap_or_default();

    let titles: Vec<Line> = MenuItem::ALL.iter().map(|t| Line::from(t.title())).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let label = if app.state.admin.unlocked { "admin  Help: ? " } else { "Help: ? " };
    let help = Paragraph::new(label)
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_bracket(f: &mut Frame, area: Rect, app: &mut App) {
    let title = match app.sync.tournament() {
        Some(t) => format!(" Tournament {} ", t.id),
        None => " Bracket ".to_string(),
    };
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(tournament) = app.sync.tournament() else {
        let msg = match app.sync.last_error() {
            Some(err) => format!("Tournament load failed:\n{err}"),
            None => "No tournament loaded.\nPress i to enter a tournament id.".to_string(),
        };
        draw_message(f, inner, &msg);
        return;
    };

    let plan = compute_layout_with(tournament, &app.settings.layout, app.settings.spacing.strategy());
    if plan.is_empty() {
        draw_message(f, inner, "This tournament has no rounds yet.");
        return;
    }

    let extent = app.settings.scale.extent(&plan);
    app.state.bracket_view.clamp(extent, (inner.width, inner.height));

    f.render_widget(
        BracketView {
            tournament,
            plan: &plan,
            scale: app.settings.scale,
            scroll_x: app.state.bracket_view.scroll_x,
            scroll_y: app.state.bracket_view.scroll_y,
        },
        inner,
    );
}

fn draw_players(f: &mut Frame, area: Rect, app: &App) {
    let players = app.sync.players();
    let block = default_border(Color::White).title(format!(" Players ({}) ", players.len()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if players.is_empty() {
        draw_message(f, inner, "No players registered.");
        return;
    }

    // Keep the highlighted row on screen.
    let visible = inner.height as usize;
    let first = app.state.selected_player.saturating_sub(visible.saturating_sub(1));

    let lines: Vec<Line> = players
        .iter()
        .enumerate()
        .skip(first)
        .take(visible)
        .map(|(i, p)| {
            let mut name_style = Style::default().fg(snake_color(p.id)).add_modifier(Modifier::BOLD);
            if i == app.state.selected_player {
                name_style = name_style.add_modifier(Modifier::REVERSED);
            }
            Line::from(vec![
                Span::styled(format!("{:>5} ", p.id), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{:<20}", p.name), name_style),
                Span::raw(format!(" {:<20}", p.snake_name)),
                Span::styled(
                    format!(" {}", p.snake_url.as_deref().unwrap_or("-")),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_player_form(f: &mut Frame, main: Rect, app: &App) {
    let [_, row, _] = Layout::vertical([Constraint::Fill(1), Constraint::Length(5), Constraint::Fill(1)]).areas(main);
    let [_, area, _] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(60), Constraint::Fill(1)]).areas(row);

    let block = default_border(Color::Yellow).title(" New player (Tab: next field, Enter: save, Esc: cancel) ");
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let form = &app.state.player_form;
    let lines: Vec<Line> = DraftField::ALL
        .iter()
        .map(|field| {
            let focused = *field == form.field;
            let cursor = if focused { "_" } else { "" };
            let label_style = if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(vec![
                Span::styled(format!("{:>11}: ", field.label()), label_style),
                Span::raw(format!("{}{cursor}", form.value(*field))),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_controls(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Controls ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let sync = &app.sync;
    let dim = Style::default().fg(Color::DarkGray);
    let field = |label: &str, value: String| {
        Line::from(vec![Span::styled(format!("{label:>14}: "), dim), Span::raw(value)])
    };

    let mut lines = vec![
        field(
            "Tournament",
            sync.selected_id().map(ToString::to_string).unwrap_or_else(|| "-".into()),
        ),
        field("Sync", sync.phase().label().to_string()),
        field(
            "Active round",
            sync.active_round().map(|r| (r + 1).to_string()).unwrap_or_else(|| "none".into()),
        ),
        field(
            "Polling",
            if sync.is_polling() {
                format!("every {}s", app.settings.poll_interval.as_secs())
            } else {
                "off".into()
            },
        ),
        field("Players", sync.players().len().to_string()),
        field("Layout", app.settings.spacing.label().to_string()),
        Line::default(),
    ];

    if app.state.admin.unlocked {
        lines.push(field("Match mode", app.state.admin.match_mode.label().to_string()));
        lines.push(Line::default());
        lines.push(Line::from("  n  create tournament from all players (then generate matches)"));
        lines.push(Line::from("  g  generate matches for the loaded tournament"));
        lines.push(Line::from("  s  start games"));
        lines.push(Line::from("  a  advance round"));
        lines.push(Line::from("  m  toggle 1v1 / free-for-all"));
        lines.push(Line::from("  +  add player"));
    } else {
        lines.push(Line::styled("  Tournament controls are locked.", dim));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let text = "\
q / Ctrl-c   quit
1 2 3 ?      Bracket, Players, Controls, Help
i or /       load a tournament by id
p            start / stop polling the loaded tournament
h j k l      scroll the bracket (arrows work too), Home resets
r            reload players (Players tab)
f            full screen
\"            toggle the log pane
Esc          dismiss messages, close prompts";
    f.render_widget(Paragraph::new(text).style(Style::default().fg(Color::Gray)), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Log "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(logs, area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    if app.state.input_mode == InputMode::TournamentId {
        let prompt = Line::from(vec![
            Span::styled(" Tournament id: ", Style::default().fg(Color::Yellow)),
            Span::raw(format!("{}_", app.state.id_input)),
        ]);
        f.render_widget(Paragraph::new(prompt), area);
        return;
    }

    let sync = &app.sync;
    let phase_style = match sync.phase() {
        SyncPhase::Polling => Style::default().fg(Color::Green),
        SyncPhase::Error => Style::default().fg(Color::Red),
        SyncPhase::Static | SyncPhase::Idle => Style::default().fg(Color::Gray),
    };
    let mut spans = vec![Span::styled(format!(" {} ", sync.phase().label()), phase_style)];
    if let Some(refreshed) = sync.last_refresh() {
        spans.push(Span::styled(
            format!("updated {} ", refreshed.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(err) = sync.last_error() {
        spans.push(Span::styled(err.to_string(), Style::default().fg(Color::Red)));
    } else if let Some(notice) = sync.notice() {
        spans.push(Span::styled(notice.to_string(), Style::default().fg(Color::Green)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_message(f: &mut Frame, area: Rect, msg: &str) {
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_loading_spinner(f: &mut Frame, status: Rect, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = Rect::new(status.right().saturating_sub(2), status.y, 1, 1);
    f.render_widget(spinner, area);
}
