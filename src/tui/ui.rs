use chrono::Datelike;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::{App, Focus, SettingsForm, SettingsState, Speaker, WindowCol};
use crate::dates::{format_deadline_long, month_name, weekday_name};
use crate::store::{class_summary, plan_summary, task_summary, test_summary};

const ACCENT: Color = Color::Cyan;
const HEADER_BG: Color = Color::DarkGray;
const SELECTED_BG: Color = Color::Rgb(40, 40, 60);
/// Tint for generated study-plan rows, to set them apart from user items.
const PLAN: Color = Color::LightBlue;
const DIM: Color = Color::DarkGray;
const GOOD: Color = Color::Green;
const BAD: Color = Color::Red;

// ─── Main render ────────────────────────────────────────────────────────────

pub fn render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_clock(f, chunks[0]);
    render_day_strip(f, app, chunks[1]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);

    render_day_details(f, app, main[0]);
    render_chat(f, app, main[1]);
    render_status_bar(f, app, chunks[3]);

    if app.show_upcoming {
        render_upcoming(f, app, f.area());
    }
    if !app.settings.is_hidden() {
        render_settings(f, app, f.area());
    }
}

// ─── Header ─────────────────────────────────────────────────────────────────

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .title(" Study Planner ")
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let selected = app.week.selected();
    let mut spans = vec![
        Span::styled(
            format!(" {} {}", month_name(selected.month()), selected.year()),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   week of {}", app.week.anchor().format("%b %-d")),
            Style::default().fg(DIM),
        ),
        Span::styled("   years ", Style::default().fg(DIM)),
    ];
    for (i, year) in app.week.year_options().iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("·", Style::default().fg(DIM)));
        }
        let style = if *year == selected.year() {
            Style::default().fg(ACCENT)
        } else {
            Style::default().fg(DIM)
        };
        spans.push(Span::styled(year.to_string(), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Clock ──────────────────────────────────────────────────────────────────

fn render_clock(f: &mut Frame, header_area: Rect) {
    let time_str = format!(" {} ", chrono::Local::now().format("%a %b %d  %H:%M:%S"));
    let clock_width = time_str.len() as u16;
    let clock_area = Rect {
        x: header_area.right().saturating_sub(clock_width),
        y: header_area.y,
        width: clock_width.min(header_area.width),
        height: 1,
    };
    f.render_widget(
        Paragraph::new(time_str).style(Style::default().fg(ACCENT)),
        clock_area,
    );
}

// ─── Day strip ──────────────────────────────────────────────────────────────

fn render_day_strip(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7])
        .split(area);

    for (card, column) in app.week.day_cards().iter().zip(columns.iter()) {
        let (border_style, text_style) = if card.active {
            (
                Style::default().fg(ACCENT),
                Style::default()
                    .fg(Color::White)
                    .bg(SELECTED_BG)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            (Style::default().fg(DIM), Style::default().fg(Color::White))
        };

        let body = Paragraph::new(vec![
            Line::from(Span::styled(card.weekday, text_style)),
            Line::from(Span::styled(card.day_of_month.to_string(), text_style)),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border_style));

        f.render_widget(body, *column);
    }
}

// ─── Day details ────────────────────────────────────────────────────────────

fn render_day_details(f: &mut Frame, app: &App, area: Rect) {
    let selected = app.week.selected();

    if let Some(error) = app.store.last_error() {
        let body = Paragraph::new(vec![
            Line::from("Could not fetch schedule data. Please try again later."),
            Line::from(""),
            Line::from(Span::styled(error, Style::default().fg(DIM))),
        ])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Error Loading Schedule ")
                .title_style(Style::default().fg(BAD).add_modifier(Modifier::BOLD)),
        );
        f.render_widget(body, area);
        return;
    }

    let details = app.store.day_details(selected);
    let mut lines: Vec<Line> = Vec::new();

    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
    };

    if !details.plan.is_empty() {
        lines.push(heading("My Study Plan"));
        for entry in &details.plan {
            lines.push(Line::from(Span::styled(
                format!("  {}", plan_summary(entry)),
                Style::default().fg(PLAN),
            )));
        }
        lines.push(Line::from(""));
    }
    if !details.classes.is_empty() {
        lines.push(heading("Classes"));
        for entry in &details.classes {
            lines.push(Line::from(format!("  {}", class_summary(entry))));
        }
        lines.push(Line::from(""));
    }
    if !details.tasks.is_empty() {
        lines.push(heading("Tasks Due"));
        for entry in &details.tasks {
            lines.push(Line::from(format!("  {}", task_summary(entry))));
        }
        lines.push(Line::from(""));
    }
    if !details.tests.is_empty() {
        lines.push(heading("Tests/Quizzes"));
        for entry in &details.tests {
            lines.push(Line::from(format!("  {}", test_summary(entry))));
        }
    }
    if details.is_empty() {
        lines.push(Line::from(Span::styled(
            "No schedule for this day. Chat with me to add items!",
            Style::default().fg(DIM),
        )));
    }

    let title = format!(
        " Schedule for {}, {} ",
        weekday_name(selected),
        selected.format("%b %-d")
    );
    let body = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(Style::default().fg(ACCENT)),
    );
    f.render_widget(body, area);
}

// ─── Chat ───────────────────────────────────────────────────────────────────

fn render_chat(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let transcript_block = Block::default()
        .borders(Borders::ALL)
        .title(" Chat ")
        .title_style(Style::default().fg(ACCENT));
    let inner = transcript_block.inner(chunks[0]);

    let width = inner.width.max(1) as usize;
    let mut lines: Vec<Line> = Vec::new();
    for message in &app.chat {
        let (prefix, style) = match message.speaker {
            Speaker::You => ("You: ", Style::default().fg(ACCENT)),
            Speaker::Planner => ("Planner: ", Style::default().fg(GOOD)),
            Speaker::Error => ("", Style::default().fg(BAD)),
        };
        for (i, row) in wrap_text(&message.text, width.saturating_sub(prefix.len()).max(8))
            .into_iter()
            .enumerate()
        {
            if i == 0 {
                lines.push(Line::from(vec![
                    Span::styled(prefix, style.add_modifier(Modifier::BOLD)),
                    Span::styled(
                        row,
                        if message.speaker == Speaker::Error {
                            style
                        } else {
                            Style::default().fg(Color::White)
                        },
                    ),
                ]));
            } else {
                lines.push(Line::from(Span::raw(format!("  {row}"))));
            }
        }
    }

    // Stick to the bottom of the transcript.
    let height = inner.height as usize;
    if lines.len() > height {
        lines.drain(..lines.len() - height);
    }

    f.render_widget(transcript_block, chunks[0]);
    f.render_widget(Paragraph::new(lines), inner);

    let focused = app.focus == Focus::ChatInput;
    let input_style = if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(DIM)
    };
    let content = if focused {
        Line::from(vec![
            Span::raw(app.chat_input.clone()),
            Span::styled("█", Style::default().fg(ACCENT)),
        ])
    } else if app.chat_input.is_empty() {
        Line::from(Span::styled(
            "Press i to chat with the planner…",
            Style::default().fg(DIM),
        ))
    } else {
        Line::from(Span::raw(app.chat_input.clone()))
    };
    let input = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Message ")
            .border_style(input_style)
            .title_style(input_style),
    );
    f.render_widget(input, chunks[1]);
}

// ─── Status bar ─────────────────────────────────────────────────────────────

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
    let spinner = if app.loading {
        format!(" {} ", SPINNER[(app.frame_count / 2) as usize % SPINNER.len()])
    } else {
        " ".into()
    };

    let status = Paragraph::new(Line::from(vec![
        Span::styled(spinner, Style::default().fg(ACCENT)),
        Span::styled(&app.status_message, Style::default().fg(Color::White)),
        Span::styled(
            "  q:quit  h/l:day  n/p:week  m/M:month  y/Y:year  t:today  r:refresh  i:chat  s:settings  u:upcoming  ",
            Style::default().fg(DIM),
        ),
    ]))
    .style(Style::default().bg(HEADER_BG));

    f.render_widget(status, area);
}

// ─── Upcoming-tasks popup ───────────────────────────────────────────────────

fn render_upcoming(f: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect(60, 60, area);
    f.render_widget(Clear, popup);

    let pending = app.store.upcoming_tasks(chrono::Local::now().naive_local());
    let lines: Vec<Line> = if pending.is_empty() {
        vec![Line::from(Span::styled(
            "No pending tasks found.",
            Style::default().fg(DIM),
        ))]
    } else {
        pending
            .iter()
            .map(|t| {
                let due = t
                    .deadline
                    .as_deref()
                    .map(format_deadline_long)
                    .unwrap_or_default();
                Line::from(vec![
                    Span::styled(
                        t.name.clone(),
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!(" ({})", t.task_type), Style::default().fg(DIM)),
                    Span::styled(format!(" - Due: {due}"), Style::default().fg(ACCENT)),
                ])
            })
            .collect()
    };

    let body = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Pending Tasks ")
            .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
    );
    f.render_widget(body, popup);
}

// ─── Settings modal ─────────────────────────────────────────────────────────

fn render_settings(f: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect(70, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Personalization ")
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));

    let lines = match &app.settings {
        SettingsState::Loading => vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Loading your preferences…",
                Style::default().fg(DIM),
            )),
        ],
        SettingsState::Editing(form) => settings_lines(form, false),
        SettingsState::Saving(form) => settings_lines(form, true),
        SettingsState::Hidden => Vec::new(),
    };

    let body = Paragraph::new(lines).block(block);
    f.render_widget(body, popup);
}

fn settings_lines(form: &SettingsForm, saving: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let time_field = |label: &'static str, value: &str, selected: bool| {
        let marker = if selected { "> " } else { "  " };
        let style = if selected {
            Style::default().fg(Color::White).bg(SELECTED_BG)
        } else {
            Style::default().fg(Color::White)
        };
        Line::from(vec![
            Span::styled(marker, Style::default().fg(ACCENT)),
            Span::styled(format!("{label:<12}"), Style::default().fg(DIM)),
            Span::styled(value.to_string(), style),
        ])
    };

    lines.push(Line::from(""));
    lines.push(time_field("Awake time", &form.awake_time, form.cursor == 0));
    lines.push(time_field("Sleep time", &form.sleep_time, form.cursor == 1));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Study windows",
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    )));

    if form.windows.is_empty() {
        lines.push(Line::from(Span::styled(
            "    (none - press a to add one)",
            Style::default().fg(DIM),
        )));
    }

    for (i, window) in form.windows.iter().enumerate() {
        let row_selected = form.current_row() == Some(i);
        let marker = if row_selected { "> " } else { "  " };

        let cell = |text: String, col: WindowCol| {
            let style = if row_selected && form.col == col {
                Style::default().fg(Color::White).bg(SELECTED_BG)
            } else if row_selected {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(DIM)
            };
            Span::styled(text, style)
        };

        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(ACCENT)),
            cell(format!("{:<10}", window.day), WindowCol::Day),
            cell(format!("{:>6}", window.start_time), WindowCol::Start),
            Span::styled(" - ", Style::default().fg(DIM)),
            cell(format!("{:<6}", window.end_time), WindowCol::End),
            cell(format!("  {:<13}", window.focus_level.label()), WindowCol::Focus),
        ]));
    }

    lines.push(Line::from(""));
    if saving {
        lines.push(Line::from(Span::styled(
            "  Saving…",
            Style::default().fg(ACCENT),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "  j/k:field  Tab:column  h/l:adjust  a:add  d:delete  Enter:save  Esc:cancel",
            Style::default().fg(DIM),
        )));
    }

    lines
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Greedy word wrap on display width. Words wider than the line are split
/// hard so nothing is lost off-screen.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;

    for word in text.split_whitespace() {
        let word_width = word.width();

        if word_width > width {
            // Flush, then hard-split the oversized word.
            if !current.is_empty() {
                rows.push(std::mem::take(&mut current));
                current_width = 0;
            }
            let mut piece = String::new();
            let mut piece_width = 0usize;
            for ch in word.chars() {
                let w = ch.to_string().width();
                if piece_width + w > width && !piece.is_empty() {
                    rows.push(std::mem::take(&mut piece));
                    piece_width = 0;
                }
                piece.push(ch);
                piece_width += w;
            }
            current = piece;
            current_width = piece_width;
            continue;
        }

        let sep = usize::from(!current.is_empty());
        if current_width + sep + word_width > width {
            rows.push(std::mem::take(&mut current));
            current_width = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(word);
        current_width += word_width;
    }

    if !current.is_empty() || rows.is_empty() {
        rows.push(current);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_breaks_on_word_boundaries() {
        let rows = wrap_text("the quick brown fox jumps", 11);
        assert_eq!(rows, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn test_wrap_text_short_input_is_single_row() {
        assert_eq!(wrap_text("hello", 40), vec!["hello"]);
        assert_eq!(wrap_text("", 40), vec![""]);
    }

    #[test]
    fn test_wrap_text_hard_splits_oversized_words() {
        let rows = wrap_text("abcdefghij", 4);
        assert_eq!(rows, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_text_rows_fit_width() {
        let rows = wrap_text("one two three four five six seven eight", 10);
        assert!(rows.iter().all(|r| r.width() <= 10));
    }

    #[test]
    fn test_centered_rect_is_contained() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(60, 60, area);
        assert!(popup.width <= area.width);
        assert!(popup.height <= area.height);
        assert!(popup.x > area.x && popup.y > area.y);
        assert!(popup.right() < area.right() && popup.bottom() < area.bottom());
    }
}
