//! Plain-text rendering and formatting helpers.
//!
//! The command-line subcommands print these; the TUI reuses the small formatters
//! (`format_due_relative`, `truncate`, `parse_due_input`).

use std::fmt::Write as _;

use chrono::{NaiveDate, TimeDelta};

use crate::store::TaskStore;
use crate::task::{project_name, Task};
use crate::views::{BoardColumns, CalendarMonth};

/// Parse due date input: "today", "tomorrow", "in Nd", "in Nw" or YYYY-MM-DD.
/// Offsets that run past the representable date range yield `None`.
pub fn parse_due_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return today.checked_add_signed(TimeDelta::try_days(1)?),
        _ => {}
    }
    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return today.checked_add_signed(TimeDelta::try_days(days)?);
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return today.checked_add_signed(TimeDelta::try_weeks(weeks)?);
            }
        }
    }
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Parse a `YYYY-MM` month into its first day.
pub fn parse_month_input(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d").ok()
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let delta = (d - today).num_days();
            if delta == 0 {
                "today".into()
            } else if delta == 1 {
                "tomorrow".into()
            } else if delta > 1 {
                format!("in {delta}d")
            } else {
                format!("{}d late", -delta)
            }
        }
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// "N task(s) in total" line shown above every view.
pub fn task_count_line(n: usize) -> String {
    format!("{n} task{} in total", if n == 1 { "" } else { "s" })
}

/// Message shown in place of an empty list or board.
pub fn empty_state_message(search_query: &str) -> String {
    if search_query.is_empty() {
        "No tasks yet. Create your first task to get started.".to_string()
    } else {
        format!(
            "We couldn't find any tasks matching \"{search_query}\". Try a different search term."
        )
    }
}

fn project_label(task: &Task) -> String {
    match task.project_id.as_deref() {
        Some(id) => project_name(id).map(str::to_string).unwrap_or_else(|| id.to_string()),
        None => "-".into(),
    }
}

/// Render the list view as a table.
pub fn render_list(store: &TaskStore, tasks: &[&Task], today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", task_count_line(tasks.len()));
    if tasks.is_empty() {
        let _ = writeln!(out, "{}", empty_state_message(store.search_query()));
        return out;
    }
    let _ = writeln!(
        out,
        "{:<16} {:<12} {:<7} {:<10} {:<18} {:<4} {}",
        "ID", "Status", "Pri", "Due", "Project", "Who", "Title [labels]"
    );
    for t in tasks {
        let labels = if t.labels.is_empty() {
            String::new()
        } else {
            format!(" [{}]", t.labels.join(","))
        };
        let who = t.assignee.as_ref().map(|a| a.avatar.as_str()).unwrap_or("-");
        let _ = writeln!(
            out,
            "{:<16} {:<12} {:<7} {:<10} {:<18} {:<4} {}{}",
            truncate(&t.id, 16),
            t.status.label(),
            t.priority.label(),
            format_due_relative(t.due_date, today),
            truncate(&project_label(t), 18),
            who,
            t.title,
            labels
        );
    }
    out
}

/// Render the board as one block per column.
pub fn render_board(store: &TaskStore, board: &BoardColumns<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", task_count_line(board.total()));
    if board.total() == 0 {
        let _ = writeln!(out, "{}", empty_state_message(store.search_query()));
        return out;
    }
    for (status, tasks) in board.iter() {
        let _ = writeln!(out, "== {} ({})", status.label(), tasks.len());
        if tasks.is_empty() {
            let _ = writeln!(out, "   (drop tasks here)");
        }
        for t in tasks {
            let _ = writeln!(out, "   #{} {} [{}]", t.id, t.title, t.priority.label());
        }
    }
    out
}

/// Render a calendar month as a 7-column grid followed by the per-day task lines.
pub fn render_calendar(cal: &CalendarMonth<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", cal.month.format("%B %Y"));
    let _ = writeln!(out, " Sun  Mon  Tue  Wed  Thu  Fri  Sat");
    for week in cal.weeks() {
        let mut line = String::new();
        for day in week {
            let mark = if day.is_today {
                '*'
            } else if !day.tasks.is_empty() {
                '+'
            } else {
                ' '
            };
            if day.in_month {
                let _ = write!(line, " {:>2}{} ", day.date.format("%-d"), mark);
            } else {
                line.push_str("   . ");
            }
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }
    for day in cal.days.iter().filter(|d| !d.tasks.is_empty()) {
        let _ = writeln!(out, "{}", day.date.format("%a %b %-d"));
        for t in &day.tasks {
            let _ = writeln!(out, "   #{} {}", t.id, t.title);
        }
        if day.overflow > 0 {
            let _ = writeln!(out, "   +{} more", day.overflow);
        }
    }
    out
}

/// Render every field of a task, as the detail drawer does.
pub fn render_detail(task: &Task, today: NaiveDate) -> String {
    let mut out = String::new();
    let stamp = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| t.format("%b %-d, %Y %-I:%M %p").to_string())
            .unwrap_or_else(|| "N/A".into())
    };
    let _ = writeln!(out, "ID:          {}", task.id);
    let _ = writeln!(out, "Title:       {}", task.title);
    let _ = writeln!(out, "Status:      {}", task.status.label());
    let _ = writeln!(out, "Priority:    {}", task.priority.label());
    let _ = writeln!(
        out,
        "Due:         {}",
        match task.due_date {
            Some(d) => format!(
                "{} ({})",
                d.format("%B %-d, %Y"),
                format_due_relative(Some(d), today)
            ),
            None => "-".into(),
        }
    );
    let _ = writeln!(
        out,
        "Assignee:    {}",
        task.assignee
            .as_ref()
            .map(|a| format!("{} ({})", a.name, a.avatar))
            .unwrap_or_else(|| "-".into())
    );
    let _ = writeln!(out, "Project:     {}", project_label(task));
    let _ = writeln!(
        out,
        "Labels:      {}",
        if task.labels.is_empty() { "-".into() } else { task.labels.join(", ") }
    );
    let _ = writeln!(out, "Created:     {}", stamp(task.created_at));
    let _ = writeln!(out, "Updated:     {}", stamp(task.updated_at));
    let _ = writeln!(out, "Description:\n{}", task.description.as_deref().unwrap_or("-"));
    out
}
