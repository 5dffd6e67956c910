//! Colored terminal rendering for calview types.

use calview_core::{Event, Mutation, MutationKind, Period};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for MutationKind {
    fn render(&self) -> String {
        let symbol = self.to_string();
        match self {
            MutationKind::Add => symbol.green().to_string(),
            MutationKind::Update => symbol.yellow().to_string(),
            MutationKind::Delete => symbol.red().to_string(),
        }
    }
}

impl Render for Mutation {
    fn render(&self) -> String {
        let event = self.item.event();
        let series = if self.item.is_recurring() { " (series)" } else { "" };
        format!(
            "{} {}{} {}",
            self.kind.render(),
            event.summary,
            series,
            event.start.format("%Y-%m-%d %H:%M").dimmed()
        )
    }
}

impl Render for Period {
    fn render(&self) -> String {
        format!("{} {}", "·".dimmed(), self)
    }
}

/// Events grouped under one bold header per day, in the order given.
pub fn render_days(events: &[Event]) -> String {
    let mut lines = Vec::new();
    let mut current_date = None;

    for event in events {
        let date = event.start.date_naive();
        if current_date != Some(date) {
            if current_date.is_some() {
                lines.push(String::new());
            }
            lines.push(date.format("%a %b %-d").bold().to_string());
            current_date = Some(date);
        }

        let time = format!("{:>7}", event.start.format("%H:%M"));
        let tag = if event.is_instance() {
            format!("[{}]", event.uid)
        } else {
            format!("[{}]", event.id)
        };
        lines.push(format!("  {} {} {}", time, event.summary, tag.dimmed()));
    }

    lines.join("\n")
}
