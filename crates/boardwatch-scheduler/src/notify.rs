//! Reminder payload formatting (Slack mrkdwn).

use boardwatch_core::types::Item;

/// Permalink that resolves for any account with access to the board.
pub fn item_link(board_id: u64, item_id: &str) -> String {
    format!("https://view.monday.com/boards/{board_id}/pulses/{item_id}")
}

/// A reminder for one item. Built from the item alone plus static settings.
pub struct Notification<'a> {
    item: &'a Item,
    board_id: u64,
    interval_hours: f64,
}

impl<'a> Notification<'a> {
    pub fn new(item: &'a Item, board_id: u64, interval_hours: f64) -> Self {
        Self { item, board_id, interval_hours }
    }

    pub fn render(&self) -> String {
        let name = if self.item.name.trim().is_empty() {
            format!("Item {}", self.item.id)
        } else {
            self.item.name.trim().to_string()
        };
        format!(
            "⚠️ *Suspended Item*: *{name}*\n\
             📋 Status: {status} · Tag: {tag}\n\
             🔗 {link}\n\
             ⏱️ Reminders every {every} until status changes to *Active*.",
            status = self.item.status,
            tag = self.item.routing_tag,
            link = item_link(self.board_id, &self.item.id),
            every = format_hours(self.interval_hours),
        )
    }
}

fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{}h", hours as u64)
    } else {
        format!("{}h", (hours * 100.0).round() / 100.0)
    }
}
