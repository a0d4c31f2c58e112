//! Per-item decision: notify, clear, or skip.
//!
//! Pure function of the item's own fields, the clock and the interval. No I/O.

use boardwatch_core::error::BoardWatchError;
use boardwatch_core::types::{Channel, Item, RoutingTag, parse_timestamp};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Send a reminder to the channel, then stamp the item.
    Notify(Channel),
    /// Item left the suspended state; drop its marker.
    Clear,
    Skip(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    NotSuspended,
    Unroutable { tag: RoutingTag },
    NotDue { next_due: DateTime<Utc> },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotSuspended => write!(f, "not suspended"),
            SkipReason::Unroutable { tag } => write!(f, "unroutable tag {tag}"),
            SkipReason::NotDue { next_due } => write!(f, "next reminder due {}", next_due.to_rfc3339()),
        }
    }
}

pub fn decide(item: &Item, now: DateTime<Utc>, interval: chrono::Duration) -> Decision {
    if !item.status.is_suspended() {
        return if item.has_last_notified() {
            Decision::Clear
        } else {
            Decision::Skip(SkipReason::NotSuspended)
        };
    }

    let Some(channel) = item.routing_tag.channel() else {
        return Decision::Skip(SkipReason::Unroutable { tag: item.routing_tag.clone() });
    };

    if !item.has_last_notified() {
        return Decision::Notify(channel);
    }

    let next_due = parse_timestamp(&item.last_notified).and_then(|last| {
        last.checked_add_signed(interval).ok_or_else(|| {
            BoardWatchError::MalformedState(format!("{} is out of range", item.last_notified))
        })
    });
    match next_due {
        Ok(next_due) if now < next_due => Decision::Skip(SkipReason::NotDue { next_due }),
        Ok(_) => Decision::Notify(channel),
        Err(e) => {
            tracing::warn!("item {}: {e}, treating as never notified", item.id);
            Decision::Notify(channel)
        }
    }
}
