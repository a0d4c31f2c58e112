//! Board items and the column values the engine cares about.

use serde::{Deserialize, Serialize};

/// Value of the status column, normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Suspended,
    Active,
    Other(String),
}

impl Status {
    /// Parse the raw column text. Matching is case-insensitive and ignores
    /// surrounding whitespace.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed.to_lowercase().as_str() {
            "suspended" => Status::Suspended,
            "active" => Status::Active,
            _ => Status::Other(trimmed.to_string()),
        }
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self, Status::Suspended)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Suspended => write!(f, "Suspended"),
            Status::Active => write!(f, "Active"),
            Status::Other(s) if s.is_empty() => write!(f, "(none)"),
            Status::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Value of the routing tag column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutingTag {
    Ucr,
    Dl,
    Unset,
    Other(String),
}

impl RoutingTag {
    pub fn parse(text: &str) -> Self {
        let tag = text.trim().to_uppercase();
        match tag.as_str() {
            "" => RoutingTag::Unset,
            "UCR" => RoutingTag::Ucr,
            "DL" => RoutingTag::Dl,
            _ => RoutingTag::Other(tag),
        }
    }

    /// The channel this tag routes to, if any.
    pub fn channel(&self) -> Option<Channel> {
        match self {
            RoutingTag::Ucr => Some(Channel::Ucr),
            RoutingTag::Dl => Some(Channel::Dl),
            RoutingTag::Unset | RoutingTag::Other(_) => None,
        }
    }
}

impl std::fmt::Display for RoutingTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingTag::Ucr => write!(f, "UCR"),
            RoutingTag::Dl => write!(f, "DL"),
            RoutingTag::Unset => write!(f, "(unset)"),
            RoutingTag::Other(s) => write!(f, "{s}"),
        }
    }
}

/// One of the two notification destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    Ucr,
    Dl,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Ucr => write!(f, "UCR"),
            Channel::Dl => write!(f, "DL"),
        }
    }
}

/// One row of the monitored board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub status: Status,
    pub routing_tag: RoutingTag,
    /// Raw text of the last-notified column. Empty when never notified since
    /// the item was last active.
    #[serde(default)]
    pub last_notified: String,
}

impl Item {
    /// Build an item from raw column texts as read from the board.
    pub fn from_columns(
        id: impl Into<String>,
        name: impl Into<String>,
        status: &str,
        routing_tag: &str,
        last_notified: &str,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: Status::parse(status),
            routing_tag: RoutingTag::parse(routing_tag),
            last_notified: last_notified.trim().to_string(),
        }
    }

    pub fn has_last_notified(&self) -> bool {
        !self.last_notified.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(Status::parse("Suspended"), Status::Suspended);
        assert_eq!(Status::parse("  SUSPENDED "), Status::Suspended);
        assert_eq!(Status::parse("active"), Status::Active);
        assert_eq!(Status::parse("Working on it"), Status::Other("Working on it".into()));
        assert_eq!(Status::parse(""), Status::Other(String::new()));
        assert!(!Status::parse("Done").is_suspended());
    }

    #[test]
    fn test_routing_tag_parse() {
        assert_eq!(RoutingTag::parse("ucr"), RoutingTag::Ucr);
        assert_eq!(RoutingTag::parse(" DL "), RoutingTag::Dl);
        assert_eq!(RoutingTag::parse(""), RoutingTag::Unset);
        assert_eq!(RoutingTag::parse("ops"), RoutingTag::Other("OPS".into()));
    }

    #[test]
    fn test_routing_tag_channel() {
        assert_eq!(RoutingTag::Ucr.channel(), Some(Channel::Ucr));
        assert_eq!(RoutingTag::Dl.channel(), Some(Channel::Dl));
        assert_eq!(RoutingTag::Unset.channel(), None);
        assert_eq!(RoutingTag::Other("X".into()).channel(), None);
    }

    #[test]
    fn test_item_from_columns() {
        let item = Item::from_columns("1", "Acme", "Suspended", "ucr", " 2024-01-01T00:00:00Z ");
        assert!(item.status.is_suspended());
        assert_eq!(item.routing_tag, RoutingTag::Ucr);
        assert_eq!(item.last_notified, "2024-01-01T00:00:00Z");
        assert!(item.has_last_notified());
    }
}
