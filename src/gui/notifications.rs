//! Notification feed for the GUI.
//!
//! Write-path failures end up here as user-visible notices; read-path
//! failures never do (they degrade to zero at the source).

use crate::config::REQUIRED_NETWORK_LABEL;
use std::collections::VecDeque;

/// Keep the feed bounded; older entries fall off the back.
const MAX_ENTRIES: usize = 50;

/// A notification entry with message and timestamp
#[derive(Clone)]
pub struct NotificationEntry {
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl NotificationEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: chrono::Local::now(),
        }
    }

    pub fn time_ago(&self) -> String {
        let now = chrono::Local::now();
        let duration = now.signed_duration_since(self.timestamp);
        if duration.num_seconds() < 60 {
            "just now".to_string()
        } else if duration.num_minutes() < 60 {
            format!("{}m ago", duration.num_minutes())
        } else if duration.num_hours() < 24 {
            format!("{}h ago", duration.num_hours())
        } else {
            self.timestamp.format("%m/%d %H:%M").to_string()
        }
    }
}

/// Push an entry, dropping the oldest once the feed is full.
pub fn push(feed: &mut VecDeque<NotificationEntry>, message: impl Into<String>) {
    feed.push_back(NotificationEntry::new(message));
    while feed.len() > MAX_ENTRIES {
        feed.pop_front();
    }
}

/// Phrase a write-path failure for the notification feed, adding the hint
/// the user actually needs for the common cases.
pub fn describe_failure(operation: &str, error: &anyhow::Error) -> String {
    let text = error.to_string();
    if text.contains("switch your wallet") {
        format!(
            "{} blocked: {}\n\nSwitch the wallet to {} and reconnect.",
            operation, text, REQUIRED_NETWORK_LABEL
        )
    } else if text.contains("rejected") {
        format!("{} cancelled: the request was rejected in the wallet.", operation)
    } else if text.contains("reverted") {
        format!("{} failed on chain: {}", operation, text)
    } else {
        format!("{} failed: {}", operation, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    // ==================== feed tests ====================

    #[test]
    fn test_feed_stays_bounded() {
        let mut feed = VecDeque::new();
        for i in 0..(MAX_ENTRIES + 10) {
            push(&mut feed, format!("entry {}", i));
        }
        assert_eq!(feed.len(), MAX_ENTRIES);
        // Oldest entries were dropped.
        assert!(feed.front().unwrap().message.contains("10"));
    }

    #[test]
    fn test_fresh_entry_reads_just_now() {
        let entry = NotificationEntry::new("hi");
        assert_eq!(entry.time_ago(), "just now");
    }

    // ==================== phrasing tests ====================

    #[test]
    fn test_wrong_network_notice_names_the_network() {
        let err = anyhow!("connected to chain 1, switch your wallet to chain 11155111 (Sepolia)");
        let text = describe_failure("Mint", &err);
        assert!(text.contains("Sepolia"));
        assert!(text.contains("blocked"));
    }

    #[test]
    fn test_rejection_notice() {
        let err = anyhow!("request was rejected in the wallet");
        let text = describe_failure("Claim", &err);
        assert!(text.contains("cancelled"));
    }

    #[test]
    fn test_generic_failure_keeps_the_message() {
        let err = anyhow!("connection refused");
        let text = describe_failure("Mint", &err);
        assert!(text.contains("connection refused"));
    }
}
