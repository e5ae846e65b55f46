use chrono::{DateTime, Local};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

/// Upper bound on retained activity entries
pub const ACTIVITY_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub at: DateTime<Local>,
    pub text: String,
}

/// Shared, bounded log of bridge activity shown by the host UI
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: Arc<RwLock<VecDeque<ActivityEntry>>>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(ACTIVITY_CAPACITY))),
        }
    }

    pub fn add(&self, text: impl Into<String>) {
        let mut entries = self.entries.write();
        if entries.len() >= ACTIVITY_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(ActivityEntry {
            at: Local::now(),
            text: text.into(),
        });
    }

    pub fn get_all(&self) -> Vec<ActivityEntry> {
        self.entries.read().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_bounded() {
        let log = ActivityLog::new();
        for i in 0..ACTIVITY_CAPACITY + 5 {
            log.add(format!("entry {}", i));
        }
        assert_eq!(log.len(), ACTIVITY_CAPACITY);
        assert_eq!(log.get_all()[0].text, "entry 5");
    }

    #[test]
    fn test_clones_share_entries() {
        let log = ActivityLog::new();
        let other = log.clone();
        other.add("stream started");
        assert_eq!(log.len(), 1);
        log.clear();
        assert!(other.is_empty());
    }
}
