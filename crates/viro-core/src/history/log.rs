//! Per-user history log.

use super::model::HistoryEntry;
use serde::{Deserialize, Serialize};

/// The ordered history of one user, newest entry first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

/// An entry together with its position in the full log.
///
/// Positions refer to the whole log, not to the group, so they can be fed
/// straight back into [`HistoryLog::without_entry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionedEntry {
    pub position: usize,
    pub entry: HistoryEntry,
}

/// All entries that share one topic, in log order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicGroup {
    pub topic: String,
    pub entries: Vec<PositionedEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a new log with `entry` placed in front.
    pub fn prepended(&self, entry: HistoryEntry) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.push(entry);
        entries.extend(self.entries.iter().cloned());
        Self { entries }
    }

    /// Partitions the log by topic.
    ///
    /// Groups appear in the order their topic first occurs in the log and
    /// each group keeps the relative order of its entries.
    pub fn group_by_topic(&self) -> Vec<TopicGroup> {
        let mut groups: Vec<TopicGroup> = Vec::new();
        for (position, entry) in self.entries.iter().enumerate() {
            let positioned = PositionedEntry {
                position,
                entry: entry.clone(),
            };
            match groups.iter_mut().find(|group| group.topic == entry.topic()) {
                Some(group) => group.entries.push(positioned),
                None => groups.push(TopicGroup {
                    topic: entry.topic().to_string(),
                    entries: vec![positioned],
                }),
            }
        }
        groups
    }

    /// Returns a copy without the entry at `position` if its topic is `topic`.
    ///
    /// When the position is out of range or holds an entry of another
    /// topic, the copy equals `self`.
    pub fn without_entry(&self, topic: &str, position: usize) -> Self {
        let entries = self
            .entries
            .iter()
            .enumerate()
            .filter(|(i, entry)| !(entry.topic() == topic && *i == position))
            .map(|(_, entry)| entry.clone())
            .collect();
        Self { entries }
    }
}

impl From<Vec<HistoryEntry>> for HistoryLog {
    fn from(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }
}

impl From<HistoryLog> for Vec<HistoryEntry> {
    fn from(log: HistoryLog) -> Self {
        log.entries
    }
}

/// Concatenates groups back into a flat sequence, group by group.
pub fn flatten_groups(groups: &[TopicGroup]) -> Vec<HistoryEntry> {
    groups
        .iter()
        .flat_map(|group| group.entries.iter().map(|p| p.entry.clone()))
        .collect()
}
