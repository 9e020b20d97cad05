//! Locker domain objects and the persisted row model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A plaintext locker entry.  Only ever held in memory; the persisted form is
/// a [`StoredRecord`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// User-entered incident date, free-form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub title: String,
    pub details: String,
}

// Titles and details are sensitive; keep them out of logs and panics.
impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("date", &self.date.as_ref().map(|_| "<redacted>"))
            .field("title", &"<redacted>")
            .field("details", &"<redacted>")
            .finish()
    }
}

/// Caller input for a new entry; `id` and `created_at` are assigned by the
/// locker.
#[derive(Clone, Default, Deserialize)]
pub struct NewEntry {
    #[serde(default)]
    pub date: Option<String>,
    pub title: String,
    pub details: String,
}

impl NewEntry {
    pub fn new(title: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            date: None,
            title: title.into(),
            details: details.into(),
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub(crate) fn into_entry(self, id: Uuid, created_at: DateTime<Utc>) -> Entry {
        Entry {
            id,
            created_at,
            date: self.date,
            title: self.title,
            details: self.details,
        }
    }
}

/// One row of the `entries` table.  `iv` and `blob` are opaque.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StoredRecord {
    pub id: String,
    pub iv: Vec<u8>,
    pub blob: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UndecryptableReason {
    /// No passphrase is set for this session.
    Locked,
    /// Authentication tag mismatch: other passphrase, corruption or tampering.
    Authentication,
    /// Decrypted, but the plaintext is not a valid entry for this row.
    Malformed,
}

impl fmt::Display for UndecryptableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UndecryptableReason::Locked => "locked",
            UndecryptableReason::Authentication => "authentication",
            UndecryptableReason::Malformed => "malformed",
        };
        f.write_str(s)
    }
}

/// Per-record result of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Decrypted(Entry),
    Undecryptable { id: String, reason: UndecryptableReason },
}

impl RecordOutcome {
    pub fn into_entry(self) -> Option<Entry> {
        match self {
            RecordOutcome::Decrypted(entry) => Some(entry),
            RecordOutcome::Undecryptable { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_json_uses_camel_case_and_omits_missing_date() {
        let entry = NewEntry::new("bruise photo", "left arm, 3/1")
            .into_entry(Uuid::nil(), Utc::now());
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("date").is_none());
        assert_eq!(json["title"], "bruise photo");

        let back: Entry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn debug_output_redacts_content() {
        let entry = NewEntry::new("bruise photo", "left arm, 3/1")
            .with_date("2024-03-01")
            .into_entry(Uuid::new_v4(), Utc::now());
        let shown = format!("{entry:?}");
        assert!(!shown.contains("bruise"));
        assert!(!shown.contains("left arm"));
        assert!(!shown.contains("2024-03-01"));
    }
}
