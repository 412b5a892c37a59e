//! In-memory demo state shared by the tool families.
//!
//! Each family writes to its own append-only [`RecordLog`]. Records are never
//! removed or rewritten, and identifiers are assigned inside the same critical
//! section as the push, so concurrent sessions in one worker still get unique,
//! contiguous ids. Nothing is persisted; ids are only unique for the life of
//! the process.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

#[derive(Debug)]
pub struct RecordLog<T> {
    first_id: u64,
    records: Mutex<Vec<T>>,
}

impl<T: Clone> RecordLog<T> {
    pub fn new(first_id: u64) -> Self {
        Self { first_id, records: Mutex::new(Vec::new()) }
    }

    /// Appends the record built from the next id and returns a copy of it.
    pub async fn append<F>(&self, build: F) -> T
    where
        F: FnOnce(u64) -> T,
    {
        let mut records = self.records.lock().await;
        let id = self.first_id + records.len() as u64;
        let record = build(id);
        records.push(record.clone());
        record
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    pub async fn snapshot(&self) -> Vec<T> {
        self.records.lock().await.clone()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SupportTicket {
    pub id: u64,
    pub customer_name: String,
    pub email: String,
    pub description: String,
    pub priority: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

impl SupportTicket {
    pub fn reference(&self) -> String {
        format!("TICKET-{}", self.id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Appointment {
    pub id: u64,
    pub name: String,
    pub date: NaiveDate,
    pub time: String,
    pub purpose: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CallOutcome {
    pub id: u64,
    pub outcome: String,
    pub notes: Option<String>,
    pub logged_at: DateTime<Utc>,
}

pub const FIRST_TICKET_ID: u64 = 1001;

/// The three demo sequences, injected into the tool registry at construction.
#[derive(Debug)]
pub struct DemoStore {
    pub support_tickets: RecordLog<SupportTicket>,
    pub appointments: RecordLog<Appointment>,
    pub call_outcomes: RecordLog<CallOutcome>,
}

impl Default for DemoStore {
    fn default() -> Self {
        Self {
            support_tickets: RecordLog::new(FIRST_TICKET_ID),
            appointments: RecordLog::new(1),
            call_outcomes: RecordLog::new(1),
        }
    }
}

impl DemoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{CallOutcome, DemoStore, RecordLog};

    #[tokio::test]
    async fn ids_start_at_first_id_and_increase_by_one() {
        let log = RecordLog::new(1001);
        let first = log.append(|id| id).await;
        let second = log.append(|id| id).await;

        assert_eq!((first, second), (1001, 1002));
        assert_eq!(log.len().await, 2);
    }

    #[tokio::test]
    async fn stores_are_isolated_from_each_other() {
        let left = DemoStore::new();
        let right = DemoStore::new();

        left.call_outcomes
            .append(|id| CallOutcome {
                id,
                outcome: "answered".to_string(),
                notes: None,
                logged_at: Utc::now(),
            })
            .await;

        assert_eq!(left.call_outcomes.len().await, 1);
        assert!(right.call_outcomes.is_empty().await);
        assert!(left.support_tickets.is_empty().await);
    }
}
