use std::collections::BTreeSet;
use std::sync::Arc;

use callflow_agent::store::{CallOutcome, DemoStore, FIRST_TICKET_ID};
use callflow_agent::ToolRegistry;
use callflow_core::AgentType;
use chrono::Utc;
use serde_json::json;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_get_unique_contiguous_ids() {
    const TASKS: u64 = 8;
    const PER_TASK: u64 = 25;

    let store = Arc::new(DemoStore::new());
    let mut handles = Vec::new();
    for task in 0..TASKS {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let mut ids = Vec::new();
            for call in 0..PER_TASK {
                let record = store
                    .call_outcomes
                    .append(|id| CallOutcome {
                        id,
                        outcome: format!("task-{task}-call-{call}"),
                        notes: None,
                        logged_at: Utc::now(),
                    })
                    .await;
                ids.push(record.id);
            }
            ids
        }));
    }

    let mut ids = BTreeSet::new();
    for handle in handles {
        ids.extend(handle.await.expect("task completes"));
    }

    assert_eq!(ids.len() as u64, TASKS * PER_TASK);
    assert_eq!(ids.iter().copied().collect::<Vec<_>>(), (1..=TASKS * PER_TASK).collect::<Vec<_>>());

    let snapshot = store.call_outcomes.snapshot().await;
    assert!(snapshot.windows(2).all(|pair| pair[1].id == pair[0].id + 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_tickets_from_separate_sessions_share_one_sequence() {
    let store = Arc::new(DemoStore::new());
    let sessions = (0..4)
        .map(|_| Arc::new(ToolRegistry::for_agent(AgentType::CustomerService, store.clone())))
        .collect::<Vec<_>>();

    let mut handles = Vec::new();
    for (index, tools) in sessions.into_iter().enumerate() {
        handles.push(tokio::spawn(async move {
            tools
                .invoke(
                    "create_ticket",
                    json!({
                        "customer_name": format!("caller {index}"),
                        "email": format!("caller{index}@example.com"),
                        "issue_description": "audio drops",
                        "priority": "high"
                    }),
                )
                .await
        }));
    }
    for handle in handles {
        let reply = handle.await.expect("task completes");
        assert!(reply.starts_with("Support ticket TICKET-10"));
    }

    let ids = store.support_tickets.snapshot().await.iter().map(|t| t.id).collect::<Vec<_>>();
    assert_eq!(ids, (FIRST_TICKET_ID..FIRST_TICKET_ID + 4).collect::<Vec<_>>());
}

#[tokio::test]
async fn malformed_booking_date_leaves_no_record() {
    let store = Arc::new(DemoStore::new());
    let tools = ToolRegistry::for_agent(AgentType::Scheduling, store.clone());

    let reply = tools
        .invoke(
            "book_appointment",
            json!({"name": "Ana", "date": "2024-02-30", "time": "1:00 PM", "purpose": "intro"}),
        )
        .await;

    assert_eq!(reply, "Invalid date format. Could not book appointment.");
    assert!(store.appointments.is_empty().await);
}

#[tokio::test]
async fn morning_availability_ignores_the_date() {
    let tools = ToolRegistry::for_agent(AgentType::Scheduling, Arc::new(DemoStore::new()));

    for date in ["2024-01-01", "2031-12-31"] {
        let reply = tools
            .invoke("check_availability", json!({"date": date, "time_preference": "morning"}))
            .await;
        assert_eq!(reply, format!("Available time slots for {date}: 9:00 AM, 10:00 AM, 11:00 AM"));
    }
}

#[tokio::test]
async fn general_agent_has_no_tools_and_says_so() {
    let tools = ToolRegistry::for_agent(AgentType::General, Arc::new(DemoStore::new()));

    assert!(tools.is_empty());
    let reply = tools.invoke("book_appointment", json!({})).await;
    assert!(reply.contains("no `book_appointment` tool"));
}
