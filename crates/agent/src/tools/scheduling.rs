use std::sync::Arc;

use async_trait::async_trait;
use callflow_core::ToolFailure;
use chrono::{NaiveDate, Utc};
use tracing::info;

use super::{ParameterSpec, Tool, ToolArgs, ToolRegistry, ToolSpec};
use crate::store::{Appointment, DemoStore};

const DATE_FORMAT: &str = "%Y-%m-%d";

const MORNING_SLOTS: [&str; 3] = ["9:00 AM", "10:00 AM", "11:00 AM"];
const AFTERNOON_SLOTS: [&str; 3] = ["1:00 PM", "2:00 PM", "3:00 PM"];
const EVENING_SLOTS: [&str; 3] = ["5:00 PM", "6:00 PM", "7:00 PM"];

pub fn register(registry: &mut ToolRegistry, store: Arc<DemoStore>) {
    registry.register(CheckAvailability::new());
    registry.register(BookAppointment::new(store));
    registry.register(SendConfirmation::new());
}

fn parse_date(value: &str) -> Result<NaiveDate, ToolFailure> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| ToolFailure::Format {
        field: "date",
        value: value.to_string(),
        expected_format: "YYYY-MM-DD",
    })
}

/// Demo slots for a time-of-day preference. The date does not affect them.
pub fn slots_for(preference: &str) -> Vec<&'static str> {
    let any = preference == "any";
    let mut slots = Vec::new();
    if any || preference == "morning" {
        slots.extend(MORNING_SLOTS);
    }
    if any || preference == "afternoon" {
        slots.extend(AFTERNOON_SLOTS);
    }
    if any || preference == "evening" {
        slots.extend(EVENING_SLOTS);
    }
    slots
}

pub struct CheckAvailability {
    spec: ToolSpec,
}

impl CheckAvailability {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec {
                name: "check_availability",
                description: "Check available appointment slots for a given date",
                parameters: vec![
                    ParameterSpec::required("date", "Date in YYYY-MM-DD format"),
                    ParameterSpec::with_default(
                        "time_preference",
                        "any",
                        "Preferred time of day: morning, afternoon, or evening",
                    ),
                ],
            },
        }
    }

    fn answer(date: &str, preference: &str) -> Result<String, ToolFailure> {
        parse_date(date)?;
        let slots = slots_for(preference);
        if slots.is_empty() {
            return Err(ToolFailure::LookupMiss(format!("No slots available for {date}.")));
        }
        Ok(format!("Available time slots for {date}: {}", slots.join(", ")))
    }
}

impl Default for CheckAvailability {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CheckAvailability {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &ToolArgs) -> String {
        let date = args.text("date");
        let preference = args.text("time_preference");
        info!(
            event_name = "tools.scheduling.check_availability",
            date,
            time_preference = preference,
            "checking availability"
        );

        Self::answer(date, preference).unwrap_or_else(|failure| failure.user_message())
    }
}

pub struct BookAppointment {
    spec: ToolSpec,
    store: Arc<DemoStore>,
}

impl BookAppointment {
    pub fn new(store: Arc<DemoStore>) -> Self {
        Self {
            spec: ToolSpec {
                name: "book_appointment",
                description: "Book an appointment",
                parameters: vec![
                    ParameterSpec::required("name", "Customer name"),
                    ParameterSpec::required("date", "Appointment date in YYYY-MM-DD format"),
                    ParameterSpec::required("time", "Appointment time (e.g., '2:00 PM')"),
                    ParameterSpec::required("purpose", "Purpose of appointment"),
                    ParameterSpec::optional("email", "Customer email for confirmation"),
                ],
            },
            store,
        }
    }
}

#[async_trait]
impl Tool for BookAppointment {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &ToolArgs) -> String {
        let name = args.text("name");
        let raw_date = args.text("date");
        let time = args.text("time");
        let purpose = args.text("purpose");
        let email = args.optional("email");

        let Ok(date) = parse_date(raw_date) else {
            return "Invalid date format. Could not book appointment.".to_string();
        };

        let appointment = self
            .store
            .appointments
            .append(|id| Appointment {
                id,
                name: name.to_string(),
                date,
                time: time.to_string(),
                purpose: purpose.to_string(),
                email: email.map(str::to_string),
                created_at: Utc::now(),
            })
            .await;
        info!(
            event_name = "tools.scheduling.appointment_booked",
            appointment_id = appointment.id,
            date = %appointment.date,
            time,
            "appointment booked"
        );

        let mut confirmation = format!(
            "Appointment confirmed for {name} on {raw_date} at {time}. Purpose: {purpose}."
        );
        if let Some(email) = email {
            confirmation.push_str(&format!(" A confirmation email will be sent to {email}."));
        }
        confirmation
    }
}

pub struct SendConfirmation {
    spec: ToolSpec,
}

impl SendConfirmation {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec {
                name: "send_confirmation",
                description: "Send appointment confirmation email",
                parameters: vec![
                    ParameterSpec::required("email", "Email address"),
                    ParameterSpec::required(
                        "appointment_details",
                        "Appointment details to include",
                    ),
                ],
            },
        }
    }
}

impl Default for SendConfirmation {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SendConfirmation {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &ToolArgs) -> String {
        let email = args.text("email");
        // No mail is sent; the demo only acknowledges.
        info!(event_name = "tools.scheduling.confirmation_sent", email, "sending confirmation");
        format!("Confirmation email sent to {email} with the appointment details.")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use callflow_core::AgentType;
    use serde_json::json;

    use super::slots_for;
    use crate::store::DemoStore;
    use crate::tools::ToolRegistry;

    fn registry() -> (ToolRegistry, Arc<DemoStore>) {
        let store = Arc::new(DemoStore::new());
        (ToolRegistry::for_agent(AgentType::Scheduling, store.clone()), store)
    }

    #[test]
    fn preferences_map_to_fixed_slot_groups() {
        assert_eq!(slots_for("morning"), vec!["9:00 AM", "10:00 AM", "11:00 AM"]);
        assert_eq!(slots_for("evening"), vec!["5:00 PM", "6:00 PM", "7:00 PM"]);
        assert_eq!(slots_for("any").len(), 9);
        assert!(slots_for("midnight").is_empty());
        assert!(slots_for("Morning").is_empty());
        assert!(slots_for(" morning").is_empty());
    }

    #[tokio::test]
    async fn availability_reports_slots_or_explains_the_problem() {
        let (tools, _) = registry();

        assert_eq!(
            tools
                .invoke(
                    "check_availability",
                    json!({"date": "2024-05-01", "time_preference": "afternoon"})
                )
                .await,
            "Available time slots for 2024-05-01: 1:00 PM, 2:00 PM, 3:00 PM"
        );
        assert_eq!(
            tools.invoke("check_availability", json!({"date": "01/05/2024"})).await,
            "Invalid date format. Please provide date in YYYY-MM-DD format."
        );
        assert_eq!(
            tools
                .invoke(
                    "check_availability",
                    json!({"date": "2024-05-01", "time_preference": "night"})
                )
                .await,
            "No slots available for 2024-05-01."
        );
        assert_eq!(
            tools
                .invoke(
                    "check_availability",
                    json!({"date": "2024-05-01", "time_preference": "Morning"})
                )
                .await,
            "No slots available for 2024-05-01."
        );
    }

    #[tokio::test]
    async fn dates_with_surrounding_whitespace_are_rejected() {
        let (tools, store) = registry();

        assert_eq!(
            tools.invoke("check_availability", json!({"date": " 2024-05-01 "})).await,
            "Invalid date format. Please provide date in YYYY-MM-DD format."
        );
        assert_eq!(
            tools
                .invoke(
                    "book_appointment",
                    json!({
                        "name": "Dana",
                        "date": "2024-05-01 ",
                        "time": "9:00 AM",
                        "purpose": "demo"
                    }),
                )
                .await,
            "Invalid date format. Could not book appointment."
        );
        assert!(store.appointments.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn booking_confirms_and_records_the_appointment() {
        let (tools, store) = registry();

        let reply = tools
            .invoke(
                "book_appointment",
                json!({
                    "name": "Dana",
                    "date": "2024-05-01",
                    "time": "2:00 PM",
                    "purpose": "onboarding",
                    "email": "dana@example.com"
                }),
            )
            .await;

        assert_eq!(
            reply,
            "Appointment confirmed for Dana on 2024-05-01 at 2:00 PM. Purpose: onboarding. \
             A confirmation email will be sent to dana@example.com."
        );
        let appointments = store.appointments.snapshot().await;
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0].id, 1);
        assert_eq!(appointments[0].email.as_deref(), Some("dana@example.com"));
    }

    #[tokio::test]
    async fn booking_without_email_has_no_confirmation_sentence() {
        let (tools, _) = registry();

        let reply = tools
            .invoke(
                "book_appointment",
                json!({"name": "Dana", "date": "2024-05-01", "time": "9:00 AM", "purpose": "demo"}),
            )
            .await;

        assert_eq!(
            reply,
            "Appointment confirmed for Dana on 2024-05-01 at 9:00 AM. Purpose: demo."
        );
    }

    #[tokio::test]
    async fn send_confirmation_only_acknowledges() {
        let (tools, _) = registry();

        let reply = tools
            .invoke(
                "send_confirmation",
                json!({"email": "dana@example.com", "appointment_details": "Tuesday 2 PM"}),
            )
            .await;

        assert_eq!(
            reply,
            "Confirmation email sent to dana@example.com with the appointment details."
        );
    }
}
