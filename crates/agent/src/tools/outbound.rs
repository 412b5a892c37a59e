use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use super::{ParameterSpec, Tool, ToolArgs, ToolRegistry, ToolSpec};
use crate::store::{CallOutcome, DemoStore};

pub fn register(registry: &mut ToolRegistry, store: Arc<DemoStore>) {
    registry.register(LogCallOutcome::new(store));
    registry.register(ScheduleFollowup::new());
    registry.register(SendInfoEmail::new());
    registry.register(AnswerProductQuestion::new());
}

pub fn info_description(info_type: &str) -> &'static str {
    match info_type {
        "pricing" => "pricing information and subscription options",
        "features" => "detailed feature list and capabilities",
        "case_study" => "customer success stories and case studies",
        "demo_link" => "link to schedule a full product demo",
        _ => "information",
    }
}

pub fn product_answer(topic: &str) -> &'static str {
    match topic {
        "pricing" => {
            "Mind Call Flow offers flexible pricing starting at $99/month for the Starter plan, \
             $299/month for Professional, and custom Enterprise pricing. All plans include \
             unlimited voice minutes and real-time transcription."
        }
        "features" => {
            "Key features include: AI-powered voice agents with customizable personalities, \
             real-time conversation transcription, multi-agent support (scheduling, customer \
             service, general assistant), integration with calendars and CRMs, and detailed \
             analytics."
        }
        "integration" => {
            "We integrate with popular tools including Google Calendar, Salesforce, HubSpot, \
             Slack, and have a REST API for custom integrations. We also support webhooks for \
             real-time event notifications."
        }
        "security" => {
            "Mind Call Flow is SOC 2 compliant with end-to-end encryption for all conversations. \
             We're GDPR and HIPAA compliant, with data residency options available for \
             Enterprise customers."
        }
        _ => {
            "Mind Call Flow is a next-generation voice AI platform that helps businesses \
             automate customer interactions while maintaining a human touch. Perfect for \
             customer service, scheduling, and outbound campaigns."
        }
    }
}

pub struct LogCallOutcome {
    spec: ToolSpec,
    store: Arc<DemoStore>,
}

impl LogCallOutcome {
    pub fn new(store: Arc<DemoStore>) -> Self {
        Self {
            spec: ToolSpec {
                name: "log_call_outcome",
                description: "Log the outcome of the outbound call",
                parameters: vec![
                    ParameterSpec::required(
                        "outcome",
                        "Call outcome: answered, interested, not_interested, callback, or \
                         voicemail",
                    ),
                    ParameterSpec::optional("notes", "Additional notes about the call"),
                ],
            },
            store,
        }
    }
}

#[async_trait]
impl Tool for LogCallOutcome {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &ToolArgs) -> String {
        let outcome = args.text("outcome");
        let record = self
            .store
            .call_outcomes
            .append(|id| CallOutcome {
                id,
                outcome: outcome.to_string(),
                notes: args.optional("notes").map(str::to_string),
                logged_at: Utc::now(),
            })
            .await;
        info!(
            event_name = "tools.outbound.outcome_logged",
            outcome_id = record.id,
            outcome,
            "call outcome logged"
        );

        format!("Call outcome logged as: {outcome}")
    }
}

pub struct ScheduleFollowup {
    spec: ToolSpec,
}

impl ScheduleFollowup {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec {
                name: "schedule_followup",
                description: "Schedule a follow-up call or meeting",
                parameters: vec![
                    ParameterSpec::required("contact_name", "Name of the contact"),
                    ParameterSpec::required("preferred_date", "Preferred date for follow-up"),
                    ParameterSpec::required("preferred_time", "Preferred time for follow-up"),
                    ParameterSpec::required("purpose", "Purpose of the follow-up"),
                ],
            },
        }
    }
}

impl Default for ScheduleFollowup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ScheduleFollowup {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &ToolArgs) -> String {
        let contact = args.text("contact_name");
        // Free-form date and time; the caller may say "next Tuesday".
        let date = args.text("preferred_date");
        let time = args.text("preferred_time");
        info!(
            event_name = "tools.outbound.followup_scheduled",
            contact,
            date,
            time,
            "scheduling follow-up"
        );

        format!(
            "Follow-up scheduled for {contact} on {date} at {time}. Purpose: {}. We'll send a \
             calendar invite.",
            args.text("purpose")
        )
    }
}

pub struct SendInfoEmail {
    spec: ToolSpec,
}

impl SendInfoEmail {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec {
                name: "send_info_email",
                description: "Send follow-up information via email",
                parameters: vec![
                    ParameterSpec::required("email", "Email address"),
                    ParameterSpec::required(
                        "info_type",
                        "Type of information to send: pricing, features, case_study, or \
                         demo_link",
                    ),
                ],
            },
        }
    }
}

impl Default for SendInfoEmail {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SendInfoEmail {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &ToolArgs) -> String {
        let email = args.text("email");
        let info_type = args.text("info_type");
        info!(event_name = "tools.outbound.info_email", email, info_type, "sending information");

        format!(
            "I've sent {} to {email}. Please check your inbox in the next few minutes.",
            info_description(info_type)
        )
    }
}

pub struct AnswerProductQuestion {
    spec: ToolSpec,
}

impl AnswerProductQuestion {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec {
                name: "answer_product_question",
                description: "Get detailed information to answer product questions",
                parameters: vec![ParameterSpec::required(
                    "question_topic",
                    "Topic of the question: pricing, features, integration, security, or other",
                )],
            },
        }
    }
}

impl Default for AnswerProductQuestion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for AnswerProductQuestion {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &ToolArgs) -> String {
        let topic = args.text("question_topic");
        info!(event_name = "tools.outbound.product_question", topic, "answering product question");
        product_answer(topic).to_string()
    }
}
