use std::sync::Arc;

use async_trait::async_trait;
use callflow_core::ToolFailure;
use chrono::Utc;
use tracing::info;

use super::{ParameterSpec, Tool, ToolArgs, ToolRegistry, ToolSpec};
use crate::store::{DemoStore, SupportTicket, TicketStatus};

pub struct KnowledgeEntry {
    pub keyword: &'static str,
    pub question: &'static str,
    pub answer: &'static str,
}

/// Searched in order; every entry whose keyword appears in the query matches.
pub const KNOWLEDGE_BASE: [KnowledgeEntry; 6] = [
    KnowledgeEntry {
        keyword: "account",
        question: "How do I create an account?",
        answer: "You can create an account by clicking the 'Sign Up' button on our homepage \
                 and filling in your details.",
    },
    KnowledgeEntry {
        keyword: "password",
        question: "How do I reset my password?",
        answer: "Click 'Forgot Password' on the login page, enter your email, and we'll send \
                 you a reset link.",
    },
    KnowledgeEntry {
        keyword: "billing",
        question: "How does billing work?",
        answer: "We offer monthly and annual subscription plans. You can manage your billing \
                 from your account settings.",
    },
    KnowledgeEntry {
        keyword: "cancel",
        question: "How do I cancel my subscription?",
        answer: "You can cancel anytime from Account Settings > Subscription. Your access \
                 continues until the end of your billing period.",
    },
    KnowledgeEntry {
        keyword: "support",
        question: "How do I contact support?",
        answer: "You can reach our support team via email at support@mindcallflow.com or \
                 through live chat on our website.",
    },
    KnowledgeEntry {
        keyword: "features",
        question: "What features does Mind Call Flow offer?",
        answer: "Mind Call Flow offers AI-powered voice agents, real-time transcription, \
                 scheduling tools, and customer service automation.",
    },
];

const NO_MATCH: &str = "No exact match found in knowledge base. Consider creating a support \
                        ticket for this question.";

pub fn search(query: &str) -> Result<String, ToolFailure> {
    let query = query.to_lowercase();
    let matches = KNOWLEDGE_BASE
        .iter()
        .filter(|entry| query.contains(entry.keyword))
        .map(|entry| format!("Q: {}\nA: {}", entry.question, entry.answer))
        .collect::<Vec<_>>();

    if matches.is_empty() {
        return Err(ToolFailure::LookupMiss(NO_MATCH.to_string()));
    }
    Ok(matches.join("\n\n"))
}

pub fn register(registry: &mut ToolRegistry, store: Arc<DemoStore>) {
    registry.register(SearchKnowledgeBase::new());
    registry.register(CreateTicket::new(store));
    registry.register(EscalateToHuman::new());
    registry.register(CheckServiceStatus::new());
}

pub struct SearchKnowledgeBase {
    spec: ToolSpec,
}

impl SearchKnowledgeBase {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec {
                name: "search_knowledge_base",
                description: "Search the knowledge base for answers to customer questions",
                parameters: vec![ParameterSpec::required(
                    "query",
                    "The customer's question or topic to search for",
                )],
            },
        }
    }
}

impl Default for SearchKnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SearchKnowledgeBase {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &ToolArgs) -> String {
        let query = args.text("query");
        info!(event_name = "tools.customer_service.kb_search", query, "searching knowledge base");
        search(query).unwrap_or_else(|failure| failure.user_message())
    }
}

pub struct CreateTicket {
    spec: ToolSpec,
    store: Arc<DemoStore>,
}

impl CreateTicket {
    pub fn new(store: Arc<DemoStore>) -> Self {
        Self {
            spec: ToolSpec {
                name: "create_ticket",
                description: "Create a support ticket for customer issues",
                parameters: vec![
                    ParameterSpec::required("customer_name", "Customer name"),
                    ParameterSpec::required("email", "Customer email"),
                    ParameterSpec::required("issue_description", "Description of the issue"),
                    ParameterSpec::with_default(
                        "priority",
                        "medium",
                        "Priority level: low, medium, or high",
                    ),
                ],
            },
            store,
        }
    }
}

#[async_trait]
impl Tool for CreateTicket {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &ToolArgs) -> String {
        let email = args.text("email");
        let ticket = self
            .store
            .support_tickets
            .append(|id| SupportTicket {
                id,
                customer_name: args.text("customer_name").to_string(),
                email: email.to_string(),
                description: args.text("issue_description").to_string(),
                priority: args.text("priority").to_string(),
                status: TicketStatus::Open,
                created_at: Utc::now(),
            })
            .await;
        info!(
            event_name = "tools.customer_service.ticket_created",
            ticket = %ticket.reference(),
            priority = %ticket.priority,
            "support ticket created"
        );

        format!(
            "Support ticket {} has been created. Our team will respond to {email} within 24 \
             hours. Thank you for your patience!",
            ticket.reference()
        )
    }
}

pub struct EscalateToHuman {
    spec: ToolSpec,
}

impl EscalateToHuman {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec {
                name: "escalate_to_human",
                description: "Escalate the conversation to a human agent",
                parameters: vec![
                    ParameterSpec::required("reason", "Reason for escalation"),
                    ParameterSpec::optional("customer_email", "Customer email if available"),
                ],
            },
        }
    }
}

impl Default for EscalateToHuman {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for EscalateToHuman {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &ToolArgs) -> String {
        info!(
            event_name = "tools.customer_service.escalated",
            reason = args.text("reason"),
            "escalating to a human agent"
        );

        let mut message = "I've requested a human agent to assist you. A team member will join \
                           this conversation shortly."
            .to_string();
        if let Some(email) = args.optional("customer_email") {
            message.push_str(&format!(" We'll also send you an email at {email} with next steps."));
        }
        message
    }
}

pub struct CheckServiceStatus {
    spec: ToolSpec,
}

impl CheckServiceStatus {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec {
                name: "check_service_status",
                description: "Check the status of Mind Call Flow services",
                parameters: vec![ParameterSpec::with_default(
                    "service",
                    "all",
                    "Service to check (e.g., 'api', 'voice', 'web')",
                )],
            },
        }
    }
}

impl Default for CheckServiceStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CheckServiceStatus {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &ToolArgs) -> String {
        let service = args.text("service");
        info!(event_name = "tools.customer_service.status", service, "checking service status");

        // Status is static until a status page is wired in.
        if service == "all" {
            "All Mind Call Flow services are operational. API: ✓ Voice: ✓ Web: ✓".to_string()
        } else {
            format!("The {service} service is operational.")
        }
    }
}
