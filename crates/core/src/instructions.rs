//! Behavioral scripts and opening greetings for each agent type.
//!
//! Scripts are Tera templates embedded at compile time. The outbound script
//! and greeting are the only ones that interpolate anything (`user_name`).

use tera::{Context, Tera};
use thiserror::Error;

use crate::profile::{AgentConfig, AgentType};

const GENERAL_SCRIPT: &str = "\
You are a helpful AI assistant for Mind Call Flow, a platform for AI-powered conversations.
You can help with:
- General questions and conversations
- Information lookup
- Basic problem-solving
- Scheduling appointments and managing calendars
- Customer service and support inquiries
- Providing guidance and suggestions

You are capable of handling all types of requests. When users ask about scheduling,
help them book appointments directly. When they need support, assist them immediately.

Always be helpful, clear, and conversational.";

const SCHEDULING_SCRIPT: &str = "\
You are a professional scheduling assistant for Mind Call Flow.
Your role is to help users:
- Check available time slots
- Book appointments
- Confirm appointment details
- Send confirmation emails

Be professional, efficient, and helpful. Always confirm details before booking.
Collect: name, date, time, and purpose of appointment.";

const CUSTOMER_SERVICE_SCRIPT: &str = "\
You are a patient and empathetic customer service representative for Mind Call Flow.
Your primary responsibility is to actively help customers with their issues.

When a customer needs help:
1. Listen carefully to their question or problem
2. Search the knowledge base for answers
3. Provide clear, helpful solutions immediately
4. If the issue is complex, create a support ticket
5. Only escalate to human agents when absolutely necessary

Always be understanding, professional, and solution-oriented.
You ARE the customer service agent - help customers directly, don't refer them elsewhere.
If you don't know the answer, be honest and offer to create a ticket or escalate.";

const OUTBOUND_SCRIPT: &str = "\
You are making an outbound call to {{ user_name }}.
This is a demonstration call to showcase Mind Call Flow's voice AI capabilities.

Your objectives:
1. Warmly greet {{ user_name }} by name
2. Introduce yourself as an AI assistant from Mind Call Flow
3. Explain this is a demo of our voice AI technology
4. Ask if they have a few minutes to see what the platform can do
5. Demonstrate key capabilities:
   - Natural conversation
   - Understanding context
   - Answering questions
   - Scheduling assistance (if interested)
6. Ask if they'd like more information or to schedule a full demo
7. Thank them for their time

Be warm, professional, and respectful of their time.
If they seem busy or not interested, politely wrap up the call.";

const GENERAL_GREETING: &str = "Greet the user warmly and introduce yourself as their AI \
assistant. Ask how you can help them today.";

const SCHEDULING_GREETING: &str = "Greet the user professionally and let them know you're here \
to help with scheduling appointments. Ask how you can assist them.";

const CUSTOMER_SERVICE_GREETING: &str = "Greet the customer warmly and let them know you're here \
to help with any questions or issues. Ask how you can assist them today.";

const OUTBOUND_GREETING: &str = "Greet {{ user_name }} warmly by name, introduce yourself as an \
AI assistant from Mind Call Flow, and explain this is a demo call. Ask if they have a moment to \
see our voice AI capabilities.";

#[derive(Debug, Error)]
pub enum InstructionError {
    #[error("instruction template `{name}` failed to render: {source}")]
    Render { name: String, source: tera::Error },
    #[error("instruction templates failed to load: {0}")]
    Load(#[source] tera::Error),
}

/// Renders the behavioral prompt handed to the session runtime.
#[derive(Clone, Debug)]
pub struct InstructionComposer {
    tera: Tera,
}

impl InstructionComposer {
    pub fn new() -> Result<Self, InstructionError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("script/general.txt", GENERAL_SCRIPT),
            ("script/scheduling.txt", SCHEDULING_SCRIPT),
            ("script/customer_service.txt", CUSTOMER_SERVICE_SCRIPT),
            ("script/outbound.txt", OUTBOUND_SCRIPT),
            ("greeting/general.txt", GENERAL_GREETING),
            ("greeting/scheduling.txt", SCHEDULING_GREETING),
            ("greeting/customer_service.txt", CUSTOMER_SERVICE_GREETING),
            ("greeting/outbound.txt", OUTBOUND_GREETING),
        ])
        .map_err(InstructionError::Load)?;

        Ok(Self { tera })
    }

    /// Preamble, style modifiers, then the agent type's script.
    pub fn instructions(&self, config: &AgentConfig) -> Result<String, InstructionError> {
        let script = self.render("script", config)?;
        Ok(format!("{}\n\n{}", config.base_instructions(), script))
    }

    /// Prompt for the first thing the agent says when it joins.
    pub fn greeting(&self, config: &AgentConfig) -> Result<String, InstructionError> {
        self.render("greeting", config)
    }

    fn render(&self, kind: &str, config: &AgentConfig) -> Result<String, InstructionError> {
        let name = template_name(kind, config.agent_type);
        let mut context = Context::new();
        context.insert("user_name", config.display_name());

        self.tera
            .render(&name, &context)
            .map(|rendered| rendered.trim().to_string())
            .map_err(|source| InstructionError::Render { name, source })
    }
}

fn template_name(kind: &str, agent_type: AgentType) -> String {
    format!("{kind}/{}.txt", agent_type.as_str())
}
