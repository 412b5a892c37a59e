//! Named, schema-described operations the language model may call.
//!
//! Each agent type gets a fixed [`ToolRegistry`]: an ordered table from tool
//! name to its [`ToolSpec`] and handler. The external function-calling
//! dispatcher reads the specs (see [`ToolSpec::json_schema`]) and calls back
//! through [`ToolRegistry::invoke`]. Every call answers with text, including
//! unknown tools and bad arguments; nothing is raised to the dispatcher.

pub mod customer_service;
pub mod outbound;
pub mod scheduling;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use callflow_core::AgentType;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::store::DemoStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterKind {
    Text,
    OptionalText,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub kind: ParameterKind,
    pub default: Option<&'static str>,
    pub hint: &'static str,
}

impl ParameterSpec {
    pub const fn required(name: &'static str, hint: &'static str) -> Self {
        Self { name, kind: ParameterKind::Text, default: None, hint }
    }

    pub const fn with_default(
        name: &'static str,
        default: &'static str,
        hint: &'static str,
    ) -> Self {
        Self { name, kind: ParameterKind::Text, default: Some(default), hint }
    }

    pub const fn optional(name: &'static str, hint: &'static str) -> Self {
        Self { name, kind: ParameterKind::OptionalText, default: None, hint }
    }

    pub fn is_required(&self) -> bool {
        self.kind == ParameterKind::Text && self.default.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParameterSpec>,
}

impl ToolSpec {
    /// Function-calling schema in the shape LLM providers expect.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        for parameter in &self.parameters {
            let mut property = json!({ "type": "string", "description": parameter.hint });
            if let Some(default) = parameter.default {
                property["default"] = Value::String(default.to_string());
            }
            if parameter.kind == ParameterKind::OptionalText {
                property["type"] = json!(["string", "null"]);
            }
            properties.insert(parameter.name.to_string(), property);
        }

        let required = self
            .parameters
            .iter()
            .filter(|parameter| parameter.is_required())
            .map(|parameter| parameter.name)
            .collect::<Vec<_>>();

        json!({
            "name": self.name,
            "description": self.description,
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": required,
            },
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToolArgError {
    NotAnObject,
    MissingArgument { name: &'static str, hint: &'static str },
    WrongType { name: &'static str },
}

impl ToolArgError {
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAnObject => "Tool arguments must be provided as named values.".to_string(),
            Self::MissingArgument { name, hint } => {
                format!("I still need the {name} ({hint}) before I can do that.")
            }
            Self::WrongType { name } => format!("The {name} value must be given as text."),
        }
    }
}

/// Arguments checked against a tool's declared parameters, defaults applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolArgs {
    values: HashMap<String, String>,
}

impl ToolArgs {
    pub fn bind(spec: &ToolSpec, raw: Value) -> Result<Self, ToolArgError> {
        let raw = match raw {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => return Err(ToolArgError::NotAnObject),
        };

        let mut values = HashMap::new();
        for parameter in &spec.parameters {
            match raw.get(parameter.name) {
                Some(Value::String(value)) => {
                    values.insert(parameter.name.to_string(), value.clone());
                }
                None | Some(Value::Null) => {
                    if let Some(default) = parameter.default {
                        values.insert(parameter.name.to_string(), default.to_string());
                    } else if parameter.kind == ParameterKind::Text {
                        return Err(ToolArgError::MissingArgument {
                            name: parameter.name,
                            hint: parameter.hint,
                        });
                    }
                }
                Some(_) => return Err(ToolArgError::WrongType { name: parameter.name }),
            }
        }

        Ok(Self { values })
    }

    /// Value of a required or defaulted parameter.
    pub fn text(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or_default()
    }

    /// Value of an optional parameter; blank text counts as absent.
    pub fn optional(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str).filter(|value| !value.trim().is_empty())
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> &ToolSpec;
    async fn execute(&self, args: &ToolArgs) -> String;
}

pub struct ToolRegistry {
    agent_type: AgentType,
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    pub fn new(agent_type: AgentType) -> Self {
        Self { agent_type, tools: Vec::new(), index: HashMap::new() }
    }

    /// The fixed tool family for an agent type, writing to `store`.
    pub fn for_agent(agent_type: AgentType, store: Arc<DemoStore>) -> Self {
        let mut registry = Self::new(agent_type);
        match agent_type {
            AgentType::General => {}
            AgentType::Scheduling => scheduling::register(&mut registry, store),
            AgentType::CustomerService => customer_service::register(&mut registry, store),
            AgentType::Outbound => outbound::register(&mut registry, store),
        }
        registry
    }

    /// Adds a tool. A tool with the same name replaces the earlier one in place.
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        let name = tool.spec().name;
        match self.index.get(name) {
            Some(&position) => {
                warn!(
                    event_name = "agent.tools.replaced",
                    agent_type = %self.agent_type,
                    tool = name,
                    "tool registered twice, keeping the latest definition"
                );
                self.tools[position] = Box::new(tool);
            }
            None => {
                self.index.insert(name, self.tools.len());
                self.tools.push(Box::new(tool));
            }
        }
    }

    pub fn agent_type(&self) -> AgentType {
        self.agent_type
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.index.get(name).map(|&position| self.tools[position].as_ref())
    }

    pub fn specs(&self) -> impl Iterator<Item = &ToolSpec> {
        self.tools.iter().map(|tool| tool.spec())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.specs().map(|spec| spec.name).collect()
    }

    pub fn json_schemas(&self) -> Vec<Value> {
        self.specs().map(ToolSpec::json_schema).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Runs a tool by name. Always answers with text.
    pub async fn invoke(&self, name: &str, args: Value) -> String {
        let Some(tool) = self.get(name) else {
            warn!(
                event_name = "agent.tools.unknown",
                agent_type = %self.agent_type,
                tool = name,
                "dispatcher requested a tool this agent does not have"
            );
            return format!("I'm not able to do that here: there is no `{name}` tool.");
        };

        let args = match ToolArgs::bind(tool.spec(), args) {
            Ok(args) => args,
            Err(error) => {
                warn!(
                    event_name = "agent.tools.bad_arguments",
                    agent_type = %self.agent_type,
                    tool = name,
                    error = ?error,
                    "tool arguments did not match the declared parameters"
                );
                return error.user_message();
            }
        };

        info!(
            event_name = "agent.tools.invoke",
            agent_type = %self.agent_type,
            tool = name,
            "invoking tool"
        );
        tool.execute(&args).await
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("agent_type", &self.agent_type)
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use callflow_core::AgentType;
    use serde_json::json;

    use super::{ParameterSpec, Tool, ToolArgError, ToolArgs, ToolRegistry, ToolSpec};
    use crate::store::DemoStore;

    struct Echo {
        spec: ToolSpec,
    }

    impl Echo {
        fn new(description: &'static str) -> Self {
            Self {
                spec: ToolSpec {
                    name: "echo",
                    description,
                    parameters: vec![
                        ParameterSpec::required("text", "Text to repeat"),
                        ParameterSpec::with_default("suffix", "!", "Appended suffix"),
                        ParameterSpec::optional("prefix", "Optional prefix"),
                    ],
                },
            }
        }
    }

    #[async_trait]
    impl Tool for Echo {
        fn spec(&self) -> &ToolSpec {
            &self.spec
        }

        async fn execute(&self, args: &ToolArgs) -> String {
            format!(
                "{}{}{}",
                args.optional("prefix").unwrap_or_default(),
                args.text("text"),
                args.text("suffix")
            )
        }
    }

    #[test]
    fn bind_applies_defaults_and_rejects_missing_required() {
        let spec = Echo::new("echo").spec;

        let args = ToolArgs::bind(&spec, json!({"text": "hi"})).expect("bind");
        assert_eq!(args.text("suffix"), "!");
        assert_eq!(args.optional("prefix"), None);

        let error = ToolArgs::bind(&spec, json!({})).expect_err("text is required");
        assert!(matches!(error, ToolArgError::MissingArgument { name: "text", .. }));

        let error = ToolArgs::bind(&spec, json!({"text": 4})).expect_err("numbers are not text");
        assert_eq!(error, ToolArgError::WrongType { name: "text" });

        let error = ToolArgs::bind(&spec, json!("hi")).expect_err("arguments must be named");
        assert_eq!(error, ToolArgError::NotAnObject);
    }

    #[test]
    fn json_schema_lists_required_parameters_only() {
        let schema = Echo::new("Repeat the text").spec.json_schema();

        assert_eq!(schema["name"], "echo");
        assert_eq!(schema["description"], "Repeat the text");
        assert_eq!(schema["parameters"]["required"], json!(["text"]));
        assert_eq!(schema["parameters"]["properties"]["suffix"]["default"], "!");
        assert_eq!(schema["parameters"]["properties"]["prefix"]["type"], json!(["string", "null"]));
    }

    #[tokio::test]
    async fn invoke_answers_in_text_for_every_outcome() {
        let mut registry = ToolRegistry::new(AgentType::General);
        registry.register(Echo::new("echo"));

        assert_eq!(registry.invoke("echo", json!({"text": "hi", "prefix": ">"})).await, ">hi!");
        assert!(registry.invoke("echo", json!({})).await.contains("I still need the text"));
        assert!(registry.invoke("launch", json!({})).await.contains("no `launch` tool"));
    }

    #[test]
    fn duplicate_names_replace_in_place() {
        let mut registry = ToolRegistry::new(AgentType::General);
        registry.register(Echo::new("first"));
        registry.register(Echo::new("second"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("echo").map(|tool| tool.spec().description), Some("second"));
    }

    #[test]
    fn each_agent_type_gets_its_fixed_family() {
        let store = Arc::new(DemoStore::new());

        assert!(ToolRegistry::for_agent(AgentType::General, store.clone()).is_empty());
        assert_eq!(
            ToolRegistry::for_agent(AgentType::Scheduling, store.clone()).names(),
            vec!["check_availability", "book_appointment", "send_confirmation"]
        );
        assert_eq!(
            ToolRegistry::for_agent(AgentType::CustomerService, store.clone()).names(),
            vec![
                "search_knowledge_base",
                "create_ticket",
                "escalate_to_human",
                "check_service_status"
            ]
        );
        assert_eq!(
            ToolRegistry::for_agent(AgentType::Outbound, store).names(),
            vec![
                "log_call_outcome",
                "schedule_followup",
                "send_info_email",
                "answer_product_question"
            ]
        );
    }
}
