use std::sync::Arc;

use callflow_agent::{DemoStore, ToolRegistry};
use callflow_core::AgentType;
use serde_json::{Map, Value};

/// Tool schemas keyed by agent type, in registration order.
pub fn run(agent: Option<AgentType>) -> String {
    let agent_types = match agent {
        Some(agent_type) => vec![agent_type],
        None => AgentType::ALL.to_vec(),
    };

    let store = Arc::new(DemoStore::new());
    let mut listing = Map::new();
    for agent_type in agent_types {
        let registry = ToolRegistry::for_agent(agent_type, store.clone());
        listing.insert(agent_type.as_str().to_string(), Value::Array(registry.json_schemas()));
    }

    serde_json::to_string_pretty(&Value::Object(listing))
        .unwrap_or_else(|error| format!("{{\"error\":\"tool listing failed: {error}\"}}"))
}
