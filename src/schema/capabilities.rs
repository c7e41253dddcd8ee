//! Per-node-type behaviour, looked up by tag.
//! SYNC NOTE: Match arms here must track `NodeTypeTag` in `model/types.rs`.

use serde_json::{Value, json};

use crate::model::types::*;
use crate::types::TypeTag;

/// What the editor core needs to know about one node type.
pub struct NodeCapabilities {
    pub tag: NodeTypeTag,
    /// Key under which the bound catalog id is persisted, for types that are
    /// backed by an external reference.
    pub reference_key: Option<&'static str>,
    pub default_label: &'static str,
    /// Schema available without a catalog round trip.
    pub default_schema: fn(&NodeConfig) -> NodeSchema,
    /// Type-specific configuration problems, as user-facing messages.
    pub validate_config: fn(&Node) -> Vec<String>,
}

impl NodeCapabilities {
    pub fn is_reference_backed(&self) -> bool {
        self.reference_key.is_some()
    }
}

pub fn capabilities(tag: NodeTypeTag) -> &'static NodeCapabilities {
    match tag {
        NodeTypeTag::Table => &TABLE,
        NodeTypeTag::Procedure => &PROCEDURE,
        NodeTypeTag::Value => &VALUE,
        NodeTypeTag::Api => &API,
        NodeTypeTag::Output => &OUTPUT,
    }
}

// =============================================================================
// TABLE
// =============================================================================

static TABLE: NodeCapabilities = NodeCapabilities {
    tag: NodeTypeTag::Table,
    reference_key: Some("tableId"),
    default_label: "Table",
    default_schema: table_schema,
    validate_config: validate_table,
};

fn table_schema(_: &NodeConfig) -> NodeSchema {
    NodeSchema::new(vec![], vec![Port::new("output", "Table", TypeTag::Table)])
}

fn validate_table(node: &Node) -> Vec<String> {
    match &node.bound_reference {
        None => vec!["Table node requires a table".into()],
        Some(_) => vec![],
    }
}

// =============================================================================
// PROCEDURE
// =============================================================================

static PROCEDURE: NodeCapabilities = NodeCapabilities {
    tag: NodeTypeTag::Procedure,
    reference_key: Some("procedureId"),
    default_label: "Procedure",
    default_schema: procedure_schema,
    validate_config: validate_procedure,
};

/// Procedure ports come from the procedure's signature; nothing is known
/// until one is selected.
fn procedure_schema(_: &NodeConfig) -> NodeSchema {
    NodeSchema::empty()
}

fn validate_procedure(node: &Node) -> Vec<String> {
    let mut errors = Vec::new();
    if node.bound_reference.is_none() {
        errors.push("Procedure node requires a procedure".into());
    }
    if let Some(mapping) = node.config.get("parameterMapping") {
        if !mapping.is_object() {
            errors.push("Procedure parameter mapping must be an object".into());
        }
    }
    errors
}

// =============================================================================
// VALUE
// =============================================================================

static VALUE: NodeCapabilities = NodeCapabilities {
    tag: NodeTypeTag::Value,
    reference_key: None,
    default_label: "Value",
    default_schema: value_schema,
    validate_config: validate_value,
};

const VALUE_TYPES: [(&str, TypeTag); 4] = [
    ("string", TypeTag::Str),
    ("number", TypeTag::Float),
    ("boolean", TypeTag::Bool),
    ("json", TypeTag::Any),
];

fn value_type(config: &NodeConfig) -> &str {
    config
        .get("valueType")
        .and_then(Value::as_str)
        .unwrap_or("string")
}

fn value_schema(config: &NodeConfig) -> NodeSchema {
    let data_type = VALUE_TYPES
        .iter()
        .find(|(name, _)| *name == value_type(config))
        .map(|(_, t)| *t)
        .unwrap_or(TypeTag::Any);
    NodeSchema::new(vec![], vec![Port::new("output", "Value", data_type)])
}

fn validate_value(node: &Node) -> Vec<String> {
    let kind = value_type(&node.config);
    if !VALUE_TYPES.iter().any(|(name, _)| *name == kind) {
        return vec![format!("Unknown value type '{}'", kind)];
    }

    // Values are entered as text; check they read as the declared type.
    let Some(raw) = node.config.get("value") else {
        return vec![];
    };
    let text = match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let ok = match kind {
        "number" => text.trim().parse::<f64>().is_ok(),
        "boolean" => matches!(text.trim(), "true" | "false"),
        "json" => serde_json::from_str::<Value>(&text).is_ok(),
        _ => true,
    };
    if ok {
        vec![]
    } else {
        vec![format!("Value '{}' is not a valid {}", text, kind)]
    }
}

// =============================================================================
// API
// =============================================================================

static API: NodeCapabilities = NodeCapabilities {
    tag: NodeTypeTag::Api,
    reference_key: None,
    default_label: "API Call",
    default_schema: api_schema,
    validate_config: validate_api,
};

const API_TYPES: [&str; 4] = ["rest", "graphql", "soap", "webhook"];
const API_METHODS: [&str; 4] = ["GET", "POST", "PUT", "DELETE"];

fn api_schema(_: &NodeConfig) -> NodeSchema {
    NodeSchema::new(
        vec![Port::new("params", "Parameters", TypeTag::Any).with_default(json!({}))],
        vec![Port::new("output", "Response", TypeTag::Any)],
    )
}

fn validate_api(node: &Node) -> Vec<String> {
    let mut errors = Vec::new();
    let config = &node.config;

    let api_type = config.get("apiType").and_then(Value::as_str).unwrap_or("rest");
    if !API_TYPES.contains(&api_type) {
        errors.push(format!("Unknown API type '{}'", api_type));
    }
    let method = config.get("method").and_then(Value::as_str).unwrap_or("GET");
    if !API_METHODS.contains(&method) {
        errors.push(format!("Invalid HTTP method '{}'", method));
    }
    let endpoint = config.get("endpoint").and_then(Value::as_str).unwrap_or("");
    if endpoint.trim().is_empty() {
        errors.push("API endpoint must not be empty".into());
    }
    errors
}

// =============================================================================
// OUTPUT
// =============================================================================

static OUTPUT: NodeCapabilities = NodeCapabilities {
    tag: NodeTypeTag::Output,
    reference_key: None,
    default_label: "Output",
    default_schema: output_schema,
    validate_config: validate_output,
};

/// Output actions and the config fields each one reads.
const OUTPUT_ACTIONS: [(&str, &[&str]); 5] = [
    ("save_table", &["name", "project"]),
    ("display", &["name"]),
    ("export_csv", &["filename"]),
    ("export_excel", &["filename"]),
    ("export_pdf", &["filename", "template"]),
];

fn output_schema(_: &NodeConfig) -> NodeSchema {
    NodeSchema::new(vec![Port::new("input", "Input", TypeTag::Any).required()], vec![])
}

fn validate_output(node: &Node) -> Vec<String> {
    let config = &node.config;
    let action = config
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or("save_table");
    let Some((_, fields)) = OUTPUT_ACTIONS.iter().find(|(name, _)| *name == action) else {
        return vec![format!("Unknown output action '{}'", action)];
    };

    fields
        .iter()
        .filter(|f| matches!(**f, "name" | "filename"))
        .filter(|f| {
            config
                .get(**f)
                .and_then(Value::as_str)
                .is_some_and(|v| v.trim().is_empty())
        })
        .map(|f| format!("Output {} must not be empty", f))
        .collect()
}
