//! WASM entry points for browser use.
//!
//! These are stateless checks over a stored graph JSON. The editor calls them
//! to mirror what the session would say without round-tripping its state.

use wasm_bindgen::prelude::*;

use crate::model::types::EdgeCandidate;
use crate::persist;
use crate::types::{TypeTag, compatible_targets};
use crate::validate;

/// Validate a stored workflow graph: import, then the validation report and
/// node config checks.
/// Returns a JSON array of `{code, message, node_id}` objects.
#[wasm_bindgen]
pub fn validate_workflow(json: &str) -> JsValue {
    let result = validate_workflow_inner(json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn validate_workflow_inner(json: &str) -> Vec<IssueDto> {
    let imported = match persist::import_json(json) {
        Ok(i) => i,
        Err(errors) => {
            return errors
                .into_iter()
                .map(|e| IssueDto {
                    code: e.code.to_string(),
                    message: e.message,
                    node_id: e.node_id,
                })
                .collect();
        }
    };

    let mut issues: Vec<IssueDto> = imported
        .warnings
        .into_iter()
        .map(|w| IssueDto {
            code: w.reason.code().to_string(),
            message: format!("Edge '{}' dropped: {}", w.edge_id, w.reason),
            node_id: None,
        })
        .collect();

    issues.extend(validate::validate_graph(&imported.graph).into_iter().map(|i| IssueDto {
        code: i.kind.code().to_string(),
        message: i.message,
        node_id: i.node_id,
    }));
    issues.extend(validate::validate_configs(&imported.graph).into_iter().map(|i| IssueDto {
        code: i.code.to_string(),
        message: i.message,
        node_id: Some(i.node_id),
    }));
    issues
}

/// Check whether a connection would be accepted by the graph.
/// Returns `null` when it would, or a `{code, message}` object.
#[wasm_bindgen]
pub fn check_connection(graph_json: &str, candidate_json: &str) -> JsValue {
    match check_connection_inner(graph_json, candidate_json) {
        None => JsValue::NULL,
        Some(dto) => serde_wasm_bindgen::to_value(&dto).unwrap_or(JsValue::NULL),
    }
}

fn check_connection_inner(graph_json: &str, candidate_json: &str) -> Option<RejectionDto> {
    let imported = match persist::import_json(graph_json) {
        Ok(i) => i,
        Err(errors) => {
            return errors.into_iter().next().map(|e| RejectionDto {
                code: e.code.to_string(),
                message: e.to_string(),
            });
        }
    };
    let candidate = match serde_json::from_str::<EdgeCandidate>(candidate_json) {
        Ok(c) => c,
        Err(e) => {
            return Some(RejectionDto {
                code: "P001".into(),
                message: format!("Failed to parse connection JSON: {}", e),
            });
        }
    };

    validate::can_connect(&candidate, &imported.graph)
        .err()
        .map(|reason| RejectionDto {
            code: reason.code().to_string(),
            message: reason.to_string(),
        })
}

/// Target types a port of `source` type may feed, e.g. `"int"` gives
/// `["int", "float", "Any"]`. Unknown type names give an empty array.
#[wasm_bindgen]
pub fn compatible_types(source: &str) -> JsValue {
    serde_wasm_bindgen::to_value(&compatible_types_inner(source)).unwrap_or(JsValue::NULL)
}

fn compatible_types_inner(source: &str) -> Vec<&'static str> {
    source
        .parse::<TypeTag>()
        .map(|tag| compatible_targets(tag).iter().map(TypeTag::as_str).collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize)]
struct IssueDto {
    code: String,
    message: String,
    node_id: Option<String>,
}

#[derive(Debug, serde::Serialize)]
struct RejectionDto {
    code: String,
    message: String,
}
