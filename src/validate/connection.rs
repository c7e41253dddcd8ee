//! Acceptance check for a proposed edge.

use crate::error::RejectionReason;
use crate::model::graph::GraphModel;
use crate::model::types::EdgeCandidate;
use crate::types::is_compatible;

/// Decide whether `candidate` may be added to `graph`.
///
/// Checks run in a fixed order and stop at the first failure: endpoints,
/// ports, self-loop, occupied input, type compatibility.
pub fn can_connect(candidate: &EdgeCandidate, graph: &GraphModel) -> Result<(), RejectionReason> {
    let (Some(source), Some(target)) = (
        graph.node(&candidate.source_node),
        graph.node(&candidate.target_node),
    ) else {
        return Err(RejectionReason::EndpointMissing);
    };

    let (Some(output), Some(input)) = (
        source.schema.output(&candidate.source_port),
        target.schema.input(&candidate.target_port),
    ) else {
        return Err(RejectionReason::PortMissing);
    };

    if source.id == target.id {
        return Err(RejectionReason::SelfLoop);
    }

    // Inputs are single-consumer.
    if graph
        .edge_into(&candidate.target_node, &candidate.target_port)
        .is_some()
    {
        return Err(RejectionReason::InputAlreadyConnected);
    }

    if !is_compatible(output.data_type, input.data_type) {
        return Err(RejectionReason::TypeMismatch(output.data_type, input.data_type));
    }

    Ok(())
}

/// Decide whether a stored edge may be brought back into `graph`.
///
/// Same as [`can_connect`], except that a port missing from the current schema
/// is not a refusal: the edge is restored and reported as dangling until the
/// schema grows the port again. Self-loops and occupied inputs are still
/// refused; types can only be checked when both ports exist.
pub fn can_restore(candidate: &EdgeCandidate, graph: &GraphModel) -> Result<(), RejectionReason> {
    match can_connect(candidate, graph) {
        Err(RejectionReason::PortMissing) => {
            if candidate.source_node == candidate.target_node {
                return Err(RejectionReason::SelfLoop);
            }
            if graph
                .edge_into(&candidate.target_node, &candidate.target_port)
                .is_some()
            {
                return Err(RejectionReason::InputAlreadyConnected);
            }
            Ok(())
        }
        other => other,
    }
}
