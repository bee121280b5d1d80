//! Small clinical-concept graphs attached to some patient records.

use crate::{FixtureError, FixtureResult};
use hith_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A clinical concept (for example a SNOMED term) shown in the concept graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConceptNode {
    pub id: NonEmptyText,
    pub name: NonEmptyText,
}

/// Concept nodes plus undirected edges between them.
///
/// Every edge endpoint is guaranteed to name a node in `nodes`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConceptGraphData {
    pub nodes: Vec<ConceptNode>,
    pub edges: Vec<(NonEmptyText, NonEmptyText)>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ConceptGraphWire {
    #[serde(default)]
    pub nodes: Vec<ConceptNodeWire>,
    #[serde(default)]
    pub edges: Vec<(String, String)>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ConceptNodeWire {
    pub id: String,
    pub name: String,
}

pub(crate) fn wire_to_domain(wire: ConceptGraphWire, path: &str) -> FixtureResult<ConceptGraphData> {
    let mut seen = HashSet::new();
    let mut nodes = Vec::with_capacity(wire.nodes.len());

    for (i, n) in wire.nodes.into_iter().enumerate() {
        let node_path = format!("{path}.nodes[{i}]");
        let id = NonEmptyText::new(&n.id)
            .map_err(|e| FixtureError::translation(format!("{node_path}.id"), e.to_string()))?;
        let name = NonEmptyText::new(&n.name)
            .map_err(|e| FixtureError::translation(format!("{node_path}.name"), e.to_string()))?;

        if !seen.insert(id.clone()) {
            return Err(FixtureError::translation(
                format!("{node_path}.id"),
                format!("duplicate concept id '{id}'"),
            ));
        }
        nodes.push(ConceptNode { id, name });
    }

    let edges = wire
        .edges
        .into_iter()
        .enumerate()
        .map(|(i, (a, b))| -> FixtureResult<_> {
            let resolve = |end: &str| {
                NonEmptyText::new(end)
                    .ok()
                    .filter(|id| seen.contains(id))
                    .ok_or_else(|| {
                        FixtureError::translation(
                            format!("{path}.edges[{i}]"),
                            format!("edge references unknown concept '{end}'"),
                        )
                    })
            };
            Ok((resolve(&a)?, resolve(&b)?))
        })
        .collect::<FixtureResult<Vec<_>>>()?;

    Ok(ConceptGraphData { nodes, edges })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, name: &str) -> ConceptNodeWire {
        ConceptNodeWire {
            id: id.into(),
            name: name.into(),
        }
    }

    #[test]
    fn translates_graph() {
        let wire = ConceptGraphWire {
            nodes: vec![node("C1", "Pneumonia"), node("C2", "Antibiotics")],
            edges: vec![("C1".into(), "C2".into())],
        };

        let graph = wire_to_domain(wire, "g").expect("valid graph");
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges[0].0.as_str(), "C1");
        assert_eq!(graph.nodes[1].name.as_str(), "Antibiotics");
    }

    #[test]
    fn rejects_dangling_edge() {
        let wire = ConceptGraphWire {
            nodes: vec![node("C1", "Pneumonia")],
            edges: vec![("C1".into(), "C9".into())],
        };

        let err = wire_to_domain(wire, "g").expect_err("dangling edge");
        match err {
            FixtureError::Translation { path, message } => {
                assert_eq!(path, "g.edges[0]");
                assert!(message.contains("C9"));
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_node_ids() {
        let wire = ConceptGraphWire {
            nodes: vec![node("C1", "Pneumonia"), node("C1", "Sepsis")],
            edges: vec![],
        };

        assert!(wire_to_domain(wire, "g").is_err());
    }
}
