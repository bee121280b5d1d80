//! Concept-graph layout for the knowledge-graph panel.
//!
//! The graph is small (a handful of clinical concepts) and rebuilt on every render. Layout
//! is a seeded Fruchterman-Reingold spring embedding, so the same graph and seed always
//! produce the same picture. Positions are centred on the origin and scaled into [-1, 1].

use crate::constants::LAYOUT_ITERATIONS;
use hith_fixture::{ConceptGraphData, ConceptNode};
use petgraph::graph::{NodeIndex, UnGraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashMap;

/// Graphs larger than this still render, but are outside what the panel was designed for.
const COMFORTABLE_NODE_COUNT: usize = 10;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionedNode {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    /// Hover text, `"<id>: <name>"`.
    pub hover: String,
}

/// A straight line between two positioned nodes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EdgeSegment {
    pub source: String,
    pub target: String,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GraphLayout {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<EdgeSegment>,
}

/// Build an undirected graph whose node weights borrow the concept nodes.
pub fn build_graph(data: &ConceptGraphData) -> UnGraph<&ConceptNode, ()> {
    let mut graph = UnGraph::new_undirected();
    let mut index: HashMap<&str, NodeIndex> = HashMap::with_capacity(data.nodes.len());

    for node in &data.nodes {
        index.insert(node.id.as_str(), graph.add_node(node));
    }
    for (a, b) in &data.edges {
        if let (Some(&ia), Some(&ib)) = (index.get(a.as_str()), index.get(b.as_str())) {
            graph.update_edge(ia, ib, ());
        }
    }

    graph
}

/// Lay out a concept graph with the given seed.
pub fn layout(data: &ConceptGraphData, seed: u64) -> GraphLayout {
    let graph = build_graph(data);
    let n = graph.node_count();
    if n > COMFORTABLE_NODE_COUNT {
        tracing::warn!("concept graph has {n} nodes; layout may be cluttered");
    }

    let positions = spring_layout(&graph, seed, LAYOUT_ITERATIONS);

    let nodes = graph
        .node_indices()
        .map(|ix| {
            let node = graph[ix];
            let [x, y] = positions[ix.index()];
            PositionedNode {
                id: node.id.to_string(),
                name: node.name.to_string(),
                x,
                y,
                hover: format!("{}: {}", node.id, node.name),
            }
        })
        .collect();

    let edges = graph
        .edge_indices()
        .filter_map(|e| graph.edge_endpoints(e))
        .map(|(a, b)| {
            let [x0, y0] = positions[a.index()];
            let [x1, y1] = positions[b.index()];
            EdgeSegment {
                source: graph[a].id.to_string(),
                target: graph[b].id.to_string(),
                x0,
                y0,
                x1,
                y1,
            }
        })
        .collect();

    GraphLayout { nodes, edges }
}

/// Fruchterman-Reingold positions indexed by `NodeIndex::index()`.
fn spring_layout<N>(graph: &UnGraph<N, ()>, seed: u64, iterations: usize) -> Vec<[f64; 2]> {
    let n = graph.node_count();
    match n {
        0 => return Vec::new(),
        1 => return vec![[0.0, 0.0]],
        _ => {}
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut pos: Vec<[f64; 2]> = (0..n).map(|_| [rng.gen::<f64>(), rng.gen::<f64>()]).collect();

    let adjacent: Vec<Vec<bool>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    i != j
                        && graph
                            .find_edge(NodeIndex::new(i), NodeIndex::new(j))
                            .is_some()
                })
                .collect()
        })
        .collect();

    // optimal distance between nodes
    let k = (1.0 / n as f64).sqrt();
    let extent = |axis: usize| {
        let (lo, hi) = pos
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p[axis]), hi.max(p[axis])));
        hi - lo
    };
    let mut temperature = extent(0).max(extent(1)) * 0.1;
    let cooling = temperature / (iterations as f64 + 1.0);

    for _ in 0..iterations {
        let mut moved = 0.0;
        let mut next = pos.clone();

        for i in 0..n {
            let mut disp = [0.0f64; 2];
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = pos[i][0] - pos[j][0];
                let dy = pos[i][1] - pos[j][1];
                let dist = (dx * dx + dy * dy).sqrt().max(0.01);
                let attraction = if adjacent[i][j] { dist / k } else { 0.0 };
                let force = k * k / (dist * dist) - attraction;
                disp[0] += dx * force;
                disp[1] += dy * force;
            }

            let mut length = (disp[0] * disp[0] + disp[1] * disp[1]).sqrt();
            if length < 0.01 {
                length = 0.1;
            }
            let step = [disp[0] * temperature / length, disp[1] * temperature / length];
            next[i][0] += step[0];
            next[i][1] += step[1];
            moved += (step[0] * step[0] + step[1] * step[1]).sqrt();
        }

        pos = next;
        temperature -= cooling;
        if moved / (n as f64) < 1e-4 {
            break;
        }
    }

    rescale(&mut pos);
    pos
}

/// Centre on the origin and scale so the largest coordinate magnitude is 1.
fn rescale(pos: &mut [[f64; 2]]) {
    let n = pos.len() as f64;
    for axis in 0..2 {
        let mean = pos.iter().map(|p| p[axis]).sum::<f64>() / n;
        for p in pos.iter_mut() {
            p[axis] -= mean;
        }
    }

    let lim = pos
        .iter()
        .flat_map(|p| p.iter())
        .fold(0.0f64, |acc, v| acc.max(v.abs()));
    if lim > 0.0 {
        for p in pos.iter_mut() {
            p[0] /= lim;
            p[1] /= lim;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hith_types::NonEmptyText;

    fn text(s: &str) -> NonEmptyText {
        NonEmptyText::new(s).expect("non-empty")
    }

    fn graph(nodes: &[(&str, &str)], edges: &[(&str, &str)]) -> ConceptGraphData {
        ConceptGraphData {
            nodes: nodes
                .iter()
                .map(|(id, name)| ConceptNode {
                    id: text(id),
                    name: text(name),
                })
                .collect(),
            edges: edges.iter().map(|(a, b)| (text(a), text(b))).collect(),
        }
    }

    fn sample() -> ConceptGraphData {
        graph(
            &[
                ("C1", "Pneumonia"),
                ("C2", "Antibiotics"),
                ("C3", "Oxygen therapy"),
                ("C4", "COPD"),
            ],
            &[("C1", "C2"), ("C1", "C3"), ("C3", "C4")],
        )
    }

    #[test]
    fn builds_undirected_graph() {
        let data = sample();
        let g = build_graph(&data);
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 3);
        assert!(g.find_edge(NodeIndex::new(1), NodeIndex::new(0)).is_some());
    }

    #[test]
    fn duplicate_edges_collapse() {
        let data = graph(&[("A", "a"), ("B", "b")], &[("A", "B"), ("B", "A")]);
        assert_eq!(build_graph(&data).edge_count(), 1);
    }

    #[test]
    fn layout_is_deterministic_for_a_seed() {
        let data = sample();
        assert_eq!(layout(&data, 42), layout(&data, 42));
    }

    #[test]
    fn different_seeds_move_nodes() {
        let data = sample();
        assert_ne!(layout(&data, 42).nodes, layout(&data, 7).nodes);
    }

    #[test]
    fn positions_are_scaled_into_unit_box() {
        let result = layout(&sample(), 42);
        assert!(result
            .nodes
            .iter()
            .all(|n| n.x.abs() <= 1.0 + 1e-9 && n.y.abs() <= 1.0 + 1e-9));

        let max = result
            .nodes
            .iter()
            .map(|n| n.x.abs().max(n.y.abs()))
            .fold(0.0f64, f64::max);
        assert!((max - 1.0).abs() < 1e-9);
    }

    #[test]
    fn edges_join_node_positions() {
        let result = layout(&sample(), 42);
        let pos: HashMap<_, _> = result
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), (n.x, n.y)))
            .collect();

        assert_eq!(result.edges.len(), 3);
        for e in &result.edges {
            assert_eq!(pos[e.source.as_str()], (e.x0, e.y0));
            assert_eq!(pos[e.target.as_str()], (e.x1, e.y1));
        }
    }

    #[test]
    fn hover_text_names_the_concept() {
        let result = layout(&sample(), 42);
        assert_eq!(result.nodes[3].hover, "C4: COPD");
    }

    #[test]
    fn trivial_graphs() {
        assert_eq!(layout(&graph(&[], &[]), 42), GraphLayout::default());

        let single = layout(&graph(&[("C1", "Sepsis")], &[]), 42);
        assert_eq!((single.nodes[0].x, single.nodes[0].y), (0.0, 0.0));
    }
}
