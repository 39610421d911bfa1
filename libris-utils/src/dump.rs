//! Rendering catalog trees for inspection
use libris::tree::{Node, Tree};
use std::{fmt::Display, io::Write};

type Edge = (usize, usize);

struct NodeDescriptor {
    id: usize,
    leaf: bool,
    label: String,
}

struct TreeGraph {
    nodes: Vec<NodeDescriptor>,
    edges: Vec<Edge>,
}

fn keys_label<K: Display>(node: &Node<K>) -> String {
    node.keys()
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(" | ")
}

impl TreeGraph {
    fn new<K: Display>(tree: &Tree<K>) -> Self {
        let mut res = Self {
            nodes: Vec::new(),
            edges: Vec::new(),
        };
        if let Some(root) = tree.root() {
            res.add(root);
        }
        res
    }

    /// adds the subtree in pre-order, returning the id of `node`
    fn add<K: Display>(&mut self, node: &Node<K>) -> usize {
        let id = self.nodes.len();
        self.nodes.push(NodeDescriptor {
            id,
            leaf: node.is_leaf(),
            label: keys_label(node),
        });
        for child in node.children() {
            let child_id = self.add(child);
            self.edges.push((id, child_id));
        }
        id
    }
}

impl<'a> dot::Labeller<'a, usize, Edge> for TreeGraph {
    fn graph_id(&'a self) -> dot::Id<'a> {
        dot::Id::new("catalog").unwrap()
    }

    fn node_id(&'a self, n: &usize) -> dot::Id<'a> {
        dot::Id::new(format!("N{}", self.nodes[*n].id)).unwrap()
    }

    fn node_label(&'a self, n: &usize) -> dot::LabelText<'a> {
        dot::LabelText::label(self.nodes[*n].label.clone())
    }

    fn node_shape(&'a self, n: &usize) -> Option<dot::LabelText<'a>> {
        let shape = if self.nodes[*n].leaf { "circle" } else { "box" };
        Some(dot::LabelText::label(shape))
    }
}

impl<'a> dot::GraphWalk<'a, usize, Edge> for TreeGraph {
    fn nodes(&'a self) -> dot::Nodes<'a, usize> {
        (0..self.nodes.len()).collect()
    }

    fn edges(&'a self) -> dot::Edges<'a, Edge> {
        self.edges.iter().cloned().collect()
    }

    fn source(&'a self, edge: &Edge) -> usize {
        edge.0
    }

    fn target(&'a self, edge: &Edge) -> usize {
        edge.1
    }
}

/// Writes the tree as a graphviz graph. Branches are boxes, leaves are circles.
pub fn graph<K: Display>(tree: &Tree<K>, mut out: impl Write) -> anyhow::Result<()> {
    dot::render(&TreeGraph::new(tree), &mut out)?;
    Ok(())
}

fn text_node<K: Display>(node: &Node<K>, depth: usize, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{:indent$}[{}]", "", keys_label(node), indent = depth * 2)?;
    for child in node.children() {
        text_node(child, depth + 1, out)?;
    }
    Ok(())
}

/// Writes one line per node, children indented below their parent
pub fn text<K: Display>(tree: &Tree<K>, mut out: impl Write) -> std::io::Result<()> {
    match tree.root() {
        Some(root) => text_node(root, 0, &mut out),
        None => writeln!(out, "(empty)"),
    }
}
