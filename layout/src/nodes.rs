//! Classification of nodes into the simple (grid) and complex (tab)
//! sections of a layout.

use crate::archetype::NodeDescriptor;
use crate::object::IMObject;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Simple,
    Complex,
}

impl NodeKind {
    pub fn of(node: &NodeDescriptor) -> Self {
        if node.complex {
            NodeKind::Complex
        } else {
            NodeKind::Simple
        }
    }
}

/// Assigns each node to exactly one section, or drops it.
pub trait NodeClassifier {
    /// Returns the section `node` renders in, or `None` to leave it out.
    fn classify(&self, node: &NodeDescriptor, object: &IMObject) -> Option<NodeKind>;

    /// Reorders a classified section in place.
    fn arrange(&self, _kind: NodeKind, _nodes: &mut Vec<&NodeDescriptor>) {}
}

/// Uses the descriptor's structural flag and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralClassifier;

impl NodeClassifier for StructuralClassifier {
    fn classify(&self, node: &NodeDescriptor, _: &IMObject) -> Option<NodeKind> {
        Some(NodeKind::of(node))
    }
}

/// Declarative classification: which structural kinds are included, which
/// names move between sections, which are excluded, and how sections are
/// ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchetypeNodes {
    all_simple: bool,
    all_complex: bool,
    simple: Vec<String>,
    complex: Vec<String>,
    exclude: HashSet<String>,
    exclude_if_empty: HashSet<String>,
    fold_complex: bool,
    first: Option<String>,
    second: Option<String>,
    order: Vec<(String, String)>,
}

impl Default for ArchetypeNodes {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl ArchetypeNodes {
    pub fn new(all_simple: bool, all_complex: bool) -> Self {
        Self {
            all_simple,
            all_complex,
            simple: Vec::new(),
            complex: Vec::new(),
            exclude: HashSet::new(),
            exclude_if_empty: HashSet::new(),
            fold_complex: false,
            first: None,
            second: None,
            order: Vec::new(),
        }
    }

    /// Every node renders in the grid; no tab section is produced.
    pub fn all_simple() -> Self {
        Self {
            fold_complex: true,
            ..Self::new(true, false)
        }
    }

    /// Renders the named nodes in the grid, whatever their structural kind.
    pub fn simple<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.simple.extend(names.into_iter().map(Into::into));
        self
    }

    /// Renders the named nodes as tabs, whatever their structural kind.
    pub fn complex<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.complex.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn exclude_if_empty<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_if_empty
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn first(mut self, name: &str) -> Self {
        self.first = Some(name.to_string());
        self
    }

    pub fn second(mut self, name: &str) -> Self {
        self.second = Some(name.to_string());
        self
    }

    /// Places `after` immediately after `node`, when both are present.
    pub fn order(mut self, node: &str, after: &str) -> Self {
        self.order.push((node.to_string(), after.to_string()));
        self
    }

    fn forced(&self, name: &str) -> Option<NodeKind> {
        // Complex wins when a name is listed in both.
        if self.complex.iter().any(|n| n == name) {
            Some(NodeKind::Complex)
        } else if self.fold_complex || self.simple.iter().any(|n| n == name) {
            Some(NodeKind::Simple)
        } else {
            None
        }
    }
}

impl NodeClassifier for ArchetypeNodes {
    fn classify(&self, node: &NodeDescriptor, object: &IMObject) -> Option<NodeKind> {
        if self.exclude.contains(&node.name) {
            return None;
        }
        if self.exclude_if_empty.contains(&node.name) && object.is_empty(&node.name) {
            return None;
        }
        match (self.forced(&node.name), NodeKind::of(node)) {
            (Some(kind), _) => Some(kind),
            (None, NodeKind::Simple) if self.all_simple => Some(NodeKind::Simple),
            (None, NodeKind::Complex) if self.all_complex => Some(NodeKind::Complex),
            _ => None,
        }
    }

    fn arrange(&self, _kind: NodeKind, nodes: &mut Vec<&NodeDescriptor>) {
        if let Some(first) = &self.first {
            move_to(first, 0, nodes);
        }
        if let Some(second) = &self.second {
            move_to(second, 1, nodes);
        }
        for (node, after) in &self.order {
            if let Some(index) = position(node, nodes) {
                move_to(after, index + 1, nodes);
            }
        }
    }
}

fn position(name: &str, nodes: &[&NodeDescriptor]) -> Option<usize> {
    nodes.iter().position(|node| node.name == name)
}

fn move_to(name: &str, index: usize, nodes: &mut Vec<&NodeDescriptor>) {
    let Some(pos) = position(name, nodes) else {
        return;
    };
    if pos == index {
        return;
    }
    let node = nodes.remove(pos);
    let target = if pos > index { index } else { index - 1 };
    nodes.insert(target.min(nodes.len()), node);
}
