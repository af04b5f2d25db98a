//! Predicates deciding which nodes of an object are rendered.

use crate::archetype::NodeDescriptor;
use crate::context::LayoutContext;
use crate::object::IMObject;
use std::collections::HashSet;

/// Decides whether a node is rendered. Filters must be free of side effects.
pub trait NodeFilter {
    fn include(&self, node: &NodeDescriptor, object: &IMObject, context: &LayoutContext<'_>)
    -> bool;
}

impl<T: NodeFilter + ?Sized> NodeFilter for Box<T> {
    fn include(
        &self,
        node: &NodeDescriptor,
        object: &IMObject,
        context: &LayoutContext<'_>,
    ) -> bool {
        (**self).include(node, object, context)
    }
}

/// Excludes nodes by name.
#[derive(Debug, Clone, Default)]
pub struct NamedNodeFilter {
    exclude: HashSet<String>,
}

impl NamedNodeFilter {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclude: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl NodeFilter for NamedNodeFilter {
    fn include(&self, node: &NodeDescriptor, _: &IMObject, _: &LayoutContext<'_>) -> bool {
        !self.exclude.contains(&node.name)
    }
}

/// Excludes nodes flagged hidden in their descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct HiddenNodeFilter;

impl NodeFilter for HiddenNodeFilter {
    fn include(&self, node: &NodeDescriptor, _: &IMObject, _: &LayoutContext<'_>) -> bool {
        !node.hidden
    }
}

/// Excludes read-only nodes, unless the layout is a read-only view.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOnlyNodeFilter;

impl NodeFilter for ReadOnlyNodeFilter {
    fn include(&self, node: &NodeDescriptor, _: &IMObject, context: &LayoutContext<'_>) -> bool {
        !context.is_edit() || !node.read_only
    }
}

/// Adapts a closure over `(node, object)` into a filter. The closure may
/// inspect object state to hide nodes conditionally.
pub struct FnNodeFilter<F>(pub F);

impl<F> NodeFilter for FnNodeFilter<F>
where
    F: Fn(&NodeDescriptor, &IMObject) -> bool,
{
    fn include(&self, node: &NodeDescriptor, object: &IMObject, _: &LayoutContext<'_>) -> bool {
        (self.0)(node, object)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chain {
    /// Every filter must include the node.
    All,
    /// At least one filter must include the node.
    Any,
}

/// Combines filters with logical AND or OR. An empty chain includes
/// everything.
pub struct ChainedNodeFilter<'a> {
    mode: Chain,
    filters: Vec<Box<dyn NodeFilter + 'a>>,
}

impl<'a> ChainedNodeFilter<'a> {
    pub fn all() -> Self {
        Self {
            mode: Chain::All,
            filters: Vec::new(),
        }
    }

    pub fn any() -> Self {
        Self {
            mode: Chain::Any,
            filters: Vec::new(),
        }
    }

    pub fn with(mut self, filter: impl NodeFilter + 'a) -> Self {
        self.filters.push(Box::new(filter));
        self
    }
}

impl NodeFilter for ChainedNodeFilter<'_> {
    fn include(
        &self,
        node: &NodeDescriptor,
        object: &IMObject,
        context: &LayoutContext<'_>,
    ) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        match self.mode {
            Chain::All => self
                .filters
                .iter()
                .all(|filter| filter.include(node, object, context)),
            Chain::Any => self
                .filters
                .iter()
                .any(|filter| filter.include(node, object, context)),
        }
    }
}
