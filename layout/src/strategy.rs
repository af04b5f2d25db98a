use crate::archetype::ArchetypeDescriptor;
use crate::archetype::NodeDescriptor;
use crate::component::Component;
use crate::component::ComponentFactory;
use crate::component::ComponentState;
use crate::component::FocusHandle;
use crate::component::GridRow;
use crate::component::Tab;
use crate::component::TabbedPane;
use crate::context::LayoutContext;
use crate::error::LayoutError;
use crate::error::Result;
use crate::filter::NodeFilter;
use crate::nodes::ArchetypeNodes;
use crate::nodes::NodeClassifier;
use crate::nodes::NodeKind;
use crate::object::IMObject;
use crate::object::Property;
use crate::render::FieldRenderer;
use crate::render::Renderer;
use std::collections::HashSet;
use tracing::debug;

/// A rendered object.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Holds the simple-node grid (if any) followed by the tab pane (if any).
    pub root: Component,
    /// Focusable components, in render order.
    pub focus: Vec<FocusHandle>,
    /// The component to focus first: the first focusable field with no
    /// value, else the first focusable field.
    pub initial_focus: Option<FocusHandle>,
}

/// Renders objects from their archetype metadata.
///
/// Specialised layouts are built by swapping the classifier (which section a
/// node renders in), the renderer (how a node becomes a component) and the
/// filter (which nodes render at all).
pub struct LayoutStrategy<C = ArchetypeNodes, R = Renderer> {
    classifier: C,
    renderer: R,
    filter: Option<Box<dyn NodeFilter>>,
}

impl Default for LayoutStrategy {
    fn default() -> Self {
        Self::new(ArchetypeNodes::default(), Renderer::default())
    }
}

impl<C: NodeClassifier, R: FieldRenderer> LayoutStrategy<C, R> {
    pub fn new(classifier: C, renderer: R) -> Self {
        Self {
            classifier,
            renderer,
            filter: None,
        }
    }

    /// Sets a filter applied in addition to the context's default filter.
    pub fn with_filter(mut self, filter: impl NodeFilter + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn set_filter(&mut self, filter: Option<Box<dyn NodeFilter>>) {
        self.filter = filter;
    }

    /// Renders `object` into a single container.
    pub fn apply(
        &self,
        object: &IMObject,
        factory: &dyn ComponentFactory,
        context: &LayoutContext<'_>,
    ) -> Result<Layout> {
        let archetype = context
            .archetypes()
            .archetype(&object.archetype)
            .ok_or_else(|| LayoutError::UnknownArchetype(object.archetype.clone()))?;
        let (simple, complex) = self.sections(archetype, object, context);
        debug!(
            archetype = %archetype.short_name,
            simple = simple.len(),
            complex = complex.len(),
            "laying out object"
        );

        let rendered: HashSet<&str> = simple
            .iter()
            .chain(&complex)
            .map(|node| node.name.as_str())
            .collect();
        let mut states = Vec::new();
        let mut children = Vec::new();
        if let Some(grid) = self.simple_layout(archetype, object, &simple, &rendered, factory, context, &mut states)? {
            children.push(grid);
        }
        if let Some(tabs) = self.complex_layout(object, &complex, factory, context, &mut states) {
            children.push(tabs);
        }

        let focus: Vec<FocusHandle> = states.iter().filter_map(|(_, handle)| handle.clone()).collect();
        let initial_focus = states
            .iter()
            .find(|(empty, handle)| *empty && handle.is_some())
            .and_then(|(_, handle)| handle.clone())
            .or_else(|| focus.first().cloned());
        Ok(Layout {
            root: Component::Column(children),
            focus,
            initial_focus,
        })
    }

    /// Splits the archetype's nodes into the filtered, ordered simple and
    /// complex sections. Each node lands in at most one section.
    pub fn sections<'d>(
        &self,
        archetype: &'d ArchetypeDescriptor,
        object: &IMObject,
        context: &LayoutContext<'_>,
    ) -> (Vec<&'d NodeDescriptor>, Vec<&'d NodeDescriptor>) {
        let mut simple = Vec::new();
        let mut complex = Vec::new();
        for node in archetype.nodes() {
            if !self.include(node, object, context) {
                continue;
            }
            match self.classifier.classify(node, object) {
                Some(NodeKind::Simple) => simple.push(node),
                Some(NodeKind::Complex) => complex.push(node),
                None => {}
            }
        }
        self.classifier.arrange(NodeKind::Simple, &mut simple);
        self.classifier.arrange(NodeKind::Complex, &mut complex);
        (simple, complex)
    }

    fn include(&self, node: &NodeDescriptor, object: &IMObject, context: &LayoutContext<'_>) -> bool {
        let default = context
            .default_filter()
            .is_none_or(|filter| filter.include(node, object, context));
        default
            && self
                .filter
                .as_ref()
                .is_none_or(|filter| filter.include(node, object, context))
    }

    #[allow(clippy::too_many_arguments)]
    fn simple_layout(
        &self,
        archetype: &ArchetypeDescriptor,
        object: &IMObject,
        nodes: &[&NodeDescriptor],
        rendered: &HashSet<&str>,
        factory: &dyn ComponentFactory,
        context: &LayoutContext<'_>,
        states: &mut Vec<(bool, Option<FocusHandle>)>,
    ) -> Result<Option<Component>> {
        let mut rows = Vec::with_capacity(nodes.len());
        for node in nodes {
            let property = Property::of(object, node);
            let state = self.renderer.render(&property, object, factory, context);
            states.push((property.is_empty(), state.focus.clone()));
            rows.push(row(&node.display_name, state));
        }
        // Computed rows may stand in for nodes that are not rendered.
        for derived in self.renderer.derived(object, context) {
            if rendered.contains(derived.state.property.as_str()) {
                return Err(LayoutError::DuplicateField {
                    archetype: archetype.short_name.clone(),
                    field: derived.state.property,
                });
            }
            states.push((false, derived.state.focus.clone()));
            rows.push(row(&derived.label, derived.state));
        }
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(Component::Grid(rows)))
    }

    fn complex_layout(
        &self,
        object: &IMObject,
        nodes: &[&NodeDescriptor],
        factory: &dyn ComponentFactory,
        context: &LayoutContext<'_>,
        states: &mut Vec<(bool, Option<FocusHandle>)>,
    ) -> Option<Component> {
        if nodes.is_empty() {
            return None;
        }
        let tabs = nodes
            .iter()
            .map(|node| {
                let property = Property::of(object, node);
                let state = self.renderer.render(&property, object, factory, context);
                states.push((property.is_empty(), state.focus.clone()));
                Tab {
                    label: node.display_name.clone(),
                    content: state.component,
                }
            })
            .collect();
        Some(Component::Tabs(TabbedPane {
            tabs,
            selected: Some(0),
        }))
    }
}

fn row(label: &str, state: ComponentState) -> GridRow {
    GridRow {
        label: label.to_string(),
        component: state.component,
    }
}
