use crate::component::Component;
use crate::component::ComponentFactory;
use crate::component::ComponentState;
use crate::context::LayoutContext;
use crate::object::IMObject;
use crate::object::Property;
use std::collections::HashSet;

/// Turns a single field into a component.
pub trait FieldRenderer {
    fn render(
        &self,
        property: &Property<'_>,
        object: &IMObject,
        factory: &dyn ComponentFactory,
        context: &LayoutContext<'_>,
    ) -> ComponentState {
        factory.create(property, object, context)
    }

    /// Display-only rows appended after the simple fields. These are not
    /// node descriptors, so node filters never see them.
    fn derived(&self, _object: &IMObject, _context: &LayoutContext<'_>) -> Vec<DerivedRow> {
        Vec::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub label: String,
    pub state: ComponentState,
}

type Compute = Box<dyn Fn(&IMObject) -> String>;

struct DerivedField {
    name: String,
    label: String,
    compute: Compute,
}

/// Delegates to the factory, except for nodes marked read-only here, and
/// appends any derived fields.
#[derive(Default)]
pub struct Renderer {
    read_only: HashSet<String>,
    derived: Vec<DerivedField>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders the named nodes with the factory's read-only component.
    pub fn read_only<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.read_only.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds a computed, display-only row.
    pub fn computed<F>(mut self, name: &str, label: &str, compute: F) -> Self
    where
        F: Fn(&IMObject) -> String + 'static,
    {
        self.derived.push(DerivedField {
            name: name.to_string(),
            label: label.to_string(),
            compute: Box::new(compute),
        });
        self
    }

    pub fn derived_names(&self) -> impl Iterator<Item = &str> {
        self.derived.iter().map(|field| field.name.as_str())
    }
}

impl FieldRenderer for Renderer {
    fn render(
        &self,
        property: &Property<'_>,
        object: &IMObject,
        factory: &dyn ComponentFactory,
        context: &LayoutContext<'_>,
    ) -> ComponentState {
        if self.read_only.contains(property.name()) {
            factory.create_read_only(property, object, context)
        } else {
            factory.create(property, object, context)
        }
    }

    fn derived(&self, object: &IMObject, _context: &LayoutContext<'_>) -> Vec<DerivedRow> {
        self.derived
            .iter()
            .map(|field| DerivedRow {
                label: field.label.clone(),
                state: ComponentState::new(&field.name, Component::Label((field.compute)(object))),
            })
            .collect()
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("read_only", &self.read_only)
            .field("derived", &self.derived_names().collect::<Vec<_>>())
            .finish()
    }
}
