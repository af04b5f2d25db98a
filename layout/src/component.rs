//! The rendered component tree and the factory seam that produces its
//! leaves.

use crate::context::LayoutContext;
use crate::object::IMObject;
use crate::object::Property;
use serde_json::Value;
use std::fmt;

/// A node of the rendered UI tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// Children stacked vertically.
    Column(Vec<Component>),
    /// Label/control pairs, one row per field.
    Grid(Vec<GridRow>),
    Tabs(TabbedPane),
    Label(String),
    Field(Field),
    /// A collection rendered as a list of item summaries.
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub label: String,
    pub component: Component,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabbedPane {
    pub tabs: Vec<Tab>,
    pub selected: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub label: String,
    pub content: Component,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Reference,
}

/// An input or display control bound to a single node.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub node: String,
    pub kind: FieldKind,
    pub text: String,
    pub read_only: bool,
}

impl Component {
    pub fn grid_rows(&self) -> Option<&[GridRow]> {
        match self {
            Component::Grid(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn tabs(&self) -> Option<&TabbedPane> {
        match self {
            Component::Tabs(pane) => Some(pane),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Component] {
        match self {
            Component::Column(children) => children,
            _ => &[],
        }
    }
}

/// Identifies a component that participates in focus traversal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FocusHandle(pub String);

/// The result of rendering one node.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentState {
    pub component: Component,
    pub focus: Option<FocusHandle>,
    /// Name of the property the component was created for.
    pub property: String,
}

impl ComponentState {
    pub fn new(property: &str, component: Component) -> Self {
        Self {
            component,
            focus: None,
            property: property.to_string(),
        }
    }

    pub fn focusable(mut self) -> Self {
        self.focus = Some(FocusHandle(self.property.clone()));
        self
    }
}

/// Creates a component for a single node of an object.
///
/// Implementations may call back into a layout strategy to render nested
/// objects.
pub trait ComponentFactory {
    fn create(
        &self,
        property: &Property<'_>,
        object: &IMObject,
        context: &LayoutContext<'_>,
    ) -> ComponentState;

    /// Creates a display-only component.
    fn create_read_only(
        &self,
        property: &Property<'_>,
        _object: &IMObject,
        _context: &LayoutContext<'_>,
    ) -> ComponentState {
        ComponentState::new(property.name(), Component::Label(property.text()))
    }
}

/// Maps node values to plain fields and collections to lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultComponentFactory;

impl ComponentFactory for DefaultComponentFactory {
    fn create(
        &self,
        property: &Property<'_>,
        object: &IMObject,
        context: &LayoutContext<'_>,
    ) -> ComponentState {
        if property.descriptor.complex {
            let items = match property.value {
                Some(Value::Array(items)) => items.iter().map(summary).collect(),
                Some(Value::Null) | None => Vec::new(),
                Some(other) => vec![summary(other)],
            };
            return ComponentState::new(property.name(), Component::List(items));
        }
        if !context.is_edit() || property.descriptor.read_only {
            return self.create_read_only(property, object, context);
        }
        let kind = match property.value {
            Some(Value::Bool(_)) => FieldKind::Boolean,
            Some(Value::Number(_)) => FieldKind::Number,
            Some(Value::Object(_)) => FieldKind::Reference,
            _ => FieldKind::Text,
        };
        let field = Field {
            node: property.name().to_string(),
            kind,
            text: property.text(),
            read_only: false,
        };
        ComponentState::new(property.name(), Component::Field(field)).focusable()
    }
}

fn summary(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_component(f, self, 0)
    }
}

fn write_component(f: &mut fmt::Formatter<'_>, component: &Component, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    match component {
        Component::Column(children) => {
            writeln!(f, "{indent}column")?;
            for child in children {
                write_component(f, child, depth + 1)?;
            }
        }
        Component::Grid(rows) => {
            writeln!(f, "{indent}grid")?;
            for row in rows {
                writeln!(f, "{indent}  {}:", row.label)?;
                write_component(f, &row.component, depth + 2)?;
            }
        }
        Component::Tabs(pane) => {
            writeln!(f, "{indent}tabs")?;
            for (i, tab) in pane.tabs.iter().enumerate() {
                let marker = if pane.selected == Some(i) { "*" } else { " " };
                writeln!(f, "{indent} {marker}[{}]", tab.label)?;
                write_component(f, &tab.content, depth + 2)?;
            }
        }
        Component::Label(text) => writeln!(f, "{indent}{text}")?,
        Component::Field(field) => {
            let access = if field.read_only { "ro" } else { "rw" };
            writeln!(f, "{indent}<{:?} {access}> {}", field.kind, field.text)?;
        }
        Component::List(items) => {
            if items.is_empty() {
                writeln!(f, "{indent}(none)")?;
            }
            for item in items {
                writeln!(f, "{indent}- {item}")?;
            }
        }
    }
    Ok(())
}
