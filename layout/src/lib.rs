//! Metadata-driven rendering of archetype objects into component trees.
//!
//! A [`LayoutStrategy`] asks the [`ArchetypeService`] for an object's node
//! descriptors, filters and classifies them, then lays the simple nodes out
//! in a grid and the complex nodes in a tab pane, using a
//! [`ComponentFactory`] for each field.

mod archetype;
mod component;
mod context;
mod error;
pub mod filter;
mod nodes;
mod object;
mod render;
mod strategy;

pub use archetype::ArchetypeDescriptor;
pub use archetype::ArchetypeRegistry;
pub use archetype::ArchetypeService;
pub use archetype::NodeDescriptor;
pub use component::Component;
pub use component::ComponentFactory;
pub use component::ComponentState;
pub use component::DefaultComponentFactory;
pub use component::Field;
pub use component::FieldKind;
pub use component::FocusHandle;
pub use component::GridRow;
pub use component::Tab;
pub use component::TabbedPane;
pub use context::LayoutContext;
pub use error::LayoutError;
pub use error::Result;
pub use filter::NodeFilter;
pub use nodes::ArchetypeNodes;
pub use nodes::NodeClassifier;
pub use nodes::NodeKind;
pub use nodes::StructuralClassifier;
pub use object::IMObject;
pub use object::Property;
pub use render::DerivedRow;
pub use render::FieldRenderer;
pub use render::Renderer;
pub use strategy::Layout;
pub use strategy::LayoutStrategy;
