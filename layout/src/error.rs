use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The archetype service has no descriptor for the object's type. This
    /// is a configuration error and is never retried.
    #[error("no archetype descriptor for {0}")]
    UnknownArchetype(String),

    #[error("derived field {field} clashes with a node of {archetype}")]
    DuplicateField { archetype: String, field: String },
}

pub type Result<T> = std::result::Result<T, LayoutError>;
