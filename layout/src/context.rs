use crate::archetype::ArchetypeService;
use crate::filter::NodeFilter;

/// Per-render settings shared by a layout pass and everything it calls.
pub struct LayoutContext<'a> {
    archetypes: &'a dyn ArchetypeService,
    default_filter: Option<Box<dyn NodeFilter + 'a>>,
    edit: bool,
}

impl<'a> LayoutContext<'a> {
    pub fn new(archetypes: &'a dyn ArchetypeService) -> Self {
        Self {
            archetypes,
            default_filter: None,
            edit: true,
        }
    }

    /// A context for read-only display. Factories are asked for read-only
    /// components for every node.
    pub fn view(archetypes: &'a dyn ArchetypeService) -> Self {
        Self {
            edit: false,
            ..Self::new(archetypes)
        }
    }

    pub fn with_default_filter(mut self, filter: impl NodeFilter + 'a) -> Self {
        self.default_filter = Some(Box::new(filter));
        self
    }

    pub fn archetypes(&self) -> &'a dyn ArchetypeService {
        self.archetypes
    }

    pub fn default_filter(&self) -> Option<&(dyn NodeFilter + 'a)> {
        self.default_filter.as_deref()
    }

    pub fn is_edit(&self) -> bool {
        self.edit
    }
}

impl std::fmt::Debug for LayoutContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutContext")
            .field("default_filter", &self.default_filter.is_some())
            .field("edit", &self.edit)
            .finish()
    }
}
