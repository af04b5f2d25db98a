use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Metadata for a single field ("node") of an archetype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub name: String,
    pub display_name: String,
    /// Collection or relationship nodes are complex; scalars and references
    /// are simple.
    pub complex: bool,
    /// Ordering position within the archetype.
    pub index: u32,
    pub read_only: bool,
    pub hidden: bool,
}

impl NodeDescriptor {
    pub fn simple(name: &str) -> Self {
        Self::new(name, false)
    }

    pub fn complex(name: &str) -> Self {
        Self::new(name, true)
    }

    fn new(name: &str, complex: bool) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name_for(name),
            complex,
            index: 0,
            read_only: false,
            hidden: false,
        }
    }

    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_name = display_name.to_string();
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// The runtime schema of a domain type, keyed by its short name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchetypeDescriptor {
    pub short_name: String,
    pub display_name: String,
    nodes: Vec<NodeDescriptor>,
}

impl ArchetypeDescriptor {
    /// Builds a descriptor whose node ordering follows `nodes`.
    pub fn new(short_name: &str, display_name: &str, nodes: Vec<NodeDescriptor>) -> Self {
        let nodes = nodes
            .into_iter()
            .enumerate()
            .map(|(index, mut node)| {
                node.index = u32::try_from(index).unwrap_or(u32::MAX);
                node
            })
            .collect();
        Self {
            short_name: short_name.to_string(),
            display_name: display_name.to_string(),
            nodes,
        }
    }

    /// All nodes, in ordering position.
    pub fn nodes(&self) -> &[NodeDescriptor] {
        &self.nodes
    }

    pub fn node(&self, name: &str) -> Option<&NodeDescriptor> {
        self.nodes.iter().find(|node| node.name == name)
    }
}

/// Resolves archetype descriptors by short name.
///
/// Lookups must be deterministic: the same short name always yields the same
/// descriptor with the same node ordering.
pub trait ArchetypeService {
    fn archetype(&self, short_name: &str) -> Option<&ArchetypeDescriptor>;
}

/// In-memory archetype service, optionally loaded from a YAML or TOML file.
#[derive(Debug, Clone, Default)]
pub struct ArchetypeRegistry {
    archetypes: BTreeMap<String, ArchetypeDescriptor>,
}

impl ArchetypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, descriptor: ArchetypeDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    pub fn insert(&mut self, descriptor: ArchetypeDescriptor) {
        self.archetypes
            .insert(descriptor.short_name.clone(), descriptor);
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read archetype registry {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let file: RegistryFile = match ext.as_str() {
            "yml" | "yaml" => serde_yaml::from_str(&contents).context("parse archetype registry")?,
            "toml" | "tml" => toml::from_str(&contents).context("parse archetype registry")?,
            _ => serde_yaml::from_str(&contents)
                .or_else(|_| toml::from_str(&contents))
                .context("parse archetype registry (yaml or toml)")?,
        };
        file.into_registry()
    }
}

impl ArchetypeService for ArchetypeRegistry {
    fn archetype(&self, short_name: &str) -> Option<&ArchetypeDescriptor> {
        self.archetypes.get(short_name)
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    archetypes: Vec<ArchetypeSpec>,
}

#[derive(Debug, Deserialize)]
struct ArchetypeSpec {
    short_name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    nodes: Vec<NodeSpec>,
}

#[derive(Debug, Deserialize)]
struct NodeSpec {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    complex: bool,
    #[serde(default)]
    read_only: bool,
    #[serde(default)]
    hidden: bool,
    /// Explicit ordering position; defaults to declaration order.
    #[serde(default)]
    index: Option<u32>,
}

impl RegistryFile {
    fn into_registry(self) -> anyhow::Result<ArchetypeRegistry> {
        if self.archetypes.is_empty() {
            anyhow::bail!("archetype registry must contain at least one archetype");
        }
        let mut registry = ArchetypeRegistry::new();
        for spec in self.archetypes {
            if registry.archetype(&spec.short_name).is_some() {
                anyhow::bail!("duplicate archetype {}", spec.short_name);
            }
            let mut seen: HashSet<&str> = HashSet::new();
            for node in &spec.nodes {
                if !seen.insert(node.name.as_str()) {
                    anyhow::bail!("duplicate node {} in archetype {}", node.name, spec.short_name);
                }
            }
            let mut nodes: Vec<NodeDescriptor> = spec
                .nodes
                .into_iter()
                .enumerate()
                .map(|(position, node)| NodeDescriptor {
                    display_name: node
                        .display_name
                        .unwrap_or_else(|| display_name_for(&node.name)),
                    index: node
                        .index
                        .unwrap_or_else(|| u32::try_from(position).unwrap_or(u32::MAX)),
                    name: node.name,
                    complex: node.complex,
                    read_only: node.read_only,
                    hidden: node.hidden,
                })
                .collect();
            // Stable, so equal positions keep declaration order.
            nodes.sort_by_key(|node| node.index);
            let display_name = spec
                .display_name
                .unwrap_or_else(|| spec.short_name.clone());
            registry.insert(ArchetypeDescriptor {
                short_name: spec.short_name,
                display_name,
                nodes,
            });
        }
        Ok(registry)
    }
}

/// Derives a display name from a camel-case node name, e.g. `firstName`
/// becomes `First Name`.
fn display_name_for(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i == 0 {
            result.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            result.push(' ');
            result.push(c);
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn loads_yaml_registry_in_declared_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("archetypes.yaml");
        let contents = r#"
archetypes:
  - short_name: party.patientpet
    display_name: Patient
    nodes:
      - name: name
      - name: species
      - name: identities
        complex: true
      - name: dateOfBirth
        display_name: Birthday
"#;
        fs::write(&path, contents).expect("write registry");
        let registry = ArchetypeRegistry::load(&path).expect("load");
        let patient = registry.archetype("party.patientpet").expect("patient");
        let names: Vec<&str> = patient.nodes().iter().map(|node| node.name.as_str()).collect();
        assert_eq!(names, vec!["name", "species", "identities", "dateOfBirth"]);
        let identities = patient.node("identities").expect("identities");
        assert!(identities.complex);
        assert_eq!(identities.display_name, "Identities");
        assert_eq!(patient.node("dateOfBirth").map(|n| n.display_name.as_str()), Some("Birthday"));
    }

    #[test]
    fn explicit_index_overrides_declaration_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("archetypes.toml");
        let contents = r#"
[[archetypes]]
short_name = "product.medication"

[[archetypes.nodes]]
name = "description"
index = 5

[[archetypes.nodes]]
name = "name"
index = 1
"#;
        fs::write(&path, contents).expect("write registry");
        let registry = ArchetypeRegistry::load(&path).expect("load");
        let product = registry.archetype("product.medication").expect("product");
        let names: Vec<&str> = product.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["name", "description"]);
        assert_eq!(product.display_name, "product.medication");
    }

    #[test]
    fn rejects_duplicate_nodes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("archetypes.yaml");
        let contents = r#"
archetypes:
  - short_name: party.customerperson
    nodes:
      - name: name
      - name: name
"#;
        fs::write(&path, contents).expect("write registry");
        let err = ArchetypeRegistry::load(&path).expect_err("duplicate node");
        assert!(err.to_string().contains("duplicate node name"));
    }

    #[test]
    fn rejects_empty_registry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("archetypes.yaml");
        fs::write(&path, "archetypes: []\n").expect("write registry");
        let err = ArchetypeRegistry::load(&path).expect_err("empty registry");
        assert_eq!(
            err.to_string(),
            "archetype registry must contain at least one archetype"
        );
    }

    #[test]
    fn rejects_duplicate_archetypes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("archetypes.yaml");
        let contents = r#"
archetypes:
  - short_name: party.customerperson
    nodes:
      - name: name
  - short_name: party.customerperson
    nodes:
      - name: lastName
"#;
        fs::write(&path, contents).expect("write registry");
        let err = ArchetypeRegistry::load(&path).expect_err("duplicate archetype");
        assert_eq!(err.to_string(), "duplicate archetype party.customerperson");
    }

    #[test]
    fn derives_display_names_from_camel_case() {
        assert_eq!(display_name_for("firstName"), "First Name");
        assert_eq!(display_name_for("id"), "Id");
    }
}
