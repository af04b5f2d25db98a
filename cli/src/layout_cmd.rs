use anyhow::Context;
use anyhow::Result;
use clap::Args;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;
use vpms_layout::ArchetypeRegistry;
use vpms_layout::DefaultComponentFactory;
use vpms_layout::IMObject;
use vpms_layout::LayoutContext;
use vpms_layout::LayoutStrategy;
use vpms_layout::filter::NamedNodeFilter;

#[derive(Debug, Args)]
pub struct LayoutArgs {
    /// Archetype registry (YAML or TOML).
    #[arg(long, value_name = "FILE")]
    pub archetypes: PathBuf,

    /// Object to render (JSON or YAML).
    #[arg(long, value_name = "FILE")]
    pub object: PathBuf,

    /// Node to leave out of the layout. May be repeated.
    #[arg(long = "exclude", value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Render every field read-only.
    #[arg(long)]
    pub view: bool,
}

pub fn execute(args: LayoutArgs) -> Result<()> {
    let registry = ArchetypeRegistry::load(&args.archetypes)?;
    let object = load_object(&args.object)?;
    debug!(
        archetypes = registry.len(),
        archetype = %object.archetype,
        view = args.view,
        "rendering object"
    );

    let mut context = if args.view {
        LayoutContext::view(&registry)
    } else {
        LayoutContext::new(&registry)
    };
    if !args.exclude.is_empty() {
        context = context.with_default_filter(NamedNodeFilter::new(&args.exclude));
    }

    let layout = LayoutStrategy::default().apply(&object, &DefaultComponentFactory, &context)?;
    print!("{}", layout.root);
    if !layout.focus.is_empty() {
        let names: Vec<&str> = layout.focus.iter().map(|handle| handle.0.as_str()).collect();
        println!("focus: {}", names.join(", "));
    }
    if let Some(initial) = &layout.initial_focus {
        println!("initial focus: {}", initial.0);
    }
    Ok(())
}

fn load_object(path: &Path) -> Result<IMObject> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read object {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let object = if is_json {
        serde_json::from_str(&contents).context("parse object json")?
    } else {
        serde_yaml::from_str(&contents).context("parse object yaml")?
    };
    Ok(object)
}
