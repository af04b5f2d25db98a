pub mod layout_cmd;
pub mod workflow_cmd;

use clap::Parser;
use clap::Subcommand;
use layout_cmd::LayoutArgs;
use workflow_cmd::WorkflowCli;

/// Renders archetype objects and runs front-desk workflows.
#[derive(Debug, Parser)]
#[command(name = "vpms", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render an object from its archetype metadata.
    Layout(LayoutArgs),
    /// Run or inspect a workflow definition.
    Workflow(WorkflowCli),
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Layout(args) => layout_cmd::execute(args),
        Command::Workflow(workflow) => workflow_cmd::execute(workflow),
    }
}
