use anyhow::Context;
use anyhow::Result;
use clap::Args;
use clap::Subcommand;
use std::io::BufRead;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;
use tracing::info;
use vpms_workflow::ArtifactDir;
use vpms_workflow::ContextSlot;
use vpms_workflow::Reference;
use vpms_workflow::RunReport;
use vpms_workflow::Step;
use vpms_workflow::Task;
use vpms_workflow::TaskContext;
use vpms_workflow::TaskError;
use vpms_workflow::TaskInput;
use vpms_workflow::WorkflowDefinition;
use vpms_workflow::WorkflowError;

#[derive(Debug, Args)]
pub struct WorkflowCli {
    #[command(subcommand)]
    pub action: WorkflowSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum WorkflowSubcommand {
    /// Run a workflow definition, reading answers from stdin.
    Run(WorkflowRunArgs),
    /// Display the report of the last run of a workflow.
    Status(WorkflowStatusArgs),
}

#[derive(Debug, Args)]
pub struct WorkflowRunArgs {
    /// Path to the workflow definition (YAML or TOML).
    #[arg(value_name = "DEFINITION")]
    pub definition: PathBuf,

    /// Initial context value, as `slot=archetype:id[:name]`. May be repeated.
    #[arg(long = "context", value_name = "SLOT=REF", value_parser = parse_context_arg)]
    pub context: Vec<(ContextSlot, Reference)>,

    /// Directory to store run reports. Defaults to `.vpms/runs` next to the
    /// definition.
    #[arg(long = "artifacts-dir", value_name = "DIR")]
    pub artifacts_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct WorkflowStatusArgs {
    /// Path to the workflow definition (YAML or TOML).
    #[arg(value_name = "DEFINITION")]
    pub definition: PathBuf,

    /// Directory that stores run reports. Defaults to `.vpms/runs` next to
    /// the definition.
    #[arg(long = "artifacts-dir", value_name = "DIR")]
    pub artifacts_dir: Option<PathBuf>,
}

pub fn execute(cli: WorkflowCli) -> Result<()> {
    match cli.action {
        WorkflowSubcommand::Run(run_args) => {
            let stdin = std::io::stdin();
            run(run_args, &mut stdin.lock())
        }
        WorkflowSubcommand::Status(status_args) => status(status_args),
    }
}

fn run(args: WorkflowRunArgs, input: &mut impl BufRead) -> Result<()> {
    let definition = WorkflowDefinition::load(&args.definition)?;
    let artifacts = ArtifactDir::resolve(&definition.definition_dir(), args.artifacts_dir);
    info!(
        workflow = %definition.workflow_name(),
        definition = %args.definition.display(),
        "running workflow definition"
    );
    let mut context = TaskContext::new();
    for (slot, reference) in args.context {
        debug!(%slot, %reference, "initial context value");
        context.set(slot, Some(reference));
    }

    let mut workflow = definition
        .build()
        .with_error_handler(|workflow: &str, err: &WorkflowError| {
            eprintln!("workflow {workflow} failed: {err}");
        });
    let mut step = workflow.start(&mut context)?;
    while step == Step::Suspended {
        let prompt = workflow.prompt().unwrap_or_else(|| "continue? (ok, cancel)".to_string());
        let answer = ask(&prompt, input)?;
        debug!(%answer, "resuming workflow");
        step = match workflow.resume(answer, &mut context) {
            Ok(step) => step,
            Err(err @ TaskError::UnexpectedInput { .. }) => {
                eprintln!("{err}");
                Step::Suspended
            }
            Err(err) => return Err(err.into()),
        };
    }

    let report = workflow.report(&context);
    artifacts.ensure_root()?;
    let path = artifacts.report_file(&report.workflow_name);
    report.save(&path)?;
    info!(path = %path.display(), outcome = ?report.outcome, "saved run report");
    print_report(&report, &path);
    Ok(())
}

/// Prompts until a valid answer is read. End of input cancels.
fn ask(prompt: &str, input: &mut impl BufRead) -> Result<TaskInput> {
    loop {
        println!("{}", textwrap::fill(prompt, 72));
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line).context("failed to read answer")? == 0 {
            println!();
            return Ok(TaskInput::Cancel);
        }
        match parse_answer(&line) {
            Ok(answer) => return Ok(answer),
            Err(err) => eprintln!("{err}"),
        }
    }
}

fn parse_answer(line: &str) -> Result<TaskInput> {
    let line = line.trim();
    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match command.to_ascii_lowercase().as_str() {
        "ok" => Ok(TaskInput::Ok),
        "skip" => Ok(TaskInput::Skip),
        "cancel" => Ok(TaskInput::Cancel),
        "select" => Ok(TaskInput::Select(rest.parse()?)),
        _ => anyhow::bail!("unknown answer {line:?}, expected ok, skip, cancel or select archetype:id"),
    }
}

fn parse_context_arg(arg: &str) -> Result<(ContextSlot, Reference)> {
    let (slot, reference) = arg
        .split_once('=')
        .with_context(|| format!("invalid context {arg:?}, expected slot=archetype:id[:name]"))?;
    let slot: ContextSlot = slot
        .trim()
        .parse()
        .with_context(|| format!("unknown context slot {slot:?}"))?;
    Ok((slot, reference.parse()?))
}

fn status(args: WorkflowStatusArgs) -> Result<()> {
    let definition = WorkflowDefinition::load(&args.definition)?;
    let artifacts = ArtifactDir::resolve(&definition.definition_dir(), args.artifacts_dir);
    let path = artifacts.report_file(&definition.workflow_name());
    if !path.exists() {
        println!(
            "No run report found for workflow definition {}",
            args.definition.display()
        );
        return Ok(());
    }
    let report = RunReport::load(&path)?;
    print_report(&report, &path);
    Ok(())
}

fn print_report(report: &RunReport, path: &Path) {
    println!("Workflow: {}", report.workflow_name);
    println!("Outcome: {:?}", report.outcome);
    println!("Report file: {}", path.display());
    for task in &report.tasks {
        println!(
            "- {:<24} {:<10} {}",
            task.name,
            format!("{:?}", task.state),
            task.note.as_deref().unwrap_or("")
        );
    }
    for (slot, reference) in report.context.slots() {
        println!("  {slot}: {reference}");
    }
    for object in report.context.objects() {
        println!("  {}: {object}", object.archetype);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_answers() {
        assert_eq!(parse_answer("ok\n").expect("ok"), TaskInput::Ok);
        assert_eq!(parse_answer("  Skip ").expect("skip"), TaskInput::Skip);
        assert_eq!(
            parse_answer("select party.patientpet:5:Fido").expect("select"),
            TaskInput::Select(Reference::new("party.patientpet", 5).named("Fido"))
        );
        assert!(parse_answer("select").is_err());
        assert!(parse_answer("maybe").is_err());
    }

    #[test]
    fn parses_context_args() {
        let (slot, reference) =
            parse_context_arg("stock_location=party.organisationStockLocation:3").expect("parse");
        assert_eq!(slot, ContextSlot::StockLocation);
        assert_eq!(reference, Reference::new("party.organisationStockLocation", 3));
        assert!(parse_context_arg("kennel=party.x:1").is_err());
        assert!(parse_context_arg("customer").is_err());
    }

    #[test]
    fn end_of_input_cancels() {
        let mut input = std::io::Cursor::new(Vec::new());
        assert_eq!(ask("select a customer", &mut input).expect("ask"), TaskInput::Cancel);
    }
}
