//! Veil scenario runner
//!
//! Replays a JSON scenario of modal interactions against an in-memory
//! document, then prints the modal stack, the scroll lock and the tree.
//!
//! Run with: cargo run --bin veil -- demos/nested.json

mod scenario;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use serde::Serialize;
use veil_common::diagnostics::{self, Report};
use veil_dom::{NodeId, NodeSnapshot, write_tree};

use scenario::{Runner, Scenario, describe};

/// Veil: replay modal dialog scenarios headlessly
#[derive(Parser, Debug)]
#[command(name = "veil")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Replay a scenario and print the final tree
    veil demos/nested.json

    # Machine-readable final state
    veil --json demos/nested.json

    # Only the final state, no step log or diagnostics echo
    veil -q demos/nested.json
"#)]
struct Cli {
    /// Scenario file (JSON)
    #[arg(value_name = "SCENARIO")]
    path: PathBuf,

    /// Print the final state as JSON
    #[arg(long)]
    json: bool,

    /// Suppress the step log and diagnostics echo
    #[arg(short, long)]
    quiet: bool,
}

/// Final state, as printed by `--json`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    stack: Vec<String>,
    modals: Vec<ModalSummary>,
    scroll_locked: bool,
    diagnostics: Vec<DiagnosticSummary>,
    tree: Option<NodeSnapshot>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModalSummary {
    name: String,
    id: u64,
    state: String,
    usable: bool,
    backdrop: Option<usize>,
}

#[derive(Serialize)]
struct DiagnosticSummary {
    severity: String,
    component: String,
    message: String,
}

impl From<&Report> for DiagnosticSummary {
    fn from(report: &Report) -> Self {
        Self {
            severity: report.severity.to_string(),
            component: report.component.clone(),
            message: report.message.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.path)
        .with_context(|| format!("reading {}", cli.path.display()))?;
    let scenario: Scenario = serde_json::from_str(&source)
        .with_context(|| format!("parsing scenario {}", cli.path.display()))?;

    diagnostics::set_echo(!cli.quiet);

    let runner = Runner::new(&scenario)?;
    for (index, step) in scenario.steps.iter().enumerate() {
        if !cli.quiet && !cli.json {
            let label = format!("[{}]", index + 1);
            println!("{} {}", label.dimmed(), describe(step));
        }
        runner
            .apply(step)
            .with_context(|| format!("step {} ({})", index + 1, describe(step)))?;
    }

    let reports = diagnostics::take_reports();
    if cli.json {
        print_json(&runner, &reports)?;
    } else {
        print_text(&runner, &reports);
    }
    Ok(())
}

fn stack_names(runner: &Runner) -> Vec<String> {
    runner
        .host()
        .open_modals()
        .into_iter()
        .map(|id| {
            runner
                .name_of(id)
                .map_or_else(|| id.to_string(), str::to_string)
        })
        .collect()
}

fn print_text(runner: &Runner, reports: &[Report]) {
    let host = runner.host();

    println!("\n{}", "=== Modal Stack ===".bold());
    let stack = stack_names(runner);
    if stack.is_empty() {
        println!("(empty)");
    }
    for (depth, name) in stack.iter().enumerate().rev() {
        println!("  {depth}: {name}");
    }

    println!("\n{}", "=== Modals ===".bold());
    for (name, modal) in runner.modals() {
        println!("  {name} {}: {}", modal.id(), modal.state());
    }

    println!("\n{}", "=== Scroll Lock ===".bold());
    let lock = host.scroll_lock();
    match lock.target() {
        Some(target) => println!(
            "engaged on node {} ({} acquired, {} released)",
            target.0,
            lock.acquisitions(),
            lock.releases()
        ),
        None => println!(
            "released ({} acquired, {} released)",
            lock.acquisitions(),
            lock.releases()
        ),
    }

    if !reports.is_empty() {
        println!("\n{}", "=== Diagnostics ===".bold());
        for report in reports {
            println!("  - {} [{}] {}", report.severity, report.component, report.message);
        }
    }

    println!("\n{}", "=== DOM Tree ===".bold());
    let mut out = String::new();
    write_tree(&host.document().tree(), NodeId::ROOT, 0, &mut out);
    print!("{out}");
}

fn print_json(runner: &Runner, reports: &[Report]) -> Result<()> {
    let host = runner.host();
    let summary = Summary {
        stack: stack_names(runner),
        modals: runner
            .modals()
            .iter()
            .map(|(name, modal)| ModalSummary {
                name: name.clone(),
                id: modal.id().id(),
                state: modal.state().to_string(),
                usable: modal.is_usable(),
                backdrop: modal.backdrop().map(|n| n.0),
            })
            .collect(),
        scroll_locked: host.is_scroll_locked(),
        diagnostics: reports.iter().map(DiagnosticSummary::from).collect(),
        tree: NodeSnapshot::capture(&host.document().tree(), NodeId::ROOT),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
