#![deny(unsafe_code)]
//! Maple Evolve demo: evolve a Python `fib` implementation.
//!
//! Seeds a JSON program store with an empty `fib`, then runs generations of
//! propose → patch → evaluate → commit. Proposals come from an offline patch
//! rotation, or from Gemini with `--gemini` (needs `GEMINI_API_KEY`).
//! Candidates run under `python3` in a subprocess sandbox.

mod offline;

use anyhow::Context;
use clap::Parser;
use maple_evolve_engine::{
    GenerationController, GenerationReport, GeminiTransport, LlmProposer, Proposer, RunConfig,
};
use maple_evolve_evaluator::{PythonHarness, SubprocessSandbox, TestSuite, TestSuiteEvaluator};
use maple_evolve_store::{JsonFileSnapshot, ProgramDatabase};
use maple_evolve_types::ProgramRecord;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use offline::{catalog_proposer, FIB_SEED, FIB_TASK};

/// Evolve a Fibonacci implementation with SEARCH/REPLACE patches.
#[derive(Parser)]
#[command(name = "maple-evolve-demo")]
#[command(version)]
struct Args {
    /// Program store file; created and seeded if missing
    #[arg(long, default_value = "fib.json")]
    store: PathBuf,

    /// Run configuration (JSON); defaults to the demo preset
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    generations: Option<u64>,

    /// Proposals per generation
    #[arg(long)]
    children: Option<usize>,

    /// Sampling seed
    #[arg(long)]
    seed: Option<u64>,

    /// Propose with Gemini instead of the offline rotation
    #[arg(long)]
    gemini: bool,

    /// Python interpreter used by the sandbox
    #[arg(long, default_value = "python3")]
    python: String,
}

fn section(title: &str) {
    println!();
    println!(" ── {} {}", title, "─".repeat(56usize.saturating_sub(title.len())));
}

fn ok(msg: &str) {
    println!("   [OK]  {}", msg);
}

fn info(msg: &str) {
    println!("   [--]  {}", msg);
}

fn warn(msg: &str) {
    println!("   [!!]  {}", msg);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(e) = run(Args::parse()).await {
        eprintln!();
        eprintln!("   [FATAL]  {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    section("Configuration");
    let mut config = match &args.config {
        Some(path) => RunConfig::from_json_file(path)?,
        None => RunConfig::demo(),
    };
    if let Some(generations) = args.generations {
        config = config.with_generations(generations);
    }
    if let Some(children) = args.children {
        config = config.with_children(children);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    config.validate()?;
    info(&format!(
        "generations={}  children={}  inspirations={}  seed={:?}",
        config.generations, config.children_per_generation, config.inspirations, config.seed
    ));

    section("Program store");
    let database = ProgramDatabase::open_or_seed(
        JsonFileSnapshot::new(&args.store),
        Some(FIB_TASK.to_string()),
        FIB_SEED,
    )
    .with_context(|| format!("cannot open program store {}", args.store.display()))?;
    ok(&format!(
        "{} programs loaded from {}",
        database.store().len(),
        args.store.display()
    ));
    let task = database.store().task().unwrap_or(FIB_TASK).to_string();

    let proposer: Arc<dyn Proposer> = if args.gemini {
        let transport = GeminiTransport::from_env()?;
        info(&format!("proposer: gemini ({})", transport.model()));
        Arc::new(LlmProposer::new(Arc::new(transport)).with_task(task))
    } else {
        info("proposer: offline patch rotation");
        Arc::new(catalog_proposer())
    };
    let evaluator = Arc::new(
        TestSuiteEvaluator::new(
            TestSuite::fibonacci(),
            SubprocessSandbox::new(PythonHarness::new().with_interpreter(args.python.clone())),
        )
        .with_timeout(config.evaluation_timeout()),
    );

    let mut controller = GenerationController::new(config.clone(), database, proposer, evaluator)?;
    let stop = controller.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.store(true, Ordering::SeqCst);
        }
    });

    section("Evolution");
    while controller.generation() < config.generations {
        if controller.is_stopped() {
            warn("interrupted; committed generations are saved");
            break;
        }
        let report = controller.step().await?;
        print_report(&report);
    }

    section("Result");
    let metrics = controller.metrics();
    info(&format!(
        "committed={}  no-ops={}  proposal failures={}  aborted evaluations={}",
        metrics.records_committed,
        metrics.noops_filtered,
        metrics.proposal_failures,
        metrics.evaluations_aborted
    ));
    match controller.store().best(&config.primary_metric) {
        Some(best) => print_best(best, &config.primary_metric),
        None => warn("no evaluated program yet"),
    }
    Ok(())
}

fn print_report(report: &GenerationReport) {
    let label = format!("Generation {}", report.generation + 1);
    if report.committed.is_empty() {
        warn(&format!(
            "{}  nothing committed  (no-ops={} failures={})",
            label, report.noops_filtered, report.proposal_failures
        ));
    } else {
        ok(&format!(
            "{}  parent={}  committed={}  no-ops={}",
            label,
            report.parent_id.short(),
            report.committed.len(),
            report.noops_filtered
        ));
    }
}

fn print_best(best: &ProgramRecord, metric: &str) {
    ok(&format!(
        "best program {}  {}={}",
        best.id.short(),
        metric,
        best.metric(metric).unwrap_or_default()
    ));
    println!();
    for line in best.code.lines() {
        println!("      {}", line);
    }
    if let Some(logs) = best.score.logs.as_deref() {
        println!();
        for line in logs.lines() {
            info(line);
        }
    }
}
