use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use accident_factors::error::RemovalError;
use accident_factors::ranking::DEFAULT_TOP_K;
use accident_factors::render::export_to_graphvis;
use accident_factors::session::{RemovalReport, Session};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Centrality analysis of construction accident factors",
    long_about = None
)]
struct Cli {
    /// Cleaned accident dataset (CSV).
    #[arg(default_value = "translated_file.csv")]
    data: PathBuf,

    /// Simulate removing this factor. May be repeated; each removal starts
    /// from the full graph.
    #[arg(short, long = "remove", value_name = "LABEL")]
    removals: Vec<String>,

    /// Read factor labels from stdin, one per line, and simulate each.
    #[arg(short, long)]
    interactive: bool,

    /// Print every factor label with its type and exit.
    #[arg(long)]
    list_nodes: bool,

    /// Entries per ranking.
    #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Emit JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Write the last simulated graph (or the base graph) as Graphviz DOT.
    #[arg(long, value_name = "PATH")]
    dot: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("FACTORS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "accident_factors=debug,info"
        } else {
            "accident_factors=info,warn"
        })
    });

    let format = env::var("FACTORS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

/// Run one removal and print its report. An unknown label is reported and
/// the session carries on.
fn run_removal(
    session: &Session,
    cli: &Cli,
    label: &str,
    out: &mut impl Write,
) -> Result<()> {
    let outcome = match session.simulate(label) {
        Ok(outcome) => outcome,
        Err(err @ RemovalError::NotFound(_)) => {
            warn!(label, "removal target not in graph");
            writeln!(out, "{err}")?;
            return Ok(());
        }
    };

    let report = RemovalReport::new(&outcome, cli.top_k);
    if cli.json {
        writeln!(out, "{}", serde_json::to_string(&report)?)?;
    } else {
        writeln!(out, "Graph After Removing Node: {label}")?;
        write!(out, "{}", report.ranking.to_text(cli.top_k))?;
    }

    if let Some(path) = &cli.dot {
        export_to_graphvis(&outcome.graph, &outcome.centrality.degree, path)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let session = Session::open(&cli.data)
        .with_context(|| format!("loading {}", cli.data.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.list_nodes {
        for node in session.graph().nodes() {
            writeln!(out, "{}\t{}", node.factor_type, node.label)?;
        }
        return Ok(());
    }

    let baseline = session.report(cli.top_k);
    if cli.json {
        writeln!(out, "{}", serde_json::to_string(&baseline)?)?;
    } else {
        write!(out, "{}", baseline.ranking.to_text(cli.top_k))?;
    }

    if let Some(path) = &cli.dot {
        export_to_graphvis(session.graph(), &session.baseline().degree, path)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    for label in &cli.removals {
        run_removal(&session, &cli, label, &mut out)?;
    }

    if cli.interactive {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line.context("reading node selection")?;
            let label = line.trim();
            if label.is_empty() {
                continue;
            }
            run_removal(&session, &cli, label, &mut out)?;
            out.flush()?;
        }
    }

    Ok(())
}
