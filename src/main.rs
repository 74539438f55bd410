use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use gridfill::{find_fill, render_grid, ConstraintGraph, SolverConfig, WordList};

/// Fill a grid template with words from a word list.
#[derive(Debug, Parser)]
#[command(name = "gridfill")]
struct Opt {
    /// Grid template: one line per row, '#' for blocks, '.' or '_' for open cells
    structure: PathBuf,

    /// Word list, one word per line
    words: PathBuf,

    /// If given, the rendered fill is also written to this file
    output: Option<PathBuf>,

    /// Propagate arc consistency after every choice during the search
    #[arg(long)]
    maintain_arc_consistency: bool,

    /// Maximum level of the log messages written to stderr
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
}

fn main() -> Result<ExitCode> {
    let opt = Opt::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_timer(tracing_subscriber::fmt::time::Uptime::from(std::time::Instant::now()))
        .with_max_level(opt.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let template = fs::read_to_string(&opt.structure)
        .with_context(|| format!("Could not read grid template {}", opt.structure.display()))?;
    let graph = ConstraintGraph::from_template(&template)
        .with_context(|| format!("Invalid grid template {}", opt.structure.display()))?;
    let word_list = WordList::from_file(&opt.words)?;

    let mut config = SolverConfig::default();
    config.maintain_arc_consistency |= opt.maintain_arc_consistency;

    match find_fill(&graph, &word_list, config) {
        Ok(result) => {
            let display_grid = render_grid(&graph, &result.assignment);

            println!("{:?}", result.statistics);
            println!("{}", display_grid);

            if let Some(output) = &opt.output {
                fs::write(output, display_grid + "\n")
                    .with_context(|| format!("Unable to write {}", output.display()))?;
            }

            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            tracing::info!("{failure}");
            println!("No solution.");
            Ok(ExitCode::FAILURE)
        }
    }
}
