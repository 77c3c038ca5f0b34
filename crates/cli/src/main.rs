use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use planarity::{Planarity, PlanarityConfig};
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

mod parse;
mod report;

use parse::parse_edge_list;
use report::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Ron,
}

/// Test an edge list for planarity
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Edge list to read, standard input if omitted
    input: Option<PathBuf>,

    /// Extract a K5 or K3,3 subdivision from non-planar graphs
    #[arg(long)]
    minor: bool,

    /// Only decide planarity, skip the rotation system
    #[arg(long)]
    no_embed: bool,

    /// Print the faces of the embedding, largest one as exterior
    #[arg(long)]
    faces: bool,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

fn read_input(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading standard input")?;
            Ok(text)
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let text = read_input(args.input.as_ref())?;
    let mut graph = parse_edge_list(&text).context("parsing the edge list")?;
    debug!(format = ?args.format, "input parsed");

    let config = PlanarityConfig::new()
        .with_minor(args.minor)
        .with_embedding(!args.no_embed);
    let outcome = Planarity::new(config)
        .run(&graph)
        .context("running the planarity test")?;
    info!(planar = outcome.is_planar(), "planarity decided");

    let report = Report::new(&mut graph, outcome, args.faces)?;
    match args.format {
        Format::Text => print!("{report}"),
        Format::Ron => {
            let pretty = ron::ser::PrettyConfig::default();
            println!(
                "{}",
                ron::ser::to_string_pretty(&report, pretty).context("serializing the report")?
            );
        }
    }
    Ok(())
}
