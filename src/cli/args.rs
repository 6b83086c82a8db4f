use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::geom::{Dir, Purpose};
use crate::grid::Interval;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about,
    help_template(
        "{before-help}{name} {version}\n{author-with-newline}{about-with-newline}\n{usage-heading} {usage}\n\n{all-args}{after-help}"
    )
)]
pub struct Args {
    /// Built-in technology name, or path to a TOML rule file.
    #[arg(short, long, default_value = "sky130")]
    pub tech: String,

    /// Path to a JSON layout snapshot.
    #[arg(short, long)]
    pub layout: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the open intervals on a layer.
    Clearances {
        #[arg(long)]
        layer: String,
        #[arg(long, default_value = "drawing")]
        purpose: Purpose,
        /// Axis to report along: `h` or `v`.
        #[arg(long)]
        dir: Dir,
        /// Orthogonal span within which shapes obstruct, as `start:end`.
        #[arg(long, value_parser = parse_region)]
        region: Option<Interval>,
        /// Include shapes of nested instances.
        #[arg(long)]
        flat: bool,
    },
    /// Merge the shapes on a layer lying within a minimum spacing of each other.
    Merge {
        #[arg(long)]
        layer: String,
        #[arg(long, default_value = "drawing")]
        purpose: Purpose,
        #[arg(long, default_value_t = 0.)]
        min_space: f64,
    },
    /// Size the metal fill over a transistor's contact stack.
    TxFill {
        /// Transistor width, in microns.
        #[arg(long)]
        width: f64,
    },
}

/// Parse `start:end`, keeping the endpoints in the order given.
pub fn parse_region(s: &str) -> Result<Interval, String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("expected `start:end`, got `{s}`"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate `{v}`: {e}"))
    };
    Ok(Interval {
        start: parse(start)?,
        end: parse(end)?,
    })
}
