use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use itertools::Itertools;

use crate::cli::args::{Args, Command};
use crate::clearance::{find_clearances, ClearanceQuery};
use crate::fill::{calculate_tx_metal_fill, Outcome};
use crate::layout::{Module, ShapeSource};
use crate::merge::extract_unique_rects;
use crate::tech::{self, DesignRules};

pub mod args;

pub fn run() -> Result<()> {
    let args = Args::parse();
    let stdout = std::io::stdout();
    execute(args, &mut stdout.lock())
}

/// Run the command described by `args`, writing results to `out`.
pub fn execute(args: Args, out: &mut impl Write) -> Result<()> {
    let tech = tech::resolve(&args.tech)
        .with_context(|| format!("failed to load technology `{}`", args.tech))?;
    log::info!("using technology {}", tech.tech);

    match args.command {
        Command::Clearances {
            layer,
            purpose,
            dir,
            region,
            flat,
        } => {
            let module = load_layout(args.layout.as_deref(), "clearances")?;
            let mut builder = ClearanceQuery::builder();
            builder
                .layer(layer)
                .purpose(purpose)
                .dir(dir)
                .recursive(flat);
            if let Some(region) = region {
                builder.region(region);
            }
            let query = builder.build()?;
            for interval in find_clearances(&module, &query, tech.grid())? {
                writeln!(out, "{:.3} {:.3}", interval.start, interval.end)?;
            }
        }
        Command::Merge {
            layer,
            purpose,
            min_space,
        } => {
            let module = load_layout(args.layout.as_deref(), "merge")?;
            let shapes = module.layer_shapes(&layer, &purpose, true);
            for rect in extract_unique_rects(&shapes, min_space) {
                let edges = [rect.left(), rect.bottom(), rect.right(), rect.top()]
                    .iter()
                    .map(|v| format!("{v:.3}"))
                    .join(" ");
                writeln!(out, "{}/{} {}", rect.layer, rect.purpose, edges)?;
            }
        }
        Command::TxFill { width } => {
            match calculate_tx_metal_fill(width, &tech, tech.tx_fill()?)? {
                Outcome::Fill(fill) => writeln!(
                    out,
                    "y_bottom {:.3} y_top {:.3} width {:.3} height {:.3}",
                    fill.y_bottom, fill.y_top, fill.width, fill.height
                )?,
                Outcome::Skip(reason) => writeln!(out, "no fill: {reason}")?,
            }
        }
    }
    Ok(())
}

fn load_layout(path: Option<&Path>, command: &str) -> Result<Module> {
    let Some(path) = path else {
        bail!("`{command}` requires --layout");
    };
    Module::load(path).with_context(|| format!("failed to load layout {path:?}"))
}
