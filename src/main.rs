//! Cellcalc - spreadsheet formula calculator (command mode)

mod config_path;
mod logger;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::path::PathBuf;

use cellcalc_engine::builtins::BUILTINS;
use cellcalc_engine::engine::{CellRef, GridBounds, RecursionStack, Resolver, Sheet, format_number};

#[derive(Parser, Debug)]
#[command(
    name = "cellcalc",
    version,
    about = "Evaluate spreadsheet formulas with cell references, SUM and AVG"
)]
struct Cli {
    /// Set a cell before evaluating, e.g. `A1=3` or `B1==A1*2` (repeatable)
    #[arg(short = 's', long = "set", value_name = "CELL=TEXT")]
    set: Vec<String>,

    /// Evaluate a formula against the sheet and print the result
    #[arg(short = 'c', long = "command", value_name = "EXPR", allow_hyphen_values = true)]
    command: Option<String>,

    /// Print `CELL: value` for every formula cell
    #[arg(long)]
    all: bool,

    /// Print the cells above, below, left and right of CELL within the grid
    #[arg(long, value_name = "CELL")]
    neighbours: Option<String>,

    /// List the built-in functions
    #[arg(long)]
    functions: bool,

    /// Engine config file (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not read config.toml from the config dir
    #[arg(long)]
    no_default_config: bool,

    /// Log more to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Cells whose values to print, one per line
    cells: Vec<String>,
}

fn build_sheet(assignments: &[String]) -> Result<Sheet> {
    let sheet = Sheet::new();
    for assignment in assignments {
        let Some((cell, text)) = assignment.split_once('=') else {
            bail!("expected CELL=TEXT, got '{}'", assignment);
        };
        sheet
            .set(cell.trim(), text)
            .with_context(|| format!("in --set '{}'", assignment))?;
    }
    Ok(sheet)
}

fn neighbours(id: &str, bounds: &GridBounds) -> Result<Vec<String>> {
    let cell = CellRef::from_str(id).ok_or_else(|| anyhow!("invalid cell reference '{}'", id))?;
    Ok(vec![
        format!("up: {}", cell.up()),
        format!("down: {}", cell.down(bounds)),
        format!("left: {}", cell.left()),
        format!("right: {}", cell.right(bounds)),
    ])
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    if cli.functions {
        for builtin in BUILTINS {
            println!("{:<6}{}", builtin.name, builtin.description);
        }
        return Ok(());
    }

    if cli.command.is_none() && cli.cells.is_empty() && !cli.all && cli.neighbours.is_none() {
        bail!("nothing to evaluate: pass -c EXPR, --all, --neighbours CELL or cell names");
    }

    let config = config_path::load_config(cli.config.as_deref(), cli.no_default_config)?;
    let sheet = build_sheet(&cli.set)?;
    let resolver = Resolver::with_config(&sheet, config);

    if let Some(expr) = cli.command.as_deref() {
        let body = expr.strip_prefix('=').unwrap_or(expr);
        let mut stack = RecursionStack::new();
        let value = resolver
            .resolve_formula(body, &mut stack)
            .map_err(|e| anyhow!(e.display_message()))?;
        println!("{}", format_number(value));
    }

    for cell in &cli.cells {
        println!("{}", resolver.display_value(cell));
    }

    if let Some(id) = cli.neighbours.as_deref() {
        for line in neighbours(id, &resolver.config().grid)? {
            println!("{}", line);
        }
    }

    if cli.all {
        for (cell, shown) in resolver.calculate_all() {
            println!("{}: {}", cell, shown);
        }
    }

    Ok(())
}
