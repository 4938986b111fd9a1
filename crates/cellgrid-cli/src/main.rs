//! cellgrid CLI - inspect and edit sheet files

use anyhow::{bail, Context, Result};
use cellgrid::prelude::*;
use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cellgrid")]
#[command(author, version, about = "Grid-of-cells calculator over JSON sheet files")]
struct Cli {
    /// Number of rows in the grid
    #[arg(long, global = true, default_value_t = 50)]
    rows: u32,

    /// Number of columns in the grid
    #[arg(long, global = true, default_value_t = 26)]
    cols: u32,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the computed grid
    Show {
        /// Sheet file
        input: PathBuf,

        /// Field delimiter (default: tab)
        #[arg(short, long, default_value = "\t")]
        delimiter: char,
    },

    /// Apply edits, print the updated cells and save
    Set {
        /// Sheet file (created if missing)
        input: PathBuf,

        /// Edits as CELL=INPUT, e.g. B1==A1*2
        #[arg(required = true)]
        edits: Vec<String>,

        /// Write the result here instead of back to the input file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a cell's input, value, precedents and dependents
    Get {
        /// Sheet file
        input: PathBuf,

        /// Cell identifier, e.g. A1
        cell: String,
    },

    /// Replace text in cells whose value is text
    Replace {
        /// Sheet file
        input: PathBuf,

        /// Text to find
        find: String,

        /// Replacement text
        replace: String,

        /// Only touch cells in this range, e.g. A1:C10
        #[arg(short, long)]
        range: Option<String>,

        /// Write the result here instead of back to the input file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Keep the first occurrence of each value in a range
    Dedupe {
        /// Sheet file
        input: PathBuf,

        /// Range to deduplicate, e.g. A1:A20
        range: String,

        /// Write the result here instead of back to the input file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = SheetOptions::with_bounds(cli.rows, cli.cols);

    match cli.command {
        Commands::Show { input, delimiter } => show(&input, options, delimiter),
        Commands::Set {
            input,
            edits,
            output,
        } => set(&input, options, &edits, output.as_deref()),
        Commands::Get { input, cell } => get(&input, options, &cell),
        Commands::Replace {
            input,
            find,
            replace,
            range,
            output,
        } => {
            let range = range.as_deref().map(parse_range).transpose()?;
            let mut sheet = open(&input, options)?;
            let result = sheet
                .find_replace(range, &find, &replace)
                .context("Failed to replace text")?;
            print_updates(&result)?;
            save(&sheet, output.as_deref().unwrap_or(&input))
        }
        Commands::Dedupe {
            input,
            range,
            output,
        } => {
            let range = parse_range(&range)?;
            let mut sheet = open(&input, options)?;
            let result = sheet
                .remove_duplicates(range)
                .context("Failed to remove duplicates")?;
            print_updates(&result)?;
            save(&sheet, output.as_deref().unwrap_or(&input))
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // RUST_LOG still overrides the flag
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn open(input: &Path, options: SheetOptions) -> Result<Spreadsheet> {
    Spreadsheet::open(input, options)
        .with_context(|| format!("Failed to open '{}'", input.display()))
}

fn save(sheet: &Spreadsheet, path: &Path) -> Result<()> {
    sheet
        .save(path)
        .with_context(|| format!("Failed to write '{}'", path.display()))?;
    eprintln!("Wrote {} cell(s) to '{}'", sheet.serialize().len(), path.display());
    Ok(())
}

fn parse_cell(text: &str) -> Result<CellId> {
    CellId::parse(text.trim()).with_context(|| format!("Invalid cell '{}'", text))
}

fn parse_range(text: &str) -> Result<CellRange> {
    CellRange::parse(text.trim()).with_context(|| format!("Invalid range '{}'", text))
}

fn show(input: &Path, options: SheetOptions, delimiter: char) -> Result<()> {
    let sheet = open(input, options)?;

    let ids = sheet.cell_ids();
    let (Some(max_row), Some(max_col)) = (
        ids.iter().map(|id| id.row).max(),
        ids.iter().map(|id| id.col).max(),
    ) else {
        eprintln!("Warning: Sheet appears to be empty");
        return Ok(());
    };

    let mut out = String::new();
    for col in 1..=max_col {
        out.push(delimiter);
        out.push_str(&CellId::column_to_letters(col));
    }
    out.push('\n');

    for row in 1..=max_row {
        out.push_str(&row.to_string());
        for col in 1..=max_col {
            out.push(delimiter);
            let text = sheet.get_cell_value(CellId::new(col, row)).to_text();
            out.push_str(&quote_field(&text, delimiter));
        }
        out.push('\n');
    }

    io::stdout()
        .write_all(out.as_bytes())
        .context("Failed to write to stdout")
}

/// Quote a field that would otherwise break the table
fn quote_field(text: &str, delimiter: char) -> String {
    if text.contains(delimiter) || text.contains('"') || text.contains('\n') || text.contains('\r')
    {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

fn set(
    input: &Path,
    options: SheetOptions,
    edits: &[String],
    output: Option<&Path>,
) -> Result<()> {
    let mut sheet = if input.exists() {
        open(input, options)?
    } else {
        debug!("'{}' does not exist, starting an empty sheet", input.display());
        Spreadsheet::with_options(options)
    };

    for edit in edits {
        let Some((cell, raw)) = edit.split_once('=') else {
            bail!("Edit '{}' is not of the form CELL=INPUT", edit);
        };
        let id = parse_cell(cell)?;
        let result = sheet
            .set_cell_input(id, raw)
            .with_context(|| format!("Failed to set {}", id))?;
        print_updates(&result)?;
    }

    save(&sheet, output.unwrap_or(input))
}

fn print_updates(result: &RecalcResult) -> Result<()> {
    let mut stdout = io::stdout().lock();
    for (id, value) in &result.values {
        writeln!(stdout, "{}\t{}", id, value).context("Failed to write to stdout")?;
    }
    for cycle in &result.cycles {
        let members: Vec<String> = cycle.iter().map(CellId::to_string).collect();
        eprintln!("Circular reference: {}", members.join(" -> "));
    }
    Ok(())
}

fn get(input: &Path, options: SheetOptions, cell: &str) -> Result<()> {
    let sheet = open(input, options)?;
    let id = parse_cell(cell)?;

    let raw = sheet.cell(id).map(|c| c.raw_input()).unwrap_or_default();
    let join = |ids: Vec<CellId>| {
        ids.iter()
            .map(CellId::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };

    println!("cell:       {}", id);
    println!("input:      {}", raw);
    println!("value:      {}", sheet.get_cell_value(id));
    println!(
        "precedents: {}",
        join(sheet.get_cell_precedents(id).into_iter().collect())
    );
    println!("dependents: {}", join(sheet.get_cell_dependents(id)));
    Ok(())
}
