use std::io::{self, Write};
use std::path::PathBuf;

use aideon_merge::batch::{self, MergeRequest, SheetChoice};
use aideon_merge::model::Notice;
use aideon_merge::pipeline::{CellEdit, DEFAULT_EXPORT_FILE_NAME};
use aideon_merge::{Result, logging, render, repl};
use clap::{Parser, Subcommand};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    logging::init()?;
    match cli.command {
        Command::Session(args) => execute_session(args),
        Command::Sheets(args) => execute_sheets(args),
        Command::Merge(args) => execute_merge(args),
    }
}

fn execute_session(args: SessionArgs) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    repl::run(stdin.lock(), &mut stdout, &args.dir)?;
    Ok(())
}

fn execute_sheets(args: SheetsArgs) -> Result<()> {
    let (listings, notices) = batch::list_sheets(&args.inputs);
    report(&notices);

    let mut stdout = io::stdout();
    if args.json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&listings)?)?;
    } else {
        for listing in &listings {
            write!(stdout, "{}", render::render_listing(listing))?;
        }
    }
    Ok(())
}

fn execute_merge(args: MergeArgs) -> Result<()> {
    let preview = args.preview;
    let request = MergeRequest {
        inputs: args.inputs,
        choices: args.select,
        columns: args.columns.as_deref().map(batch::split_list),
        edits: args.set,
        output: args.output,
    };

    let outcome = batch::run_merge(request)?;
    report(&outcome.notices);

    if preview {
        if let Some(grid) = outcome.session.grid() {
            println!("{}", render::render_table(grid));
        }
    }
    Ok(())
}

fn report(notices: &[Notice]) {
    for notice in notices {
        eprintln!("{notice}");
    }
}

fn parse_choice(raw: &str) -> std::result::Result<SheetChoice, String> {
    batch::parse_sheet_choice(raw).map_err(|error| error.to_string())
}

fn parse_edit(raw: &str) -> std::result::Result<CellEdit, String> {
    batch::parse_cell_edit(raw).map_err(|error| error.to_string())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Merge sheets from several Excel files, arrange and edit the result, and save it."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive session reading commands from stdin.
    Session(SessionArgs),
    /// List the sheets of each workbook and the default selection.
    Sheets(SheetsArgs),
    /// Merge workbooks in one step and write the result.
    Merge(MergeArgs),
}

#[derive(clap::Args)]
struct SessionArgs {
    /// Directory that relative upload paths and saved files resolve against.
    #[arg(long, default_value = ".")]
    dir: PathBuf,
}

#[derive(clap::Args)]
struct SheetsArgs {
    /// Workbooks to inspect.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Print the listing as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct MergeArgs {
    /// Workbooks to merge, in order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Sheets to take from one file, as FILE=SHEET[,SHEET...] where FILE is the
    /// file name without its directory. Files without this option contribute
    /// their first sheet.
    #[arg(long, value_name = "FILE=SHEETS", value_parser = parse_choice)]
    select: Vec<SheetChoice>,

    /// Columns to keep, comma separated, in output order.
    #[arg(long, value_name = "COLUMNS")]
    columns: Option<String>,

    /// Cell edit applied after arranging, as ROW:COLUMN=VALUE.
    #[arg(long, value_name = "ROW:COLUMN=VALUE", value_parser = parse_edit)]
    set: Vec<CellEdit>,

    /// Output file name.
    #[arg(long, default_value = DEFAULT_EXPORT_FILE_NAME)]
    output: PathBuf,

    /// Print the final grid to stdout.
    #[arg(long)]
    preview: bool,
}
