use std::io::{self, BufWriter, Write};
use std::process;

use anyhow::Context;
use clap::Parser;
use log::info;

use strsplit_rs::common::io::{lines_to_column, read_input};
use strsplit_rs::common::{io_error_msg, logging, reset_sigpipe};
use strsplit_rs::split::{Direction, SplitConfig, max_tokens_for, tokenize};
use strsplit_rs::Table;

const TOOL: &str = "fstrsplit";

#[derive(Parser)]
#[command(
    name = "fstrsplit",
    version,
    about = "Split each input line into columns on a delimiter or on whitespace"
)]
struct Cli {
    /// Split on STR; omit (or pass an empty string) to split on whitespace runs
    #[arg(short = 'd', long = "delimiter", value_name = "STR", default_value = "")]
    delimiter: String,

    /// Split at most N times per line; negative or 0 means no limit
    #[arg(
        short = 'n',
        long = "max-split",
        value_name = "N",
        default_value_t = -1,
        allow_negative_numbers = true
    )]
    max_split: i64,

    /// Split from the right (rsplit)
    #[arg(short = 'r', long = "reverse")]
    reverse: bool,

    /// Input lines equal to STR are null rows; null cells print as STR
    #[arg(long = "null-marker", value_name = "STR", default_value = "\\N")]
    null_marker: String,

    /// Use STR to join output columns instead of TAB
    #[arg(long = "output-delimiter", value_name = "STR", default_value = "\t")]
    output_delimiter: String,

    /// Line delimiter is NUL, not newline
    #[arg(short = 'z', long = "zero-terminated")]
    zero_terminated: bool,

    /// Increase diagnostic output (repeatable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Files to process ("-" for stdin)
    files: Vec<String>,
}

/// Write the table row by row, joining cells with `sep`.
fn write_table(
    out: &mut impl Write,
    table: &Table,
    sep: &[u8],
    null_marker: &[u8],
    line_delim: u8,
) -> io::Result<()> {
    for row in 0..table.num_rows() {
        for (i, cell) in table.row(row).into_iter().enumerate() {
            if i > 0 {
                out.write_all(sep)?;
            }
            out.write_all(cell.unwrap_or(null_marker))?;
        }
        out.write_all(&[line_delim])?;
    }
    Ok(())
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let direction = if cli.reverse {
        Direction::Reverse
    } else {
        Direction::Forward
    };
    let cfg = SplitConfig::new(direction, cli.delimiter.as_bytes(), cli.max_split);
    info!(
        "{:?} split, {} mode, max tokens {}",
        direction,
        if cfg.delimiter.is_empty() { "whitespace" } else { "delimiter" },
        max_tokens_for(cli.max_split)
    );

    let line_delim = if cli.zero_terminated { b'\0' } else { b'\n' };
    let null_marker = cli.null_marker.as_bytes();
    let files = if cli.files.is_empty() {
        vec!["-".to_string()]
    } else {
        cli.files.clone()
    };

    let stdout = io::stdout();
    let mut out = BufWriter::with_capacity(1024 * 1024, stdout.lock());
    let mut had_error = false;

    for filename in &files {
        let data = match read_input(filename) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("{}: {}: {}", TOOL, filename, io_error_msg(&e));
                had_error = true;
                continue;
            }
        };
        let column = lines_to_column(&data, line_delim, Some(null_marker))
            .with_context(|| format!("{}: cannot load input", filename))?;
        info!(
            "{}: {} rows ({} null), {} bytes",
            filename,
            column.len(),
            column.null_count(),
            column.chars().len()
        );
        let table = tokenize(&column.view(), &cfg)
            .with_context(|| format!("{}: split failed", filename))?;
        write_table(
            &mut out,
            &table,
            cli.output_delimiter.as_bytes(),
            null_marker,
            line_delim,
        )?;
    }
    out.flush()?;
    Ok(had_error)
}

fn main() {
    reset_sigpipe();
    let cli = Cli::parse();
    logging::init(TOOL, cli.verbose);

    match run(&cli) {
        Ok(false) => {}
        Ok(true) => process::exit(1),
        Err(e) => {
            if let Some(io_err) = e.downcast_ref::<io::Error>() {
                if io_err.kind() == io::ErrorKind::BrokenPipe {
                    process::exit(0);
                }
            }
            eprintln!("{}: {:#}", TOOL, e);
            process::exit(1);
        }
    }
}
