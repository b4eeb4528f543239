#![cfg(feature = "cli")]

//! The command-line front-end.
//!
//! Invocation is `strec [global-opts] verb [verb-opts] [then verb ...]
//! [files...]`. clap handles the global options; everything from the first
//! verb name onward is collected verbatim and handed to the verb-chain
//! parser, with trailing non-flag tokens of the last segment taken as
//! input file names. Exit codes: 0 on clean end of stream (including a
//! closed downstream pipe), 1 on usage, parse or I/O errors, 2 on internal
//! invariant violations.

use std::io::Write;

use clap::Parser;

use crate::errors::Error;
use crate::options::{Format, Options, QuoteMode, ReaderOpts, WriterOpts};
use crate::pipeline;
use crate::separators;
use crate::verbs;

#[derive(Parser, Debug)]
#[command(
    name = "strec",
    about,
    version,
    override_usage = "strec [global-opts] verb [verb-opts] [then verb [verb-opts] ...] [files...]"
)]
struct Cli {
    // input-format selectors
    #[arg(long, help_heading = "Input format")]
    idkvp: bool,
    #[arg(long, help_heading = "Input format")]
    inidx: bool,
    #[arg(long, help_heading = "Input format")]
    icsv: bool,
    #[arg(long, help_heading = "Input format")]
    icsvlite: bool,
    #[arg(long, help_heading = "Input format")]
    ijson: bool,
    #[arg(long, help_heading = "Input format")]
    ipprint: bool,
    #[arg(long, help_heading = "Input format")]
    ixtab: bool,

    // output-format selectors
    #[arg(long, help_heading = "Output format")]
    odkvp: bool,
    #[arg(long, help_heading = "Output format")]
    onidx: bool,
    #[arg(long, help_heading = "Output format")]
    ocsv: bool,
    #[arg(long, help_heading = "Output format")]
    ocsvlite: bool,
    #[arg(long, help_heading = "Output format")]
    ojson: bool,
    #[arg(long, help_heading = "Output format")]
    opprint: bool,
    #[arg(long, help_heading = "Output format")]
    oxtab: bool,
    #[arg(long, help_heading = "Output format")]
    omd: bool,

    // both-sides selectors
    #[arg(long, help_heading = "Format")]
    dkvp: bool,
    #[arg(long, help_heading = "Format")]
    nidx: bool,
    #[arg(long, help_heading = "Format")]
    csv: bool,
    #[arg(long, help_heading = "Format")]
    csvlite: bool,
    #[arg(long, help_heading = "Format")]
    json: bool,
    #[arg(long, help_heading = "Format")]
    pprint: bool,
    #[arg(long, help_heading = "Format")]
    xtab: bool,

    // separators: named descriptors like `tab`, `crlf`, or literals with
    // backslash escapes
    #[arg(long, value_name = "SEP", help_heading = "Separators")]
    irs: Option<String>,
    #[arg(long, value_name = "SEP", help_heading = "Separators")]
    ors: Option<String>,
    #[arg(long, value_name = "SEP", help_heading = "Separators")]
    rs: Option<String>,
    #[arg(long, value_name = "SEP", help_heading = "Separators")]
    ifs: Option<String>,
    #[arg(long, value_name = "SEP", help_heading = "Separators")]
    ofs: Option<String>,
    #[arg(long, value_name = "SEP", help_heading = "Separators")]
    fs: Option<String>,
    #[arg(long, value_name = "SEP", help_heading = "Separators")]
    ips: Option<String>,
    #[arg(long, value_name = "SEP", help_heading = "Separators")]
    ops: Option<String>,
    #[arg(long, value_name = "SEP", help_heading = "Separators")]
    ps: Option<String>,
    /// Collapse runs of the input field separator
    #[arg(long, help_heading = "Separators")]
    repifs: bool,

    /// Number columns 1-up instead of reading a CSV header line
    #[arg(long, help_heading = "CSV")]
    implicit_csv_header: bool,
    /// Do not write a CSV header line
    #[arg(long, help_heading = "CSV")]
    headerless_csv_output: bool,
    #[arg(long, help_heading = "CSV")]
    quote_all: bool,
    #[arg(long, help_heading = "CSV")]
    quote_none: bool,
    #[arg(long, help_heading = "CSV")]
    quote_minimal: bool,
    #[arg(long, help_heading = "CSV")]
    quote_numeric: bool,
    #[arg(long, help_heading = "CSV")]
    quote_original: bool,

    /// Separator for flattened nested-JSON keys
    #[arg(long, value_name = "SEP", help_heading = "JSON")]
    jflatsep: Option<String>,
    /// Wrap JSON output in one outer array
    #[arg(long, help_heading = "JSON")]
    jlistwrap: bool,
    /// One key per line in JSON output
    #[arg(long, help_heading = "JSON")]
    jvstack: bool,
    /// Skip array-valued JSON keys instead of failing
    #[arg(long, help_heading = "JSON")]
    json_skip_arrays: bool,

    /// Right-align pprint output
    #[arg(long)]
    right: bool,

    /// printf-style format for computed floating-point values
    #[arg(long, value_name = "FMT")]
    ofmt: Option<String>,

    /// Input file (in addition to trailing file names)
    #[arg(long, value_name = "FILE")]
    from: Vec<String>,

    /// Read no input; useful with seqgen or put with begin/end blocks
    #[arg(short = 'n')]
    no_input: bool,

    /// The verb chain and input files
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "VERB-CHAIN")]
    rest: Vec<String>,
}

/// Entrypoint called by `main`; returns the process exit code.
pub fn main() -> i32 {
    env_logger::builder().format_timestamp(None).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e)
            if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion =>
        {
            print!("{e}");
            return 0;
        }
        Err(e) => {
            eprint!("{e}");
            return 1;
        }
    };

    match run(cli) {
        Ok(()) => 0,
        Err(err) => {
            if let Some(e) = err.downcast_ref::<Error>() {
                if e.is_broken_pipe() {
                    return 0;
                }
                eprintln!("strec: {e}");
                return e.exit_code();
            }
            eprintln!("strec: {err:#}");
            1
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut opts = build_options(&cli)?;
    if cli.rest.is_empty() {
        anyhow::bail!(Error::usage(format!(
            "no verb given; available verbs: {}",
            verbs::verb_names().join(" ")
        )));
    }
    let (chain, files) = verbs::make_chain(&cli.rest, &opts)?;
    opts.files.extend(files);
    opts.files.extend(cli.from.iter().cloned());
    opts.no_input = cli.no_input;

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    pipeline::run(&opts, chain, &mut out)?;
    out.flush().map_err(Error::Io)?;
    Ok(())
}

fn build_options(cli: &Cli) -> anyhow::Result<Options> {
    let both = pick_format(&[
        (cli.dkvp, Format::Dkvp),
        (cli.nidx, Format::Nidx),
        (cli.csv, Format::Csv),
        (cli.csvlite, Format::CsvLite),
        (cli.json, Format::Json),
        (cli.pprint, Format::Pprint),
        (cli.xtab, Format::Xtab),
    ]);
    let input_format = pick_format(&[
        (cli.idkvp, Format::Dkvp),
        (cli.inidx, Format::Nidx),
        (cli.icsv, Format::Csv),
        (cli.icsvlite, Format::CsvLite),
        (cli.ijson, Format::Json),
        (cli.ipprint, Format::Pprint),
        (cli.ixtab, Format::Xtab),
    ])
    .or(both)
    .unwrap_or(Format::Dkvp);
    let output_format = pick_format(&[
        (cli.odkvp, Format::Dkvp),
        (cli.onidx, Format::Nidx),
        (cli.ocsv, Format::Csv),
        (cli.ocsvlite, Format::CsvLite),
        (cli.ojson, Format::Json),
        (cli.opprint, Format::Pprint),
        (cli.oxtab, Format::Xtab),
        (cli.omd, Format::Markdown),
    ])
    .or(both)
    .unwrap_or(Format::Dkvp);

    let mut reader = ReaderOpts::for_format(input_format);
    let mut writer = WriterOpts::for_format(output_format);

    if let Some(sep) = cli.rs.as_ref().or(cli.irs.as_ref()) {
        reader.irs = separators::resolve(sep);
    }
    if let Some(sep) = cli.rs.as_ref().or(cli.ors.as_ref()) {
        writer.ors = separators::resolve(sep);
    }
    if let Some(sep) = cli.fs.as_ref().or(cli.ifs.as_ref()) {
        reader.ifs = separators::resolve(sep);
    }
    if let Some(sep) = cli.fs.as_ref().or(cli.ofs.as_ref()) {
        writer.ofs = separators::resolve(sep);
    }
    if let Some(sep) = cli.ps.as_ref().or(cli.ips.as_ref()) {
        reader.ips = separators::resolve(sep);
    }
    if let Some(sep) = cli.ps.as_ref().or(cli.ops.as_ref()) {
        writer.ops = separators::resolve(sep);
    }
    if cli.repifs {
        reader.allow_repeat_ifs = true;
    }
    reader.implicit_csv_header = cli.implicit_csv_header;
    writer.headerless_csv_output = cli.headerless_csv_output;

    let quote_flags = [
        (cli.quote_all, QuoteMode::All),
        (cli.quote_none, QuoteMode::None),
        (cli.quote_minimal, QuoteMode::Minimal),
        (cli.quote_numeric, QuoteMode::Numeric),
        (cli.quote_original, QuoteMode::Original),
    ];
    for (set, mode) in quote_flags {
        if set {
            writer.quote_mode = mode;
        }
    }

    if let Some(sep) = &cli.jflatsep {
        reader.json_flatten_separator = separators::resolve(sep);
        writer.json_flatten_separator = reader.json_flatten_separator.clone();
    }
    reader.json_skip_arrays = cli.json_skip_arrays;
    writer.json_list_wrap = cli.jlistwrap;
    writer.json_vertical_stack = cli.jvstack;
    writer.right_align = cli.right;
    if let Some(ofmt) = &cli.ofmt {
        writer.ofmt = ofmt.clone();
    }

    if writer.format == Format::Pprint && writer.ofs.chars().count() != 1 {
        anyhow::bail!(Error::usage(
            "pprint output uses the field separator repeated for alignment; it must be a single character"
        ));
    }

    Ok(Options {
        reader,
        writer,
        files: Vec::new(),
        no_input: false,
    })
}

fn pick_format(flags: &[(bool, Format)]) -> Option<Format> {
    flags.iter().find(|(set, _)| *set).map(|(_, f)| f).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("strec").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_verb_chain_is_collected_verbatim() {
        let cli = parse(&["--icsv", "--ojson", "cat", "-n", "then", "head", "-n", "3", "f.csv"]);
        assert!(cli.icsv && cli.ojson);
        assert_eq!(
            cli.rest,
            vec!["cat", "-n", "then", "head", "-n", "3", "f.csv"]
        );
    }

    #[test]
    fn test_build_options_formats_and_separators() {
        let cli = parse(&["--icsv", "--ojson", "--ifs", "tab", "cat"]);
        let opts = build_options(&cli).unwrap();
        assert_eq!(opts.reader.format, Format::Csv);
        assert_eq!(opts.writer.format, Format::Json);
        assert_eq!(opts.reader.ifs, "\t");
    }

    #[test]
    fn test_both_sides_selector() {
        let cli = parse(&["--csv", "cat"]);
        let opts = build_options(&cli).unwrap();
        assert_eq!(opts.reader.format, Format::Csv);
        assert_eq!(opts.writer.format, Format::Csv);
    }

    #[test]
    fn test_fs_sets_both_sides() {
        let cli = parse(&["--fs", "semicolon", "cat"]);
        let opts = build_options(&cli).unwrap();
        assert_eq!(opts.reader.ifs, ";");
        assert_eq!(opts.writer.ofs, ";");
    }

    #[test]
    fn test_quote_mode() {
        let cli = parse(&["--icsv", "--ocsv", "--quote-all", "cat"]);
        let opts = build_options(&cli).unwrap();
        assert_eq!(opts.writer.quote_mode, QuoteMode::All);
    }
}
