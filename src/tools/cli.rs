use std::ffi::OsString;
use std::path::PathBuf;
use std::{fmt::Display, fmt::Formatter};

use clap::{Parser, Subcommand};
use log::info;

/// Verbosity of user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Errors,
    Warnings,
    Info,
    Debug,
    Trace,
}

/// Encode, Decode, IntGen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Encode,
    Decode,
    IntGen,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug)]
pub struct HuffOpts {
    /// Encode/Decode/IntGen
    pub op_mode: Mode,
    /// File to read (unused by the generator)
    pub input: Option<PathBuf>,
    /// File to write
    pub output: PathBuf,
    /// Worker threads in the pool
    pub threads: usize,
    /// Disjoint symbol ranges counted in parallel
    pub shards: usize,
    /// Integers written by the generator
    pub count: usize,
    /// Verbosity of user information
    pub verbose: Verbosity,
}

impl HuffOpts {
    pub fn new() -> Self {
        Self {
            op_mode: Mode::Encode,
            input: None,
            output: PathBuf::new(),
            threads: std::thread::available_parallelism().map_or(1, |n| n.get()),
            shards: 2,
            count: 1_000_000,
            verbose: Verbosity::Info,
        }
    }
}

impl Default for HuffOpts {
    fn default() -> Self {
        Self::new()
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Huffman coding for 7-bit byte streams",
    long_about = "
    Builds a prefix-code tree from symbol frequencies and stores the tree plus the
    packed bitstream in a compact binary file. Only byte values 0-127 are supported.

    The single-dash forms also work:
      huffpool -encode <in> <out>
      huffpool -decode <in> <out>
      huffpool -int_gen <out>"
)]
struct Args {
    #[clap(subcommand)]
    command: Command,

    /// Worker threads (defaults to available parallelism)
    #[clap(short = 't', long, global = true)]
    threads: Option<usize>,

    /// Symbol ranges counted in parallel
    #[clap(long, global = true, default_value_t = 2)]
    shards: usize,

    /// More output; repeat for more detail
    #[clap(short = 'v', long = "verbose", parse(from_occurrences), global = true)]
    verbose: u64,

    /// Less output; -q warnings only, -qq errors only, -qqq nothing
    #[clap(short = 'q', long, parse(from_occurrences), global = true)]
    quiet: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress <input> into <output>
    Encode { input: PathBuf, output: PathBuf },
    /// Decompress <input> into <output>
    Decode { input: PathBuf, output: PathBuf },
    /// Write a file of cycling integers for testing
    #[clap(alias = "int_gen")]
    IntGen {
        output: PathBuf,
        /// How many integers to write
        #[clap(long, default_value_t = 1_000_000)]
        count: usize,
    },
}

/// Map the single-dash operation names onto subcommands.
fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(|arg| {
            let arg = arg.into();
            match arg.to_str() {
                Some("-encode") => "encode".into(),
                Some("-decode") => "decode".into(),
                Some("-int_gen") => "int-gen".into(),
                _ => arg,
            }
        })
        .collect()
}

/// Parse options from an explicit argument list (first item is the program name).
pub fn huffopts_from<I, T>(args: I) -> Result<HuffOpts, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args = Args::try_parse_from(normalize_args(args))?;
    let mut opts = HuffOpts::new();

    match args.command {
        Command::Encode { input, output } => {
            opts.op_mode = Mode::Encode;
            opts.input = Some(input);
            opts.output = output;
        }
        Command::Decode { input, output } => {
            opts.op_mode = Mode::Decode;
            opts.input = Some(input);
            opts.output = output;
        }
        Command::IntGen { output, count } => {
            opts.op_mode = Mode::IntGen;
            opts.output = output;
            opts.count = count;
        }
    }
    if let Some(threads) = args.threads {
        opts.threads = threads.max(1);
    }
    opts.shards = args.shards.clamp(1, 128);
    opts.verbose = match (args.quiet, args.verbose) {
        (0, 0) => Verbosity::Info,
        (0, 1) => Verbosity::Debug,
        (0, _) => Verbosity::Trace,
        (1, _) => Verbosity::Warnings,
        (2, _) => Verbosity::Errors,
        _ => Verbosity::Quiet,
    };
    Ok(opts)
}

/// Read the process arguments, set the log level, and report the settings.
/// Exits with clap's usage message on bad arguments.
pub fn huffopts_init() -> HuffOpts {
    let opts = huffopts_from(std::env::args_os()).unwrap_or_else(|e| e.exit());

    // Set the log level
    match opts.verbose {
        Verbosity::Quiet => log::set_max_level(log::LevelFilter::Off),
        Verbosity::Errors => log::set_max_level(log::LevelFilter::Error),
        Verbosity::Warnings => log::set_max_level(log::LevelFilter::Warn),
        Verbosity::Info => log::set_max_level(log::LevelFilter::Info),
        Verbosity::Debug => log::set_max_level(log::LevelFilter::Debug),
        Verbosity::Trace => log::set_max_level(log::LevelFilter::Trace),
    };

    log::debug!("Verbosity set to {}", log::max_level());
    info!("Operational mode set to {}", opts.op_mode);
    if opts.op_mode != Mode::IntGen {
        log::debug!("Using {} threads, {} count shards", opts.threads, opts.shards);
    }
    opts
}
