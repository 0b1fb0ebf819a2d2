//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use huffpool::compression::compress::encode_file;
use huffpool::compression::decompress::decode_file;
use huffpool::tools::cli::{huffopts_init, HuffOpts, Mode};
use huffpool::tools::int_gen::int_gen_file;
use huffpool::tools::worker_pool::WorkerPool;
use huffpool::{HuffError, Result};

use log::{error, info, LevelFilter};
use simplelog::{Config, TermLogger, TerminalMode};

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    // Available log levels are Error, Warn, Info, Debug, Trace
    if let Err(e) = TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stdout,
        simplelog::ColorChoice::Auto,
    ) {
        eprintln!("Could not start the logger: {}", e);
    }

    let options = huffopts_init();

    //----- Figure out what we need to do and go do it
    // Failures are reported, not turned into an exit code.
    if let Err(e) = run(&options) {
        error!("{} failed: {}", options.op_mode, e);
    }
}

fn run(opts: &HuffOpts) -> Result<()> {
    let output = opts.output.as_path();
    match opts.op_mode {
        Mode::Encode => {
            let input = input_path(opts)?;
            let pool = WorkerPool::new(opts.threads);
            info!("encoding...");
            let report = encode_file(input, output, &pool, opts.shards)?;
            info!(
                "encoding finished: {} -> {} bytes, {} symbols",
                report.bytes_in, report.bytes_out, report.symbols
            );
            info!("encoded to file: {}", output.display());
        }
        Mode::Decode => {
            let input = input_path(opts)?;
            info!("decoding...");
            let report = decode_file(input, output)?;
            info!(
                "decoding finished: {} -> {} bytes",
                report.bytes_in, report.bytes_out
            );
            info!("decoded to file: {}", output.display());
        }
        Mode::IntGen => {
            info!("int generating...");
            int_gen_file(output, opts.count)?;
            info!("generating finished!");
        }
    }
    Ok(())
}

fn input_path(opts: &HuffOpts) -> Result<&std::path::Path> {
    opts.input.as_deref().ok_or_else(|| HuffError::FileOpen {
        path: Default::default(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no input file given"),
    })
}
