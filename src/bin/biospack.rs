use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use biospack::{pad_to_word, CompressConfig, Mode};
use clap::{ArgGroup, Parser};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "biospack")]
#[command(about = "Compress data for the BIOS RLE, LZ77 and Huffman decompression routines")]
#[command(version)]
#[command(group(ArgGroup::new("mode").required(true).args(["rle", "lz77", "huffman", "huffman4"])))]
struct Args {
    /// Input file (use - for stdin)
    input: PathBuf,

    /// Output file (use - for stdout)
    output: PathBuf,

    /// Use the BIOS RLE format
    #[arg(long)]
    rle: bool,

    /// Use the BIOS LZ77 format
    #[arg(long)]
    lz77: bool,

    /// Use the BIOS Huffman format (8-bit symbols)
    #[arg(long)]
    huffman: bool,

    /// Use the BIOS Huffman format (4-bit symbols)
    #[arg(long)]
    huffman4: bool,

    /// Ensure 16-bit routines can decompress it (only affects LZ77)
    #[arg(short, long)]
    vram: bool,

    /// Number of threads for the LZ77 search (0 = auto, 1 = single-threaded)
    #[arg(short = 't', long, default_value = "1")]
    threads: usize,

    /// Show verbose statistics
    #[arg(long)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", value_parser = Level::from_str)]
    log_level: Level,
}

impl Args {
    fn mode(&self) -> Mode {
        // clap guarantees exactly one of these is set
        if self.rle {
            Mode::Rle
        } else if self.lz77 {
            Mode::Lz77
        } else if self.huffman {
            Mode::Huffman8
        } else {
            Mode::Huffman4
        }
    }

    fn log_level(&self) -> Level {
        if self.verbose {
            self.log_level.max(Level::INFO)
        } else {
            self.log_level
        }
    }
}

/// Exit codes
const EXIT_OK: u8 = 0;
const EXIT_ERROR: u8 = 1;

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run() -> Result<u8, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut data = read_input(&args.input)?;
    if data.is_empty() {
        return Err("Input is empty, aborting".into());
    }

    let padding = pad_to_word(&mut data);
    if padding > 0 {
        warn!(padding, "input length is not a multiple of 4, padding with zeroes");
    }

    let config = CompressConfig { vram_safe: args.vram, num_threads: args.threads };
    let mode = args.mode();

    let start = std::time::Instant::now();
    let (encoded, stats) = mode.encoder(&config).encode_with_stats(&data)?;
    let elapsed = start.elapsed();

    // Encoding finished before the output is opened, so a failure leaves no file
    write_output(&args.output, &encoded)?;

    info!(
        mode = ?mode,
        vram_safe = config.vram_safe,
        blocks = stats.blocks,
        back_references = stats.back_references,
        leaves = stats.leaves,
        elapsed = ?elapsed,
        "encode complete"
    );
    eprintln!("Compressed {} bytes to {} bytes", stats.input_bytes, stats.output_bytes);

    Ok(EXIT_OK)
}

fn read_input(path: &Path) -> io::Result<Vec<u8>> {
    let mut data = Vec::new();
    if path.to_str() == Some("-") {
        io::stdin().lock().read_to_end(&mut data)?;
    } else {
        BufReader::new(File::open(path)?).read_to_end(&mut data)?;
    }
    Ok(data)
}

fn write_output(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut output: Box<dyn Write> = if path.to_str() == Some("-") {
        Box::new(io::stdout().lock())
    } else {
        Box::new(BufWriter::new(File::create(path)?))
    };
    output.write_all(data)?;
    output.flush()
}
