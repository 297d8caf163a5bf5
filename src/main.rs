use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use huffman_file::{compressed_path, container, decompressed_path};

#[derive(Parser, Debug)]
#[command(version, about = "Huffman compression for single files", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a file into a .huff container
    Compress {
        input: PathBuf,
        /// Defaults to the input path with a .huff extension
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Restore the original bytes of a .huff container
    Decompress {
        input: PathBuf,
        /// Defaults to the input path with a .txt extension
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the header of a .huff container as JSON
    Inspect { input: PathBuf },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match args.command {
        Command::Compress { input, output } => {
            ensure_exists(&input)?;
            let output = output.unwrap_or_else(|| compressed_path(&input));
            let stats = huffman_file::compress_to(&input, &output)
                .with_context(|| format!("failed to compress {}", input.display()))?;

            println!(
                "compressed to '{}' ({} -> {} bytes, {} symbols)",
                output.display(),
                stats.input_bytes,
                stats.output_bytes,
                stats.symbols
            );
        }
        Command::Decompress { input, output } => {
            ensure_exists(&input)?;
            let output = output.unwrap_or_else(|| decompressed_path(&input));
            let written = huffman_file::decompress_to(&input, &output)
                .with_context(|| format!("failed to decompress {}", input.display()))?;

            println!("decompressed to '{}' ({written} bytes)", output.display());
        }
        Command::Inspect { input } => {
            ensure_exists(&input)?;
            let file = File::open(&input)
                .with_context(|| format!("failed to open {}", input.display()))?;
            let summary = container::inspect(BufReader::new(file))
                .with_context(|| format!("failed to read header of {}", input.display()))?;
            if !summary.is_complete() {
                log::warn!(
                    "payload is truncated: {} of {} bytes",
                    summary.payload_bytes,
                    summary.expected_payload_bytes
                );
            }

            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn ensure_exists(path: &Path) -> anyhow::Result<()> {
    if !path.is_file() {
        bail!("{} does not exist or is not a file", path.display());
    }
    Ok(())
}
