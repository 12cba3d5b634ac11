use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};
use mapenv::layout::Tag;
use mapenv::{Container, DecodeOptions};

#[derive(Parser)]
#[command(name = "mapenv", about = "Compile and decompile MAP_ENV environment files")]
struct Cli {
    /// Log more detail (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a Shift_JIS script into a binary container.
    #[command(alias = "c")]
    Compile {
        /// Script to read.
        input: PathBuf,
        /// Container to write.
        output: PathBuf,
    },
    /// Decompile a binary container into a Shift_JIS script.
    #[command(alias = "d")]
    Decompile {
        /// Container to read.
        input: PathBuf,
        /// Script to write.
        output: PathBuf,
        /// Spaces per nesting level.
        #[arg(long, default_value_t = 4)]
        indent: usize,
    },
    /// Print the header and tag table of a container.
    Info {
        /// Container to inspect.
        input: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Write `bytes` next to `path` first and rename into place, so a failed
/// run never leaves a partial file behind.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("failed to write {}", tmp.path().display()))?;
    tmp.persist(path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

fn cmd_compile(input: &Path, output: &Path) -> Result<()> {
    info!("compiling {} -> {}", input.display(), output.display());
    let raw = read_input(input)?;
    let bytes = mapenv::compile_bytes(&raw).with_context(|| format!("failed to compile {}", input.display()))?;
    write_atomic(output, &bytes)?;
    info!("wrote {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}

fn cmd_decompile(input: &Path, output: &Path, indent: usize) -> Result<()> {
    info!("decompiling {} -> {}", input.display(), output.display());
    let data = read_input(input)?;
    let options = DecodeOptions { indent_width: indent };
    let text = mapenv::decompile_to_bytes(&data, &options)
        .with_context(|| format!("failed to decompile {}", input.display()))?;
    write_atomic(output, &text)?;
    info!("wrote {} ({} bytes)", output.display(), text.len());
    Ok(())
}

fn cmd_info(input: &Path) -> Result<()> {
    let data = read_input(input)?;
    let container = Container::parse(&data).with_context(|| format!("failed to parse {}", input.display()))?;
    let header = container.header();
    debug!("{header:?}");
    println!("File:         {} ({} bytes)", input.display(), data.len());
    println!("Entries:      {}", header.entry_count);
    println!(
        "String blob:  {:#x}..{:#x} ({} strings)",
        header.string_blob_offset,
        header.tag_table_offset(),
        header.string_count
    );
    println!("Tags:");
    for entry in &container.tags().entries {
        let known = if Tag::from_hash(entry.hash).is_some() { "" } else { " (unknown)" };
        println!("  - {:#010x} {}{known}", entry.hash, entry.name);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match &cli.command {
        Command::Compile { input, output } => cmd_compile(input, output),
        Command::Decompile { input, output, indent } => cmd_decompile(input, output, *indent),
        Command::Info { input } => cmd_info(input),
    }
}
