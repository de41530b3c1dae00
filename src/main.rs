//! `tar-vfs` binary: an interactive shell over a tar-backed virtual file system.
//!
//! Usage:
//!   tar-vfs --hostname pc --vfs fs.tar --log log.csv
//!
//!   # start from an empty archive
//!   tar-vfs --vfs fs.tar --log log.csv --init
//!
//! Logging goes to stderr; `RUST_LOG` takes precedence over `--debug`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use tar_vfs::{ArchiveStore, AuditLog, Outcome, Shell, TarArchive, VirtualTree};

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

/// Shell emulator over a tar archive.
#[derive(Parser, Debug)]
#[command(name = "tar-vfs", version)]
#[command(about = "Shell emulator over a tar-backed virtual file system")]
struct Args {
    /// Name shown in the prompt
    #[arg(long, default_value = "localhost")]
    hostname: String,

    /// Path to the tar archive backing the file system
    #[arg(long)]
    vfs: PathBuf,

    /// Path to the CSV audit log (truncated on start)
    #[arg(long)]
    log: PathBuf,

    /// Create an empty archive if `--vfs` does not exist
    #[arg(long)]
    init: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let archive = if args.init && !args.vfs.exists() {
        TarArchive::create(&args.vfs)
    } else {
        TarArchive::open(&args.vfs)
    }
    .with_context(|| format!("cannot open archive {}", args.vfs.display()))?;

    let tree = VirtualTree::build(archive).context("failed to load the virtual file system")?;
    let audit = AuditLog::create(&args.log)
        .with_context(|| format!("cannot initialize log {}", args.log.display()))?;
    info!(
        "session started on {} with archive {}",
        args.hostname,
        args.vfs.display()
    );

    let mut shell = Shell::new(args.hostname, tree, audit);
    run(&mut shell)
}

fn run<S: ArchiveStore>(shell: &mut Shell<S>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        write!(stdout, "{}", shell.prompt())?;
        stdout.flush()?;

        let Some(line) = lines.next() else {
            // EOF
            writeln!(stdout)?;
            break;
        };
        match shell.execute(&line?) {
            Outcome::Output(text) if text.is_empty() => {}
            Outcome::Output(text) => writeln!(stdout, "{text}")?,
            Outcome::Clear => write!(stdout, "{CLEAR_SCREEN}")?,
            Outcome::Exit => break,
        }
    }
    Ok(())
}
