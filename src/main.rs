use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;

use memfs::shell::{execute, parse_line};
use memfs::{FileSystem, Geometry, Journal, BLOCK_SIZE, NUM_BLOCKS};

#[derive(Parser)]
struct Args {
    /// Size of a block in bytes
    #[arg(long, default_value_t = BLOCK_SIZE)]
    block_size: usize,
    /// Number of blocks on the virtual disk
    #[arg(long, default_value_t = NUM_BLOCKS)]
    num_blocks: usize,
    /// Mirror the journal to this file (one JSON record per line)
    #[arg(long)]
    journal: Option<PathBuf>,
    /// Command script to run; reads standard input if omitted
    script: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let geometry = Geometry::new(args.block_size, args.num_blocks)?;

    let journal = match &args.journal {
        Some(path) => Journal::open(path)
            .with_context(|| format!("unable to open journal {}", path.display()))?,
        None => Journal::new(),
    };

    for record in journal.uncommitted() {
        warn!(
            "journal has an uncommitted {} of {}",
            record.action, record.path
        );
    }

    let mut fs = FileSystem::with_journal(geometry, journal);

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("unable to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    for line in input.lines() {
        let line = line.context("reading command")?;

        let output = parse_line(&line).and_then(|command| match command {
            Some(command) => execute(&mut fs, command).map(Some),
            None => Ok(None),
        });

        match output {
            Ok(Some(output)) => println!("{output}"),
            Ok(None) => {}
            Err(err) => println!("ERROR: {err:#}"),
        }
    }

    Ok(())
}
