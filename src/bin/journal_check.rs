use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use memfs::Journal;

/// Reports writes whose intent record has no matching commit.
#[derive(Parser)]
struct Args {
    /// Journal file written by `memfs --journal`
    journal_file: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let journal = Journal::load(&args.journal_file)
        .with_context(|| format!("unable to open {}", args.journal_file.display()))?;

    let uncommitted = journal.uncommitted();
    for record in &uncommitted {
        println!("uncommitted {}: {}", record.action, record.path);
    }

    if !uncommitted.is_empty() {
        bail!("{} of {} records are uncommitted intents", uncommitted.len(), journal.len());
    }

    println!("{} records, all committed", journal.len());

    Ok(())
}
