use anyhow::Result;
use clap::Parser;
use goto_build_cli::GotoBuild;
use std::io::{self, Write};

fn main() -> Result<()> {
    // stdout carries the result, so diagnostics must go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = GotoBuild::parse();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    args.execute(&mut out)?;
    out.flush()?;
    Ok(())
}
