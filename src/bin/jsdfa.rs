use anyhow::Result;
use clap::Parser;

use jsdfa::cli::args::CliArgs;
use jsdfa::cli::driver;

fn main() -> Result<()> {
    // Initialize tracing if JSDFA_LOG or RUST_LOG is set (zero cost otherwise).
    // Supports JSDFA_LOG_FORMAT=tree|json|text (see src/tracing_config.rs).
    jsdfa::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let output = driver::run(&args)?;
    println!("{output}");
    Ok(())
}
