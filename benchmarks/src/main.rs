use anyhow::Result;
use clap::Parser;
use env_logger::Builder;
use hopper_benchmarks::{args::Args, runner::BenchmarkRunner};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    Builder::new()
        .filter_module("hopper", args.verbose.log_level_filter())
        .init();

    let runner = BenchmarkRunner::init(&args)?;
    let results = runner.run(args).await?;

    println!("{results}");

    Ok(())
}
