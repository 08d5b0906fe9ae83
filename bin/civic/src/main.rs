pub mod api;
pub mod cli;
pub mod commands;

pub mod http;
pub mod model;
pub mod opts;

use anyhow::Result;
use atb::logging::init_tracer;

use crate::cli::{Cli, Commands, Parser};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracer(Default::default()).expect("tracer setup succeeds. qed");
    let runtime = Cli::create_runtime(cli.worker_threads)?;

    match cli.subcommand {
        Commands::Http { http, ai, report } => {
            runtime.block_on(async move { http::run(http, ai, report).await })
        }
        Commands::Suggest {
            ai,
            description,
            location,
        } => runtime.block_on(async move { commands::suggest(ai, description, location).await }),
        Commands::Summarize { ai, issues } => {
            runtime.block_on(async move { commands::summarize(ai, issues).await })
        }
    }
}
