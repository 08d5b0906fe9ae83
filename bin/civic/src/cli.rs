pub use clap::{self, Parser};

use crate::opts::{AiOpts, HttpOpts, ReportOpts};

#[derive(Parser, Debug)]
#[clap(
    name = "civic",
    version,
    about,
    rename_all = "kebab-case",
    rename_all_env = "screaming-snake"
)]
pub struct Cli {
    /// Tokio worker threads (optional override)
    #[arg(long, env = "CIVIC_WORKER_THREADS")]
    pub worker_threads: Option<usize>,

    /// Subcommands
    #[clap(subcommand)]
    pub subcommand: Commands,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server
    Http {
        #[clap(flatten)]
        http: HttpOpts,

        #[clap(flatten)]
        ai: AiOpts,

        #[clap(flatten)]
        report: ReportOpts,
    },
    /// Look up issues similar to a report and print them as JSON
    Suggest {
        #[clap(flatten)]
        ai: AiOpts,

        #[arg(long)]
        description: String,

        #[arg(long)]
        location: String,
    },
    /// Summarize issue titles for an official and print the result as JSON
    Summarize {
        #[clap(flatten)]
        ai: AiOpts,

        /// Issue title, repeat for each issue
        #[arg(long = "issue")]
        issues: Vec<String>,
    },
}

impl Cli {
    pub fn create_runtime(
        worker_threads: Option<usize>,
    ) -> anyhow::Result<tokio::runtime::Runtime> {
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        if let Some(n) = worker_threads {
            builder.worker_threads(n);
        }
        builder.enable_all().build().map_err(Into::into)
    }
}
