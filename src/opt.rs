//! Command-line options.

use std::path::PathBuf;

use clap::{Parser, ValueEnum, crate_version};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use jobs_done_job::Repository;

/// Application subcommands.
#[derive(Parser)]
pub enum SubCommands {
    /// Resolve the jobs file and print every job, or write one file per job
    Resolve(ResolveOpts),

    /// Show a table of the jobs the file produces
    List(ListOpts),
}

/// Turn a `.jobs_done.yaml` file into fully resolved CI jobs
#[derive(Parser)]
#[clap(version = crate_version!())]
pub struct App {
    /// Subcommand.
    #[clap(subcommand)]
    pub subcommand: SubCommands,

    /// Enable verbose logging.
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

/// Serialization format of the resolved jobs
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    /// File extension used when writing jobs to a directory
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
        }
    }
}

/// The jobs file and the repository it is resolved for
#[derive(Parser, Clone, Debug)]
pub struct RepositoryOpts {
    /// Path of the jobs file.
    #[arg(short, long, default_value = ".jobs_done.yaml")]
    pub file: PathBuf,

    /// Clone url of the repository. The repository name is derived from it.
    #[arg(long, env = "JOBS_DONE_URL")]
    pub url: String,

    /// Branch the jobs are generated for.
    #[arg(long, env = "JOBS_DONE_BRANCH")]
    pub branch: String,

    /// Repository name, when it should not be derived from the url.
    #[arg(long, env = "JOBS_DONE_NAME")]
    pub name: Option<String>,
}

impl RepositoryOpts {
    pub fn repository(&self) -> Repository {
        let repository = Repository::new(&self.url, &self.branch);
        match &self.name {
            Some(name) => repository.with_name(name),
            None => repository,
        }
    }
}

/// Options for the `resolve` command
#[derive(Parser, Clone, Debug)]
pub struct ResolveOpts {
    #[command(flatten)]
    pub repository: RepositoryOpts,

    /// Output format.
    #[arg(long, default_value = "yaml")]
    pub format: OutputFormat,

    /// Write one file per job into `<OUTPUT_DIR>/<name>-<branch>/` instead of printing to
    /// stdout. Files of that group left over from an earlier run are removed.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

/// Options for the `list` command
#[derive(Parser, Clone, Debug)]
pub struct ListOpts {
    #[command(flatten)]
    pub repository: RepositoryOpts,
}
