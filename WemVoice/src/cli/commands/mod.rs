use clap::Subcommand;
use std::path::PathBuf;

pub mod config_cmd;
pub mod inspect;
pub mod run;

#[derive(Subcommand)]
pub enum Commands {
    /// Match descriptors to voice files and copy them to <id>.wem
    Run {
        /// Folder containing .txtp descriptors
        #[arg(short, long)]
        descriptors: Option<PathBuf>,

        /// Folder containing .mp3/.wem voice files
        #[arg(short, long)]
        voices: Option<PathBuf>,

        /// Folder receiving the <id>.wem files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file (defaults to ./wemvoice.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Folder for the run logs (default: logs)
        #[arg(long)]
        logs: Option<PathBuf>,

        /// Do not write run logs
        #[arg(long, conflicts_with = "logs")]
        no_logs: bool,

        /// Number of worker threads (default: one per core)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,

        /// Suppress progress bars
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show the id, codec and lookup key of descriptor files
    Parse {
        /// .txtp files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Config file for descriptor name rewrites
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show the canonical key of voice file paths
    Normalize {
        /// Voice file paths
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Index a voice folder and list keys and collisions
    Index {
        /// Folder containing .mp3/.wem voice files
        #[arg(short, long)]
        voices: PathBuf,

        /// Only show counts and collisions
        #[arg(long)]
        count: bool,
    },

    /// Configuration file utilities
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write the default configuration
    Init {
        /// Output file (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show {
        /// Config file (defaults to ./wemvoice.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Run {
                descriptors,
                voices,
                output,
                config,
                logs,
                no_logs,
                jobs,
                json,
                quiet,
            } => run::execute(&run::RunArgs {
                descriptors: descriptors.clone(),
                voices: voices.clone(),
                output: output.clone(),
                config: config.clone(),
                logs: logs.clone(),
                no_logs: *no_logs,
                jobs: *jobs,
                json: *json,
                quiet: *quiet,
            }),
            Commands::Parse { files, config } => inspect::parse(files, config.as_deref()),
            Commands::Normalize { paths } => inspect::normalize(paths),
            Commands::Index { voices, count } => inspect::index(voices, *count),
            Commands::Config { command } => command.execute(),
        }
    }
}

impl ConfigCommands {
    /// Execute the selected config command.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be read or written.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            ConfigCommands::Init { output, force } => config_cmd::init(output.as_deref(), *force),
            ConfigCommands::Show { config } => config_cmd::show(config.as_deref()),
        }
    }
}
