mod cmd;
mod output;
mod prompt;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "trigsync",
    about = "Configure function triggers from a catalog and keep the generated resources in sync",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .trigsync/ or .git/)
    #[arg(long, global = true, env = "TRIGSYNC_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize trigsync in the current project
    Init {
        /// Resource whose triggers are managed (names the catalog document)
        #[arg(long)]
        resource: Option<String>,

        /// Category of the resource that depends on the triggers
        #[arg(long)]
        category: Option<String>,

        /// Prefix for generated resource names (default: project name)
        #[arg(long)]
        prefix: Option<String>,
    },

    /// List available trigger kinds, or the templates of one kind
    Choices {
        /// Trigger kind whose templates to list
        #[arg(long)]
        trigger: Option<String>,
    },

    /// Choose triggers and templates interactively, then apply them
    Configure,

    /// Apply a selection non-interactively
    Apply {
        /// KIND=template[,template...]; every kind to keep enabled. Omit to
        /// keep the current kinds.
        #[arg(long = "select", value_name = "KIND=TEMPLATES")]
        select: Vec<String>,

        /// KIND=template[,template...] to uncheck
        #[arg(long = "remove", value_name = "KIND=TEMPLATES")]
        remove: Vec<String>,

        /// KIND:KEY=VALUE environment value for a trigger function
        #[arg(long = "env", value_name = "KIND:KEY=VALUE")]
        env: Vec<String>,
    },

    /// Show the current trigger selection and generated resources
    Status,

    /// List permission grants required by the selected templates
    Permissions,

    /// List environment variables required by a trigger kind
    Env {
        /// Trigger kind
        kind: String,
    },

    /// Remove every generated trigger resource
    RemoveAll,

    /// Validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init {
            resource,
            category,
            prefix,
        } => cmd::init::run(&root, resource, category, prefix),
        Commands::Choices { trigger } => cmd::choices::run(&root, trigger.as_deref(), cli.json),
        Commands::Configure => cmd::configure::run(&root, cli.json),
        Commands::Apply {
            select,
            remove,
            env,
        } => cmd::apply::run(&root, &select, &remove, &env, cli.json),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Permissions => cmd::permissions::run(&root, cli.json),
        Commands::Env { kind } => cmd::env::run(&root, &kind, cli.json),
        Commands::RemoveAll => cmd::remove_all::run(&root, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
