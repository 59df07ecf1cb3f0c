mod cmd;
mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "closure",
    about = "Release test closure assistant: tracker queries, developer nudges and closure mail",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, env = "CLOSURE_PORT", default_value = "3000")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },

    /// Show which configuration variables are set
    Config,

    /// Print the tracker query for a named shape
    Jql {
        /// Query shape (open-release, dev-released, bugs, ...)
        shape: String,

        /// Sprint label, e.g. S138
        #[arg(long)]
        label: Option<String>,

        /// Component name
        #[arg(long)]
        component: Option<String>,
    },

    /// List release labels, newest first
    Labels,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Serve { port, host } => cmd::serve::run(&host, port),
        Commands::Config => cmd::config::run(cli.json),
        Commands::Jql {
            shape,
            label,
            component,
        } => cmd::jql::run(&shape, label.as_deref(), component.as_deref(), cli.json),
        Commands::Labels => cmd::labels::run(cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
