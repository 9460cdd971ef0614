use crate::search::{run_search, SearchCommand};
use crate::server;
use clap::{Args, Parser, Subcommand};
use truck_finder::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "SF Food Truck Finder",
    about = "Search San Francisco mobile food facility permits over HTTP or from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run a single permit search and print the results
    Search {
        #[command(subcommand)]
        command: SearchCommand,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Search { command } => run_search(command).await,
    }
}
