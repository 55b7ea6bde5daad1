use crate::demo::{run_declare, run_demo, DeclareArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use declara::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Dividend Declaration Service",
    about = "Generate and serve the annual dividend-distribution tax declaration",
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
    /// Render a declaration file from a filing request document
    Declare(DeclareArgs),
    /// Run a filing demo over synthetic qualification records
    Demo(DemoArgs),
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
        Command::Declare(args) => run_declare(args),
        Command::Demo(args) => run_demo(args),
    }
}
