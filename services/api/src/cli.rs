use crate::demo::{run_capacity_report, run_demo, CapacityReportArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use grant_desk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Grant Review Desk",
    about = "Run and demonstrate the grant review scoring and assignment engine",
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
    /// Workload and capacity planning views
    Workload {
        #[command(subcommand)]
        command: WorkloadCommand,
    },
    /// Run an end-to-end demo covering scoring, quorum, and assignment
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum WorkloadCommand {
    /// Print the evaluator capacity-planning report for a seeded pool
    Report(CapacityReportArgs),
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
        Command::Workload {
            command: WorkloadCommand::Report(args),
        } => run_capacity_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
