use clap::Parser;
use docqa_cli::cli::Cli;
use docqa_telemetry::{init_json_telemetry, init_telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if cli.json_logs {
        init_json_telemetry("docqa");
    } else {
        init_telemetry("docqa");
    }

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut stdout = std::io::stdout().lock();
    docqa_cli::run(cli, &mut input, &mut stdout).await
}
