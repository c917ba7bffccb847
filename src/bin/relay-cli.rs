use clap::{Parser, Subcommand};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// The relay answered, but not with success.
#[derive(Debug, Error)]
#[error("relay returned status {status}{}", body_suffix(.body))]
struct RelayStatusError {
    status: StatusCode,
    body: String,
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", body)
    }
}

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Management CLI for a running live-reload relay", long_about = None)]
struct Cli {
    /// Base URL of the notification listener
    #[arg(short, long, default_value = "http://localhost:3001")]
    url: String,

    /// Trigger path configured on the relay
    #[arg(long, default_value = "/reload")]
    trigger_path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tell every connected browser to reload
    Trigger,
    /// Show relay version and connected browser count
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Trigger => {
            let res = client
                .post(format!("{}{}", base, cli.trigger_path))
                .send()
                .await?;
            ensure_success(res).await?;
            println!("Reload triggered");
        }
        Commands::Status => {
            let res = client.get(format!("{}/status", base)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

/// Turn a non-success response into an error so the exit code reflects it.
async fn ensure_success(res: reqwest::Response) -> Result<reqwest::Response, RelayStatusError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(RelayStatusError { status, body })
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let json: Value = ensure_success(res).await?.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
