use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

use secure_intake::config::{apply_env_overrides, read_config_file, IntakeConfig};
use secure_intake::lifecycle::startup::token_codec;
use secure_intake::security::cipher::generate_key;
use secure_intake::security::CallerIdentity;

#[derive(Parser)]
#[command(name = "intake-cli")]
#[command(about = "Operator CLI for the Secure Intake API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token sent with API requests
    #[arg(short, long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random base64 AES-256 key for ENCRYPTION_KEY
    GenKey,
    /// Sign a bearer token with the configured secret
    IssueToken {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        role: String,
        /// Lifetime in seconds (defaults to auth.token_ttl_secs)
        #[arg(long)]
        ttl_secs: Option<u64>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Submit a client record
    Create {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        ssn: String,
        #[arg(long)]
        date_of_birth: String,
        #[arg(long)]
        address: String,
    },
    /// Check API liveness
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::GenKey => {
            println!("{}", generate_key());
        }
        Commands::IssueToken {
            id,
            role,
            ttl_secs,
            config,
        } => {
            let mut settings = match config {
                Some(path) => read_config_file(&path)?,
                None => IntakeConfig::default(),
            };
            apply_env_overrides(&mut settings, |name| std::env::var(name).ok())?;

            let codec = token_codec(&settings.auth)?
                .ok_or("no signing secret configured (set SECRET_KEY or auth.signing_secret)")?;
            let ttl = ttl_secs.map(Duration::from_secs).unwrap_or(codec.default_ttl());
            let token = codec.issue(&CallerIdentity::new(id, role), ttl)?;
            println!("{}", token);
        }
        Commands::Create {
            full_name,
            ssn,
            date_of_birth,
            address,
        } => {
            let client = reqwest::Client::new();
            let res = client
                .post(format!("{}/clients", cli.url))
                .headers(auth_headers(cli.token.as_deref())?)
                .json(&json!({
                    "full_name": full_name,
                    "ssn": ssn,
                    "date_of_birth": date_of_birth,
                    "address": address,
                }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = reqwest::Client::new()
                .get(format!("{}/health", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn auth_headers(token: Option<&str>) -> Result<HeaderMap, Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
    }
    Ok(headers)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Intake API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
