use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Command-line client for the keystore gateway", long_about = None)]
struct Cli {
    #[arg(short, long, env = "GATEWAY_URL", default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new keystore account
    CreateAccount {
        #[arg(short, long, env = "GATEWAY_PASSWORD")]
        password: String,
    },
    /// Send ether from a keystore account
    Send {
        /// Sender address
        #[arg(long)]
        from: String,
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Amount in ether, e.g. 0.01
        #[arg(long)]
        value: String,
        #[arg(short, long, env = "GATEWAY_PASSWORD")]
        password: String,
    },
    /// List keystore accounts
    Accounts,
    /// Check gateway status
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::CreateAccount { password } => {
            client
                .post(format!("{}/create_account", base))
                .json(&json!({ "password": password }))
                .send()
                .await?
        }
        Commands::Send {
            from,
            to,
            value,
            password,
        } => {
            client
                .post(format!("{}/send_transaction", base))
                .json(&json!({
                    "address": from,
                    "password": password,
                    "to": to,
                    "value": value,
                }))
                .send()
                .await?
        }
        Commands::Accounts => client.get(format!("{}/accounts", base)).send().await?,
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
    } else {
        eprintln!("Error: gateway returned status {}", status);
        eprintln!("{}", rendered);
        std::process::exit(1);
    }
    Ok(())
}
