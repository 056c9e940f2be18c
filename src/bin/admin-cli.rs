use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "storage-admin-cli")]
#[command(about = "Command-line client for the storage admin API", long_about = None)]
struct Cli {
    /// Server address, without the base path.
    #[arg(short, long, default_value = "http://127.0.0.1:3909", env = "STORAGE_ADMIN_URL")]
    url: String,

    /// Base path the server is mounted under.
    #[arg(long, default_value = "", env = "BASE_PATH")]
    base_path: String,

    /// Log in with this user before running the command.
    #[arg(long, env = "STORAGE_ADMIN_USER")]
    user: Option<String>,

    #[arg(long, env = "STORAGE_ADMIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List buckets with their details
    Buckets,
    /// Show the cached cluster configuration
    Config,
    /// Reload the cluster configuration
    ReloadConfig,
    /// Show whether auth is enabled and the session is authenticated
    Status,
    /// Check the credentials and exit
    Login,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::builder().cookie_store(true).build()?;
    let api = format!(
        "{}{}/api",
        cli.url.trim_end_matches('/'),
        cli.base_path.trim_end_matches('/')
    );

    if let Some(user) = &cli.user {
        let password = cli.password.clone().unwrap_or_default();
        let res = client
            .post(format!("{}/auth/login", api))
            .json(&json!({ "username": user, "password": password }))
            .send()
            .await?;
        if !res.status().is_success() || matches!(cli.command, Commands::Login) {
            return print_response(res).await;
        }
    }

    let res = match cli.command {
        Commands::Buckets => client.get(format!("{}/buckets", api)).send().await?,
        Commands::Config => client.get(format!("{}/config", api)).send().await?,
        Commands::ReloadConfig => client.post(format!("{}/config/reload", api)).send().await?,
        Commands::Status | Commands::Login => client.get(format!("{}/auth/status", api)).send().await?,
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

    if !status.is_success() {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string());
        eprintln!("Error: server returned status {}: {}", status, message);
        std::process::exit(1);
    }

    let data = body.get("data").cloned().unwrap_or(body);
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}
