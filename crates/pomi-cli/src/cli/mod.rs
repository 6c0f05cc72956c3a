//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use pomi_client::api::AuthApi;
use pomi_client::config::Config;
use pomi_client::http::ApiClient;
use pomi_client::tokens::TokenStore;
use pomi_client::types::RegisterRequest;

mod commands;

#[derive(Parser)]
#[command(name = "pomi")]
#[command(version = "0.1")]
#[command(about = "Pomi community platform CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create a new account and sign in
    Register {
        /// Email address for the new account
        #[arg(long)]
        email: String,

        /// Username for the new account
        #[arg(long)]
        username: String,

        /// Password (or set POMI_PASSWORD)
        #[arg(long, env = "POMI_PASSWORD", hide_env_values = true)]
        password: String,

        /// Optional first name
        #[arg(long)]
        first_name: Option<String>,

        /// Optional last name
        #[arg(long)]
        last_name: Option<String>,
    },

    /// Sign in with email and password
    Login {
        /// Email address
        #[arg(long)]
        email: String,

        /// Password (or set POMI_PASSWORD)
        #[arg(long, env = "POMI_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and clear stored tokens
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

/// Structured logging on stderr, filtered by RUST_LOG.
fn init_logging() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let format = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(format)
        .init();
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Register {
            email,
            username,
            password,
            first_name,
            last_name,
        } => {
            let request = RegisterRequest {
                email,
                username,
                password,
                first_name,
                last_name,
            };
            commands::auth::register(auth_api()?, &request).await
        }

        Commands::Login { email, password } => {
            commands::auth::login(auth_api()?, &email, &password).await
        }

        Commands::Logout => commands::auth::logout(auth_api()?).await,

        Commands::Whoami => commands::auth::whoami(auth_api()?).await,

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}

/// Builds the auth façade from config and the default token store.
fn auth_api() -> Result<AuthApi> {
    let config = Config::load().context("load config")?;
    let client = ApiClient::with_timeout(
        config.effective_base_url(),
        TokenStore::new(),
        config.timeout_secs,
    )
    .context("build http client")?;
    Ok(AuthApi::new(client))
}
