use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use yak_client::config::{ClientConfig, normalize_base_url};
use yak_client::jwt;
use yak_client::net::api::{ApiClient, AuthScheme};
use yak_client::net::types::{Credentials, Registration, ScorePrediction};
use yak_client::router::{Navigation, Route, RouteGuard};
use yak_client::state::session::SessionStore;
use yak_client::state::storage::FileStorage;
use yak_client::ClientError;

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

#[derive(Parser, Debug)]
#[command(name = "yak", about = "Yak score-prediction game client")]
struct Cli {
    /// Server origin; overrides `YAK_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Session file; overrides `YAK_STORAGE_PATH`.
    #[arg(long)]
    storage_path: Option<PathBuf>,

    /// Send `Bearer: <token>` as older servers expect.
    #[arg(long, default_value_t = false)]
    legacy_bearer: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Signup(SignupArgs),
    Login(LoginArgs),
    Logout,
    /// Show whether the persisted session is still usable.
    Status,
    /// Evaluate the route guard for a view path.
    Navigate { path: String },
    #[command(flatten)]
    Api(ApiCommand),
}

/// Commands forwarded to the server with the current token.
#[derive(Subcommand, Debug)]
enum ApiCommand {
    /// List group names.
    Groups,
    /// Show the matches and bets of one group.
    Group { group_name: String },
    /// Submit a score prediction.
    Bet(BetArgs),
    /// List all of the current user's score bets.
    Bets,
    /// Show one score bet.
    Match { match_id: String },
    ScoreBoard,
    ComputePoints,
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    name: String,
    #[arg(long, env = "YAK_PASSWORD")]
    password: String,
}

#[derive(Args, Debug)]
struct SignupArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long, env = "YAK_PASSWORD")]
    password: String,
}

#[derive(Args, Debug)]
struct BetArgs {
    match_id: String,
    #[arg(long)]
    score1: Option<u32>,
    #[arg(long)]
    score2: Option<u32>,
    /// Use `POST` instead of `PATCH`, for older servers.
    #[arg(long, default_value_t = false)]
    post: bool,
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let api = ApiClient::from_config(&config)?;
    let storage = FileStorage::new(&config.storage_path, &config.storage_namespace);
    let mut store = SessionStore::restore(api, storage)?;

    let result = run(&mut store, &config, cli.command).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "command failed");
    }
    result
}

fn resolve_config(cli: &Cli) -> Result<ClientConfig, ClientError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = normalize_base_url(base_url)?;
    }
    if let Some(path) = &cli.storage_path {
        config.storage_path.clone_from(path);
    }
    if cli.legacy_bearer {
        config.auth_scheme = AuthScheme::LegacyColon;
    }
    Ok(config)
}

async fn run(
    store: &mut SessionStore<FileStorage>,
    config: &ClientConfig,
    command: Command,
) -> Result<(), ClientError> {
    match command {
        Command::Signup(args) => {
            let registration = Registration {
                name: args.name,
                first_name: args.first_name,
                last_name: args.last_name,
                password: args.password,
            };
            let session = store.signup(&registration).await?;
            println!("signed up and logged in as {}", session.user_name);
            Ok(())
        }
        Command::Login(args) => {
            let credentials = Credentials { name: args.name, password: args.password };
            let session = store.login(&credentials).await?;
            println!("logged in as {}", session.user_name);
            Ok(())
        }
        Command::Logout => {
            store.logout()?;
            println!("logged out");
            Ok(())
        }
        Command::Status => {
            print_status(store);
            Ok(())
        }
        Command::Navigate { path } => {
            let Some(target) = Route::parse(&path) else {
                println!("page not found: {path}");
                return Ok(());
            };
            match RouteGuard::new(config.erase_stale_token).before_each(store, target) {
                Navigation::Proceed(route) => println!("proceed {route}"),
                Navigation::Redirect(route) => println!("redirect {route}"),
            }
            Ok(())
        }
        Command::Api(command) => {
            let json = run_api(store, command).await?;
            print_json(&json)
        }
    }
}

async fn run_api(store: &SessionStore<FileStorage>, command: ApiCommand) -> Result<Value, ClientError> {
    match command {
        ApiCommand::Groups => store.get_group_names().await,
        ApiCommand::Group { group_name } => store.get_group(&group_name).await,
        ApiCommand::Bet(args) => {
            let payload = serde_json::to_value(ScorePrediction::new(args.score1, args.score2))?;
            if args.post {
                store.post_match(&args.match_id, payload).await
            } else {
                store.patch_scores(&args.match_id, payload).await
            }
        }
        ApiCommand::Bets => store.get_scores().await,
        ApiCommand::Match { match_id } => store.get_match(&match_id).await,
        ApiCommand::ScoreBoard => store.get_score_board().await,
        ApiCommand::ComputePoints => store.compute_points().await,
    }
}

fn print_status(store: &SessionStore<FileStorage>) {
    let Some(token) = store.token() else {
        println!("not logged in");
        return;
    };
    match jwt::decode_claims(token) {
        Ok(claims) if store.is_authenticated() => println!("authenticated (expires at unix {:.0})", claims.exp),
        Ok(claims) => println!("session expired (at unix {:.0})", claims.exp),
        Err(e) => println!("stored token is unusable: {e}"),
    }
}

fn print_json(value: &Value) -> Result<(), ClientError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
