//! `squash-server` command line.
//!
//! Opens the configured backend (applying migrations for the SQL backends)
//! and prints what is stored. Backend flags fall back to the same
//! environment variables the deployed service reads, and a `.env` file in
//! the working directory is loaded first.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use squash_server::config::{is_production, BackendConfig, BackendSettings};
use squash_server::persistence::{self, AnyStore, LeagueRepository, UserRepository};
use squash_server::service::LeagueService;

#[derive(Parser)]
#[command(name = "squash-server", about = "Squash league storage tools")]
struct Cli {
    /// Postgres connection string; takes precedence over `--db-path`.
    #[arg(long, env = "POSTGRES_DSN", global = true)]
    postgres_dsn: Option<String>,

    #[arg(long, env = "POSTGRES_MIGRATIONS_DIR", global = true)]
    postgres_migrations_dir: Option<PathBuf>,

    /// SQLite database file, created if missing.
    #[arg(long, env = "DB_PATH", global = true)]
    db_path: Option<PathBuf>,

    #[arg(long, env = "DB_MIGRATIONS_DIR", global = true)]
    db_migrations_dir: Option<PathBuf>,

    /// Deployment name; `prod` turns off demo data for the in-memory store.
    #[arg(long, env = "APP", global = true)]
    app: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the backend and apply pending migrations.
    Migrate,
    /// List users by name.
    Users,
    /// List leagues, newest first.
    Leagues,
    /// Print the standings table of a league.
    Standings {
        #[arg(long)]
        league: String,
    },
    /// Show results waiting for a user's confirmation.
    Pending {
        /// Email of the user.
        #[arg(long)]
        user: String,
    },
}

impl Cli {
    fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            postgres_dsn: self.postgres_dsn.clone(),
            postgres_migrations_dir: self.postgres_migrations_dir.clone(),
            sqlite_path: self.db_path.clone(),
            sqlite_migrations_dir: self.db_migrations_dir.clone(),
            production: is_production(self.app.as_deref()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    use tracing_subscriber::fmt::format::FmtSpan;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = BackendConfig::resolve(&cli.backend_settings());
    tracing::info!(backend = config.backend_name(), "Opening store");

    let store = persistence::open_store(&config)
        .await
        .with_context(|| format!("failed to open the {} store", config.backend_name()))?;

    match cli.command {
        Commands::Migrate => {
            tracing::info!(backend = store.backend_name(), "Store is up to date");
        }
        Commands::Users => print_users(&store).await?,
        Commands::Leagues => print_leagues(&store).await?,
        Commands::Standings { league } => print_standings(LeagueService::new(store), &league).await?,
        Commands::Pending { user } => print_pending(LeagueService::new(store), &user).await?,
    }

    Ok(())
}

async fn print_users(store: &AnyStore) -> anyhow::Result<()> {
    println!("{:<38} {:<28} {:<32} {:<12} ROLE", "ID", "NAME", "EMAIL", "SKILL");
    for user in store.list_users().await? {
        println!(
            "{:<38} {:<28} {:<32} {:<12} {}",
            user.id,
            user.full_name(),
            user.email,
            user.skill.as_str(),
            user.role.as_str()
        );
    }
    Ok(())
}

async fn print_leagues(store: &AnyStore) -> anyhow::Result<()> {
    println!("{:<38} {:<28} {:<10} {:>5} {:>8} START", "ID", "NAME", "STATUS", "SETS", "PLAYERS");
    for league in store.list_leagues().await? {
        println!(
            "{:<38} {:<28} {:<10} {:>5} {:>8} {}",
            league.id,
            league.name,
            league.status.as_str(),
            league.sets_per_match,
            league.player_ids.len(),
            league.start_date.format("%Y-%m-%d")
        );
    }
    Ok(())
}

async fn print_standings(service: LeagueService<AnyStore>, league_id: &str) -> anyhow::Result<()> {
    let league = service.store().require_league(league_id).await?;
    let table = service.league_standings(league_id).await?;

    println!("{} ({} sets per match, {})", league.name, league.sets_per_match, league.status);
    println!("{:>3} {:<28} {:>4} {:>4} {:>7} {:>9}", "#", "PLAYER", "PTS", "MP", "SETS", "POINTS");
    for (rank, entry) in table.iter().enumerate() {
        println!(
            "{:>3} {:<28} {:>4} {:>4} {:>7} {:>9}",
            rank + 1,
            entry.player.full_name(),
            entry.points,
            entry.matches,
            format!("{}-{}", entry.sets_won, entry.sets_lost),
            format!("{}-{}", entry.points_won, entry.points_lost),
        );
    }
    Ok(())
}

async fn print_pending(service: LeagueService<AnyStore>, email: &str) -> anyhow::Result<()> {
    let user = service
        .store()
        .get_user_by_email(email)
        .await?
        .with_context(|| format!("no user with email {email}"))?;
    let pending = service.pending_for(&user).await?;

    if pending.is_empty() {
        println!("Nothing waiting for {}", user.full_name());
        return Ok(());
    }
    for m in &pending.matches {
        println!(
            "league   {} {} vs {} ({} sets) reported by {}",
            m.id,
            m.player_a_id,
            m.player_b_id,
            m.sets.len(),
            m.reported_by
        );
    }
    for m in &pending.friendlies {
        println!(
            "friendly {} {} vs {} played {}",
            m.id,
            m.player_a_id,
            m.player_b_id,
            m.played_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}
