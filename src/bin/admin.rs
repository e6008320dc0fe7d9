//! CLI administration tool for link-shortener.
//!
//! Provides commands for issuing the admin token, managing links, viewing
//! statistics, and performing database operations without HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Generate an admin token and its ADMIN_TOKEN_HASH
//! cargo run --bin admin -- token create
//!
//! # Hash an existing token (prints only the hash)
//! cargo run --bin admin -- token hash "my-admin-token"
//!
//! # List links
//! cargo run --bin admin -- links list --page 2
//!
//! # Delete a link
//! cargo run --bin admin -- links delete Ab3dE9
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Prune expired rate-limit attempts
//! cargo run --bin admin -- attempts prune
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `TOKEN_SIGNING_SECRET` (token commands): HMAC key shared with the server
//! - `DATABASE_URL` or `DB_*` (other commands): PostgreSQL connection
//! - `RATE_LIMIT_WINDOW_SECS` (attempts prune): window length, default 8 hours

use link_shortener::application::services::auth_service::hash_token;
use link_shortener::application::services::rate_limiter::DEFAULT_WINDOW_SECS;
use link_shortener::application::services::{LinkService, RateLimitPolicy, StatsService};
use link_shortener::config::{Config, MAX_WINDOW_SECS};
use link_shortener::domain::attempt_sweeper::sweep_once;
use link_shortener::infrastructure::persistence::{PgAttemptRepository, PgLinkRepository};

use anyhow::{Context, Result};
use chrono::{TimeDelta, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::PgPool;
use std::sync::Arc;

type PgLinkService = LinkService<PgLinkRepository, PgAttemptRepository>;

/// CLI tool for managing link-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Issue or hash the admin token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Manage links
    Links {
        #[command(subcommand)]
        action: LinksAction,
    },

    /// Show statistics
    Stats,

    /// Rate-limit attempt records
    Attempts {
        #[command(subcommand)]
        action: AttemptsAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Admin token subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Generate a new admin token and print its ADMIN_TOKEN_HASH
    Create {
        /// Custom token value (optional, auto-generated if not provided)
        #[arg(short, long)]
        token: Option<String>,
    },

    /// Print the ADMIN_TOKEN_HASH for an existing token
    Hash {
        token: String,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinksAction {
    /// List links, newest first
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        #[arg(short = 's', long, default_value_t = 25)]
        page_size: u32,
    },

    /// Show one link
    Show { code: String },

    /// Delete a link
    Delete {
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Attempt record subcommands.
#[derive(Subcommand)]
enum AttemptsAction {
    /// Delete attempts older than the rate-limit window
    Prune,
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Token { action } => handle_token_action(action)?,
        Commands::Links { action } => handle_links_action(action, &connect().await?).await?,
        Commands::Stats => handle_stats(&connect().await?).await?,
        Commands::Attempts { action } => handle_attempts_action(action, &connect().await?).await?,
        Commands::Db { action } => handle_db_action(action, &connect().await?).await?,
    }

    Ok(())
}

/// Connects using `DATABASE_URL` or the `DB_*` components.
async fn connect() -> Result<PgPool> {
    let database_url = Config::load_database_url().context("Database is not configured")?;

    PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")
}

fn signing_secret() -> Result<String> {
    std::env::var("TOKEN_SIGNING_SECRET").context("TOKEN_SIGNING_SECRET must be set")
}

/// Dispatches token commands. These never touch the database.
fn handle_token_action(action: TokenAction) -> Result<()> {
    let secret = signing_secret()?;

    match action {
        TokenAction::Create { token } => create_token(&secret, token),
        TokenAction::Hash { token } => {
            println!("{}", hash_token(&secret, &token));
            Ok(())
        }
    }
}

/// Generates (or accepts) an admin token and prints the server setting.
///
/// The raw token is shown once; only its HMAC goes into the server's
/// environment.
fn create_token(secret: &str, token: Option<String>) -> Result<()> {
    println!("{}", "🔑 Create Admin Token".bright_blue().bold());
    println!();

    let token_value = match token {
        Some(t) => {
            println!("{}", "⚠️  Using provided token value".yellow());
            t
        }
        None => {
            println!("{}", "✨ Generated new token".green());
            generate_token()
        }
    };

    println!();
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();
    println!("{}", "Add this to the server environment:".bright_white());
    println!(
        "  {}={}",
        "ADMIN_TOKEN_HASH".bright_cyan(),
        hash_token(secret, &token_value)
    );
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/admin/stats",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

fn link_service(pool: &PgPool) -> PgLinkService {
    let pool = Arc::new(pool.clone());

    LinkService::new(
        Arc::new(PgLinkRepository::new(pool.clone())),
        Arc::new(PgAttemptRepository::new(pool)),
        RateLimitPolicy::default(),
        1,
    )
}

/// Dispatches link management commands.
async fn handle_links_action(action: LinksAction, pool: &PgPool) -> Result<()> {
    let service = link_service(pool);

    match action {
        LinksAction::List { page, page_size } => list_links(&service, page, page_size).await,
        LinksAction::Show { code } => show_link(&service, &code).await,
        LinksAction::Delete { code, yes } => delete_link(&service, &code, yes).await,
    }
}

/// Lists links with click counts.
///
/// # Output Format
///
/// ```text
/// 📋 Links (page 1/3, 57 total)
///
///   Code                 Clicks   Created            Target
///   ─────────────────────────────────────────────────────────────────────
///   Ab3dE9               12       2026-01-15 10:30   https://example.com
/// ```
async fn list_links(service: &PgLinkService, page: u32, page_size: u32) -> Result<()> {
    let result = service
        .list_links(page, page_size)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    println!(
        "{}",
        format!(
            "📋 Links (page {}/{}, {} total)",
            result.page,
            result.total_pages.max(1),
            result.total
        )
        .bright_blue()
        .bold()
    );
    println!();

    if result.items.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<20} {:<8} {:<18} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Created".bright_white().bold(),
        "Target".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &result.items {
        println!(
            "  {:<20} {:<8} {:<18} {}",
            link.code.cyan(),
            link.click_count.to_string().bright_green(),
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            link.target_url
        );
    }
    println!();

    Ok(())
}

async fn show_link(service: &PgLinkService, code: &str) -> Result<()> {
    let link = service
        .get_link(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("  Code:         {}", link.code.cyan().bold());
    println!("  Target:       {}", link.target_url);
    println!("  Clicks:       {}", link.click_count.to_string().bright_green());
    println!("  Created by:   {}", link.created_by);
    if let Some(ref owner) = link.owner_client_id {
        println!("  Client id:    {}", owner.bright_black());
    }
    println!("  Created:      {}", link.created_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(updated) = link.updated_at {
        println!("  Rebound:      {}", updated.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(clicked) = link.last_clicked_at {
        println!("  Last click:   {}", clicked.format("%Y-%m-%d %H:%M:%S"));
    }

    Ok(())
}

/// Deletes a link after confirmation (default: No).
async fn delete_link(service: &PgLinkService, code: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑️  Delete Link".bright_blue().bold());
    println!();

    let link = service
        .get_link(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("  Code:   {}", link.code.cyan());
    println!("  Target: {}", link.target_url);
    println!("  Clicks: {}", link.click_count);
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete_link(code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!("{}", "✅ Link deleted".green().bold());
    println!();

    Ok(())
}

/// Displays link totals and the most clicked links.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let service = StatsService::new(Arc::new(PgLinkRepository::new(Arc::new(pool.clone()))));
    let summary = service
        .summary(Utc::now())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load statistics: {}", e))?;

    let attempts_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM client_attempts")
        .fetch_one(pool)
        .await?;

    println!(
        "  Links:           {}",
        summary.total_links.to_string().bright_green().bold()
    );
    println!(
        "  Created today:   {}",
        summary.links_today.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:          {}",
        summary.total_clicks.to_string().bright_green().bold()
    );
    println!(
        "  Avg clicks/link: {}",
        summary.average_clicks.to_string().bright_green().bold()
    );
    println!(
        "  Attempt records: {}",
        attempts_count.to_string().bright_green().bold()
    );

    if !summary.top_links.is_empty() {
        println!();
        println!("{}", "  Top links:".bright_white().bold());
        for link in &summary.top_links {
            println!(
                "    {:<20} {:>8}  {}",
                link.code.cyan(),
                link.click_count.to_string().bright_green(),
                link.target_url.bright_black()
            );
        }
    }
    println!();

    Ok(())
}

/// Handles attempt record maintenance.
async fn handle_attempts_action(action: AttemptsAction, pool: &PgPool) -> Result<()> {
    match action {
        AttemptsAction::Prune => {
            let window_secs: i64 = match std::env::var("RATE_LIMIT_WINDOW_SECS") {
                Ok(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("RATE_LIMIT_WINDOW_SECS has invalid value '{raw}'"))?,
                Err(_) => DEFAULT_WINDOW_SECS,
            };
            if !(1..=MAX_WINDOW_SECS).contains(&window_secs) {
                anyhow::bail!("RATE_LIMIT_WINDOW_SECS must be between 1 and {MAX_WINDOW_SECS}");
            }

            let repo = PgAttemptRepository::new(Arc::new(pool.clone()));
            let removed = sweep_once(&repo, TimeDelta::seconds(window_secs)).await;

            println!(
                "{} {}",
                "✅ Pruned attempts:".green().bold(),
                removed.to_string().bright_white()
            );
        }
    }

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}

/// Generates a cryptographically random admin token.
///
/// # Format
///
/// - Length: 48 characters
/// - Character set: A-Z, a-z, 0-9
/// - Entropy: ~286 bits
fn generate_token() -> String {
    const TOKEN_LEN: usize = 48;

    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}
