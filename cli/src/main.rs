mod api;
mod input;
mod models;
mod render;
mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{Value, json};

use crate::api::ApiClient;
use crate::models::{Bill, CreatedParty, Item, JoinResult, LoginInfo, PartyDetail, PartySummary, Store};
use crate::session::{Identity, SessionStore};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("not logged in; run `nikit login --email <email>` first")]
    NotLoggedIn,
    #[error("could not determine a config directory; set NIKIT_HOME")]
    NoConfigDir,
    #[error("{0}")]
    InvalidArgument(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("identity cache error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "nikit", about = "NiKit group grocery shopping client")]
struct Cli {
    #[arg(long, env = "NIKIT_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// Directory holding the cached identity.
    #[arg(long, env = "NIKIT_HOME")]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in (or register) by email and cache the identity.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        nickname: Option<String>,
    },
    /// Forget the cached identity.
    Logout,
    /// Request the host badge for the cached user.
    Host,
    /// List parties, nearest first when a location is given.
    Parties {
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
    },
    /// Open a new party as the cached user.
    Create {
        #[arg(long)]
        mart: String,
        #[arg(long)]
        title: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM
        #[arg(long)]
        time: String,
        #[arg(long, default_value = "")]
        place: String,
        #[arg(long, default_value_t = 4)]
        max: i32,
    },
    /// Show a party with its shopping list.
    Room { party_id: i64 },
    Join { party_id: i64 },
    /// Propose an item for the shopping list.
    Propose {
        party_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: i64,
    },
    Vote {
        party_id: i64,
        item_id: i64,
        #[arg(long)]
        disagree: bool,
    },
    /// Submit real prices for confirmed items and show the bill.
    Settle {
        party_id: i64,
        /// itemId=won, repeatable
        #[arg(long = "price", value_parser = input::parse_price_override)]
        prices: Vec<(i64, i64)>,
    },
    /// Mark the cached user's share as paid.
    Paid { party_id: i64 },
    Stores {
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
    },
    /// Keyword place search.
    Search { keyword: String },
}

struct CliContext {
    api: ApiClient,
    session: SessionStore,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let ctx = CliContext { api: ApiClient::new(&cli.base_url), session: SessionStore::locate(cli.home.as_deref())? };

    match cli.command {
        Command::Login { email, nickname } => run_login(&ctx, &email, nickname.as_deref()).await,
        Command::Logout => run_logout(&ctx),
        Command::Host => run_host(&ctx).await,
        Command::Parties { lat, lng } => run_parties(&ctx, lat.zip(lng)).await,
        Command::Create { mart, title, date, time, place, max } => {
            let meet_time = input::meet_time(&date, &time)?;
            run_create(&ctx, &mart, &title, &meet_time, &place, max).await
        }
        Command::Room { party_id } => print_room(&ctx, party_id).await,
        Command::Join { party_id } => run_join(&ctx, party_id).await,
        Command::Propose { party_id, name, price } => run_propose(&ctx, party_id, &name, price).await,
        Command::Vote { party_id, item_id, disagree } => run_vote(&ctx, party_id, item_id, !disagree).await,
        Command::Settle { party_id, prices } => run_settle(&ctx, party_id, &prices).await,
        Command::Paid { party_id } => run_paid(&ctx, party_id).await,
        Command::Stores { lat, lng } => run_stores(&ctx, lat.zip(lng)).await,
        Command::Search { keyword } => run_search(&ctx, &keyword).await,
    }
}

fn location_query(origin: Option<(f64, f64)>) -> Vec<(&'static str, String)> {
    origin.map_or_else(Vec::new, |(lat, lng)| vec![("lat", lat.to_string()), ("lng", lng.to_string())])
}

// =============================================================================
// ACCOUNT
// =============================================================================

async fn run_login(ctx: &CliContext, email: &str, nickname: Option<&str>) -> Result<(), CliError> {
    let info: LoginInfo = ctx.api.post("/users/login", &json!({ "email": email, "nickname": nickname })).await?;
    ctx.session.save(&Identity { user_id: info.user_id, nickname: info.nickname.clone(), host: info.host })?;

    let badge = if info.host { " (host)" } else { "" };
    let region = info.region.map(|r| format!(" · {r}")).unwrap_or_default();
    println!("Logged in as {}{badge} [user {}]{region}", info.nickname, info.user_id);
    Ok(())
}

fn run_logout(ctx: &CliContext) -> Result<(), CliError> {
    if ctx.session.clear()? {
        println!("Logged out ({} removed).", ctx.session.path().display());
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

async fn run_host(ctx: &CliContext) -> Result<(), CliError> {
    let me = ctx.session.require()?;
    let info: LoginInfo = ctx.api.post_empty(&format!("/users/{}/host", me.user_id)).await?;
    ctx.session.save(&Identity { host: info.host, ..me })?;
    println!("{} now has the host badge.", info.nickname);
    Ok(())
}

// =============================================================================
// PARTIES
// =============================================================================

async fn run_parties(ctx: &CliContext, origin: Option<(f64, f64)>) -> Result<(), CliError> {
    let parties: Vec<PartySummary> = ctx.api.get_with_query("/parties", &location_query(origin)).await?;
    println!("{}", render::render_parties(&parties));
    Ok(())
}

async fn run_create(
    ctx: &CliContext,
    mart: &str,
    title: &str,
    meet_time: &str,
    place: &str,
    max: i32,
) -> Result<(), CliError> {
    let me = ctx.session.require()?;
    let body = json!({
        "hostId": me.user_id,
        "martName": mart,
        "title": title,
        "meetTime": meet_time,
        "meetPlace": place,
        "maxMembers": max,
    });
    let created: CreatedParty = ctx.api.post("/parties", &body).await?;
    println!("Created party #{}.", created.party_id);
    print_room(ctx, created.party_id).await
}

async fn print_room(ctx: &CliContext, party_id: i64) -> Result<(), CliError> {
    let party: PartyDetail = ctx.api.get(&format!("/parties/{party_id}")).await?;
    let items: Vec<Item> = ctx.api.get(&format!("/parties/{party_id}/items")).await?;
    let me = ctx.session.load()?.map(|id| id.user_id);
    println!("{}", render::render_room(&party, &items, me));
    Ok(())
}

async fn run_join(ctx: &CliContext, party_id: i64) -> Result<(), CliError> {
    let me = ctx.session.require()?;
    let joined: JoinResult =
        ctx.api.post(&format!("/parties/{party_id}/join"), &json!({ "userId": me.user_id })).await?;
    if joined.joined {
        println!("{} ({})", joined.message, joined.role);
    }
    print_room(ctx, party_id).await
}

// =============================================================================
// SHOPPING
// =============================================================================

async fn run_propose(ctx: &CliContext, party_id: i64, name: &str, price: i64) -> Result<(), CliError> {
    let me = ctx.session.require()?;
    let body = json!({ "userId": me.user_id, "name": name, "price": price });
    let item: Item = ctx.api.post(&format!("/parties/{party_id}/items"), &body).await?;
    println!("Proposed [{}] {}.", item.item_id, item.name);
    print_room(ctx, party_id).await
}

async fn run_vote(ctx: &CliContext, party_id: i64, item_id: i64, agree: bool) -> Result<(), CliError> {
    let me = ctx.session.require()?;
    let body = json!({ "userId": me.user_id, "agree": agree });
    let item: Item = ctx.api.post(&format!("/parties/{party_id}/items/{item_id}/vote"), &body).await?;
    let state = if item.confirmed { "confirmed" } else { "not confirmed" };
    println!("Voted on [{}] {}: {} agree, {state}.", item.item_id, item.name, item.agree_count);
    print_room(ctx, party_id).await
}

// =============================================================================
// SETTLEMENT
// =============================================================================

async fn run_settle(ctx: &CliContext, party_id: i64, prices: &[(i64, i64)]) -> Result<(), CliError> {
    let me = ctx.session.load()?.map(|id| id.user_id);
    let items: Vec<Item> = ctx.api.get(&format!("/parties/{party_id}/items")).await?;
    let entries = input::settlement_entries(&items, prices)?;

    let bills: Vec<Bill> =
        ctx.api.post(&format!("/parties/{party_id}/settlement"), &json!({ "items": entries })).await?;
    println!("{}", render::render_settlement(&bills, me));
    Ok(())
}

async fn run_paid(ctx: &CliContext, party_id: i64) -> Result<(), CliError> {
    let me = ctx.session.require()?;
    let _: Value =
        ctx.api.post(&format!("/parties/{party_id}/settlement/complete"), &json!({ "userId": me.user_id })).await?;
    println!("Payment recorded for {} in party #{party_id}.", me.nickname);
    Ok(())
}

// =============================================================================
// STORES
// =============================================================================

async fn run_stores(ctx: &CliContext, origin: Option<(f64, f64)>) -> Result<(), CliError> {
    let stores: Vec<Store> = ctx.api.get_with_query("/stores/nearby", &location_query(origin)).await?;
    println!("{}", render::render_stores(&stores));
    Ok(())
}

async fn run_search(ctx: &CliContext, keyword: &str) -> Result<(), CliError> {
    let found: Value = ctx.api.get_with_query("/map/search", &[("keyword", keyword.to_owned())]).await?;
    println!("{}", render::render_places(found.get("places").unwrap_or(&Value::Null)));
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
