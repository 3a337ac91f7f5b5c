//! `warden-console` -- the users list screen in a terminal.
//!
//! Reads commands from stdin and prints the current page after each one.
//! Search text is debounced so a quick run of `s` commands fetches once.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default                 | Description                  |
//! |------------------------|----------|-------------------------|------------------------------|
//! | `WARDEN_API_URL`       | no       | `http://localhost:3000` | API server base URL          |
//! | `WARDEN_TOKEN`         | yes      | --                      | Bearer token of the operator |
//! | `REQUEST_TIMEOUT_SECS` | no       | `30`                    | Per-request timeout          |

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use warden_core::bulk::BulkAction;
use warden_core::list_query::codec::encode_compact;
use warden_core::list_query::FilterValue;
use warden_core::navigation::build_sidebar;
use warden_core::roles::PERM_VIEW_USERS;
use warden_core::types::RecordId;
use warden_core::users::USERS_TABLE;

use warden_console::client::{HttpBackend, ListBackend, Viewer, USERS_PATH};
use warden_console::config::ConsoleConfig;
use warden_console::debounce::{self, SEARCH_DEBOUNCE};
use warden_console::notice::NoticeLevel;
use warden_console::screen::ListScreen;

const HELP: &str = "\
commands:
  s <text>            search (debounced)
  f <col> <value>     filter a column; f <col> <start>..<end> for a range; f <col> to clear
  clear               drop search and filters
  o <col>             sort by column, again to flip direction
  n | p | g <page>    next, previous or given page
  per <n>             rows per page
  x <id>              toggle a row
  all                 toggle every row on the page
  delete | activate | deactivate
  nav                 show the sidebar
  q                   quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warden_console=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ConsoleConfig::from_env()?;
    tracing::info!(api_url = %config.api_url, "Starting warden-console");

    let backend = Arc::new(HttpBackend::new(config)?);
    let viewer = backend.me().await?;
    tracing::info!(user_id = viewer.user.id, roles = ?viewer.capabilities.roles, "Signed in");

    if !viewer.capabilities.can(PERM_VIEW_USERS) {
        anyhow::bail!("{} may not view users", viewer.user.email);
    }

    let mut screen = ListScreen::new(backend, &USERS_TABLE, RecordId::from(viewer.user.id));
    screen.reload().await;
    render(&mut screen);
    println!("{HELP}");

    let (search_tx, search_rx) = mpsc::channel::<String>(32);
    let mut searches = debounce::spawn(SEARCH_DEBOUNCE, search_rx);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match handle(&mut screen, &viewer, &search_tx, line.trim()).await {
                    Flow::Render => render(&mut screen),
                    Flow::Wait => {}
                    Flow::Quit => break,
                }
            }
            Some(text) = searches.recv() => {
                screen.search(text).await;
                render(&mut screen);
            }
        }
    }

    tracing::info!("Console closed");
    Ok(())
}

enum Flow {
    Render,
    Wait,
    Quit,
}

async fn handle<B: ListBackend>(
    screen: &mut ListScreen<B>,
    viewer: &Viewer,
    search_tx: &mpsc::Sender<String>,
    line: &str,
) -> Flow {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "" => return Flow::Wait,
        "q" | "quit" => return Flow::Quit,
        "s" => {
            if search_tx.send(rest.to_string()).await.is_err() {
                tracing::error!("Search debounce task stopped");
                return Flow::Quit;
            }
            return Flow::Wait;
        }
        "f" => {
            let (column, value) = rest.split_once(' ').unwrap_or((rest, ""));
            let value = match value.trim().split_once("..") {
                Some((start, end)) => FilterValue::range(start.trim(), end.trim()),
                None => FilterValue::scalar(value.trim()),
            };
            let state = screen.filters().with_filter(column, value);
            screen.navigate(state).await;
        }
        "clear" => {
            let state = screen.filters().cleared();
            screen.navigate(state).await;
        }
        "o" => screen.sort_by(rest).await,
        "n" | "p" => {
            let current = screen.filters().page;
            let target = if command == "n" { current + 1 } else { current.saturating_sub(1) };
            screen.go_to_page(target).await;
        }
        "g" => match rest.parse() {
            Ok(page) => screen.go_to_page(page).await,
            Err(_) => println!("page must be a number"),
        },
        "per" => match rest.parse() {
            Ok(per_page) => {
                let state = screen.filters().with_per_page(per_page);
                screen.navigate(state).await;
            }
            Err(_) => println!("rows per page must be a number"),
        },
        "x" => match rest.parse::<i64>() {
            Ok(id) => {
                screen.toggle(RecordId::from(id));
            }
            Err(_) => println!("id must be a number"),
        },
        "all" => screen.toggle_all(),
        "delete" | "activate" | "deactivate" => {
            if let Ok(action) = command.parse::<BulkAction>() {
                screen.run_bulk(action).await;
            }
        }
        "nav" => {
            let sidebar = build_sidebar(&viewer.capabilities);
            for section in &sidebar.sections {
                println!("{}", section.label);
                for item in &section.items {
                    println!("  {:<16} {}", item.title, item.href);
                }
            }
            for item in &sidebar.footer {
                println!("  {:<16} {}", item.title, item.href);
            }
            return Flow::Wait;
        }
        _ => {
            println!("{HELP}");
            return Flow::Wait;
        }
    }
    Flow::Render
}

fn render<B: ListBackend>(screen: &mut ListScreen<B>) {
    for notice in screen.drain_notices() {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Error => "error",
        };
        println!("[{tag}] {}", notice.message);
    }

    let Some(page) = screen.page() else {
        println!("(no data)");
        return;
    };

    let filters = screen.filters();
    println!(
        "search: {:?}  sort: {} {}  filters: {}",
        filters.search,
        filters.sort_field,
        filters.sort_direction,
        filters.filters.len()
    );
    let query = encode_compact(filters, &USERS_TABLE.defaults());
    if !query.is_empty() {
        println!("link: {USERS_PATH}?{query}");
    }
    println!("[{:?}]", screen.header_state());

    for row in &page.data {
        let mark = if screen.selection().is_selected(&row.record_id()) { "x" } else { " " };
        println!(
            "[{mark}] {:>5}  {:<24} {:<32} {:<8} {}  {}",
            row.id,
            row.name,
            row.email,
            if row.is_active { "active" } else { "inactive" },
            row.created_at.format("%Y-%m-%d"),
            row.roles.join(", ")
        );
    }

    let meta = &page.meta;
    match (meta.from, meta.to) {
        (Some(from), Some(to)) => println!(
            "showing {from}-{to} of {}  (page {}/{})",
            meta.total, meta.current_page, meta.last_page
        ),
        _ => println!(
            "no results  (page {}/{}, {} total)",
            meta.current_page, meta.last_page, meta.total
        ),
    }
}
