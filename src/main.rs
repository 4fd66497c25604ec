//! History Viewer command line front end.
//!
//! `history` and `screenshots` print one page from the configured remote API;
//! `demo` walks both controllers through an in-memory backend.

use std::process::ExitCode;
use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate, Offset, TimeZone, Utc};
use clap::{Parser, Subcommand};

use history_viewer::app::App;
use history_viewer::controllers::history_controller::HistoryController;
use history_viewer::controllers::screenshot_controller::{Preconfirmed, ScreenshotController};
use history_viewer::services::memory_data_service::InMemoryDataService;
use history_viewer::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use history_viewer::types::page::PageItem;
use history_viewer::types::screenshot::ImageSource;

#[derive(Parser)]
#[command(name = "history-viewer", version, about = "Browse history and screenshots from a remote API")]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Overrides api.base_url from the settings file
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print one page of browsing history grouped by date
    History {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Only entries from this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print one page of screenshots
    Screenshots {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Only screenshots from this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Run both views against an in-memory backend
    Demo,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Demo => {
            run_demo().await;
            Ok(())
        }
        Command::History { page, date } => match build_app(cli.config, cli.api_url) {
            Ok(app) => print_history(&app, page, date).await,
            Err(e) => Err(e),
        },
        Command::Screenshots { page, date } => match build_app(cli.config, cli.api_url) {
            Ok(app) => print_screenshots(&app, page, date).await,
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn build_app(config: Option<String>, api_url: Option<String>) -> Result<App, String> {
    let mut engine = SettingsEngine::new(config);
    let mut settings = engine.load().map_err(|e| e.to_string())?;
    if let Some(url) = api_url {
        settings.api.base_url = url;
    }
    App::from_settings(settings).map_err(|e| e.to_string())
}

fn render_pages(items: &[PageItem], current: u32) -> String {
    items
        .iter()
        .map(|item| match item {
            PageItem::Page(n) if *n == current => format!("[{}]", n),
            PageItem::Page(n) => n.to_string(),
            PageItem::Gap => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

async fn print_history(app: &App, page: u32, date: Option<NaiveDate>) -> Result<(), String> {
    app.history
        .load(page, date)
        .await
        .map_err(|e| e.user_message().to_string())?;
    print_history_page(&app.history);
    Ok(())
}

fn print_history_page(history: &HistoryController) {
    let snapshot = history.snapshot();
    if snapshot.groups.is_empty() {
        println!("No history.");
    }
    for group in snapshot.groups.iter() {
        println!("{}  ({} entries)", group.date, group.entries.len());
        for entry in &group.entries {
            println!(
                "  {}  {}",
                entry.timestamp.with_timezone(&Local).format("%H:%M:%S"),
                entry.url
            );
        }
    }
    println!(
        "Page {} of {} · {} total · {}",
        snapshot.page.current_page,
        snapshot.page.total_pages,
        snapshot.page.total_count,
        render_pages(&history.page_numbers(), snapshot.page.current_page)
    );
}

async fn print_screenshots(app: &App, page: u32, date: Option<NaiveDate>) -> Result<(), String> {
    app.screenshots
        .load(page, date)
        .await
        .map_err(|e| e.user_message().to_string())?;
    print_screenshot_page(&app.screenshots);
    Ok(())
}

fn print_screenshot_page(screenshots: &ScreenshotController) {
    let snapshot = screenshots.snapshot();
    println!("Total Screenshots: {}", snapshot.page.total_count);
    for (index, entry) in snapshot.page.items.iter().enumerate() {
        let kind = match entry.image_source() {
            Ok(ImageSource::Url(url)) => url,
            Ok(ImageSource::Inline { mime, bytes }) => format!("{} ({} bytes)", mime, bytes.len()),
            Err(e) => format!("unreadable: {}", e),
        };
        println!(
            "  #{:<4} {}  {}",
            index,
            entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
            kind
        );
    }
    println!(
        "Page {} of {} · {}",
        snapshot.page.current_page,
        snapshot.page.total_pages,
        render_pages(&screenshots.pagination_window(), snapshot.page.current_page)
    );
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

async fn run_demo() {
    let service = Arc::new(InMemoryDataService::new());
    let start = Utc.with_ymd_and_hms(2024, 5, 3, 18, 0, 0).single().unwrap_or_else(Utc::now);

    for i in 0..9 {
        service.add_history(
            &format!("https://example.com/article/{}", i),
            start - Duration::hours(i * 7),
        );
    }
    for i in 0..12 {
        service.add_screenshot(
            &format!("https://cdn.example.com/shots/{}.png", i),
            start - Duration::hours(i * 5),
        );
    }

    section("History");
    // The in-memory backend filters and deletes by UTC date.
    let history = HistoryController::new(service.clone(), 4).with_time_zone(Utc.fix());
    if let Err(e) = history.mount().await {
        println!("  {}", e.user_message());
        return;
    }
    print_history_page(&history);

    let snapshot = history.snapshot();
    if let Some(group) = snapshot.groups.iter().next() {
        if let Some(entry) = group.entries.first() {
            match history.delete_item(&entry.id, group.date).await {
                Ok(_) => println!("  Deleted {}", entry.url),
                Err(e) => println!("  {}", e.user_message()),
            }
        }
        match history.delete_all_for_date(group.date).await {
            Ok(n) => println!("  All history for {} has been deleted ({} shown).", group.date, n),
            Err(e) => println!("  {}", e.user_message()),
        }
    }
    match history.next_page().await {
        Ok(_) => print_history_page(&history),
        Err(e) => println!("  {}", e.user_message()),
    }

    section("Screenshots");
    let screenshots = ScreenshotController::new(service.clone(), 1);
    if let Err(e) = screenshots.mount().await {
        println!("  {}", e.user_message());
        return;
    }
    for page in [1, 6, 12] {
        if let Err(e) = screenshots.change_page(page).await {
            println!("  {}", e.user_message());
            continue;
        }
        println!(
            "  page {:>2}: {}",
            page,
            render_pages(&screenshots.pagination_window(), page)
        );
    }

    if let Err(e) = screenshots.load(1, None).await {
        println!("  {}", e.user_message());
        return;
    }
    screenshots.open_fullscreen(0);
    println!("  full-screen at {:?}", screenshots.fullscreen_index());
    println!("  next -> {:?}", screenshots.next_screenshot());

    let date = start.date_naive();
    if let Err(e) = screenshots.set_filter(date).await {
        println!("  {}", e.user_message());
        return;
    }
    print_screenshot_page(&screenshots);
    match screenshots.delete_all_for_filter(&Preconfirmed(true)).await {
        Ok(result) => println!("  bulk delete for {}: {:?}", date, result),
        Err(e) => println!("  {}", e.user_message()),
    }
    print_screenshot_page(&screenshots);
}
