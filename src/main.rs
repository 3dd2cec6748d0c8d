use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::mpsc;

use crfnews::api::ContentClient;
use crfnews::app::{App, AppEvent};
use crfnews::config::Config;
use crfnews::feed::{
    load_detail, CategoryFilter, DetailState, DisplayItem, FeedLoader, LoadOutcome, PostDetail,
};
use crfnews::ui;
use crfnews::util::{html_to_blocks, html_to_plain, validate_url, BlockKind};

#[derive(Parser, Debug)]
#[command(
    name = "crfnews",
    version,
    about = "Terminal reader for the CRF-AL news and publications feed"
)]
struct Args {
    /// Config file (default: ~/.config/crfnews/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Content API base URL, overrides the config file
    #[arg(long, value_name = "URL", global = true)]
    api_base: Option<String>,

    /// Posts requested per page, overrides the config file
    #[arg(long, value_name = "N", global = true)]
    per_page: Option<u32>,

    /// Only show posts of this category
    #[arg(long, value_name = "NAME", global = true)]
    category: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of posts as plain text
    List {
        /// Page to print, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Follow pagination to the last page
        #[arg(long, conflicts_with = "page")]
        all_pages: bool,
    },
    /// Print a single post by its slug
    Show {
        /// Post slug, as in /publicacao/<slug>
        slug: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr so `list` and `show` output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let base_url = match &args.api_base {
        Some(raw) => validate_url(raw).with_context(|| format!("Invalid --api-base '{}'", raw))?,
        None => config.api_base().context("Invalid api_base_url in config")?,
    };
    tracing::debug!(base_url = %base_url, per_page = config.per_page, "Using content API");

    let client = ContentClient::new(base_url, config.request_timeout())
        .context("Failed to create HTTP client")?;

    let filter = match args.category.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => CategoryFilter::category(name),
        _ => CategoryFilter::All,
    };

    match args.command {
        Some(Command::List { page, all_pages }) => {
            run_list(client, &config, filter, page, all_pages).await?
        }
        Some(Command::Show { slug }) => return run_show(client, &config, &slug).await,
        None => run_tui(client, &config, filter).await?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Load the config file and apply command-line overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match args.config.clone().or_else(Config::default_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            tracing::debug!("HOME not set, using default configuration");
            Config::default()
        }
    };

    if let Some(per_page) = args.per_page {
        if per_page == 0 || per_page > Config::MAX_PER_PAGE {
            anyhow::bail!("--per-page must be between 1 and {}", Config::MAX_PER_PAGE);
        }
        config.per_page = per_page;
    }
    Ok(config)
}

async fn run_tui(client: ContentClient, config: &Config, filter: CategoryFilter) -> Result<()> {
    let mut app = App::new(client, config);
    app.set_filter(filter);

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    // Run the TUI; the list is mounted (page 1 requested) on entry
    ui::run(&mut app, event_tx, event_rx).await?;
    Ok(())
}

async fn run_list(
    client: ContentClient,
    config: &Config,
    filter: CategoryFilter,
    page: u32,
    all_pages: bool,
) -> Result<()> {
    if page == 0 {
        anyhow::bail!("--page starts at 1");
    }

    let mut loader = FeedLoader::new(client.clone(), config.per_page, config.item_mapper());
    loader.set_filter(filter);

    if all_pages {
        let mut outcome = loader.load_page(1).await;
        while let LoadOutcome::Applied { .. } = outcome {
            if !loader.should_load_more() {
                break;
            }
            outcome = loader.load_more().await;
        }
        if let LoadOutcome::Failed(error) = outcome {
            anyhow::bail!("Failed to load posts: {}", error);
        }
        print_items(&loader.visible_items());
        let state = loader.state();
        println!(
            "{} posts shown, {} loaded from {} pages",
            loader.visible_items().len(),
            state.items().len(),
            state.current_page()
        );
        return Ok(());
    }

    // A single page past the first is fetched directly; the loader only
    // accepts pages in order.
    let result = client
        .fetch_page(page, config.per_page)
        .await
        .with_context(|| format!("Failed to load page {}", page))?;
    let items = config.item_mapper().map_all(&result.posts);
    let filter = loader.state().active_filter().clone();
    let visible: Vec<&DisplayItem> = items.iter().filter(|item| filter.matches(item)).collect();
    print_items(&visible);
    match result.total_pages {
        Some(total) => println!("Page {} of {}", page, total.max(page)),
        None => println!("Page {}", page),
    }
    Ok(())
}

fn print_items(items: &[&DisplayItem]) {
    if items.is_empty() {
        println!("No news in this category.");
        return;
    }
    for item in items {
        println!("[{}] {}", item.category, item.published_at);
        println!("  {}", html_to_plain(&item.title));
        println!("  {}", item.excerpt);
        println!("  {}", item.link.as_deref().unwrap_or(&item.detail_url));
        println!();
    }
}

/// Print one post. An unknown slug is reported on stderr with exit code 1.
async fn run_show(client: ContentClient, config: &Config, slug: &str) -> Result<ExitCode> {
    match load_detail(&client, slug, &config.item_mapper()).await {
        DetailState::Loaded(detail) => {
            print_detail(&detail);
            Ok(ExitCode::SUCCESS)
        }
        DetailState::NotFound { slug } => {
            eprintln!("Post not found: {}", slug);
            Ok(ExitCode::FAILURE)
        }
        DetailState::Failed { error, .. } => {
            Err(anyhow::anyhow!("Failed to load post '{}': {}", slug, error))
        }
        DetailState::Idle | DetailState::Loading { .. } => Ok(ExitCode::SUCCESS),
    }
}

fn print_detail(detail: &PostDetail) {
    println!("{}", html_to_plain(&detail.title));
    println!("[{}] {}", detail.category, detail.published_at);
    if let Some(link) = &detail.link {
        println!("{}", link);
    }
    println!();
    for block in html_to_blocks(&detail.content_html) {
        match block.kind {
            BlockKind::Heading => println!("## {}\n", block.text),
            BlockKind::Paragraph => println!("{}\n", block.text),
            BlockKind::ListItem => println!("  • {}", block.text),
            BlockKind::Quote => println!("> {}\n", block.text),
            BlockKind::Image => println!("[Image: {}]", block.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_show_unknown_slug_exits_with_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let base = Url::parse(&format!("{}/wp-json/wp/v2/", server.uri())).unwrap();
        let client = ContentClient::new(base, Duration::from_secs(5)).unwrap();
        let code = run_show(client, &Config::default(), "nao-existe").await.unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }
}
