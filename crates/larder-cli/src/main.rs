use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use larder_cli::{Command, Config};
use larder_client::ElasticsearchClient;
use larder_core::{
    load_config, parse_items_file, AddItemRequest, AppError, SearchIndex, StorageService,
};
use larder_db::PgItemRepository;

type Service = StorageService<PgItemRepository, ElasticsearchClient>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Setup logging (stderr to keep stdout clean for JSON output)
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    // Parse command line arguments
    let config = Config::parse();

    let mut settings = load_config(config.config.as_deref())?;
    if let Some(url) = &config.elasticsearch_url {
        settings.search.url = url.clone();
    }

    let search_client = ElasticsearchClient::new(&settings.search.url, &settings.http)
        .context("Invalid Elasticsearch URL")?;

    // Search reads only the index, so it runs without a database
    if let Command::Search { query } = &config.command {
        let result = search(&SearchIndex::new(search_client), query).await;
        return report(result);
    }

    // Database connection
    let database_url = config.require_database_url()?;
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(settings.db.max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    let service = StorageService::new(
        PgItemRepository::pair(pool),
        SearchIndex::new(search_client),
    );

    // Execute command
    let result = match config.command {
        Command::Add {
            category,
            name,
            quantity,
            unit,
        } => {
            let request = AddItemRequest {
                category,
                name,
                quantity,
                unit: Some(unit),
            };
            add(&service, &request).await
        }
        Command::Remove { category, id } => remove(&service, id, category.as_deref()).await,
        Command::List {
            category,
            unit,
            name,
        } => list(&service, &category, &unit, &name).await,
        Command::Search { query } => search(service.index(), &query).await,
        Command::Import { file } => import(&service, &file).await,
    };

    report(result)
}

/// Replaces store and index errors with their user-facing message
fn report(result: anyhow::Result<()>) -> anyhow::Result<()> {
    result.map_err(|e| match e.downcast::<AppError>() {
        Ok(app_err) => anyhow::anyhow!(app_err.user_message()),
        Err(other) => other,
    })
}

/// Add a single item
async fn add(service: &Service, request: &AddItemRequest) -> anyhow::Result<()> {
    service.add(request).await?;
    info!("Item added: {}", request.name);
    Ok(())
}

/// Remove an item by id
async fn remove(service: &Service, id: i64, category: Option<&str>) -> anyhow::Result<()> {
    service.remove(id, category).await?;
    info!("Item {} has been successfully removed", id);
    Ok(())
}

/// Print a category's items as a JSON array
async fn list(service: &Service, category: &str, unit: &str, name: &str) -> anyhow::Result<()> {
    let items = service.list(category, Some(unit), name).await?;
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}

/// Print matching index documents as a JSON array
async fn search(index: &SearchIndex<ElasticsearchClient>, query: &str) -> anyhow::Result<()> {
    let results = index.search_by_name(query).await?;
    if results.is_empty() {
        info!("No items found for: \"{}\"", query);
    }
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

/// Add every item of a JSON file, stopping at the first failure
async fn import(service: &Service, file: &std::path::Path) -> anyhow::Result<()> {
    let source = file.display().to_string();
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", source))?;
    let items = parse_items_file(&contents, &source)?;
    let total = items.len();

    info!("Processing {} items from {}", total, source);
    for (i, item) in items.iter().enumerate() {
        if let Err(e) = service.add(item).await {
            return Err(anyhow::anyhow!(
                "Item {}/{} ({}) failed after {} added: {}",
                i + 1,
                total,
                item.name,
                i,
                e.user_message()
            ));
        }
        info!("[{}/{}] Added {}", i + 1, total, item.name);
    }

    info!("File processed successfully: {} items added", total);
    Ok(())
}
