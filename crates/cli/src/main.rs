use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{Catalog, CatalogStore};
use server::{RecommendationOrchestrator, RecommendationResult, RecommenderConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::warn;

/// Queries shown to first-time users, also used to drive the benchmark
const EXAMPLE_QUERIES: [&str; 7] = [
    "I want a war movie where a soldier comes home to a missing family",
    "Romantic comedy with witty dialogue and charming leads",
    "Dark psychological thriller with unreliable narrator",
    "Sci-fi movie about artificial intelligence and humanity",
    "Coming-of-age story set in a small town",
    "Action movie with elaborate heist sequences",
    "Horror film with supernatural elements and jump scares",
];

/// reel-query - describe a movie, get explained recommendations
#[derive(Parser)]
#[command(name = "reel-query")]
#[command(about = "Semantic movie recommendations from a free-text description", long_about = None)]
struct Cli {
    /// Catalog CSV (overrides CATALOG_PATH)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Precomputed overview embeddings (overrides EMBEDDINGS_PATH)
    #[arg(long)]
    embeddings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend movies for a description
    Recommend {
        /// What you are in the mood for
        query: String,

        /// Number of candidates to retrieve (defaults to DEFAULT_TOP_K)
        #[arg(long)]
        top_k: Option<usize>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the genre scores predicted for a description
    Genres {
        query: String,
    },

    /// Search the catalog by title
    Search {
        /// Title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// List example queries
    Examples,

    /// Run example queries against the full pipeline
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "20")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "4")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = RecommenderConfig::from_env().context("Failed to load configuration")?;
    if let Some(path) = cli.catalog {
        config.catalog_path = path;
    }
    if let Some(path) = cli.embeddings {
        config.embeddings_path = path;
    }

    match cli.command {
        Commands::Recommend { query, top_k, json } => {
            let top_k = top_k.unwrap_or(config.default_top_k);
            let orchestrator = build_orchestrator(&config)?;
            handle_recommend(&orchestrator, &query, top_k, json).await?
        }
        Commands::Genres { query } => {
            let orchestrator = build_orchestrator(&config)?;
            handle_genres(&orchestrator, &query).await?
        }
        Commands::Search { title } => handle_search(&config, &title)?,
        Commands::Examples => handle_examples(),
        Commands::Benchmark {
            requests,
            concurrent,
        } => {
            let orchestrator = build_orchestrator(&config)?;
            handle_benchmark(orchestrator, config.default_top_k, requests, concurrent).await?
        }
    }

    Ok(())
}

fn build_orchestrator(config: &RecommenderConfig) -> Result<RecommendationOrchestrator> {
    println!(
        "Loading catalog from {} and embeddings from {}...",
        config.catalog_path.display(),
        config.embeddings_path.display()
    );
    let start = Instant::now();
    let store = CatalogStore::load(&config.catalog_path, &config.embeddings_path)
        .context("Failed to load catalog store")?;
    println!(
        "{} Loaded {} items in {:?}",
        "✓".green(),
        store.catalog.len(),
        start.elapsed()
    );

    RecommendationOrchestrator::from_config(config, store).context("Failed to set up recommender")
}

/// Handle the 'recommend' command
async fn handle_recommend(
    orchestrator: &RecommendationOrchestrator,
    query: &str,
    top_k: usize,
    json: bool,
) -> Result<()> {
    let result = match orchestrator.recommend(query, top_k).await {
        Ok(result) => result,
        Err(e) => {
            warn!("{}", e);
            anyhow::bail!(e.user_message().red().to_string());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_recommendations(&result);
    }
    Ok(())
}

/// Handle the 'genres' command
async fn handle_genres(orchestrator: &RecommendationOrchestrator, query: &str) -> Result<()> {
    let predictions = orchestrator
        .predict_labels(query)
        .await
        .context("Genre prediction failed")?;
    let threshold = orchestrator.label_threshold();

    println!("{}", format!("Genre scores for '{}':", query).bold().blue());
    for prediction in predictions {
        let line = format!("  {:<16} {:.3}", prediction.label.label(), prediction.confidence);
        if prediction.confidence > threshold {
            println!("{}", line.green());
        } else {
            println!("{}", line.dimmed());
        }
    }
    println!("Accepted above {:.2}", threshold);
    Ok(())
}

/// Handle the 'search' command
fn handle_search(config: &RecommenderConfig, title: &str) -> Result<()> {
    let catalog = Catalog::load_from_file(&config.catalog_path).context("Failed to load catalog")?;
    let matches = catalog.search_titles(title);

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    for item in matches.iter().take(20) {
        let genres = item
            .genres
            .iter()
            .map(|g| g.label())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{}: {} ({}) [{}] avg {}",
            item.id,
            item.title,
            item.year.map(|y| y.to_string()).unwrap_or_else(|| "????".to_string()),
            genres,
            item.vote_average
                .map(|v| format!("{:.1}", v))
                .unwrap_or_else(|| "-".to_string())
        );
    }
    if matches.len() > 20 {
        println!("... and {} more", matches.len() - 20);
    }
    Ok(())
}

/// Handle the 'examples' command
fn handle_examples() {
    println!("{}", "Example queries:".bold().blue());
    for query in EXAMPLE_QUERIES {
        println!("  {} {}", "•".green(), query);
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    orchestrator: RecommendationOrchestrator,
    top_k: usize,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 {
        println!("No requests to run");
        return Ok(());
    }

    let limiter = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();

    let mut handles = Vec::with_capacity(requests);
    for _ in 0..requests {
        let query = EXAMPLE_QUERIES[rand::random::<u32>() as usize % EXAMPLE_QUERIES.len()];
        let orchestrator = orchestrator.clone();
        let limiter = limiter.clone();
        handles.push(tokio::spawn(async move {
            let _permit = limiter.acquire_owned().await?;
            let start = Instant::now();
            let result = orchestrator.recommend(query, top_k).await;
            Ok::<_, anyhow::Error>((start.elapsed(), result.map(|r| r.is_degraded())))
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    let mut failed = 0usize;
    let mut degraded = 0usize;
    for handle in handles {
        let (elapsed, outcome) = handle.await??;
        match outcome {
            Ok(true) => degraded += 1,
            Ok(false) => {}
            Err(e) => {
                warn!("Request failed: {}", e);
                failed += 1;
            }
        }
        timings.push(elapsed);
    }

    let total_time = wall_clock.elapsed();
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    timings.sort();
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} failed, {} degraded)", requests, failed, degraded);
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

fn print_recommendations(result: &RecommendationResult) {
    if !result.labels.is_empty() {
        let labels = result
            .labels
            .iter()
            .map(|g| g.label())
            .collect::<Vec<_>>()
            .join(", ");
        println!("{} {}", "Predicted genres:".cyan(), labels);
    }
    for degradation in &result.degradations {
        println!("{}", format!("! {}", degradation).yellow());
    }

    println!("{}", "Movie Recommendations:".bold().blue());
    if result.items.is_empty() {
        println!("No matching movies found");
        return;
    }

    for (i, rec) in result.items.iter().enumerate() {
        println!(
            "{}. {} ({})",
            (i + 1).to_string().green(),
            rec.title.bold(),
            rec.year.map(|y| y.to_string()).unwrap_or_else(|| "????".to_string())
        );
        if rec.is_fallback {
            println!("   {}", rec.explanation.dimmed());
        } else {
            println!("   {}", rec.explanation);
        }
        if let Some(poster) = &rec.poster_url {
            println!("   {}", poster.dimmed());
        }
    }
}
