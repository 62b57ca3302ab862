use data_loader::{CatalogStore, Genre};
use std::path::Path;
use std::time::Instant;

fn main() {
    let catalog_path = Path::new("data/movies.csv");
    let index_path = Path::new("data/overview_index.json");

    println!("Loading catalog and embedding index...\n");

    let start = Instant::now();
    let store = CatalogStore::load(catalog_path, index_path)
        .expect("Failed to load catalog store");
    let elapsed = start.elapsed();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Items: {}", store.catalog.len());
    println!("Distinct titles: {}", store.catalog.distinct_titles());
    println!(
        "Vectors: {} (dimension {}, model {})",
        store.embeddings.len(),
        store.embeddings.dimension(),
        store.embeddings.model().unwrap_or("unknown")
    );

    println!("\nItems per genre:");
    for genre in Genre::ALL {
        println!("  {:<16} {}", genre.label(), store.catalog.get_items_by_genre(genre).len());
    }
}
