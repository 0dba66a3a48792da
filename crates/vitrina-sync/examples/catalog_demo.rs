//! End-to-end drive of the catalog engine against the in-memory backend.
//!
//! ```sh
//! cargo run -p vitrina-sync --example catalog_demo
//! RUST_LOG=debug cargo run -p vitrina-sync --example catalog_demo
//! ```

use std::sync::Arc;

use vitrina_sync::{CatalogConfig, CatalogEngine, InMemoryStore, StaticSession};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Seed a small catalog and one pre-existing favorite.
    let store = Arc::new(InMemoryStore::new());
    let catalog = [
        ("Electric Kettle", "1.7L, auto shutoff"),
        ("French Press", "Borosilicate glass, 600ml"),
        ("Milk Frother", "Battery powered"),
        ("Moka Pot", "Stovetop espresso, 6 cups"),
        ("Pour-Over Dripper", "Ceramic, size 02"),
        ("Tea Kettle", "Whistling, stainless"),
        ("Travel Mug", "Leak-proof, 450ml"),
    ];
    let mut ids = Vec::new();
    for (name, description) in catalog {
        ids.push(store.insert_product(name, description, Vec::new()));
    }
    let user = "demo-user";
    store.mark_favorite(user, &ids[0]);

    let mut config = CatalogConfig::default();
    config.catalog.page_size = 3;
    config.cache.dir = Some(std::env::temp_dir().join("vitrina-demo"));

    let engine = Arc::new(
        CatalogEngine::builder(config)
            .with_remote(store.clone())
            .with_favorites(store.clone())
            .with_session(Arc::new(StaticSession::signed_in(user)))
            .build()?,
    );

    // Cold start: render whatever the last run left on disk, then page
    // through the remote catalog.
    engine.restore_snapshot().await;
    while !engine.state().await.is_end_reached {
        engine.load_next_page().await?;
    }

    let state = engine.state().await;
    println!("loaded {} products:", state.items.len());
    for product in &state.items {
        let marker = if product.favorite { "★" } else { " " };
        println!("  {marker} {} ({})", product.name, product.description);
    }

    // Optimistic toggle, committed to the favorite collection.
    engine.toggle_favorite(&ids[5]).await?;
    println!(
        "toggled favorite on {:?}",
        engine.state().await.product(&ids[5]).map(|p| p.name.clone())
    );

    // Pure client-side search over the loaded items.
    let hits = engine.search("kettle").await;
    println!(
        "search \"kettle\": {:?}",
        hits.iter().map(|p| p.name.as_str()).collect::<Vec<_>>()
    );

    Ok(())
}
