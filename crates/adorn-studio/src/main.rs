use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;

use adorn_catalog::{Product, ProductFilter, SortKey};
use adorn_core::{
    spawn_session, AccessoryDescriptor, AnchorName, PlacementConfig, SessionConfig,
};
use config::Config;
use rig::{ConsoleRenderer, FsTransport, SyntheticDetector};

mod config;
mod rig;

#[derive(Parser)]
#[command(name = "adorn", about = "Adorn virtual try-on studio")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive a synthetic try-on session against a catalog product
    Run {
        /// Product id to try on (defaults to the first catalog product)
        #[arg(short, long, conflicts_with = "anchor")]
        product: Option<String>,
        /// Try a bare procedural accessory at this anchor instead of a
        /// catalog product, e.g. "forehead" or "left-ear"
        #[arg(short, long)]
        anchor: Option<String>,
        /// How many synthetic frames to run for
        #[arg(short, long, default_value_t = 120)]
        ticks: u64,
    },
    /// Browse the embedded shop catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// Print the anchor binding table
    Anchors,
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// List the shops in the catalog
    Shops,
    /// List products with filters, sorting and paging
    List {
        /// Shop id or slug (defaults to every shop)
        #[arg(short, long)]
        shop: Option<String>,
        /// Exact category, e.g. "earrings"
        #[arg(long)]
        category: Option<String>,
        /// Metal substring, e.g. "white gold"
        #[arg(long)]
        metal: Option<String>,
        /// Stone substring, e.g. "diamond"
        #[arg(long)]
        stone: Option<String>,
        #[arg(long)]
        min_price: Option<u64>,
        #[arg(long)]
        max_price: Option<u64>,
        /// Sort order: popular, newest, price-asc, price-desc
        #[arg(long, default_value = "popular")]
        sort: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = adorn_catalog::DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
    /// Show one product and its derived try-on descriptor
    Show {
        /// Product id
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { product, anchor, ticks } => run_tryon(product, anchor, ticks).await?,
        Commands::Catalog { command } => match command {
            CatalogCommands::Shops => list_shops(),
            CatalogCommands::List {
                shop,
                category,
                metal,
                stone,
                min_price,
                max_price,
                sort,
                page,
                page_size,
            } => {
                let filter = ProductFilter { category, metal, stone, min_price, max_price };
                list_products(shop, filter, &sort, page, page_size)?;
            }
            CatalogCommands::Show { id } => show_product(&id)?,
        },
        Commands::Anchors => print_anchors(),
    }

    Ok(())
}

/// Try a product on the synthetic rig and narrate the session.
async fn run_tryon(product_id: Option<String>, anchor: Option<String>, ticks: u64) -> Result<()> {
    let config = Config::from_env();
    let descriptor = match &anchor {
        Some(raw) => {
            let Some(anchor) = AnchorName::parse(raw) else {
                bail!("unknown anchor: {raw} (see `adorn anchors` for the known names)");
            };
            let descriptor = AccessoryDescriptor::procedural("demo", anchor);
            println!("Trying on a procedural accessory at the {} anchor", descriptor.anchor);
            descriptor
        }
        None => {
            let product = match &product_id {
                Some(id) => adorn_catalog::find_product(id)
                    .ok_or_else(|| anyhow!("unknown product id: {id}"))?,
                None => adorn_catalog::all_shops()
                    .iter()
                    .flat_map(|file| file.products.iter())
                    .next()
                    .ok_or_else(|| anyhow!("catalog is empty"))?,
            };
            let descriptor = product.descriptor();
            println!(
                "Trying on {} ({}) at the {} anchor",
                product.title, product.id, descriptor.anchor
            );
            descriptor
        }
    };

    let handle = spawn_session(
        Box::new(SyntheticDetector::new(&config)),
        Box::new(ConsoleRenderer::new()),
        Arc::new(FsTransport::new(config.asset_dir.clone())),
        SessionConfig {
            placement: PlacementConfig { camera_depth_bias: config.camera_depth_bias },
            // The synthetic detector paces itself at the configured tick.
            min_tick_interval: None,
        },
    );

    handle.set_accessory(descriptor).await?;
    handle.enable().await?;

    let deadline = tokio::time::sleep(Duration::from_millis(config.tick_ms.max(1) * ticks));
    tokio::pin!(deadline);
    let mut status_rx = handle.subscribe();
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = status_rx.borrow_and_update().clone();
                tracing::info!(
                    state = %status.state,
                    asset = ?status.asset,
                    instances = status.instances,
                    "session status"
                );
            }
        }
    }

    handle.disable().await?;
    let status = handle.status();
    println!("Session finished in state {}", status.state);
    if let Some(err) = status.last_error {
        println!("Last tracking error: {err}");
    }
    Ok(())
}

fn list_shops() {
    for file in adorn_catalog::all_shops() {
        let shop = &file.shop;
        println!(
            "{:<24} {:<26} {:<22} {:.1} ({} reviews), {} products",
            shop.id,
            shop.name,
            shop.location,
            shop.rating,
            shop.rating_count,
            file.products.len()
        );
    }
}

fn list_products(
    shop: Option<String>,
    filter: ProductFilter,
    sort: &str,
    page: usize,
    page_size: usize,
) -> Result<()> {
    let Some(sort) = SortKey::parse(sort) else {
        bail!("unknown sort key: {sort} (expected popular, newest, price-asc or price-desc)");
    };

    let products: Vec<Product> = match &shop {
        Some(target) => {
            if adorn_catalog::find_shop(target).is_none() {
                bail!("unknown shop: {target}");
            }
            adorn_catalog::products_for(target).to_vec()
        }
        None => adorn_catalog::all_shops()
            .iter()
            .flat_map(|file| file.products.iter().cloned())
            .collect(),
    };

    let listing = adorn_catalog::query(&products, &filter, sort, page, page_size);
    for product in &listing.items {
        println!(
            "{:<26} {:<34} {} {:>8} {:>4.1} {}",
            product.id,
            product.title,
            product.currency,
            product.price,
            product.rating,
            product.category
        );
    }
    println!("page {}/{} ({} matching)", listing.page, listing.total_pages, listing.total);
    Ok(())
}

fn show_product(id: &str) -> Result<()> {
    let product =
        adorn_catalog::find_product(id).ok_or_else(|| anyhow!("unknown product id: {id}"))?;

    println!("{}: {}", product.id, product.title);
    println!("  {}", product.short_description);
    println!("  category: {}", product.category);
    println!("  metal:    {}", product.metal);
    println!("  stone:    {}", product.stone);
    println!("  price:    {} {}", product.currency, product.price);
    println!("  rating:   {:.1} ({} reviews)", product.rating, product.rating_count);
    println!("  listed:   {}", product.created_at.format("%Y-%m-%d"));
    if !product.variants.is_empty() {
        println!("  variants:");
        for variant in &product.variants {
            println!("    {} ({}, {}, {:+})", variant.id, variant.metal, variant.size, variant.price_delta);
        }
    }
    println!("try-on descriptor:");
    println!("{}", serde_json::to_string_pretty(&product.descriptor())?);
    Ok(())
}

fn print_anchors() {
    println!("{:<10} {:>8} {:>6}", "anchor", "landmark", "drop");
    for anchor in AnchorName::all() {
        let binding = anchor.binding();
        println!("{:<10} {:>8} {:>6.1}", anchor.to_string(), binding.landmark, binding.vertical_offset);
    }
}
