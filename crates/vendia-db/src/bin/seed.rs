//! # Seed Data Generator
//!
//! Populates the database with test products and customers for development.
//!
//! ## Usage
//! ```bash
//! # Generate 500 products (default)
//! cargo run -p vendia-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p vendia-db --bin seed -- --count 2000
//!
//! # Specify database path
//! cargo run -p vendia-db --bin seed -- --db ./data/vendia.db
//! ```
//!
//! ## Generated Data
//! - Products across hardware/stationery/electronics style categories,
//!   each with a unique code `{CAT}-{INDEX}`, a price, opening stock, and
//!   a reorder threshold.
//! - A set of named customers with staggered credit limits, so credit
//!   sale flows can be exercised out of the box.

use std::env;

use chrono::Utc;
use tracing_subscriber::EnvFilter;

use vendia_core::{Customer, Product};
use vendia_db::repository::{customer::generate_customer_id, product::generate_product_id};
use vendia_db::{Database, DbConfig};

/// Product categories for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "HW",
        &[
            "Claw Hammer",
            "Screwdriver Set",
            "Adjustable Wrench",
            "Tape Measure",
            "Utility Knife",
            "Hand Saw",
            "Pliers",
            "Spirit Level",
            "Allen Key Set",
            "Wood Chisel",
            "Paint Brush",
            "Paint Roller",
            "Sanding Block",
            "Wire Cutter",
            "Socket Set",
        ],
    ),
    (
        "ST",
        &[
            "Ballpoint Pen",
            "Gel Pen",
            "Pencil HB",
            "Notebook A4",
            "Notebook A5",
            "Stapler",
            "Staples Box",
            "Paper Clips",
            "Binder Clips",
            "Highlighter",
            "Permanent Marker",
            "Whiteboard Marker",
            "Correction Tape",
            "Ruler 30cm",
            "Scissors",
        ],
    ),
    (
        "EL",
        &[
            "USB Cable",
            "HDMI Cable",
            "Power Strip",
            "Extension Cord",
            "LED Bulb",
            "Batteries AA",
            "Batteries AAA",
            "Phone Charger",
            "Mouse",
            "Keyboard",
            "Webcam",
            "Headphones",
            "USB Hub",
            "SD Card",
            "Flash Drive",
        ],
    ),
];

/// Pack variants that multiply the base catalog into distinct SKU-like codes
const VARIANTS: &[(&str, i64)] = &[
    ("Single", 0),
    ("2-Pack", 150),
    ("6-Pack", 400),
    ("Bulk", 900),
];

const CUSTOMERS: &[(&str, i64)] = &[
    ("Walk-in", 0),
    ("Acme Construction", 500_000),
    ("Riverside School", 250_000),
    ("Delta Electronics", 1_000_000),
    ("Corner Cafe", 100_000),
    ("Northside Clinic", 300_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./vendia_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vendia Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./vendia_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Vendia Seed Data Generator");
    println!("==========================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating customers...");
    for (name, credit_limit_cents) in CUSTOMERS {
        let now = Utc::now();
        db.customers()
            .insert(&Customer {
                id: generate_customer_id(),
                name: name.to_string(),
                credit_limit_cents: *credit_limit_cents,
                credit_used_cents: 0,
                last_purchase: None,
                total_purchases_cents: 0,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }
    println!("✓ Generated {} customers", CUSTOMERS.len());

    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (category_idx, (category_code, names)) in CATEGORIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (variant_idx, (variant, price_addon)) in VARIANTS.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let index = category_idx * 1000 + name_idx * 10 + variant_idx;
                let product = generate_product(category_code, name, variant, *price_addon, index);

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.code, e);
                    continue;
                }

                generated += 1;
                if generated % 100 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    let low = db.products().list_low_stock(10).await?;
    println!("  Low-stock products: {}", low.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with deterministic pseudo-random data.
fn generate_product(category: &str, name: &str, variant: &str, price_addon: i64, index: usize) -> Product {
    let now = Utc::now();

    // cheap deterministic spread, no rng dependency needed
    let base_price = 199 + ((index as i64 * 37) % 1800);
    let stock = (index as i64 * 13) % 120;
    let min_stock = 5 + ((index as i64 * 7) % 15);

    Product {
        id: generate_product_id(),
        code: format!("{}-{:04}", category, index),
        name: format!("{} ({})", name, variant),
        price_cents: base_price + price_addon,
        stock,
        min_stock,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
