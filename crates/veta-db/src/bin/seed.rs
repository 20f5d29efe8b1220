//! # Seed Data Generator
//!
//! Populates the database with materials, products and a month of
//! withdrawals for local development.
//!
//! ## Usage
//! ```bash
//! # 300 withdrawals over the last 30 days (default)
//! cargo run -p veta-db --bin seed
//!
//! # Custom amount
//! cargo run -p veta-db --bin seed -- --count 2000
//!
//! # Specify database path
//! cargo run -p veta-db --bin seed -- --db ./data/veta.db
//! ```
//!
//! Every withdrawal goes through `WithdrawalRepository::create`, so the
//! generated codes follow the same sequence as production data.

use std::env;

use anyhow::Context;
use chrono::{Duration, Local, NaiveDateTime, Timelike};
use veta_core::{MaterialInput, ProductInput, WithdrawalInput};
use veta_db::{Database, DbConfig};

/// Materials and the products drawn from each, with their unit.
const CATALOG: &[(&str, &[(&str, &str)])] = &[
    (
        "Cobre",
        &[("Cable 10mm", "m"), ("Cable 16mm", "m"), ("Conector", "unidad")],
    ),
    (
        "Explosivos",
        &[("Emulsión", "kg"), ("Detonador", "unidad"), ("Cordón detonante", "m")],
    ),
    (
        "Madera",
        &[("Puntal 8x8", "unidad"), ("Tabla", "unidad"), ("Cuña", "unidad")],
    ),
    (
        "Acero",
        &[("Perno de anclaje", "unidad"), ("Malla", "m2"), ("Barra", "unidad")],
    ),
    ("Fe", &[("Clavo", "kg"), ("Alambre", "kg")]),
];

const LEVELS: &[&str] = &["900", "1050", "1200", "1350"];

const PEOPLE: &[&str] = &[
    "Rosa Quispe",
    "Juan Mamani",
    "Luis Condori",
    "Carmen Huamán",
    "Pedro Ccori",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "veta_db=warn".into()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 300;
    let mut db_path = String::from("./veta_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(300);
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
                println!("Veta Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of withdrawals to generate (default: 300)");
                println!("  -d, --db <PATH>    Database file path (default: ./veta_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Veta Seed Data Generator");
    println!("===========================");
    println!("Database:    {}", db_path);
    println!("Withdrawals: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {db_path}"))?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.materials().list(true).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} materials", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Catalog
    let mut products: Vec<(i64, i64)> = Vec::new();
    for (material_name, items) in CATALOG {
        let material = db
            .materials()
            .create(&MaterialInput {
                name: material_name.to_string(),
                active: None,
            })
            .await?;

        for (product_name, unit) in items.iter() {
            let product = db
                .products()
                .create(&ProductInput {
                    material_id: material.id,
                    name: product_name.to_string(),
                    unit: unit.to_string(),
                    active: None,
                })
                .await?;
            products.push((material.id, product.id));
        }
    }
    println!("✓ {} materials, {} products", CATALOG.len(), products.len());

    // Withdrawals, oldest first so codes grow with time
    println!();
    println!("Generating withdrawals...");

    let start = std::time::Instant::now();
    let now = Local::now().naive_local();
    let mut generated = 0;

    for seed in 0..count {
        let (material_id, product_id) = products[(seed * 7) % products.len()];
        let input = WithdrawalInput {
            material_id,
            product_id,
            level: LEVELS[(seed * 3) % LEVELS.len()].to_string(),
            responsible_name: PEOPLE[seed % PEOPLE.len()].to_string(),
            quantity: 1.0 + ((seed * 37) % 400) as f64 / 8.0,
            rumpero: (seed % 4 == 0).then(|| PEOPLE[(seed + 2) % PEOPLE.len()].to_string()),
            worker: Some(PEOPLE[(seed + 1) % PEOPLE.len()].to_string()),
            withdrawn_at: Some(timestamp(now, seed, count)),
            active: None,
        };

        if let Err(e) = db.withdrawals().create(&input).await {
            eprintln!("Failed to insert withdrawal {}: {}", seed, e);
            continue;
        }

        generated += 1;
        if generated % 100 == 0 {
            println!("  Generated {} withdrawals...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} withdrawals in {:?}", generated, elapsed);

    let missing = db.withdrawals().missing_codes().await?;
    println!("  Rows without code: {}", missing.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Spreads `count` withdrawals over the 30 days before `now`, during shifts.
fn timestamp(now: NaiveDateTime, seed: usize, count: usize) -> NaiveDateTime {
    let days_back = 30 - (seed * 30 / count.max(1)) as i64;
    let hour = 6 + (seed % 14) as i64;
    let minute = ((seed * 13) % 60) as i64;

    let day = now - Duration::days(days_back);
    let midnight = day
        .with_hour(0)
        .and_then(|d| d.with_minute(0))
        .and_then(|d| d.with_second(0))
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(day);

    midnight + Duration::hours(hour) + Duration::minutes(minute)
}
