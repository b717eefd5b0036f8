//! # Seed Data Generator
//!
//! Populates a store database for development: a small catalog whose opening
//! stock is received through the ledger, a loyalty member and sample
//! promotions.
//!
//! ## Usage
//! ```bash
//! cargo run -p minimart-ledger --bin seed
//!
//! # Specify database path (otherwise MINIMART_DB_PATH or ./minimart.db)
//! cargo run -p minimart-ledger --bin seed -- --db ./data/minimart.db
//! ```

use std::env;
use std::path::PathBuf;

use minimart_core::promotion::{NewPromotion, PromotionKind, ValidityWindow};
use minimart_core::{NewMember, NewProduct};
use minimart_ledger::{telemetry, Ledger, LedgerConfig};

/// (barcode, name, price_cents, cost_cents, opening stock, min stock)
const PRODUCTS: &[(&str, &str, i64, i64, i64, i64)] = &[
    ("8850999320014", "Green Tea 500ml", 2_000, 1_200, 48, 12),
    ("8851959132012", "Drinking Water 1.5L", 1_400, 800, 72, 24),
    ("8850250011122", "Instant Noodles Tom Yum", 700, 450, 120, 30),
    ("8850329112233", "Jasmine Rice 5kg", 18_500, 15_000, 20, 5),
    ("8851123400015", "Fresh Milk 1L", 4_500, 3_600, 24, 8),
    ("8850123456789", "Potato Chips Original", 3_000, 2_000, 36, 10),
    ("8859876543210", "Chocolate Wafer", 1_000, 600, 60, 15),
    ("8851234567890", "Dish Soap 500ml", 3_900, 2_700, 18, 6),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut config = LedgerConfig::from_env()?;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Minimart Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: MINIMART_DB_PATH or ./minimart.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Minimart Seed Data Generator");
    println!("===============================");
    println!("Database: {}", config.database_path.display());
    println!();

    let ledger = Ledger::open(config).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = ledger.database().products().count_active().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Creating products...");
    let mut ids = Vec::with_capacity(PRODUCTS.len());
    for (barcode, name, price_cents, cost_cents, stock, min_stock) in PRODUCTS {
        let product = ledger
            .create_product(
                NewProduct {
                    barcode: Some(barcode.to_string()),
                    name: name.to_string(),
                    price_cents: *price_cents,
                    cost_cents: Some(*cost_cents),
                    stock: *stock,
                    min_stock: Some(*min_stock),
                },
                Some("seed".to_string()),
            )
            .await?;
        println!("  {} ({} in stock)", product.name, product.stock);
        ids.push(product.id);
    }

    let member = ledger
        .create_member(NewMember {
            phone: "081-234-5678".to_string(),
            first_name: "Somchai".to_string(),
            last_name: Some("Jaidee".to_string()),
            email: Some("somchai@example.com".to_string()),
        })
        .await?;
    println!("✓ Member {} ({})", member.first_name, member.phone);

    let buy_two = ledger
        .create_promotion(NewPromotion {
            name: "Green Tea Buy 2 Get 1".to_string(),
            description: Some("Every third bottle free".to_string()),
            kind: PromotionKind::BuyXGetY,
            is_active: true,
            window: ValidityWindow::default(),
            buy_qty: Some(2),
            free_qty: Some(1),
            discount_bps: None,
            trigger_product_ids: vec![ids[0].clone()],
            free_product_ids: Vec::new(),
        })
        .await?;
    let bundle = ledger
        .create_promotion(NewPromotion {
            name: "Noodles + Water, Wafer Free".to_string(),
            description: None,
            kind: PromotionKind::BundleFree,
            is_active: true,
            window: ValidityWindow::default(),
            buy_qty: None,
            free_qty: Some(1),
            discount_bps: None,
            trigger_product_ids: vec![ids[2].clone(), ids[1].clone()],
            free_product_ids: vec![ids[6].clone()],
        })
        .await?;
    println!("✓ Promotions: {}, {}", buy_two.name, bundle.name);

    let overview = ledger.stock_overview().await?;
    println!();
    println!(
        "✓ Seed complete! {} products, retail value {} cents",
        overview.active_products, overview.retail_value_cents
    );

    ledger.close().await;
    Ok(())
}
