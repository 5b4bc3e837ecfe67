//! # Seed Data Generator
//!
//! Populates the record store with demo data for development, going through
//! the same resource contexts the app uses.
//!
//! ## Usage
//! ```bash
//! # Seed the configured database (meridian.toml / MERIDIAN_DB_PATH)
//! cargo run -p meridian-cache --bin seed
//!
//! # Specify database path
//! cargo run -p meridian-cache --bin seed -- --db ./data/meridian.db
//! ```
//!
//! ## Generated Data
//! - 2 stores (Downtown, Airport)
//! - 2 suppliers
//! - A product per catalogue entry, with per-store stock
//! - A handful of loyalty customers
//! - One placed purchase order per supplier

use std::env;
use std::path::PathBuf;

use meridian_cache::telemetry::init_tracing;
use meridian_cache::{AppConfig, AppContext};
use meridian_core::{Customer, Product, PurchaseOrder, Store, Supplier};

/// (sku, name, category, price, cost, supplier index)
const CATALOGUE: &[(&str, &str, &str, i64, i64, usize)] = &[
    ("BEV-001", "Cola 330ml", "Beverages", 150, 80, 0),
    ("BEV-002", "Sparkling Water 500ml", "Beverages", 120, 45, 0),
    ("BEV-003", "Orange Juice 1L", "Beverages", 349, 190, 0),
    ("BEV-004", "Iced Tea 500ml", "Beverages", 199, 95, 0),
    ("SNK-001", "Sea Salt Crisps", "Snacks", 249, 110, 1),
    ("SNK-002", "Dark Chocolate Bar", "Snacks", 299, 140, 1),
    ("SNK-003", "Trail Mix 200g", "Snacks", 449, 230, 1),
    ("SNK-004", "Oat Cookies", "Snacks", 329, 150, 1),
];

const CUSTOMERS: &[(&str, &str, i64)] = &[
    ("Ada Lovelace", "ada@example.test", 420),
    ("Grace Hopper", "grace@example.test", 1310),
    ("Alan Turing", "alan@example.test", 75),
    ("Katherine Johnson", "katherine@example.test", 0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Meridian POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: from config)");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = AppConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = Some(path);
    }

    println!("🌱 Meridian POS Seed Data Generator");
    println!("===================================");
    if let Some(path) = config.database_path() {
        println!("Database: {}", path.display());
    }
    println!();

    let app = AppContext::open(&config).await?;
    println!("✓ Connected to database");

    app.refresh_all().await?;

    if !app.products.is_empty() {
        println!("⚠ Database already has {} products", app.products.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    // Stores
    let mut stores = Vec::new();
    for name in ["Downtown", "Airport"] {
        stores.push(app.stores.create(Store::new(name)).await?);
    }
    println!("✓ {} stores", stores.len());

    // Suppliers
    let mut suppliers = Vec::new();
    for (name, contact, email) in [
        ("Northwind Beverages", "Rita Alvarez", "orders@northwind.test"),
        ("Harbor Snacks Co.", "Sam Okafor", "sales@harborsnacks.test"),
    ] {
        let mut supplier = Supplier::new(name);
        supplier.contact_name = Some(contact.to_string());
        supplier.email = Some(email.to_string());
        suppliers.push(app.suppliers.create(supplier).await?);
    }
    println!("✓ {} suppliers", suppliers.len());

    // Products, with stock split across the stores
    for (index, (sku, name, category, price, cost, supplier)) in CATALOGUE.iter().enumerate() {
        let mut product = Product::new(*sku, *name, *price);
        product.category = Some(category.to_string());
        product.cost_cents = Some(*cost);
        product.supplier_id = Some(suppliers[*supplier].id.clone());

        let product = app.products.create(product).await?;
        for (store_index, store) in stores.iter().enumerate() {
            let quantity = ((index * 7 + store_index * 11) % 30) as i64;
            app.products
                .adjust_stock(&product.id, Some(&store.id), quantity)
                .await?;
        }
    }
    println!("✓ {} products", app.products.len());

    // Customers
    for (name, email, points) in CUSTOMERS {
        let mut customer = Customer::new(*name);
        customer.email = Some(email.to_string());
        let customer = app.customers.create(customer).await?;
        if *points > 0 {
            app.customers.adjust_points(&customer.id, *points).await?;
        }
    }
    println!("✓ {} customers", app.customers.len());

    // Purchase orders: restock the low-stock items from their supplier
    for supplier in &suppliers {
        let mut order = PurchaseOrder::new(&supplier.id);
        order.store_id = Some(stores[0].id.clone());
        for product in app.products.low_stock(Some(10), Some(&stores[0].id)) {
            if product.supplier_id.as_deref() == Some(supplier.id.as_str()) {
                order = order.with_line(&product.id, 24, product.cost_cents.unwrap_or(0));
            }
        }
        if order.lines.is_empty() {
            continue;
        }
        let order = app.purchase_orders.create(order).await?;
        app.purchase_orders.place(&order.id).await?;
    }
    println!("✓ {} purchase orders", app.purchase_orders.len());

    println!();
    println!(
        "🎉 Seed complete in {:.2}s",
        start.elapsed().as_secs_f64()
    );
    println!(
        "   Inventory value: {}",
        app.products.inventory_value(None)
    );

    Ok(())
}
