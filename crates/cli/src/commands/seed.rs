//! Catalog seeding command for local development.

use dragonfruit_core::Price;
use dragonfruit_shop::config::ShopConfig;
use dragonfruit_shop::db::{self, ProductRepository};
use dragonfruit_shop::models::ProductInput;
use dragonfruit_shop::store::ProductStore;

/// Demo catalog: (name, description, price in cents, stock).
const DEMO_PRODUCTS: &[(&str, &str, i64, u32)] = &[
    ("Dragonfruit", "Vivid pink, mildly sweet, best chilled", 350, 24),
    ("Starfruit", "Crisp and citrusy, slices into stars", 200, 40),
    ("Rambutan", "Hairy shell, lychee-like flesh", 300, 18),
    ("Durian", "The king of fruits. You have been warned", 1450, 6),
    ("Mangosteen", "Purple rind, delicate white segments", 550, 12),
    ("Passion fruit", "Tart pulp for desserts and drinks", 180, 60),
];

/// Insert the demo products into the catalog.
///
/// # Errors
///
/// Returns an error if configuration is missing or the inserts fail.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ShopConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    let products = ProductRepository::new(&pool);

    for &(name, description, cents, stock) in DEMO_PRODUCTS {
        let product = products
            .create(&ProductInput {
                name: name.to_owned(),
                description: Some(description.to_owned()),
                price: Price::from_minor_units(cents),
                stock,
                image_path: None,
            })
            .await?;
        tracing::info!(product_id = %product.id, name, "seeded product");
    }

    tracing::info!(count = DEMO_PRODUCTS.len(), "catalog seeded");
    Ok(())
}
