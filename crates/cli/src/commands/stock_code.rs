//! Stock code generation commands.
//!
//! Codes are deterministic but not unique, so the batch command reports any
//! products in the input that would share a code. Resolving those is left to
//! the catalog team.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use marketsquare_core::{StockCode, generate_stock_code};

/// One product from the input file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub id: String,
    #[serde(default)]
    pub brand: Option<String>,
}

/// One generated code in the output file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCodeOutput {
    pub product_id: String,
    pub stock_code: StockCode,
}

/// Print the stock code for a single product.
#[allow(clippy::print_stdout)]
pub fn show(product_id: &str, brand: Option<&str>) {
    println!("{}", generate_stock_code(product_id, brand));
}

/// Generate codes for every product in `input` and write them to `output`.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, or the output
/// cannot be written.
pub async fn batch(input: &str, output: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(input);
    if !path.exists() {
        return Err(format!("File not found: {input}").into());
    }

    info!(path = %input, "Loading products");
    let content = tokio::fs::read_to_string(path).await?;
    let products: Vec<ProductInput> = serde_json::from_str(&content)?;

    let codes = generate_all(&products);
    for (code, product_ids) in find_collisions(&codes) {
        warn!(stock_code = %code, products = ?product_ids, "Stock code collision");
    }

    tokio::fs::write(output, serde_json::to_string_pretty(&codes)?).await?;
    info!(count = codes.len(), path = %output, "Stock codes written");

    Ok(())
}

fn generate_all(products: &[ProductInput]) -> Vec<StockCodeOutput> {
    products
        .iter()
        .map(|product| StockCodeOutput {
            product_id: product.id.clone(),
            stock_code: generate_stock_code(&product.id, product.brand.as_deref()),
        })
        .collect()
}

/// Codes shared by more than one distinct product id.
fn find_collisions(codes: &[StockCodeOutput]) -> Vec<(&StockCode, Vec<&str>)> {
    let mut by_code: BTreeMap<&str, (&StockCode, Vec<&str>)> = BTreeMap::new();
    for entry in codes {
        let (_, ids) = by_code
            .entry(entry.stock_code.as_str())
            .or_insert_with(|| (&entry.stock_code, Vec::new()));
        if !ids.contains(&entry.product_id.as_str()) {
            ids.push(&entry.product_id);
        }
    }

    by_code
        .into_values()
        .filter(|(_, ids)| ids.len() > 1)
        .collect()
}
