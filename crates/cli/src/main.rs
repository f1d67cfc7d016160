//! Market Square CLI - Catalog management tools.
//!
//! # Usage
//!
//! ```bash
//! # Print the stock code for one product
//! ms-cli stock-code show 64f1c2a9e8b7d6c5 --brand Samsung
//!
//! # Generate codes for a product export and flag collisions
//! ms-cli stock-code batch -i products.json -o codes.json
//!
//! # Build the nested category tree artifact from flat records
//! ms-cli categories export -i categories.json -o category-tree.json --pretty
//! ```
//!
//! # Commands
//!
//! - `stock-code show` - Generate a single stock code
//! - `stock-code batch` - Generate stock codes for a JSON product list
//! - `categories export` - Write the category tree snapshot

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ms-cli")]
#[command(author, version, about = "Market Square catalog tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate product stock codes
    StockCode {
        #[command(subcommand)]
        action: StockCodeAction,
    },
    /// Category tree tools
    Categories {
        #[command(subcommand)]
        action: CategoriesAction,
    },
}

#[derive(Subcommand)]
enum StockCodeAction {
    /// Print the stock code for one product
    Show {
        /// Catalog product id
        product_id: String,

        /// Product brand (defaults to GEN)
        #[arg(short, long)]
        brand: Option<String>,
    },
    /// Generate stock codes for every product in a JSON file
    Batch {
        /// JSON array of `{"id": ..., "brand": ...}` objects
        #[arg(short, long)]
        input: String,

        /// Where to write the generated codes
        #[arg(short, long)]
        output: String,
    },
}

#[derive(Subcommand)]
enum CategoriesAction {
    /// Build the nested category tree from flat records
    Export {
        /// JSON array of category records, or a catalog snapshot
        #[arg(short, long)]
        input: String,

        /// Where to write the tree
        #[arg(short, long)]
        output: String,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::StockCode { action } => match action {
            StockCodeAction::Show { product_id, brand } => {
                commands::stock_code::show(&product_id, brand.as_deref());
            }
            StockCodeAction::Batch { input, output } => {
                commands::stock_code::batch(&input, &output).await?;
            }
        },
        Commands::Categories { action } => match action {
            CategoriesAction::Export {
                input,
                output,
                pretty,
            } => {
                commands::categories::export(&input, &output, pretty).await?;
            }
        },
    }
    Ok(())
}
