//! Category tree export.
//!
//! Reads flat category records (either a bare JSON array or a full catalog
//! snapshot with a `categories` field) and writes the nested tree consumed
//! by navigation and static-site builds.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use marketsquare_core::{
    BuildReport, CategoryForest, CategoryRecord, MAX_SERIALIZED_DEPTH,
    build_category_tree_with_report,
};

/// Accepted input shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryInput {
    Records(Vec<CategoryRecord>),
    Snapshot { categories: Vec<CategoryRecord> },
}

impl CategoryInput {
    fn into_records(self) -> Vec<CategoryRecord> {
        match self {
            Self::Records(records) | Self::Snapshot { categories: records } => records,
        }
    }
}

/// Export the category tree from `input` to `output`.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, or the output
/// cannot be written.
pub async fn export(
    input: &str,
    output: &str,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(input);
    if !path.exists() {
        return Err(format!("File not found: {input}").into());
    }

    info!(path = %input, "Loading category records");
    let content = tokio::fs::read_to_string(path).await?;

    let (tree, report) = render_tree(&content, pretty)?;

    if report.has_promotions() {
        warn!(
            orphans = report.orphans,
            self_references = report.self_references,
            broken_cycles = report.broken_cycles,
            "Some categories were promoted to root"
        );
    }

    tokio::fs::write(output, tree).await?;
    info!(records = report.records, path = %output, "Category tree written");

    Ok(())
}

/// Parse records and serialize the built tree.
fn render_tree(
    content: &str,
    pretty: bool,
) -> Result<(String, BuildReport), Box<dyn std::error::Error>> {
    let records = serde_json::from_str::<CategoryInput>(content)?.into_records();
    let (roots, report) = build_category_tree_with_report(&records);
    let forest = CategoryForest::new(roots);

    let depth = forest.depth();
    if depth > MAX_SERIALIZED_DEPTH {
        return Err(format!(
            "category tree is {depth} levels deep (limit {MAX_SERIALIZED_DEPTH}); check parent links"
        )
        .into());
    }

    let json = if pretty {
        serde_json::to_string_pretty(&forest)?
    } else {
        serde_json::to_string(&forest)?
    };
    Ok((json, report))
}
