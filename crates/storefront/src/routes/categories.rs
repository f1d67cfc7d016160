//! Category navigation handlers.
//!
//! The tree is rebuilt from the catalog's flat records on every request.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use marketsquare_core::{CategoryForest, MAX_SERIALIZED_DEPTH, build_category_tree_with_report};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// One step of a breadcrumb trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub id: String,
    pub slug: String,
    pub name: String,
}

fn forest(state: &AppState) -> CategoryForest {
    let (roots, report) = build_category_tree_with_report(state.catalog().categories());
    if report.has_promotions() {
        warn!(
            orphans = report.orphans,
            self_references = report.self_references,
            broken_cycles = report.broken_cycles,
            "Catalog categories have broken parent links"
        );
    }
    CategoryForest::new(roots)
}

/// The full category tree.
///
/// Trees deeper than [`MAX_SERIALIZED_DEPTH`] only come from broken parent
/// data and are refused rather than serialized.
#[instrument(skip(state))]
pub async fn tree(State(state): State<AppState>) -> Result<Json<CategoryForest>> {
    let forest = forest(&state);
    let depth = forest.depth();
    if depth > MAX_SERIALIZED_DEPTH {
        return Err(AppError::Catalog(format!(
            "category tree is {depth} levels deep (limit {MAX_SERIALIZED_DEPTH})"
        )));
    }
    Ok(Json(forest))
}

/// Root-to-category path for a slug.
#[instrument(skip(state))]
pub async fn breadcrumbs(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<Breadcrumb>>> {
    let forest = forest(&state);
    let trail = forest
        .breadcrumbs_by_slug(&slug)
        .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;

    Ok(Json(
        trail
            .into_iter()
            .map(|node| Breadcrumb {
                id: node.id.to_string(),
                slug: node.slug.clone(),
                name: node.name.clone(),
            })
            .collect(),
    ))
}
