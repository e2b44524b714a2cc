//! Catalog loading: recipes in, categories and foods out, embeddings after.

use std::{collections::HashMap, time::Duration};

use serde::Deserialize;

use crate::{
    db::CatalogWriter,
    error::{AppError, AppResult},
    models::{CategoryId, NewFood},
    services::embedder::Embedder,
};

/// Foods embedded per request
pub const EMBEDDING_BATCH_SIZE: usize = 20;

/// Pause between embedding requests to stay under the provider's rate limit
pub const EMBEDDING_BATCH_PAUSE: Duration = Duration::from_millis(1500);

/// One recipe of the source file
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RecipeRecord {
    pub name: String,
    /// Category path from root to leaf
    pub category: Vec<String>,
    #[serde(default)]
    pub key_ingredients: Vec<String>,
    #[serde(default)]
    pub nutrition: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub categories: usize,
    pub foods: usize,
}

/// Creates the category path of every recipe and inserts the foods
///
/// Categories are keyed on `(name, parent)`, so the same name under two
/// different parents yields two categories. A recipe with an empty path is
/// stored without a category.
pub async fn ingest_recipes(
    writer: &dyn CatalogWriter,
    records: &[RecipeRecord],
) -> AppResult<IngestReport> {
    let mut known: HashMap<(String, Option<CategoryId>), CategoryId> = HashMap::new();
    let mut report = IngestReport::default();

    for record in records {
        // Walk the category path root first, creating missing nodes
        let mut parent = None;
        for name in &record.category {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            // Check the local cache before hitting the writer
            let key = (name.to_string(), parent);
            let id = match known.get(&key) {
                Some(id) => *id,
                None => {
                    let id = writer.get_or_create_category(name, parent).await?;
                    known.insert(key, id);
                    report.categories += 1;
                    id
                }
            };
            parent = Some(id);
        }

        // The food hangs off the deepest category of its path
        writer
            .insert_food(&NewFood {
                name: record.name.clone(),
                ingredients: record.key_ingredients.clone(),
                category_id: parent,
                nutrition: record.nutrition.clone(),
            })
            .await?;
        report.foods += 1;
    }

    tracing::info!(
        categories = report.categories,
        foods = report.foods,
        "Recipes ingested"
    );
    Ok(report)
}

/// Computes embeddings for every food that lacks one, returning how many were set
pub async fn backfill_embeddings(
    writer: &dyn CatalogWriter,
    embedder: &dyn Embedder,
    batch_size: usize,
    pause: Duration,
) -> AppResult<usize> {
    if batch_size == 0 {
        return Err(AppError::InvalidInput(
            "Embedding batch size must be positive".to_string(),
        ));
    }

    // Only foods still missing an embedding, so reruns resume where they stopped
    let pending = writer.foods_without_embedding().await?;
    let batches = pending.len().div_ceil(batch_size);
    let mut embedded = 0;

    for (i, batch) in pending.chunks(batch_size).enumerate() {
        // One request per batch
        let texts: Vec<String> = batch.iter().map(|f| f.embedding_text()).collect();
        let vectors = embedder.embed(&texts).await?;

        // Store each vector against its food
        for (food, vector) in batch.iter().zip(&vectors) {
            writer.set_food_embedding(food.id, vector).await?;
            embedded += 1;
        }

        tracing::info!(batch = i + 1, batches, embedded, "Embedding batch stored");

        // Respect rate limits between batches
        if i + 1 < batches && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }

    Ok(embedded)
}
