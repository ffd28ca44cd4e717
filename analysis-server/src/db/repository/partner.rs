//! Partner / Product Repository (filter option source)

use super::RepoResult;
use shared::models::{Partner, PartnerKind};
use sqlx::SqlitePool;

pub async fn find_partners_by_kind(pool: &SqlitePool, kind: PartnerKind) -> RepoResult<Vec<Partner>> {
    let rows = sqlx::query_as::<_, Partner>(
        "SELECT code, short_name, full_name FROM partners WHERE type = ? ORDER BY code",
    )
    .bind(kind.as_i64())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_product_models(pool: &SqlitePool) -> RepoResult<Vec<String>> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT product_model FROM products WHERE product_model IS NOT NULL AND product_model != '' ORDER BY product_model",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
