//! Analysis result cache
//!
//! One JSON document holds every computed result, keyed by the query
//! parameters. Each entry carries a `last_updated` RFC 3339 timestamp and is
//! evicted once it is older than the retention window. Purchase results carry
//! an `inbound_` prefix and breakdowns a further `detail_` prefix.
//!
//! ```text
//! {
//!   "2024-01-01_2024-01-31_All_X1":                { "sales_amount": ..., "last_updated": "..." },
//!   "detail_2024-01-01_2024-01-31_All_X1":         { "detail_data": [...], "last_updated": "..." },
//!   "inbound_2024-01-01_2024-01-31_S01_All":        { "purchase_amount": ..., "last_updated": "..." },
//!   "detail_inbound_2024-01-01_2024-01-31_S01_All": { "detail_data": [...], "last_updated": "..." }
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use shared::models::{ALL, AnalysisType, CleanCacheReport, Timestamped, normalize_filter};
use std::path::PathBuf;
use tokio::sync::Mutex;

use crate::utils::{AppError, AppResult};

/// The persisted document: cache key → entry object
pub type CacheDocument = Map<String, Value>;

const DETAIL_PREFIX: &str = "detail_";
const INBOUND_PREFIX: &str = "inbound_";
const LAST_UPDATED: &str = "last_updated";

// =============================================================================
// Key derivation
// =============================================================================

/// `{start}_{end}_{partner|All}_{product|All}`
///
/// An explicit `"All"` and an absent filter produce the same key. Inbound
/// results live under an `inbound_` prefix so they never collide with the
/// sales result of the same parameters.
pub fn summary_key(
    analysis_type: AnalysisType,
    start_date: &str,
    end_date: &str,
    partner_code: Option<&str>,
    product_model: Option<&str>,
) -> String {
    let partner = normalize_filter(partner_code);
    let product = normalize_filter(product_model);
    let base = format!(
        "{}_{}_{}_{}",
        start_date,
        end_date,
        partner.as_deref().unwrap_or(ALL),
        product.as_deref().unwrap_or(ALL)
    );
    match analysis_type {
        AnalysisType::Outbound => base,
        AnalysisType::Inbound => format!("{INBOUND_PREFIX}{base}"),
    }
}

/// Key of the detail breakdown: the summary key prefixed with `detail_`
pub fn detail_key(
    analysis_type: AnalysisType,
    start_date: &str,
    end_date: &str,
    partner_code: Option<&str>,
    product_model: Option<&str>,
) -> String {
    format!(
        "{DETAIL_PREFIX}{}",
        summary_key(analysis_type, start_date, end_date, partner_code, product_model)
    )
}

// =============================================================================
// Document helpers
// =============================================================================

/// Drop entries whose `last_updated` is more than `retention` before `now`.
///
/// Entries without a timestamp (missing, `null` or `""`) are kept; an
/// unparsable timestamp counts as expired. Returns the number of removed
/// entries.
pub fn evict_expired(doc: &mut CacheDocument, now: DateTime<Utc>, retention: Duration) -> usize {
    let before = doc.len();
    doc.retain(|key, entry| {
        let ts = match entry.get(LAST_UPDATED) {
            None | Some(Value::Null) => return true,
            Some(Value::String(s)) if s.is_empty() => return true,
            Some(ts) => ts,
        };
        let parsed = ts
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        match parsed {
            Some(updated) => now.signed_duration_since(updated) <= retention,
            None => {
                tracing::warn!(key = %key, "Dropping cache entry with invalid last_updated");
                false
            }
        }
    });
    before - doc.len()
}

/// Typed read of one entry; a shape mismatch is logged and treated as a miss
pub fn read_entry<T: DeserializeOwned>(doc: &CacheDocument, key: &str) -> Option<Timestamped<T>> {
    let entry = doc.get(key)?;
    match serde_json::from_value::<Timestamped<T>>(entry.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Cached entry has unexpected shape, ignoring");
            None
        }
    }
}

/// Serialize a payload with its refresh time into a document entry
pub fn to_entry<T: Serialize>(payload: T, last_updated: DateTime<Utc>) -> AppResult<Value> {
    serde_json::to_value(Timestamped {
        payload,
        last_updated,
    })
    .map_err(|e| AppError::internal(format!("Failed to serialize cache entry: {e}")))
}

// =============================================================================
// Store
// =============================================================================

/// Key-value store for analysis results
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Current document with expired entries removed.
    ///
    /// Never fails: unreadable or corrupt storage yields an empty document.
    async fn load(&self) -> CacheDocument;

    /// Insert (overwrite) entries, evict expired ones and persist the whole document.
    async fn put_entries(&self, entries: Vec<(String, Value)>) -> AppResult<()>;

    /// Evict expired entries and persist.
    async fn clean(&self) -> AppResult<CleanCacheReport>;
}

/// [`CacheStore`] backed by a single JSON file
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// reader never sees a half-written document. Writers inside one process are
/// serialized; across processes the last writer wins.
pub struct JsonFileCache {
    path: PathBuf,
    retention: Duration,
    write_lock: Mutex<()>,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>, retention: Duration) -> Self {
        Self {
            path: path.into(),
            retention,
            write_lock: Mutex::new(()),
        }
    }

    /// Raw document as stored, without eviction
    async fn read_raw(&self) -> CacheDocument {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return CacheDocument::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read analysis cache");
                return CacheDocument::new();
            }
        };
        if text.trim().is_empty() {
            return CacheDocument::new();
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(doc)) => doc,
            Ok(_) => {
                tracing::error!(path = %self.path.display(), "Analysis cache is not a JSON object, ignoring");
                CacheDocument::new()
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to parse analysis cache");
                CacheDocument::new()
            }
        }
    }

    async fn write(&self, doc: &CacheDocument) -> AppResult<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| AppError::cache_write(format!("Failed to create cache directory: {e}")))?;
        }

        let body = serde_json::to_string_pretty(doc)
            .map_err(|e| AppError::cache_write(format!("Failed to serialize cache: {e}")))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| AppError::cache_write(format!("Failed to write cache: {e}")))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| AppError::cache_write(format!("Failed to replace cache: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for JsonFileCache {
    async fn load(&self) -> CacheDocument {
        let mut doc = self.read_raw().await;
        evict_expired(&mut doc, Utc::now(), self.retention);
        doc
    }

    async fn put_entries(&self, entries: Vec<(String, Value)>) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.read_raw().await;
        for (key, value) in entries {
            doc.insert(key, value);
        }
        let removed = evict_expired(&mut doc, Utc::now(), self.retention);
        if removed > 0 {
            tracing::debug!(removed, "Evicted expired cache entries");
        }
        self.write(&doc).await
    }

    async fn clean(&self) -> AppResult<CleanCacheReport> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.read_raw().await;
        let original_size = doc.len();
        let removed = evict_expired(&mut doc, Utc::now(), self.retention);
        self.write(&doc).await?;
        Ok(CleanCacheReport {
            original_size,
            new_size: doc.len(),
            removed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry_at(ts: DateTime<Utc>) -> Value {
        json!({ "sales_amount": 1.0, "last_updated": ts.to_rfc3339() })
    }

    #[test]
    fn test_all_and_absent_filters_share_a_key() {
        let a = summary_key(AnalysisType::Outbound, "2024-01-01", "2024-01-31", None, Some("X1"));
        let b = summary_key(AnalysisType::Outbound, "2024-01-01", "2024-01-31", Some("All"), Some("X1"));
        assert_eq!(a, b);
        assert_eq!(a, "2024-01-01_2024-01-31_All_X1");
    }

    #[test]
    fn test_detail_and_inbound_prefixes() {
        assert_eq!(
            detail_key(AnalysisType::Outbound, "2024-01-01", "2024-01-31", Some("C01"), None),
            "detail_2024-01-01_2024-01-31_C01_All"
        );
        assert_eq!(
            summary_key(AnalysisType::Inbound, "2024-01-01", "2024-01-31", Some("S01"), None),
            "inbound_2024-01-01_2024-01-31_S01_All"
        );
        assert_eq!(
            detail_key(AnalysisType::Inbound, "2024-01-01", "2024-01-31", None, None),
            "detail_inbound_2024-01-01_2024-01-31_All_All"
        );
    }

    #[test]
    fn test_eviction_boundary() {
        let now = Utc::now();
        let retention = Duration::days(30);
        let mut doc = CacheDocument::new();
        doc.insert("stale".into(), entry_at(now - Duration::days(30) - Duration::seconds(1)));
        doc.insert("fresh".into(), entry_at(now - Duration::days(29)));
        doc.insert("edge".into(), entry_at(now - Duration::days(30)));
        doc.insert("legacy".into(), json!({ "sales_amount": 5.0 }));
        doc.insert("broken".into(), json!({ "last_updated": "yesterday" }));

        let removed = evict_expired(&mut doc, now, retention);

        assert_eq!(removed, 2);
        assert!(!doc.contains_key("stale"));
        assert!(!doc.contains_key("broken"));
        assert!(doc.contains_key("fresh"));
        assert!(doc.contains_key("edge"));
        assert!(doc.contains_key("legacy"));
    }

    #[test]
    fn test_null_or_empty_timestamp_is_kept() {
        let now = Utc::now();
        let mut doc = CacheDocument::new();
        doc.insert("null_ts".into(), json!({ "sales_amount": 5.0, "last_updated": null }));
        doc.insert("empty_ts".into(), json!({ "sales_amount": 5.0, "last_updated": "" }));
        doc.insert("stale".into(), entry_at(now - Duration::days(31)));

        let removed = evict_expired(&mut doc, now, Duration::days(30));

        assert_eq!(removed, 1);
        assert!(doc.contains_key("null_ts"));
        assert!(doc.contains_key("empty_ts"));
    }

    #[test]
    fn test_read_entry_shape_mismatch_is_miss() {
        let mut doc = CacheDocument::new();
        doc.insert("k".into(), json!({ "unexpected": true, "last_updated": Utc::now().to_rfc3339() }));
        let got: Option<Timestamped<shared::models::PurchaseSummary>> = read_entry(&doc, "k");
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn test_file_cache_creates_directory_and_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("analysis-cache.json");
        let cache = JsonFileCache::new(&path, Duration::days(30));

        assert!(cache.load().await.is_empty());

        let value = entry_at(Utc::now());
        cache
            .put_entries(vec![("k".to_string(), value.clone())])
            .await
            .unwrap();

        assert!(path.exists());
        let doc = cache.load().await;
        assert_eq!(doc.get("k"), Some(&value));
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis-cache.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let cache = JsonFileCache::new(&path, Duration::days(30));
        assert!(cache.load().await.is_empty());

        // a write replaces the corrupt document
        cache
            .put_entries(vec![("k".to_string(), entry_at(Utc::now()))])
            .await
            .unwrap();
        assert_eq!(cache.load().await.len(), 1);
    }

    #[tokio::test]
    async fn test_clean_reports_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis-cache.json");
        let now = Utc::now();
        let mut doc = CacheDocument::new();
        doc.insert("old".into(), entry_at(now - Duration::days(45)));
        doc.insert("new".into(), entry_at(now));
        tokio::fs::write(&path, serde_json::to_string(&doc).unwrap())
            .await
            .unwrap();

        let cache = JsonFileCache::new(&path, Duration::days(30));
        let report = cache.clean().await.unwrap();

        assert_eq!(
            report,
            CleanCacheReport {
                original_size: 2,
                new_size: 1,
                removed: 1
            }
        );
        let on_disk: Value =
            serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
        assert!(on_disk.get("old").is_none());
        assert!(on_disk.get("new").is_some());
    }
}
