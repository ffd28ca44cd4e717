//! Cost & profitability analysis models
//!
//! Amounts travel as `f64` on the wire; they are computed with
//! `rust_decimal` on the server and rounded before leaving it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel used by the UI for "no filter"
pub const ALL: &str = "All";

/// Normalize a partner/product filter coming from the UI.
///
/// `None`, empty strings and the `"All"` sentinel all mean "unconstrained".
pub fn normalize_filter(value: Option<&str>) -> Option<String> {
    match value.map(str::trim) {
        None | Some("") | Some(ALL) => None,
        Some(v) => Some(v.to_string()),
    }
}

/// Analysis direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    /// Purchase side (inbound ledger)
    Inbound,
    /// Sales side (outbound ledger)
    #[default]
    Outbound,
}

/// Analysis request (query string of GET endpoints, JSON body of refresh)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub customer_code: Option<String>,
    #[serde(default)]
    pub supplier_code: Option<String>,
    #[serde(default)]
    pub product_model: Option<String>,
    #[serde(default, rename = "type")]
    pub analysis_type: AnalysisType,
}

impl AnalysisRequest {
    /// Partner filter for the requested direction (customer for sales, supplier for purchase)
    pub fn partner_code(&self) -> Option<String> {
        match self.analysis_type {
            AnalysisType::Outbound => normalize_filter(self.customer_code.as_deref()),
            AnalysisType::Inbound => normalize_filter(self.supplier_code.as_deref()),
        }
    }

    pub fn product_model(&self) -> Option<String> {
        normalize_filter(self.product_model.as_deref())
    }
}

/// Parameters echoed back with every summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_model: Option<String>,
    #[serde(default, rename = "type")]
    pub analysis_type: AnalysisType,
}

/// Outbound (sales) summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub sales_amount: f64,
    pub cost_amount: f64,
    pub profit_amount: f64,
    /// Percentage, two decimals (70.0 means 70%)
    pub profit_rate: f64,
    pub query_params: QueryParams,
}

/// Inbound (purchase) summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseSummary {
    pub purchase_amount: f64,
    pub query_params: QueryParams,
}

/// Either summary flavour
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisSummary {
    Sales(SalesSummary),
    Purchase(PurchaseSummary),
}

/// One group of the outbound detail breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailItem {
    /// Customer code or product model, depending on grouping
    pub group_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_model: Option<String>,
    pub sales_amount: f64,
    pub cost_amount: f64,
    pub profit_amount: f64,
    pub profit_rate: f64,
}

/// One group of the inbound detail breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseDetailItem {
    pub group_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_model: Option<String>,
    pub purchase_amount: f64,
}

/// Detail breakdown of either direction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DetailBreakdown {
    Sales(Vec<DetailItem>),
    Purchase(Vec<PurchaseDetailItem>),
}

impl DetailBreakdown {
    pub fn len(&self) -> usize {
        match self {
            Self::Sales(items) => items.len(),
            Self::Purchase(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of parameter validation; never an error by itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    #[serde(rename = "isValid")]
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
        }
    }
}

/// A selectable filter value (`code` is sent back as the filter)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub code: String,
    pub name: String,
}

impl FilterOption {
    pub fn all() -> Self {
        Self {
            code: ALL.to_string(),
            name: ALL.to_string(),
        }
    }
}

/// Filter options for the analysis screen
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    pub customers: Vec<FilterOption>,
    pub suppliers: Vec<FilterOption>,
    pub products: Vec<FilterOption>,
}

/// Outcome of an explicit cache cleanup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanCacheReport {
    pub original_size: usize,
    pub new_size: usize,
    pub removed: usize,
}

/// Cached payload plus its refresh time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timestamped<T> {
    #[serde(flatten)]
    pub payload: T,
    pub last_updated: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_filter() {
        assert_eq!(normalize_filter(None), None);
        assert_eq!(normalize_filter(Some("")), None);
        assert_eq!(normalize_filter(Some("All")), None);
        assert_eq!(normalize_filter(Some("  ")), None);
        assert_eq!(normalize_filter(Some("X1")), Some("X1".to_string()));
    }

    #[test]
    fn test_partner_code_follows_type() {
        let mut req = AnalysisRequest {
            customer_code: Some("C01".into()),
            supplier_code: Some("S01".into()),
            ..Default::default()
        };
        assert_eq!(req.partner_code(), Some("C01".into()));
        req.analysis_type = AnalysisType::Inbound;
        assert_eq!(req.partner_code(), Some("S01".into()));
    }

    #[test]
    fn test_request_type_defaults_to_outbound() {
        let req: AnalysisRequest =
            serde_json::from_str(r#"{"start_date":"2024-01-01","end_date":"2024-01-31"}"#).unwrap();
        assert_eq!(req.analysis_type, AnalysisType::Outbound);

        let req: AnalysisRequest = serde_json::from_str(r#"{"type":"inbound"}"#).unwrap();
        assert_eq!(req.analysis_type, AnalysisType::Inbound);
    }

    #[test]
    fn test_validation_result_wire_shape() {
        let json = serde_json::to_value(ValidationResult::valid()).unwrap();
        assert_eq!(json, serde_json::json!({ "isValid": true }));

        let json = serde_json::to_value(ValidationResult::invalid("bad")).unwrap();
        assert_eq!(json, serde_json::json!({ "isValid": false, "error": "bad" }));
    }

    #[test]
    fn test_timestamped_flattens_payload() {
        let entry = Timestamped {
            payload: PurchaseSummary {
                purchase_amount: 12.5,
                query_params: QueryParams {
                    start_date: "2024-01-01".into(),
                    end_date: "2024-01-31".into(),
                    customer_code: None,
                    supplier_code: Some("S01".into()),
                    product_model: None,
                    analysis_type: AnalysisType::Inbound,
                },
            },
            last_updated: DateTime::parse_from_rfc3339("2024-02-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["purchase_amount"], 12.5);
        assert_eq!(json["query_params"]["type"], "inbound");
        assert!(json["last_updated"].as_str().unwrap().starts_with("2024-02-01T00:00:00"));

        let back: Timestamped<PurchaseSummary> = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
