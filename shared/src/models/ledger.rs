//! Ledger master data (partners)

use serde::{Deserialize, Serialize};

/// Partner type stored in `partners.type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i64)]
pub enum PartnerKind {
    Supplier = 0,
    Customer = 1,
}

impl PartnerKind {
    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

/// Partner (customer or supplier)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Partner {
    pub code: String,
    pub short_name: Option<String>,
    pub full_name: Option<String>,
}

impl Partner {
    /// Display label, `"short (full)"` when both names are known
    pub fn label(&self) -> String {
        match (self.short_name.as_deref(), self.full_name.as_deref()) {
            (Some(short), Some(full)) if !short.is_empty() && !full.is_empty() => {
                format!("{short} ({full})")
            }
            (Some(name), _) | (_, Some(name)) if !name.is_empty() => name.to_string(),
            _ => self.code.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partner(short: Option<&str>, full: Option<&str>) -> Partner {
        Partner {
            code: "C01".into(),
            short_name: short.map(Into::into),
            full_name: full.map(Into::into),
        }
    }

    #[test]
    fn test_label() {
        assert_eq!(partner(Some("ACME"), Some("ACME Trading Ltd")).label(), "ACME (ACME Trading Ltd)");
        assert_eq!(partner(Some("ACME"), None).label(), "ACME");
        assert_eq!(partner(None, Some("ACME Trading Ltd")).label(), "ACME Trading Ltd");
        assert_eq!(partner(Some(""), None).label(), "C01");
        assert_eq!(partner(None, None).label(), "C01");
    }

    #[test]
    fn test_partner_kind_values() {
        assert_eq!(PartnerKind::Supplier.as_i64(), 0);
        assert_eq!(PartnerKind::Customer.as_i64(), 1);
    }
}
