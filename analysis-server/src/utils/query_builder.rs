//! Typed WHERE-clause builder for ledger queries
//!
//! Predicates are (column, operator, value) triples; column names come from
//! [`Column`] so no caller-supplied text ever reaches the SQL string.

use sqlx::Sqlite;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::sqlite::SqliteArguments;

/// Ledger columns that may appear in a predicate or GROUP BY
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    ProductModel,
    CustomerCode,
    SupplierCode,
    UnitPrice,
    InboundDate,
    OutboundDate,
}

impl Column {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::ProductModel => "product_model",
            Self::CustomerCode => "customer_code",
            Self::SupplierCode => "supplier_code",
            Self::UnitPrice => "unit_price",
            Self::InboundDate => "inbound_date",
            Self::OutboundDate => "outbound_date",
        }
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ge,
    Lt,
    /// `date(col) BETWEEN ? AND ?`
    DateBetween,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Text(String),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq)]
struct Condition {
    column: Column,
    operator: Operator,
    values: Vec<QueryValue>,
}

impl Condition {
    fn to_sql(&self) -> String {
        let col = self.column.as_sql();
        match self.operator {
            Operator::Eq => format!("{col} = ?"),
            Operator::Ge => format!("{col} >= ?"),
            Operator::Lt => format!("{col} < ?"),
            Operator::DateBetween => format!("date({col}) BETWEEN ? AND ?"),
        }
    }
}

/// Query builder for constructing SQL queries with dynamic WHERE conditions
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    conditions: Vec<Condition>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `col = value`
    pub fn eq(&mut self, column: Column, value: impl Into<String>) -> &mut Self {
        self.conditions.push(Condition {
            column,
            operator: Operator::Eq,
            values: vec![QueryValue::Text(value.into())],
        });
        self
    }

    /// `col = value` when a filter is present, nothing otherwise
    pub fn eq_opt(&mut self, column: Column, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            self.eq(column, v);
        }
        self
    }

    /// `unit_price >= 0`
    pub fn non_negative_price(&mut self) -> &mut Self {
        self.conditions.push(Condition {
            column: Column::UnitPrice,
            operator: Operator::Ge,
            values: vec![QueryValue::Float(0.0)],
        });
        self
    }

    /// `unit_price < 0`
    pub fn negative_price(&mut self) -> &mut Self {
        self.conditions.push(Condition {
            column: Column::UnitPrice,
            operator: Operator::Lt,
            values: vec![QueryValue::Float(0.0)],
        });
        self
    }

    /// Inclusive calendar-date range on a date column
    pub fn date_between(&mut self, column: Column, start: &str, end: &str) -> &mut Self {
        self.conditions.push(Condition {
            column,
            operator: Operator::DateBetween,
            values: vec![
                QueryValue::Text(start.to_string()),
                QueryValue::Text(end.to_string()),
            ],
        });
        self
    }

    /// Build WHERE clause (empty if no conditions)
    pub fn build_where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            let parts: Vec<String> = self.conditions.iter().map(Condition::to_sql).collect();
            format!(" WHERE {}", parts.join(" AND "))
        }
    }

    fn bindings(&self) -> impl Iterator<Item = &QueryValue> {
        self.conditions.iter().flat_map(|c| c.values.iter())
    }

    /// Apply bindings to a SQLx query_as
    pub fn apply_bindings_as<'q, O>(
        &self,
        mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    ) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
        for binding in self.bindings() {
            query = match binding {
                QueryValue::Text(s) => query.bind(s.clone()),
                QueryValue::Float(f) => query.bind(*f),
            };
        }
        query
    }

    /// Apply bindings to a SQLx query_scalar
    pub fn apply_bindings_scalar<'q, O>(
        &self,
        mut query: QueryScalar<'q, Sqlite, O, SqliteArguments<'q>>,
    ) -> QueryScalar<'q, Sqlite, O, SqliteArguments<'q>> {
        for binding in self.bindings() {
            query = match binding {
                QueryValue::Text(s) => query.bind(s.clone()),
                QueryValue::Float(f) => query.bind(*f),
            };
        }
        query
    }
}
