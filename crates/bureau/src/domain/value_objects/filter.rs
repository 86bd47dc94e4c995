//! Filter - ANDed clauses evaluated by the query layer

use serde::{Deserialize, Serialize};

use super::FieldValue;

/// Comparison operator of a filter clause
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    Contains,
    #[serde(alias = "startsWith")]
    StartsWith,
    #[serde(alias = "endsWith")]
    EndsWith,
    #[serde(alias = "greaterThan")]
    GreaterThan,
    #[serde(alias = "lessThan")]
    LessThan,
    /// Inclusive range, value is a two-element list
    Between,
    /// Value is a list of accepted values
    In,
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterOperator::Equals => write!(f, "equals"),
            FilterOperator::Contains => write!(f, "contains"),
            FilterOperator::StartsWith => write!(f, "starts_with"),
            FilterOperator::EndsWith => write!(f, "ends_with"),
            FilterOperator::GreaterThan => write!(f, "greater_than"),
            FilterOperator::LessThan => write!(f, "less_than"),
            FilterOperator::Between => write!(f, "between"),
            FilterOperator::In => write!(f, "in"),
        }
    }
}

impl std::str::FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept both snake_case and the camelCase spelling used by dashboard clients
        match s.replace('_', "").to_lowercase().as_str() {
            "equals" | "eq" => Ok(FilterOperator::Equals),
            "contains" => Ok(FilterOperator::Contains),
            "startswith" => Ok(FilterOperator::StartsWith),
            "endswith" => Ok(FilterOperator::EndsWith),
            "greaterthan" | "gt" => Ok(FilterOperator::GreaterThan),
            "lessthan" | "lt" => Ok(FilterOperator::LessThan),
            "between" => Ok(FilterOperator::Between),
            "in" => Ok(FilterOperator::In),
            _ => Err(format!("Unknown filter operator: {}", s)),
        }
    }
}

/// One `{ field, operator, value }` predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    pub field: String,
    pub operator: FilterOperator,
    pub value: FieldValue,
}

impl FilterClause {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOperator::Equals, value)
    }

    pub fn contains(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOperator::Contains, value)
    }

    pub fn between(
        field: impl Into<String>,
        low: impl Into<FieldValue>,
        high: impl Into<FieldValue>,
    ) -> Self {
        Self::new(
            field,
            FilterOperator::Between,
            FieldValue::List(vec![low.into(), high.into()]),
        )
    }
}

/// Conjunction of clauses; an empty filter matches everything
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub clauses: Vec<FilterClause>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, clause: FilterClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl From<Vec<FilterClause>> for Filter {
    fn from(clauses: Vec<FilterClause>) -> Self {
        Self { clauses }
    }
}
