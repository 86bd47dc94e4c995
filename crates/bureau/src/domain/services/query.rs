//! Query - Filter clause evaluation over entity fields
//!
//! Evaluation is a linear scan; clauses are ANDed. A clause whose value has
//! the wrong shape for the field simply does not match, while clauses that
//! can never be evaluated (unknown field, malformed `between` / `in`) are
//! rejected up front by [`validate_filter`].

use std::cmp::Ordering;

use crate::domain::entities::Entity;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{FieldValue, Filter, FilterClause, FilterOperator};

/// Reject clauses that name unknown fields or carry malformed values
pub fn validate_filter<T: Entity>(filter: &Filter) -> Result<(), DomainError> {
    for clause in &filter.clauses {
        validate_clause::<T>(clause)?;
    }
    Ok(())
}

fn validate_clause<T: Entity>(clause: &FilterClause) -> Result<(), DomainError> {
    if !T::FIELDS.contains(&clause.field.as_str()) {
        return Err(DomainError::validation(
            clause.field.clone(),
            format!("{} has no field named `{}`", T::ENTITY_TYPE, clause.field),
        ));
    }
    match clause.operator {
        FilterOperator::Between => match clause.value.as_list() {
            Some(bounds) if bounds.len() == 2 => Ok(()),
            _ => Err(DomainError::validation(
                clause.field.clone(),
                "`between` expects exactly two bounds",
            )),
        },
        FilterOperator::In => match clause.value {
            FieldValue::List(_) => Ok(()),
            _ => Err(DomainError::validation(
                clause.field.clone(),
                "`in` expects a list of values",
            )),
        },
        _ => Ok(()),
    }
}

/// True when every clause holds for the entity
pub fn matches<T: Entity>(entity: &T, filter: &Filter) -> bool {
    filter.clauses.iter().all(|clause| match entity.field(&clause.field) {
        Some(value) => clause_holds(&value, clause),
        None => false,
    })
}

/// Validate, then keep the entities satisfying the filter in their given order
pub fn apply_filter<T: Entity>(entities: Vec<T>, filter: &Filter) -> Result<Vec<T>, DomainError> {
    validate_filter::<T>(filter)?;
    if filter.is_empty() {
        return Ok(entities);
    }
    Ok(entities
        .into_iter()
        .filter(|entity| matches(entity, filter))
        .collect())
}

fn clause_holds(field: &FieldValue, clause: &FilterClause) -> bool {
    // List fields match when any element satisfies the clause
    if let FieldValue::List(items) = field {
        return items.iter().any(|item| clause_holds(item, clause));
    }
    let target = &clause.value;
    match clause.operator {
        FilterOperator::Equals => values_equal(field, target),
        FilterOperator::Contains => text_test(field, target, |f, t| f.contains(t)),
        FilterOperator::StartsWith => text_test(field, target, |f, t| f.starts_with(t)),
        FilterOperator::EndsWith => text_test(field, target, |f, t| f.ends_with(t)),
        FilterOperator::GreaterThan => compare(field, target) == Some(Ordering::Greater),
        FilterOperator::LessThan => compare(field, target) == Some(Ordering::Less),
        FilterOperator::Between => match target.as_list() {
            Some([low, high]) => {
                matches!(compare(field, low), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(compare(field, high), Some(Ordering::Less | Ordering::Equal))
            }
            _ => false,
        },
        FilterOperator::In => target
            .as_list()
            .map(|options| options.iter().any(|option| values_equal(field, option)))
            .unwrap_or(false),
    }
}

fn values_equal(field: &FieldValue, target: &FieldValue) -> bool {
    match (field, target) {
        (FieldValue::Timestamp(_), _) | (_, FieldValue::Timestamp(_)) => {
            match (field.as_timestamp(), target.as_timestamp()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }
        (FieldValue::Number(a), FieldValue::Number(b)) => a == b,
        (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
        (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
        (FieldValue::Null, FieldValue::Null) => true,
        _ => false,
    }
}

fn text_test(field: &FieldValue, target: &FieldValue, test: impl Fn(&str, &str) -> bool) -> bool {
    match (field.as_text(), target.as_text()) {
        (Some(f), Some(t)) => test(&f.to_lowercase(), &t.to_lowercase()),
        _ => false,
    }
}

fn compare(field: &FieldValue, target: &FieldValue) -> Option<Ordering> {
    match (field, target) {
        (FieldValue::Number(a), FieldValue::Number(b)) => a.partial_cmp(b),
        (FieldValue::Timestamp(_), _) | (_, FieldValue::Timestamp(_)) => {
            Some(field.as_timestamp()?.cmp(&target.as_timestamp()?))
        }
        (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Employee, NewEmployee};
    use crate::domain::value_objects::EmployeeStatus;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn employee(n: u128, first: &str, department: &str, salary: f64, hired: (i32, u32, u32)) -> Employee {
        Employee::from_draft(
            Uuid::from_u128(n),
            Utc::now(),
            NewEmployee {
                first_name: first.to_string(),
                last_name: "Martin".to_string(),
                email: format!("{}@bureau.test", first.to_lowercase()),
                department: department.to_string(),
                position: "Analyst".to_string(),
                manager_id: None,
                hire_date: NaiveDate::from_ymd_opt(hired.0, hired.1, hired.2).unwrap(),
                salary,
                status: Some(EmployeeStatus::Active),
            },
        )
    }

    fn staff() -> Vec<Employee> {
        vec![
            employee(1, "Alice", "Finance", 52_000.0, (2021, 3, 1)),
            employee(2, "Bruno", "Sales", 41_000.0, (2023, 9, 15)),
            employee(3, "Chloe", "Finance", 61_000.0, (2019, 1, 7)),
        ]
    }

    fn names(found: &[Employee]) -> Vec<&str> {
        found.iter().map(|e| e.first_name.as_str()).collect()
    }

    #[test]
    fn test_clauses_are_anded_and_order_is_kept() {
        let filter = Filter::new()
            .and(FilterClause::equals("department", "Finance"))
            .and(FilterClause::new("salary", FilterOperator::GreaterThan, 55_000.0));
        let found = apply_filter(staff(), &filter).unwrap();
        assert_eq!(names(&found), vec!["Chloe"]);

        let found = apply_filter(staff(), &Filter::new()).unwrap();
        assert_eq!(names(&found), vec!["Alice", "Bruno", "Chloe"]);
    }

    #[test]
    fn test_text_operators_ignore_case() {
        let filter = Filter::new().and(FilterClause::new("first_name", FilterOperator::StartsWith, "ch"));
        assert_eq!(names(&apply_filter(staff(), &filter).unwrap()), vec!["Chloe"]);

        let filter = Filter::new().and(FilterClause::contains("email", "RUN"));
        assert_eq!(names(&apply_filter(staff(), &filter).unwrap()), vec!["Bruno"]);

        // equals stays exact
        let filter = Filter::new().and(FilterClause::equals("department", "finance"));
        assert!(apply_filter(staff(), &filter).unwrap().is_empty());
    }

    #[test]
    fn test_between_dates_is_inclusive() {
        let filter = Filter::new().and(FilterClause::between("hire_date", "2019-01-07", "2021-03-01"));
        assert_eq!(names(&apply_filter(staff(), &filter).unwrap()), vec!["Alice", "Chloe"]);
    }

    #[test]
    fn test_in_matches_any_member() {
        let filter = Filter::new().and(FilterClause::new(
            "first_name",
            FilterOperator::In,
            vec!["Bruno", "Chloe", "Zoe"],
        ));
        assert_eq!(names(&apply_filter(staff(), &filter).unwrap()), vec!["Bruno", "Chloe"]);
    }

    #[test]
    fn test_type_mismatch_does_not_match() {
        let filter = Filter::new().and(FilterClause::new("salary", FilterOperator::GreaterThan, "lots"));
        assert!(apply_filter(staff(), &filter).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_clauses_are_rejected() {
        let unknown = Filter::new().and(FilterClause::equals("shoe_size", 42.0));
        assert!(matches!(
            apply_filter(staff(), &unknown),
            Err(DomainError::ValidationFailed { .. })
        ));

        let one_bound = Filter::new().and(FilterClause::new(
            "salary",
            FilterOperator::Between,
            vec![1.0],
        ));
        assert!(apply_filter(staff(), &one_bound).is_err());

        let scalar_in = Filter::new().and(FilterClause::new("first_name", FilterOperator::In, "Alice"));
        assert!(apply_filter(staff(), &scalar_in).is_err());
    }
}
