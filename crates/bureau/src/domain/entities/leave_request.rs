//! LeaveRequest - Time off requested by an employee

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{Entity, Validate};
use crate::domain::config::DomainConfig;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{FieldValue, LeaveKind, LeaveStatus};

const ENTITY: &str = "LeaveRequest";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub kind: LeaveKind,
    /// First day off
    pub start_date: NaiveDate,
    /// Last day off, inclusive
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: LeaveStatus,
    pub decided_by: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: Uuid,
    pub kind: LeaveKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

/// Edits are only accepted while the request is pending
#[derive(Debug, Clone, Default)]
pub struct LeaveRequestPatch {
    pub kind: Option<LeaveKind>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<Option<String>>,
}

/// Inclusive day count of a date range
pub fn leave_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

pub fn validate_leave_range(
    start: NaiveDate,
    end: NaiveDate,
    config: &DomainConfig,
) -> Result<(), DomainError> {
    if end < start {
        return Err(DomainError::validation("end_date", "must not be before start_date"));
    }
    if leave_days(start, end) > config.max_leave_days {
        return Err(DomainError::validation(
            "end_date",
            format!("a single request may cover at most {} days", config.max_leave_days),
        ));
    }
    Ok(())
}

impl LeaveRequest {
    pub const BY_EMPLOYEE: &'static str = "employee";
    pub const BY_STATUS: &'static str = "status";

    pub fn days(&self) -> i64 {
        leave_days(self.start_date, self.end_date)
    }

    /// Whether `[start, end]` shares at least one day with this request
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    fn decide(
        &mut self,
        to: LeaveStatus,
        allowed_from: &[LeaveStatus],
        by: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !allowed_from.contains(&self.status) {
            return Err(DomainError::invalid_transition(
                ENTITY,
                self.status,
                to,
                format!("request is already {}", self.status),
            ));
        }
        self.status = to;
        if by.is_some() {
            self.decided_by = by;
        }
        self.decided_at = Some(now);
        Ok(())
    }

    /// `pending -> approved`
    pub fn approve(&mut self, by: impl Into<String>, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.decide(LeaveStatus::Approved, &[LeaveStatus::Pending], Some(by.into()), now)
    }

    /// `pending -> rejected`
    pub fn reject(&mut self, by: impl Into<String>, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.decide(LeaveStatus::Rejected, &[LeaveStatus::Pending], Some(by.into()), now)
    }

    /// `pending | approved -> cancelled`
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.decide(
            LeaveStatus::Cancelled,
            &[LeaveStatus::Pending, LeaveStatus::Approved],
            None,
            now,
        )
    }
}

impl Validate for NewLeaveRequest {
    fn validate(&self, config: &DomainConfig) -> Result<(), DomainError> {
        validate_leave_range(self.start_date, self.end_date, config)
    }
}

impl Validate for LeaveRequestPatch {
    fn validate(&self, config: &DomainConfig) -> Result<(), DomainError> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            validate_leave_range(start, end, config)?;
        }
        Ok(())
    }
}

impl Entity for LeaveRequest {
    const ENTITY_TYPE: &'static str = ENTITY;
    const FIELDS: &'static [&'static str] = &[
        "id",
        "employee_id",
        "kind",
        "start_date",
        "end_date",
        "days",
        "reason",
        "status",
        "decided_by",
        "created_at",
        "updated_at",
    ];
    const INDEXES: &'static [&'static str] = &[Self::BY_EMPLOYEE, Self::BY_STATUS];

    type Draft = NewLeaveRequest;
    type Patch = LeaveRequestPatch;

    fn from_draft(id: Uuid, now: DateTime<Utc>, draft: NewLeaveRequest) -> Self {
        Self {
            id,
            employee_id: draft.employee_id,
            kind: draft.kind,
            start_date: draft.start_date,
            end_date: draft.end_date,
            reason: draft.reason,
            status: LeaveStatus::Pending,
            decided_by: None,
            decided_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: LeaveRequestPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(end) = patch.end_date {
            self.end_date = end;
        }
        if let Some(reason) = patch.reason {
            self.reason = reason;
        }
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_timestamps(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) {
        self.created_at = created_at;
        self.updated_at = updated_at;
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => self.id.into(),
            "employee_id" => self.employee_id.into(),
            "kind" => self.kind.to_string().into(),
            "start_date" => self.start_date.into(),
            "end_date" => self.end_date.into(),
            "days" => self.days().into(),
            "reason" => self.reason.clone().into(),
            "status" => self.status.to_string().into(),
            "decided_by" => self.decided_by.clone().into(),
            "created_at" => self.created_at.into(),
            "updated_at" => self.updated_at.into(),
            _ => return None,
        })
    }

    fn index_keys(&self, index: &str) -> Vec<String> {
        match index {
            Self::BY_EMPLOYEE => vec![self.employee_id.to_string()],
            Self::BY_STATUS => vec![self.status.to_string()],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn request(start: &str, end: &str) -> LeaveRequest {
        LeaveRequest::from_draft(
            Uuid::from_u128(1),
            Utc::now(),
            NewLeaveRequest {
                employee_id: Uuid::from_u128(7),
                kind: LeaveKind::Annual,
                start_date: date(start),
                end_date: date(end),
                reason: None,
            },
        )
    }

    #[test]
    fn test_days_are_inclusive() {
        assert_eq!(request("2026-07-01", "2026-07-01").days(), 1);
        assert_eq!(request("2026-07-01", "2026-07-10").days(), 10);
    }

    #[test]
    fn test_range_validation() {
        let config = DomainConfig::default().with_max_leave_days(5);
        assert!(validate_leave_range(date("2026-07-02"), date("2026-07-01"), &config).is_err());
        assert!(validate_leave_range(date("2026-07-01"), date("2026-07-06"), &config).is_err());
        assert!(validate_leave_range(date("2026-07-01"), date("2026-07-05"), &config).is_ok());
    }

    #[test]
    fn test_overlap() {
        let req = request("2026-07-01", "2026-07-10");
        assert!(req.overlaps(date("2026-07-10"), date("2026-07-12")));
        assert!(!req.overlaps(date("2026-07-11"), date("2026-07-12")));
    }

    #[test]
    fn test_transitions() {
        let now = Utc::now();
        let mut req = request("2026-07-01", "2026-07-02");
        req.approve("manager@example.com", now).unwrap();
        assert_eq!(req.status, LeaveStatus::Approved);

        let err = req.reject("manager@example.com", now).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
        assert_eq!(req.status, LeaveStatus::Approved);

        req.cancel(now).unwrap();
        assert_eq!(req.status, LeaveStatus::Cancelled);
        assert_eq!(req.decided_by.as_deref(), Some("manager@example.com"));
        assert!(req.cancel(now).is_err());
    }
}
