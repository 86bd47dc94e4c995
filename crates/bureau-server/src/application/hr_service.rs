//! HR Application Service (Use Case)
//!
//! Employees, their reporting lines and leave requests.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use bureau::domain::services::folder_paths::would_create_cycle;
use bureau::domain::{
    optional_key, validate_leave_range, EmployeePatch, LeaveRequestPatch, NewEmployee,
    NewLeaveRequest,
};
use bureau::{
    Clock, DomainConfig, DomainError, Employee, EmployeeStatus, Filter, LeaveRequest, LeaveStatus,
    LinkedEntityType, Repo, Validate,
};

use super::DocumentService;

/// Application service for Employee and LeaveRequest operations
pub struct HrService {
    employees: Repo<Employee>,
    leave: Repo<LeaveRequest>,
    documents: Arc<DocumentService>,
    clock: Arc<dyn Clock>,
    config: Arc<DomainConfig>,
}

impl HrService {
    pub fn new(
        employees: Repo<Employee>,
        leave: Repo<LeaveRequest>,
        documents: Arc<DocumentService>,
        clock: Arc<dyn Clock>,
        config: Arc<DomainConfig>,
    ) -> Self {
        Self {
            employees,
            leave,
            documents,
            clock,
            config,
        }
    }

    /// Get all Employees
    pub async fn list_all(&self) -> Result<Vec<Employee>, DomainError> {
        self.employees.find_all().await
    }

    pub async fn find(&self, filter: &Filter) -> Result<Vec<Employee>, DomainError> {
        self.employees.find_where(filter).await
    }

    /// Get an Employee by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Employee>, DomainError> {
        self.employees.find_by_id(id).await
    }

    async fn require(&self, id: Uuid) -> Result<Employee, DomainError> {
        self.employees
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Employee", id))
    }

    pub async fn list_by_department(&self, department: &str) -> Result<Vec<Employee>, DomainError> {
        self.employees
            .find_by_index(Employee::BY_DEPARTMENT, &department.to_lowercase())
            .await
    }

    pub async fn list_by_status(&self, status: EmployeeStatus) -> Result<Vec<Employee>, DomainError> {
        self.employees
            .find_by_index(Employee::BY_STATUS, &status.to_string())
            .await
    }

    /// Direct reports of `manager_id`
    pub async fn direct_reports(&self, manager_id: Uuid) -> Result<Vec<Employee>, DomainError> {
        self.employees
            .find_by_index(Employee::BY_MANAGER, &optional_key(Some(manager_id)))
            .await
    }

    /// Create a new Employee; status defaults to the configured one
    pub async fn create(&self, mut draft: NewEmployee) -> Result<Employee, DomainError> {
        draft.validate(&self.config)?;
        if let Some(manager_id) = draft.manager_id {
            self.require(manager_id).await?;
        }
        draft.status = draft.status.or(Some(self.config.default_employee_status));

        let saved = self.employees.create(draft).await?;
        tracing::info!(
            "Created Employee: {} ({}) - {}",
            saved.full_name(),
            saved.id,
            saved.department
        );
        Ok(saved)
    }

    /// Update an Employee; a new manager must not close a reporting loop
    pub async fn update(&self, id: Uuid, patch: EmployeePatch) -> Result<Employee, DomainError> {
        patch.validate(&self.config)?;
        let current = self.require(id).await?;

        if let Some(Some(manager_id)) = patch.manager_id {
            let manager = self.require(manager_id).await?;
            let chain: HashMap<Uuid, Option<Uuid>> = self
                .employees
                .find_all()
                .await?
                .into_iter()
                .map(|e| (e.id, e.manager_id))
                .collect();
            if would_create_cycle(id, manager_id, &chain) {
                return Err(DomainError::invalid_transition(
                    "Employee",
                    current.full_name(),
                    manager.full_name(),
                    "an employee cannot report to themselves or to one of their reports",
                ));
            }
        }

        self.employees.update(id, patch).await
    }

    /// Delete an Employee
    ///
    /// Direct reports always block the deletion; leave requests are removed
    /// only when `recursive` is set. Document links to the employee go with it.
    pub async fn delete(&self, id: Uuid, recursive: bool) -> Result<bool, DomainError> {
        if self.employees.find_by_id(id).await?.is_none() {
            return Ok(false);
        }

        let reports = self.direct_reports(id).await?;
        if !reports.is_empty() {
            return Err(DomainError::dependents_exist("Employee", id, reports.len()));
        }
        let requests = self.leave_for(id).await?;
        if !requests.is_empty() && !recursive {
            return Err(DomainError::dependents_exist("Employee", id, requests.len()));
        }
        for request in &requests {
            self.leave.delete(request.id).await?;
        }

        let unlinked = self
            .documents
            .unlink_target(LinkedEntityType::Employee, &id.to_string())
            .await?;

        let deleted = self.employees.delete(id).await?;
        if deleted {
            tracing::info!(
                "Deleted Employee: {} ({} leave request(s), {} document link(s))",
                id,
                requests.len(),
                unlinked
            );
        }
        Ok(deleted)
    }

    pub async fn list_leave(&self) -> Result<Vec<LeaveRequest>, DomainError> {
        self.leave.find_all().await
    }

    /// Leave requests of one employee, oldest first
    pub async fn leave_for(&self, employee_id: Uuid) -> Result<Vec<LeaveRequest>, DomainError> {
        self.leave
            .find_by_index(LeaveRequest::BY_EMPLOYEE, &employee_id.to_string())
            .await
    }

    pub async fn leave_by_status(&self, status: LeaveStatus) -> Result<Vec<LeaveRequest>, DomainError> {
        self.leave
            .find_by_index(LeaveRequest::BY_STATUS, &status.to_string())
            .await
    }

    pub async fn get_leave(&self, id: Uuid) -> Result<Option<LeaveRequest>, DomainError> {
        self.leave.find_by_id(id).await
    }

    async fn require_leave(&self, id: Uuid) -> Result<LeaveRequest, DomainError> {
        self.leave
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("LeaveRequest", id))
    }

    async fn ensure_no_overlap(
        &self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        ignore: Option<Uuid>,
    ) -> Result<(), DomainError> {
        let clash = self
            .leave_for(employee_id)
            .await?
            .into_iter()
            .filter(|r| Some(r.id) != ignore && r.status.is_active())
            .find(|r| r.overlaps(start, end));
        match clash {
            Some(existing) => Err(DomainError::validation(
                "start_date",
                format!(
                    "overlaps leave request {} ({} to {})",
                    existing.id, existing.start_date, existing.end_date
                ),
            )),
            None => Ok(()),
        }
    }

    /// File a leave request for an active employee
    pub async fn request_leave(&self, draft: NewLeaveRequest) -> Result<LeaveRequest, DomainError> {
        draft.validate(&self.config)?;
        let employee = self.require(draft.employee_id).await?;
        if employee.status == EmployeeStatus::Terminated {
            return Err(DomainError::validation(
                "employee_id",
                "terminated employees cannot request leave",
            ));
        }
        self.ensure_no_overlap(draft.employee_id, draft.start_date, draft.end_date, None)
            .await?;

        let saved = self.leave.create(draft).await?;
        tracing::info!(
            "Leave requested: {} for {} ({} day(s))",
            saved.id,
            saved.employee_id,
            saved.days()
        );
        Ok(saved)
    }

    /// Edit a pending leave request
    pub async fn update_leave(
        &self,
        id: Uuid,
        patch: LeaveRequestPatch,
    ) -> Result<LeaveRequest, DomainError> {
        patch.validate(&self.config)?;
        let current = self.require_leave(id).await?;
        if current.status != LeaveStatus::Pending {
            return Err(DomainError::invalid_transition(
                "LeaveRequest",
                current.status,
                current.status,
                "only pending requests can be edited",
            ));
        }

        let start = patch.start_date.unwrap_or(current.start_date);
        let end = patch.end_date.unwrap_or(current.end_date);
        validate_leave_range(start, end, &self.config)?;
        self.ensure_no_overlap(current.employee_id, start, end, Some(id))
            .await?;

        self.leave.update(id, patch).await
    }

    pub async fn approve(&self, id: Uuid, by: String) -> Result<LeaveRequest, DomainError> {
        let now = self.clock.now();
        let saved = self
            .leave
            .modify(id, Box::new(move |request| request.approve(by, now)))
            .await?;
        tracing::info!("Leave approved: {}", id);
        Ok(saved)
    }

    pub async fn reject(&self, id: Uuid, by: String) -> Result<LeaveRequest, DomainError> {
        let now = self.clock.now();
        let saved = self
            .leave
            .modify(id, Box::new(move |request| request.reject(by, now)))
            .await?;
        tracing::info!("Leave rejected: {}", id);
        Ok(saved)
    }

    pub async fn cancel(&self, id: Uuid) -> Result<LeaveRequest, DomainError> {
        let now = self.clock.now();
        let saved = self
            .leave
            .modify(id, Box::new(move |request| request.cancel(now)))
            .await?;
        tracing::info!("Leave cancelled: {}", id);
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::Fixture;
    use bureau::domain::LeaveKind;
    use bureau::FilterClause;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hire(first: &str, department: &str, manager_id: Option<Uuid>) -> NewEmployee {
        NewEmployee {
            first_name: first.into(),
            last_name: "Petit".into(),
            email: format!("{}@bureau.test", first.to_lowercase()),
            department: department.into(),
            position: "Consultant".into(),
            manager_id,
            hire_date: date(2022, 5, 2),
            salary: 45_000.0,
            status: None,
        }
    }

    fn leave(employee_id: Uuid, start: NaiveDate, end: NaiveDate) -> NewLeaveRequest {
        NewLeaveRequest {
            employee_id,
            kind: LeaveKind::Annual,
            start_date: start,
            end_date: end,
            reason: None,
        }
    }

    #[tokio::test]
    async fn test_create_applies_default_status_and_filters() {
        let fx = Fixture::new();
        let hr = fx.hr();
        let lea = hr.create(hire("Lea", "Finance", None)).await.unwrap();
        hr.create(hire("Marc", "Sales", None)).await.unwrap();
        assert_eq!(lea.status, EmployeeStatus::Active);

        let finance = hr.list_by_department("FINANCE").await.unwrap();
        assert_eq!(finance, vec![lea.clone()]);

        let filter = Filter::new().and(FilterClause::contains("email", "marc"));
        assert_eq!(hr.find(&filter).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_leave_dates_are_validated() {
        let fx = Fixture::new();
        let hr = fx.hr();
        let lea = hr.create(hire("Lea", "Finance", None)).await.unwrap();

        let backwards = hr
            .request_leave(leave(lea.id, date(2026, 4, 10), date(2026, 4, 1)))
            .await;
        assert!(matches!(backwards, Err(DomainError::ValidationFailed { .. })));

        let too_long = hr
            .request_leave(leave(lea.id, date(2026, 1, 1), date(2026, 6, 1)))
            .await;
        assert!(too_long.is_err());

        hr.request_leave(leave(lea.id, date(2026, 4, 1), date(2026, 4, 10)))
            .await
            .unwrap();
        let overlapping = hr
            .request_leave(leave(lea.id, date(2026, 4, 10), date(2026, 4, 12)))
            .await;
        assert!(matches!(overlapping, Err(DomainError::ValidationFailed { .. })));
    }

    #[tokio::test]
    async fn test_leave_transitions() {
        let fx = Fixture::new();
        let hr = fx.hr();
        let lea = hr.create(hire("Lea", "Finance", None)).await.unwrap();
        let request = hr
            .request_leave(leave(lea.id, date(2026, 7, 6), date(2026, 7, 17)))
            .await
            .unwrap();
        assert_eq!(request.days(), 12);

        let approved = hr.approve(request.id, "hr@bureau.test".into()).await.unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.decided_by.as_deref(), Some("hr@bureau.test"));

        let err = hr.reject(request.id, "hr@bureau.test".into()).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));

        let edit = hr
            .update_leave(
                request.id,
                LeaveRequestPatch {
                    end_date: Some(date(2026, 7, 20)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(edit, Err(DomainError::InvalidTransition { .. })));

        let cancelled = hr.cancel(request.id).await.unwrap();
        assert_eq!(cancelled.status, LeaveStatus::Cancelled);
        // A cancelled request no longer blocks the same dates
        hr.request_leave(leave(lea.id, date(2026, 7, 6), date(2026, 7, 17)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_respects_reports_and_leave() {
        let fx = Fixture::new();
        let hr = fx.hr();
        let boss = hr.create(hire("Nora", "Ops", None)).await.unwrap();
        let report = hr.create(hire("Omar", "Ops", Some(boss.id))).await.unwrap();
        hr.request_leave(leave(report.id, date(2026, 8, 3), date(2026, 8, 7)))
            .await
            .unwrap();

        assert!(matches!(
            hr.delete(boss.id, true).await,
            Err(DomainError::DependentsExist { .. })
        ));
        assert!(matches!(
            hr.delete(report.id, false).await,
            Err(DomainError::DependentsExist { .. })
        ));

        assert!(hr.delete(report.id, true).await.unwrap());
        assert!(fx.leave.find_all().await.unwrap().is_empty());
        assert!(hr.delete(boss.id, false).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_removes_document_links_to_the_employee() {
        let fx = Fixture::new();
        let hr = fx.hr();
        let gone = hr.create(hire("Nora", "Ops", None)).await.unwrap();
        let kept = hr.create(hire("Omar", "Ops", None)).await.unwrap();
        fx.link_document(LinkedEntityType::Employee, &gone.id.to_string()).await;
        let other = fx
            .link_document(LinkedEntityType::Employee, &kept.id.to_string())
            .await;

        assert!(hr.delete(gone.id, false).await.unwrap());
        let documents = fx.documents();
        assert!(documents
            .links_for_target(LinkedEntityType::Employee, &gone.id.to_string())
            .await
            .unwrap()
            .is_empty());
        assert_eq!(fx.links.find_all().await.unwrap(), vec![other]);
    }

    #[tokio::test]
    async fn test_blocked_delete_keeps_document_links() {
        let fx = Fixture::new();
        let hr = fx.hr();
        let boss = hr.create(hire("Nora", "Ops", None)).await.unwrap();
        hr.create(hire("Omar", "Ops", Some(boss.id))).await.unwrap();
        let link = fx
            .link_document(LinkedEntityType::Employee, &boss.id.to_string())
            .await;

        assert!(hr.delete(boss.id, true).await.is_err());
        assert_eq!(fx.links.find_all().await.unwrap(), vec![link]);
    }

    #[tokio::test]
    async fn test_reporting_loop_is_refused() {
        let fx = Fixture::new();
        let hr = fx.hr();
        let boss = hr.create(hire("Nora", "Ops", None)).await.unwrap();
        let report = hr.create(hire("Omar", "Ops", Some(boss.id))).await.unwrap();

        let err = hr
            .update(
                boss.id,
                EmployeePatch {
                    manager_id: Some(Some(report.id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
        let boss = hr.get_by_id(boss.id).await.unwrap().unwrap();
        assert_eq!(boss.manager_id, None);
    }
}
