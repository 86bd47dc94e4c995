//! HR DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use bureau::domain::{EmployeePatch, LeaveKind, LeaveRequestPatch, NewEmployee, NewLeaveRequest};
use bureau::{Employee, EmployeeStatus, LeaveRequest, LeaveStatus};

use super::common::double_option;

// ============================================
// Employees
// ============================================

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub manager_id: Option<Uuid>,
    pub hire_date: NaiveDate,
    pub salary: f64,
    #[schema(value_type = String)]
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Employee> for EmployeeResponse {
    fn from(e: Employee) -> Self {
        Self {
            full_name: e.full_name(),
            id: e.id,
            first_name: e.first_name,
            last_name: e.last_name,
            email: e.email,
            department: e.department,
            position: e.position,
            manager_id: e.manager_id,
            hire_date: e.hire_date,
            salary: e.salary,
            status: e.status,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployeeRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub manager_id: Option<Uuid>,
    pub hire_date: NaiveDate,
    pub salary: f64,
    /// Defaults to `active`
    #[schema(value_type = Option<String>)]
    pub status: Option<EmployeeStatus>,
}

impl From<CreateEmployeeRequest> for NewEmployee {
    fn from(r: CreateEmployeeRequest) -> Self {
        NewEmployee {
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            department: r.department,
            position: r.position,
            manager_id: r.manager_id,
            hire_date: r.hire_date,
            salary: r.salary,
            status: r.status,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEmployeeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    /// `null` detaches the employee from their manager
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub manager_id: Option<Option<Uuid>>,
    pub salary: Option<f64>,
    #[schema(value_type = Option<String>)]
    pub status: Option<EmployeeStatus>,
}

impl From<UpdateEmployeeRequest> for EmployeePatch {
    fn from(r: UpdateEmployeeRequest) -> Self {
        EmployeePatch {
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            department: r.department,
            position: r.position,
            manager_id: r.manager_id,
            salary: r.salary,
            status: r.status,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmployeeListParams {
    pub department: Option<String>,
    #[param(value_type = Option<String>)]
    pub status: Option<EmployeeStatus>,
    pub manager_id: Option<Uuid>,
}

// ============================================
// Leave requests
// ============================================

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaveRequestResponse {
    pub id: Uuid,
    pub employee_id: Uuid,
    #[schema(value_type = String)]
    pub kind: LeaveKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Calendar days, both ends included
    pub days: i64,
    pub reason: Option<String>,
    #[schema(value_type = String)]
    pub status: LeaveStatus,
    pub decided_by: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LeaveRequest> for LeaveRequestResponse {
    fn from(l: LeaveRequest) -> Self {
        Self {
            days: l.days(),
            id: l.id,
            employee_id: l.employee_id,
            kind: l.kind,
            start_date: l.start_date,
            end_date: l.end_date,
            reason: l.reason,
            status: l.status,
            decided_by: l.decided_by,
            decided_at: l.decided_at,
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLeaveRequest {
    pub employee_id: Uuid,
    #[serde(default)]
    #[schema(value_type = String)]
    pub kind: LeaveKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

impl From<CreateLeaveRequest> for NewLeaveRequest {
    fn from(r: CreateLeaveRequest) -> Self {
        NewLeaveRequest {
            employee_id: r.employee_id,
            kind: r.kind,
            start_date: r.start_date,
            end_date: r.end_date,
            reason: r.reason,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLeaveRequest {
    #[schema(value_type = Option<String>)]
    pub kind: Option<LeaveKind>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub reason: Option<Option<String>>,
}

impl From<UpdateLeaveRequest> for LeaveRequestPatch {
    fn from(r: UpdateLeaveRequest) -> Self {
        LeaveRequestPatch {
            kind: r.kind,
            start_date: r.start_date,
            end_date: r.end_date,
            reason: r.reason,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LeaveDecisionRequest {
    pub decided_by: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaveListParams {
    pub employee_id: Option<Uuid>,
    #[param(value_type = Option<String>)]
    pub status: Option<LeaveStatus>,
}
