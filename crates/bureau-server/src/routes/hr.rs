//! HR Routes - employees and leave requests
//!
//! HTTP handlers that delegate to HrService.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use bureau::Filter;

use super::{domain_error, not_found, ApiError};
use crate::models::{
    CreateEmployeeRequest, CreateLeaveRequest, DeleteParams, EmployeeListParams,
    EmployeeResponse, FilterRequest, LeaveDecisionRequest, LeaveListParams, LeaveRequestResponse,
    StatusResponse, UpdateEmployeeRequest, UpdateLeaveRequest,
};
use crate::AppState;

type LeaveResult = Result<Json<LeaveRequestResponse>, ApiError>;

fn employee_list(employees: Vec<bureau::Employee>) -> Json<Vec<EmployeeResponse>> {
    Json(employees.into_iter().map(Into::into).collect())
}

fn leave_list(requests: Vec<bureau::LeaveRequest>) -> Json<Vec<LeaveRequestResponse>> {
    Json(requests.into_iter().map(Into::into).collect())
}

// ============================================
// Employees
// ============================================

/// List employees by department, status or manager
#[utoipa::path(
    get,
    path = "/bureau/employees",
    params(EmployeeListParams),
    responses(
        (status = 200, description = "Employees", body = Vec<EmployeeResponse>)
    ),
    tag = "HR"
)]
pub async fn list_employees(
    State(state): State<AppState>,
    Query(params): Query<EmployeeListParams>,
) -> Result<Json<Vec<EmployeeResponse>>, ApiError> {
    let service = &state.hr_service;
    let employees = if let Some(manager_id) = params.manager_id {
        service.direct_reports(manager_id).await
    } else if let Some(department) = params.department {
        service.list_by_department(&department).await
    } else if let Some(status) = params.status {
        service.list_by_status(status).await
    } else {
        service.list_all().await
    }
    .map_err(domain_error)?;

    Ok(employee_list(employees))
}

#[utoipa::path(
    post,
    path = "/bureau/employees/query",
    request_body = FilterRequest,
    responses(
        (status = 200, description = "Matching employees", body = Vec<EmployeeResponse>),
        (status = 422, description = "Unknown field or malformed clause")
    ),
    tag = "HR"
)]
pub async fn query_employees(
    State(state): State<AppState>,
    Json(payload): Json<FilterRequest>,
) -> Result<Json<Vec<EmployeeResponse>>, ApiError> {
    let employees = state
        .hr_service
        .find(&Filter::from(payload))
        .await
        .map_err(domain_error)?;

    Ok(employee_list(employees))
}

#[utoipa::path(
    post,
    path = "/bureau/employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 200, description = "Employee created", body = EmployeeResponse),
        (status = 404, description = "Manager not found"),
        (status = 422, description = "Invalid field")
    ),
    tag = "HR"
)]
pub async fn create_employee(
    State(state): State<AppState>,
    Json(payload): Json<CreateEmployeeRequest>,
) -> Result<Json<EmployeeResponse>, ApiError> {
    let employee = state
        .hr_service
        .create(payload.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(employee.into()))
}

#[utoipa::path(
    get,
    path = "/bureau/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = EmployeeResponse),
        (status = 404, description = "Employee not found")
    ),
    tag = "HR"
)]
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EmployeeResponse>, ApiError> {
    let employee = state
        .hr_service
        .get_by_id(id)
        .await
        .map_err(domain_error)?
        .ok_or_else(|| not_found("Employee"))?;

    Ok(Json(employee.into()))
}

#[utoipa::path(
    put,
    path = "/bureau/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee ID")),
    request_body = UpdateEmployeeRequest,
    responses(
        (status = 200, description = "Employee updated", body = EmployeeResponse),
        (status = 404, description = "Employee or manager not found"),
        (status = 409, description = "Manager change would create a reporting loop")
    ),
    tag = "HR"
)]
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmployeeRequest>,
) -> Result<Json<EmployeeResponse>, ApiError> {
    let employee = state
        .hr_service
        .update(id, payload.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(employee.into()))
}

/// Delete an employee; `recursive` also drops their leave requests
#[utoipa::path(
    delete,
    path = "/bureau/employees/{id}",
    params(
        ("id" = Uuid, Path, description = "Employee ID"),
        DeleteParams
    ),
    responses(
        (status = 200, description = "Employee deleted", body = StatusResponse),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Employee still has reports or leave requests")
    ),
    tag = "HR"
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<StatusResponse>, ApiError> {
    let deleted = state
        .hr_service
        .delete(id, params.recursive)
        .await
        .map_err(domain_error)?;

    if !deleted {
        return Err(not_found("Employee"));
    }
    Ok(Json(StatusResponse::ok(format!("Employee {} deleted", id))))
}

#[utoipa::path(
    get,
    path = "/bureau/employees/{id}/leave",
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Leave requests of the employee", body = Vec<LeaveRequestResponse>)
    ),
    tag = "HR"
)]
pub async fn list_employee_leave(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LeaveRequestResponse>>, ApiError> {
    let requests = state.hr_service.leave_for(id).await.map_err(domain_error)?;
    Ok(leave_list(requests))
}

// ============================================
// Leave requests
// ============================================

#[utoipa::path(
    get,
    path = "/bureau/leave",
    params(LeaveListParams),
    responses(
        (status = 200, description = "Leave requests", body = Vec<LeaveRequestResponse>)
    ),
    tag = "HR"
)]
pub async fn list_leave(
    State(state): State<AppState>,
    Query(params): Query<LeaveListParams>,
) -> Result<Json<Vec<LeaveRequestResponse>>, ApiError> {
    let service = &state.hr_service;
    let mut requests = match params.employee_id {
        Some(employee_id) => service.leave_for(employee_id).await,
        None => match params.status {
            Some(status) => service.leave_by_status(status).await,
            None => service.list_leave().await,
        },
    }
    .map_err(domain_error)?;

    if let (Some(_), Some(status)) = (params.employee_id, params.status) {
        requests.retain(|request| request.status == status);
    }
    Ok(leave_list(requests))
}

#[utoipa::path(
    post,
    path = "/bureau/leave",
    request_body = CreateLeaveRequest,
    responses(
        (status = 200, description = "Leave requested", body = LeaveRequestResponse),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Overlaps an active request, or employee terminated"),
        (status = 422, description = "Invalid date range")
    ),
    tag = "HR"
)]
pub async fn request_leave(
    State(state): State<AppState>,
    Json(payload): Json<CreateLeaveRequest>,
) -> LeaveResult {
    let request = state
        .hr_service
        .request_leave(payload.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(request.into()))
}

#[utoipa::path(
    get,
    path = "/bureau/leave/{id}",
    params(("id" = Uuid, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequestResponse),
        (status = 404, description = "Leave request not found")
    ),
    tag = "HR"
)]
pub async fn get_leave(State(state): State<AppState>, Path(id): Path<Uuid>) -> LeaveResult {
    let request = state
        .hr_service
        .get_leave(id)
        .await
        .map_err(domain_error)?
        .ok_or_else(|| not_found("LeaveRequest"))?;

    Ok(Json(request.into()))
}

/// Edit a pending request
#[utoipa::path(
    put,
    path = "/bureau/leave/{id}",
    params(("id" = Uuid, Path, description = "Leave request ID")),
    request_body = UpdateLeaveRequest,
    responses(
        (status = 200, description = "Leave request updated", body = LeaveRequestResponse),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Already decided, or overlapping"),
        (status = 422, description = "Invalid date range")
    ),
    tag = "HR"
)]
pub async fn update_leave(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLeaveRequest>,
) -> LeaveResult {
    let request = state
        .hr_service
        .update_leave(id, payload.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(request.into()))
}

#[utoipa::path(
    post,
    path = "/bureau/leave/{id}/approve",
    params(("id" = Uuid, Path, description = "Leave request ID")),
    request_body = LeaveDecisionRequest,
    responses(
        (status = 200, description = "Leave approved", body = LeaveRequestResponse),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request is not pending")
    ),
    tag = "HR"
)]
pub async fn approve_leave(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LeaveDecisionRequest>,
) -> LeaveResult {
    let request = state
        .hr_service
        .approve(id, payload.decided_by)
        .await
        .map_err(domain_error)?;

    Ok(Json(request.into()))
}

#[utoipa::path(
    post,
    path = "/bureau/leave/{id}/reject",
    params(("id" = Uuid, Path, description = "Leave request ID")),
    request_body = LeaveDecisionRequest,
    responses(
        (status = 200, description = "Leave rejected", body = LeaveRequestResponse),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request is not pending")
    ),
    tag = "HR"
)]
pub async fn reject_leave(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LeaveDecisionRequest>,
) -> LeaveResult {
    let request = state
        .hr_service
        .reject(id, payload.decided_by)
        .await
        .map_err(domain_error)?;

    Ok(Json(request.into()))
}

#[utoipa::path(
    post,
    path = "/bureau/leave/{id}/cancel",
    params(("id" = Uuid, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave cancelled", body = LeaveRequestResponse),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request already closed")
    ),
    tag = "HR"
)]
pub async fn cancel_leave(State(state): State<AppState>, Path(id): Path<Uuid>) -> LeaveResult {
    let request = state
        .hr_service
        .cancel(id)
        .await
        .map_err(domain_error)?;

    Ok(Json(request.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        // Employees
        .route("/bureau/employees", get(list_employees).post(create_employee))
        .route("/bureau/employees/query", post(query_employees))
        .route(
            "/bureau/employees/:id",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        .route("/bureau/employees/:id/leave", get(list_employee_leave))
        // Leave
        .route("/bureau/leave", get(list_leave).post(request_leave))
        .route("/bureau/leave/:id", get(get_leave).put(update_leave))
        .route("/bureau/leave/:id/approve", post(approve_leave))
        .route("/bureau/leave/:id/reject", post(reject_leave))
        .route("/bureau/leave/:id/cancel", post(cancel_leave))
}
