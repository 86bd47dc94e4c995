//! Employee - HR personnel record

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{optional_key, require_email, require_name, Entity, Validate};
use crate::domain::config::DomainConfig;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{EmployeeStatus, FieldValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub manager_id: Option<Uuid>,
    pub hire_date: NaiveDate,
    /// Gross annual salary
    pub salary: f64,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub manager_id: Option<Uuid>,
    pub hire_date: NaiveDate,
    pub salary: f64,
    /// Falls back to the configured default status
    pub status: Option<EmployeeStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct EmployeePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub manager_id: Option<Option<Uuid>>,
    pub salary: Option<f64>,
    pub status: Option<EmployeeStatus>,
}

impl Employee {
    pub const BY_DEPARTMENT: &'static str = "department";
    pub const BY_MANAGER: &'static str = "manager";
    pub const BY_STATUS: &'static str = "status";

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn validate_salary(salary: f64) -> Result<(), DomainError> {
    if !salary.is_finite() || salary < 0.0 {
        return Err(DomainError::validation("salary", "must be a non-negative amount"));
    }
    Ok(())
}

impl Validate for NewEmployee {
    fn validate(&self, config: &DomainConfig) -> Result<(), DomainError> {
        require_name("first_name", &self.first_name, config)?;
        require_name("last_name", &self.last_name, config)?;
        require_email("email", &self.email)?;
        require_name("department", &self.department, config)?;
        require_name("position", &self.position, config)?;
        validate_salary(self.salary)
    }
}

impl Validate for EmployeePatch {
    fn validate(&self, config: &DomainConfig) -> Result<(), DomainError> {
        if let Some(v) = &self.first_name {
            require_name("first_name", v, config)?;
        }
        if let Some(v) = &self.last_name {
            require_name("last_name", v, config)?;
        }
        if let Some(v) = &self.email {
            require_email("email", v)?;
        }
        if let Some(v) = &self.department {
            require_name("department", v, config)?;
        }
        if let Some(v) = &self.position {
            require_name("position", v, config)?;
        }
        if let Some(v) = self.salary {
            validate_salary(v)?;
        }
        Ok(())
    }
}

impl Entity for Employee {
    const ENTITY_TYPE: &'static str = "Employee";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "first_name",
        "last_name",
        "email",
        "department",
        "position",
        "manager_id",
        "hire_date",
        "salary",
        "status",
        "created_at",
        "updated_at",
    ];
    const INDEXES: &'static [&'static str] = &[Self::BY_DEPARTMENT, Self::BY_MANAGER, Self::BY_STATUS];

    type Draft = NewEmployee;
    type Patch = EmployeePatch;

    fn from_draft(id: Uuid, now: DateTime<Utc>, draft: NewEmployee) -> Self {
        Self {
            id,
            first_name: draft.first_name.trim().to_string(),
            last_name: draft.last_name.trim().to_string(),
            email: draft.email.trim().to_lowercase(),
            department: draft.department.trim().to_string(),
            position: draft.position.trim().to_string(),
            manager_id: draft.manager_id,
            hire_date: draft.hire_date,
            salary: draft.salary,
            status: draft.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: EmployeePatch) {
        if let Some(v) = patch.first_name {
            self.first_name = v.trim().to_string();
        }
        if let Some(v) = patch.last_name {
            self.last_name = v.trim().to_string();
        }
        if let Some(v) = patch.email {
            self.email = v.trim().to_lowercase();
        }
        if let Some(v) = patch.department {
            self.department = v.trim().to_string();
        }
        if let Some(v) = patch.position {
            self.position = v.trim().to_string();
        }
        if let Some(v) = patch.manager_id {
            self.manager_id = v;
        }
        if let Some(v) = patch.salary {
            self.salary = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
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
            "first_name" => self.first_name.as_str().into(),
            "last_name" => self.last_name.as_str().into(),
            "email" => self.email.as_str().into(),
            "department" => self.department.as_str().into(),
            "position" => self.position.as_str().into(),
            "manager_id" => self.manager_id.into(),
            "hire_date" => self.hire_date.into(),
            "salary" => self.salary.into(),
            "status" => self.status.to_string().into(),
            "created_at" => self.created_at.into(),
            "updated_at" => self.updated_at.into(),
            _ => return None,
        })
    }

    fn index_keys(&self, index: &str) -> Vec<String> {
        match index {
            Self::BY_DEPARTMENT => vec![self.department.to_lowercase()],
            Self::BY_MANAGER => vec![optional_key(self.manager_id)],
            Self::BY_STATUS => vec![self.status.to_string()],
            _ => Vec::new(),
        }
    }
}
