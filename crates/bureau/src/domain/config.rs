//! Domain Configuration
//!
//! Validation rules and default statuses, passed to services as plain data.

use serde::{Deserialize, Serialize};

use super::value_objects::{DealStage, EmployeeStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Maximum length of names and titles
    pub max_name_length: usize,
    /// Accepted document MIME types (empty = accept any)
    pub allowed_mime_types: Vec<String>,
    /// Maximum document size in bytes
    pub max_upload_bytes: u64,
    /// Longest single leave request, in calendar days
    pub max_leave_days: i64,
    /// Default lifetime of a signature workflow
    pub signature_expiry_days: i64,
    pub default_employee_status: EmployeeStatus,
    pub default_deal_stage: DealStage,
}

impl DomainConfig {
    pub fn with_allowed_mime_types(mut self, types: Vec<String>) -> Self {
        self.allowed_mime_types = types;
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn with_signature_expiry_days(mut self, days: i64) -> Self {
        self.signature_expiry_days = days;
        self
    }

    pub fn with_max_leave_days(mut self, days: i64) -> Self {
        self.max_leave_days = days;
        self
    }
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            max_name_length: 255,
            allowed_mime_types: Vec::new(),
            max_upload_bytes: 50 * 1024 * 1024,
            max_leave_days: 60,
            signature_expiry_days: 30,
            default_employee_status: EmployeeStatus::Active,
            default_deal_stage: DealStage::Lead,
        }
    }
}
