//! HR value objects - employee status, leave kind and leave status

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    #[default]
    Active,
    OnLeave,
    Terminated,
}

impl std::fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmployeeStatus::Active => write!(f, "active"),
            EmployeeStatus::OnLeave => write!(f, "on_leave"),
            EmployeeStatus::Terminated => write!(f, "terminated"),
        }
    }
}

impl std::str::FromStr for EmployeeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(EmployeeStatus::Active),
            "on_leave" | "onleave" => Ok(EmployeeStatus::OnLeave),
            "terminated" => Ok(EmployeeStatus::Terminated),
            _ => Err(format!("Unknown employee status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LeaveKind {
    #[default]
    Annual,
    Sick,
    Unpaid,
    Parental,
    Training,
}

impl std::fmt::Display for LeaveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaveKind::Annual => write!(f, "annual"),
            LeaveKind::Sick => write!(f, "sick"),
            LeaveKind::Unpaid => write!(f, "unpaid"),
            LeaveKind::Parental => write!(f, "parental"),
            LeaveKind::Training => write!(f, "training"),
        }
    }
}

impl std::str::FromStr for LeaveKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "annual" => Ok(LeaveKind::Annual),
            "sick" => Ok(LeaveKind::Sick),
            "unpaid" => Ok(LeaveKind::Unpaid),
            "parental" => Ok(LeaveKind::Parental),
            "training" => Ok(LeaveKind::Training),
            _ => Err(format!("Unknown leave kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    /// Rejected and cancelled requests no longer reserve days
    pub fn is_active(&self) -> bool {
        matches!(self, LeaveStatus::Pending | LeaveStatus::Approved)
    }
}

impl std::fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaveStatus::Pending => write!(f, "pending"),
            LeaveStatus::Approved => write!(f, "approved"),
            LeaveStatus::Rejected => write!(f, "rejected"),
            LeaveStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for LeaveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(LeaveStatus::Pending),
            "approved" => Ok(LeaveStatus::Approved),
            "rejected" => Ok(LeaveStatus::Rejected),
            "cancelled" | "canceled" => Ok(LeaveStatus::Cancelled),
            _ => Err(format!("Unknown leave status: {}", s)),
        }
    }
}
