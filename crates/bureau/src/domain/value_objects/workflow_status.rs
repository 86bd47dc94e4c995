//! Signature workflow and step statuses

use serde::{Deserialize, Serialize};

/// Aggregate status of a signature workflow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    Draft,
    Pending,
    Completed,
    Cancelled,
    Expired,
}

impl WorkflowStatus {
    /// Completed, cancelled and expired workflows accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowStatus::Completed | WorkflowStatus::Cancelled | WorkflowStatus::Expired
        )
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowStatus::Draft => write!(f, "draft"),
            WorkflowStatus::Pending => write!(f, "pending"),
            WorkflowStatus::Completed => write!(f, "completed"),
            WorkflowStatus::Cancelled => write!(f, "cancelled"),
            WorkflowStatus::Expired => write!(f, "expired"),
        }
    }
}

impl std::str::FromStr for WorkflowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(WorkflowStatus::Draft),
            "pending" => Ok(WorkflowStatus::Pending),
            "completed" => Ok(WorkflowStatus::Completed),
            "cancelled" | "canceled" => Ok(WorkflowStatus::Cancelled),
            "expired" => Ok(WorkflowStatus::Expired),
            _ => Err(format!("Unknown workflow status: {}", s)),
        }
    }
}

/// Status of one signer's step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    /// Signature request delivered to the signer
    Sent,
    Signed,
    Declined,
    Expired,
}

impl StepStatus {
    /// Still waiting on the signer (not yet decided)
    pub fn is_open(&self) -> bool {
        matches!(self, StepStatus::Pending | StepStatus::Sent)
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Pending => write!(f, "pending"),
            StepStatus::Sent => write!(f, "sent"),
            StepStatus::Signed => write!(f, "signed"),
            StepStatus::Declined => write!(f, "declined"),
            StepStatus::Expired => write!(f, "expired"),
        }
    }
}

impl std::str::FromStr for StepStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(StepStatus::Pending),
            "sent" => Ok(StepStatus::Sent),
            "signed" => Ok(StepStatus::Signed),
            "declined" => Ok(StepStatus::Declined),
            "expired" => Ok(StepStatus::Expired),
            _ => Err(format!("Unknown step status: {}", s)),
        }
    }
}
