//! DealStage - Sales pipeline columns

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DealStage {
    #[default]
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl DealStage {
    /// Pipeline columns in display order
    pub const ALL: [DealStage; 6] = [
        DealStage::Lead,
        DealStage::Qualified,
        DealStage::Proposal,
        DealStage::Negotiation,
        DealStage::Won,
        DealStage::Lost,
    ];

    /// Won and lost deals are closed
    pub fn is_closed(&self) -> bool {
        matches!(self, DealStage::Won | DealStage::Lost)
    }

    /// Win probability used for the weighted pipeline value
    pub fn probability(&self) -> f64 {
        match self {
            DealStage::Lead => 0.1,
            DealStage::Qualified => 0.25,
            DealStage::Proposal => 0.5,
            DealStage::Negotiation => 0.75,
            DealStage::Won => 1.0,
            DealStage::Lost => 0.0,
        }
    }
}

impl std::fmt::Display for DealStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DealStage::Lead => write!(f, "lead"),
            DealStage::Qualified => write!(f, "qualified"),
            DealStage::Proposal => write!(f, "proposal"),
            DealStage::Negotiation => write!(f, "negotiation"),
            DealStage::Won => write!(f, "won"),
            DealStage::Lost => write!(f, "lost"),
        }
    }
}

impl std::str::FromStr for DealStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lead" => Ok(DealStage::Lead),
            "qualified" => Ok(DealStage::Qualified),
            "proposal" => Ok(DealStage::Proposal),
            "negotiation" => Ok(DealStage::Negotiation),
            "won" => Ok(DealStage::Won),
            "lost" => Ok(DealStage::Lost),
            _ => Err(format!("Unknown deal stage: {}", s)),
        }
    }
}
