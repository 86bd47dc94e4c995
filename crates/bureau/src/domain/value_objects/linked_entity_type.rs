//! LinkedEntityType - CRM objects a document can be attached to

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LinkedEntityType {
    Contact,
    Company,
    Deal,
    Employee,
    Campaign,
}

impl std::fmt::Display for LinkedEntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkedEntityType::Contact => write!(f, "contact"),
            LinkedEntityType::Company => write!(f, "company"),
            LinkedEntityType::Deal => write!(f, "deal"),
            LinkedEntityType::Employee => write!(f, "employee"),
            LinkedEntityType::Campaign => write!(f, "campaign"),
        }
    }
}

impl std::str::FromStr for LinkedEntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contact" => Ok(LinkedEntityType::Contact),
            "company" => Ok(LinkedEntityType::Company),
            "deal" => Ok(LinkedEntityType::Deal),
            "employee" => Ok(LinkedEntityType::Employee),
            "campaign" => Ok(LinkedEntityType::Campaign),
            _ => Err(format!("Unknown linked entity type: {}", s)),
        }
    }
}
