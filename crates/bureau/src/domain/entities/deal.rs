//! Deal - Opportunity moving through the sales pipeline

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{optional_key, require_name, Entity, Validate};
use crate::domain::config::DomainConfig;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{DealStage, FieldValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: Uuid,
    pub title: String,
    pub contact_id: Option<Uuid>,
    pub owner_id: Option<String>,
    pub stage: DealStage,
    pub amount: f64,
    pub currency: String,
    pub expected_close: Option<NaiveDate>,
    /// Set when the deal enters won or lost
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDeal {
    pub title: String,
    pub contact_id: Option<Uuid>,
    pub owner_id: Option<String>,
    /// Falls back to the configured default stage
    pub stage: Option<DealStage>,
    pub amount: f64,
    pub currency: String,
    pub expected_close: Option<NaiveDate>,
}

/// Stage changes go through [`Deal::move_to`]
#[derive(Debug, Clone, Default)]
pub struct DealPatch {
    pub title: Option<String>,
    pub contact_id: Option<Option<Uuid>>,
    pub owner_id: Option<Option<String>>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub expected_close: Option<Option<NaiveDate>>,
}

impl Deal {
    pub const BY_STAGE: &'static str = "stage";
    pub const BY_OWNER: &'static str = "owner";
    pub const BY_CONTACT: &'static str = "contact";

    /// Amount weighted by the stage's win probability
    pub fn weighted_amount(&self) -> f64 {
        self.amount * self.stage.probability()
    }

    /// Move to another pipeline column; closed deals stay closed
    pub fn move_to(&mut self, stage: DealStage, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.stage == stage {
            return Ok(());
        }
        if self.stage.is_closed() {
            return Err(DomainError::invalid_transition(
                "Deal",
                self.stage,
                stage,
                "deal is already closed",
            ));
        }
        self.stage = stage;
        if stage.is_closed() {
            self.closed_at = Some(now);
        }
        Ok(())
    }
}

fn validate_amount(amount: f64) -> Result<(), DomainError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(DomainError::validation("amount", "must be a non-negative amount"));
    }
    Ok(())
}

fn validate_currency(currency: &str) -> Result<(), DomainError> {
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(DomainError::validation("currency", "must be a 3-letter ISO code"));
    }
    Ok(())
}

impl Validate for NewDeal {
    fn validate(&self, config: &DomainConfig) -> Result<(), DomainError> {
        require_name("title", &self.title, config)?;
        validate_amount(self.amount)?;
        validate_currency(&self.currency)
    }
}

impl Validate for DealPatch {
    fn validate(&self, config: &DomainConfig) -> Result<(), DomainError> {
        if let Some(title) = &self.title {
            require_name("title", title, config)?;
        }
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        if let Some(currency) = &self.currency {
            validate_currency(currency)?;
        }
        Ok(())
    }
}

impl Entity for Deal {
    const ENTITY_TYPE: &'static str = "Deal";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "contact_id",
        "owner_id",
        "stage",
        "amount",
        "currency",
        "expected_close",
        "closed_at",
        "created_at",
        "updated_at",
    ];
    const INDEXES: &'static [&'static str] = &[Self::BY_STAGE, Self::BY_OWNER, Self::BY_CONTACT];

    type Draft = NewDeal;
    type Patch = DealPatch;

    fn from_draft(id: Uuid, now: DateTime<Utc>, draft: NewDeal) -> Self {
        let stage = draft.stage.unwrap_or_default();
        Self {
            id,
            title: draft.title.trim().to_string(),
            contact_id: draft.contact_id,
            owner_id: draft.owner_id,
            stage,
            amount: draft.amount,
            currency: draft.currency.to_uppercase(),
            expected_close: draft.expected_close,
            closed_at: stage.is_closed().then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: DealPatch) {
        if let Some(v) = patch.title {
            self.title = v.trim().to_string();
        }
        if let Some(v) = patch.contact_id {
            self.contact_id = v;
        }
        if let Some(v) = patch.owner_id {
            self.owner_id = v;
        }
        if let Some(v) = patch.amount {
            self.amount = v;
        }
        if let Some(v) = patch.currency {
            self.currency = v.to_uppercase();
        }
        if let Some(v) = patch.expected_close {
            self.expected_close = v;
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
            "title" => self.title.as_str().into(),
            "contact_id" => self.contact_id.into(),
            "owner_id" => self.owner_id.clone().into(),
            "stage" => self.stage.to_string().into(),
            "amount" => self.amount.into(),
            "currency" => self.currency.as_str().into(),
            "expected_close" => self.expected_close.into(),
            "closed_at" => self.closed_at.into(),
            "created_at" => self.created_at.into(),
            "updated_at" => self.updated_at.into(),
            _ => return None,
        })
    }

    fn index_keys(&self, index: &str) -> Vec<String> {
        match index {
            Self::BY_STAGE => vec![self.stage.to_string()],
            Self::BY_OWNER => self.owner_id.iter().cloned().collect(),
            Self::BY_CONTACT => vec![optional_key(self.contact_id)],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_deals_cannot_reopen() {
        let now = Utc::now();
        let mut deal = Deal::from_draft(
            Uuid::from_u128(1),
            now,
            NewDeal {
                title: "ACME renewal".into(),
                contact_id: None,
                owner_id: None,
                stage: None,
                amount: 12_000.0,
                currency: "eur".into(),
                expected_close: None,
            },
        );
        assert_eq!(deal.stage, DealStage::Lead);
        assert_eq!(deal.currency, "EUR");

        deal.move_to(DealStage::Won, now).unwrap();
        assert_eq!(deal.closed_at, Some(now));
        assert!((deal.weighted_amount() - 12_000.0).abs() < f64::EPSILON);

        let err = deal.move_to(DealStage::Negotiation, now).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
        assert_eq!(deal.stage, DealStage::Won);
    }
}
