//! Pipeline Application Service (Use Case)
//!
//! Deals and the per-stage view of the sales pipeline.

use std::sync::Arc;
use uuid::Uuid;

use bureau::domain::{optional_key, DealPatch, NewDeal};
use bureau::{
    Clock, Contact, Deal, DealStage, DomainConfig, DomainError, Filter, LinkedEntityType, Repo,
    Validate,
};

use super::DocumentService;

/// Totals of one pipeline column
#[derive(Debug, Clone, PartialEq)]
pub struct StageTotals {
    pub stage: DealStage,
    pub count: usize,
    pub total_amount: f64,
    /// Sum of amounts weighted by the stage's win probability
    pub weighted_amount: f64,
}

/// Application service for Deal operations
pub struct PipelineService {
    deals: Repo<Deal>,
    contacts: Repo<Contact>,
    documents: Arc<DocumentService>,
    clock: Arc<dyn Clock>,
    config: Arc<DomainConfig>,
}

impl PipelineService {
    pub fn new(
        deals: Repo<Deal>,
        contacts: Repo<Contact>,
        documents: Arc<DocumentService>,
        clock: Arc<dyn Clock>,
        config: Arc<DomainConfig>,
    ) -> Self {
        Self {
            deals,
            contacts,
            documents,
            clock,
            config,
        }
    }

    /// Get all Deals
    pub async fn list_all(&self) -> Result<Vec<Deal>, DomainError> {
        self.deals.find_all().await
    }

    pub async fn find(&self, filter: &Filter) -> Result<Vec<Deal>, DomainError> {
        self.deals.find_where(filter).await
    }

    /// Get a Deal by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Deal>, DomainError> {
        self.deals.find_by_id(id).await
    }

    pub async fn list_by_stage(&self, stage: DealStage) -> Result<Vec<Deal>, DomainError> {
        self.deals
            .find_by_index(Deal::BY_STAGE, &stage.to_string())
            .await
    }

    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Deal>, DomainError> {
        self.deals.find_by_index(Deal::BY_OWNER, owner_id).await
    }

    pub async fn list_for_contact(&self, contact_id: Uuid) -> Result<Vec<Deal>, DomainError> {
        self.deals
            .find_by_index(Deal::BY_CONTACT, &optional_key(Some(contact_id)))
            .await
    }

    async fn ensure_contact(&self, contact_id: Uuid) -> Result<(), DomainError> {
        match self.contacts.find_by_id(contact_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Contact", contact_id)),
        }
    }

    /// Create a new Deal; stage defaults to the configured one
    pub async fn create(&self, mut draft: NewDeal) -> Result<Deal, DomainError> {
        draft.validate(&self.config)?;
        if let Some(contact_id) = draft.contact_id {
            self.ensure_contact(contact_id).await?;
        }
        draft.stage = draft.stage.or(Some(self.config.default_deal_stage));

        let saved = self.deals.create(draft).await?;
        tracing::info!(
            "Created Deal: {} ({}) - {} {:.2} {}",
            saved.title,
            saved.id,
            saved.stage,
            saved.amount,
            saved.currency
        );
        Ok(saved)
    }

    pub async fn update(&self, id: Uuid, patch: DealPatch) -> Result<Deal, DomainError> {
        patch.validate(&self.config)?;
        if let Some(Some(contact_id)) = patch.contact_id {
            self.ensure_contact(contact_id).await?;
        }
        self.deals.update(id, patch).await
    }

    /// Move a Deal to another stage; won and lost deals stay closed
    pub async fn move_stage(&self, id: Uuid, stage: DealStage) -> Result<Deal, DomainError> {
        let current = self
            .deals
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Deal", id))?;
        if current.stage == stage {
            return Ok(current);
        }

        let now = self.clock.now();
        let mut from = current.stage;
        let saved = self
            .deals
            .modify(
                id,
                Box::new(|deal| {
                    from = deal.stage;
                    deal.move_to(stage, now)
                }),
            )
            .await?;
        tracing::info!("Deal {} moved: {} -> {}", id, from, stage);
        Ok(saved)
    }

    /// Delete a Deal along with the document links pointing at it
    pub async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        if self.deals.find_by_id(id).await?.is_none() {
            return Ok(false);
        }
        let unlinked = self
            .documents
            .unlink_target(LinkedEntityType::Deal, &id.to_string())
            .await?;

        let deleted = self.deals.delete(id).await?;
        if deleted {
            tracing::info!("Deleted Deal: {} ({} document link(s))", id, unlinked);
        }
        Ok(deleted)
    }

    /// One entry per stage, in pipeline order, including empty stages
    pub async fn summary(&self) -> Result<Vec<StageTotals>, DomainError> {
        let mut totals = Vec::with_capacity(DealStage::ALL.len());
        for stage in DealStage::ALL {
            let deals = self.list_by_stage(stage).await?;
            totals.push(StageTotals {
                stage,
                count: deals.len(),
                total_amount: deals.iter().map(|d| d.amount).sum(),
                weighted_amount: deals.iter().map(Deal::weighted_amount).sum(),
            });
        }
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::Fixture;

    fn deal(title: &str, amount: f64, stage: Option<DealStage>) -> NewDeal {
        NewDeal {
            title: title.into(),
            contact_id: None,
            owner_id: Some("sam".into()),
            stage,
            amount,
            currency: "EUR".into(),
            expected_close: None,
        }
    }

    #[tokio::test]
    async fn test_summary_totals_match_deal_amounts() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline();
        pipeline.create(deal("A", 1_000.0, None)).await.unwrap();
        pipeline.create(deal("B", 2_500.0, None)).await.unwrap();
        pipeline
            .create(deal("C", 4_000.0, Some(DealStage::Proposal)))
            .await
            .unwrap();

        let summary = pipeline.summary().await.unwrap();
        assert_eq!(summary.len(), DealStage::ALL.len());
        let lead = &summary[0];
        assert_eq!(lead.stage, DealStage::Lead);
        assert_eq!(lead.count, 2);
        assert!((lead.total_amount - 3_500.0).abs() < 1e-9);
        assert!((lead.weighted_amount - 350.0).abs() < 1e-9);

        let proposal = summary.iter().find(|s| s.stage == DealStage::Proposal).unwrap();
        assert!((proposal.total_amount - 4_000.0).abs() < 1e-9);
        let all: f64 = summary.iter().map(|s| s.total_amount).sum();
        assert!((all - 7_500.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_stage_moves_update_the_stage_index() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline();
        let d = pipeline.create(deal("Renewal", 800.0, None)).await.unwrap();

        let won = pipeline.move_stage(d.id, DealStage::Won).await.unwrap();
        assert_eq!(won.closed_at, Some(fx.clock_now()));
        assert!(pipeline.list_by_stage(DealStage::Lead).await.unwrap().is_empty());
        assert_eq!(pipeline.list_by_stage(DealStage::Won).await.unwrap().len(), 1);

        let err = pipeline.move_stage(d.id, DealStage::Lead).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
        assert_eq!(pipeline.list_by_owner("sam").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_contact_is_not_found() {
        let fx = Fixture::new();
        let mut draft = deal("Ghost", 1.0, None);
        draft.contact_id = Some(Uuid::from_u128(321));
        assert!(matches!(
            fx.pipeline().create(draft).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_document_links_to_the_deal() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline();
        let d = pipeline.create(deal("Renewal", 800.0, None)).await.unwrap();
        fx.link_document(LinkedEntityType::Deal, &d.id.to_string()).await;
        let unrelated = fx.link_document(LinkedEntityType::Deal, "deal-42").await;

        assert!(pipeline.delete(d.id).await.unwrap());
        assert!(!pipeline.delete(d.id).await.unwrap());
        assert_eq!(fx.links.find_all().await.unwrap(), vec![unrelated]);
    }
}
