//! Marketing Application Service (Use Case)
//!
//! Contacts and the segments that group them. A segment's audience is the
//! contacts matching its filter followed by its hand-picked members.

use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use bureau::domain::services::relevance::rank;
use bureau::domain::{ContactPatch, NewContact, NewSegment, SegmentPatch};
use bureau::{
    Contact, Deal, DomainConfig, DomainError, Filter, LinkedEntityType, Repo, Scored, Segment,
    Validate,
};

use super::DocumentService;

/// Application service for Contact and Segment operations
pub struct MarketingService {
    contacts: Repo<Contact>,
    segments: Repo<Segment>,
    deals: Repo<Deal>,
    documents: Arc<DocumentService>,
    config: Arc<DomainConfig>,
}

impl MarketingService {
    pub fn new(
        contacts: Repo<Contact>,
        segments: Repo<Segment>,
        deals: Repo<Deal>,
        documents: Arc<DocumentService>,
        config: Arc<DomainConfig>,
    ) -> Self {
        Self {
            contacts,
            segments,
            deals,
            documents,
            config,
        }
    }

    // ============================================
    // Contacts
    // ============================================

    pub async fn list_contacts(&self) -> Result<Vec<Contact>, DomainError> {
        self.contacts.find_all().await
    }

    pub async fn find_contacts(&self, filter: &Filter) -> Result<Vec<Contact>, DomainError> {
        self.contacts.find_where(filter).await
    }

    pub async fn get_contact(&self, id: Uuid) -> Result<Option<Contact>, DomainError> {
        self.contacts.find_by_id(id).await
    }

    pub async fn contacts_by_tag(&self, tag: &str) -> Result<Vec<Contact>, DomainError> {
        self.contacts
            .find_by_index(Contact::BY_TAG, &tag.to_lowercase())
            .await
    }

    pub async fn contacts_by_city(&self, city: &str) -> Result<Vec<Contact>, DomainError> {
        self.contacts
            .find_by_index(Contact::BY_CITY, &city.to_lowercase())
            .await
    }

    /// Rank contacts by name, tags and company
    pub async fn search_contacts(
        &self,
        query: &str,
        filter: &Filter,
    ) -> Result<Vec<Scored<Contact>>, DomainError> {
        Ok(rank(self.contacts.find_where(filter).await?, query))
    }

    pub async fn create_contact(&self, draft: NewContact) -> Result<Contact, DomainError> {
        draft.validate(&self.config)?;
        let saved = self.contacts.create(draft).await?;
        tracing::info!("Created Contact: {} ({})", saved.full_name(), saved.id);
        Ok(saved)
    }

    pub async fn update_contact(&self, id: Uuid, patch: ContactPatch) -> Result<Contact, DomainError> {
        patch.validate(&self.config)?;
        self.contacts.update(id, patch).await
    }

    /// Delete a Contact
    ///
    /// Open deals keep pointing at their contact, so a contact with deals
    /// cannot be deleted. Segment memberships and document links are
    /// dropped with it.
    pub async fn delete_contact(&self, id: Uuid) -> Result<bool, DomainError> {
        if self.contacts.find_by_id(id).await?.is_none() {
            return Ok(false);
        }

        let deals = self
            .deals
            .find_by_index(Deal::BY_CONTACT, &id.to_string())
            .await?;
        if !deals.is_empty() {
            return Err(DomainError::dependents_exist("Contact", id, deals.len()));
        }

        let memberships = self
            .segments
            .find_by_index(Segment::BY_MEMBER, &id.to_string())
            .await?;
        for segment in &memberships {
            self.segments
                .modify(
                    segment.id,
                    Box::new(move |segment| {
                        segment.remove_member(id);
                        Ok(())
                    }),
                )
                .await?;
        }
        let unlinked = self
            .documents
            .unlink_target(LinkedEntityType::Contact, &id.to_string())
            .await?;

        let deleted = self.contacts.delete(id).await?;
        if deleted {
            tracing::info!(
                "Deleted Contact: {} (removed from {} segment(s), {} document link(s))",
                id,
                memberships.len(),
                unlinked
            );
        }
        Ok(deleted)
    }

    // ============================================
    // Segments
    // ============================================

    pub async fn list_segments(&self) -> Result<Vec<Segment>, DomainError> {
        self.segments.find_all().await
    }

    pub async fn get_segment(&self, id: Uuid) -> Result<Option<Segment>, DomainError> {
        self.segments.find_by_id(id).await
    }

    async fn require_segment(&self, id: Uuid) -> Result<Segment, DomainError> {
        self.segments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Segment", id))
    }

    /// Segments listing `contact_id` as a static member
    pub async fn segments_of(&self, contact_id: Uuid) -> Result<Vec<Segment>, DomainError> {
        self.segments
            .find_by_index(Segment::BY_MEMBER, &contact_id.to_string())
            .await
    }

    pub async fn create_segment(&self, draft: NewSegment) -> Result<Segment, DomainError> {
        draft.validate(&self.config)?;
        let saved = self.segments.create(draft).await?;
        tracing::info!(
            "Created Segment: {} ({}) with {} clause(s)",
            saved.name,
            saved.id,
            saved.filter.clauses.len()
        );
        Ok(saved)
    }

    pub async fn update_segment(&self, id: Uuid, patch: SegmentPatch) -> Result<Segment, DomainError> {
        patch.validate(&self.config)?;
        self.segments.update(id, patch).await
    }

    pub async fn delete_segment(&self, id: Uuid) -> Result<bool, DomainError> {
        let deleted = self.segments.delete(id).await?;
        if deleted {
            tracing::info!("Deleted Segment: {}", id);
        }
        Ok(deleted)
    }

    pub async fn add_member(&self, segment_id: Uuid, contact_id: Uuid) -> Result<Segment, DomainError> {
        if self.contacts.find_by_id(contact_id).await?.is_none() {
            return Err(DomainError::not_found("Contact", contact_id));
        }
        self.segments
            .modify(
                segment_id,
                Box::new(move |segment| segment.add_member(contact_id)),
            )
            .await
    }

    /// Remove a static member; `false` when it was not a member
    pub async fn remove_member(&self, segment_id: Uuid, contact_id: Uuid) -> Result<bool, DomainError> {
        let mut absent = false;
        let removed = self
            .segments
            .modify(
                segment_id,
                Box::new(|segment| {
                    if segment.remove_member(contact_id) {
                        return Ok(());
                    }
                    absent = true;
                    Err(DomainError::not_found("Contact", contact_id))
                }),
            )
            .await;
        match removed {
            Ok(_) => Ok(true),
            Err(_) if absent => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Resolve a segment's audience
    ///
    /// Filter matches come first in insertion order, then static members not
    /// already included, in the order they were added. A segment without
    /// clauses is made of its static members only.
    pub async fn segment_contacts(&self, segment_id: Uuid) -> Result<Vec<Contact>, DomainError> {
        let segment = self.require_segment(segment_id).await?;
        let mut audience = if segment.filter.is_empty() {
            Vec::new()
        } else {
            self.contacts.find_where(&segment.filter).await?
        };

        let mut seen: HashSet<Uuid> = audience.iter().map(|c| c.id).collect();
        for id in &segment.static_members {
            if seen.insert(*id) {
                if let Some(contact) = self.contacts.find_by_id(*id).await? {
                    audience.push(contact);
                }
            }
        }
        Ok(audience)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::Fixture;
    use bureau::domain::NewDeal;
    use bureau::{FilterClause, FilterOperator};

    fn contact(first: &str, city: &str, score: u32, tags: &[&str]) -> NewContact {
        NewContact {
            first_name: first.into(),
            last_name: "Bernard".into(),
            email: format!("{}@client.test", first.to_lowercase()),
            phone: None,
            company: Some("Acme".into()),
            city: Some(city.into()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            lead_score: score,
            subscribed: true,
        }
    }

    #[tokio::test]
    async fn test_segment_is_filter_plus_static_members() {
        let fx = Fixture::new();
        let marketing = fx.marketing();
        let paula = marketing.create_contact(contact("Paula", "Paris", 80, &[])).await.unwrap();
        let lyon = marketing.create_contact(contact("Louis", "Lyon", 90, &[])).await.unwrap();
        let pierre = marketing.create_contact(contact("Pierre", "Paris", 20, &[])).await.unwrap();

        let filter = Filter::new()
            .and(FilterClause::equals("city", "Paris"))
            .and(FilterClause::new("lead_score", FilterOperator::GreaterThan, 50.0));
        let segment = marketing
            .create_segment(NewSegment {
                name: "Hot Paris leads".into(),
                description: None,
                filter: filter.clone(),
            })
            .await
            .unwrap();
        marketing.add_member(segment.id, lyon.id).await.unwrap();
        marketing.add_member(segment.id, paula.id).await.unwrap();

        let audience = marketing.segment_contacts(segment.id).await.unwrap();
        let mut expected = marketing.find_contacts(&filter).await.unwrap();
        expected.push(lyon.clone());
        assert_eq!(audience, expected);
        assert_eq!(audience, vec![paula.clone(), lyon.clone()]);
        assert!(!audience.contains(&pierre));

        assert!(matches!(
            marketing.add_member(segment.id, lyon.id).await,
            Err(DomainError::DuplicateMembership { .. })
        ));
        assert!(marketing.remove_member(segment.id, lyon.id).await.unwrap());
        assert!(!marketing.remove_member(segment.id, lyon.id).await.unwrap());
        assert!(matches!(
            marketing.remove_member(Uuid::from_u128(4242), lyon.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_contact_delete_cleans_memberships_and_respects_deals() {
        let fx = Fixture::new();
        let marketing = fx.marketing();
        let ana = marketing.create_contact(contact("Ana", "Nantes", 10, &["vip"])).await.unwrap();
        let segment = marketing
            .create_segment(NewSegment {
                name: "VIP".into(),
                description: None,
                filter: Filter::new(),
            })
            .await
            .unwrap();
        marketing.add_member(segment.id, ana.id).await.unwrap();
        let link = fx
            .link_document(LinkedEntityType::Contact, &ana.id.to_string())
            .await;
        let deal = fx
            .pipeline()
            .create(NewDeal {
                title: "Ana upsell".into(),
                contact_id: Some(ana.id),
                owner_id: None,
                stage: None,
                amount: 900.0,
                currency: "EUR".into(),
                expected_close: None,
            })
            .await
            .unwrap();

        assert!(matches!(
            marketing.delete_contact(ana.id).await,
            Err(DomainError::DependentsExist { .. })
        ));
        assert_eq!(fx.links.find_all().await.unwrap(), vec![link]);
        fx.pipeline().delete(deal.id).await.unwrap();

        assert!(marketing.delete_contact(ana.id).await.unwrap());
        assert!(fx
            .documents()
            .links_for_target(LinkedEntityType::Contact, &ana.id.to_string())
            .await
            .unwrap()
            .is_empty());
        assert!(marketing.segments_of(ana.id).await.unwrap().is_empty());
        let segment = marketing.get_segment(segment.id).await.unwrap().unwrap();
        assert!(segment.static_members.is_empty());
    }

    #[tokio::test]
    async fn test_contact_search_and_city_index() {
        let fx = Fixture::new();
        let marketing = fx.marketing();
        marketing.create_contact(contact("Paula", "Paris", 80, &["newsletter"])).await.unwrap();
        marketing.create_contact(contact("Louis", "Lyon", 90, &[])).await.unwrap();

        let hits = marketing.search_contacts("paula", &Filter::new()).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].score, Some(75));

        let hits = marketing.search_contacts("newsletter", &Filter::new()).await.unwrap();
        assert_eq!(hits[0].score, Some(25));

        assert_eq!(marketing.contacts_by_city("PARIS").await.unwrap().len(), 1);
    }
}
