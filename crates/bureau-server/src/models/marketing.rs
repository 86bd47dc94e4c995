//! Marketing DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use bureau::domain::{ContactPatch, NewContact, NewSegment, SegmentPatch};
use bureau::{Contact, FilterClause, Scored, Segment};

use super::common::double_option;

// ============================================
// Contacts
// ============================================

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub tags: Vec<String>,
    pub lead_score: u32,
    pub subscribed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Contact> for ContactResponse {
    fn from(c: Contact) -> Self {
        Self {
            id: c.id,
            first_name: c.first_name,
            last_name: c.last_name,
            email: c.email,
            phone: c.phone,
            company: c.company,
            city: c.city,
            tags: c.tags,
            lead_score: c.lead_score,
            subscribed: c.subscribed,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateContactRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// 0..=100
    #[serde(default)]
    pub lead_score: u32,
    #[serde(default)]
    pub subscribed: bool,
}

impl From<CreateContactRequest> for NewContact {
    fn from(r: CreateContactRequest) -> Self {
        NewContact {
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            phone: r.phone,
            company: r.company,
            city: r.city,
            tags: r.tags,
            lead_score: r.lead_score,
            subscribed: r.subscribed,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateContactRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub company: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub city: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub lead_score: Option<u32>,
    pub subscribed: Option<bool>,
}

impl From<UpdateContactRequest> for ContactPatch {
    fn from(r: UpdateContactRequest) -> Self {
        ContactPatch {
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            phone: r.phone,
            company: r.company,
            city: r.city,
            tags: r.tags,
            lead_score: r.lead_score,
            subscribed: r.subscribed,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContactListParams {
    pub tag: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactSearchHit {
    pub contact: ContactResponse,
    pub score: Option<u32>,
}

impl From<Scored<Contact>> for ContactSearchHit {
    fn from(s: Scored<Contact>) -> Self {
        Self {
            contact: s.item.into(),
            score: s.score,
        }
    }
}

// ============================================
// Segments
// ============================================

#[derive(Debug, Serialize, ToSchema)]
pub struct SegmentResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = Vec<Object>)]
    pub filter: Vec<FilterClause>,
    pub static_members: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Segment> for SegmentResponse {
    fn from(s: Segment) -> Self {
        Self {
            id: s.id,
            name: s.name,
            description: s.description,
            filter: s.filter.clauses,
            static_members: s.static_members,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSegmentRequest {
    pub name: String,
    pub description: Option<String>,
    /// Contact filter; empty means static members only
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub filter: Vec<FilterClause>,
}

impl From<CreateSegmentRequest> for NewSegment {
    fn from(r: CreateSegmentRequest) -> Self {
        NewSegment {
            name: r.name,
            description: r.description,
            filter: r.filter.into(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSegmentRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub filter: Option<Vec<FilterClause>>,
}

impl From<UpdateSegmentRequest> for SegmentPatch {
    fn from(r: UpdateSegmentRequest) -> Self {
        SegmentPatch {
            name: r.name,
            description: r.description,
            filter: r.filter.map(Into::into),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddMemberRequest {
    pub contact_id: Uuid,
}
