//! Records and request/response shapes for the CRM.
//!
//! Row types mirror the tables in migrations/001_foundation.sql.
//! `*Create` types are caller input; everything else is store output.

use crate::types::{AssignmentId, ContactId, LeadId, OperatorId, SourceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Operator ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub id: OperatorId,
    pub name: String,
    pub is_active: bool,
    pub max_load: i64,
    pub current_load: i64,
}

impl Operator {
    /// An operator can take a new contact only while active and under its ceiling.
    pub fn has_capacity(&self) -> bool {
        self.is_active && self.current_load < self.max_load
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorCreate {
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Falls back to `CrmConfig::default_max_load` when absent.
    #[serde(default)]
    pub max_load: Option<i64>,
}

fn default_active() -> bool {
    true
}

// ── Source ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: SourceId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCreate {
    pub name: String,
}

// ── Assignment (weight mapping) ───────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub operator_id: OperatorId,
    pub source_id: SourceId,
    pub weight: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentCreate {
    pub operator_id: OperatorId,
    pub source_id: SourceId,
    /// Falls back to `CrmConfig::default_weight` when absent.
    #[serde(default)]
    pub weight: Option<i64>,
}

/// A weight mapping joined with its operator's state at read time.
/// This is what the assignment engine chooses from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentSnapshot {
    pub assignment_id: AssignmentId,
    pub source_id: SourceId,
    pub weight: i64,
    pub operator: Operator,
}

// ── Lead ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub external_id: String,
    pub created_at: DateTime<Utc>,
}

// ── Contact ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub lead_id: LeadId,
    pub source_id: SourceId,
    /// None when no eligible operator was found.
    pub operator_id: Option<OperatorId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactCreate {
    pub lead_external_id: String,
    pub source_id: SourceId,
}

/// Contact fields plus the lead's external id, as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactResponse {
    pub id: ContactId,
    pub lead_id: LeadId,
    pub source_id: SourceId,
    pub operator_id: Option<OperatorId>,
    pub created_at: DateTime<Utc>,
    pub lead_external_id: String,
}

impl ContactResponse {
    pub fn from_contact(contact: Contact, lead_external_id: String) -> Self {
        Self {
            id: contact.id,
            lead_id: contact.lead_id,
            source_id: contact.source_id,
            operator_id: contact.operator_id,
            created_at: contact.created_at,
            lead_external_id,
        }
    }

    pub fn is_routed(&self) -> bool {
        self.operator_id.is_some()
    }
}
