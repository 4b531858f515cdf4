//! Shared primitive types used across the CRM.

/// Store-assigned identity of an operator row.
pub type OperatorId = i64;

/// Store-assigned identity of an acquisition source.
pub type SourceId = i64;

/// Store-assigned identity of an operator/source weight mapping.
pub type AssignmentId = i64;

/// Store-assigned identity of a lead. Distinct from the caller's external id.
pub type LeadId = i64;

/// Store-assigned identity of a contact event.
pub type ContactId = i64;
