//! Contact intake workflow.
//!
//! ORDER (per inbound contact):
//!   1. Resolve the lead by external id, creating it on first sight.
//!   2. Snapshot the source's weight mappings and ask the engine for an operator.
//!   3. Under the write lock: take one unit of that operator's capacity with a
//!      conditional update, then insert the contact.
//!   4. Return the contact with the lead's external id attached.
//!
//! RULE: `current_load` changes only inside step 3, and only together with
//! a contact row that names the operator. If the conditional update loses a
//! race for the last slot, that operator is dropped from the candidate list
//! and the engine picks again. An empty list records an unrouted contact.

use crate::{
    assignment_engine::select_operator,
    error::{CrmError, CrmResult},
    model::{Contact, ContactResponse, Lead},
    rng::RoutingRng,
    store::CrmStore,
    types::{OperatorId, SourceId},
};

enum Attempt {
    Recorded(Contact),
    CapacityLost(OperatorId),
}

pub fn record_contact(
    store: &CrmStore,
    rng: &mut RoutingRng,
    lead_external_id: &str,
    source_id: SourceId,
) -> CrmResult<ContactResponse> {
    if store.get_source(source_id)?.is_none() {
        return Err(CrmError::not_found("source", source_id));
    }

    let lead = resolve_lead(store, lead_external_id)?;
    let mut candidates = store.list_assignments_for_source(source_id)?;

    let contact = loop {
        let chosen = select_operator(source_id, &candidates, rng).map(|op| op.id);

        let attempt = store.with_write_lock(|s| {
            if let Some(operator_id) = chosen {
                if !s.increment_operator_load_if_under_capacity(operator_id)? {
                    return Ok(Attempt::CapacityLost(operator_id));
                }
            }
            s.create_contact(lead.id, source_id, chosen)
                .map(Attempt::Recorded)
        })?;

        match attempt {
            Attempt::Recorded(contact) => break contact,
            Attempt::CapacityLost(operator_id) => {
                log::debug!(
                    "operator {operator_id} filled up before contact for lead {} could be routed; reselecting",
                    lead.external_id
                );
                candidates.retain(|a| a.operator.id != operator_id);
            }
        }
    };

    match contact.operator_id {
        Some(operator_id) => log::debug!(
            "contact {} for lead {} from source {source_id} routed to operator {operator_id}",
            contact.id,
            lead.external_id
        ),
        None => log::debug!(
            "contact {} for lead {} from source {source_id} has no eligible operator",
            contact.id,
            lead.external_id
        ),
    }

    Ok(ContactResponse::from_contact(contact, lead.external_id))
}

/// Find the lead, or create it. A concurrent caller may insert the same
/// external id between our read and our insert; the UNIQUE constraint
/// rejects the second insert and we re-read the winner's row.
pub fn resolve_lead(store: &CrmStore, external_id: &str) -> CrmResult<Lead> {
    if let Some(lead) = store.find_lead_by_external_id(external_id)? {
        return Ok(lead);
    }
    match store.create_lead(external_id) {
        Ok(lead) => {
            log::info!("created lead {} for external id {external_id}", lead.id);
            Ok(lead)
        }
        Err(e) if e.is_unique_violation() => store
            .find_lead_by_external_id(external_id)?
            .ok_or_else(|| CrmError::not_found("lead", external_id)),
        Err(e) => Err(e),
    }
}
