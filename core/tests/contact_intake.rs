//! Contact intake workflow tests.
//!
//! Covers lead resolution, routed/unrouted outcomes, and load accounting.

use leadflow_core::{
    error::CrmError,
    model::{AssignmentCreate, ContactCreate, OperatorCreate, SourceCreate},
    service::CrmService,
    types::{OperatorId, SourceId},
};

fn build(seed: u64) -> CrmService {
    let _ = env_logger::builder().is_test(true).try_init();
    CrmService::build_test(seed).expect("build test service")
}

fn operator(svc: &CrmService, name: &str, max_load: i64) -> OperatorId {
    svc.create_operator(OperatorCreate {
        name: name.into(),
        is_active: true,
        max_load: Some(max_load),
    })
    .unwrap()
    .id
}

fn source(svc: &CrmService, name: &str) -> SourceId {
    svc.create_source(SourceCreate { name: name.into() }).unwrap().id
}

fn assign(svc: &CrmService, operator_id: OperatorId, source_id: SourceId, weight: i64) {
    svc.create_assignment(AssignmentCreate {
        operator_id,
        source_id,
        weight: Some(weight),
    })
    .unwrap();
}

fn contact(svc: &mut CrmService, lead: &str, source_id: SourceId) -> leadflow_core::model::ContactResponse {
    svc.record_contact(ContactCreate {
        lead_external_id: lead.into(),
        source_id,
    })
    .unwrap()
}

/// A source with no weight mappings yields an unrouted contact, and the lead still exists.
#[test]
fn source_without_assignments_records_unrouted_contact() {
    let mut svc = build(1);
    let s = source(&svc, "landing-page");

    let resp = contact(&mut svc, "lead-42", s);

    assert_eq!(resp.operator_id, None);
    assert_eq!(resp.lead_external_id, "lead-42");
    assert_eq!(resp.source_id, s);
    let lead = svc.store.find_lead_by_external_id("lead-42").unwrap();
    assert_eq!(lead.map(|l| l.id), Some(resp.lead_id));
    assert_eq!(svc.store.unrouted_contact_count().unwrap(), 1);
}

/// A routed contact takes exactly one unit of the chosen operator's capacity.
#[test]
fn routed_contact_increments_operator_load() {
    let mut svc = build(2);
    let s = source(&svc, "referral");
    let op = operator(&svc, "alice", 5);
    assign(&svc, op, s, 1);

    let resp = contact(&mut svc, "lead-1", s);

    assert_eq!(resp.operator_id, Some(op));
    let alice = svc.store.get_operator(op).unwrap().unwrap();
    assert_eq!(alice.current_load, 1);
    assert_eq!(svc.store.contact_count_for_operator(op).unwrap(), 1);
}

/// Once the only operator is full, further contacts go unrouted and load stays at the ceiling.
#[test]
fn full_operator_stops_receiving_contacts() {
    let mut svc = build(3);
    let s = source(&svc, "campaign-a");
    let op = operator(&svc, "bob", 2);
    assign(&svc, op, s, 10);

    let routed: Vec<_> = (0..5)
        .map(|i| contact(&mut svc, &format!("lead-{i}"), s).operator_id)
        .collect();

    assert_eq!(routed, vec![Some(op), Some(op), None, None, None]);
    let bob = svc.store.get_operator(op).unwrap().unwrap();
    assert_eq!(bob.current_load, 2);
    assert_eq!(svc.store.contact_count_for_operator(op).unwrap(), 2);
}

/// Load never exceeds max_load and always equals the number of routed contacts.
#[test]
fn load_matches_routed_contacts_across_many_calls() {
    let mut svc = build(4);
    let s = source(&svc, "campaign-b");
    let ops: Vec<_> = [("a", 3, 5), ("b", 1, 2), ("c", 2, 4)]
        .iter()
        .map(|(name, weight, max)| {
            let id = operator(&svc, name, *max);
            assign(&svc, id, s, *weight);
            (id, *max)
        })
        .collect();

    for i in 0..20 {
        contact(&mut svc, &format!("lead-{i}"), s);
    }

    let mut routed_total = 0;
    for (id, max) in ops {
        let op = svc.store.get_operator(id).unwrap().unwrap();
        let routed = svc.store.contact_count_for_operator(id).unwrap();
        assert!(op.current_load <= max, "operator {id} overshot: {} > {max}", op.current_load);
        assert_eq!(op.current_load, routed);
        routed_total += routed;
    }
    // Total capacity is 11, so 11 routed and 9 unrouted.
    assert_eq!(routed_total, 11);
    assert_eq!(svc.store.unrouted_contact_count().unwrap(), 9);
}

/// Repeat contacts from the same external id reuse the lead.
#[test]
fn repeat_contacts_reuse_lead() {
    let mut svc = build(5);
    let s1 = source(&svc, "web");
    let s2 = source(&svc, "phone");

    let first = contact(&mut svc, "lead-7", s1);
    let second = contact(&mut svc, "lead-7", s2);

    assert_eq!(first.lead_id, second.lead_id);
    assert_ne!(first.id, second.id);
    assert_eq!(svc.store.lead_count_for_external_id("lead-7").unwrap(), 1);
    assert_eq!(svc.list_leads(0, None).unwrap().len(), 1);
}

/// Deactivating an operator removes them from routing without touching their load.
#[test]
fn deactivated_operator_is_skipped() {
    let mut svc = build(6);
    let s = source(&svc, "partner");
    let busy = operator(&svc, "carol", 10);
    let spare = operator(&svc, "dave", 10);
    assign(&svc, busy, s, 100);
    assign(&svc, spare, s, 1);

    contact(&mut svc, "warmup", s);
    let load_before = svc.store.get_operator(busy).unwrap().unwrap().current_load;

    svc.update_operator(
        busy,
        OperatorCreate {
            name: "carol".into(),
            is_active: false,
            max_load: Some(10),
        },
    )
    .unwrap();

    for i in 0..10 {
        assert_eq!(contact(&mut svc, &format!("lead-{i}"), s).operator_id, Some(spare));
    }
    let carol = svc.store.get_operator(busy).unwrap().unwrap();
    assert_eq!(carol.current_load, load_before);
}

/// Contacts against a source that does not exist are rejected, and no lead is created.
#[test]
fn unknown_source_is_not_found() {
    let mut svc = build(7);
    let err = svc
        .record_contact(ContactCreate {
            lead_external_id: "lead-x".into(),
            source_id: 999,
        })
        .unwrap_err();
    assert!(matches!(err, CrmError::NotFound { entity: "source", .. }), "got {err:?}");
    assert!(svc.store.find_lead_by_external_id("lead-x").unwrap().is_none());
}

/// Listing contacts returns the denormalized external id for each.
#[test]
fn list_contacts_carries_lead_external_id() {
    let mut svc = build(8);
    let s = source(&svc, "ads");
    contact(&mut svc, "ext-1", s);
    contact(&mut svc, "ext-2", s);
    contact(&mut svc, "ext-1", s);

    let listed = svc.list_contacts(0, None).unwrap();
    let ids: Vec<_> = listed.iter().map(|c| c.lead_external_id.as_str()).collect();
    assert_eq!(ids, vec!["ext-1", "ext-2", "ext-1"]);
    assert_eq!(listed[0].lead_id, listed[2].lead_id);

    let page = svc.list_contacts(1, Some(1)).unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].lead_external_id, "ext-2");
}

/// Two services with the same seed and the same inputs route identically.
#[test]
fn same_seed_routes_identically() {
    fn run(seed: u64) -> Vec<Option<OperatorId>> {
        let mut svc = build(seed);
        let s = source(&svc, "seeded");
        for (name, weight) in [("a", 1), ("b", 2), ("c", 3)] {
            let id = operator(&svc, name, 100);
            assign(&svc, id, s, weight);
        }
        (0..50)
            .map(|i| contact(&mut svc, &format!("lead-{i}"), s).operator_id)
            .collect()
    }
    assert_eq!(run(0xABCD), run(0xABCD));
}

/// Weights at the top of the i64 range still route instead of overflowing.
#[test]
fn extreme_weights_still_route() {
    let mut svc = build(9);
    let s = source(&svc, "firehose");
    let ops: Vec<_> = ["x", "y", "z"]
        .iter()
        .map(|name| {
            let id = operator(&svc, name, 10);
            assign(&svc, id, s, i64::MAX);
            id
        })
        .collect();

    for i in 0..6 {
        let resp = contact(&mut svc, &format!("lead-{i}"), s);
        let chosen = resp.operator_id.expect("contact should be routed");
        assert!(ops.contains(&chosen));
    }
    let total_load: i64 = ops
        .iter()
        .map(|id| svc.store.get_operator(*id).unwrap().unwrap().current_load)
        .sum();
    assert_eq!(total_load, 6);
}
