//! CRM service — the create/read/update surface plus contact intake.
//!
//! Owns one store connection and one routing RNG. Input validation and
//! NotFound checks live here; SQL stays in the store and routing stays
//! in the intake workflow.

use crate::{
    config::CrmConfig,
    error::{CrmError, CrmResult},
    intake,
    model::{
        Assignment, AssignmentCreate, ContactCreate, ContactResponse, Lead, Operator,
        OperatorCreate, Source, SourceCreate,
    },
    rng::RoutingRng,
    store::CrmStore,
    types::OperatorId,
};

pub struct CrmService {
    pub config: CrmConfig,
    pub store: CrmStore,
    rng: RoutingRng,
}

impl CrmService {
    pub fn new(config: CrmConfig, store: CrmStore) -> Self {
        let rng = RoutingRng::from_optional_seed(config.rng_seed);
        Self { config, store, rng }
    }

    /// Open the configured database, apply migrations, and wire the service.
    pub fn build(config: CrmConfig) -> CrmResult<Self> {
        let store = if config.db_path == ":memory:" {
            CrmStore::in_memory()?
        } else {
            CrmStore::open_with_timeout(&config.db_path, config.busy_timeout_ms)?
        };
        store.migrate()?;
        Ok(Self::new(config, store))
    }

    /// In-memory service with a pinned seed.
    pub fn build_test(seed: u64) -> CrmResult<Self> {
        Self::build(CrmConfig::default_test(seed))
    }

    fn page(&self, limit: Option<u64>) -> u64 {
        limit.unwrap_or(self.config.page_limit)
    }

    // ── Operators ─────────────────────────────────────────────────

    pub fn create_operator(&self, req: OperatorCreate) -> CrmResult<Operator> {
        let max_load = self.validated_operator(&req)?;
        let operator = self.store.insert_operator(&req.name, req.is_active, max_load)?;
        log::info!("created operator {} ({})", operator.id, operator.name);
        Ok(operator)
    }

    pub fn list_operators(&self, skip: u64, limit: Option<u64>) -> CrmResult<Vec<Operator>> {
        self.store.list_operators(skip, self.page(limit))
    }

    pub fn update_operator(&self, operator_id: OperatorId, req: OperatorCreate) -> CrmResult<Operator> {
        let max_load = self.validated_operator(&req)?;
        if !self
            .store
            .update_operator(operator_id, &req.name, req.is_active, max_load)?
        {
            return Err(CrmError::not_found("operator", operator_id));
        }
        self.store
            .get_operator(operator_id)?
            .ok_or_else(|| CrmError::not_found("operator", operator_id))
    }

    fn validated_operator(&self, req: &OperatorCreate) -> CrmResult<i64> {
        if req.name.trim().is_empty() {
            return Err(CrmError::InvalidInput {
                field: "name",
                reason: "must not be empty".into(),
            });
        }
        let max_load = req.max_load.unwrap_or(self.config.default_max_load);
        if max_load < 0 {
            return Err(CrmError::InvalidInput {
                field: "max_load",
                reason: format!("must be >= 0, got {max_load}"),
            });
        }
        Ok(max_load)
    }

    // ── Sources ───────────────────────────────────────────────────

    pub fn create_source(&self, req: SourceCreate) -> CrmResult<Source> {
        if req.name.trim().is_empty() {
            return Err(CrmError::InvalidInput {
                field: "name",
                reason: "must not be empty".into(),
            });
        }
        match self.store.insert_source(&req.name) {
            Ok(source) => {
                log::info!("created source {} ({})", source.id, source.name);
                Ok(source)
            }
            Err(e) if e.is_unique_violation() => Err(CrmError::DuplicateSource { name: req.name }),
            Err(e) => Err(e),
        }
    }

    pub fn list_sources(&self, skip: u64, limit: Option<u64>) -> CrmResult<Vec<Source>> {
        self.store.list_sources(skip, self.page(limit))
    }

    // ── Assignments ───────────────────────────────────────────────

    pub fn create_assignment(&self, req: AssignmentCreate) -> CrmResult<Assignment> {
        if self.store.get_operator(req.operator_id)?.is_none() {
            return Err(CrmError::not_found("operator", req.operator_id));
        }
        if self.store.get_source(req.source_id)?.is_none() {
            return Err(CrmError::not_found("source", req.source_id));
        }
        let weight = req.weight.unwrap_or(self.config.default_weight);
        if weight <= 0 {
            log::warn!(
                "operator {} on source {} has non-positive weight {weight}; it will not be picked while others are eligible",
                req.operator_id,
                req.source_id
            );
        }
        self.store.insert_assignment(req.operator_id, req.source_id, weight)
    }

    pub fn list_assignments(&self, skip: u64, limit: Option<u64>) -> CrmResult<Vec<Assignment>> {
        self.store.list_assignments(skip, self.page(limit))
    }

    // ── Leads & contacts ──────────────────────────────────────────

    pub fn list_leads(&self, skip: u64, limit: Option<u64>) -> CrmResult<Vec<Lead>> {
        self.store.list_leads(skip, self.page(limit))
    }

    pub fn record_contact(&mut self, req: ContactCreate) -> CrmResult<ContactResponse> {
        let response =
            intake::record_contact(&self.store, &mut self.rng, &req.lead_external_id, req.source_id)?;
        if !response.is_routed() {
            log::warn!(
                "contact {} for lead {} left unrouted: source {} has no eligible operator",
                response.id,
                response.lead_external_id,
                response.source_id
            );
        }
        Ok(response)
    }

    pub fn list_contacts(&self, skip: u64, limit: Option<u64>) -> CrmResult<Vec<ContactResponse>> {
        self.store.list_contacts(skip, self.page(limit))
    }
}
