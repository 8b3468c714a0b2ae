use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use gconst_cbor::Hash;
use gconst_types::SchemaIndex;
use tracing::debug;

use crate::config::EngineConfig;
use crate::plan::{FieldPlan, PlanError};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PlanKey {
    donor: Hash,
    /// Definitions reachable from the donor's type; the same donor planned
    /// under a different schema is a different plan.
    schema: Hash,
    config: EngineConfig,
}

/// Content-addressed plan memo: one walk per distinct donor, schema and
/// config, shared by every stream that carries the same constant.
#[derive(Debug, Default)]
pub struct PlanCache {
    plans: Mutex<HashMap<PlanKey, Arc<FieldPlan>>>,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached plan for `donor`, building it on first use.
    pub fn get_or_build(
        &self,
        schemas: &SchemaIndex,
        donor: &Value,
        config: &EngineConfig,
    ) -> Result<Arc<FieldPlan>, PlanError> {
        let type_name = donor.as_record().map(|record| record.type_name.as_str());
        let key = PlanKey {
            donor: Hash::of_cbor(donor).map_err(fingerprint)?,
            schema: Hash::of_cbor(&schemas.closure(type_name.unwrap_or_default()))
                .map_err(fingerprint)?,
            config: *config,
        };
        if let Some(existing) = self.plans.lock().expect("plan cache poisoned").get(&key) {
            return Ok(existing.clone());
        }

        // Built outside the lock; a racing builder produces an identical plan.
        let plan = Arc::new(FieldPlan::build(schemas, donor, config)?);
        let mut plans = self.plans.lock().expect("plan cache poisoned");
        let shared = plans.entry(key).or_insert(plan).clone();
        debug!(donor = %key.donor, cached = plans.len(), "plan cache miss");
        Ok(shared)
    }

    pub fn len(&self) -> usize {
        self.plans.lock().expect("plan cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.plans.lock().expect("plan cache poisoned").clear();
    }
}

fn fingerprint(err: impl std::fmt::Display) -> PlanError {
    PlanError::Fingerprint(err.to_string())
}
