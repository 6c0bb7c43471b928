//! Per-entity curation steps with ordered execution.
//!
//! # Standard Pipeline Order
//!
//! 1. **SentinelCleanupStep** - Blank out `.` cells
//! 2. **ParticipantIdStep** - Derive `Participant_ID` from `SubjectUID`
//! 3. **SchemaConformanceStep** - Match the canonical column schema
//!
//! Identifiers are derived before conformance so that a declared
//! `Participant_ID` column is never pre-filled with nulls, and sentinels are
//! cleared first so a `.` subject key never becomes an identifier.

use anyhow::Result;
use polars::prelude::DataFrame;
use tracing::debug;

use clinreg_model::{AssignmentOutcome, EntityCuration, EntityDescriptor};

use crate::identifiers::assign_participant_ids;
use crate::normalize::{clean_sentinels, conform_to_schema};

/// A single transformation of one entity table.
pub trait CurationStep: Send + Sync {
    /// Apply the step to `df`, recording what it did on `record`.
    ///
    /// Returns whether the frame changed.
    fn execute(
        &self,
        entity: &EntityDescriptor,
        df: &mut DataFrame,
        record: &mut EntityCuration,
    ) -> Result<bool>;

    fn step_name(&self) -> &str;
}

/// An ordered list of curation steps.
pub struct EntityPipeline {
    steps: Vec<Box<dyn CurationStep>>,
}

impl Default for EntityPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityPipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn add_step(mut self, step: Box<dyn CurationStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn remove_step(mut self, step_name: &str) -> Self {
        self.steps.retain(|s| s.step_name() != step_name);
        self
    }

    /// Run every step in order. Returns whether any step changed the frame.
    pub fn execute(
        &self,
        entity: &EntityDescriptor,
        df: &mut DataFrame,
        record: &mut EntityCuration,
    ) -> Result<bool> {
        let mut changed = false;
        for step in &self.steps {
            let step_changed = step.execute(entity, df, record)?;
            debug!(
                entity = %entity.canonical_name,
                step = step.step_name(),
                changed = step_changed,
                "step finished"
            );
            changed |= step_changed;
        }
        Ok(changed)
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.step_name()).collect()
    }
}

pub struct SentinelCleanupStep;

impl CurationStep for SentinelCleanupStep {
    fn execute(
        &self,
        _entity: &EntityDescriptor,
        df: &mut DataFrame,
        record: &mut EntityCuration,
    ) -> Result<bool> {
        let cleaned = clean_sentinels(df)?;
        record.sentinels_cleaned = cleaned;
        Ok(cleaned > 0)
    }

    fn step_name(&self) -> &str {
        "sentinel_cleanup"
    }
}

pub struct ParticipantIdStep;

impl CurationStep for ParticipantIdStep {
    fn execute(
        &self,
        _entity: &EntityDescriptor,
        df: &mut DataFrame,
        record: &mut EntityCuration,
    ) -> Result<bool> {
        let outcome = assign_participant_ids(df)?;
        record.assignment = Some(outcome);
        Ok(matches!(outcome, AssignmentOutcome::Assigned { .. }))
    }

    fn step_name(&self) -> &str {
        "participant_id"
    }
}

pub struct SchemaConformanceStep;

impl CurationStep for SchemaConformanceStep {
    fn execute(
        &self,
        entity: &EntityDescriptor,
        df: &mut DataFrame,
        record: &mut EntityCuration,
    ) -> Result<bool> {
        let changes = conform_to_schema(df, &entity.columns)?;
        let changed = !changes.is_noop();
        record.schema = Some(changes);
        Ok(changed)
    }

    fn step_name(&self) -> &str {
        "schema_conformance"
    }
}

pub fn build_default_pipeline() -> EntityPipeline {
    EntityPipeline::new()
        .add_step(Box::new(SentinelCleanupStep))
        .add_step(Box::new(ParticipantIdStep))
        .add_step(Box::new(SchemaConformanceStep))
}
