//! Computes the applicable subsequence of the registry for a data snapshot.
//!
//! Nothing here is cached: every call evaluates the predicates against the
//! snapshot it is given, so later edits can add or remove steps.

use std::sync::Arc;

use crate::form::FormData;
use crate::step::{StepKey, StepRegistry};

#[derive(Debug, Clone)]
pub struct StepSequencer<S> {
    registry: Arc<StepRegistry<S>>,
}

impl<S: StepKey> StepSequencer<S> {
    pub fn new(registry: Arc<StepRegistry<S>>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &StepRegistry<S> {
        &self.registry
    }

    /// Applicable steps in registry base order.
    pub fn sequence(&self, data: &FormData) -> Vec<S> {
        self.registry
            .iter()
            .filter(|step| step.is_applicable(data))
            .map(|step| step.id())
            .collect()
    }

    pub fn contains(&self, step: S, data: &FormData) -> bool {
        self.registry
            .get(step)
            .is_some_and(|def| def.is_applicable(data))
    }

    /// First applicable step strictly after `step` in base order.
    pub fn next_after(&self, step: S, data: &FormData) -> Option<S> {
        let position = self.registry.position(step)?;
        self.registry
            .iter()
            .skip(position + 1)
            .find(|def| def.is_applicable(data))
            .map(|def| def.id())
    }

    /// Last applicable step strictly before `step` in base order.
    pub fn previous_before(&self, step: S, data: &FormData) -> Option<S> {
        let position = self.registry.position(step)?;
        self.registry
            .iter()
            .take(position)
            .filter(|def| def.is_applicable(data))
            .last()
            .map(|def| def.id())
    }

    /// Where the wizard should be when `current` may have stopped applying:
    /// `current` itself, else the nearest applicable step at or after its base
    /// position, else the first applicable step.
    pub fn resolve_current(&self, current: S, data: &FormData) -> Option<S> {
        let position = self.registry.position(current).unwrap_or(0);
        self.registry
            .iter()
            .skip(position)
            .find(|def| def.is_applicable(data))
            .or_else(|| self.registry.iter().find(|def| def.is_applicable(data)))
            .map(|def| def.id())
    }

    /// Steps that applied under `before` but no longer apply under `after`.
    pub fn dropped_steps(&self, before: &FormData, after: &FormData) -> Vec<S> {
        self.registry
            .iter()
            .filter(|def| def.is_applicable(before) && !def.is_applicable(after))
            .map(|def| def.id())
            .collect()
    }

    /// Fields owned by `dropped` that no step still applicable under `data`
    /// also owns.
    pub fn orphaned_fields(&self, dropped: &[S], data: &FormData) -> Vec<String> {
        let still_owned: Vec<&String> = self
            .registry
            .iter()
            .filter(|def| def.is_applicable(data))
            .flat_map(|def| def.owned_fields())
            .collect();
        let mut orphaned = Vec::new();
        for def in self.registry.iter().filter(|def| dropped.contains(&def.id())) {
            for field in def.owned_fields() {
                if !still_owned.contains(&field) && !orphaned.contains(field) {
                    orphaned.push(field.clone());
                }
            }
        }
        orphaned
    }
}
