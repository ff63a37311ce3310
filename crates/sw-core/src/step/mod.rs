//! Step catalog.
//!
//! A flow declares every step it can ever show, in a fixed base order, with an
//! applicability predicate and a validator. The registry is built once and is
//! read-only afterwards, which keeps sequencing deterministic.

pub mod sequencer;

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use thiserror::Error;

use crate::form::FormData;
use crate::validation::{ValidationResult, ValidatorFault};

pub use sequencer::StepSequencer;

/// Identifier of a step. Implemented for every flow's step enum.
pub trait StepKey:
    Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
}

impl<T> StepKey for T where
    T: Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
}

type Predicate = Arc<dyn Fn(&FormData) -> bool + Send + Sync>;
type Validator = Arc<dyn Fn(&FormData) -> Result<ValidationResult, ValidatorFault> + Send + Sync>;

/// One screen's worth of data collection.
#[derive(Clone)]
pub struct StepDefinition<S> {
    id: S,
    label: String,
    owned_fields: Vec<String>,
    applicable: Predicate,
    validator: Validator,
    remote_check: bool,
    terminal: bool,
}

impl<S: StepKey> StepDefinition<S> {
    /// A step that always applies and always validates.
    pub fn new(id: S, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            owned_fields: Vec::new(),
            applicable: Arc::new(|_| true),
            validator: Arc::new(|_| Ok(ValidationResult::Valid)),
            remote_check: false,
            terminal: false,
        }
    }

    pub fn applicable_when(
        mut self,
        predicate: impl Fn(&FormData) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.applicable = Arc::new(predicate);
        self
    }

    pub fn validated_by(
        mut self,
        validator: impl Fn(&FormData) -> Result<ValidationResult, ValidatorFault>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Fields this step contributes; cleared when the step drops out of the
    /// sequence after a branch change.
    pub fn owns_fields(mut self, fields: &[&str]) -> Self {
        self.owned_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// The step additionally needs an asynchronous check after its local
    /// validator passes.
    pub fn with_remote_check(mut self) -> Self {
        self.remote_check = true;
        self
    }

    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    pub fn id(&self) -> S {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn owned_fields(&self) -> &[String] {
        &self.owned_fields
    }

    pub fn is_applicable(&self, data: &FormData) -> bool {
        (self.applicable)(data)
    }

    pub fn validate(&self, data: &FormData) -> Result<ValidationResult, ValidatorFault> {
        (self.validator)(data)
    }

    pub fn requires_remote_check(&self) -> bool {
        self.remote_check
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}

impl<S: fmt::Debug> fmt::Debug for StepDefinition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("owned_fields", &self.owned_fields)
            .field("remote_check", &self.remote_check)
            .field("terminal", &self.terminal)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate step id: {0}")]
    DuplicateStep(String),
    #[error("registry has no steps")]
    Empty,
    #[error("terminal step {0} must be registered last")]
    TerminalNotLast(String),
}

/// Ordered, immutable catalog of steps.
#[derive(Debug, Clone)]
pub struct StepRegistry<S> {
    steps: Vec<StepDefinition<S>>,
    branch_fields: Vec<String>,
}

impl<S: StepKey> StepRegistry<S> {
    pub fn builder() -> StepRegistryBuilder<S> {
        StepRegistryBuilder {
            steps: Vec::new(),
            seen: HashSet::new(),
            branch_fields: Vec::new(),
        }
    }

    pub fn get(&self, id: S) -> Option<&StepDefinition<S>> {
        self.steps.iter().find(|step| step.id == id)
    }

    /// Base-order position of `id`.
    pub fn position(&self, id: S) -> Option<usize> {
        self.steps.iter().position(|step| step.id == id)
    }

    pub fn first(&self) -> S {
        // `build` rejects empty registries.
        self.steps[0].id
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepDefinition<S>> {
        self.steps.iter()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn branch_fields(&self) -> &[String] {
        &self.branch_fields
    }

    pub fn is_terminal(&self, id: S) -> bool {
        self.get(id).is_some_and(StepDefinition::is_terminal)
    }

    pub fn label(&self, id: S) -> String {
        self.get(id)
            .map(|step| step.label.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

pub struct StepRegistryBuilder<S> {
    steps: Vec<StepDefinition<S>>,
    seen: HashSet<S>,
    branch_fields: Vec<String>,
}

impl<S: StepKey> StepRegistryBuilder<S> {
    /// Append `step` to the base order. Duplicate ids fail immediately.
    pub fn register(mut self, step: StepDefinition<S>) -> Result<Self, RegistryError> {
        if !self.seen.insert(step.id) {
            return Err(RegistryError::DuplicateStep(step.id.to_string()));
        }
        self.steps.push(step);
        Ok(self)
    }

    /// Declare a field whose value decides which other steps apply.
    pub fn branch_field(mut self, field: &str) -> Self {
        if !self.branch_fields.iter().any(|f| f == field) {
            self.branch_fields.push(field.to_string());
        }
        self
    }

    pub fn build(self) -> Result<StepRegistry<S>, RegistryError> {
        if self.steps.is_empty() {
            return Err(RegistryError::Empty);
        }
        let last = self.steps.len() - 1;
        if let Some((_, step)) = self
            .steps
            .iter()
            .enumerate()
            .find(|(idx, step)| step.terminal && *idx != last)
        {
            return Err(RegistryError::TerminalNotLast(step.id.to_string()));
        }
        Ok(StepRegistry {
            steps: self.steps,
            branch_fields: self.branch_fields,
        })
    }
}
