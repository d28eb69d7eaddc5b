//! Operation policy of a resource manager.
//!
//! # Defaults
//!
//! | Field | Default |
//! |-------|---------|
//! | `operations` | all five, in [`Operation::ALL`] order |
//! | `id_generator` | [`Id::generate`] (UUID v4) |
//! | `update_id_policy` | [`UpdateIdPolicy::Generate`] |
//! | `strict_resource_type` | `false` |
//! | `body_limit` | 10 MiB |
//! | `negotiator` | JSON, then YAML |
//!
//! # Example
//!
//! ```rust
//! use resource_manager::{Id, ManagerConfig, Operation};
//!
//! let config = ManagerConfig::default()
//!     .with_operations([Operation::List, Operation::Get])
//!     .with_id_generator(|| Id::new("fixed"));
//! assert!(!config.is_enabled(Operation::Delete));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::encoding::Negotiator;
use crate::error::ConfigurationIssue;
use crate::operation::Operation;
use crate::resource::Id;

/// Default maximum request body size (10 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Produces identities for specs that arrive without one.
pub type IdGenerator = Arc<dyn Fn() -> Id + Send + Sync>;

/// What an update does with a spec that carries no identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateIdPolicy {
    /// Assign a freshly generated id, exactly like create does.
    #[default]
    Generate,
    /// Assign the `{id}` path segment of the request.
    FromPath,
}

/// Configuration fixed at manager construction.
#[derive(Clone)]
pub struct ManagerConfig {
    /// Enabled operations. Duplicates are dropped at construction.
    pub operations: Vec<Operation>,

    /// Generator for missing identities.
    pub id_generator: IdGenerator,

    /// Identity assignment for updates.
    pub update_id_policy: UpdateIdPolicy,

    /// Reject bodies whose `type` differs from the singular resource name.
    pub strict_resource_type: bool,

    /// Maximum number of body bytes read for create and update.
    pub body_limit: usize,

    /// Encoders available to requests.
    pub negotiator: Negotiator,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            operations: Operation::ALL.to_vec(),
            id_generator: Arc::new(Id::generate),
            update_id_policy: UpdateIdPolicy::default(),
            strict_resource_type: false,
            body_limit: DEFAULT_BODY_LIMIT,
            negotiator: Negotiator::default(),
        }
    }
}

impl fmt::Debug for ManagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerConfig")
            .field("operations", &self.operations)
            .field("id_generator", &"<fn>")
            .field("update_id_policy", &self.update_id_policy)
            .field("strict_resource_type", &self.strict_resource_type)
            .field("body_limit", &self.body_limit)
            .field("negotiator", &self.negotiator)
            .finish()
    }
}

impl ManagerConfig {
    /// Replaces the enabled operation set.
    pub fn with_operations(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.operations = operations.into_iter().collect();
        self
    }

    /// Replaces the id generator.
    pub fn with_id_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn() -> Id + Send + Sync + 'static,
    {
        self.id_generator = Arc::new(generator);
        self
    }

    /// Sets the update identity policy.
    pub fn with_update_id_policy(mut self, policy: UpdateIdPolicy) -> Self {
        self.update_id_policy = policy;
        self
    }

    /// Returns true if `operation` is enabled.
    pub fn is_enabled(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }

    /// Drops duplicate operations, keeping the first occurrence.
    pub(crate) fn dedup_operations(&mut self) {
        let mut seen = Vec::with_capacity(self.operations.len());
        self.operations.retain(|op| {
            if seen.contains(op) {
                false
            } else {
                seen.push(*op);
                true
            }
        });
    }

    /// Checks the configuration for values that cannot work.
    pub fn validate(&self) -> Result<(), ConfigurationIssue> {
        if self.body_limit == 0 {
            return Err(ConfigurationIssue::ZeroBodyLimit);
        }

        if self.negotiator.is_empty() {
            return Err(ConfigurationIssue::NoEncoders);
        }

        Ok(())
    }
}
