use std::fmt;
use std::rc::Rc;

use crate::{LocalScheduler, Scheduler};

/// Settings for a single chain.
#[derive(Clone)]
pub struct ChainConfig {
    /// Name recorded on the chain's tracing span.
    pub label: String,
    /// Deferral primitive used for kickoff and by deferring combinators.
    pub scheduler: Rc<dyn Scheduler>,
}

impl ChainConfig {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn scheduler(mut self, scheduler: Rc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            label: "chain".to_string(),
            scheduler: Rc::new(LocalScheduler),
        }
    }
}

impl fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainConfig")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
