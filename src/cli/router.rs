//! Router used by the CLI: there is no history to drive, so every visit is
//! recorded and reported on stdout.

use crate::secur::{Location, Router};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Visit {
    Push(String),
    Replace(String),
    Assign(String),
}

impl Visit {
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Push(to) => format!("navigate {to}"),
            Self::Replace(to) => format!("replace {to}"),
            Self::Assign(to) => format!("redirect {to}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct ConsoleRouter {
    visits: Mutex<Vec<Visit>>,
}

impl ConsoleRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn visits(&self) -> Vec<Visit> {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, visit: Visit) {
        debug!(visit = %visit.describe(), "router");
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(visit);
    }
}

impl Router for ConsoleRouter {
    fn push(&self, location: &Location) {
        self.record(Visit::Push(location.to_string()));
    }

    fn replace(&self, location: &Location) {
        self.record(Visit::Replace(location.to_string()));
    }

    fn assign(&self, url: &str) {
        self.record(Visit::Assign(url.to_string()));
    }
}
