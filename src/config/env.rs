//! Environment access.
//!
//! Startup code reads the process environment through [`Environment`] so the
//! reads stay in one place and tests can supply a fixed map instead.

use std::collections::HashMap;

/// Source of named configuration values.
pub trait Environment {
    /// Value of `key`, or `None` when unset or not valid unicode.
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}
