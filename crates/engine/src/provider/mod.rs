// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic fix providers and the registry that dispatches to them.

mod rules;

use std::sync::Arc;

use sg_core::{Fix, RuleError};

pub use rules::{
    client_analyzer_provider, compiler_error_provider, management_analyzer_provider,
    RuleTableProvider,
};

/// A pure `(type, message) -> [Fix]` generator for a family of error codes.
pub trait FixProvider: Send + Sync {
    /// Registry key; registering two providers with one name keeps the first.
    fn name(&self) -> &'static str;

    /// Whether this provider knows `error_type`, given upper-cased.
    fn handles(&self, error_type: &str) -> bool;

    fn fixes(&self, error: &RuleError) -> Vec<Fix>;
}

/// Fix lookup capability consumed by the repair loop.
pub trait FixProviderSet: Send + Sync {
    /// Fixes for `errors`, in error order. Errors no provider handles are
    /// dropped.
    fn fixes_for(&self, errors: &[RuleError]) -> Vec<Fix>;
}

/// Provider table built once at startup and shared by reference.
#[derive(Clone, Default)]
pub struct FixProviderRegistry {
    providers: Vec<Arc<dyn FixProvider>>,
}

impl FixProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in analyzer and compiler providers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(client_analyzer_provider()));
        registry.register(Arc::new(management_analyzer_provider()));
        registry.register(Arc::new(compiler_error_provider()));
        registry
    }

    /// Add `provider` unless one with the same name is already registered.
    /// Returns whether it was added.
    pub fn register(&mut self, provider: Arc<dyn FixProvider>) -> bool {
        if self.providers.iter().any(|p| p.name() == provider.name()) {
            tracing::debug!(provider = provider.name(), "fix provider already registered");
            return false;
        }
        self.providers.push(provider);
        true
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl FixProviderSet for FixProviderRegistry {
    fn fixes_for(&self, errors: &[RuleError]) -> Vec<Fix> {
        let mut fixes = Vec::new();
        for error in errors {
            let key = error.error_type().to_ascii_uppercase();
            let before = fixes.len();
            for provider in self.providers.iter().filter(|p| p.handles(&key)) {
                fixes.extend(provider.fixes(error));
            }
            if fixes.len() == before {
                tracing::debug!(error_type = error.error_type(), "no fix provider for error");
            }
        }
        fixes
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
