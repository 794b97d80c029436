// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in providers: tables of known codes and the guidance for each.

use sg_core::{Fix, RuleError};

use super::FixProvider;

/// Provider backed by a static `code -> guidance` table.
#[derive(Debug, Clone, Copy)]
pub struct RuleTableProvider {
    name: &'static str,
    rules: &'static [(&'static str, &'static str)],
}

impl RuleTableProvider {
    pub const fn new(name: &'static str, rules: &'static [(&'static str, &'static str)]) -> Self {
        Self { name, rules }
    }

    fn guidance(&self, code: &str) -> Option<&'static str> {
        self.rules.iter().find(|(c, _)| *c == code).map(|(_, g)| *g)
    }
}

impl FixProvider for RuleTableProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn handles(&self, error_type: &str) -> bool {
        self.guidance(error_type).is_some()
    }

    fn fixes(&self, error: &RuleError) -> Vec<Fix> {
        let code = error.error_type().to_ascii_uppercase();
        self.guidance(&code)
            .map(|guidance| {
                Fix::rule_based(
                    error.error_type(),
                    format!("{}: {}. {}", error.error_type(), error.message(), guidance),
                )
            })
            .into_iter()
            .collect()
    }
}

const CLIENT_RULES: &[(&str, &str)] = &[
    ("AZC0001", "Move the client into an approved Azure namespace using @clientNamespace"),
    ("AZC0002", "Give the service method an optional CancellationToken or RequestContext parameter"),
    ("AZC0003", "Make the service method virtual"),
    ("AZC0004", "Provide both synchronous and asynchronous variants of the operation"),
    ("AZC0005", "Add a protected parameterless constructor to the client for mocking"),
    ("AZC0006", "Add a client constructor that accepts the client options type"),
    ("AZC0007", "Add a minimal client constructor that takes only endpoint and credential"),
    ("AZC0008", "Define a ServiceVersion enum on the client options type"),
    ("AZC0009", "Take ServiceVersion as the first client options constructor parameter"),
    ("AZC0010", "Default the client options ServiceVersion to the latest version"),
    ("AZC0011", "Remove InternalsVisibleTo entries for non-test assemblies"),
    ("AZC0012", "Rename the type with @clientName to a specific, multi-word name"),
    ("AZC0013", "Create TaskCompletionSource with TaskCreationOptions.RunContinuationsAsynchronously"),
    ("AZC0014", "Remove banned types from the public API surface"),
    ("AZC0015", "Return Response, Response<T>, Pageable<T> or Operation<T> from client methods"),
    ("AZC0016", "Rename the ServiceVersion member to the V<date> naming pattern"),
    ("AZC0017", "Do not use RequestContent as a convenience method parameter"),
    ("AZC0018", "Use RequestContent and RequestContext parameters in protocol method signatures"),
    ("AZC0019", "Rename or reshape overloads so calls are not ambiguous"),
    ("AZC0020", "Avoid exposing internal or banned types through public models"),
];

const MANAGEMENT_RULES: &[(&str, &str)] = &[
    ("AZC0030", "Rename the model with @clientName to drop the reserved suffix"),
    ("AZC0031", "Rename the model with @clientName to drop the 'Definition' suffix"),
    ("AZC0032", "Rename the model with @clientName to drop the 'Data' suffix"),
    ("AZC0033", "Rename the model with @clientName to drop the 'Operation' suffix"),
    ("AZC0034", "Rename the type with @clientName so it does not collide with an Azure type"),
    ("AZC0035", "Add a model factory method for the output model"),
];

const COMPILER_RULES: &[(&str, &str)] = &[
    ("CS0103", "Define the missing name or correct the reference in the TypeSpec customization"),
    ("CS0246", "Rename or define the missing type so the generated code can resolve it"),
    ("CS0111", "Rename one of the duplicate members with @clientName"),
    ("CS0535", "Restore the interface member the generated type no longer implements"),
];

pub fn client_analyzer_provider() -> RuleTableProvider {
    RuleTableProvider::new("client-analyzers", CLIENT_RULES)
}

pub fn management_analyzer_provider() -> RuleTableProvider {
    RuleTableProvider::new("management-analyzers", MANAGEMENT_RULES)
}

pub fn compiler_error_provider() -> RuleTableProvider {
    RuleTableProvider::new("compiler-errors", COMPILER_RULES)
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
