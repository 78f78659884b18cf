// src/report/mod.rs
// =============================================================================
// This module holds the data the checkers produce.
//
// Submodules:
// - types: CheckStatus and the two result value objects
// - findings: Typed problems for the domain check, one slot per concern
// - aggregate: Folds both statuses into one overall status
//
// Nothing in here touches the network; these are plain value types plus
// the rules that turn findings into a status.
//
// Rust concepts:
// - enums with data: Issue::EdgeProxy { via } carries which transport saw it
// - #[serde(untagged)]: Signal serializes as a bare bool or a bare string
// - Derive macros: Serialize, Clone, PartialEq come for free
// =============================================================================

// Declare submodules
mod aggregate;
mod findings;
mod types;

// Re-export so callers write `report::CheckStatus`, not `report::types::CheckStatus`
pub use aggregate::aggregate;
pub use findings::{Findings, Issue, Via};
pub use types::{
    CheckStatus, DomainCheckResult, DomainDetails, IntegrationCheckResult, IntegrationDetails,
    IntegrationFlag, Signal,
};

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is `findings` not fully re-exported?
//    - Concern is an implementation detail of Findings::record
//    - Only what the checkers and the output need is made public
//
// 2. Why camelCase in the JSON?
//    - #[serde(rename_all = "camelCase")] turns `response_time_ms` into
//      `responseTimeMs`, so the JSON keeps the field names of the debug page
//      while the Rust code keeps snake_case
// -----------------------------------------------------------------------------
