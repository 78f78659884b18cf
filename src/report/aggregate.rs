// src/report/aggregate.rs
// =============================================================================
// Combines the two checkers' statuses into the single "overall" status shown
// at the top of the report.
//
// Precedence, first match wins:
// 1. either run still in flight -> checking
// 2. either run failed          -> error
// 3. both runs clean            -> success
// 4. anything else              -> warning
// =============================================================================

use super::types::CheckStatus;

pub fn aggregate(domain: CheckStatus, integration: CheckStatus) -> CheckStatus {
    let pair = [domain, integration];

    if pair.contains(&CheckStatus::Checking) {
        CheckStatus::Checking
    } else if pair.contains(&CheckStatus::Error) {
        CheckStatus::Error
    } else if pair.iter().all(|s| *s == CheckStatus::Success) {
        CheckStatus::Success
    } else {
        CheckStatus::Warning
    }
}
