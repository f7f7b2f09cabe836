//! Household enrollment
//!
//! A receipt workflow needs a `household_id` before processing can start.
//! Membership rollback on a failed create is the server's job; this side
//! only surfaces the error.

use crate::{BackendError, ReceiptBackend};
use shared::contracts::{HouseholdCheckRequest, HouseholdCreateRequest};
use shared::models::Household;

/// Fetch the user's household, creating one with the given name when the
/// user has none yet.
pub async fn ensure_household<B: ReceiptBackend>(
    backend: &B,
    user_id: &str,
    default_name: &str,
) -> Result<Household, BackendError> {
    let check = backend
        .check_household(&HouseholdCheckRequest {
            user_id: user_id.to_string(),
        })
        .await?;

    if check.has_household {
        if let Some(household) = check.household {
            return Ok(household);
        }
        return Err(BackendError::MalformedResponse(
            "hasHousehold is true but no household was returned".to_string(),
        ));
    }

    tracing::info!(user_id, "no household, creating one");
    let created = backend
        .create_household(&HouseholdCreateRequest {
            user_id: user_id.to_string(),
            household_name: default_name.to_string(),
        })
        .await?;

    if !created.success {
        return Err(BackendError::Remote(
            "Household creation failed".to_string(),
        ));
    }
    created.household.ok_or_else(|| {
        BackendError::MalformedResponse("household creation returned no household".to_string())
    })
}
