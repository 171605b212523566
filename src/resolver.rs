use tracing::debug;

use crate::error::AppError;
use crate::models::{RequestParams, SelectionResult};
use crate::registry::RegistryClient;
use crate::selector::{pick_winner, Selector};

/// Find the latest usable tag for the requested repository and platform.
pub async fn resolve(
    client: &RegistryClient,
    params: &RequestParams,
) -> Result<SelectionResult, AppError> {
    let mut selector = Selector::new(params)?;
    let candidates = client
        .find_candidates(&params.repository, &mut selector)
        .await?;
    debug!(
        "Ranking {} candidates for {}",
        candidates.len(),
        params.repository
    );

    pick_winner(&params.repository, candidates).ok_or_else(|| AppError::NoMatchFound {
        reason: selector
            .last_rejection()
            .map(ToString::to_string)
            .unwrap_or_else(|| "repository has no tags".to_string()),
    })
}
