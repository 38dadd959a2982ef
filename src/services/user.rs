//! User services - profile reads and presence

use crate::core::{AppError, AppState};
use crate::entities::UserProfile;
use crate::repositories::Read;
use crate::store::DocumentStore;
use tracing::{info, instrument};

/// Flip the presence flag. Called on app foreground/background
/// transitions; `last_seen` is stamped by the store on every flip.
#[instrument(skip(state))]
pub async fn set_online<S: DocumentStore>(
    state: &AppState<S>,
    user_id: &str,
    online: bool,
) -> Result<(), AppError> {
    if user_id.is_empty() {
        return Err(AppError::validation("User identity is required"));
    }
    state.user.set_presence(user_id, online).await?;
    info!(online, "Presence updated");
    Ok(())
}

/// Profile by id, if one exists.
pub async fn profile<S: DocumentStore>(
    state: &AppState<S>,
    user_id: &str,
) -> Result<Option<UserProfile>, AppError> {
    Ok(state.user.read(&user_id.to_string()).await?)
}
