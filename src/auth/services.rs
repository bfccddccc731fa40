use tokio::task;

use crate::auth::password::{self, CredentialError, HashedPassword};

/// Hashing is CPU bound, so it runs on the blocking pool instead of a runtime
/// worker.
pub async fn hash_password(plain: String) -> Result<HashedPassword, CredentialError> {
    task::spawn_blocking(move || password::hash(&plain))
        .await
        .map_err(|e| CredentialError::Hashing(e.to_string()))?
}

pub async fn verify_password(plain: String, hashed: String) -> Result<bool, CredentialError> {
    task::spawn_blocking(move || password::verify(&plain, &hashed))
        .await
        .map_err(|e| CredentialError::Verification(e.to_string()))?
}
