/// Image identity derivation
///
/// The identity keys saved scales and per-image templates across sessions:
/// lowercase hex SHA-256 of the file bytes, a `|`, then the filename.
/// Hashing runs on the blocking pool; if that task fails we fall back to
/// `filename|size`, which is weaker but keeps the upload usable.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::task;

/// Content-hash identity
pub fn content_identity(filename: &str, bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("{}|{}", hex, filename)
}

/// Degraded identity when hashing is unavailable
pub fn fallback_identity(filename: &str, size: usize) -> String {
    format!("{}|{}", filename, size)
}

/// Hash on the blocking pool and settle on an identity
pub async fn resolve_identity(filename: String, bytes: Arc<Vec<u8>>) -> String {
    let size = bytes.len();
    let name = filename.clone();

    match task::spawn_blocking(move || content_identity(&name, &bytes)).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!(error = %e, file = %filename, "⚠️  Hashing failed, using filename|size identity");
            fallback_identity(&filename, size)
        }
    }
}
