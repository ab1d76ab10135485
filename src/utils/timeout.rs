//! Deadline helpers for transport operations.

use std::future::Future;
use std::time::Duration;

use crate::error::{ProtocolError, Result};

/// Default deadline for a single read or write
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `fut` under `duration`, mapping an elapsed deadline to `ProtocolError::Timeout`
pub async fn with_timeout_error<F, T>(fut: F, duration: Duration) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(ProtocolError::Timeout),
    }
}
