//! Storage health probe used by the health endpoint.

use async_trait::async_trait;

use common::AppResult;

#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Round-trip to storage.
    async fn ping(&self) -> AppResult<()>;
}
