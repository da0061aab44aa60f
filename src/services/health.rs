//! Back-end health check

use serde::Serialize;
use serde_json::Value;

use crate::{
    client::{ApiRequest, Transport},
    models::Backend,
};

use super::Services;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unavailable,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unavailable => write!(f, "unavailable"),
        }
    }
}

impl<T: Transport> Services<T> {
    /// `GET /health`; healthy only when the back end answers `success: true`
    pub async fn health(&self, backend: Backend) -> HealthStatus {
        match self.send(backend, ApiRequest::get("health")).await {
            Ok(body) if body.get("success").and_then(Value::as_bool) == Some(true) => HealthStatus::Healthy,
            Ok(body) => {
                tracing::warn!(%backend, ?body, "Health check answered without success");
                HealthStatus::Unavailable
            }
            Err(e) => {
                tracing::warn!(%backend, error = %e, "Health check failed");
                HealthStatus::Unavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockTransport;
    use crate::config::ResponseShape;
    use crate::error::AppError;
    use serde_json::json;

    fn services(library: MockTransport) -> Services<MockTransport> {
        Services::new(library, ResponseShape::Strict, MockTransport::new(), ResponseShape::Lenient)
    }

    #[tokio::test]
    async fn test_healthy() {
        let mut library = MockTransport::new();
        library
            .expect_send()
            .withf(|req| req.path == "health")
            .returning(|_| Ok(json!({ "success": true, "message": "API is running" })));
        assert_eq!(services(library).health(Backend::Library).await, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let mut library = MockTransport::new();
        library.expect_send().returning(|_| {
            Err(AppError::Api {
                status: 502,
                message: None,
            })
        });
        assert_eq!(services(library).health(Backend::Library).await, HealthStatus::Unavailable);

        let mut library = MockTransport::new();
        library.expect_send().returning(|_| Ok(json!({ "status": "ok" })));
        assert_eq!(services(library).health(Backend::Library).await, HealthStatus::Unavailable);
    }
}
