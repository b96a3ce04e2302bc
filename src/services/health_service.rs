use sqlx::PgPool;
use tonic::{Request, Response, Status};

use crate::proto::health::{
    health_check_response::ServingStatus, health_server::Health, HealthCheckRequest,
    HealthCheckResponse,
};

#[derive(Debug, Default)]
pub struct HealthServiceImpl {
    pool: Option<PgPool>,
}

impl HealthServiceImpl {
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// Reports NOT_SERVING while the database does not answer.
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool: Some(pool) }
    }

    async fn status(&self) -> ServingStatus {
        let Some(pool) = &self.pool else {
            return ServingStatus::Serving;
        };
        match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => ServingStatus::Serving,
            Err(e) => {
                tracing::warn!("Health check database ping failed: {}", e);
                ServingStatus::NotServing
            }
        }
    }
}

#[tonic::async_trait]
impl Health for HealthServiceImpl {
    async fn check(
        &self,
        _request: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        Ok(Response::new(HealthCheckResponse {
            status: self.status().await.into(),
        }))
    }

    type WatchStream = tokio_stream::wrappers::ReceiverStream<Result<HealthCheckResponse, Status>>;

    async fn watch(
        &self,
        _request: Request<HealthCheckRequest>,
    ) -> Result<Response<Self::WatchStream>, Status> {
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        let status = self.status().await;

        tokio::spawn(async move {
            let _ = tx.send(Ok(HealthCheckResponse {
                status: status.into(),
            })).await;
        });

        Ok(Response::new(tokio_stream::wrappers::ReceiverStream::new(rx)))
    }
}
