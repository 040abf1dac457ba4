//! gRPC transport for the `slr.v1.Regression` service

use slr_lib::proto::{
    CalculateRequest, ModelValue, Regression, RegressionServer, ServerStats, StatsRequest,
    TrainingRequest, TrainingResults,
};
use slr_lib::{ErrorKind, RegressionService, SlrError};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Status};
use tracing::info;

/// Map a service error onto a gRPC status
pub fn to_status(err: SlrError) -> Status {
    let message = err.to_string();
    match err.kind() {
        ErrorKind::Validation => Status::invalid_argument(message),
        ErrorKind::NotFound => Status::not_found(message),
        ErrorKind::Storage => Status::unavailable(message),
    }
}

pub struct GrpcHandler {
    service: RegressionService,
}

impl GrpcHandler {
    pub fn new(service: RegressionService) -> Self {
        Self { service }
    }

    pub fn into_server(self) -> RegressionServer<Self> {
        RegressionServer::new(self)
    }
}

#[tonic::async_trait]
impl Regression for GrpcHandler {
    async fn train(
        &self,
        request: Request<TrainingRequest>,
    ) -> Result<Response<TrainingResults>, Status> {
        let request = request.into_inner();
        let instances = request
            .data
            .map(|pool| pool.to_instances())
            .unwrap_or_default();

        let results = self
            .service
            .train_instances(instances, request.store_model)
            .await
            .map_err(to_status)?;

        Ok(Response::new(results.into()))
    }

    async fn calculate(
        &self,
        request: Request<CalculateRequest>,
    ) -> Result<Response<ModelValue>, Status> {
        let request = request.into_inner();

        let value = self
            .service
            .calculate(&request.model_name, request.argument)
            .await
            .map_err(to_status)?;

        Ok(Response::new(value.into()))
    }

    async fn stats(&self, _request: Request<StatsRequest>) -> Result<Response<ServerStats>, Status> {
        Ok(Response::new(self.service.stats().await.into()))
    }
}

/// Serve gRPC on a bound listener, stopping when `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    service: RegressionService,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    info!(addr = ?listener.local_addr()?, "Starting gRPC server");

    tonic::transport::Server::builder()
        .add_service(GrpcHandler::new(service).into_server())
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await?;

    Ok(())
}
