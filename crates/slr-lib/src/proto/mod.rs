//! Generated protobuf code
//!
//! This module contains the Rust code for `proto/slr/v1/regression.proto`.
//! With the `proto-gen` feature the code generated at build time by
//! tonic-build is used; otherwise the checked-in definitions below are
//! compiled, so builds do not require protoc.

mod convert;

#[cfg(feature = "proto-gen")]
pub mod slr {
    pub mod v1 {
        tonic::include_proto!("slr.v1");
    }
}

#[cfg(not(feature = "proto-gen"))]
pub mod slr {
    pub mod v1 {
        use prost::Message;

        #[derive(Clone, PartialEq, Message)]
        pub struct Instance {
            #[prost(double, tag = "1")]
            pub argument: f64,
            #[prost(double, tag = "2")]
            pub target: f64,
            #[prost(double, tag = "3")]
            pub weight: f64,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct Pool {
            #[prost(message, repeated, tag = "1")]
            pub instances: Vec<Instance>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct TrainingRequest {
            #[prost(message, optional, tag = "1")]
            pub data: Option<Pool>,
            #[prost(bool, tag = "2")]
            pub store_model: bool,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct SimpleRegressionModel {
            #[prost(double, tag = "1")]
            pub coefficient: f64,
            #[prost(double, tag = "2")]
            pub intercept: f64,
            #[prost(string, tag = "3")]
            pub name: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct TrainingResults {
            #[prost(message, optional, tag = "1")]
            pub model: Option<SimpleRegressionModel>,
            #[prost(double, tag = "2")]
            pub sum_squared_errors: f64,
            #[prost(string, tag = "3")]
            pub name: String,
            #[prost(string, tag = "4")]
            pub creation_time: String,
            #[prost(string, tag = "5")]
            pub error: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct CalculateRequest {
            #[prost(double, tag = "1")]
            pub argument: f64,
            #[prost(string, tag = "2")]
            pub model_name: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct ModelValue {
            #[prost(double, tag = "1")]
            pub value: f64,
            #[prost(double, tag = "2")]
            pub argument: f64,
            #[prost(message, optional, tag = "3")]
            pub model: Option<SimpleRegressionModel>,
            #[prost(bool, tag = "4")]
            pub from_cache: bool,
            #[prost(string, tag = "5")]
            pub calculation_time: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct StatsRequest {}

        #[derive(Clone, PartialEq, Message)]
        pub struct ServerStats {
            #[prost(uint64, tag = "1")]
            pub total_requests: u64,
            #[prost(uint64, tag = "2")]
            pub succeeded_requests: u64,
            #[prost(uint64, tag = "3")]
            pub total_instances: u64,
        }

        pub mod regression_client {
            use super::*;
            use tonic::codegen::*;
            use tonic::transport::Uri;

            #[derive(Debug, Clone)]
            pub struct RegressionClient<T> {
                inner: tonic::client::Grpc<T>,
            }

            impl RegressionClient<tonic::transport::Channel> {
                pub fn new(channel: tonic::transport::Channel) -> Self {
                    let inner = tonic::client::Grpc::new(channel);
                    Self { inner }
                }

                /// Attempt to create a new client by connecting to a given endpoint
                pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
                where
                    D: TryInto<tonic::transport::Endpoint>,
                    D::Error: Into<StdError>,
                {
                    let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
                    Ok(Self::new(conn))
                }
            }

            impl<T> RegressionClient<T>
            where
                T: tonic::client::GrpcService<tonic::body::BoxBody>,
                T::Error: Into<StdError>,
                T::ResponseBody: Body<Data = Bytes> + Send + 'static,
                <T::ResponseBody as Body>::Error: Into<StdError> + Send,
            {
                pub fn with_origin(inner: T, origin: Uri) -> Self {
                    let inner = tonic::client::Grpc::with_origin(inner, origin);
                    Self { inner }
                }

                pub async fn train(
                    &mut self,
                    request: impl tonic::IntoRequest<TrainingRequest>,
                ) -> Result<tonic::Response<TrainingResults>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static("/slr.v1.Regression/Train");
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn calculate(
                    &mut self,
                    request: impl tonic::IntoRequest<CalculateRequest>,
                ) -> Result<tonic::Response<ModelValue>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path =
                        http::uri::PathAndQuery::from_static("/slr.v1.Regression/Calculate");
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn stats(
                    &mut self,
                    request: impl tonic::IntoRequest<StatsRequest>,
                ) -> Result<tonic::Response<ServerStats>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static("/slr.v1.Regression/Stats");
                    self.inner.unary(request.into_request(), path, codec).await
                }
            }
        }

        pub mod regression_server {
            use super::*;
            use tonic::codegen::*;

            #[async_trait]
            pub trait Regression: Send + Sync + 'static {
                async fn train(
                    &self,
                    request: tonic::Request<TrainingRequest>,
                ) -> Result<tonic::Response<TrainingResults>, tonic::Status>;

                async fn calculate(
                    &self,
                    request: tonic::Request<CalculateRequest>,
                ) -> Result<tonic::Response<ModelValue>, tonic::Status>;

                async fn stats(
                    &self,
                    request: tonic::Request<StatsRequest>,
                ) -> Result<tonic::Response<ServerStats>, tonic::Status>;
            }

            #[derive(Debug)]
            pub struct RegressionServer<T: Regression> {
                inner: Arc<T>,
            }

            impl<T: Regression> RegressionServer<T> {
                pub fn new(inner: T) -> Self {
                    Self::from_arc(Arc::new(inner))
                }

                pub fn from_arc(inner: Arc<T>) -> Self {
                    Self { inner }
                }
            }

            impl<T: Regression> Clone for RegressionServer<T> {
                fn clone(&self) -> Self {
                    Self {
                        inner: Arc::clone(&self.inner),
                    }
                }
            }

            struct TrainSvc<T: Regression>(Arc<T>);

            impl<T: Regression> tonic::server::UnaryService<TrainingRequest> for TrainSvc<T> {
                type Response = TrainingResults;
                type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;

                fn call(&mut self, request: tonic::Request<TrainingRequest>) -> Self::Future {
                    let inner = Arc::clone(&self.0);
                    Box::pin(async move { <T as Regression>::train(&inner, request).await })
                }
            }

            struct CalculateSvc<T: Regression>(Arc<T>);

            impl<T: Regression> tonic::server::UnaryService<CalculateRequest> for CalculateSvc<T> {
                type Response = ModelValue;
                type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;

                fn call(&mut self, request: tonic::Request<CalculateRequest>) -> Self::Future {
                    let inner = Arc::clone(&self.0);
                    Box::pin(async move { <T as Regression>::calculate(&inner, request).await })
                }
            }

            struct StatsSvc<T: Regression>(Arc<T>);

            impl<T: Regression> tonic::server::UnaryService<StatsRequest> for StatsSvc<T> {
                type Response = ServerStats;
                type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;

                fn call(&mut self, request: tonic::Request<StatsRequest>) -> Self::Future {
                    let inner = Arc::clone(&self.0);
                    Box::pin(async move { <T as Regression>::stats(&inner, request).await })
                }
            }

            impl<T, B> Service<http::Request<B>> for RegressionServer<T>
            where
                T: Regression,
                B: Body + Send + 'static,
                B::Error: Into<StdError> + Send + 'static,
            {
                type Response = http::Response<tonic::body::BoxBody>;
                type Error = std::convert::Infallible;
                type Future = BoxFuture<Self::Response, Self::Error>;

                fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
                    Poll::Ready(Ok(()))
                }

                fn call(&mut self, req: http::Request<B>) -> Self::Future {
                    let inner = Arc::clone(&self.inner);
                    match req.uri().path() {
                        "/slr.v1.Regression/Train" => Box::pin(async move {
                            let mut grpc =
                                tonic::server::Grpc::new(tonic::codec::ProstCodec::default());
                            Ok(grpc.unary(TrainSvc(inner), req).await)
                        }),
                        "/slr.v1.Regression/Calculate" => Box::pin(async move {
                            let mut grpc =
                                tonic::server::Grpc::new(tonic::codec::ProstCodec::default());
                            Ok(grpc.unary(CalculateSvc(inner), req).await)
                        }),
                        "/slr.v1.Regression/Stats" => Box::pin(async move {
                            let mut grpc =
                                tonic::server::Grpc::new(tonic::codec::ProstCodec::default());
                            Ok(grpc.unary(StatsSvc(inner), req).await)
                        }),
                        _ => Box::pin(async move {
                            let mut response = http::Response::new(empty_body());
                            let headers = response.headers_mut();
                            headers.insert(
                                "grpc-status",
                                http::HeaderValue::from_static("12"),
                            );
                            headers.insert(
                                http::header::CONTENT_TYPE,
                                http::HeaderValue::from_static("application/grpc"),
                            );
                            Ok(response)
                        }),
                    }
                }
            }

            impl<T: Regression> tonic::server::NamedService for RegressionServer<T> {
                const NAME: &'static str = "slr.v1.Regression";
            }
        }
    }
}

pub use slr::v1::regression_client::RegressionClient;
pub use slr::v1::regression_server::{Regression, RegressionServer};
pub use slr::v1::*;
