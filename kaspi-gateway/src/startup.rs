//! Application startup and lifecycle management.
//!
//! Serves the HTTP/JSON surface and the gRPC surface side by side. Both sit
//! behind the same capability gate and share one [`PaymentGateway`].

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use kaspi_core::error::ApiErrorBody;
use kaspi_core::grpc::{metrics_interceptor, trace_context_interceptor, CapabilityLayer};
use kaspi_core::middleware::{
    capability_middleware, metrics_middleware, request_id_middleware, REQUEST_ID_HEADER,
};
use kaspi_core::{ErrorKind, ErrorOutcome};
use mongodb::{options::ClientOptions, Client};
use reqwest::Url;
use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tonic::transport::Server as GrpcServer;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::{DatabaseConfig, GatewayConfig};
use crate::grpc::proto::{
    device_service_server::DeviceServiceServer,
    enhanced_refund_service_server::EnhancedRefundServiceServer,
    payment_service_server::PaymentServiceServer, refund_service_server::RefundServiceServer,
    utility_service_server::UtilityServiceServer, FILE_DESCRIPTOR_SET,
};
use crate::grpc::{
    DeviceGrpcService, EnhancedRefundGrpcService, PaymentGrpcService, RefundGrpcService,
    UtilityGrpcService,
};
use crate::handlers::{self, devices, enhanced, payments, refunds, utility};
use crate::operations;
use crate::services::{
    init_metrics, DeviceTokenStore, InMemoryDeviceTokenStore, KaspiClient, MongoDeviceTokenStore,
    PaymentGateway,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub gateway: PaymentGateway,
}

/// HTTP router with every gated route and the infrastructure endpoints.
pub fn build_router(state: AppState) -> Router {
    let gate = state.gateway.gate().clone();
    let gated = |operation: &'static str, route: MethodRouter<AppState>| {
        route
            .route_layer(from_fn_with_state(
                gate.guard(operation),
                capability_middleware,
            ))
            .fallback(method_not_allowed)
    };

    let api = Router::new()
        // Devices
        .route(
            "/trade-points",
            gated(operations::GET_TRADE_POINTS, get(devices::trade_points)),
        )
        .route(
            "/devices/register",
            gated(operations::REGISTER_DEVICE, post(devices::register_device)),
        )
        .route(
            "/devices/delete",
            gated(operations::DELETE_DEVICE, post(devices::delete_device)),
        )
        // Payments
        .route(
            "/payments/qr",
            gated(operations::CREATE_QR_TOKEN, post(payments::create_qr_token)),
        )
        .route(
            "/payments/link",
            gated(
                operations::CREATE_PAYMENT_LINK,
                post(payments::create_payment_link),
            ),
        )
        .route(
            "/payments/:qr_payment_id/status",
            gated(operations::GET_PAYMENT_STATUS, get(payments::payment_status)),
        )
        // Refunds
        .route(
            "/refunds/qr",
            gated(
                operations::CREATE_REFUND_QR_TOKEN,
                post(refunds::create_refund_qr_token),
            ),
        )
        .route(
            "/refunds/:qr_return_id/status",
            gated(operations::GET_REFUND_STATUS, get(refunds::refund_status)),
        )
        .route(
            "/refunds/operations",
            gated(
                operations::LIST_REFUND_OPERATIONS,
                post(refunds::refund_operations),
            ),
        )
        .route(
            "/refunds/operations/details",
            gated(
                operations::GET_OPERATION_DETAILS,
                post(refunds::operation_details),
            ),
        )
        .route(
            "/refunds/return",
            gated(operations::RETURN_PAYMENT, post(refunds::return_payment)),
        )
        // Utility
        .route(
            "/capabilities",
            gated(operations::GET_CAPABILITIES, get(utility::capabilities)),
        )
        .route(
            "/test/scan",
            gated(operations::SIMULATE_SCAN, post(utility::simulate_scan)),
        )
        .route(
            "/test/scan-error",
            gated(
                operations::SIMULATE_SCAN_ERROR,
                post(utility::simulate_scan_error),
            ),
        )
        .route(
            "/test/confirm",
            gated(operations::SIMULATE_CONFIRM, post(utility::simulate_confirm)),
        )
        .route(
            "/test/confirm-error",
            gated(
                operations::SIMULATE_CONFIRM_ERROR,
                post(utility::simulate_confirm_error),
            ),
        )
        // Enhanced refunds
        .route(
            "/enhanced/payments/:qr_payment_id/details",
            gated(
                operations::GET_PAYMENT_DETAILS,
                get(enhanced::payment_details),
            ),
        )
        .route(
            "/enhanced/refunds",
            gated(operations::REFUND_PAYMENT, post(enhanced::refund_payment)),
        );

    Router::new()
        .route(
            "/health",
            get(handlers::health_check).fallback(method_not_allowed),
        )
        .route(
            "/ready",
            get(handlers::readiness_check).fallback(method_not_allowed),
        )
        .route(
            "/metrics",
            get(handlers::metrics_endpoint).fallback(method_not_allowed),
        )
        .nest("/api/v1", api)
        .fallback(route_not_found)
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .with_state(state)
}

async fn route_not_found() -> ErrorOutcome {
    ErrorOutcome::new(ErrorKind::NotFound, "Route not found")
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ApiErrorBody {
            success: false,
            error: "Method not allowed".to_string(),
        }),
    )
        .into_response()
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    grpc_port: u16,
    http_listener: TcpListener,
    grpc_listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    ///
    /// Fails if the provider host does not resolve, the device store cannot
    /// be reached, or a listener cannot be bound.
    pub async fn build(config: GatewayConfig) -> anyhow::Result<Self> {
        init_metrics().context("failed to install metrics recorder")?;

        ensure_resolvable(&config.kaspi.base_url).await?;

        let devices: Arc<dyn DeviceTokenStore> = match &config.database {
            Some(database) => Arc::new(connect_device_store(database).await?),
            None => {
                tracing::warn!(
                    "MONGODB_URI not configured - device tokens are kept in memory only"
                );
                Arc::new(InMemoryDeviceTokenStore::new())
            }
        };

        let provider = KaspiClient::new(&config.kaspi).context("failed to build Kaspi client")?;
        let gateway = PaymentGateway::new(
            Arc::new(provider),
            devices,
            operations::gate(config.tier),
        );
        let state = AppState { gateway };

        // Port 0 binds a random port (tests)
        let http_addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
        let http_listener = TcpListener::bind(http_addr)
            .await
            .with_context(|| format!("failed to bind HTTP listener to {}", http_addr))?;
        let http_port = http_listener.local_addr()?.port();

        let grpc_addr = SocketAddr::from(([0, 0, 0, 0], config.server.grpc_port));
        let grpc_listener = TcpListener::bind(grpc_addr)
            .await
            .with_context(|| format!("failed to bind gRPC listener to {}", grpc_addr))?;
        let grpc_port = grpc_listener.local_addr()?.port();

        tracing::info!(
            http_port,
            grpc_port,
            tier = %config.tier,
            provider = %config.kaspi.base_url,
            "Kaspi gateway ready"
        );

        Ok(Self {
            http_port,
            grpc_port,
            http_listener,
            grpc_listener,
            state,
        })
    }

    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    pub fn grpc_port(&self) -> u16 {
        self.grpc_port
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Run both servers until one fails or the process is interrupted.
    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        let gateway = self.state.gateway.clone();
        let http_router = build_router(self.state);

        let (mut health_reporter, grpc_health_service) = tonic_health::server::health_reporter();
        health_reporter
            .set_serving::<DeviceServiceServer<DeviceGrpcService>>()
            .await;
        health_reporter
            .set_serving::<PaymentServiceServer<PaymentGrpcService>>()
            .await;
        health_reporter
            .set_serving::<RefundServiceServer<RefundGrpcService>>()
            .await;
        health_reporter
            .set_serving::<UtilityServiceServer<UtilityGrpcService>>()
            .await;
        health_reporter
            .set_serving::<EnhancedRefundServiceServer<EnhancedRefundGrpcService>>()
            .await;

        let reflection_service = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()
            .context("failed to build reflection service")?;

        let layer = ServiceBuilder::new()
            .layer(tonic::service::interceptor(trace_context_interceptor))
            .layer(tonic::service::interceptor(metrics_interceptor))
            .layer(CapabilityLayer::new(gateway.gate().clone(), operations::PACKAGE))
            .into_inner();

        let incoming = tokio_stream::wrappers::TcpListenerStream::new(self.grpc_listener);
        let grpc_server = GrpcServer::builder()
            .layer(layer)
            .add_service(grpc_health_service)
            .add_service(reflection_service)
            .add_service(DeviceServiceServer::new(DeviceGrpcService::new(
                gateway.clone(),
            )))
            .add_service(PaymentServiceServer::new(PaymentGrpcService::new(
                gateway.clone(),
            )))
            .add_service(RefundServiceServer::new(RefundGrpcService::new(
                gateway.clone(),
            )))
            .add_service(UtilityServiceServer::new(UtilityGrpcService::new(
                gateway.clone(),
            )))
            .add_service(EnhancedRefundServiceServer::new(
                EnhancedRefundGrpcService::new(gateway),
            ))
            .serve_with_incoming(incoming);

        tokio::select! {
            result = axum::serve(self.http_listener, http_router) => {
                result.context("HTTP server error")?;
            }
            result = grpc_server => {
                result.context("gRPC server error")?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
            }
        }

        Ok(())
    }
}

/// Fail fast when the provider host cannot be resolved.
async fn ensure_resolvable(base_url: &Url) -> anyhow::Result<()> {
    let host = base_url
        .host_str()
        .context("Kaspi base URL has no host")?;
    let port = base_url.port_or_known_default().unwrap_or(443);

    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("Kaspi base URL host '{}' does not resolve", host))?;
    if addrs.next().is_none() {
        anyhow::bail!("Kaspi base URL host '{}' resolved to no addresses", host);
    }

    Ok(())
}

async fn connect_device_store(database: &DatabaseConfig) -> anyhow::Result<MongoDeviceTokenStore> {
    let mut client_options = ClientOptions::parse(database.uri.expose_secret())
        .await
        .context("failed to parse MongoDB connection string")?;
    client_options.app_name = Some("kaspi-gateway".to_string());

    let client = Client::with_options(client_options).context("failed to create MongoDB client")?;
    let store = MongoDeviceTokenStore::new(&client.database(&database.name));
    store
        .init_indexes()
        .await
        .context("failed to initialize device store indexes")?;

    tracing::info!(database = %database.name, "Device store connected");
    Ok(store)
}
