#![allow(dead_code)]

use std::time::Duration;

use kaspi_core::config::Config as ServerConfig;
use kaspi_core::CapabilityTier;
use kaspi_gateway::config::{GatewayConfig, KaspiConfig};
use kaspi_gateway::grpc::proto::{
    device_service_client::DeviceServiceClient,
    enhanced_refund_service_client::EnhancedRefundServiceClient,
    payment_service_client::PaymentServiceClient, refund_service_client::RefundServiceClient,
    utility_service_client::UtilityServiceClient,
};
use kaspi_gateway::startup::Application;
use reqwest::Url;
use secrecy::Secret;
use serde_json::{json, Value};
use tonic::transport::Channel;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

/// Path prefix the mock provider serves under.
pub const PROVIDER_PREFIX: &str = "/r3/v01";

pub struct TestApp {
    pub http_address: String,
    pub grpc_address: String,
    pub provider: MockServer,
    pub http: reqwest::Client,
}

impl TestApp {
    pub async fn spawn(tier: CapabilityTier) -> Self {
        let provider = MockServer::start().await;

        let config = GatewayConfig {
            server: ServerConfig {
                port: 0,
                grpc_port: 0,
                ..ServerConfig::default()
            },
            kaspi: KaspiConfig {
                base_url: Url::parse(&format!("{}{}/", provider.uri(), PROVIDER_PREFIX))
                    .expect("mock provider URL"),
                api_key: Secret::new("test-api-key".to_string()),
                timeout: Duration::from_secs(2),
                max_concurrent_requests: 8,
                pool_max_idle_per_host: 2,
            },
            tier,
            database: None,
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let http_port = app.http_port();
        let grpc_port = app.grpc_port();
        let http_address = format!("http://127.0.0.1:{}", http_port);
        let grpc_address = format!("http://127.0.0.1:{}", grpc_port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the HTTP server by polling the health endpoint
        let http = reqwest::Client::new();
        let health_url = format!("{}/health", http_address);
        for _ in 0..50 {
            if http.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        // Additional wait for the gRPC server
        tokio::time::sleep(Duration::from_millis(100)).await;

        TestApp {
            http_address,
            grpc_address,
            provider,
            http,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.http_address, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.http
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post(&self, path: &str, body: &Value) -> reqwest::Response {
        self.http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn channel(&self) -> Channel {
        Channel::from_shared(self.grpc_address.clone())
            .expect("valid gRPC address")
            .connect()
            .await
            .expect("Failed to connect to gRPC server")
    }

    pub async fn device_client(&self) -> DeviceServiceClient<Channel> {
        DeviceServiceClient::new(self.channel().await)
    }

    pub async fn payment_client(&self) -> PaymentServiceClient<Channel> {
        PaymentServiceClient::new(self.channel().await)
    }

    pub async fn refund_client(&self) -> RefundServiceClient<Channel> {
        RefundServiceClient::new(self.channel().await)
    }

    pub async fn utility_client(&self) -> UtilityServiceClient<Channel> {
        UtilityServiceClient::new(self.channel().await)
    }

    pub async fn enhanced_client(&self) -> EnhancedRefundServiceClient<Channel> {
        EnhancedRefundServiceClient::new(self.channel().await)
    }

    /// Answer `method path` on the provider with a success envelope.
    pub async fn provider_ok(&self, http_method: &str, path: &str, data: Value) {
        Mock::given(matchers::method(http_method))
            .and(matchers::path(format!("{}{}", PROVIDER_PREFIX, path)))
            .respond_with(envelope(0, None, data))
            .mount(&self.provider)
            .await;
    }

    /// Answer `method path` on the provider with an error envelope.
    pub async fn provider_error(&self, http_method: &str, path: &str, code: i64, message: &str) {
        Mock::given(matchers::method(http_method))
            .and(matchers::path(format!("{}{}", PROVIDER_PREFIX, path)))
            .respond_with(envelope(code, Some(message), Value::Null))
            .mount(&self.provider)
            .await;
    }

    /// Fail the test on drop if the provider sees any request at all.
    pub async fn expect_no_provider_calls(&self) {
        Mock::given(matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.provider)
            .await;
    }

    pub async fn provider_request_count(&self) -> usize {
        self.provider
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }
}

pub fn envelope(code: i64, message: Option<&str>, data: Value) -> ResponseTemplate {
    let mut body = json!({ "StatusCode": code });
    if let Some(message) = message {
        body["Message"] = json!(message);
    }
    if !data.is_null() {
        body["Data"] = data;
    }
    ResponseTemplate::new(200).set_body_json(body)
}

pub fn qr_token_data() -> Value {
    json!({
        "QrToken": "51236903777280167836178166503744573",
        "ExpireDate": "2024-01-01T12:00:00+06:00",
        "QrPaymentId": 15,
        "PaymentMethods": ["Gold", "Red", "Loan"],
        "QrPaymentBehaviorOptions": {
            "StatusPollingInterval": 5,
            "QrCodeScanWaitTimeout": 180,
            "PaymentConfirmationTimeout": 65
        }
    })
}
