use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde_json::Value;

use estate_server::config::{
    AppConfig, AppEnvironment, CorsConfig, DatabaseConfig, ServerConfig, StoreBackend,
};
use estate_server::entity::{Owner, Property, PropertyImage, PropertyTrace};
use estate_server::error::AppError;
use estate_server::models::property::PropertyFilter;
use estate_server::repository::{MemoryPropertyRepository, PropertyRepository};
use estate_server::state::AppState;

pub mod routes {
    pub const PROPERTIES: &str = "/api/properties";
    pub const FILTER: &str = "/api/properties/filter";
    pub const OPENAPI: &str = "/api-docs/openapi.json";

    pub fn property(id: &str) -> String {
        format!("/api/properties/{id}")
    }
}

/// A running test server.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub repo: Arc<dyn PropertyRepository>,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// `x-request-id` response header, if present.
    pub request_id: Option<String>,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

pub fn test_config(environment: AppEnvironment) -> AppConfig {
    AppConfig {
        environment,
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors: CorsConfig {
                allow_origins: vec![],
                max_age: 3600,
            },
        },
        database: DatabaseConfig {
            backend: StoreBackend::Memory,
            url: String::new(),
            name: "RealEstateTest".to_string(),
            collection: "Properties".to_string(),
            max_pool_size: 10,
            connect_timeout_ms: 1000,
            operation_timeout_ms: 1000,
            seed_file: None,
        },
    }
}

impl TestApp {
    /// Production-mode server over an empty in-memory store.
    pub async fn spawn() -> Self {
        Self::spawn_with(
            Arc::new(MemoryPropertyRepository::new()),
            AppEnvironment::Production,
        )
        .await
    }

    pub async fn spawn_with(
        repo: Arc<dyn PropertyRepository>,
        environment: AppEnvironment,
    ) -> Self {
        let state = AppState {
            properties: repo.clone(),
            config: test_config(environment),
        };
        let app = estate_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            repo,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_query(&self, path: &str, query: &[(&str, &str)]) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_request_id(&self, path: &str, request_id: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("x-request-id", request_id)
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    /// Store `property` and return its assigned id.
    pub async fn insert(&self, property: Property) -> String {
        self.repo
            .create(property)
            .await
            .expect("Failed to insert property")
            .id
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let request_id = res
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let text = res.text().await.expect("Failed to read response body");
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self {
            status,
            request_id,
            text,
            body,
        }
    }

    /// Assert the standard error envelope and return its `message`.
    pub fn assert_error(&self, status: u16, kind: &str) -> &str {
        assert_eq!(self.status, status, "unexpected status: {}", self.text);
        assert_eq!(self.body["statusCode"], status);
        assert_eq!(self.body["type"], kind);
        assert!(
            self.body["traceId"].is_string(),
            "missing traceId: {}",
            self.text
        );
        assert!(
            self.body["timestamp"].is_string(),
            "missing timestamp: {}",
            self.text
        );
        self.body["message"].as_str().expect("message is a string")
    }
}

/// Property with one owner, two images (first disabled) and one sale.
pub fn property(name: &str, address: &str, price: f64) -> Property {
    Property {
        id: String::new(),
        name: name.to_string(),
        address: address.to_string(),
        price,
        code_internal: "CA-001".to_string(),
        year: 2020,
        owner: Some(Owner {
            owner_id: "7".to_string(),
            name: "María Gómez".to_string(),
            address: "Calle 10 #43-12, Medellín".to_string(),
            photo: Some("https://picsum.photos/id/7/200/300".to_string()),
            birthday: Utc.with_ymd_and_hms(1985, 6, 15, 0, 0, 0).unwrap(),
        }),
        images: Some(vec![
            PropertyImage {
                image_id: "1".to_string(),
                file: "https://picsum.photos/id/1/800/600".to_string(),
                enabled: false,
            },
            PropertyImage {
                image_id: "2".to_string(),
                file: "https://picsum.photos/id/2/800/600".to_string(),
                enabled: true,
            },
        ]),
        traces: Some(vec![PropertyTrace {
            trace_id: "1".to_string(),
            name: "Venta inicial".to_string(),
            date_sale: Utc.with_ymd_and_hms(2022, 3, 1, 0, 0, 0).unwrap(),
            value: price * 0.9,
            tax: price * 0.02,
        }]),
    }
}

/// Property stored with nothing but its scalar fields.
pub fn bare_property(name: &str, price: f64) -> Property {
    Property {
        owner: None,
        images: None,
        traces: None,
        ..property(name, "Sin dirección", price)
    }
}

/// How [`FaultyRepository`] fails.
#[derive(Clone, Copy)]
pub enum Fault {
    /// Every call fails like an unreachable store.
    Database,
    /// Every call fails with an unclassified error.
    Unclassified,
    /// Every call panics.
    Panic,
}

pub struct FaultyRepository(pub Fault);

impl FaultyRepository {
    fn fail<T>(&self) -> Result<T, AppError> {
        match self.0 {
            Fault::Database => Err(AppError::database(
                "Failed to retrieve properties from database",
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            )),
            Fault::Unclassified => Err(AppError::internal("cursor closed unexpectedly")),
            Fault::Panic => panic!("store driver crashed"),
        }
    }
}

#[async_trait]
impl PropertyRepository for FaultyRepository {
    async fn get_all(&self) -> Result<Vec<Property>, AppError> {
        self.fail()
    }
    async fn get_by_id(&self, _id: &str) -> Result<Option<Property>, AppError> {
        self.fail()
    }
    async fn get_filtered(&self, _filter: &PropertyFilter) -> Result<Vec<Property>, AppError> {
        self.fail()
    }
    async fn create(&self, _property: Property) -> Result<Property, AppError> {
        self.fail()
    }
    async fn replace(&self, _id: &str, _property: Property) -> Result<bool, AppError> {
        self.fail()
    }
    async fn delete(&self, _id: &str) -> Result<(), AppError> {
        self.fail()
    }
    async fn count(&self) -> Result<u64, AppError> {
        self.fail()
    }
}
