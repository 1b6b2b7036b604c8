// Core Client Implementation

use crate::builder::CallBuilder;
use crate::middleware::{RequestMiddleware, ResponseMiddleware};
use crate::models::*;
use crate::types::*;
use crate::utils::rpc_decode;
use lazy_static::lazy_static;
use reqwest::{header, Client as HttpClient};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

// Type aliases to simplify complex types
/// Result of a single RPC call
pub type CallFuture = Pin<Box<dyn Future<Output = ErpResult<Value>> + Send>>;

/// Function that processes an RPC call and returns a future
type RpcHandlerFn = dyn Fn(RpcCall) -> CallFuture + Send + Sync + 'static;

/// Trait for mocking the RPC endpoint for testing purposes
pub trait MockRpcHandler: Send + Sync {
    /// Process a call and return its result value
    fn process_call(&self, call: RpcCall) -> CallFuture;
}

lazy_static! {
    static ref CLIENT_CONFIG: Mutex<TlsConfig> = Mutex::new(TlsConfig::default());
}

/// Configuration for TLS
#[derive(Clone, Debug)]
pub struct TlsConfig {
    pub min_tls_version: Option<reqwest::tls::Version>,
    pub cert_verification: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            min_tls_version: Some(reqwest::tls::Version::TLS_1_2),
            cert_verification: true,
        }
    }
}

/// Set global TLS configuration for all clients
pub fn set_tls_config(config: TlsConfig) {
    if let Ok(mut cfg) = CLIENT_CONFIG.lock() {
        *cfg = config;
    }
}

fn build_http_client(tls_config: &TlsConfig, timeout: Duration) -> HttpClient {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );

    let mut builder = HttpClient::builder()
        .default_headers(headers)
        .timeout(timeout)
        .danger_accept_invalid_certs(!tls_config.cert_verification);

    if let Some(version) = tls_config.min_tls_version {
        builder = builder.min_tls_version(version);
    }

    builder.build().expect("Failed to create HTTP client")
}

#[derive(Clone)]
pub struct OpenErp {
    pub(crate) http_client: HttpClient,
    pub base_url: String, // Made public for testing
    pub(crate) database: String,
    pub(crate) login: String,
    pub(crate) password: SecurePassword,
    pub(crate) uid: Arc<Mutex<Option<RecordId>>>,
    pub(crate) default_context: serde_json::Map<String, Value>,
    pub(crate) request_middleware: Vec<Arc<dyn RequestMiddleware>>,
    pub(crate) response_middleware: Vec<Arc<dyn ResponseMiddleware>>,
    model_registry: Arc<OnceLock<Arc<ModelClientRegistry>>>,
    pub(crate) rpc_handler: Arc<Mutex<Option<Arc<RpcHandlerFn>>>>,
    call_counter: Arc<AtomicU64>,
}

impl OpenErp {
    /// Create a new client for the given database and credentials
    ///
    /// The base URL defaults to a local server on the conventional port;
    /// override it with [`OpenErp::with_base_url`].
    pub fn new(
        database: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let tls_config = match CLIENT_CONFIG.lock() {
            Ok(guard) => {
                let config = guard.clone();
                drop(guard);
                config
            }
            Err(_) => TlsConfig::default(),
        };

        Self::with_tls_config(database, login, password, tls_config)
    }

    /// Set custom RPC handler for this client
    /// This is useful for testing
    pub fn set_rpc_handler<F>(&self, handler: Box<F>)
    where
        F: Fn(RpcCall) -> CallFuture + Send + Sync + 'static,
    {
        if let Ok(mut guard) = self.rpc_handler.lock() {
            *guard = Some(Arc::new(move |call| handler(call)));
        }
    }

    fn with_tls_config(
        database: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
        tls_config: TlsConfig,
    ) -> Self {
        Self {
            http_client: build_http_client(&tls_config, Duration::from_secs(300)),
            base_url: "http://localhost:8069".to_string(),
            database: database.into(),
            login: login.into(),
            password: SecurePassword::new(password),
            uid: Arc::new(Mutex::new(None)),
            default_context: serde_json::Map::new(),
            request_middleware: Vec::new(),
            response_middleware: Vec::new(),
            model_registry: Arc::new(OnceLock::new()),
            rpc_handler: Arc::new(Mutex::new(None)),
            call_counter: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Set a custom base URL for the server
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout, rebuilding the underlying HTTP client
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let tls_config = match CLIENT_CONFIG.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => TlsConfig::default(),
        };
        self.http_client = build_http_client(&tls_config, timeout);
        self
    }

    /// Add an entry to the default call context (e.g. `lang`, `tz`)
    ///
    /// The context rides along with every object call; per-call entries
    /// set on the builder override these.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_context.insert(key.into(), value.into());
        self
    }

    /// Add middleware that processes calls before they're sent
    pub fn add_request_middleware(mut self, middleware: impl RequestMiddleware + 'static) -> Self {
        self.request_middleware.push(Arc::new(middleware));
        self
    }

    /// Add middleware that processes results after they're received
    pub fn add_response_middleware(mut self, middleware: impl ResponseMiddleware + 'static) -> Self {
        self.response_middleware.push(Arc::new(middleware));
        self
    }

    /// Create a call builder for constructing an RPC request
    pub fn call(&self) -> CallBuilder {
        CallBuilder::from_client(Arc::new(self.clone()))
    }

    /// Get a handle bound to one remote model
    pub fn model(&self, model: ErpModel) -> ModelHandle {
        ModelHandle::new(Arc::new(self.clone()), model)
    }

    /// Get the model client registry
    pub fn models(&self) -> Arc<ModelClientRegistry> {
        self.model_registry
            .get_or_init(|| {
                let erp = Arc::new(self.clone());
                Arc::new(ModelClientRegistry::new(erp))
            })
            .clone()
    }

    /// Get the partner record-mapping client
    pub fn partners(&self) -> Arc<PartnerClient> {
        self.models().partner()
    }

    /// Register a custom model client
    pub fn register_model<T: ModelClient + 'static>(&self, name: &str, client: T) -> &Self {
        self.models().register(name, client);
        self
    }

    /// Get a custom model client by name
    pub fn get_model(&self, name: &str) -> Option<Arc<dyn ModelClient>> {
        self.models().get(name)
    }

    /// The database this client is bound to
    pub fn database(&self) -> &str {
        &self.database
    }

    /// The login this client authenticates as
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Log in against the `common` service and cache the user id
    pub async fn authenticate(&self) -> ErpResult<RecordId> {
        let result = self
            .call()
            .service("common")
            .method("login")?
            .arg(self.database.clone())
            .arg(self.login.clone())
            .arg(self.password.as_str())
            .send()
            .await?;

        // A falsy result means the server rejected the credentials
        let uid = rpc_decode::record_id(&result)
            .filter(|id| *id > 0)
            .ok_or_else(|| ErpError::AuthenticationFailed {
                login: self.login.clone(),
                database: self.database.clone(),
                location: None,
            })?;

        if let Ok(mut guard) = self.uid.lock() {
            *guard = Some(uid);
        }
        log::debug!("authenticated as uid {} on {}", uid, self.database);
        Ok(uid)
    }

    /// The cached uid, logging in first if no call has authenticated yet
    pub(crate) async fn ensure_uid(&self) -> ErpResult<RecordId> {
        if let Some(uid) = self.cached_uid() {
            return Ok(uid);
        }
        Box::pin(self.authenticate()).await
    }

    fn cached_uid(&self) -> Option<RecordId> {
        self.uid.lock().ok().and_then(|guard| *guard)
    }

    pub(crate) fn next_call_id(&self) -> u64 {
        self.call_counter.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn current_rpc_handler(&self) -> Option<Arc<RpcHandlerFn>> {
        self.rpc_handler.lock().ok().and_then(|guard| guard.clone())
    }

    /// Create a new client with a mock RPC endpoint for testing
    ///
    /// The uid is pre-seeded so object calls reach the mock without a
    /// login round trip; exercise [`OpenErp::authenticate`] against the
    /// handler directly when the login flow itself is under test.
    pub fn with_mock_rpc<T>(
        database: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
        mock: T,
    ) -> Self
    where
        T: Into<Arc<dyn MockRpcHandler>> + Send + Sync + 'static,
    {
        let client = Self::new(database, login, password);

        let mock_handler = mock.into();
        client.set_rpc_handler(Box::new(move |call: RpcCall| {
            let mock = mock_handler.clone();
            mock.process_call(call)
        }));

        if let Ok(mut guard) = client.uid.lock() {
            *guard = Some(1);
        }

        client
    }
}
