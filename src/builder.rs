// RPC Call Builder

use crate::client::OpenErp;
use crate::types::*;
use crate::utils::StringValidator;

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// A struct for building RPC calls with a fluent interface.
///
/// A call addresses a service (`object` for model methods, `common` for
/// session-level ones), a method, and a positional argument frame. For
/// the `object` service the builder assembles the authenticated
/// `execute_kw` frame — database, uid, password, model, method, args,
/// keyword arguments — and logs in first when no uid is cached yet.
pub struct CallBuilder {
    client: Arc<OpenErp>,
    service: String,
    model: Option<ErpModel>,
    method: Option<String>,
    args: Vec<Value>,
    kwargs: serde_json::Map<String, Value>,
    context: serde_json::Map<String, Value>,
}

impl CallBuilder {
    pub(crate) fn from_client(client: Arc<OpenErp>) -> Self {
        Self {
            client,
            service: "object".to_string(),
            model: None,
            method: None,
            args: Vec::new(),
            kwargs: serde_json::Map::new(),
            context: serde_json::Map::new(),
        }
    }

    /// Address a service other than the default `object` one
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// The model an object call operates on
    pub fn model(mut self, model: ErpModel) -> Self {
        self.model = Some(model);
        self
    }

    /// The method to invoke (a model method for `object` calls)
    pub fn method(mut self, method: impl Into<String>) -> ErpResult<Self> {
        self.method = Some(StringValidator::not_empty(method, "method")?);
        Ok(self)
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Append a positional argument from any serializable value
    pub fn serialized_arg(mut self, value: impl Serialize) -> ErpResult<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| ErpError::ConversionError(e.to_string()))?;
        self.args.push(value);
        Ok(self)
    }

    /// Set a keyword argument for an `execute_kw` call
    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    /// Set a per-call context entry, overriding the client default
    pub fn context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Assemble the call, authenticating first for object calls
    async fn prepare_call(&self) -> ErpResult<RpcCall> {
        let method = self.method.clone().ok_or_else(|| {
            ErpError::ValidationError("An RPC method is required".to_string())
        })?;

        if self.service != "object" {
            return Ok(RpcCall {
                service: self.service.clone(),
                method,
                args: self.args.clone(),
            });
        }

        let model = self.model.clone().ok_or_else(|| {
            ErpError::ValidationError("A model is required for object calls".to_string())
        })?;

        let uid = self.client.ensure_uid().await?;

        let mut kwargs = self.kwargs.clone();
        let mut context = self.client.default_context.clone();
        for (k, v) in &self.context {
            context.insert(k.clone(), v.clone());
        }
        if !context.is_empty() {
            kwargs.insert("context".to_string(), Value::Object(context));
        }

        let frame = vec![
            Value::from(self.client.database.clone()),
            Value::from(uid),
            Value::from(self.client.password.as_str()),
            Value::from(model.as_str()),
            Value::from(method),
            Value::Array(self.args.clone()),
            Value::Object(kwargs),
        ];

        Ok(RpcCall {
            service: "object".to_string(),
            method: "execute_kw".to_string(),
            args: frame,
        })
    }

    /// Handle error responses from the server
    ///
    /// Maps non-success HTTP statuses to errors with a sanitized body.
    async fn handle_error_response(
        &self,
        response: reqwest::Response,
    ) -> ErpResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let sanitized_error = sanitize_error_message(&error_text);

        Err(ErpError::api_error(
            sanitized_error,
            Some(status),
            None,
            Some(concat!(file!(), ":", line!())),
        ))
    }

    /// Send the call and get its result value
    ///
    /// Applies request middleware, dispatches to the mock handler when
    /// one is installed, decodes the JSON-RPC envelope, maps `error`
    /// members to faults, and applies response middleware.
    pub async fn send(self) -> ErpResult<Value> {
        let mut call = self.prepare_call().await?;

        for middleware in &self.client.request_middleware {
            call = middleware.process_call(call).await?;
        }

        let mut result = self.execute_call(call).await?;

        for middleware in &self.client.response_middleware {
            result = middleware.process_result(result).await?;
        }

        Ok(result)
    }

    /// Execute a call, potentially using a mock handler if one is available
    async fn execute_call(&self, call: RpcCall) -> ErpResult<Value> {
        if let Some(handler) = self.client.current_rpc_handler() {
            return handler(call).await;
        }

        let endpoint = format!("{}/jsonrpc", self.client.base_url);
        let request = RpcRequest::new(call, self.client.next_call_id());
        log::debug!(
            "rpc call {}.{} -> {}",
            request.params.service,
            request.params.method,
            endpoint
        );

        let response = self
            .client
            .http_client
            .post(&endpoint)
            .json(&request)
            .send()
            .await?;

        let response = self.handle_error_response(response).await?;

        let envelope: RpcResponse = response.json().await.map_err(|e| {
            ErpError::parse_error(
                e.to_string(),
                None,
                Some(e),
                Some(concat!(file!(), ":", line!())),
            )
        })?;

        if let Some(error) = envelope.error {
            let data = error
                .data
                .as_ref()
                .map(|d| sanitize_error_message(&d.to_string()));
            return Err(ErpError::rpc_fault(
                error.code,
                sanitize_error_message(&error.message),
                data,
                Some(concat!(file!(), ":", line!())),
            ));
        }

        Ok(envelope.result.unwrap_or(Value::Null))
    }
}
