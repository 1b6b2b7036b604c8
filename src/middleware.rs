// Middleware and Extension Traits

use crate::types::*;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait RequestMiddleware: Send + Sync {
    /// Process and possibly modify the call before it is sent
    async fn process_call(&self, call: RpcCall) -> Result<RpcCall, ErpError>;
}

#[async_trait]
pub trait ResponseMiddleware: Send + Sync {
    /// Process and possibly modify the result after it is received
    async fn process_result(&self, result: Value) -> Result<Value, ErpError>;
}
