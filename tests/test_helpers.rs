use openerp_rs::client::CallFuture;
use openerp_rs::{ErpError, MockRpcHandler, OpenErp, RpcCall};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A scripted RPC endpoint for tests
///
/// Canned results are keyed by (model, method) for object calls and by
/// method for common-service calls. Queued results are consumed in
/// order and the last one sticks, so a repeated search replays the
/// final answer.
#[allow(dead_code)]
pub struct MockRpcClient {
    object_responses: Mutex<HashMap<(String, String), Vec<Value>>>,
    common_responses: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<RpcCall>>,
}

impl Default for MockRpcClient {
    fn default() -> Self {
        Self {
            object_responses: Mutex::new(HashMap::new()),
            common_responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

/// Decoded view of one recorded execute_kw frame
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct ObjectCall {
    pub model: String,
    pub method: String,
    pub args: Vec<Value>,
    pub kwargs: Value,
}

#[allow(dead_code)]
pub fn parse_object_call(call: &RpcCall) -> Option<ObjectCall> {
    if call.service != "object" {
        return None;
    }
    let model = call.args.get(3)?.as_str()?.to_string();
    let method = call.args.get(4)?.as_str()?.to_string();
    let args = call.args.get(5)?.as_array()?.clone();
    let kwargs = call.args.get(6).cloned().unwrap_or(Value::Null);
    Some(ObjectCall {
        model,
        method,
        args,
        kwargs,
    })
}

#[allow(dead_code)]
impl MockRpcClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result for an object call against the given model/method
    pub fn on_object(&self, model: &str, method: &str, result: Value) {
        let mut responses = self.object_responses.lock().unwrap();
        responses
            .entry((model.to_string(), method.to_string()))
            .or_default()
            .push(result);
    }

    /// Set the result for a common-service call
    pub fn on_common(&self, method: &str, result: Value) {
        let mut responses = self.common_responses.lock().unwrap();
        responses.insert(method.to_string(), result);
    }

    pub fn call_history(&self) -> Vec<RpcCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded object calls against the given model/method, decoded
    pub fn object_calls(&self, model: &str, method: &str) -> Vec<ObjectCall> {
        self.call_history()
            .iter()
            .filter_map(parse_object_call)
            .filter(|call| call.model == model && call.method == method)
            .collect()
    }

    fn next_object_response(&self, model: &str, method: &str) -> Option<Value> {
        let mut responses = self.object_responses.lock().unwrap();
        let queue = responses.get_mut(&(model.to_string(), method.to_string()))?;
        match queue.len() {
            0 => None,
            1 => Some(queue[0].clone()),
            _ => Some(queue.remove(0)),
        }
    }
}

impl MockRpcHandler for MockRpcClient {
    fn process_call(&self, call: RpcCall) -> CallFuture {
        self.calls.lock().unwrap().push(call.clone());

        let outcome: Result<Value, ErpError> = match call.service.as_str() {
            "common" => self
                .common_responses
                .lock()
                .unwrap()
                .get(&call.method)
                .cloned()
                .ok_or_else(|| {
                    ErpError::simple_request_error(format!(
                        "No mock response for common.{}",
                        call.method
                    ))
                }),
            "object" => match parse_object_call(&call) {
                Some(object_call) => self
                    .next_object_response(&object_call.model, &object_call.method)
                    .ok_or_else(|| {
                        ErpError::simple_request_error(format!(
                            "No mock response for {}.{}",
                            object_call.model, object_call.method
                        ))
                    }),
                None => Err(ErpError::simple_request_error("Malformed object frame")),
            },
            other => Err(ErpError::simple_request_error(format!(
                "Unexpected service: {}",
                other
            ))),
        };

        Box::pin(async move { outcome })
    }
}

/// A client wired to a fresh scripted endpoint, uid pre-seeded
#[allow(dead_code)]
pub fn mock_erp() -> (Arc<MockRpcClient>, OpenErp) {
    let mock = Arc::new(MockRpcClient::new());
    let erp = OpenErp::with_mock_rpc(
        "testdb",
        "admin",
        "secret",
        mock.clone() as Arc<dyn MockRpcHandler>,
    );
    (mock, erp)
}
