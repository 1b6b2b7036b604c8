use openerp_rs::client::CallFuture;
use openerp_rs::{ErpError, ErpModel, MockRpcHandler, OpenErp, RpcCall};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

mod test_helpers;

use test_helpers::MockRpcClient;

#[test]
fn base_url_is_normalized() {
    let erp = OpenErp::new("testdb", "admin", "secret")
        .with_base_url("https://erp.example.com:8071/");
    assert_eq!(erp.base_url, "https://erp.example.com:8071");
}

#[test]
fn client_exposes_database_and_login() {
    let erp = OpenErp::new("testdb", "admin", "secret");
    assert_eq!(erp.database(), "testdb");
    assert_eq!(erp.login(), "admin");
}

#[tokio::test]
async fn authenticate_caches_the_uid() {
    let erp = OpenErp::new("testdb", "admin", "secret");
    erp.set_rpc_handler(Box::new(|call: RpcCall| -> CallFuture {
        Box::pin(async move {
            assert_eq!(call.service, "common");
            assert_eq!(call.method, "login");
            assert_eq!(call.args, vec![json!("testdb"), json!("admin"), json!("secret")]);
            Ok(json!(7))
        })
    }));

    let uid = erp.authenticate().await.unwrap();
    assert_eq!(uid, 7);
}

#[tokio::test]
async fn rejected_credentials_fail_authentication() {
    let erp = OpenErp::new("testdb", "admin", "wrong");
    erp.set_rpc_handler(Box::new(|_call: RpcCall| -> CallFuture {
        // The server answers a bad login with false, not a fault
        Box::pin(async move { Ok(json!(false)) })
    }));

    let err = erp.authenticate().await.unwrap_err();
    match err {
        ErpError::AuthenticationFailed { login, database, .. } => {
            assert_eq!(login, "admin");
            assert_eq!(database, "testdb");
        }
        other => panic!("expected AuthenticationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn object_calls_log_in_lazily() {
    let mock = Arc::new(MockRpcClient::new());
    mock.on_common("login", json!(5));
    mock.on_object("res.partner", "search", json!([1]));

    let erp = OpenErp::new("testdb", "admin", "secret");
    let handler = mock.clone();
    erp.set_rpc_handler(Box::new(move |call: RpcCall| handler.process_call(call)));

    let ids = erp
        .model(ErpModel::Partner)
        .search(&openerp_rs::Domain::matching("active", true))
        .await
        .unwrap();
    assert_eq!(ids, vec![1]);

    let history = mock.call_history();
    assert_eq!(history[0].service, "common");
    assert_eq!(history[0].method, "login");
    assert_eq!(history[1].service, "object");

    // The uid from the login lands in the frame
    assert_eq!(history[1].args[1], json!(5));
}

#[tokio::test]
async fn default_context_rides_along_with_object_calls() {
    let (mock, erp) = test_helpers::mock_erp();
    let erp = erp.with_context("lang", "en_US");
    mock.on_object("res.partner", "search", json!([]));

    erp.model(ErpModel::Partner)
        .search(&openerp_rs::Domain::matching("active", true))
        .await
        .unwrap();

    let calls = mock.object_calls("res.partner", "search");
    assert_eq!(calls[0].kwargs["context"]["lang"], json!("en_US"));
}

#[tokio::test]
async fn registry_caches_the_partner_client() {
    let (_mock, erp) = test_helpers::mock_erp();
    let registry = erp.models();

    let first = registry.partner();
    let second = registry.partner();
    assert!(Arc::ptr_eq(&first, &second));

    // No custom clients registered yet
    assert!(registry.get("nonexistent").is_none());
    assert!(registry.list_clients().is_empty());
}

use openerp_rs::models::{base::BaseModelClient, ModelClient};

struct LocationClient {
    base: BaseModelClient,
}

impl LocationClient {
    fn new(erp: Arc<OpenErp>) -> Self {
        Self {
            base: BaseModelClient::new(erp, ErpModel::StockLocation),
        }
    }
}

impl ModelClient for LocationClient {
    fn model(&self) -> &ErpModel {
        self.base.model()
    }
}

#[tokio::test]
async fn custom_model_clients_can_be_registered() {
    let (_mock, erp) = test_helpers::mock_erp();
    let custom = LocationClient::new(Arc::new(erp.clone()));
    assert_eq!(custom.model(), &ErpModel::StockLocation);

    let registry = erp.models();
    registry.register("stock_location", custom);

    let retrieved = registry.get("stock_location");
    assert!(retrieved.is_some());
    assert_eq!(retrieved.unwrap().model(), &ErpModel::StockLocation);

    let names = registry.list_clients();
    assert_eq!(names, vec!["stock_location".to_string()]);
}
