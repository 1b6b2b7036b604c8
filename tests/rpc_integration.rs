use mockito::{Matcher, Server};
use openerp_rs::{Domain, ErpError, ErpModel, OpenErp};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn login_and_search_over_http() {
    let mut server = Server::new_async().await;

    let login_mock = server
        .mock("POST", "/jsonrpc")
        .match_body(Matcher::PartialJson(json!({
            "jsonrpc": "2.0",
            "method": "call",
            "params": {"service": "common", "method": "login"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc": "2.0", "id": 1, "result": 7}"#)
        .create_async()
        .await;

    let search_mock = server
        .mock("POST", "/jsonrpc")
        .match_body(Matcher::PartialJson(json!({
            "params": {"service": "object", "method": "execute_kw"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc": "2.0", "id": 2, "result": [3, 4]}"#)
        .create_async()
        .await;

    let erp = OpenErp::new("testdb", "admin", "secret").with_base_url(server.url());
    let ids = erp
        .model(ErpModel::Partner)
        .search(&Domain::matching("active", true))
        .await
        .unwrap();
    assert_eq!(ids, vec![3, 4]);

    login_mock.assert_async().await;
    search_mock.assert_async().await;
}

#[tokio::test]
async fn a_json_rpc_error_member_becomes_a_fault() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("POST", "/jsonrpc")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"jsonrpc": "2.0", "id": 1,
                "error": {"code": 200, "message": "Server Error",
                          "data": {"debug": "AccessDenied"}}}"#,
        )
        .create_async()
        .await;

    let erp = OpenErp::new("testdb", "admin", "wrong").with_base_url(server.url());
    let err = erp.authenticate().await.unwrap_err();
    match err {
        ErpError::RpcFault { code, message, .. } => {
            assert_eq!(code, 200);
            assert_eq!(message, "Server Error");
        }
        other => panic!("expected RpcFault, got {:?}", other),
    }
}

#[tokio::test]
async fn a_non_success_status_becomes_an_api_error() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("POST", "/jsonrpc")
        .with_status(502)
        .with_body("bad gateway")
        .create_async()
        .await;

    let erp = OpenErp::new("testdb", "admin", "secret").with_base_url(server.url());
    let err = erp.authenticate().await.unwrap_err();
    match err {
        ErpError::ApiError { status, .. } => assert_eq!(status, 502),
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn an_empty_search_result_in_legacy_shape_decodes() {
    let mut server = Server::new_async().await;

    let _login = server
        .mock("POST", "/jsonrpc")
        .match_body(Matcher::PartialJson(json!({
            "params": {"service": "common", "method": "login"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc": "2.0", "id": 1, "result": 7}"#)
        .create_async()
        .await;

    // Older servers answer an empty search with false
    let _search = server
        .mock("POST", "/jsonrpc")
        .match_body(Matcher::PartialJson(json!({
            "params": {"service": "object", "method": "execute_kw"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc": "2.0", "id": 2, "result": false}"#)
        .create_async()
        .await;

    let erp = OpenErp::new("testdb", "admin", "secret").with_base_url(server.url());
    let ids = erp
        .model(ErpModel::Partner)
        .search(&Domain::matching("ref", "NOPE"))
        .await
        .unwrap();
    assert!(ids.is_empty());
}
