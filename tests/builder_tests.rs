use openerp_rs::{Domain, ErpError, ErpModel};
use pretty_assertions::assert_eq;
use serde_json::json;

mod test_helpers;

#[tokio::test]
async fn a_method_is_required() {
    let (_mock, erp) = test_helpers::mock_erp();
    let err = erp.call().model(ErpModel::Partner).send().await.unwrap_err();
    assert!(matches!(err, ErpError::ValidationError(_)));
}

#[tokio::test]
async fn an_empty_method_fails_validation() {
    let (_mock, erp) = test_helpers::mock_erp();
    let result = erp.call().model(ErpModel::Partner).method("  ");
    assert!(result.is_err());
}

#[tokio::test]
async fn a_model_is_required_for_object_calls() {
    let (_mock, erp) = test_helpers::mock_erp();
    let err = erp
        .call()
        .method("search")
        .unwrap()
        .send()
        .await
        .unwrap_err();
    match err {
        ErpError::ValidationError(message) => assert!(message.contains("model")),
        other => panic!("expected ValidationError, got {:?}", other),
    }
}

#[tokio::test]
async fn object_calls_use_the_execute_kw_frame() {
    let (mock, erp) = test_helpers::mock_erp();
    mock.on_object("res.partner", "search", json!([1, 2]));

    let domain = Domain::matching("ref", "TRPL29");
    erp.call()
        .model(ErpModel::Partner)
        .method("search")
        .unwrap()
        .serialized_arg(&domain)
        .unwrap()
        .send()
        .await
        .unwrap();

    let history = mock.call_history();
    assert_eq!(history.len(), 1);
    let call = &history[0];
    assert_eq!(call.service, "object");
    assert_eq!(call.method, "execute_kw");
    assert_eq!(call.args[0], json!("testdb"));
    assert_eq!(call.args[1], json!(1));
    assert_eq!(call.args[2], json!("secret"));
    assert_eq!(call.args[3], json!("res.partner"));
    assert_eq!(call.args[4], json!("search"));
    assert_eq!(call.args[5], json!([[["ref", "=", "TRPL29"]]]));
    assert_eq!(call.args[6], json!({}));
}

#[tokio::test]
async fn per_call_context_overrides_the_client_default() {
    let (mock, erp) = test_helpers::mock_erp();
    let erp = erp.with_context("lang", "en_US").with_context("tz", "UTC");
    mock.on_object("res.partner", "search", json!([]));

    erp.call()
        .model(ErpModel::Partner)
        .method("search")
        .unwrap()
        .serialized_arg(&Domain::new())
        .unwrap()
        .context("lang", "fr_FR")
        .send()
        .await
        .unwrap();

    let calls = mock.object_calls("res.partner", "search");
    assert_eq!(calls[0].kwargs["context"]["lang"], json!("fr_FR"));
    assert_eq!(calls[0].kwargs["context"]["tz"], json!("UTC"));
}

#[tokio::test]
async fn kwargs_are_passed_through() {
    let (mock, erp) = test_helpers::mock_erp();
    mock.on_object("res.partner", "search", json!([]));

    erp.call()
        .model(ErpModel::Partner)
        .method("search")
        .unwrap()
        .serialized_arg(&Domain::new())
        .unwrap()
        .kwarg("limit", 10)
        .send()
        .await
        .unwrap();

    let calls = mock.object_calls("res.partner", "search");
    assert_eq!(calls[0].kwargs["limit"], json!(10));
}

#[tokio::test]
async fn common_calls_skip_the_authenticated_frame() {
    let (mock, erp) = test_helpers::mock_erp();
    mock.on_common("version", json!({"server_version": "6.1"}));

    let result = erp
        .call()
        .service("common")
        .method("version")
        .unwrap()
        .send()
        .await
        .unwrap();
    assert_eq!(result["server_version"], json!("6.1"));

    let history = mock.call_history();
    assert_eq!(history[0].service, "common");
    assert!(history[0].args.is_empty());
}
