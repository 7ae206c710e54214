mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{Reply, TestServer};
use serde::Deserialize;
use softlayer_client::{CallOptions, ClientError, FaultCode, HeaderSet, Value};
use softlayer_core::Fault;

fn account() -> Value {
    [
        ("id", Value::from(1234)),
        ("companyName", Value::from("Acme & Sons")),
    ]
    .into_iter()
    .collect()
}

#[tokio::test]
async fn test_call_sends_headers_and_arguments() {
    let server = TestServer::returning(account()).await;
    let client = server.client();

    let filter: Value = [(
        "hostname",
        [("operation", "web*")].into_iter().collect::<Value>(),
    )]
    .into_iter()
    .collect();

    let result = client
        .call(
            "Virtual_Guest",
            "setTags",
            &[Value::from("web,prod"), Value::from(7)],
            CallOptions::new().id(99).mask("mask.id").filter(filter.clone()),
        )
        .await
        .unwrap();
    assert_eq!(result.get("companyName"), Some(&Value::from("Acme & Sons")));

    let call = server.single();
    assert_eq!(call.service, "SoftLayer_Virtual_Guest");
    assert_eq!(call.method, "setTags");
    assert_eq!(call.args, vec![Value::from("web,prod"), Value::from(7)]);

    let auth = call.headers.get("authenticate").unwrap();
    assert_eq!(auth.get("username"), Some(&Value::from("SLUSER")));
    assert_eq!(auth.get("apiKey"), Some(&Value::from("0123456789abcdef")));

    assert_eq!(
        call.headers
            .get("SoftLayer_Virtual_GuestInitParameters")
            .and_then(|h| h.get("id")),
        Some(&Value::from(99))
    );
    assert_eq!(
        call.headers.get("SoftLayer_ObjectMask").and_then(|h| h.get("mask")),
        Some(&Value::from("mask[id]"))
    );
    assert_eq!(
        call.headers.get("SoftLayer_Virtual_GuestObjectFilter"),
        Some(&filter)
    );
    assert!(call.headers.get("resultLimit").is_none());
}

#[tokio::test]
async fn test_call_http_headers() {
    let server = TestServer::returning(Value::Nil).await;
    let client = server.client();

    client
        .call(
            "Account",
            "getObject",
            &[],
            CallOptions::new().raw_header("X-Request-Id", "abc"),
        )
        .await
        .unwrap();

    let call = server.single();
    assert_eq!(call.http_headers["content-type"], "text/xml");
    assert_eq!(call.http_headers["x-request-id"], "abc");
    assert!(
        call.http_headers["user-agent"]
            .to_str()
            .unwrap()
            .starts_with("softlayer-client-rs/")
    );
}

#[tokio::test]
async fn test_custom_user_agent_and_client_headers() {
    let server = TestServer::returning(Value::Nil).await;
    let client = softlayer_client::Client::builder()
        .endpoint_url(server.endpoint())
        .credentials("SLUSER", "key")
        .user_agent("inventory/2.0")
        .raw_header("X-Team", "infra")
        .header("customHeader", "value")
        .build()
        .unwrap();

    client.invoke("Account", "getObject", &[]).await.unwrap();

    let call = server.single();
    assert_eq!(call.http_headers["user-agent"], "inventory/2.0");
    assert_eq!(call.http_headers["x-team"], "infra");
    assert_eq!(call.headers.get("customHeader"), Some(&Value::from("value")));
}

#[tokio::test]
async fn test_header_override_replaces_everything() {
    let server = TestServer::returning(Value::Nil).await;
    let client = server.client();

    let mut headers = HeaderSet::new();
    headers.insert("only", Value::from(1));

    client
        .call(
            "Account",
            "getObject",
            &[],
            CallOptions::new().id(5).limit(10).headers(headers),
        )
        .await
        .unwrap();

    let call = server.single();
    let members = call.headers.as_struct().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(call.headers.get("only"), Some(&Value::from(1)));
}

#[tokio::test]
async fn test_fault_is_reported() {
    let server = TestServer::spawn(|_| {
        Reply::Fault(Fault::new(
            "SoftLayer_Exception_ObjectNotFound",
            "Unable to find object with id of '1'.",
        ))
    })
    .await;
    let client = server.client();

    let err = client
        .call("Hardware_Server", "getObject", &[], CallOptions::new().id(1))
        .await
        .unwrap_err();

    assert!(err.is_fault());
    assert_eq!(
        err.fault_code(),
        Some(&FaultCode::Text("SoftLayer_Exception_ObjectNotFound".into()))
    );
    assert_eq!(err.message(), "Unable to find object with id of '1'.");
}

#[tokio::test]
async fn test_fault_with_error_status() {
    let server = TestServer::spawn(|_| {
        Reply::FaultWithStatus(
            StatusCode::INTERNAL_SERVER_ERROR,
            Fault::new("SoftLayer_Exception_NotReady", "try later"),
        )
    })
    .await;

    let err = server
        .client()
        .invoke("Account", "getObject", &[])
        .await
        .unwrap_err();
    assert!(err.is_fault());
    assert_eq!(err.message(), "try later");
}

#[tokio::test]
async fn test_error_status_without_fault() {
    let server =
        TestServer::spawn(|_| Reply::Status(StatusCode::BAD_GATEWAY, "upstream unavailable")).await;

    let err = server
        .client()
        .invoke("Account", "getObject", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)), "{err:?}");
    assert!(err.message().contains("502"));
}

#[tokio::test]
async fn test_garbage_body_is_decode_error() {
    let server = TestServer::spawn(|_| Reply::Status(StatusCode::OK, "<html>oops</html>")).await;

    let err = server
        .client()
        .invoke("Account", "getObject", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn test_timeout() {
    let server =
        TestServer::spawn(|_| Reply::Delayed(Duration::from_millis(500), Value::from(true))).await;
    let client = server.client();

    let err = client
        .call(
            "Account",
            "getObject",
            &[],
            CallOptions::new().timeout(Duration::from_millis(50)),
        )
        .await
        .unwrap_err();
    assert!(err.is_timeout(), "{err:?}");

    let ok = client.invoke("Account", "getObject", &[]).await.unwrap();
    assert_eq!(ok, Value::Bool(true));
}

#[tokio::test]
async fn test_malformed_mask_sends_nothing() {
    let server = TestServer::returning(Value::Nil).await;

    let err = server
        .client()
        .call("Account", "getObject", &[], CallOptions::new().mask("mask[id"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::MalformedMask(_)));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = softlayer_client::Client::builder()
        .endpoint_url(format!("http://{addr}/xmlrpc/v3"))
        .credentials("SLUSER", "key")
        .build()
        .unwrap();

    let err = client.invoke("Account", "getObject", &[]).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn test_call_as_and_service_handle() {
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Account {
        id: i64,
        company_name: String,
    }

    let server = TestServer::returning(account()).await;
    let client = server.client();

    let account: Account = client
        .service("Account")
        .call_as("getObject", &[], CallOptions::new().mask("id,companyName"))
        .await
        .unwrap();
    assert_eq!(account.id, 1234);
    assert_eq!(account.company_name, "Acme & Sons");

    let call = server.single();
    assert_eq!(call.service, "SoftLayer_Account");
    assert_eq!(
        call.headers.get("SoftLayer_ObjectMask").and_then(|h| h.get("mask")),
        Some(&Value::from("mask[id,companyName]"))
    );
}
