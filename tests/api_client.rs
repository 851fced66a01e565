use std::time::Duration;

use payment_mcp::api::{SignedApiClient, API_VERSION_HEADER};
use payment_mcp::signing::{decode_token_parts, ContentHashAlgorithm, RequestSigner, SigningIdentity};
use payment_mcp::ToolExecutor;
use reqwest::Method;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_string, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PRIVATE_KEY: &[u8] = include_bytes!("fixtures/partner_private_key.pem");

fn client(server: &MockServer, content_hash: ContentHashAlgorithm) -> SignedApiClient {
    let identity = SigningIdentity::from_pem("partner-7", "payment-api", PRIVATE_KEY).unwrap();
    SignedApiClient::new(
        &server.uri(),
        "2.0",
        identity,
        RequestSigner::new(content_hash),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn bearer_token(request: &wiremock::Request) -> String {
    let value = request.headers.get("authorization").unwrap().to_str().unwrap();
    value.strip_prefix("Bearer ").unwrap().to_string()
}

#[tokio::test]
async fn test_post_sends_canonical_body_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/transactions"))
        .and(body_string(r#"{"trData":{"amount":"10.00","currency":"EUR"}}"#))
        .and(header("content-type", "application/json"))
        .and(header(API_VERSION_HEADER, "2.0"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"transactionId": "T-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, ContentHashAlgorithm::Sha256);
    let body: Value =
        serde_json::from_str(r#"{"trData":{"currency":"EUR","amount":"10.00"}}"#).unwrap();
    let response = client.post("/transactions", &body).await.unwrap();

    assert_eq!(response, json!({"transactionId": "T-1"}));

    let requests = server.received_requests().await.unwrap();
    let token = bearer_token(&requests[0]);
    let (header, claims) = decode_token_parts(&token).unwrap();
    let sent_body = String::from_utf8(requests[0].body.clone()).unwrap();

    assert_eq!(
        header["contentSha256"],
        ContentHashAlgorithm::Sha256.digest_base64(&sent_body)
    );
    assert_eq!(claims.iss, "partner-7");
}

#[tokio::test]
async fn test_md5_profile_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"productId": "P-1"})))
        .mount(&server)
        .await;

    let client = client(&server, ContentHashAlgorithm::Md5);
    client
        .post("/products", &json!({"name": "Ticket", "price": "3.00"}))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let (header, _) = decode_token_parts(&bearer_token(&requests[0])).unwrap();
    let sent_body = String::from_utf8(requests[0].body.clone()).unwrap();

    assert_eq!(sent_body, r#"{"name":"Ticket","price":"3.00"}"#);
    assert_eq!(header["contentMd5"], ContentHashAlgorithm::Md5.digest_base64(&sent_body));
}

#[tokio::test]
async fn test_get_has_no_body_and_no_hash() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/transactions"))
        .and(query_param("status", "paid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let client = client(&server, ContentHashAlgorithm::Sha256);
    let response = client
        .get("/transactions", &[("status".to_string(), "paid".to_string())])
        .await
        .unwrap();
    assert_eq!(response, json!({"items": []}));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
    let (header, _) = decode_token_parts(&bearer_token(&requests[0])).unwrap();
    assert!(header.get("contentSha256").is_none());
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reports/R-9"))
        .respond_with(ResponseTemplate::new(401).set_body_string("content hash mismatch"))
        .mount(&server)
        .await;

    let client = client(&server, ContentHashAlgorithm::Sha256);
    let err = client
        .request(Method::GET, "/reports/R-9", &[], None)
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("401"));
    assert!(message.contains("content hash mismatch"));
}

#[tokio::test]
async fn test_empty_and_text_responses() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/products/P-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reports/R-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("id,amount\n1,10.00\n"))
        .mount(&server)
        .await;

    let client = client(&server, ContentHashAlgorithm::Sha256);

    let deleted = client
        .request(Method::DELETE, "/products/P-1", &[], None)
        .await
        .unwrap();
    assert_eq!(deleted, Value::Null);

    let report = client.get("/reports/R-1", &[]).await.unwrap();
    assert_eq!(report, Value::String("id,amount\n1,10.00\n".to_string()));
}

#[tokio::test]
async fn test_executor_runs_catalog_tool() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/transactions"))
        .and(body_string(
            r#"{"trData":{"amount":"10.00","currency":"EUR","description":"Order 1"}}"#,
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"transactionId": "T-2", "paymentUrl": "https://pay.example/T-2"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let executor = ToolExecutor::new(client(&server, ContentHashAlgorithm::Sha256));
    let result = executor
        .call(
            "create_transaction",
            &json!({"description": "Order 1", "currency": "EUR", "amount": "10.00"}),
        )
        .await;

    assert_eq!(result["isError"], false);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("https://pay.example/T-2"));
}

#[tokio::test]
async fn test_executor_rejects_bad_arguments_without_calling_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let executor = ToolExecutor::new(client(&server, ContentHashAlgorithm::Sha256));

    let missing = executor.call("get_transaction", &json!({})).await;
    assert_eq!(missing["isError"], true);
    assert!(missing["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("transaction_id"));

    let unknown = executor.call("spawn_pod", &json!({})).await;
    assert_eq!(unknown["isError"], true);
    assert!(unknown["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("unknown tool"));
}

#[tokio::test]
async fn test_executor_reports_api_failure_as_tool_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/P-404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&server)
        .await;

    let executor = ToolExecutor::new(client(&server, ContentHashAlgorithm::Sha256));
    let result = executor.call("get_product", &json!({"product_id": "P-404"})).await;

    assert_eq!(result["isError"], true);
    assert!(result["content"][0]["text"].as_str().unwrap().contains("404"));
}

/// Serve 200 responses that promise more body bytes than they deliver.
async fn truncated_body_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 64\r\n\r\n{\"transactionId\"")
                .await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_interrupted_success_body_is_an_error() {
    let base_url = truncated_body_server().await;
    let identity = SigningIdentity::from_pem("partner-7", "payment-api", PRIVATE_KEY).unwrap();
    let client = SignedApiClient::new(
        &base_url,
        "2.0",
        identity,
        RequestSigner::default(),
        Duration::from_secs(5),
    )
    .unwrap();

    let err = client.get("/transactions/T-1", &[]).await.unwrap_err();
    assert!(format!("{:#}", err).contains("failed to read response body"));

    let executor = ToolExecutor::new(client);
    let result = executor
        .call("get_transaction", &json!({"transaction_id": "T-1"}))
        .await;
    assert_eq!(result["isError"], true);
}
