use chrono::{Datelike, Utc};
use regslip_pdf::OrgProfile;
use regslip_server::{build_router, ApiConfig, AppState};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

async fn spawn_server(state: AppState) -> std::net::SocketAddr {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

async fn send_request(
    addr: std::net::SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: &[u8],
) -> (u16, String, Vec<u8>) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (k, v) in headers {
        req.push_str(&format!("{k}: {v}\r\n"));
    }
    req.push_str(&format!("content-length: {}\r\n\r\n", body.len()));
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request head");
    stream.write_all(body).await.expect("write request body");
    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .await
        .expect("read response");
    let split = response
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("http response must have separator");
    let head = String::from_utf8_lossy(&response[..split]).to_string();
    let body = response[split + 4..].to_vec();
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    (status, head, body)
}

async fn get(addr: std::net::SocketAddr, path: &str) -> (u16, String, Vec<u8>) {
    send_request(addr, "GET", path, &[], &[]).await
}

async fn post_json(addr: std::net::SocketAddr, path: &str, body: &Value) -> (u16, String, Vec<u8>) {
    let bytes = serde_json::to_vec(body).expect("serialize body");
    send_request(
        addr,
        "POST",
        path,
        &[("content-type", "application/json")],
        &bytes,
    )
    .await
}

fn default_state() -> AppState {
    AppState::with_config(ApiConfig::default(), OrgProfile::default()).expect("app state")
}

fn jane_doe() -> Value {
    json!({
        "fullName": "Jane Doe",
        "idNumber": "A1234567",
        "email": "jane@example.org",
        "phoneNumber": "+2348001234567",
        "gender": "female"
    })
}

fn body_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("json body")
}

#[tokio::test]
async fn operational_endpoints_answer() {
    let addr = spawn_server(default_state()).await;

    let (status, headers, body) = get(addr, "/healthz").await;
    assert_eq!(status, 200);
    assert_eq!(body, b"ok");
    assert!(headers.contains("x-request-id: "));

    let (status, _, body) = get(addr, "/readyz").await;
    assert_eq!(status, 200);
    assert_eq!(body, b"ready");

    let (status, _, body) = get(addr, "/v1/version").await;
    assert_eq!(status, 200);
    let json = body_json(&body);
    assert_eq!(json["server"]["crate"], "regslip-server");
    assert_eq!(json["roster_prefix"], "ytc");

    let (status, _, body) = get(addr, "/metrics").await;
    assert_eq!(status, 200);
    let text = String::from_utf8_lossy(&body).to_string();
    assert!(text.contains("regslip_http_requests_total"));
}

#[tokio::test]
async fn accepted_submission_gets_first_roster_id() {
    let addr = spawn_server(default_state()).await;

    let (status, _, body) = post_json(addr, "/v1/registrants", &jane_doe()).await;
    assert_eq!(status, 201);
    let json = body_json(&body);
    let expected_id = format!("ytc/{:02}/001", Utc::now().year().rem_euclid(100));
    assert_eq!(json["registrant"]["id"], expected_id.as_str());
    assert_eq!(json["registrant"]["fullName"], "Jane Doe");
    assert_eq!(json["roster"]["count"], 1);
    assert_eq!(json["roster"]["lastAdded"], "Jane Doe");
}

#[tokio::test]
async fn invalid_email_is_rejected_and_roster_unchanged() {
    let addr = spawn_server(default_state()).await;

    let mut bad = jane_doe();
    bad["email"] = json!("not-an-email");
    let (status, _, body) = post_json(addr, "/v1/registrants", &bad).await;
    assert_eq!(status, 400);
    let json = body_json(&body);
    assert_eq!(json["error"]["code"], "ValidationFailed");
    let fields: Vec<&str> = json["error"]["details"]["field_errors"]
        .as_array()
        .expect("field errors array")
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["email"]);

    let (status, _, body) = get(addr, "/v1/registrants").await;
    assert_eq!(status, 200);
    let json = body_json(&body);
    assert_eq!(json["roster"]["count"], 0);
    assert_eq!(json["roster"]["lastAdded"], Value::Null);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let addr = spawn_server(default_state()).await;
    let (status, _, body) = send_request(
        addr,
        "POST",
        "/v1/registrants",
        &[("content-type", "application/json")],
        b"{not json",
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body_json(&body)["error"]["code"], "ValidationFailed");
}

#[tokio::test]
async fn duplicate_submissions_get_distinct_ids() {
    let addr = spawn_server(default_state()).await;

    let (status, _, first) = post_json(addr, "/v1/registrants", &jane_doe()).await;
    assert_eq!(status, 201);
    let (status, _, second) = post_json(addr, "/v1/registrants", &jane_doe()).await;
    assert_eq!(status, 201);
    let first = body_json(&first);
    let second = body_json(&second);
    assert_ne!(first["registrant"]["id"], second["registrant"]["id"]);
    assert_eq!(second["roster"]["count"], 2);
}

#[tokio::test]
async fn list_supports_etag_revalidation() {
    let addr = spawn_server(default_state()).await;
    let (_, _, _) = post_json(addr, "/v1/registrants", &jane_doe()).await;

    let (status, headers, _) = get(addr, "/v1/registrants").await;
    assert_eq!(status, 200);
    let etag = headers
        .lines()
        .find_map(|line| line.strip_prefix("etag: "))
        .expect("etag header present")
        .to_string();
    let (status, _, _) = send_request(
        addr,
        "GET",
        "/v1/registrants",
        &[("If-None-Match", &etag)],
        &[],
    )
    .await;
    assert_eq!(status, 304);

    // The roster changed, so the old tag no longer validates.
    let (_, _, _) = post_json(addr, "/v1/registrants", &jane_doe()).await;
    let (status, _, _) = send_request(
        addr,
        "GET",
        "/v1/registrants",
        &[("If-None-Match", &etag)],
        &[],
    )
    .await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn slip_downloads_as_pdf_attachment() {
    let addr = spawn_server(default_state()).await;
    let (_, _, _) = post_json(addr, "/v1/registrants", &jane_doe()).await;

    let (status, headers, body) = get(addr, "/v1/registrants/1/slip").await;
    assert_eq!(status, 200);
    assert!(headers.contains("content-type: application/pdf"));
    assert!(headers.contains("filename=\"Jane_Doe_YTC_Acknowledgment_Slip.pdf\""));
    assert!(body.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn data_url_photo_is_accepted_and_echoed() {
    use base64::Engine as _;

    const PNG_PIXEL: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0xCF, 0xC0, 0x00, 0x00, 0x00, 0x03, 0x00, 0x01, 0x5F, 0x9B, 0xB2, 0x9E, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];
    let data_url = format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(PNG_PIXEL)
    );
    let addr = spawn_server(default_state()).await;

    let mut submission = jane_doe();
    submission["imageUrl"] = json!(data_url);
    let (status, _, body) = post_json(addr, "/v1/registrants", &submission).await;
    assert_eq!(status, 201);
    assert_eq!(body_json(&body)["registrant"]["imageUrl"], data_url.as_str());

    // A non-data URL never enters the roster.
    let mut remote = jane_doe();
    remote["imageUrl"] = json!("https://example.org/photo.png");
    let (status, _, body) = post_json(addr, "/v1/registrants", &remote).await;
    assert_eq!(status, 400);
    assert_eq!(body_json(&body)["error"]["code"], "ValidationFailed");

    let (status, _, body) = get(addr, "/v1/registrants/1/slip").await;
    assert_eq!(status, 200);
    assert!(body.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn slip_for_unknown_sequence_is_not_found() {
    let addr = spawn_server(default_state()).await;
    let (status, _, body) = get(addr, "/v1/registrants/9/slip").await;
    assert_eq!(status, 404);
    let json = body_json(&body);
    assert_eq!(json["error"]["code"], "RegistrantNotFound");
    assert_eq!(json["error"]["details"]["sequence"], 9);
}
