// tests/gate_routes.rs
//
// O roteador completo servido em uma porta local: o portão bloqueia as rotas
// de inventário e deixa as da sessão abertas.

use std::{net::SocketAddr, sync::Arc};

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use hw_inventory::{
    config::AppState,
    db::MemoryInventoryRepository,
    router,
    services::{MemorySessionMarker, SessionGate},
};

async fn serve(app_state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let app = router::app(app_state);
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

async fn send_raw(addr: SocketAddr, method: &str, path: &str, body: Option<&str>) -> (u16, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(body) = body {
        req.push_str("Content-Type: application/json\r\n");
        req.push_str(&format!("Content-Length: {}\r\n", body.len()));
        req.push_str("\r\n");
        req.push_str(body);
    } else {
        req.push_str("\r\n");
    }
    stream.write_all(req.as_bytes()).await.expect("write request");

    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    (status, body.to_string())
}

fn locked_state() -> AppState {
    let gate = SessionGate::new("2912", Arc::new(MemorySessionMarker::default()));
    AppState::with_repository(Arc::new(MemoryInventoryRepository::new()), gate)
}

#[tokio::test]
async fn inventory_routes_require_an_unlocked_session() {
    let addr = serve(locked_state()).await;

    for path in ["/api/items", "/api/categories", "/api/logs", "/api/dashboard", "/api/options"] {
        let (status, _) = send_raw(addr, "GET", path, None).await;
        assert_eq!(status, 401, "{path} deveria estar bloqueada");
    }
    let (status, _) = send_raw(addr, "POST", "/api/items", Some(r#"{"name":"HDMI"}"#)).await;
    assert_eq!(status, 401);

    // Rotas públicas continuam abertas
    let (status, _) = send_raw(addr, "GET", "/api/health", None).await;
    assert_eq!(status, 200);
    let (status, body) = send_raw(addr, "GET", "/api/session", None).await;
    assert_eq!(status, 200);
    assert!(body.contains(r#""unlocked":false"#));
}

#[tokio::test]
async fn unlock_opens_the_gate_and_lock_closes_it_again() {
    let addr = serve(locked_state()).await;

    let (status, _) = send_raw(addr, "POST", "/api/session/unlock", Some(r#"{"password":"0000"}"#)).await;
    assert_eq!(status, 401);
    let (status, _) = send_raw(addr, "GET", "/api/items", None).await;
    assert_eq!(status, 401);

    let (status, _) = send_raw(addr, "POST", "/api/session/unlock", Some(r#"{"password":"2912"}"#)).await;
    assert_eq!(status, 200);
    let (status, body) = send_raw(addr, "GET", "/api/items", None).await;
    assert_eq!(status, 200);
    assert!(body.contains("[]"));

    let (status, _) = send_raw(addr, "POST", "/api/session/lock", None).await;
    assert_eq!(status, 200);
    let (status, _) = send_raw(addr, "GET", "/api/items", None).await;
    assert_eq!(status, 401);
}
