//! End-to-end server tests over a real TCP socket.

use std::net::SocketAddr;
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{CONTENT_TYPE, HOST};
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use customer_api::router::{AppState, Router};
use customer_api::server::{Server, ServerError};
use customer_core::config::ServiceConfig;
use customer_core::CustomerStore;

struct TestServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<Result<(), ServerError>>,
}

/// Announces a 20-byte body but sends only the first 4 bytes.
const STALLED_POST: &[u8] = b"POST /customers HTTP/1.1\r\n\
Host: localhost\r\n\
Content-Type: application/json\r\n\
Content-Length: 20\r\n\
\r\n\
{\"na";

async fn start_server() -> anyhow::Result<TestServer> {
    start_server_with(ServiceConfig {
        shutdown_grace_ms: 2000,
        ..Default::default()
    })
    .await
}

async fn start_server_with(config: ServiceConfig) -> anyhow::Result<TestServer> {
    let router = Router::new(AppState::new(CustomerStore::seeded(), config))?;
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr = listener.local_addr()?;

    let (shutdown, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(Server::new(router).run(listener, async {
        let _ = rx.await;
    }));

    Ok(TestServer {
        addr,
        shutdown,
        handle,
    })
}

/// Sends one request on a fresh HTTP/1 connection.
async fn request(
    addr: SocketAddr,
    method: Method,
    path: &str,
    body: &str,
) -> anyhow::Result<(StatusCode, Option<String>, Bytes)> {
    let stream = TcpStream::connect(addr).await?;
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;
    tokio::spawn(conn);

    let req = Request::builder()
        .method(method)
        .uri(path)
        .header(HOST, addr.to_string())
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body.to_string())))?;
    let response = sender.send_request(req).await?;

    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.into_body().collect().await?.to_bytes();
    Ok((status, content_type, body))
}

/// Opens a raw connection and sends a request whose body never completes.
async fn send_stalled_request(addr: SocketAddr) -> anyhow::Result<TcpStream> {
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(STALLED_POST).await?;
    Ok(stream)
}

/// Reads until the first line of the response is available.
async fn read_status_line(stream: &mut TcpStream) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 512];
    while !buf.windows(2).any(|w| w == b"\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let text = String::from_utf8_lossy(&buf);
    Ok(text.lines().next().unwrap_or_default().to_string())
}

#[tokio::test]
async fn test_crud_over_http() -> anyhow::Result<()> {
    let server = start_server().await?;

    let (status, content_type, body) = request(server.addr, Method::GET, "/", "").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
    assert!(String::from_utf8(body.to_vec())?.starts_with("Welcome to the Customer API"));

    let (status, _, body) =
        request(server.addr, Method::POST, "/customers", r#"{"name":"Zed"}"#).await?;
    assert_eq!(status, StatusCode::CREATED);
    let created: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(created["id"], 4);

    let (status, content_type, body) = request(server.addr, Method::GET, "/customers", "").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let listed: Vec<serde_json::Value> = serde_json::from_slice(&body)?;
    assert_eq!(listed.len(), 4);

    let (status, _, body) = request(server.addr, Method::DELETE, "/customers/4", "").await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, _, body) = request(server.addr, Method::GET, "/customers/4", "").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());

    let (status, _, _) = request(server.addr, Method::PATCH, "/customers/1", "").await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    server.shutdown.send(()).ok();
    server.handle.await??;
    Ok(())
}

#[tokio::test]
async fn test_graceful_shutdown_stops_accepting() -> anyhow::Result<()> {
    let server = start_server().await?;
    let addr = server.addr;

    let (status, _, _) = request(addr, Method::GET, "/customers/1", "").await?;
    assert_eq!(status, StatusCode::OK);

    server.shutdown.send(()).ok();
    tokio::time::timeout(Duration::from_secs(5), server.handle).await???;

    assert!(request(addr, Method::GET, "/customers", "").await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_stalled_body_hits_read_timeout() -> anyhow::Result<()> {
    let server = start_server_with(ServiceConfig {
        read_timeout_ms: 200,
        shutdown_grace_ms: 2000,
        ..Default::default()
    })
    .await?;

    let mut stream = send_stalled_request(server.addr).await?;
    let status_line =
        tokio::time::timeout(Duration::from_secs(5), read_status_line(&mut stream)).await??;
    assert_eq!(status_line, "HTTP/1.1 408 Request Timeout");
    drop(stream);

    assert_eq!(
        request(server.addr, Method::GET, "/customers", "").await?.0,
        StatusCode::OK
    );

    server.shutdown.send(()).ok();
    server.handle.await??;
    Ok(())
}

#[tokio::test]
async fn test_slow_request_hits_write_deadline() -> anyhow::Result<()> {
    let server = start_server_with(ServiceConfig {
        read_timeout_ms: 5000,
        write_timeout_ms: 200,
        shutdown_grace_ms: 2000,
        ..Default::default()
    })
    .await?;

    let mut stream = send_stalled_request(server.addr).await?;
    let status_line =
        tokio::time::timeout(Duration::from_secs(5), read_status_line(&mut stream)).await??;
    assert_eq!(status_line, "HTTP/1.1 503 Service Unavailable");
    drop(stream);

    server.shutdown.send(()).ok();
    server.handle.await??;
    Ok(())
}

#[tokio::test]
async fn test_in_flight_request_outlives_shutdown_grace() -> anyhow::Result<()> {
    let server = start_server_with(ServiceConfig {
        read_timeout_ms: 5000,
        write_timeout_ms: 10000,
        shutdown_grace_ms: 200,
        ..Default::default()
    })
    .await?;

    let stream = send_stalled_request(server.addr).await?;
    // Let the server pick up the request before signalling
    tokio::time::sleep(Duration::from_millis(100)).await;

    server.shutdown.send(()).ok();
    let result = tokio::time::timeout(Duration::from_secs(5), server.handle).await??;
    match result {
        Err(ServerError::ShutdownTimeout(grace)) => {
            assert_eq!(grace, Duration::from_millis(200));
        }
        other => panic!("expected shutdown timeout, got {:?}", other),
    }

    drop(stream);
    Ok(())
}
