//! Transport tests running `ReqwestClient` against a one-shot local responder.

use std::time::Duration;

use pluget_fetch::{FetchError, HostHeaders, ReqwestClient, Response4xxError, StreamError, Transport};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Accept one connection, answer it with `response` and hand back the request head.
async fn serve_once(response: String) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
    });

    (base, rx)
}

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

fn transport() -> Transport<ReqwestClient> {
    let headers = HostHeaders {
        host_name: "grafana".into(),
        version:   "9.1.0".into(),
        os:        "linux".into(),
        arch:      "amd64".into(),
    };
    Transport::new(
        ReqwestClient::with_timeout(Some(Duration::from_secs(5))).unwrap(),
        ReqwestClient::new().unwrap(),
        &headers,
    )
}

#[tokio::test]
async fn success_returns_body_and_sends_host_headers() {
    let (base, request) = serve_once(http_response("200 OK", r#"{"id":"clock"}"#)).await;

    let body = transport().send_bytes(&base, &["repo", "clock"]).await.unwrap();
    assert_eq!(body, br#"{"id":"clock"}"#);

    let request = request.await.unwrap().to_ascii_lowercase();
    assert!(request.starts_with("get /repo/clock http/1.1"));
    assert!(request.contains("grafana-version: 9.1.0"));
    assert!(request.contains("grafana-os: linux"));
    assert!(request.contains("grafana-arch: amd64"));
    assert!(request.contains("user-agent: grafana 9.1.0"));
}

#[tokio::test]
async fn not_found_is_distinguished() {
    let (base, _request) = serve_once(http_response("404 Not Found", "")).await;

    let err = transport().send_bytes(&base, &["repo", "missing"]).await.unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
}

#[tokio::test]
async fn client_error_uses_json_message() {
    let (base, _request) =
        serve_once(http_response("400 Bad Request", r#"{"message":"X"}"#)).await;

    match transport().send_bytes(&base, &["repo"]).await {
        Err(FetchError::BadRequest(Response4xxError { message, status_code, .. })) => {
            assert_eq!(message.as_deref(), Some("X"));
            assert_eq!(status_code, 400);
        }
        other => panic!("expected bad request, got {other:?}"),
    }
}

#[tokio::test]
async fn client_error_falls_back_to_raw_body() {
    let (base, _request) = serve_once(http_response("403 Forbidden", "<html>nope</html>")).await;

    match transport().send_bytes(&base, &["repo"]).await {
        Err(FetchError::BadRequest(err)) => {
            assert_eq!(err.message.as_deref(), Some("<html>nope</html>"));
            assert_eq!(err.status_code, 403);
        }
        other => panic!("expected bad request, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_a_transport_failure() {
    let (base, _request) = serve_once(http_response("503 Service Unavailable", "busy")).await;

    match transport().send_bytes(&base, &["repo"]).await {
        Err(FetchError::UnexpectedStatus { status_line }) => {
            assert_eq!(status_line, "503 Service Unavailable")
        }
        other => panic!("expected unexpected status, got {other:?}"),
    }
}

#[tokio::test]
async fn truncated_body_is_classified_as_corrupt() {
    let response = "HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\nshort".to_string();
    let (base, _request) = serve_once(response).await;

    match transport().send_bytes(&base, &["archive.zip"]).await {
        Err(FetchError::Stream(StreamError::Corrupt(_))) => {}
        other => panic!("expected corrupt stream, got {other:?}"),
    }
}

/// Answer with a partial body, wait for the client to start reading it, then
/// abort the connection with a RST.
async fn serve_then_reset(head_and_partial_body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await.unwrap();
        socket.write_all(head_and_partial_body.as_bytes()).await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        #[allow(deprecated)]
        socket.set_linger(Some(Duration::ZERO)).unwrap();
        drop(socket);
    });

    base
}

#[tokio::test]
async fn reset_mid_body_is_an_io_error() {
    let base =
        serve_then_reset("HTTP/1.1 200 OK\r\nContent-Length: 100000\r\n\r\nshort").await;

    match transport().send_bytes(&base, &["archive.zip"]).await {
        Err(FetchError::Stream(StreamError::Io(err))) => {
            assert_eq!(err.kind(), std::io::ErrorKind::ConnectionReset)
        }
        other => panic!("expected connection reset, got {other:?}"),
    }
}

#[tokio::test]
async fn connection_refused_is_a_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    match transport().open_archive(&format!("{base}/archive.zip")).await {
        Err(FetchError::Request { url, .. }) => assert!(url.ends_with("/archive.zip")),
        Err(other) => panic!("expected request error, got {other:?}"),
        Ok(_) => panic!("expected request error, got a response"),
    }
}
