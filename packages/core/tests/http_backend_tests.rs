//! Wire format of the HTTP backend against a one-shot loopback server

use evidence_core::{Backend, HttpBackend, PatientRegistration, StationConfig, Thresholds};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

/// What the server saw
struct Recorded {
    request_line: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Serve one request with a canned response; returns the base URL
fn serve_once(content_type: &str, body: Vec<u8>) -> (String, mpsc::Receiver<Recorded>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::channel();
    let content_type = content_type.to_string();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();

        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let head_end = loop {
            let n = stream.read(&mut chunk).unwrap();
            assert!(n > 0, "client closed before sending headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos;
            }
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap_or_default().to_string();
        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        let length = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);

        let mut request_body = buf[head_end + 4..].to_vec();
        while request_body.len() < length {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            request_body.extend_from_slice(&chunk[..n]);
        }

        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            content_type,
            body.len()
        );
        stream.write_all(head.as_bytes()).unwrap();
        stream.write_all(&body).unwrap();
        stream.flush().unwrap();

        let _ = tx.send(Recorded {
            request_line,
            headers,
            body: request_body,
        });
    });

    (format!("http://127.0.0.1:{}", port), rx)
}

fn backend(base: &str) -> HttpBackend {
    let mut config = StationConfig::default();
    config.backend_url = base.to_string();
    HttpBackend::new(&config)
}

#[tokio::test]
async fn test_prediction_switch_posts_form() {
    for (enabled, expected) in [(true, "enabled=true"), (false, "enabled=false")] {
        let (base, seen) = serve_once("application/json", b"{}".to_vec());
        backend(&base).set_predictions(enabled).await.unwrap();

        let request = seen.recv().unwrap();
        assert_eq!(request.request_line, "POST /toggle_predictions HTTP/1.1");
        assert!(request
            .header("Content-Type")
            .unwrap_or_default()
            .starts_with("application/x-www-form-urlencoded"));
        assert_eq!(request.body_text(), expected);
    }
}

#[tokio::test]
async fn test_thresholds_saved_as_json() {
    let (base, seen) = serve_once("application/json", b"{}".to_vec());
    let values = Thresholds {
        conf_th: 0.4,
        iou_th: 0.65,
        min_box_frac: 0.02,
    };
    backend(&base).save_thresholds(values).await.unwrap();

    let request = seen.recv().unwrap();
    assert_eq!(request.request_line, "POST /thresholds HTTP/1.1");
    assert!(request
        .header("Content-Type")
        .unwrap_or_default()
        .starts_with("application/json"));
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"conf_th": 0.4, "iou_th": 0.65, "min_box_frac": 0.02})
    );
}

#[tokio::test]
async fn test_delete_sends_filename_and_cedula() {
    let (base, seen) = serve_once(
        "application/json",
        br#"{"success": true, "message": "Captura eliminada"}"#.to_vec(),
    );
    let response = backend(&base)
        .delete_capture("0912345678", "0912345678_1.jpg")
        .await
        .unwrap();
    assert!(response.success);

    let request = seen.recv().unwrap();
    assert_eq!(request.request_line, "POST /delete_captura HTTP/1.1");
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"filename": "0912345678_1.jpg", "cedula": "0912345678"})
    );
}

#[tokio::test]
async fn test_upload_is_multipart_with_boundary() {
    let (base, seen) = serve_once(
        "application/json",
        br#"{"message": "Imagen guardada", "filename": "0912345678_2.jpg"}"#.to_vec(),
    );
    let jpeg = vec![0xFF, 0xD8, 0x01, 0x02, 0xFF, 0xD9];
    let response = backend(&base)
        .upload_capture("0912345678", jpeg.clone())
        .await
        .unwrap();
    assert_eq!(response.filename.as_deref(), Some("0912345678_2.jpg"));

    let request = seen.recv().unwrap();
    assert_eq!(request.request_line, "POST /capture HTTP/1.1");
    let content_type = request.header("Content-Type").unwrap_or_default();
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .expect("multipart content type");
    assert!(!boundary.is_empty());

    let body = request.body_text();
    assert!(body.starts_with(&format!("--{}\r\n", boundary)));
    assert!(body.contains("name=\"cedula\"\r\n\r\n0912345678\r\n"));
    assert!(body.contains("name=\"image\"; filename=\"captura.jpg\""));
    assert!(request.body.windows(jpeg.len()).any(|w| w == jpeg.as_slice()));
    assert!(body.trim_end().ends_with(&format!("--{}--", boundary)));
}

#[tokio::test]
async fn test_live_feed_uses_advertised_boundary() {
    let first = [0xFF, 0xD8, 0xAA, 0xFF, 0xD9];
    let second = [0xFF, 0xD8, 0xBB, 0xFF, 0xD9];
    let mut feed = Vec::new();
    for frame in [&first, &second] {
        feed.extend_from_slice(
            format!(
                "--cam\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
                frame.len()
            )
            .as_bytes(),
        );
        feed.extend_from_slice(frame);
        feed.extend_from_slice(b"\r\n");
    }

    let (base, seen) = serve_once("multipart/x-mixed-replace; boundary=cam", feed);
    let frame = backend(&base).grab_frame().await.unwrap();

    assert_eq!(frame, first);
    assert_eq!(
        seen.recv().unwrap().request_line,
        "GET /video_feed HTTP/1.1"
    );
}

#[tokio::test]
async fn test_registration_posts_patient_form() {
    let (base, seen) = serve_once("text/html", b"<html></html>".to_vec());
    let patient = PatientRegistration {
        nombre: "Ana Vera".into(),
        cedula: " 0912345678 ".into(),
        edad: "42".into(),
        genero: "F".into(),
        antecedentes: "Ninguno".into(),
    };
    backend(&base).register_patient(&patient).await.unwrap();

    let request = seen.recv().unwrap();
    assert_eq!(request.request_line, "POST /start_stream HTTP/1.1");
    assert_eq!(
        request.body_text(),
        "nombre=Ana+Vera&cedula=0912345678&edad=42&genero=F&antecedentes=Ninguno"
    );
}

#[tokio::test]
async fn test_server_error_body_reaches_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut chunk = [0u8; 4096];
        let _ = stream.read(&mut chunk);
        let body = "camera busy";
        let reply = format!(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream.write_all(reply.as_bytes()).unwrap();
    });

    let err = backend(&format!("http://127.0.0.1:{}", port))
        .get_thresholds()
        .await
        .unwrap_err();
    let failure = evidence_core::Failure::from(err);

    assert_eq!(failure.kind, evidence_core::ErrorKind::Application);
    assert!(failure.detail.ends_with("camera busy"));
    assert_eq!(failure.notice("Could not load"), "Could not load");
}
