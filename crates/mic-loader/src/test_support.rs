//! Test helpers: a one-shot local HTTP responder.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

/// URL on a local port nothing listens on.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1/ISO10383_MIC.csv";

/// Serves a single HTTP response on an ephemeral local port.
///
/// Returns the URL to request.
pub fn serve_once(status: &'static str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);

            let head = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
            let _ = stream.flush();
        }
    });

    format!("http://{}/ISO10383_MIC.csv", addr)
}

/// Installs a test log subscriber; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mic_loader=debug".into()),
        )
        .with_test_writer()
        .try_init();
}
