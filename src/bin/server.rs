//! HTTP server for the analytics UI.
//! Simple HTTP server using tokio and basic HTTP handling.

use estate_analyst::analyst::Analyst;
use estate_analyst::llm::LlmClient;
use std::path::PathBuf;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    info!("Starting estate-analyst API server on http://localhost:8080");
    if std::env::var("GROQ_API_KEY").is_ok() {
        info!("Groq API key found, LLM summaries enabled");
    } else {
        warn!("Groq API key not found, deterministic summaries only");
    }

    let listener = TcpListener::bind("0.0.0.0:8080").await?;
    info!("Server listening on port 8080");

    loop {
        let (stream, addr) = listener.accept().await?;
        info!("New connection from {}", addr);
        tokio::spawn(handle_connection(stream));
    }
}

async fn handle_connection(mut stream: TcpStream) {
    match read_request(&mut stream).await {
        Ok(request) => {
            let response = handle_request(&request).await;
            if let Err(e) = stream.write_all(response.as_bytes()).await {
                error!("Failed to write response: {}", e);
            }
        }
        Err(e) => error!("Failed to read from stream: {}", e),
    }
}

/// Read the request head plus enough of the body to honor Content-Length.
async fn read_request(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut data = Vec::new();
    let mut buffer = [0u8; 4096];
    loop {
        let n = stream.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
        let text = String::from_utf8_lossy(&data);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text
                .lines()
                .find_map(|line| {
                    let (key, value) = line.split_once(':')?;
                    key.trim()
                        .eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())?
                })
                .unwrap_or(0);
            if data.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }
    Ok(String::from_utf8_lossy(&data).to_string())
}

async fn handle_request(request: &str) -> String {
    let request_line = request.lines().next().unwrap_or("");
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() < 2 {
        return create_response(400, "Bad Request", "{}");
    }

    let method = parts[0];
    let mut path = parts[1];
    if let Some(query_start) = path.find('?') {
        path = &path[..query_start];
    }
    let path = path.trim_end_matches('/');
    let path = if path.is_empty() { "/" } else { path };

    info!("Request: {} {}", method, path);

    match (method, path) {
        ("OPTIONS", _) => create_response(204, "No Content", ""),
        ("GET", "/api/health") => {
            let health = analyst().health();
            match serde_json::to_string(&health) {
                Ok(body) => create_response(200, "OK", &body),
                Err(_) => create_response(500, "Internal Server Error", "{}"),
            }
        }
        ("POST", "/api/analyze") => {
            let body_start = request.find("\r\n\r\n").map(|i| i + 4).unwrap_or(request.len());
            let body = request[body_start..].trim();
            let query = body
                .find('{')
                .and_then(|json_start| {
                    serde_json::from_str::<serde_json::Value>(&body[json_start..]).ok()
                })
                .and_then(|json| {
                    json.get("query")
                        .and_then(|v| v.as_str())
                        .map(|s| s.to_string())
                })
                .unwrap_or_default();

            let response = analyst().analyze(&query).await;
            let status = if response.error.is_some() { 400 } else { 200 };
            let status_text = if status == 400 { "Bad Request" } else { "OK" };
            match serde_json::to_string(&response) {
                Ok(body) => create_response(status, status_text, &body),
                Err(_) => create_response(
                    500,
                    "Internal Server Error",
                    r#"{"error":"Failed to serialize response"}"#,
                ),
            }
        }
        _ => create_response(404, "Not Found", r#"{"error":"Not found"}"#),
    }
}

fn analyst() -> Analyst {
    let data_file =
        std::env::var("DATA_FILE").unwrap_or_else(|_| "Sample_data.csv".to_string());
    Analyst::new(LlmClient::from_env(), PathBuf::from(data_file))
}

fn create_response(status: u16, status_text: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: application/json\r\n\
         Access-Control-Allow-Origin: *\r\n\
         Access-Control-Allow-Methods: GET, POST, OPTIONS\r\n\
         Access-Control-Allow-Headers: Content-Type\r\n\
         Content-Length: {}\r\n\
         \r\n\
         {}",
        status,
        status_text,
        body.len(),
        body
    )
}
