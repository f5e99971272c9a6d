//! HTTP backend for the knowledge-base server.
//!
//! Routes, relative to the configured base URL:
//!
//! | Method | Route | Request | Response |
//! |--------|-------|---------|----------|
//! | POST | `/upload` | multipart field `file` | `{"filename", "status"}` |
//! | POST | `/process` | `{"filenames": [..]}` | `{"qa_pairs_generated", ...}` |
//! | GET | `/db_status` | | `{"count"}` |
//! | POST | `/flush` | | `{"status", "message"}` |
//! | POST | `/chat` | `{"message", "api_key"}` | `{"response"}` |

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use clara_utils::error::{ChatError, IngestionError};
use clara_utils::logging::mask_secret;

use crate::types::{
    ChatBackend, ChatReply, Document, IngestionBackend, ProcessReport, UploadReceipt,
};

/// Longest error body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Both backend contracts over one `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}/{}", self.base_url, route.trim_start_matches('/'))
    }
}

/// Pass 2xx responses through; turn anything else into `(status, body)`.
async fn check_status(response: Response) -> Result<Response, (u16, String)> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    Err((status.as_u16(), body))
}

fn describe_status((status, body): (u16, String)) -> String {
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {body}")
    }
}

#[async_trait]
impl IngestionBackend for HttpBackend {
    async fn upload_document(&self, document: &Document) -> Result<UploadReceipt, IngestionError> {
        debug!(
            route = "upload",
            name = %document.name,
            bytes = document.len(),
            "Uploading document"
        );

        let part = Part::bytes(document.bytes.clone()).file_name(document.name.clone());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| IngestionError::Upload(e.to_string()))?;
        let response = check_status(response)
            .await
            .map_err(|e| IngestionError::Upload(describe_status(e)))?;

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| IngestionError::Upload(format!("invalid upload response: {e}")))?;

        debug!(route = "upload", stored_name = %body.filename, "Upload accepted");
        Ok(UploadReceipt {
            stored_name: body.filename,
        })
    }

    async fn process_document(
        &self,
        stored_names: &[String],
    ) -> Result<ProcessReport, IngestionError> {
        debug!(route = "process", files = stored_names.len(), "Processing documents");

        let request = ProcessRequest {
            filenames: stored_names,
        };
        let response = self
            .client
            .post(self.endpoint("process"))
            .json(&request)
            .send()
            .await
            .map_err(|e| IngestionError::Processing(e.to_string()))?;
        let response = check_status(response)
            .await
            .map_err(|e| IngestionError::Processing(describe_status(e)))?;

        let body: ProcessResponse = response
            .json()
            .await
            .map_err(|e| IngestionError::Processing(format!("invalid process response: {e}")))?;

        // The server answers 200 with {"status": "error"} when processing aborts.
        let Some(units_generated) = body.qa_pairs_generated else {
            let reason = body
                .error
                .or(body.message)
                .or(body.status)
                .unwrap_or_else(|| "no units reported".to_string());
            return Err(IngestionError::Processing(reason));
        };

        debug!(route = "process", units_generated, "Processing finished");
        Ok(ProcessReport {
            units_generated,
            message: body.message,
        })
    }

    async fn knowledge_base_size(&self) -> Result<u64, IngestionError> {
        let response = self
            .client
            .get(self.endpoint("db_status"))
            .send()
            .await
            .map_err(|e| IngestionError::SizeQuery(e.to_string()))?;
        let response = check_status(response)
            .await
            .map_err(|e| IngestionError::SizeQuery(describe_status(e)))?;

        let body: DbStatusResponse = response
            .json()
            .await
            .map_err(|e| IngestionError::SizeQuery(format!("invalid db_status response: {e}")))?;

        debug!(route = "db_status", kb_size = body.count, "Knowledge base size");
        Ok(body.count)
    }

    async fn flush_knowledge_base(&self) -> Result<(), IngestionError> {
        let response = self
            .client
            .post(self.endpoint("flush"))
            .send()
            .await
            .map_err(|e| IngestionError::Flush(e.to_string()))?;
        check_status(response)
            .await
            .map_err(|e| IngestionError::Flush(describe_status(e)))?;

        debug!(route = "flush", "Knowledge base flushed");
        Ok(())
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send_chat_message(&self, text: &str, secret: &str) -> Result<ChatReply, ChatError> {
        if secret.is_empty() {
            return Err(ChatError::MissingSecret);
        }

        debug!(
            route = "chat",
            message_len = text.len(),
            secret_len = secret.len(),
            "Sending chat message"
        );

        let request = ChatRequest {
            message: text,
            api_key: secret,
        };
        let response = self
            .client
            .post(self.endpoint("chat"))
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Transport(mask_secret(&e.to_string(), secret)))?;
        let response = check_status(response)
            .await
            .map_err(|(status, body)| ChatError::Status {
                status,
                body: mask_secret(&body, secret),
            })?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))?;

        debug!(route = "chat", reply_len = body.response.len(), "Chat reply received");
        Ok(ChatReply {
            reply: body.response,
        })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    filename: String,
}

#[derive(Debug, Serialize)]
struct ProcessRequest<'a> {
    filenames: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ProcessResponse {
    status: Option<String>,
    qa_pairs_generated: Option<u64>,
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DbStatusResponse {
    count: u64,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    api_key: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accept one connection, answer with `status` and a JSON `body`, and
    /// hand back the raw request text. Handles both sized and chunked bodies.
    async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];

            // Read headers, then the body announced by Content-Length.
            let header_end = loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if let Some(pos) = find(&request, b"\r\n\r\n") {
                    break pos + 4;
                }
                if n == 0 {
                    break request.len();
                }
            };
            let headers = String::from_utf8_lossy(&request[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let chunked = headers.contains("transfer-encoding: chunked");
            loop {
                let complete = if chunked {
                    request.ends_with(b"0\r\n\r\n")
                } else {
                    request.len() >= header_end + content_length
                };
                if complete {
                    break;
                }
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let reason = if status == 200 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\n\
                 content-type: application/json\r\n\
                 content-length: {}\r\n\
                 connection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}"), handle)
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    /// A base URL nobody listens on.
    async fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let backend = HttpBackend::new("http://127.0.0.1:8000/").unwrap();
        assert_eq!(backend.base_url(), "http://127.0.0.1:8000");
        assert_eq!(backend.endpoint("upload"), "http://127.0.0.1:8000/upload");
        assert_eq!(backend.endpoint("/chat"), "http://127.0.0.1:8000/chat");

        let backend = HttpBackend::new("https://clara.example/api").unwrap();
        assert_eq!(backend.endpoint("db_status"), "https://clara.example/api/db_status");
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_file_field() {
        let (url, server) = serve_once(200, r#"{"filename":"doc1.txt","status":"uploaded"}"#).await;
        let backend = HttpBackend::new(url).unwrap();

        let receipt = backend
            .upload_document(&Document::new("doc1.txt", b"hello world".to_vec()))
            .await
            .unwrap();

        assert_eq!(receipt.stored_name, "doc1.txt");
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /upload "));
        assert!(request.contains("name=\"file\""));
        assert!(request.contains("filename=\"doc1.txt\""));
        assert!(request.contains("hello world"));
    }

    #[tokio::test]
    async fn test_upload_non_success_is_upload_error() {
        let (url, _server) = serve_once(500, r#"{"detail":"disk full"}"#).await;
        let backend = HttpBackend::new(url).unwrap();

        let err = backend
            .upload_document(&Document::new("doc1.txt", b"x".to_vec()))
            .await
            .unwrap_err();

        match err {
            IngestionError::Upload(msg) => {
                assert!(msg.contains("HTTP 500"));
                assert!(msg.contains("disk full"));
            }
            other => panic!("Expected Upload error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_process_reports_units() {
        let (url, server) = serve_once(
            200,
            r#"{"status":"processed","qa_pairs_generated":42,"training_status":"complete"}"#,
        )
        .await;
        let backend = HttpBackend::new(url).unwrap();

        let report = backend
            .process_document(&["doc1.txt".to_string()])
            .await
            .unwrap();

        assert_eq!(report.units_generated, 42);
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /process "));
        assert!(request.contains(r#"{"filenames":["doc1.txt"]}"#));
    }

    #[tokio::test]
    async fn test_process_error_body_with_200_is_processing_error() {
        let (url, _server) =
            serve_once(200, r#"{"status":"error","error":"training crashed"}"#).await;
        let backend = HttpBackend::new(url).unwrap();

        let err = backend
            .process_document(&["doc1.txt".to_string()])
            .await
            .unwrap_err();

        assert_eq!(err, IngestionError::Processing("training crashed".to_string()));
    }

    #[tokio::test]
    async fn test_knowledge_base_size_reads_count() {
        let (url, server) = serve_once(200, r#"{"count":128}"#).await;
        let backend = HttpBackend::new(url).unwrap();

        assert_eq!(backend.knowledge_base_size().await.unwrap(), 128);
        assert!(server.await.unwrap().starts_with("GET /db_status "));
    }

    #[tokio::test]
    async fn test_flush_failure_maps_to_flush_error() {
        let (url, _server) = serve_once(500, r#"{"detail":"locked"}"#).await;
        let backend = HttpBackend::new(url).unwrap();

        let err = backend.flush_knowledge_base().await.unwrap_err();
        assert!(matches!(err, IngestionError::Flush(msg) if msg.contains("HTTP 500")));
    }

    #[tokio::test]
    async fn test_chat_sends_message_and_key() {
        let (url, server) = serve_once(200, r#"{"response":"hi"}"#).await;
        let backend = HttpBackend::new(url).unwrap();

        let reply = backend.send_chat_message("hello", "sk-test-123").await.unwrap();

        assert_eq!(reply.reply, "hi");
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /chat "));
        assert!(request.contains(r#""message":"hello""#));
        assert!(request.contains(r#""api_key":"sk-test-123""#));
    }

    #[tokio::test]
    async fn test_chat_status_error_masks_secret() {
        let (url, _server) = serve_once(401, r#"{"detail":"bad key sk-test-123"}"#).await;
        let backend = HttpBackend::new(url).unwrap();

        let err = backend
            .send_chat_message("hello", "sk-test-123")
            .await
            .unwrap_err();

        match err {
            ChatError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(!body.contains("sk-test-123"));
                assert!(body.contains("***"));
            }
            other => panic!("Expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_unparseable_reply_is_invalid_response() {
        let (url, _server) = serve_once(200, r#"{"answer":"wrong field"}"#).await;
        let backend = HttpBackend::new(url).unwrap();

        let err = backend.send_chat_message("hello", "sk-1").await.unwrap_err();
        assert!(matches!(err, ChatError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_chat_without_secret_never_hits_network() {
        let backend = HttpBackend::new(closed_port_url().await).unwrap();
        let err = backend.send_chat_message("hello", "").await.unwrap_err();
        assert_eq!(err, ChatError::MissingSecret);
    }

    #[tokio::test]
    async fn test_connection_refused_maps_per_operation() {
        let backend = HttpBackend::new(closed_port_url().await).unwrap();

        assert!(matches!(
            backend
                .upload_document(&Document::new("a.txt", b"a".to_vec()))
                .await,
            Err(IngestionError::Upload(_))
        ));
        assert!(matches!(
            backend.knowledge_base_size().await,
            Err(IngestionError::SizeQuery(_))
        ));
        assert!(matches!(
            backend.send_chat_message("hello", "sk-1").await,
            Err(ChatError::Transport(_))
        ));
    }
}
