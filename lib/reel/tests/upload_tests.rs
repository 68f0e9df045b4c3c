//! Streaming upload behavior against a live mock server.

use bytes::Bytes;
use reel::{
    ByteSource, Error, HttpClientStreaming, HyperClient, MediaClient, MediaConfig, Method, Params,
    Request, Result, StreamSource,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn media_client(server: &MockServer) -> MediaClient {
    let config = MediaConfig::with_endpoints(
        format!("{}/services/library", server.uri()),
        format!("{}/services/post", server.uri()),
    )
    .expect("config");
    MediaClient::with_transport(HyperClient::new(), "TOKEN", config)
}

/// Replace the per-session boundary with a fixed token so bodies from
/// different encoding sessions can be compared.
fn normalize_boundary(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body).to_string();
    let boundary = text
        .strip_prefix("--")
        .and_then(|rest| rest.split("\r\n").next())
        .expect("leading boundary")
        .to_string();
    text.replace(&boundary, "BOUNDARY")
}

#[tokio::test]
async fn buffered_and_streamed_uploads_are_byte_identical_modulo_boundary() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/post"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": 1, "error": null,
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let dir = std::env::temp_dir().join("reel-test-upload-equivalence");
    tokio::fs::create_dir_all(&dir).await.expect("tempdir");
    let file = dir.join("movie.mov");
    tokio::fs::write(&file, b"A".repeat(100_000)).await.expect("write");

    let client = media_client(&mock_server);
    let params = || Params::new().with("video", Params::new().with("name", "Video"));

    client
        .post_file("create_video", &file, params())
        .await
        .expect("buffered upload");
    client
        .post_file_streaming("create_video", &file, "video/quicktime", params())
        .await
        .expect("streaming upload");

    tokio::fs::remove_file(&file).await.expect("cleanup");

    let requests = mock_server.received_requests().await.expect("requests");
    assert_eq!(requests.len(), 2);
    let buffered = normalize_boundary(&requests.first().expect("buffered").body);
    let streamed = normalize_boundary(&requests.get(1).expect("streamed").body);
    assert_eq!(buffered, streamed);
}

#[tokio::test]
async fn download_feeds_upload_without_buffering() {
    let mock_server = MockServer::start().await;

    let payload = b"S".repeat(reel::CHUNK_SIZE * 4 + 99);
    Mock::given(method("GET"))
        .and(path("/download/source.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/services/post"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": 2, "error": null,
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HyperClient::new();

    // Download half of the pipeline: a streaming response body.
    let url = url::Url::parse(&format!("{}/download/source.bin", mock_server.uri())).expect("url");
    let download = transport
        .execute_streaming(Request::builder(Method::Get, url).build())
        .await
        .expect("download");
    assert!(download.is_success());
    let source = StreamSource::new(download.into_body());

    // Upload half: the download stream is the upload payload.
    let config = MediaConfig::with_endpoints(
        format!("{}/services/library", mock_server.uri()),
        format!("{}/services/post", mock_server.uri()),
    )
    .expect("config");
    let client = MediaClient::with_transport(transport, "TOKEN", config);

    let response = client
        .post_io_streaming(
            "create_video",
            source,
            "source.bin",
            "application/octet-stream",
            Params::new(),
        )
        .await
        .expect("upload");
    assert!(response.is_success());

    let requests = mock_server.received_requests().await.expect("requests");
    let upload = requests
        .iter()
        .find(|r| r.url.path() == "/services/post")
        .expect("upload request");
    assert!(upload.body.len() > payload.len());
    assert!(
        upload
            .body
            .windows(payload.len())
            .any(|window| window == payload)
    );
}

struct FailingSource {
    reads_left: usize,
}

impl ByteSource for FailingSource {
    async fn read_chunk(&mut self, max_bytes: usize) -> Result<Option<Bytes>> {
        if self.reads_left == 0 {
            return Err(Error::stream_read("source interrupted"));
        }
        self.reads_left -= 1;
        Ok(Some(Bytes::from(vec![0u8; max_bytes.min(1024)])))
    }
}

#[tokio::test]
async fn mid_stream_failure_aborts_upload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/post"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = media_client(&mock_server);

    // The body stream errors after two chunks: the request must fail rather
    // than frame a truncated body as complete.
    let result = client
        .post_io_streaming(
            "create_video",
            FailingSource { reads_left: 2 },
            "movie.mov",
            "video/quicktime",
            Params::new(),
        )
        .await;

    assert!(result.is_err());
}
