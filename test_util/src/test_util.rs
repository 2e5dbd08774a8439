//! test utilities
//!
//! [`StubVault`] is an in-process http server that answers the transit
//! encrypt, decrypt and rewrap endpoints for a single key. Its ciphertext is
//! `vault:v<n>:<base64 plaintext>`, so tests can reason about values without
//! real cryptography.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::BytesMut;
use random_fast_rng::{FastRng, Random};
use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};

/// compare two arrays for equality
/// Returns true if arrays have the same length and corresponding elements are "equal"
/// ```
/// use gruntr_test_util::arrays_eq;
/// let first: Vec<u8> = vec![1,2,3,4,5];
/// let mut second: Vec<u8> = Vec::new();
/// second.extend_from_slice(&first);
/// assert!(arrays_eq(&first, &second));
/// ```
pub fn arrays_eq<T: PartialEq>(a1: &[T], a2: &[T]) -> bool {
    a1.len() == a2.len() && a1.iter().zip(a2.iter()).all(|(a, b)| a == b)
}

/// Create a BytesMut buffer and fill with random data.
/// Not cryptographically secure; for tests only.
/// ```
/// use gruntr_test_util::random_bytes;
/// assert_eq!(random_bytes(128).len(), 128);
/// ```
pub fn random_bytes(len: usize) -> BytesMut {
    let mut buf = BytesMut::zeroed(len);
    FastRng::new().fill_bytes(buf.as_mut());
    buf
}

/// Random word-like lowercase text, usable as a property value
/// ```
/// use gruntr_test_util::random_text;
/// let text = random_text(64);
/// assert_eq!(text.len(), 64);
/// assert!(text.chars().all(|c| c == ' ' || c.is_ascii_lowercase()));
/// ```
pub fn random_text(len: usize) -> String {
    // 32 chars, for the bitmask below
    const ENGLISH_TEXT_CHARS: &[u8] = b"abcdefghijklmnoprstuvwxyz   etao";
    let mut rng = FastRng::new();
    (0..len)
        .map(|_| ENGLISH_TEXT_CHARS[rng.get_u8() as usize & 31] as char)
        .collect()
}

/// Answers transit requests the way the vault transit engine shapes them
struct TransitResponder {
    action: &'static str,
}

impl TransitResponder {
    fn input<'r>(body: &'r Value, field: &str) -> Option<&'r str> {
        body.get(field).and_then(Value::as_str)
    }

    /// splits `vault:v<n>:<payload>` into (n, payload)
    fn parse_ciphertext(ciphertext: &str) -> Option<(u32, &str)> {
        let rest = ciphertext.strip_prefix("vault:v")?;
        let (version, payload) = rest.split_once(':')?;
        Some((version.parse().ok()?, payload))
    }

    fn bad_request(msg: &str) -> ResponseTemplate {
        ResponseTemplate::new(400).set_body_json(json!({ "errors": [msg] }))
    }
}

impl Respond for TransitResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = match serde_json::from_slice(&request.body) {
            Ok(v) => v,
            Err(_) => return Self::bad_request("invalid request body"),
        };
        match self.action {
            "encrypt" => match Self::input(&body, "plaintext") {
                Some(p) if BASE64.decode(p).is_ok() => ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "ciphertext": format!("vault:v1:{}", p) } })),
                _ => Self::bad_request("missing or invalid plaintext"),
            },
            "decrypt" => match Self::input(&body, "ciphertext").and_then(Self::parse_ciphertext) {
                Some((_, payload)) => ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "plaintext": payload } })),
                None => Self::bad_request("invalid ciphertext"),
            },
            _ => match Self::input(&body, "ciphertext").and_then(Self::parse_ciphertext) {
                Some((version, payload)) => ResponseTemplate::new(200).set_body_json(json!({
                    "data": { "ciphertext": format!("vault:v{}:{}", version + 1, payload) }
                })),
                None => Self::bad_request("invalid ciphertext"),
            },
        }
    }
}

/// Stub vault transit engine serving one mount path and key, accepting one token.
/// Requests with any other token or path get a 404 from the mock server.
pub struct StubVault {
    server: MockServer,
    mount_path: String,
    key_name: String,
}

impl StubVault {
    pub async fn start(mount_path: &str, key_name: &str, token: &str) -> StubVault {
        let server = MockServer::start().await;
        for action in ["encrypt", "decrypt", "rewrap"] {
            Mock::given(method("POST"))
                .and(path(format!("/v1/{}/{}/{}", mount_path, action, key_name)))
                .and(header("X-Vault-Token", token))
                .and(header("Accept", "application/json"))
                .respond_with(TransitResponder { action })
                .mount(&server)
                .await;
        }
        StubVault {
            server,
            mount_path: mount_path.to_string(),
            key_name: key_name.to_string(),
        }
    }

    /// base url, without trailing slash
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// all requests received so far, in arrival order
    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    pub async fn request_count(&self) -> usize {
        self.requests().await.len()
    }

    /// number of requests received for one action ("encrypt", "decrypt" or "rewrap")
    pub async fn requests_for(&self, action: &str) -> usize {
        let target = format!("/v1/{}/{}/{}", self.mount_path, action, self.key_name);
        self.requests()
            .await
            .iter()
            .filter(|r| r.url.path() == target)
            .count()
    }
}
