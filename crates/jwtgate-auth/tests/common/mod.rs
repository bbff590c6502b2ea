//! Common test utilities for integration tests
//!
//! Provides a wiremock-backed JWKS endpoint, fixture keys and certificates
//! (generated once with openssl), and token signing helpers.

#![allow(dead_code)]

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};
use std::time::{SystemTime, UNIX_EPOCH};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

/// PKCS#8 RSA key whose certificate is `RSA_CERT`
pub const RSA_SIGNING_KEY: &str = include_str!("../fixtures/rsa_signing_key.pem");
/// Base64 DER self-signed certificate for `RSA_SIGNING_KEY`
pub const RSA_CERT: &str = include_str!("../fixtures/rsa_cert.b64");
/// RSA key that is not published anywhere
pub const RSA_ROGUE_KEY: &str = include_str!("../fixtures/rsa_rogue_key.pem");
/// PKCS#8 P-256 key whose certificate is `EC_CERT`
pub const EC_SIGNING_KEY: &str = include_str!("../fixtures/ec_signing_key.pem");
/// Base64 DER self-signed certificate for `EC_SIGNING_KEY`
pub const EC_CERT: &str = include_str!("../fixtures/ec_cert.b64");

/// Mock identity provider serving a JWKS document
pub struct MockJwksServer {
    pub server: MockServer,
    pub jwks_url: String,
}

impl MockJwksServer {
    /// Start an empty mock server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let jwks_url = format!("{}/jwks", server.uri());
        Self { server, jwks_url }
    }

    /// Serve `document` at `/jwks`
    ///
    /// When `expected_calls` is set, the server panics on drop if the endpoint
    /// was hit a different number of times.
    pub async fn mock_jwks(&self, document: Value, expected_calls: Option<u64>) {
        let response = ResponseTemplate::new(200).set_body_json(document);
        self.mock_response(response, expected_calls).await;
    }

    /// Serve an arbitrary response at `/jwks`
    pub async fn mock_response(&self, response: ResponseTemplate, expected_calls: Option<u64>) {
        let mock = Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(response);
        let mock = match expected_calls {
            Some(n) => mock.expect(n),
            None => mock,
        };
        mock.mount(&self.server).await;
    }

    /// Start a server publishing one certificate under `kid`
    pub async fn publishing(kid: &str, cert: &str, expected_calls: Option<u64>) -> Self {
        let idp = Self::start().await;
        idp.mock_jwks(jwks_document(&[(kid, cert)]), expected_calls)
            .await;
        idp
    }

    /// Number of requests received so far
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }
}

/// JWKS document with one certificate-backed key per `(kid, cert)` pair
pub fn jwks_document(entries: &[(&str, &str)]) -> Value {
    let keys: Vec<Value> = entries
        .iter()
        .map(|(kid, cert)| {
            json!({
                "kty": "RSA",
                "use": "sig",
                "kid": kid,
                "x5c": [cert.trim()],
            })
        })
        .collect();
    json!({ "keys": keys })
}

/// Sign `claims` with RS256 under `kid`
pub fn sign_rs256(kid: &str, claims: &Value) -> String {
    sign(Algorithm::RS256, kid, claims, RSA_SIGNING_KEY)
}

/// Sign `claims` with ES256 under `kid`
pub fn sign_es256(kid: &str, claims: &Value) -> String {
    sign(Algorithm::ES256, kid, claims, EC_SIGNING_KEY)
}

/// Sign `claims` with an arbitrary algorithm and PEM key
pub fn sign(algorithm: Algorithm, kid: &str, claims: &Value, pem: &str) -> String {
    let mut header = Header::new(algorithm);
    header.kid = Some(kid.to_string());

    let key = match algorithm {
        Algorithm::ES256 | Algorithm::ES384 => EncodingKey::from_ec_pem(pem.as_bytes()),
        _ => EncodingKey::from_rsa_pem(pem.as_bytes()),
    }
    .expect("Invalid fixture key");

    encode(&header, claims, &key).expect("Failed to sign JWT")
}

/// Assemble a token from raw header/payload JSON and a signature segment
pub fn raw_token(header: &str, payload: &str, signature: &str) -> String {
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(payload),
        signature
    )
}

/// Flip one bit of the first signature byte, keeping valid base64url
pub fn flip_signature_byte(token: &str) -> String {
    let (signed, signature) = token.rsplit_once('.').expect("Token has no signature");
    let mut bytes = URL_SAFE_NO_PAD
        .decode(signature)
        .expect("Invalid signature");
    bytes[0] ^= 0x01;
    format!("{signed}.{}", URL_SAFE_NO_PAD.encode(bytes))
}

/// Current Unix timestamp
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}
