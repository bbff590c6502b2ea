//! Shared helpers for plugin integration tests

#![allow(dead_code)]

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use jwtgate_auth::jwt::{JwksFetcher, JwtVerifier, KeyResolver};
use jwtgate_plugin::JwtPlugin;
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const RSA_SIGNING_KEY: &str =
    include_str!("../../../jwtgate-auth/tests/fixtures/rsa_signing_key.pem");
pub const RSA_CERT: &str = include_str!("../../../jwtgate-auth/tests/fixtures/rsa_cert.b64");

/// Mock identity provider publishing the RSA fixture certificate under `kid`
pub async fn identity_provider(kid: &str, expected_calls: u64) -> (MockServer, String) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discovery/keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keys": [{ "kid": kid, "x5c": [RSA_CERT.trim()] }]
        })))
        .expect(expected_calls)
        .mount(&server)
        .await;
    let url = format!("{}/discovery/keys", server.uri());
    (server, url)
}

/// RS256 token signed with the fixture key
pub fn sign_rs256(kid: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(RSA_SIGNING_KEY.as_bytes()).expect("Invalid fixture key");
    encode(&header, claims, &key).expect("Failed to sign JWT")
}

/// Uncached plugin pointed at `jwks_url`
pub fn plugin(jwks_url: Option<&str>) -> JwtPlugin {
    let resolver: Arc<dyn KeyResolver> =
        Arc::new(JwksFetcher::new().expect("Failed to build fetcher"));
    JwtPlugin::new(
        "azure-jwt",
        jwks_url.map(str::to_string),
        JwtVerifier::with_resolver(resolver),
    )
}
