//! Mock identity helpers for integration tests.
//!
//! In production the platform proxy or the identity provider produces the evidence a
//! sign-in request carries. In tests, `MockIdentity` builds that evidence directly so no
//! proxy, provider or real signing key is needed.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use http::{HeaderMap, HeaderName, HeaderValue};
use jsonwebtoken::{EncodingKey, Header, encode};

use locasso_auth_types::developer::DEV_FLAG_HEADER;
use locasso_auth_types::principal::{Claim, Principal};
use locasso_auth_types::proxy::{
    PRINCIPAL_EMAIL_HEADER, PRINCIPAL_HEADER, PRINCIPAL_ID_HEADER, PRINCIPAL_IDP_HEADER,
    PRINCIPAL_NAME_HEADER,
};
use locasso_auth_types::token::ID_TOKEN_HEADER;
use locasso_domain::provider;

pub const APPLE_ISSUER: &str = "https://appleid.apple.com";
pub const GOOGLE_ISSUER: &str = "https://accounts.google.com";

/// Signing key for test tokens. The service never verifies it.
const TEST_SIGNING_SECRET: &[u8] = b"test-only-identity-token-secret";

/// Configurable identity rendered as request evidence.
#[derive(Debug, Clone)]
pub struct MockIdentity {
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub photo_url: String,
    pub provider: String,
}

impl MockIdentity {
    /// An Apple identity with no name or photo.
    pub fn new(external_id: &str, email: &str) -> Self {
        Self {
            external_id: external_id.to_owned(),
            email: email.to_owned(),
            name: String::new(),
            photo_url: String::new(),
            provider: provider::APPLE.to_owned(),
        }
    }

    pub fn provider(mut self, provider: &str) -> Self {
        self.provider = provider.to_owned();
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }

    pub fn photo_url(mut self, photo_url: &str) -> Self {
        self.photo_url = photo_url.to_owned();
        self
    }

    /// Headers as if the platform proxy injected them.
    pub fn proxy_headers(&self) -> HeaderMap {
        let blob = serde_json::json!({
            "auth_typ": self.provider,
            "claims": [
                { "typ": "name", "val": self.name },
                { "typ": "picture", "val": self.photo_url },
            ],
        });
        let mut map = HeaderMap::new();
        insert(&mut map, PRINCIPAL_ID_HEADER, &self.external_id);
        insert(&mut map, PRINCIPAL_HEADER, &STANDARD.encode(blob.to_string()));
        insert(&mut map, PRINCIPAL_EMAIL_HEADER, &self.email);
        insert(&mut map, PRINCIPAL_NAME_HEADER, &self.name);
        insert(&mut map, PRINCIPAL_IDP_HEADER, &self.provider);
        map
    }

    /// An identity token from `issuer`, signed with a throwaway key.
    pub fn id_token(&self, issuer: &str) -> String {
        let claims = serde_json::json!({
            "sub": self.external_id,
            "email": self.email,
            "name": self.name,
            "picture": self.photo_url,
            "iss": issuer,
            "aud": "com.locasso.app",
        });
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SIGNING_SECRET),
        )
        .unwrap()
    }

    /// Headers carrying an identity token from `issuer`.
    pub fn id_token_headers(&self, issuer: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        insert(&mut map, ID_TOKEN_HEADER, &self.id_token(issuer));
        map
    }

    /// Headers opting in to developer parameters.
    pub fn dev_flag_headers() -> HeaderMap {
        let mut map = HeaderMap::new();
        insert(&mut map, DEV_FLAG_HEADER, "true");
        map
    }

    /// Developer-mode query parameters as `(name, value)` pairs.
    pub fn dev_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("dev", "true".to_owned()),
            ("id", self.external_id.clone()),
            ("email", self.email.clone()),
            ("name", self.name.clone()),
            ("photoUrl", self.photo_url.clone()),
            ("provider", self.provider.clone()),
        ]
    }

    /// Developer-mode JSON body.
    pub fn dev_body(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.external_id,
            "email": self.email,
            "name": self.name,
            "photoUrl": self.photo_url,
            "provider": self.provider,
        })
    }

    /// Principal as an upstream authentication layer would attach it.
    pub fn principal(&self) -> Principal {
        Principal::new(
            Some(&self.provider),
            vec![
                Claim::new("sub", &self.external_id),
                Claim::new("email", &self.email),
                Claim::new("name", &self.name),
                Claim::new("picture", &self.photo_url),
            ],
        )
    }
}

fn insert(map: &mut HeaderMap, name: &'static str, value: &str) {
    map.insert(
        HeaderName::from_static(name),
        HeaderValue::from_str(value).unwrap(),
    );
}
