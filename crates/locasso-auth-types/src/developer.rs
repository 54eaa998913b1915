//! Developer-mode identity parameters for testing without a live identity provider.
//!
//! Only honoured when the service runs in developer mode AND the caller opts in with
//! `?dev=true` or the [`DEV_FLAG_HEADER`] header. The values are passed through as-is;
//! they are never trusted more than any other evidence source.

use http::HeaderMap;
use serde::{Deserialize, Serialize};

use locasso_domain::provider;

use crate::principal::Claim;
use crate::proxy::header_str;

/// Header a caller sets to opt in to developer parameters.
pub const DEV_FLAG_HEADER: &str = "x-dev-auth";

/// Identity supplied directly by a developer, from the query string or a JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeveloperParams {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "photo_url")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DevFlag {
    #[serde(default)]
    dev: Option<String>,
}

impl DeveloperParams {
    /// Parse from a raw query string. Unparseable input yields empty params.
    pub fn from_query(raw_query: Option<&str>) -> Self {
        raw_query
            .and_then(|q| serde_qs::from_str(q).ok())
            .unwrap_or_default()
    }

    /// Parse from a JSON request body. Empty or invalid bodies yield empty params.
    pub fn from_body(body: &[u8]) -> Self {
        if body.is_empty() {
            return Self::default();
        }
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Query parameters when they carry an id, else the body.
    pub fn from_request(raw_query: Option<&str>, body: &[u8]) -> Self {
        let query = Self::from_query(raw_query);
        if query.has_id() {
            query
        } else {
            Self::from_body(body)
        }
    }

    pub fn has_id(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.trim().is_empty())
    }

    pub fn id(&self) -> &str {
        field(&self.id)
    }

    pub fn email(&self) -> &str {
        field(&self.email)
    }

    pub fn name(&self) -> &str {
        field(&self.name)
    }

    pub fn photo_url(&self) -> &str {
        field(&self.photo_url)
    }

    /// Provider tag, `"dev"` when not supplied.
    pub fn provider(&self) -> &str {
        match field(&self.provider) {
            "" => provider::DEV,
            p => p,
        }
    }

    pub fn claims(&self) -> Vec<Claim> {
        vec![
            Claim::new("sub", self.id()),
            Claim::new("email", self.email()),
            Claim::new("name", self.name()),
            Claim::new("picture", self.photo_url()),
            Claim::new("idp", self.provider()),
        ]
    }
}

/// Whether the caller asked for developer parameters to be used.
pub fn dev_flag_requested(headers: &HeaderMap, raw_query: Option<&str>) -> bool {
    let from_query = raw_query
        .and_then(|q| serde_qs::from_str::<DevFlag>(q).ok())
        .and_then(|f| f.dev);
    let from_header = header_str(headers, DEV_FLAG_HEADER);
    from_query.as_deref().is_some_and(is_truthy) || is_truthy(from_header)
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}
