//! Runtime support for generated request builders.
//!
//! Generated code reaches everything through this module: the registered
//! [`RestClient`], request assembly helpers and the [`FromResponse`] decoding
//! hook. `reqwest` is re-exported so generated code names the same version.
//!
//! ```no_run
//! use restgen::restclient::{self, RestClient};
//!
//! restclient::register_client(RestClient::with_base_url("http://localhost:8080")?);
//! # Ok::<(), restclient::Error>(())
//! ```

mod client;
mod error;
mod values;

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use reqwest::blocking::{Request, Response};
use reqwest::header::{HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use client::{RestClient, RestClientOptions, RestClientOptionsBuilder};
pub use error::{Error, Result};
pub use reqwest;
pub use values::Values;

static REGISTERED: ArcSwapOption<RestClient> = ArcSwapOption::const_empty();

/// Make `client` the one used by every generated builder.
///
/// Replaces any previously registered client. Builders already executing
/// keep the client they loaded.
pub fn register_client(client: RestClient) -> Arc<RestClient> {
    let client = Arc::new(client);
    tracing::debug!(base_url = client.base_url(), "registering rest client");
    REGISTERED.store(Some(Arc::clone(&client)));
    client
}

/// Remove the registered client, returning it.
pub fn unregister_client() -> Option<Arc<RestClient>> {
    REGISTERED.swap(None)
}

/// The registered client, or [`Error::UnregisteredClient`].
pub fn client() -> Result<Arc<RestClient>> {
    REGISTERED.load_full().ok_or(Error::UnregisteredClient)
}

/// Replace each `{key}` in `template` with its substitution.
///
/// A single left-to-right pass: substituted text is never rescanned, so the
/// result does not depend on the order of `substitutions`. Placeholders with
/// no substitution stay as written.
pub fn expand_path(template: &str, substitutions: &BTreeMap<String, String>) -> String {
    if substitutions.is_empty() {
        return template.to_string();
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match substitutions.get(key) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 2]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

/// Serialize a request body as JSON.
pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(Error::Encoding)
}

/// Decode a JSON response body.
pub fn decode_json<T: DeserializeOwned>(body: &mut dyn Read) -> Result<T> {
    serde_json::from_reader(body).map_err(Error::Decode)
}

/// Rewrite the query string in canonical form: keys sorted, values escaped.
pub fn reencode_query(request: &mut Request) {
    if request.url().query().is_none() {
        return;
    }
    let values: Values = request.url().query_pairs().into_owned().collect();
    let encoded = values.encode();
    request
        .url_mut()
        .set_query((!encoded.is_empty()).then_some(encoded.as_str()));
}

/// Set `key` to `value`, replacing any value already present.
pub fn set_header(request: &mut Request, key: &str, value: &str) -> Result<()> {
    let name = HeaderName::from_bytes(key.as_bytes())?;
    let value = HeaderValue::from_str(value)?;
    request.headers_mut().insert(name, value);
    Ok(())
}

pub fn debug_request(request: &Request) {
    tracing::info!(
        method = %request.method(),
        url = %request.url(),
        headers = ?request.headers(),
        body_len = ?request.body().and_then(|b| b.as_bytes()).map(<[u8]>::len),
        "rest request"
    );
}

pub fn debug_response(response: &Response) {
    tracing::info!(
        status = %response.status(),
        url = %response.url(),
        headers = ?response.headers(),
        "rest response"
    );
}

/// Builds a result value out of a response body.
///
/// The sync result type of every endpoint implements this. Types that are
/// plain JSON documents forward to [`decode_json`]:
///
/// ```
/// use std::io::Read;
/// use restgen::restclient::{self, FromResponse};
///
/// #[derive(serde::Deserialize)]
/// struct Photo {
///     id: u64,
/// }
///
/// impl FromResponse for Photo {
///     fn from_response(body: &mut dyn Read) -> restclient::Result<Self> {
///         restclient::decode_json(body)
///     }
/// }
/// ```
pub trait FromResponse: Sized {
    fn from_response(body: &mut dyn Read) -> Result<Self>;
}

impl FromResponse for String {
    fn from_response(body: &mut dyn Read) -> Result<Self> {
        let mut text = String::new();
        body.read_to_string(&mut text)?;
        Ok(text)
    }
}

impl FromResponse for Vec<u8> {
    fn from_response(body: &mut dyn Read) -> Result<Self> {
        let mut bytes = Vec::new();
        body.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl FromResponse for serde_json::Value {
    fn from_response(body: &mut dyn Read) -> Result<Self> {
        decode_json(body)
    }
}
