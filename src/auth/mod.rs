// src/auth/mod.rs
use base64::{engine::general_purpose::STANDARD, Engine};
use hyper::header::AUTHORIZATION;
use hyper::Request;

/// Credentials carried by a `Authorization: Basic` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub name: String,
    pub pass: String,
}

/// Extract basic-auth credentials from a request.
///
/// Returns `None` for a missing header, a non-Basic scheme, invalid
/// base64, or a payload without a `name:pass` separator. Garbage
/// credentials are an auth failure for the caller to 401, never an
/// error.
pub fn basic_credentials<B>(req: &Request<B>) -> Option<Credentials> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (name, pass) = decoded.split_once(':')?;

    Some(Credentials {
        name: name.to_string(),
        pass: pass.to_string(),
    })
}
