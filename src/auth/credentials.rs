/// Credential extraction from the `Authorization` header
///
/// Accepts exactly `<Scheme> <value>`: one space, two parts, case-sensitive scheme.

use std::fmt;

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CredentialError {
    Missing,
    Malformed,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::Missing => write!(f, "missing Authorization header"),
            CredentialError::Malformed => write!(f, "bad Authorization header"),
        }
    }
}

impl std::error::Error for CredentialError {}

const BEARER: &str = "Bearer";
const API_KEY: &str = "ApiKey";

/// Extract the token from `Authorization: Bearer <token>`
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, CredentialError> {
    extract_scheme(headers, BEARER)
}

/// Extract the key from `Authorization: ApiKey <key>`
pub fn extract_api_key(headers: &HeaderMap) -> Result<String, CredentialError> {
    extract_scheme(headers, API_KEY)
}

fn extract_scheme(headers: &HeaderMap, scheme: &str) -> Result<String, CredentialError> {
    let value = match headers.get(AUTHORIZATION) {
        None => return Err(CredentialError::Missing),
        Some(value) => value.to_str().map_err(|_| CredentialError::Malformed)?,
    };
    if value.is_empty() {
        return Err(CredentialError::Missing);
    }

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [found, credential] if *found == scheme && !credential.is_empty() => {
            Ok((*credential).to_string())
        }
        _ => Err(CredentialError::Malformed),
    }
}
