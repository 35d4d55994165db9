/// Authentication module
///
/// Password hashing, credential extraction, access-token signing and
/// verification, refresh-token records, and the session manager that ties
/// them together.

mod claims;
mod credentials;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use claims::{Claims, ISSUER};
pub use credentials::{extract_api_key, extract_bearer, CredentialError};
pub use jwt::{
    issue_access_token, issue_access_token_at, verify_access_token, verify_access_token_at,
    TokenError,
};
pub use password::{hash_password, verify_password, HASH_COST};
pub use refresh_token::{
    fingerprint, generate_refresh_token, RefreshToken, RefreshTokenState, REFRESH_TOKEN_BYTES,
};
pub use session::{access_token_ttl, refresh_token_ttl, Session, SessionManager};
