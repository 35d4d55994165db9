//! Middleware module
//!
//! Request counting for the file server and the access-token extractor.

mod authenticated_user;
mod hit_counter;

pub use authenticated_user::AuthenticatedUser;
pub use hit_counter::HitCounter;
