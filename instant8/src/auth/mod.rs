//! Authentication: password hashing, JWT session tokens, and the
//! authenticated-user request extractor.

pub mod current_user;
pub mod password;
pub mod session;
