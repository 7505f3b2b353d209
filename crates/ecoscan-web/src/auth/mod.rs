//! Authentication: password hashing, session cookies and the extractor
//! that guards authenticated routes.

pub mod extract;
pub mod password;
pub mod session;

pub use extract::CurrentUser;
pub use password::{hash_password, verify_password};
pub use session::{clear_cookie, generate_token, session_cookie, token_from_headers};
