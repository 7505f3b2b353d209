//! API routes

pub mod auth;
pub mod chat;
pub mod health;
pub mod history;
pub mod profile;
pub mod scan;
pub mod tasks;

pub use auth::auth_routes;
pub use chat::chat_routes;
pub use health::health_routes;
pub use history::history_routes;
pub use profile::profile_routes;
pub use scan::scan_routes;
pub use tasks::task_routes;
