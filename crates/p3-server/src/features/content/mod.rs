//! Static content served from a local directory
//!
//! Requests under `/content` are mapped onto the configured content
//! directory. A path that does not resolve to a file inside that directory is
//! a routing miss and is handed to the next handler.

mod resolve;
mod routes;

pub use resolve::ContentRoot;
pub use routes::{content_routes, serve_content};
