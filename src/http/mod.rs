//! HTTP protocol layer module
//!
//! Protocol helpers shared by the handlers: CORS header injection, MIME
//! detection, path decoding, directory listings and response builders.

pub mod cors;
pub mod date;
pub mod listing;
pub mod mime;
pub mod path;
pub mod response;

// Re-export commonly used types
pub use cors::with_cors;
pub use response::{
    build_304_response, build_405_response, build_error_response, build_file_response,
    build_html_response, build_options_response, build_redirect_response,
};
