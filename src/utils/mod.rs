// URL handling utilities
pub mod url_encoding;
pub mod url_path;

pub use url_encoding::parse_urlencoded_body;
pub use url_path::is_local_redirect;
