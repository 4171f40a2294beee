//! Wire response normalization
//!
//! - [`xml`]: XML → canonical `serde_json::Value` tree
//! - [`response`]: the `ApiResponse` envelope (status, errors, warnings, data)
//! - [`de`]: lenient serde helpers for coerced scalars
//! - `payload`: command-specific shapes (crate-private)

pub mod de;
pub(crate) mod payload;
pub mod response;
pub mod xml;

pub use response::ApiResponse;
