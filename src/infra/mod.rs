pub mod http_client;
pub mod rate_limiter;
pub mod table;

pub use http_client::PubChemClient;
pub use rate_limiter::{Limits, RateLimiter};
