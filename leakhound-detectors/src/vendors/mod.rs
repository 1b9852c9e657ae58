//! Vendor detector implementations
//!
//! [`table`] holds the data-driven rows; the submodules are the handful of
//! detectors whose verification or rendering does not fit the table.

pub mod jdbc;
pub mod okta;
pub mod paypal_oauth;
pub mod table;

pub use jdbc::Jdbc;
pub use okta::Okta;
pub use paypal_oauth::PaypalOauth;
pub use table::builtin_specs;
