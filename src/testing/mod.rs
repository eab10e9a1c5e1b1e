//! Unified testing utilities
//!
//! Consolidates test helpers into one place so unit tests and integration
//! tests build token responses, flows and credentials the same way.
//!
//! ## Organization
//!
//! - [`fixtures`] - Pre-built test data (flows, credentials, token responses)
//! - [`builders`] - Fluent builders for creating test objects

pub mod builders;
pub mod fixtures;

// Re-export commonly used items for convenience
pub use builders::TokenResponseBuilder;
pub use fixtures::TestFixtures;

/// Common test constants
pub mod constants {
    /// Default test institution base URL
    pub const TEST_BASE_URL: &str = "https://cgnu.edu";

    /// Default test client id
    pub const TEST_CLIENT_ID: &str = "cgnu";

    /// Default test client secret
    pub const TEST_CLIENT_SECRET: &str = "s";

    /// Default test access token
    pub const TEST_ACCESS_TOKEN: &str = "access-token";

    /// Default test refresh token
    pub const TEST_REFRESH_TOKEN: &str = "refresh-token";

    /// Default test user id
    pub const TEST_USER_ID: &str = "1";

    /// Default test user name
    pub const TEST_USER_NAME: &str = "Eve Everyone";

    /// Default test email address
    pub const TEST_EMAIL: &str = "eve@cgnu.edu";
}
