pub mod health;
pub mod hello;

// Sent on every route as a smoke test for header propagation.
pub const TEST_HEADER_NAME: &str = "X-test-header";
pub const TEST_HEADER_VALUE: &str = "test-value";
