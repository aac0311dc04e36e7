//! Global subscriber installation, kept in its own test binary

use clarity_harness::logging;

#[test]
fn test_init_is_idempotent() {
    std::env::remove_var("RUST_LOG");
    assert!(!tracing::dispatcher::has_been_set());
    logging::init("warn");
    assert!(tracing::dispatcher::has_been_set());

    // The first subscriber stays in place.
    logging::init("trace");
    assert!(tracing::dispatcher::has_been_set());
    assert!(!tracing::enabled!(tracing::Level::TRACE));
}
