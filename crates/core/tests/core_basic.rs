use certstamp_core::version;

/// The crate exposes its package version.
#[test]
fn version_is_non_empty() {
    let v = version();
    assert!(!v.is_empty());
}
