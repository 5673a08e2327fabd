//! Version information for parkade.

/// Parkade version from Cargo.toml
pub const PARKADE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_semver_like() {
        assert_eq!(PARKADE_VERSION.split('.').count(), 3);
    }
}
