//! Security configuration supplied by the provisioning collaborator.

use super::constants::{RATE_LIMIT_CAPACITY, SHARED_SECRET_SIZE};

/// Link security policy and provisioned key material.
///
/// Supplied once at startup and again after any configuration update.
/// The engine treats an update as a whole-value replacement: a new
/// pre-shared secret swaps both session keys atomically, never one half.
#[derive(Clone)]
pub struct SecurityConfig {
    /// Reject unencrypted control frames even before a session exists.
    pub require_encryption: bool,

    /// Pre-shared 32-byte secret; installs session keys at construction.
    ///
    /// A later ECDH handshake replaces keys derived from this value.
    pub preshared_secret: Option<[u8; SHARED_SECRET_SIZE]>,

    /// Token bucket capacity (also the sustained commands-per-second rate).
    pub rate_limit_capacity: u16,

    /// Require the vehicle-type tag to be one of the four defined types.
    pub strict_vehicle_check: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            require_encryption: false,
            preshared_secret: None,
            rate_limit_capacity: RATE_LIMIT_CAPACITY,
            strict_vehicle_check: true,
        }
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of debug output and logs.
        f.debug_struct("SecurityConfig")
            .field("require_encryption", &self.require_encryption)
            .field(
                "preshared_secret",
                &self.preshared_secret.as_ref().map(|_| "<32 bytes>"),
            )
            .field("rate_limit_capacity", &self.rate_limit_capacity)
            .field("strict_vehicle_check", &self.strict_vehicle_check)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_firmware() {
        let config = SecurityConfig::default();
        assert!(!config.require_encryption);
        assert!(config.preshared_secret.is_none());
        assert_eq!(config.rate_limit_capacity, 100);
        assert!(config.strict_vehicle_check);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = SecurityConfig {
            preshared_secret: Some([0xAA; 32]),
            ..SecurityConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("170"));
        assert!(rendered.contains("<32 bytes>"));
    }
}
