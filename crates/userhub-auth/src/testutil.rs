//! RSA fixtures for tests. Enabled with the `test-utils` feature.

use std::path::PathBuf;
use std::sync::Arc;

use userhub_config::AuthConfig;

use crate::claims::Claims;
use crate::jwt::{Authenticator, now_unix};
use crate::keystore::KeyStore;

pub const PRIMARY_KID: &str = "primary";
pub const SECONDARY_KID: &str = "secondary";

/// The folder holding `primary` and `secondary` keypairs.
pub fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

pub fn test_keystore() -> KeyStore {
    KeyStore::from_dir(fixture_dir()).expect("fixture keys load")
}

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        keys_folder: fixture_dir(),
        active_kid: PRIMARY_KID.to_string(),
        ..AuthConfig::default()
    }
}

/// An authenticator signing with the `primary` fixture key.
pub fn test_authenticator() -> Authenticator {
    Authenticator::new(Arc::new(test_keystore()), &test_auth_config())
        .expect("fixture authenticator")
}

/// A signed token for `subject` holding `roles`, valid from now.
pub fn token_for(auth: &Authenticator, subject: &str, roles: &[&str]) -> String {
    let claims: Claims = auth.issue_claims(
        subject,
        roles.iter().map(|r| r.to_string()).collect(),
        now_unix(),
    );
    auth.generate_token(&claims).expect("fixture token signs")
}
