//! Key id to RSA key resolution.
//!
//! A key folder holds one file per key half:
//!
//! ```text
//! resources/keys/
//! ├── 54bb2165-71e1-41a6-af3e-7da4a0e1e2c1.pem      # private key (PKCS#1 or PKCS#8)
//! ├── 54bb2165-71e1-41a6-af3e-7da4a0e1e2c1.pub.pem  # public key
//! └── 3a4f0c1e-retired.pub.pem                      # verify-only, no private half
//! ```
//!
//! The store is built once at startup and only read afterwards.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;

use jsonwebtoken::{DecodingKey, EncodingKey};
use tracing::{debug, info};

use crate::error::AuthError;

const PRIVATE_SUFFIX: &str = ".pem";
const PUBLIC_SUFFIX: &str = ".pub.pem";

/// Resolves the keys used to sign and verify tokens.
pub trait KeyLookup: Send + Sync {
    fn private_key(&self, kid: &str) -> Result<&EncodingKey, AuthError>;
    fn public_key(&self, kid: &str) -> Result<&DecodingKey, AuthError>;
}

struct KeyPair {
    private: Option<EncodingKey>,
    public: DecodingKey,
}

#[derive(Default)]
pub struct KeyStore {
    keys: HashMap<String, KeyPair>,
}

impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore")
            .field("kids", &self.kids())
            .finish()
    }
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a signing keypair from PEM bytes.
    pub fn insert_keypair(
        &mut self,
        kid: impl Into<String>,
        private_pem: &[u8],
        public_pem: &[u8],
    ) -> Result<(), AuthError> {
        let kid = kid.into();
        let private = EncodingKey::from_rsa_pem(private_pem).map_err(|source| {
            AuthError::KeyLoad {
                kid: kid.clone(),
                source,
            }
        })?;
        let public = decoding_key(&kid, public_pem)?;
        self.keys.insert(
            kid,
            KeyPair {
                private: Some(private),
                public,
            },
        );
        Ok(())
    }

    /// Adds a verify-only key. Tokens signed with it still validate, but it
    /// can never sign.
    pub fn insert_public(&mut self, kid: impl Into<String>, public_pem: &[u8]) -> Result<(), AuthError> {
        let kid = kid.into();
        let public = decoding_key(&kid, public_pem)?;
        self.keys.insert(
            kid,
            KeyPair {
                private: None,
                public,
            },
        );
        Ok(())
    }

    /// Loads every `<kid>.pem` / `<kid>.pub.pem` file in `dir`.
    ///
    /// Files without either suffix are ignored. A private key without its
    /// public half is an error; a public key without a private half is loaded
    /// as verify-only.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, AuthError> {
        let dir = dir.as_ref();
        let io_err = |source| AuthError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut private: HashMap<String, Vec<u8>> = HashMap::new();
        let mut public: HashMap<String, Vec<u8>> = HashMap::new();

        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let (kid, target) = if let Some(kid) = name.strip_suffix(PUBLIC_SUFFIX) {
                (kid.to_string(), &mut public)
            } else if let Some(kid) = name.strip_suffix(PRIVATE_SUFFIX) {
                (kid.to_string(), &mut private)
            } else {
                debug!(file = %name, "skipping non-key file");
                continue;
            };

            let pem = fs::read(&path).map_err(|source| AuthError::Io {
                path: path.clone(),
                source,
            })?;
            target.insert(kid, pem);
        }

        let mut store = Self::new();
        for (kid, private_pem) in &private {
            let public_pem = public
                .get(kid)
                .ok_or_else(|| AuthError::MissingPublicKey { kid: kid.clone() })?;
            store.insert_keypair(kid.clone(), private_pem, public_pem)?;
        }
        for (kid, public_pem) in &public {
            if !private.contains_key(kid) {
                store.insert_public(kid.clone(), public_pem)?;
            }
        }

        info!(dir = %dir.display(), kids = ?store.kids(), "loaded signing keys");
        Ok(store)
    }

    /// Key ids held by the store, sorted.
    pub fn kids(&self) -> BTreeSet<&str> {
        self.keys.keys().map(String::as_str).collect()
    }

    pub fn can_sign(&self, kid: &str) -> bool {
        self.keys
            .get(kid)
            .is_some_and(|pair| pair.private.is_some())
    }
}

impl KeyLookup for KeyStore {
    fn private_key(&self, kid: &str) -> Result<&EncodingKey, AuthError> {
        self.keys
            .get(kid)
            .and_then(|pair| pair.private.as_ref())
            .ok_or_else(|| AuthError::KeyNotFound {
                kid: kid.to_string(),
            })
    }

    fn public_key(&self, kid: &str) -> Result<&DecodingKey, AuthError> {
        self.keys
            .get(kid)
            .map(|pair| &pair.public)
            .ok_or_else(|| AuthError::KeyNotFound {
                kid: kid.to_string(),
            })
    }
}

fn decoding_key(kid: &str, pem: &[u8]) -> Result<DecodingKey, AuthError> {
    DecodingKey::from_rsa_pem(pem).map_err(|source| AuthError::KeyLoad {
        kid: kid.to_string(),
        source,
    })
}
