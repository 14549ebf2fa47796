//! Deployment signing identity
//!
//! One ed25519 key pair per deployment, generated on first start and
//! persisted as raw key files under the audit base directory. Every entry in
//! a deployment's log is signed and verified with the same pair; rotating it
//! invalidates verification of prior entries unless the old public key is
//! retained elsewhere.

use std::fs;
use std::path::Path;

use contracts::PipelineError;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use tracing::{debug, info};

const SIGNING_KEY_FILE: &str = "ed25519.sk";
const VERIFY_KEY_FILE: &str = "ed25519.pk";

/// Process-wide signing identity
pub struct KeyStore {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl KeyStore {
    /// Load the persisted pair, or generate and persist a new one
    ///
    /// # Errors
    /// Returns `PipelineError::KeyStore` on unreadable or malformed key
    /// material, `PipelineError::Io` on filesystem failures.
    pub fn load_or_generate(keys_dir: &Path) -> Result<Self, PipelineError> {
        fs::create_dir_all(keys_dir)?;
        let sk_path = keys_dir.join(SIGNING_KEY_FILE);
        let pk_path = keys_dir.join(VERIFY_KEY_FILE);

        if sk_path.exists() && pk_path.exists() {
            let signing_key = read_signing_key(&sk_path)?;
            let verifying_key = read_verifying_key(&pk_path)?;
            debug!(path = %keys_dir.display(), "key pair loaded");
            return Ok(Self {
                signing_key,
                verifying_key,
            });
        }

        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();
        fs::write(&sk_path, signing_key.to_bytes())?;
        fs::write(&pk_path, verifying_key.to_bytes())?;
        info!(path = %keys_dir.display(), "key pair generated");

        Ok(Self {
            signing_key,
            verifying_key,
        })
    }

    /// Build a store from an existing pair (injection for tests/tools)
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Sign canonical bytes, returning the hex-encoded signature
    pub fn sign_hex(&self, bytes: &[u8]) -> String {
        hex::encode(self.signing_key.sign(bytes).to_bytes())
    }

    /// Check a hex-encoded signature over canonical bytes
    ///
    /// Malformed hex and wrong-length signatures yield `false`, never an
    /// error.
    pub fn verify_hex(&self, bytes: &[u8], sig_hex: &str) -> bool {
        let Ok(sig_bytes) = hex::decode(sig_hex) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(&sig_bytes) else {
            return false;
        };
        self.verifying_key.verify(bytes, &signature).is_ok()
    }

    /// The public half of the deployment identity
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}

fn read_signing_key(path: &Path) -> Result<SigningKey, PipelineError> {
    let raw = fs::read(path)?;
    let bytes: [u8; 32] = raw.try_into().map_err(|_| PipelineError::KeyStore {
        message: format!("signing key at '{}' has wrong length", path.display()),
    })?;
    Ok(SigningKey::from_bytes(&bytes))
}

fn read_verifying_key(path: &Path) -> Result<VerifyingKey, PipelineError> {
    let raw = fs::read(path)?;
    let bytes: [u8; 32] = raw.try_into().map_err(|_| PipelineError::KeyStore {
        message: format!("verify key at '{}' has wrong length", path.display()),
    })?;
    VerifyingKey::from_bytes(&bytes).map_err(|e| PipelineError::KeyStore {
        message: format!("verify key at '{}' is invalid: {e}", path.display()),
    })
}
