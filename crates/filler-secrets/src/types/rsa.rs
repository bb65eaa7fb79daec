//! Standalone RSA key pairs.

use filler_core::config::MIN_KEY_BITS;
use filler_types::{FillerError, Result};
use openssl::pkey::Private;
use openssl::rsa::Rsa;

/// A PEM-encoded RSA key pair.
#[derive(Clone, PartialEq, Eq)]
pub struct RsaKeyPair {
    /// PKCS#1 `RSA PRIVATE KEY` block
    pub private_key_pem: String,
    /// SubjectPublicKeyInfo `PUBLIC KEY` block
    pub public_key_pem: String,
}

impl std::fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKeyPair")
            .field("private_key_pem", &"<redacted>")
            .field("public_key_pem", &self.public_key_pem)
            .finish()
    }
}

/// Produces RSA keys of one fixed size.
///
/// Keys are generated by OpenSSL, whose CSPRNG seeds itself from the
/// operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPairFactory {
    key_bits: u32,
}

impl KeyPairFactory {
    /// Create a factory for `key_bits`-bit keys.
    pub fn new(key_bits: u32) -> Result<Self> {
        if key_bits < MIN_KEY_BITS {
            return Err(FillerError::KeyGeneration(format!(
                "RSA key size must be at least {} bits (got {})",
                MIN_KEY_BITS, key_bits
            )));
        }
        Ok(Self { key_bits })
    }

    /// Modulus size of generated keys.
    pub fn key_bits(&self) -> u32 {
        self.key_bits
    }

    /// Generate a raw private key.
    pub fn generate_key(&self) -> Result<Rsa<Private>> {
        Rsa::generate(self.key_bits)
            .map_err(|e| FillerError::KeyGeneration(format!("Failed to generate {}-bit RSA key: {}", self.key_bits, e)))
    }

    /// Generate a key pair and encode both halves as PEM.
    pub fn new_rsa_key_pair(&self) -> Result<RsaKeyPair> {
        let rsa = self.generate_key()?;

        let private_pem = rsa.private_key_to_pem()
            .map_err(|e| FillerError::Serialization(format!("Failed to encode private key: {}", e)))?;

        let public_pem = rsa.public_key_to_pem()
            .map_err(|e| FillerError::Serialization(format!("Failed to encode public key: {}", e)))?;

        Ok(RsaKeyPair {
            private_key_pem: pem_to_string(private_pem, "private key")?,
            public_key_pem: pem_to_string(public_pem, "public key")?,
        })
    }
}

/// Convert PEM bytes produced by OpenSSL into a `String`.
pub(crate) fn pem_to_string(pem: Vec<u8>, what: &str) -> Result<String> {
    String::from_utf8(pem)
        .map_err(|e| FillerError::Serialization(format!("{} PEM is not valid UTF-8: {}", what, e)))
}
