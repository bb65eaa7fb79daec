//! SSH host keys and their fingerprints.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine as _;
use filler_types::{FillerError, FingerprintFormat, Result};
use openssl::hash::{hash, MessageDigest};
use openssl::pkey::HasPublic;
use openssl::rsa::RsaRef;
use sha2::{Digest, Sha256};

use super::rsa::{pem_to_string, KeyPairFactory};

const SSH_RSA: &str = "ssh-rsa";
const DEFAULT_COMMENT: &str = "cf-filler-generated";

/// An SSH private key with its public half and fingerprint.
#[derive(Clone, PartialEq, Eq)]
pub struct SshCredential {
    /// PKCS#1 PEM private key
    pub private_key: String,
    /// `ssh-rsa <base64> <comment>` authorized-keys line
    pub public_key: String,
    /// Fingerprint of the public key blob
    pub fingerprint: String,
}

impl std::fmt::Debug for SshCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshCredential")
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Produces SSH host keys.
#[derive(Debug, Clone)]
pub struct SshKeyFactory {
    keys: KeyPairFactory,
    format: FingerprintFormat,
    comment: String,
}

impl SshKeyFactory {
    /// Create a factory using `keys` for key material.
    pub fn new(keys: KeyPairFactory, format: FingerprintFormat) -> Self {
        Self {
            keys,
            format,
            comment: DEFAULT_COMMENT.to_string(),
        }
    }

    /// Override the comment on the authorized-keys line.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Generate a key pair and fingerprint its public half.
    pub fn new_ssh_credential(&self) -> Result<SshCredential> {
        let rsa = self.keys.generate_key()?;

        let private_pem = rsa.private_key_to_pem()
            .map_err(|e| FillerError::Serialization(format!("Failed to encode SSH private key: {}", e)))?;

        let blob = public_key_blob(&rsa);
        let fingerprint = fingerprint(&blob, self.format)?;

        Ok(SshCredential {
            private_key: pem_to_string(private_pem, "SSH private key")?,
            public_key: format!("{} {} {}", SSH_RSA, STANDARD.encode(&blob), self.comment),
            fingerprint,
        })
    }
}

/// Canonical SSH wire encoding of an RSA public key.
///
/// `string "ssh-rsa" || mpint e || mpint n`, as in RFC 4253 section 6.6.
pub fn public_key_blob<T: HasPublic>(rsa: &RsaRef<T>) -> Vec<u8> {
    let mut buf = Vec::new();
    write_ssh_string(&mut buf, SSH_RSA.as_bytes());
    write_ssh_mpint(&mut buf, &rsa.e().to_vec());
    write_ssh_mpint(&mut buf, &rsa.n().to_vec());
    buf
}

/// Fingerprint a public key blob.
pub fn fingerprint(blob: &[u8], format: FingerprintFormat) -> Result<String> {
    match format {
        FingerprintFormat::Md5 => {
            let digest = hash(MessageDigest::md5(), blob)
                .map_err(|e| FillerError::Serialization(format!("Failed to hash SSH public key: {}", e)))?;
            Ok(digest
                .iter()
                .map(|b| hex::encode([*b]))
                .collect::<Vec<_>>()
                .join(":"))
        }
        FingerprintFormat::Sha256 => {
            let digest = Sha256::digest(blob);
            Ok(format!("SHA256:{}", STANDARD_NO_PAD.encode(digest)))
        }
    }
}

fn write_ssh_string(buf: &mut Vec<u8>, data: &[u8]) {
    buf.extend_from_slice(&(data.len() as u32).to_be_bytes());
    buf.extend_from_slice(data);
}

fn write_ssh_mpint(buf: &mut Vec<u8>, data: &[u8]) {
    let start = data.iter().position(|&b| b != 0).unwrap_or(data.len());
    let trimmed = &data[start..];

    match trimmed.first() {
        Some(first) if first & 0x80 != 0 => {
            buf.extend_from_slice(&((trimmed.len() + 1) as u32).to_be_bytes());
            buf.push(0);
            buf.extend_from_slice(trimmed);
        }
        _ => write_ssh_string(buf, trimmed),
    }
}
