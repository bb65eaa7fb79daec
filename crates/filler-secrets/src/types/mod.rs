//! Credential factories.

pub mod random;
pub mod rsa;
pub mod ssh;
pub mod x509;

pub use random::{encode_password, is_valid_password, SecretFactory};
pub use rsa::{KeyPairFactory, RsaKeyPair};
pub use ssh::{fingerprint, public_key_blob, SshCredential, SshKeyFactory};
pub use x509::{CertificateAuthority, CertificateRequest, LeafCertificate};
