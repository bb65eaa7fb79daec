//! Certificate authorities and the leaf certificates they issue.
//!
//! A [`CertificateAuthority`] owns its private key for its whole lifetime;
//! callers only ever see the PEM of its certificate (and of its key, when a
//! plan asks to export it). Every [`LeafCertificate`] gets a fresh key pair
//! and remembers its issuer by common name only.

use filler_types::{CertUsage, FillerError, Result};
use openssl::asn1::{Asn1Integer, Asn1Time, Asn1TimeRef};
use openssl::bn::BigNum;
use openssl::error::ErrorStack;
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, PKeyRef, Private};
use openssl::x509::extension::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectAlternativeName,
    SubjectKeyIdentifier,
};
use openssl::x509::{X509Builder, X509Name, X509NameBuilder, X509Ref, X509};

use super::rsa::{pem_to_string, KeyPairFactory};
use crate::entropy::SecureRandom;
use crate::generator::GeneratorSettings;

/// X509 version 3 is represented by 2.
const X509_VERSION_3: i32 = 2;

/// Bytes of randomness in a serial number.
pub const SERIAL_BYTES: usize = 16;

/// What to put in a leaf certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRequest {
    /// Subject common name
    pub common_name: String,
    /// DNS SAN entries, copied verbatim and in order
    pub domains: Vec<String>,
    /// IP SAN entries
    pub ip_addresses: Vec<String>,
    /// Extended key usage
    pub usage: CertUsage,
}

impl CertificateRequest {
    /// A request for `common_name` with no SAN entries.
    pub fn new(common_name: impl Into<String>) -> Self {
        Self {
            common_name: common_name.into(),
            domains: Vec::new(),
            ip_addresses: Vec::new(),
            usage: CertUsage::default(),
        }
    }

    /// Set the DNS SAN entries.
    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Set the IP SAN entries.
    pub fn with_ip_addresses<I, S>(mut self, ips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ip_addresses = ips.into_iter().map(Into::into).collect();
        self
    }

    /// Set the extended key usage.
    pub fn with_usage(mut self, usage: CertUsage) -> Self {
        self.usage = usage;
        self
    }
}

/// A certificate signed by a [`CertificateAuthority`].
#[derive(Clone, PartialEq, Eq)]
pub struct LeafCertificate {
    /// Subject common name
    pub common_name: String,
    /// DNS SAN entries
    pub san_domains: Vec<String>,
    /// Common name of the issuing authority
    pub issuer: String,
    /// Certificate PEM
    pub certificate_pem: String,
    /// PKCS#1 PEM of the leaf's own private key
    pub private_key_pem: String,
    /// Big-endian serial number
    pub serial: Vec<u8>,
}

impl std::fmt::Debug for LeafCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeafCertificate")
            .field("common_name", &self.common_name)
            .field("san_domains", &self.san_domains)
            .field("issuer", &self.issuer)
            .field("serial", &hex::encode(&self.serial))
            .finish_non_exhaustive()
    }
}

/// A self-signed certificate authority.
pub struct CertificateAuthority {
    common_name: String,
    key: PKey<Private>,
    certificate: X509,
    keys: KeyPairFactory,
    leaf_validity_days: u32,
    random: SecureRandom,
}

impl std::fmt::Debug for CertificateAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateAuthority")
            .field("common_name", &self.common_name)
            .field("leaf_validity_days", &self.leaf_validity_days)
            .finish_non_exhaustive()
    }
}

impl CertificateAuthority {
    /// Generate a key and a self-signed CA certificate for `common_name`.
    pub fn init(common_name: &str, settings: &GeneratorSettings, random: SecureRandom) -> Result<Self> {
        settings.validate()?;
        if common_name.is_empty() {
            return Err(FillerError::CaInit("CA common name cannot be empty".to_string()));
        }

        let keys = KeyPairFactory::new(settings.key_bits)?;
        let rsa = keys.generate_key()
            .map_err(|e| FillerError::CaInit(format!("CA '{}': {}", common_name, e)))?;
        let key = PKey::from_rsa(rsa)
            .map_err(|e| FillerError::CaInit(format!("Failed to wrap CA key for '{}': {}", common_name, e)))?;

        let serial = random_serial(&random)
            .map_err(|e| FillerError::CaInit(format!("CA '{}': {}", common_name, e)))?;

        let certificate = build_ca_certificate(common_name, &key, &serial, settings.ca_validity_days)
            .map_err(|e| FillerError::CaInit(format!("Failed to self-sign CA '{}': {}", common_name, e)))?;

        tracing::debug!("Initialized certificate authority: {}", common_name);

        Ok(Self {
            common_name: common_name.to_string(),
            key,
            certificate,
            keys,
            leaf_validity_days: settings.leaf_validity_days(),
            random,
        })
    }

    /// Issue a leaf certificate with a fresh key pair.
    ///
    /// The authority itself is left untouched; each call is independent.
    pub fn issue_certificate(&self, request: &CertificateRequest) -> Result<LeafCertificate> {
        let cn = &request.common_name;
        if cn.is_empty() {
            return Err(FillerError::CertSigning("certificate common name cannot be empty".to_string()));
        }

        let rsa = self.keys.generate_key()
            .map_err(|e| FillerError::CertSigning(format!("leaf '{}': {}", cn, e)))?;
        let leaf_key = PKey::from_rsa(rsa)
            .map_err(|e| FillerError::CertSigning(format!("Failed to wrap key for '{}': {}", cn, e)))?;

        let serial = random_serial(&self.random)
            .map_err(|e| FillerError::CertSigning(format!("leaf '{}': {}", cn, e)))?;

        let certificate = self.build_leaf_certificate(request, &leaf_key, &serial)
            .map_err(|e| FillerError::CertSigning(format!(
                "Failed to sign '{}' with CA '{}': {}",
                cn, self.common_name, e
            )))?;

        let certificate_pem = certificate.to_pem()
            .map_err(|e| FillerError::Serialization(format!("Failed to encode certificate '{}': {}", cn, e)))?;
        let private_key_pem = leaf_key.rsa()
            .and_then(|rsa| rsa.private_key_to_pem())
            .map_err(|e| FillerError::Serialization(format!("Failed to encode key for '{}': {}", cn, e)))?;

        tracing::debug!("Issued certificate {} (CA: {})", cn, self.common_name);

        Ok(LeafCertificate {
            common_name: cn.clone(),
            san_domains: request.domains.clone(),
            issuer: self.common_name.clone(),
            certificate_pem: pem_to_string(certificate_pem, "certificate")?,
            private_key_pem: pem_to_string(private_key_pem, "private key")?,
            serial: serial_bytes(&certificate)?,
        })
    }

    /// Common name of the authority (its subject and issuer).
    pub fn common_name(&self) -> &str {
        &self.common_name
    }

    /// The self-signed certificate.
    pub fn certificate(&self) -> &X509Ref {
        &self.certificate
    }

    /// Certificate PEM.
    pub fn certificate_pem(&self) -> Result<String> {
        let pem = self.certificate.to_pem()
            .map_err(|e| FillerError::Serialization(format!("Failed to encode CA certificate '{}': {}", self.common_name, e)))?;
        pem_to_string(pem, "CA certificate")
    }

    /// PKCS#1 PEM of the signing key.
    pub fn private_key_pem(&self) -> Result<String> {
        let pem = self.key.rsa()
            .and_then(|rsa| rsa.private_key_to_pem())
            .map_err(|e| FillerError::Serialization(format!("Failed to encode CA key '{}': {}", self.common_name, e)))?;
        pem_to_string(pem, "CA private key")
    }

    /// Big-endian serial number of the CA certificate.
    pub fn serial(&self) -> Result<Vec<u8>> {
        serial_bytes(&self.certificate)
    }

    fn build_leaf_certificate(
        &self,
        request: &CertificateRequest,
        leaf_key: &PKeyRef<Private>,
        serial: &Asn1Integer,
    ) -> std::result::Result<X509, ErrorStack> {
        let subject = common_name(&request.common_name)?;

        let mut builder = X509Builder::new()?;
        builder.set_version(X509_VERSION_3)?;
        builder.set_serial_number(serial)?;
        builder.set_subject_name(&subject)?;
        builder.set_issuer_name(self.certificate.subject_name())?;
        let not_before = Asn1Time::days_from_now(0)?;
        builder.set_not_before(&not_before)?;

        // Clamp to the issuer's expiry
        let requested = Asn1Time::days_from_now(self.leaf_validity_days)?;
        let ca_not_after = self.certificate.not_after();
        let not_after: &Asn1TimeRef = if &*requested > ca_not_after {
            ca_not_after
        } else {
            &requested
        };
        builder.set_not_after(not_after)?;
        builder.set_pubkey(leaf_key)?;

        builder.append_extension(BasicConstraints::new().critical().build()?)?;
        builder.append_extension(
            KeyUsage::new()
                .critical()
                .digital_signature()
                .key_encipherment()
                .build()?,
        )?;

        let mut eku = ExtendedKeyUsage::new();
        if request.usage.server_auth() {
            eku.server_auth();
        }
        if request.usage.client_auth() {
            eku.client_auth();
        }
        builder.append_extension(eku.build()?)?;

        let ski = SubjectKeyIdentifier::new()
            .build(&builder.x509v3_context(Some(&*self.certificate), None))?;
        builder.append_extension(ski)?;

        let aki = AuthorityKeyIdentifier::new()
            .keyid(false)
            .build(&builder.x509v3_context(Some(&*self.certificate), None))?;
        builder.append_extension(aki)?;

        if !request.domains.is_empty() || !request.ip_addresses.is_empty() {
            let mut san = SubjectAlternativeName::new();
            for domain in &request.domains {
                san.dns(domain);
            }
            for ip in &request.ip_addresses {
                san.ip(ip);
            }
            let extension = san.build(&builder.x509v3_context(Some(&*self.certificate), None))?;
            builder.append_extension(extension)?;
        }

        builder.sign(&self.key, MessageDigest::sha256())?;
        Ok(builder.build())
    }
}

fn build_ca_certificate(
    cn: &str,
    key: &PKeyRef<Private>,
    serial: &Asn1Integer,
    validity_days: u32,
) -> std::result::Result<X509, ErrorStack> {
    let name = common_name(cn)?;

    let mut builder = X509Builder::new()?;
    builder.set_version(X509_VERSION_3)?;
    builder.set_serial_number(serial)?;
    builder.set_subject_name(&name)?;
    builder.set_issuer_name(&name)?;
    let not_before = Asn1Time::days_from_now(0)?;
    let not_after = Asn1Time::days_from_now(validity_days)?;
    builder.set_not_before(&not_before)?;
    builder.set_not_after(&not_after)?;
    builder.set_pubkey(key)?;

    builder.append_extension(BasicConstraints::new().critical().ca().build()?)?;
    builder.append_extension(
        KeyUsage::new()
            .critical()
            .key_cert_sign()
            .crl_sign()
            .build()?,
    )?;

    let ski = SubjectKeyIdentifier::new().build(&builder.x509v3_context(None, None))?;
    builder.append_extension(ski)?;

    builder.sign(key, MessageDigest::sha256())?;
    Ok(builder.build())
}

fn common_name(cn: &str) -> std::result::Result<X509Name, ErrorStack> {
    let mut builder = X509NameBuilder::new()?;
    builder.append_entry_by_nid(Nid::COMMONNAME, cn)?;
    Ok(builder.build())
}

/// Random positive serial number.
///
/// The top bit is cleared so the DER integer stays positive and the next
/// bit is set so the encoding always has full width.
fn random_serial(random: &SecureRandom) -> Result<Asn1Integer> {
    let mut bytes: [u8; SERIAL_BYTES] = random.bytes()?;
    bytes[0] &= 0x7f;
    bytes[0] |= 0x40;

    BigNum::from_slice(&bytes)
        .and_then(|bn| bn.to_asn1_integer())
        .map_err(|e| FillerError::Serialization(format!("Failed to encode serial number: {}", e)))
}

fn serial_bytes(certificate: &X509Ref) -> Result<Vec<u8>> {
    certificate
        .serial_number()
        .to_bn()
        .map(|bn| bn.to_vec())
        .map_err(|e| FillerError::Serialization(format!("Failed to read serial number: {}", e)))
}
