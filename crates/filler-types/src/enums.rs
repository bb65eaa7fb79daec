//! Common enumerations used throughout cf-filler.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::errors::{FillerError, Result};

/// Log level enumeration for the logging system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// No logging
    None,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Detailed trace messages
    Trace,
}

impl LogLevel {
    /// The directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::None => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = FillerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "NONE" => Ok(LogLevel::None),
            "ERROR" => Ok(LogLevel::Error),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "TRACE" => Ok(LogLevel::Trace),
            _ => Err(FillerError::Config(format!("Invalid log level: {}", s))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::None => write!(f, "NONE"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Trace => write!(f, "TRACE"),
        }
    }
}

/// Category of a generation plan entry.
///
/// Carried on errors so a failed run says what it was producing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestKind {
    /// Fixed literal value
    Literal,
    /// System component URIs
    Component,
    /// Single random password
    Password,
    /// Array of random passwords
    PasswordArray,
    /// Standalone RSA key pair
    KeyPair,
    /// SSH host key and fingerprint
    SshKey,
    /// Certificate authority of a cert set
    CertificateAuthority,
    /// Leaf certificate of a cert set
    Certificate,
    /// Value rendered from a template
    Derived,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Literal => write!(f, "literal"),
            RequestKind::Component => write!(f, "component"),
            RequestKind::Password => write!(f, "password"),
            RequestKind::PasswordArray => write!(f, "password array"),
            RequestKind::KeyPair => write!(f, "key pair"),
            RequestKind::SshKey => write!(f, "ssh key"),
            RequestKind::CertificateAuthority => write!(f, "certificate authority"),
            RequestKind::Certificate => write!(f, "certificate"),
            RequestKind::Derived => write!(f, "derived value"),
        }
    }
}

/// Intended use of a leaf certificate, expressed as extended key usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CertUsage {
    /// TLS server authentication only
    Server,
    /// TLS client authentication only
    Client,
    /// Both server and client authentication
    #[default]
    ServerAndClient,
}

impl CertUsage {
    /// Whether the certificate may authenticate a TLS server.
    pub fn server_auth(&self) -> bool {
        matches!(self, CertUsage::Server | CertUsage::ServerAndClient)
    }

    /// Whether the certificate may authenticate a TLS client.
    pub fn client_auth(&self) -> bool {
        matches!(self, CertUsage::Client | CertUsage::ServerAndClient)
    }
}

impl fmt::Display for CertUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertUsage::Server => write!(f, "server"),
            CertUsage::Client => write!(f, "client"),
            CertUsage::ServerAndClient => write!(f, "server-and-client"),
        }
    }
}

/// Display format for SSH public key fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintFormat {
    /// Legacy MD5, colon-separated lowercase hex
    #[default]
    Md5,
    /// `SHA256:` followed by unpadded base64
    Sha256,
}

impl FromStr for FingerprintFormat {
    type Err = FillerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "md5" => Ok(FingerprintFormat::Md5),
            "sha256" => Ok(FingerprintFormat::Sha256),
            _ => Err(FillerError::Config(format!("Invalid fingerprint format: {}", s))),
        }
    }
}

impl fmt::Display for FingerprintFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FingerprintFormat::Md5 => write!(f, "md5"),
            FingerprintFormat::Sha256 => write!(f, "sha256"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::None.as_filter(), "off");
    }

    #[test]
    fn test_cert_usage_serde() {
        let usage: CertUsage = serde_yaml::from_str("server-and-client").unwrap();
        assert_eq!(usage, CertUsage::ServerAndClient);
        assert!(usage.server_auth() && usage.client_auth());

        let usage: CertUsage = serde_yaml::from_str("client").unwrap();
        assert!(!usage.server_auth());
        assert!(usage.client_auth());

        assert_eq!(CertUsage::default(), CertUsage::ServerAndClient);
    }

    #[test]
    fn test_fingerprint_format_parsing() {
        assert_eq!("SHA256".parse::<FingerprintFormat>().unwrap(), FingerprintFormat::Sha256);
        assert_eq!(FingerprintFormat::default(), FingerprintFormat::Md5);
        assert!("sha1".parse::<FingerprintFormat>().is_err());
    }
}
