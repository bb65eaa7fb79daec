//! The credential store: runs a [`GenerationPlan`] into an [`OutputData`].

use filler_types::{FillerError, OutputData, RequestKind, Result, Value};
use indexmap::IndexMap;
use std::collections::HashSet;

use crate::entropy::SecureRandom;
use crate::generator::GeneratorSettings;
use crate::plan::{CertSetSpec, ComponentSpec, GenerationPlan, SshKeySpec, SYSTEM_DOMAIN};
use crate::template;
use crate::types::{
    CertificateAuthority, CertificateRequest, KeyPairFactory, SecretFactory, SshKeyFactory,
};

/// Accumulates generated values for one run.
///
/// [`CredentialStore::run`] consumes the store, so a failed run leaves
/// nothing behind that could be mistaken for a complete credential set.
#[derive(Debug)]
pub struct CredentialStore {
    data: OutputData,
    parameters: IndexMap<String, String>,
    settings: GeneratorSettings,
    random: SecureRandom,
    passwords: SecretFactory,
    key_pairs: KeyPairFactory,
    ssh_keys: SshKeyFactory,
    serials: HashSet<Vec<u8>>,
}

impl CredentialStore {
    /// Create a store drawing from the system random source.
    pub fn new(settings: GeneratorSettings) -> Result<Self> {
        Self::with_random(settings, SecureRandom::system())
    }

    /// Create a store drawing from `random`.
    pub fn with_random(settings: GeneratorSettings, random: SecureRandom) -> Result<Self> {
        settings.validate()?;
        let key_pairs = KeyPairFactory::new(settings.key_bits)?;

        Ok(Self {
            data: OutputData::new(),
            parameters: IndexMap::new(),
            settings,
            passwords: SecretFactory::new(random.clone()),
            ssh_keys: SshKeyFactory::new(key_pairs, settings.fingerprint),
            key_pairs,
            random,
            serials: HashSet::new(),
        })
    }

    /// Supply a run parameter (e.g. `system_domain`).
    ///
    /// Parameters feed component URIs and derived templates; they are not
    /// written to the output themselves.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Generate everything in `plan`, in one sequential pass.
    pub fn run(mut self, plan: &GenerationPlan) -> Result<OutputData> {
        plan.validate()?;
        self.check_parameters(plan)?;

        tracing::info!(
            "Generating {} variables (random source: {}, {}-bit keys)",
            plan.expected_len(),
            self.random.source_name(),
            self.settings.key_bits
        );

        self.add_literals(&plan.literals)?;
        self.add_components(&plan.components)?;
        self.add_passwords(&plan.passwords)?;
        for array in &plan.password_arrays {
            self.add_password_array(&array.name, array.count)?;
        }
        for set in &plan.cert_sets {
            self.add_cert_set(set)?;
        }
        for pair in &plan.key_pairs {
            self.add_key_pair(&pair.private_key, &pair.public_key)?;
        }
        for key in &plan.ssh_keys {
            self.add_ssh_key(key)?;
        }
        self.add_derived(&plan.derived)?;

        if self.data.len() != plan.expected_len() {
            filler_types::bug!(
                "plan expected {} variables but {} were generated",
                plan.expected_len(),
                self.data.len()
            );
        }

        tracing::info!("Generated {} variables", self.data.len());
        Ok(self.data)
    }

    fn check_parameters(&self, plan: &GenerationPlan) -> Result<()> {
        for name in &plan.parameters {
            match self.parameters.get(name) {
                Some(value) if !value.is_empty() => {}
                _ => {
                    return Err(FillerError::Template(format!(
                        "missing required parameter '{}'",
                        name
                    )))
                }
            }
        }
        Ok(())
    }

    fn insert(&mut self, kind: RequestKind, name: &str, value: impl Into<Value>) -> Result<()> {
        self.data
            .insert(name, value)
            .map_err(|e| e.for_request(kind, name))
    }

    fn record_serial(&mut self, serial: Vec<u8>, owner: &str) -> Result<()> {
        if !self.serials.insert(serial) {
            filler_types::bug!("serial number of '{}' was already used in this run", owner);
        }
        Ok(())
    }

    fn add_literals(&mut self, literals: &IndexMap<String, String>) -> Result<()> {
        for (name, value) in literals {
            self.insert(RequestKind::Literal, name, value.clone())?;
        }
        Ok(())
    }

    fn add_components(&mut self, components: &[ComponentSpec]) -> Result<()> {
        if components.is_empty() {
            return Ok(());
        }

        let domain = self.parameters.get(SYSTEM_DOMAIN).cloned().ok_or_else(|| {
            FillerError::Template(format!("missing required parameter '{}'", SYSTEM_DOMAIN))
        })?;

        for component in components {
            let uri = format!("{}.{}", component.name, domain);
            self.insert(RequestKind::Component, &format!("{}_uri", component.name), uri.clone())?;

            if component.subdomain_uri {
                self.insert(
                    RequestKind::Component,
                    &format!("{}_subdomain_uri", component.name),
                    format!("*.{}", uri),
                )?;
            }
            if component.https_url {
                self.insert(
                    RequestKind::Component,
                    &format!("{}_url", component.name),
                    format!("https://{}", uri),
                )?;
            }
        }
        Ok(())
    }

    fn add_passwords(&mut self, names: &[String]) -> Result<()> {
        if !names.is_empty() {
            tracing::info!("Generating {} passwords", names.len());
        }
        for name in names {
            let password = self
                .passwords
                .new_password()
                .map_err(|e| e.for_request(RequestKind::Password, name))?;
            self.insert(RequestKind::Password, name, password)?;
            tracing::debug!("Generated password: {}", name);
        }
        Ok(())
    }

    fn add_password_array(&mut self, name: &str, count: usize) -> Result<()> {
        let passwords = self
            .passwords
            .new_password_array(count)
            .map_err(|e| e.for_request(RequestKind::PasswordArray, name))?;
        self.insert(RequestKind::PasswordArray, name, passwords)?;
        tracing::debug!("Generated password array: {} ({} entries)", name, count);
        Ok(())
    }

    fn add_cert_set(&mut self, set: &CertSetSpec) -> Result<()> {
        tracing::info!("Generating certificate set: {}", set.name);

        let ca_label = format!("{}/{}", set.name, set.ca.common_name);
        let ca = CertificateAuthority::init(&set.ca.common_name, &self.settings, self.random.clone())
            .map_err(|e| e.for_request(RequestKind::CertificateAuthority, &ca_label))?;
        let serial = ca
            .serial()
            .map_err(|e| e.for_request(RequestKind::CertificateAuthority, &ca_label))?;
        self.record_serial(serial, &ca_label)?;

        if let Some(name) = set.ca.certificate_name() {
            let pem = ca
                .certificate_pem()
                .map_err(|e| e.for_request(RequestKind::CertificateAuthority, name))?;
            self.insert(RequestKind::CertificateAuthority, name, pem)?;
        }
        if let Some(name) = set.ca.private_key_name() {
            let pem = ca
                .private_key_pem()
                .map_err(|e| e.for_request(RequestKind::CertificateAuthority, name))?;
            self.insert(RequestKind::CertificateAuthority, name, pem)?;
        }

        for leaf in &set.certificates {
            let request = CertificateRequest::new(leaf.common_name.clone())
                .with_domains(leaf.domains.iter().cloned())
                .with_ip_addresses(leaf.ip_addresses.iter().cloned())
                .with_usage(leaf.usage);

            let issued = ca
                .issue_certificate(&request)
                .map_err(|e| e.for_request(RequestKind::Certificate, &leaf.certificate))?;
            self.record_serial(issued.serial.clone(), &leaf.certificate)?;

            self.insert(RequestKind::Certificate, &leaf.certificate, issued.certificate_pem)?;
            self.insert(RequestKind::Certificate, &leaf.private_key, issued.private_key_pem)?;
        }

        Ok(())
    }

    fn add_key_pair(&mut self, private_name: &str, public_name: &str) -> Result<()> {
        let pair = self
            .key_pairs
            .new_rsa_key_pair()
            .map_err(|e| e.for_request(RequestKind::KeyPair, private_name))?;

        self.insert(RequestKind::KeyPair, private_name, pair.private_key_pem)?;
        self.insert(RequestKind::KeyPair, public_name, pair.public_key_pem)?;
        tracing::debug!("Generated key pair: {} / {}", private_name, public_name);
        Ok(())
    }

    fn add_ssh_key(&mut self, spec: &SshKeySpec) -> Result<()> {
        let credential = match &spec.comment {
            Some(comment) => self.ssh_keys.clone().with_comment(comment.as_str()).new_ssh_credential(),
            None => self.ssh_keys.new_ssh_credential(),
        }
        .map_err(|e| e.for_request(RequestKind::SshKey, &spec.private_key))?;

        self.insert(RequestKind::SshKey, &spec.private_key, credential.private_key)?;
        self.insert(RequestKind::SshKey, &spec.fingerprint, credential.fingerprint)?;
        if let Some(public_name) = &spec.public_key {
            self.insert(RequestKind::SshKey, public_name, credential.public_key)?;
        }
        tracing::debug!("Generated SSH key: {}", spec.private_key);
        Ok(())
    }

    fn add_derived(&mut self, derived: &IndexMap<String, String>) -> Result<()> {
        for (name, template) in derived {
            let rendered = template::render(template, |var| {
                self.data
                    .get_text(var)
                    .or_else(|| self.parameters.get(var).map(String::as_str))
            })
            .map_err(|e| e.for_request(RequestKind::Derived, name))?;

            self.insert(RequestKind::Derived, name, rendered)?;
        }
        Ok(())
    }
}
