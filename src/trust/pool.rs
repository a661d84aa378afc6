use log::debug;
use x509_cert::der::oid::{AssociatedOid, ObjectIdentifier};
use x509_cert::der::{Decode, Encode};
use x509_cert::ext::pkix::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectAltName,
    SubjectKeyIdentifier,
};
use x509_cert::Certificate;

use crate::error::Error;
use crate::token::keys::{CertificateSignatureScheme, PublicKey};

// Maximum number of issuing certificates walked above a leaf.
const MAX_CHAIN_DEPTH: usize = 8;

// Extensions understood while building chains; any other critical extension
// makes the certificate unusable.
const HANDLED_EXTENSIONS: [ObjectIdentifier; 6] = [
    BasicConstraints::OID,
    KeyUsage::OID,
    ExtendedKeyUsage::OID,
    SubjectAltName::OID,
    SubjectKeyIdentifier::OID,
    AuthorityKeyIdentifier::OID,
];

/// An X.509 certificate together with its decoded public key.
///
/// Certificates whose key type is not supported still parse; they carry no
/// key and can neither sign tokens nor issue other certificates.
#[derive(Debug, Clone)]
pub struct ParsedCertificate {
    der: Vec<u8>,
    cert: Certificate,
    public_key: Option<PublicKey>,
}

impl ParsedCertificate {
    pub fn from_der(der: &[u8]) -> Result<Self, Error> {
        let cert = Certificate::from_der(der)
            .map_err(|e| Error::Certificate(format!("x509 parse error: {e}")))?;
        let spki = &cert.tbs_certificate.subject_public_key_info;
        let spki_der = spki
            .to_der()
            .map_err(|e| Error::Certificate(format!("x509 public key encode error: {e}")))?;
        let public_key = match PublicKey::from_spki_parts(
            &spki.algorithm.oid.to_string(),
            spki.subject_public_key.raw_bytes(),
            &spki_der,
        ) {
            Ok(key) => Some(key),
            Err(err) => {
                debug!(
                    "certificate {} has an unusable public key: {err}",
                    cert.tbs_certificate.subject
                );
                None
            }
        };
        Ok(Self {
            der: der.to_vec(),
            cert,
            public_key,
        })
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn subject(&self) -> String {
        self.cert.tbs_certificate.subject.to_string()
    }

    fn issued(&self, child: &ParsedCertificate) -> bool {
        self.cert.tbs_certificate.subject == child.cert.tbs_certificate.issuer
    }

    fn valid_at(&self, now: u64) -> bool {
        let validity = &self.cert.tbs_certificate.validity;
        let not_before = validity.not_before.to_unix_duration().as_secs();
        let not_after = validity.not_after.to_unix_duration().as_secs();
        not_before <= now && now <= not_after
    }

    fn extension<T: AssociatedOid + for<'a> Decode<'a>>(&self) -> Option<T> {
        self.cert
            .tbs_certificate
            .extensions
            .as_ref()?
            .iter()
            .find(|ext| ext.extn_id == T::OID)
            .and_then(|ext| T::from_der(ext.extn_value.as_bytes()).ok())
    }

    fn unhandled_critical_extension(&self) -> Option<ObjectIdentifier> {
        self.cert
            .tbs_certificate
            .extensions
            .as_ref()?
            .iter()
            .find(|ext| ext.critical && !HANDLED_EXTENSIONS.contains(&ext.extn_id))
            .map(|ext| ext.extn_id)
    }

    /// Whether this certificate may issue a chain with `intermediates_below`
    /// issuing certificates between it and the leaf.
    fn may_issue(&self, intermediates_below: usize) -> bool {
        if self.public_key.is_none() || self.unhandled_critical_extension().is_some() {
            return false;
        }
        if let Some(usage) = self.extension::<KeyUsage>() {
            if !usage.key_cert_sign() {
                return false;
            }
        }
        match self.extension::<BasicConstraints>() {
            Some(constraints) if constraints.ca => match constraints.path_len_constraint {
                Some(max) => intermediates_below <= usize::from(max),
                None => true,
            },
            _ => false,
        }
    }

    fn verify_issued_by(&self, issuer: &ParsedCertificate) -> Result<(), Error> {
        let oid = self.cert.signature_algorithm.oid.to_string();
        let scheme = CertificateSignatureScheme::from_oid(&oid).ok_or_else(|| {
            Error::Certificate(format!("unsupported certificate signature algorithm {oid}"))
        })?;
        let tbs = self
            .cert
            .tbs_certificate
            .to_der()
            .map_err(|e| Error::Certificate(format!("x509 encode error: {e}")))?;
        let signature = self
            .cert
            .signature
            .as_bytes()
            .ok_or_else(|| Error::Certificate("certificate signature has unused bits".to_string()))?;
        let key = issuer.public_key.as_ref().ok_or_else(|| {
            Error::Certificate(format!(
                "issuer {} has an unsupported public key",
                issuer.subject()
            ))
        })?;
        key.verify_certificate_signature(scheme, &tbs, signature)
    }
}

/// Root certificates trusted to anchor token signing chains.
#[derive(Debug, Clone, Default)]
pub struct CertificatePool {
    certs: Vec<ParsedCertificate>,
}

impl CertificatePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, cert: ParsedCertificate) {
        if !self.contains(&cert) {
            self.certs.push(cert);
        }
    }

    pub fn contains(&self, cert: &ParsedCertificate) -> bool {
        self.certs.iter().any(|root| root.der == cert.der)
    }

    pub fn len(&self) -> usize {
        self.certs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParsedCertificate> {
        self.certs.iter()
    }

    /// Verifies that `leaf` chains to a root of this pool, using
    /// `intermediates` as candidate issuers. Every certificate on the path must
    /// be valid at `now`; extended key usage is not restricted. Issuers must be
    /// CAs within their path length, with `keyCertSign` when key usage is
    /// present, and no certificate may carry an unknown critical extension.
    pub fn verify_chain(
        &self,
        leaf: &ParsedCertificate,
        intermediates: &[ParsedCertificate],
        now: u64,
    ) -> Result<(), Error> {
        if leaf.public_key.is_none() {
            return Err(Error::Certificate(format!(
                "certificate {} has an unsupported public key",
                leaf.subject()
            )));
        }
        if let Some(oid) = leaf.unhandled_critical_extension() {
            return Err(Error::Certificate(format!(
                "certificate {} has unhandled critical extension {oid}",
                leaf.subject()
            )));
        }
        if !leaf.valid_at(now) {
            return Err(Error::Certificate(format!(
                "certificate {} is outside its validity period",
                leaf.subject()
            )));
        }
        let mut used = Vec::new();
        if self.build_path(leaf, intermediates, now, 0, &mut used) {
            return Ok(());
        }
        Err(Error::Certificate(format!(
            "no trusted chain for certificate {}",
            leaf.subject()
        )))
    }

    fn build_path(
        &self,
        current: &ParsedCertificate,
        intermediates: &[ParsedCertificate],
        now: u64,
        depth: usize,
        used: &mut Vec<usize>,
    ) -> bool {
        if self.contains(current) {
            return true;
        }
        for root in &self.certs {
            if root.issued(current) && root.valid_at(now) && root.may_issue(depth) {
                match current.verify_issued_by(root) {
                    Ok(()) => return true,
                    Err(err) => debug!("root {} did not sign {}: {err}", root.subject(), current.subject()),
                }
            }
        }
        if depth >= MAX_CHAIN_DEPTH {
            return false;
        }
        for (idx, candidate) in intermediates.iter().enumerate() {
            if used.contains(&idx)
                || !candidate.issued(current)
                || !candidate.valid_at(now)
                || !candidate.may_issue(depth)
            {
                continue;
            }
            if let Err(err) = current.verify_issued_by(candidate) {
                debug!(
                    "intermediate {} did not sign {}: {err}",
                    candidate.subject(),
                    current.subject()
                );
                continue;
            }
            used.push(idx);
            if self.build_path(candidate, intermediates, now, depth + 1, used) {
                return true;
            }
            used.pop();
        }
        false
    }
}
