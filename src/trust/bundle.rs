use log::debug;

use super::pool::ParsedCertificate;
use crate::error::Error;

/// Parses every `CERTIFICATE` block of a PEM bundle. Other blocks, such as
/// private keys, are skipped.
pub fn certificates_from_pem(bytes: &[u8]) -> Result<Vec<ParsedCertificate>, Error> {
    let mut certs = Vec::new();
    for block in pem::parse_many(bytes)? {
        if block.tag() != "CERTIFICATE" {
            debug!("skipping pem block {}", block.tag());
            continue;
        }
        certs.push(ParsedCertificate::from_der(block.contents())?);
    }
    Ok(certs)
}
