use jsonwebtoken::jwk::{AlgorithmParameters, EllipticCurve, Jwk};
use rsa::{BigUint, RsaPublicKey};

use super::public_key::PublicKey;
use crate::error::Error;
use crate::token::parts::base64_url_decode;

/// Converts a JSON Web Key into a verifying key.
///
/// Symmetric (`oct`) keys are rejected: a shared secret is never a trust anchor.
pub fn public_key_from_jwk(jwk: &Jwk) -> Result<PublicKey, Error> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(params) => {
            let n = base64_url_decode(&params.n)?;
            let e = base64_url_decode(&params.e)?;
            RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
                .map(PublicKey::Rsa)
                .map_err(|e| Error::Crypto(format!("rsa jwk error: {e}")))
        }
        AlgorithmParameters::EllipticCurve(params) => match params.curve {
            EllipticCurve::P256 => {
                let sec1 = sec1_from_coords(&params.x, &params.y, 32)?;
                p256::ecdsa::VerifyingKey::from_sec1_bytes(&sec1)
                    .map(PublicKey::P256)
                    .map_err(|e| Error::Crypto(format!("p256 jwk error: {e}")))
            }
            EllipticCurve::P384 => {
                let sec1 = sec1_from_coords(&params.x, &params.y, 48)?;
                p384::ecdsa::VerifyingKey::from_sec1_bytes(&sec1)
                    .map(PublicKey::P384)
                    .map_err(|e| Error::Crypto(format!("p384 jwk error: {e}")))
            }
            EllipticCurve::P521 => {
                let sec1 = sec1_from_coords(&params.x, &params.y, 66)?;
                p521::ecdsa::VerifyingKey::from_sec1_bytes(&sec1)
                    .map(PublicKey::P521)
                    .map_err(|e| Error::Crypto(format!("p521 jwk error: {e}")))
            }
            EllipticCurve::Ed25519 => Err(Error::Crypto(
                "Ed25519 curve is not valid for EC keys".to_string(),
            )),
        },
        AlgorithmParameters::OctetKeyPair(params) => {
            if params.curve != EllipticCurve::Ed25519 {
                return Err(Error::Crypto(format!(
                    "unsupported OKP curve: {:?}",
                    params.curve
                )));
            }
            PublicKey::ed25519_from_bytes(&base64_url_decode(&params.x)?)
        }
        AlgorithmParameters::OctetKey(_) => Err(Error::Crypto(
            "symmetric keys cannot verify registry tokens".to_string(),
        )),
    }
}

fn sec1_from_coords(x: &str, y: &str, coord_size: usize) -> Result<Vec<u8>, Error> {
    let x = decode_coord(x, coord_size)?;
    let y = decode_coord(y, coord_size)?;
    let mut sec1 = Vec::with_capacity(1 + x.len() + y.len());
    sec1.push(0x04);
    sec1.extend_from_slice(&x);
    sec1.extend_from_slice(&y);
    Ok(sec1)
}

fn decode_coord(value: &str, coord_size: usize) -> Result<Vec<u8>, Error> {
    let bytes = base64_url_decode(value)?;
    if bytes.len() > coord_size {
        return Err(Error::Crypto("ec coordinate too long".to_string()));
    }
    if bytes.len() == coord_size {
        return Ok(bytes);
    }
    let mut padded = vec![0u8; coord_size - bytes.len()];
    padded.extend_from_slice(&bytes);
    Ok(padded)
}
