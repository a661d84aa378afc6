use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use p256::elliptic_curve::sec1::EncodedPoint;
use rsa::traits::PublicKeyParts;
use sha2::{Digest, Sha256};

use super::public_key::PublicKey;

/// RFC 7638 JWK thumbprint (SHA-256, base64url) of `key`.
///
/// The thumbprint is taken over the required public members of the key's JWK
/// form, serialized with lexicographically ordered names and no whitespace.
/// Keys without a JWK form yield an empty identifier.
pub fn key_id(key: &PublicKey) -> String {
    let canonical = match key {
        PublicKey::Rsa(key) => format!(
            r#"{{"e":"{}","kty":"RSA","n":"{}"}}"#,
            URL_SAFE_NO_PAD.encode(key.e().to_bytes_be()),
            URL_SAFE_NO_PAD.encode(key.n().to_bytes_be()),
        ),
        PublicKey::P256(key) => {
            match ec_members::<p256::NistP256>("P-256", &key.to_encoded_point(false)) {
                Some(members) => members,
                None => return String::new(),
            }
        }
        PublicKey::P384(key) => {
            match ec_members::<p384::NistP384>("P-384", &key.to_encoded_point(false)) {
                Some(members) => members,
                None => return String::new(),
            }
        }
        PublicKey::P521(key) => {
            match ec_members::<p521::NistP521>("P-521", &key.to_encoded_point(false)) {
                Some(members) => members,
                None => return String::new(),
            }
        }
        PublicKey::Ed25519(key) => format!(
            r#"{{"crv":"Ed25519","kty":"OKP","x":"{}"}}"#,
            URL_SAFE_NO_PAD.encode(key.as_bytes()),
        ),
    };
    URL_SAFE_NO_PAD.encode(Sha256::digest(canonical.as_bytes()))
}

fn ec_members<C>(curve: &str, point: &EncodedPoint<C>) -> Option<String>
where
    C: p256::elliptic_curve::Curve,
    p256::elliptic_curve::FieldBytesSize<C>: p256::elliptic_curve::sec1::ModulusSize,
{
    let x = point.x()?;
    let y = point.y()?;
    Some(format!(
        r#"{{"crv":"{}","kty":"EC","x":"{}","y":"{}"}}"#,
        curve,
        URL_SAFE_NO_PAD.encode(x),
        URL_SAFE_NO_PAD.encode(y),
    ))
}
