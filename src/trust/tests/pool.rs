use rcgen::{BasicConstraints, CertificateParams, CustomExtension, IsCa, KeyUsagePurpose};

use super::chain::{
    build_chain, build_chain_from, build_chain_with, params, TestChain,
    SECP256K1_ISSUED_LEAF_PEM, SECP256K1_ROOT_PEM,
};
use crate::trust::{certificates_from_pem, CertificatePool, ParsedCertificate};

const NOW: u64 = 1_700_000_000;

// Inside the validity period of the secp256k1 fixtures.
const LATER: u64 = 4_000_000_000;

fn parse(der: &[u8]) -> ParsedCertificate {
    ParsedCertificate::from_der(der).expect("certificate")
}

fn pool_of(der: &[u8]) -> CertificatePool {
    let mut pool = CertificatePool::new();
    pool.add(parse(der));
    pool
}

#[test]
fn chain_through_intermediate_verifies() {
    let chain = build_chain();
    let pool = pool_of(&chain.root_der);
    pool.verify_chain(
        &parse(&chain.leaf_der),
        &[parse(&chain.intermediate_der)],
        NOW,
    )
    .expect("trusted chain");
}

#[test]
fn missing_intermediate_breaks_chain() {
    let chain = build_chain();
    let pool = pool_of(&chain.root_der);
    assert!(pool.verify_chain(&parse(&chain.leaf_der), &[], NOW).is_err());
}

#[test]
fn chain_to_unknown_root_is_rejected() {
    let chain = build_chain();
    let other = build_chain();
    let pool = pool_of(&other.root_der);
    let err = pool
        .verify_chain(
            &parse(&chain.leaf_der),
            &[parse(&chain.intermediate_der)],
            NOW,
        )
        .expect_err("untrusted root");
    assert!(err.to_string().contains("no trusted chain"));
}

#[test]
fn root_presented_as_leaf_is_trusted() {
    let chain = build_chain();
    let pool = pool_of(&chain.root_der);
    pool.verify_chain(&parse(&chain.root_der), &[], NOW)
        .expect("root itself");
}

#[test]
fn certificates_outside_validity_are_rejected() {
    let chain = build_chain();
    let pool = pool_of(&chain.root_der);
    let err = pool
        .verify_chain(&parse(&chain.leaf_der), &[parse(&chain.intermediate_der)], 0)
        .expect_err("not yet valid");
    assert!(err.to_string().contains("validity"));
}

#[test]
fn non_ca_intermediate_cannot_issue() {
    let chain = build_chain_with(IsCa::ExplicitNoCa);
    let pool = pool_of(&chain.root_der);
    assert!(pool
        .verify_chain(
            &parse(&chain.leaf_der),
            &[parse(&chain.intermediate_der)],
            NOW
        )
        .is_err());
}

#[test]
fn zero_path_length_intermediate_may_issue_leaf() {
    let chain = build_chain_with(IsCa::Ca(BasicConstraints::Constrained(0)));
    let pool = pool_of(&chain.root_der);
    pool.verify_chain(
        &parse(&chain.leaf_der),
        &[parse(&chain.intermediate_der)],
        NOW,
    )
    .expect("path length zero");
}

#[test]
fn pool_ignores_duplicate_certificates() {
    let chain = build_chain();
    let mut pool = pool_of(&chain.root_der);
    pool.add(parse(&chain.root_der));
    assert_eq!(pool.len(), 1);
    assert!(pool.contains(&parse(&chain.root_der)));
    assert!(!pool.contains(&parse(&chain.leaf_der)));
}

fn verify(chain: &TestChain) -> Result<(), crate::Error> {
    pool_of(&chain.root_der).verify_chain(
        &parse(&chain.leaf_der),
        &[parse(&chain.intermediate_der)],
        NOW,
    )
}

fn root() -> CertificateParams {
    params("Test Root CA", IsCa::Ca(BasicConstraints::Unconstrained))
}

fn intermediate() -> CertificateParams {
    params("Test Intermediate CA", IsCa::Ca(BasicConstraints::Unconstrained))
}

fn leaf() -> CertificateParams {
    params("token signer", IsCa::NoCa)
}

fn private_extension(critical: bool) -> CustomExtension {
    let mut ext =
        CustomExtension::from_oid_content(&[1, 3, 6, 1, 4, 1, 55555, 1], vec![0x05, 0x00]);
    ext.set_criticality(critical);
    ext
}

fn single(pem: &str) -> ParsedCertificate {
    let mut certs = certificates_from_pem(pem.as_bytes()).expect("certificate");
    assert_eq!(certs.len(), 1);
    certs.remove(0)
}

#[test]
fn root_path_length_limits_intermediates() {
    let chain = build_chain_from(
        params("Test Root CA", IsCa::Ca(BasicConstraints::Constrained(0))),
        intermediate(),
        leaf(),
    );
    assert!(verify(&chain).is_err());
}

#[test]
fn intermediate_without_key_cert_sign_cannot_issue() {
    let mut issuer = intermediate();
    issuer.key_usages = vec![KeyUsagePurpose::DigitalSignature];
    let chain = build_chain_from(root(), issuer, leaf());
    assert!(verify(&chain).is_err());
}

#[test]
fn unknown_critical_extension_rejects_leaf() {
    let mut signer = leaf();
    signer.custom_extensions.push(private_extension(true));
    let chain = build_chain_from(root(), intermediate(), signer);
    let err = verify(&chain).expect_err("critical extension");
    assert!(err.to_string().contains("unhandled critical extension"));
}

#[test]
fn unknown_critical_extension_rejects_intermediate() {
    let mut issuer = intermediate();
    issuer.custom_extensions.push(private_extension(true));
    let chain = build_chain_from(root(), issuer, leaf());
    assert!(verify(&chain).is_err());
}

#[test]
fn unknown_non_critical_extension_is_ignored() {
    let mut signer = leaf();
    signer.custom_extensions.push(private_extension(false));
    let chain = build_chain_from(root(), intermediate(), signer);
    verify(&chain).expect("non-critical extension");
}

#[test]
fn unsupported_key_certificate_cannot_be_leaf() {
    let root = single(SECP256K1_ROOT_PEM);
    assert!(root.public_key().is_none());
    let mut pool = CertificatePool::new();
    pool.add(root.clone());
    let err = pool.verify_chain(&root, &[], LATER).expect_err("no usable key");
    assert!(err.to_string().contains("unsupported public key"));
}

#[test]
fn unsupported_key_certificate_cannot_issue() {
    let mut pool = CertificatePool::new();
    pool.add(single(SECP256K1_ROOT_PEM));
    let leaf = single(SECP256K1_ISSUED_LEAF_PEM);
    assert!(leaf.public_key().is_some());
    assert!(pool.verify_chain(&leaf, &[], LATER).is_err());
}
