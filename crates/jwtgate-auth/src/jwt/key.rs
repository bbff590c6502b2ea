//! Public keys extracted from X.509 leaf certificates

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey};
use x509_parser::parse_x509_certificate;

use crate::error::CertificateError;

const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
const OID_ED25519: &str = "1.3.101.112";

/// Public key algorithm of a certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// RSA (`rsaEncryption`)
    Rsa,
    /// Elliptic curve (`id-ecPublicKey`)
    Ec,
    /// Ed25519
    Ed25519,
}

impl KeyType {
    /// Whether a key of this type can verify `algorithm`
    pub fn supports(self, algorithm: Algorithm) -> bool {
        match self {
            Self::Rsa => matches!(
                algorithm,
                Algorithm::RS256
                    | Algorithm::RS384
                    | Algorithm::RS512
                    | Algorithm::PS256
                    | Algorithm::PS384
                    | Algorithm::PS512
            ),
            Self::Ec => matches!(algorithm, Algorithm::ES256 | Algorithm::ES384),
            Self::Ed25519 => matches!(algorithm, Algorithm::EdDSA),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rsa => "RSA",
            Self::Ec => "EC",
            Self::Ed25519 => "Ed25519",
        })
    }
}

/// Verification key taken from a certificate's SubjectPublicKeyInfo
///
/// `material` is the content of the `subjectPublicKey` bit string: a PKCS#1
/// `RSAPublicKey` for RSA, the encoded point for EC, the raw key for Ed25519.
/// Those are exactly the encodings [`DecodingKey`]'s DER constructors expect.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    key_type: KeyType,
    material: Arc<[u8]>,
}

impl PublicKey {
    /// Extract the public key from a DER-encoded X.509 certificate
    ///
    /// # Errors
    ///
    /// Returns [`CertificateError::Der`] if the bytes are not a certificate and
    /// [`CertificateError::UnsupportedKeyAlgorithm`] if the key is not RSA, EC, or Ed25519.
    pub fn from_certificate_der(der: &[u8]) -> Result<Self, CertificateError> {
        let (_, cert) =
            parse_x509_certificate(der).map_err(|e| CertificateError::Der(e.to_string()))?;
        let spki = cert.public_key();
        let oid = spki.algorithm.algorithm.to_id_string();

        let key_type = match oid.as_str() {
            OID_RSA_ENCRYPTION => KeyType::Rsa,
            OID_EC_PUBLIC_KEY => KeyType::Ec,
            OID_ED25519 => KeyType::Ed25519,
            _ => return Err(CertificateError::UnsupportedKeyAlgorithm(oid)),
        };

        Ok(Self {
            key_type,
            material: Arc::from(spki.subject_public_key.data.to_vec()),
        })
    }

    /// Key algorithm
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Raw subject public key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.material
    }

    /// Whether this key can verify `algorithm`
    pub fn supports(&self, algorithm: Algorithm) -> bool {
        self.key_type.supports(algorithm)
    }

    pub(crate) fn decoding_key(&self) -> DecodingKey {
        match self.key_type {
            KeyType::Rsa => DecodingKey::from_rsa_der(&self.material),
            KeyType::Ec => DecodingKey::from_ec_der(&self.material),
            KeyType::Ed25519 => DecodingKey::from_ed_der(&self.material),
        }
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("key_type", &self.key_type)
            .field("len", &self.material.len())
            .finish()
    }
}
