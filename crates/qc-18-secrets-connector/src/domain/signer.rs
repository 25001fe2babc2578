//! # Message Signing (secp256k1)
//!
//! Recoverable ECDSA over Keccak-256 digests, the scheme shared by the
//! gateway, the connector nodes and the secrets storage.
//!
//! ## Format
//!
//! - Digest: `keccak256(part_0 || part_1 || ...)`
//! - Signature: 65 bytes `r || s || v` with `v ∈ {0, 1}` (27/28 accepted on recovery)
//! - Signer identity: address recovered from the signature
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: high-S signatures are normalized when
//!   signing and rejected when recovering
//! - The signing key is zeroized on drop by `k256`

use super::address::{Address, ADDRESS_LEN};
use super::errors::SignerError;
use crate::ports::inbound::Signer;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};
use std::fmt;
use zeroize::Zeroizing;

/// Length of a recoverable signature (r || s || v).
pub const SIGNATURE_LEN: usize = 65;

/// Keccak256 over the concatenation of all parts.
pub fn keccak256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Derive the account address from a public key.
pub fn address_from_key(public_key: &VerifyingKey) -> Address {
    let pubkey_bytes = public_key.to_encoded_point(false);
    let pubkey_slice = pubkey_bytes.as_bytes();

    // Keccak256 hash of public key (without 0x04 prefix)
    let hash = keccak256(&[&pubkey_slice[1..]]);

    let mut address = [0u8; ADDRESS_LEN];
    address.copy_from_slice(&hash[12..]);
    Address::new(address)
}

/// Recover the address that produced `signature` over `data`.
pub fn recover_signer(signature: &[u8], data: &[&[u8]]) -> Result<Address, SignerError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(SignerError::InvalidLength(signature.len()));
    }

    let recovery_id = parse_recovery_id(signature[64])?;
    let sig = Signature::from_slice(&signature[..64]).map_err(|_| SignerError::InvalidFormat)?;

    // normalize_s() returns Some only for high-S signatures
    if sig.normalize_s().is_some() {
        return Err(SignerError::MalleableSignature);
    }

    let digest = keccak256(data);
    let recovered = VerifyingKey::recover_from_prehash(&digest, &sig, recovery_id)
        .map_err(|_| SignerError::RecoveryFailed)?;

    Ok(address_from_key(&recovered))
}

/// Parse recovery ID from v value.
///
/// Valid v values: 0, 1, 27, 28
fn parse_recovery_id(v: u8) -> Result<RecoveryId, SignerError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(SignerError::InvalidRecoveryId(v)),
    };

    RecoveryId::from_byte(id).ok_or(SignerError::InvalidRecoveryId(v))
}

/// secp256k1 key used to sign outbound envelopes (and, client side, secret records).
#[derive(Clone)]
pub struct MessageSigner {
    signing_key: SigningKey,
    address: Address,
}

impl MessageSigner {
    pub fn new(signing_key: SigningKey) -> Self {
        let address = address_from_key(signing_key.verifying_key());
        Self {
            signing_key,
            address,
        }
    }

    /// Create from raw secret key bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignerError> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| SignerError::InvalidPrivateKey)?;
        Ok(Self::new(signing_key))
    }

    /// Create from a hex secret key, with or without `0x` prefix.
    pub fn from_hex(secret: &str) -> Result<Self, SignerError> {
        let digits = secret.strip_prefix("0x").unwrap_or(secret);
        let bytes = Zeroizing::new(hex::decode(digits).map_err(|_| SignerError::InvalidPrivateKey)?);
        Self::from_bytes(&bytes)
    }

    /// Address of this key.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Sign the Keccak256 digest of the concatenated parts.
    pub fn sign_parts(&self, data: &[&[u8]]) -> Result<[u8; SIGNATURE_LEN], SignerError> {
        let digest = keccak256(data);
        let (sig, recid) = self
            .signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|_| SignerError::SigningFailed)?;

        // Normalize S to low value (EIP-2), flipping the y parity with it
        let (sig, recid) = match sig.normalize_s() {
            Some(normalized) => (
                normalized,
                RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced()),
            ),
            None => (sig, recid),
        };

        let mut out = [0u8; SIGNATURE_LEN];
        out[..64].copy_from_slice(&sig.to_bytes());
        out[64] = recid.to_byte();
        Ok(out)
    }
}

impl Signer for MessageSigner {
    fn sign(&self, data: &[&[u8]]) -> Result<Vec<u8>, SignerError> {
        self.sign_parts(data).map(|sig| sig.to_vec())
    }
}

impl fmt::Debug for MessageSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
