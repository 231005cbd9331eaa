use super::errors::{DomainError, DomainResult};
use ed25519_dalek::{Signer, SigningKey};
use stellar_strkey::ed25519;

/// An ed25519 account keypair.
///
/// The public half is rendered as a `G...` StrKey account id, the private
/// half as an `S...` StrKey seed.
#[derive(Clone)]
pub struct Keypair {
    signing: SigningKey,
}

impl Keypair {
    /// Generates a fresh keypair from the operating system RNG.
    pub fn random() -> Self {
        let seed: [u8; 32] = rand::random();
        Self {
            signing: SigningKey::from_bytes(&seed),
        }
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing.verifying_key().to_bytes()
    }

    pub fn public_key(&self) -> String {
        ed25519::PublicKey(self.public_key_bytes()).to_string()
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing.sign(message).to_bytes()
    }

    /// Last four bytes of the public key, used to match a signature to its
    /// signer.
    pub fn signature_hint(&self) -> [u8; 4] {
        let pk = self.public_key_bytes();
        [pk[28], pk[29], pk[30], pk[31]]
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Decodes a `G...` account id into its raw ed25519 key.
pub fn decode_public_key(account_id: &str) -> DomainResult<[u8; 32]> {
    ed25519::PublicKey::from_string(account_id)
        .map(|pk| pk.0)
        .map_err(|_| DomainError::InvalidPublicKey(account_id.to_string()))
}
