//! Signer holding an ed25519 secret seed in memory

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use stellar_xdr::curr::{DecoratedSignature, Signature, SignatureHint};

use crate::signer::{SignOptions, SignerError, TransactionSigner, WalletConnector};
use crate::strkey::{self, Version};
use crate::transaction::{SignedTransaction, Transaction};

/// Local keypair derived from an `S…` secret seed
pub struct KeySigner {
    signing_key: SigningKey,
}

impl KeySigner {
    /// Derive the keypair from an `S…` secret seed
    pub fn from_secret(secret_key: &str) -> Result<KeySigner, SignerError> {
        let seed = strkey::decode(Version::SecretSeed, secret_key.trim())
            .map_err(|err| SignerError::InvalidKey(err.to_string()))?;

        Ok(Self::from_seed(&seed))
    }

    pub fn from_seed(seed: &[u8; 32]) -> KeySigner {
        KeySigner {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// `S…` encoded secret seed
    pub fn secret(&self) -> String {
        strkey::encode(Version::SecretSeed, &self.signing_key.to_bytes())
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Hint identifying the key in a decorated signature
    pub fn signature_hint(&self) -> SignatureHint {
        let public_key = self.public_key_bytes();
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&public_key[28..]);
        SignatureHint(hint)
    }

    pub fn sign_decorated(&self, tx: &Transaction) -> DecoratedSignature {
        let signature = self.signing_key.sign(&tx.hash()).to_bytes();
        DecoratedSignature {
            hint: self.signature_hint(),
            // JUSTIFICATION: ed25519 signatures are exactly 64 bytes
            signature: Signature(signature.to_vec().try_into().unwrap()),
        }
    }
}

impl TransactionSigner for KeySigner {
    fn public_key(&self) -> String {
        strkey::encode(Version::AccountId, &self.public_key_bytes())
    }

    fn sign_transaction(&self, tx: &Transaction) -> SignedTransaction {
        tx.clone().with_signature(self.sign_decorated(tx))
    }
}

/// Lets a local key stand in for a connected wallet
#[async_trait]
impl WalletConnector for KeySigner {
    fn name(&self) -> &str {
        "local key"
    }

    async fn sign_transaction(
        &self,
        tx_xdr: &str,
        opts: &SignOptions,
    ) -> std::result::Result<String, SignerError> {
        let tx = Transaction::from_xdr(tx_xdr, &opts.network_passphrase)
            .map_err(|err| SignerError::Other(err.into()))?;

        Ok(TransactionSigner::sign_transaction(self, &tx).to_xdr())
    }
}

impl std::fmt::Debug for KeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySigner")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::TESTNET_PASSPHRASE;
    use crate::transaction::builder::restore_footprint;
    use crate::transaction::{Account, TxBuilder, BASE_FEE};
    use ed25519_dalek::{Signature as Ed25519Signature, Verifier, VerifyingKey};

    fn restore_tx(signer: &KeySigner) -> Transaction {
        TxBuilder::new(&Account::new(signer.public_key(), 1), BASE_FEE, TESTNET_PASSPHRASE)
            .add_operation(restore_footprint())
            .set_timeout(0)
            .build()
            .unwrap()
    }

    #[test]
    fn secret_roundtrip() {
        let signer = KeySigner::from_seed(&[11; 32]);
        let parsed = KeySigner::from_secret(&signer.secret()).unwrap();

        assert_eq!(parsed.public_key(), signer.public_key());
        assert!(signer.public_key().starts_with('G'));
    }

    #[test]
    fn rejects_account_id_as_secret() {
        let signer = KeySigner::from_seed(&[11; 32]);

        assert!(matches!(
            KeySigner::from_secret(&signer.public_key()),
            Err(SignerError::InvalidKey(_))
        ));
        assert!(matches!(
            KeySigner::from_secret("not a key"),
            Err(SignerError::InvalidKey(_))
        ));
    }

    #[test]
    fn signature_verifies_against_hash() {
        let signer = KeySigner::from_seed(&[7; 32]);
        let tx = restore_tx(&signer);

        let signed = TransactionSigner::sign_transaction(&signer, &tx);
        let decorated = &signed.signatures()[0];
        let verifying_key = VerifyingKey::from_bytes(&signer.public_key_bytes()).unwrap();
        let signature = Ed25519Signature::from_slice(decorated.signature.0.as_slice()).unwrap();

        assert_eq!(decorated.hint, signer.signature_hint());
        assert!(verifying_key.verify(&tx.hash(), &signature).is_ok());
    }

    #[tokio::test]
    async fn signs_as_connector() {
        let signer = KeySigner::from_seed(&[7; 32]);
        let tx = restore_tx(&signer);
        let opts = SignOptions {
            network_passphrase: TESTNET_PASSPHRASE.to_string(),
            address: None,
        };

        let signed_xdr = WalletConnector::sign_transaction(&signer, &tx.to_xdr(), &opts)
            .await
            .unwrap();
        let signed = SignedTransaction::from_xdr(&signed_xdr, TESTNET_PASSPHRASE).unwrap();

        assert_eq!(signed.hash(), tx.hash());
        assert_eq!(signed.signatures().len(), 1);
    }
}
