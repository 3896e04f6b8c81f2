//! Transactions bound to a network, in their Stellar XDR form

use data_encoding::HEXLOWER;
use sha2::{Digest, Sha256};
pub use stellar_xdr::curr::{
    Asset, DecoratedSignature, ExtendFootprintTtlOp, ExtensionPoint, HostFunction,
    InvokeContractArgs, InvokeHostFunctionOp, LedgerFootprint, LedgerKey, Memo, MuxedAccount,
    Operation, OperationBody, PaymentOp, Preconditions, RestoreFootprintOp, SequenceNumber,
    SorobanAuthorizationEntry, SorobanResources, SorobanTransactionData, TimeBounds, TimePoint,
    TransactionEnvelope, TransactionExt, TransactionV1Envelope,
};
use stellar_xdr::curr::{
    self as xdr, Hash, TransactionSignaturePayload, TransactionSignaturePayloadTaggedTransaction,
    VecM,
};

use crate::error::{Error, Result};
use crate::network::network_id;
use crate::wire;

pub mod builder;

pub use builder::{
    contract_transaction, invoke_contract, Account, ContractTransactionProps, TxBuilder,
};

/// Base fee of a single operation, in stroops
pub const BASE_FEE: u32 = 100;

/// Unsigned transaction bound to a network
///
/// Never mutated after it is built: every step producing a changed transaction returns a new
/// value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    tx: xdr::Transaction,
    network_passphrase: String,
}

impl Transaction {
    pub fn new(tx: xdr::Transaction, network_passphrase: impl Into<String>) -> Self {
        Transaction {
            tx,
            network_passphrase: network_passphrase.into(),
        }
    }

    /// Parse an envelope, discarding any signatures it carries
    pub fn from_xdr(encoded: &str, network_passphrase: &str) -> Result<Self> {
        let envelope = v1_envelope(encoded)?;
        Ok(Transaction::new(envelope.tx, network_passphrase))
    }

    pub fn xdr(&self) -> &xdr::Transaction {
        &self.tx
    }

    pub fn into_xdr(self) -> xdr::Transaction {
        self.tx
    }

    pub fn network_passphrase(&self) -> &str {
        &self.network_passphrase
    }

    pub fn fee(&self) -> u32 {
        self.tx.fee
    }

    pub fn sequence(&self) -> i64 {
        self.tx.seq_num.0
    }

    pub fn operations(&self) -> &[Operation] {
        self.tx.operations.as_slice()
    }

    pub fn soroban_data(&self) -> Option<&SorobanTransactionData> {
        match &self.tx.ext {
            TransactionExt::V1(data) => Some(data),
            TransactionExt::V0 => None,
        }
    }

    /// Payload covered by signatures
    pub fn signature_payload(&self) -> TransactionSignaturePayload {
        signature_payload(&self.tx, &self.network_passphrase)
    }

    pub fn hash(&self) -> [u8; 32] {
        hash(&self.tx, &self.network_passphrase)
    }

    pub fn hash_hex(&self) -> String {
        HEXLOWER.encode(&self.hash())
    }

    /// Wire form of the unsigned envelope
    pub fn to_xdr(&self) -> String {
        wire::to_base64(&TransactionEnvelope::Tx(TransactionV1Envelope {
            tx: self.tx.clone(),
            signatures: VecM::default(),
        }))
    }

    pub fn with_signature(self, signature: DecoratedSignature) -> SignedTransaction {
        // JUSTIFICATION: a single signature is within the envelope's limit
        self.with_signatures(vec![signature]).unwrap()
    }

    pub fn with_signatures(self, signatures: Vec<DecoratedSignature>) -> Result<SignedTransaction> {
        let count = signatures.len();
        let signatures: VecM<DecoratedSignature, 20> = signatures.try_into().map_err(|_| {
            Error::InvalidTransaction(format!("too many signatures ({})", count))
        })?;

        Ok(SignedTransaction {
            envelope: TransactionV1Envelope {
                tx: self.tx,
                signatures,
            },
            network_passphrase: self.network_passphrase,
        })
    }
}

/// Transaction with its signatures, ready to be submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    envelope: TransactionV1Envelope,
    network_passphrase: String,
}

impl SignedTransaction {
    pub fn from_xdr(encoded: &str, network_passphrase: &str) -> Result<Self> {
        Ok(SignedTransaction {
            envelope: v1_envelope(encoded)?,
            network_passphrase: network_passphrase.to_string(),
        })
    }

    pub fn envelope(&self) -> &TransactionV1Envelope {
        &self.envelope
    }

    pub fn signatures(&self) -> &[DecoratedSignature] {
        self.envelope.signatures.as_slice()
    }

    pub fn network_passphrase(&self) -> &str {
        &self.network_passphrase
    }

    pub fn hash(&self) -> [u8; 32] {
        hash(&self.envelope.tx, &self.network_passphrase)
    }

    pub fn hash_hex(&self) -> String {
        HEXLOWER.encode(&self.hash())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        wire::to_bytes(&TransactionEnvelope::Tx(self.envelope.clone()))
    }

    pub fn to_xdr(&self) -> String {
        wire::to_base64(&TransactionEnvelope::Tx(self.envelope.clone()))
    }

    /// The transaction without signatures
    pub fn transaction(&self) -> Transaction {
        Transaction::new(self.envelope.tx.clone(), self.network_passphrase.clone())
    }
}

fn v1_envelope(encoded: &str) -> Result<TransactionV1Envelope> {
    match wire::from_base64("TransactionEnvelope", encoded)? {
        TransactionEnvelope::Tx(envelope) => Ok(envelope),
        other => Err(Error::InvalidTransaction(format!(
            "unsupported envelope type {}",
            other.name()
        ))),
    }
}

fn signature_payload(tx: &xdr::Transaction, network_passphrase: &str) -> TransactionSignaturePayload {
    TransactionSignaturePayload {
        network_id: Hash(network_id(network_passphrase)),
        tagged_transaction: TransactionSignaturePayloadTaggedTransaction::Tx(tx.clone()),
    }
}

fn hash(tx: &xdr::Transaction, network_passphrase: &str) -> [u8; 32] {
    let payload = wire::to_bytes(&signature_payload(tx, network_passphrase));
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&Sha256::digest(payload));
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{PUBLIC_PASSPHRASE, TESTNET_PASSPHRASE};

    /// Zero source account, fee 100, sequence 1, a single restoreFootprint operation
    const RESTORE_ENVELOPE: &str = "AAAAAgAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAGQAAAAAAAAAAQAAAAAAAAAAAAAAAQAAAAAAAAAaAAAAAAAAAAAAAAAA";
    const RESTORE_TESTNET_HASH: &str =
        "b5cdf7bfed0f644912e33cf109ebd68daec87910da5f9d427de87331aaa2a601";

    #[test]
    fn parses_standard_envelope() {
        let tx = Transaction::from_xdr(RESTORE_ENVELOPE, TESTNET_PASSPHRASE).unwrap();

        assert_eq!(tx.fee(), BASE_FEE);
        assert_eq!(tx.sequence(), 1);
        assert!(matches!(
            tx.operations(),
            [Operation {
                source_account: None,
                body: OperationBody::RestoreFootprint(_),
            }]
        ));
        assert_eq!(tx.soroban_data(), None);
        assert_eq!(tx.to_xdr(), RESTORE_ENVELOPE);
    }

    #[test]
    fn hash_covers_network_and_transaction() {
        let testnet = Transaction::from_xdr(RESTORE_ENVELOPE, TESTNET_PASSPHRASE).unwrap();
        let public = Transaction::from_xdr(RESTORE_ENVELOPE, PUBLIC_PASSPHRASE).unwrap();

        assert_eq!(testnet.hash_hex(), RESTORE_TESTNET_HASH);
        assert_ne!(testnet.hash(), public.hash());
    }

    #[test]
    fn rejects_fee_bump_envelope() {
        // ENVELOPE_TYPE_TX_FEE_BUMP with nothing after the tag
        assert!(Transaction::from_xdr("AAAABQ==", TESTNET_PASSPHRASE).is_err());
    }

    #[test]
    fn signatures_do_not_change_hash() {
        let tx = Transaction::from_xdr(RESTORE_ENVELOPE, TESTNET_PASSPHRASE).unwrap();
        let hash = tx.hash();
        let signed = tx.with_signature(DecoratedSignature {
            hint: xdr::SignatureHint([1, 2, 3, 4]),
            signature: xdr::Signature(vec![0; 64].try_into().unwrap()),
        });

        assert_eq!(signed.hash(), hash);
        assert_eq!(signed.signatures().len(), 1);

        let parsed = SignedTransaction::from_xdr(&signed.to_xdr(), TESTNET_PASSPHRASE).unwrap();
        assert_eq!(parsed, signed);
    }

    #[test]
    fn signature_limit() {
        let tx = Transaction::from_xdr(RESTORE_ENVELOPE, TESTNET_PASSPHRASE).unwrap();
        let signature = DecoratedSignature {
            hint: xdr::SignatureHint([0; 4]),
            signature: xdr::Signature(vec![0; 64].try_into().unwrap()),
        };

        assert!(matches!(
            tx.with_signatures(vec![signature; 21]),
            Err(Error::InvalidTransaction(_))
        ));
    }
}
