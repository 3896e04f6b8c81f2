pub mod key_signer;
