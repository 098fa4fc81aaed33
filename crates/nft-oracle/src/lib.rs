#![deny(missing_docs)]
//! Oracle quorum attestation for the Sensible NFT SDK.
//!
//! Issue and transfer transactions must prove that the token UTXO they
//! spend descends from a genuine protocol transaction. That proof is an
//! attestation: each selected oracle signer checks the spent output
//! against its prior transaction and Rabin-signs a canonical digest of
//! the output reference. The quorum verifier collects one signature per
//! selected signer, verifies every one of them, and hands the result to
//! the transaction builder for embedding in the unlocking script.
//!
//! Signer selection is caller configuration, never chosen or re-rolled
//! in here: the same `selected` set must be reproducible across the
//! unsigned-construction and signing steps of one logical operation.

pub mod attestation;
pub mod client;
pub mod error;
pub mod quorum;
pub mod signer;

pub use attestation::{AttestRequest, AttestationEntry, OutputRef, QuorumAttestation};
pub use client::{OracleClient, OracleConfig};
pub use error::OracleError;
pub use quorum::SignerQuorum;
pub use signer::{MockOracleSigner, OracleSigner};
