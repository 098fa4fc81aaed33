//! The lifecycle engine.

use nft_chain::{ChainApi, TokenUtxoRecord};
use nft_oracle::{AttestRequest, OracleSigner, OutputRef, QuorumAttestation, SignerQuorum};
use nft_primitives::chainhash::Hash;
use nft_primitives::ec::{PrivateKey, PublicKey};
use nft_primitives::hash::hash160;
use nft_script::{Address, Network, Script};
use nft_transaction::{Transaction, TransactionOutput};

use crate::factory::{
    add_fee_input, add_token_input, attestation_suffix, change_output, opreturn_output,
    sighash_descriptors, sign_input, token_unlocking_script, InputRole,
};
use crate::fee::{
    estimate_funding, estimate_size, fee_for_size, OpKind, QuorumShape, DUST_LIMIT,
    TOKEN_OUTPUT_SATOSHIS,
};
use crate::script::builder::{build_locking_script, code_part, genesis_id, NftPayload};
use crate::selector::select_fee_utxos;
use crate::types::{
    parse_token_index, parse_total_supply, FeeUtxo, NftConfig, Outpoint, SigHashDescriptor,
    SignatureItem, TokenIdentity, TokenKind, TokenUtxo,
};
use crate::NftError;

/// Result of a signed genesis operation.
#[derive(Clone, Debug)]
pub struct GenesisResult {
    /// The broadcast transaction.
    pub tx: Transaction,
    /// Codehash of the new series (hex).
    pub codehash: String,
    /// Genesis identifier of the new series (hex).
    pub genesis: String,
    /// Txid returned by the chain.
    pub txid: String,
}

/// Result of a signed issue operation.
#[derive(Clone, Debug)]
pub struct IssueResult {
    /// The broadcast transaction.
    pub tx: Transaction,
    /// Ordinal assigned to the minted token.
    pub token_index: u64,
    /// Txid returned by the chain.
    pub txid: String,
}

/// Result of a signed transfer operation.
#[derive(Clone, Debug)]
pub struct TransferResult {
    /// The broadcast transaction.
    pub tx: Transaction,
    /// Txid returned by the chain.
    pub txid: String,
}

/// Result of an unsigned construction: the transaction plus the ordered
/// descriptor list its caller must sign externally.
#[derive(Clone, Debug)]
pub struct UnsignedOperation {
    /// The transaction, complete except for owner/fee signatures.
    pub tx: Transaction,
    /// One descriptor per input, in input order.
    pub sig_hash_list: Vec<SigHashDescriptor>,
}

/// One planned-but-unsigned transaction with its signing metadata.
struct TxPlan {
    tx: Transaction,
    roles: Vec<InputRole>,
    /// Attestation suffix for the token input, when the plan has one.
    token_suffix: Option<Script>,
    fee_utxos: Vec<FeeUtxo>,
}

/// The non-fungible-token protocol engine.
///
/// Stateless between calls: every operation re-derives series state from
/// the chain collaborator before acting. Generic over the chain API and
/// the oracle signer implementation so production and mock collaborators
/// are injected identically.
pub struct NonFungibleToken<C: ChainApi, S: OracleSigner> {
    chain: C,
    quorum: SignerQuorum<S>,
    feeb: f64,
    network: Network,
    purse: PrivateKey,
    purse_address: Address,
    utxo_max_count: usize,
}

impl<C: ChainApi, S: OracleSigner> NonFungibleToken<C, S> {
    /// Build an engine from configuration and collaborators.
    ///
    /// # Errors
    /// Returns [`NftError::InvalidConfig`] for an unusable purse WIF, a
    /// non-positive fee rate, or a signer selection violating the quorum
    /// arity rules.
    pub fn new(config: NftConfig, chain: C, signers: Vec<S>) -> Result<Self, NftError> {
        if config.feeb <= 0.0 {
            return Err(NftError::InvalidConfig(format!(
                "fee rate must be positive, got {}",
                config.feeb
            )));
        }
        let purse = PrivateKey::from_wif(&config.purse)
            .map_err(|e| NftError::InvalidConfig(format!("bad purse WIF: {e}")))?;
        let purse_address =
            Address::from_public_key_hash(&purse.pub_key().hash160(), config.network);
        let quorum = SignerQuorum::new(
            signers,
            config.signer_selecteds,
            config.required_verify_count,
        )?;

        Ok(NonFungibleToken {
            chain,
            quorum,
            feeb: config.feeb,
            network: config.network,
            purse,
            purse_address,
            utxo_max_count: config.utxo_max_count.max(1),
        })
    }

    /// The chain collaborator.
    pub fn chain(&self) -> &C {
        &self.chain
    }

    // -----------------------------------------------------------------
    // Signed lifecycle operations
    // -----------------------------------------------------------------

    /// Create a new token series with a fixed total supply.
    ///
    /// Broadcasts the genesis transaction and returns the series
    /// identity. `total_supply` is a decimal string per the public API
    /// convention; zero or garbage fails with
    /// [`NftError::InvalidSupply`].
    pub async fn genesis(
        &self,
        genesis_key: &PrivateKey,
        total_supply: &str,
        opreturn_data: Option<&[u8]>,
        utxos: Option<Vec<FeeUtxo>>,
    ) -> Result<GenesisResult, NftError> {
        let supply = parse_total_supply(total_supply)?;
        let issuer_pkh = genesis_key.pub_key().hash160();

        let mut plan = self
            .plan_genesis(issuer_pkh, supply, opreturn_data, utxos)
            .await?;
        self.sign_plan(&mut plan, Some(genesis_key))?;

        let identity = self.get_codehash_and_genesis_by_tx(&plan.tx)?;
        let txid = self.broadcast(&plan.tx).await?;
        Ok(GenesisResult {
            tx: plan.tx,
            codehash: identity.codehash,
            genesis: identity.genesis,
            txid,
        })
    }

    /// Mint the next ordinal of a series to `receiver_address`.
    ///
    /// Consumes the series' mint slot and re-emits it with the ordinal
    /// counter advanced. Fails with [`NftError::SupplyExhausted`] when
    /// the freshly queried mint slot shows every ordinal issued.
    pub async fn issue(
        &self,
        identity: &TokenIdentity,
        genesis_key: &PrivateKey,
        receiver_address: &str,
        opreturn_data: Option<&[u8]>,
        utxos: Option<Vec<FeeUtxo>>,
    ) -> Result<IssueResult, NftError> {
        let issuer_pkh = genesis_key.pub_key().hash160();
        let receiver = Address::from_string(receiver_address)?;

        let (mut plan, token_index) = self
            .plan_issue(identity, issuer_pkh, &receiver, opreturn_data, utxos)
            .await?;
        self.sign_plan(&mut plan, Some(genesis_key))?;

        let txid = self.broadcast(&plan.tx).await?;
        Ok(IssueResult {
            tx: plan.tx,
            token_index,
            txid,
        })
    }

    /// Reassign ownership of one ordinal to `receiver_address`.
    ///
    /// The ordinal is preserved; only the owner slot changes.
    pub async fn transfer(
        &self,
        identity: &TokenIdentity,
        sender_key: &PrivateKey,
        receiver_address: &str,
        token_index: &str,
        utxos: Option<Vec<FeeUtxo>>,
    ) -> Result<TransferResult, NftError> {
        let sender_pkh = sender_key.pub_key().hash160();
        let receiver = Address::from_string(receiver_address)?;
        let index = parse_token_index(token_index)?;

        let mut plan = self
            .plan_transfer(identity, sender_pkh, &receiver, index, utxos)
            .await?;
        self.sign_plan(&mut plan, Some(sender_key))?;

        let txid = self.broadcast(&plan.tx).await?;
        Ok(TransferResult { tx: plan.tx, txid })
    }

    // -----------------------------------------------------------------
    // Unsigned flow
    // -----------------------------------------------------------------

    /// Construct a genesis transaction without signing it.
    ///
    /// Identical structure to [`genesis`](Self::genesis); the issuer is
    /// identified by public key only and the caller signs through the
    /// returned descriptor list. Nothing is broadcast.
    pub async fn unsign_genesis(
        &self,
        genesis_public_key: &PublicKey,
        total_supply: &str,
        opreturn_data: Option<&[u8]>,
        utxos: Option<Vec<FeeUtxo>>,
    ) -> Result<UnsignedOperation, NftError> {
        let supply = parse_total_supply(total_supply)?;
        let plan = self
            .plan_genesis(genesis_public_key.hash160(), supply, opreturn_data, utxos)
            .await?;
        self.into_unsigned(plan)
    }

    /// Construct an issue transaction without signing it.
    pub async fn unsign_issue(
        &self,
        identity: &TokenIdentity,
        genesis_public_key: &PublicKey,
        receiver_address: &str,
        opreturn_data: Option<&[u8]>,
        utxos: Option<Vec<FeeUtxo>>,
    ) -> Result<UnsignedOperation, NftError> {
        let receiver = Address::from_string(receiver_address)?;
        let (plan, _token_index) = self
            .plan_issue(
                identity,
                genesis_public_key.hash160(),
                &receiver,
                opreturn_data,
                utxos,
            )
            .await?;
        self.into_unsigned(plan)
    }

    /// Construct a transfer transaction without signing it.
    pub async fn unsign_transfer(
        &self,
        identity: &TokenIdentity,
        sender_public_key: &PublicKey,
        receiver_address: &str,
        token_index: &str,
        utxos: Option<Vec<FeeUtxo>>,
    ) -> Result<UnsignedOperation, NftError> {
        let receiver = Address::from_string(receiver_address)?;
        let index = parse_token_index(token_index)?;
        let plan = self
            .plan_transfer(
                identity,
                sender_public_key.hash160(),
                &receiver,
                index,
                utxos,
            )
            .await?;
        self.into_unsigned(plan)
    }

    /// Merge externally produced signatures into an unsigned transaction.
    ///
    /// Descriptors and signatures pair up by position; each signature is
    /// verified against its descriptor's sighash and public key before
    /// injection. The input transaction is not modified.
    pub fn sign(
        &self,
        tx: &Transaction,
        sig_hash_list: &[SigHashDescriptor],
        signatures: &[SignatureItem],
    ) -> Result<Transaction, NftError> {
        if signatures.len() != sig_hash_list.len() {
            return Err(NftError::SignatureCountMismatch {
                expected: sig_hash_list.len(),
                actual: signatures.len(),
            });
        }

        let mut signed = tx.clone();
        for (descriptor, item) in sig_hash_list.iter().zip(signatures) {
            let sighash = descriptor.sighash_bytes()?;
            if !item.public_key.verify(&sighash, &item.signature) {
                return Err(NftError::SignatureVerifyFailed {
                    input_index: descriptor.input_index,
                });
            }

            let index = descriptor.input_index as usize;
            let input = signed.inputs.get_mut(index).ok_or_else(|| {
                NftError::SignatureVerifyFailed {
                    input_index: descriptor.input_index,
                }
            })?;

            let mut sig_buf = item.signature.to_der();
            sig_buf.push(descriptor.sighash_type as u8);

            let script = if descriptor.is_p2pkh {
                nft_transaction::template::p2pkh::unlocking_script(
                    &sig_buf,
                    &item.public_key.to_compressed(),
                )?
            } else {
                let suffix = input.unlocking_script.take().unwrap_or_default();
                token_unlocking_script(&sig_buf, &item.public_key, &suffix)?
            };
            input.unlocking_script = Some(script);
        }
        Ok(signed)
    }

    /// Serialize and submit a transaction through the chain collaborator.
    pub async fn broadcast(&self, tx: &Transaction) -> Result<String, NftError> {
        Ok(self.chain.broadcast(&tx.to_hex()).await?)
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// All live issued tokens of a series owned by `address`.
    pub async fn get_summary_detail(
        &self,
        codehash: &str,
        genesis: &str,
        address: &str,
    ) -> Result<Vec<TokenUtxo>, NftError> {
        let records = self
            .chain
            .list_token_utxos(codehash, genesis, address)
            .await?;
        let mut tokens = Vec::with_capacity(records.len());
        for record in &records {
            if record.is_mint_slot {
                continue;
            }
            tokens.push(TokenUtxo::from_record(record)?);
        }
        Ok(tokens)
    }

    /// Extract the series identity from a genesis transaction.
    ///
    /// Works on unbroadcast transactions, so the unsigned flow can learn
    /// `{codehash, genesis}` before anything is on chain.
    pub fn get_codehash_and_genesis_by_tx(
        &self,
        tx: &Transaction,
    ) -> Result<TokenIdentity, NftError> {
        for output in &tx.outputs {
            if let Some(parsed) = crate::script::reader::read_locking_script(&output.locking_script)
            {
                return Ok(TokenIdentity {
                    codehash: hex::encode(parsed.codehash),
                    genesis: hex::encode(parsed.payload.genesis_id),
                });
            }
        }
        Err(NftError::Transaction(
            nft_transaction::TransactionError::InvalidTransaction(
                "transaction carries no protocol output".to_string(),
            ),
        ))
    }

    // -----------------------------------------------------------------
    // Fee estimators
    // -----------------------------------------------------------------

    /// Satoshis to pre-fund for a genesis with these parameters.
    pub fn get_genesis_estimate_fee(
        &self,
        opreturn_len: Option<usize>,
        utxo_max_count: Option<usize>,
    ) -> u64 {
        self.estimate(OpKind::Genesis, opreturn_len, utxo_max_count)
    }

    /// Satoshis to pre-fund for an issue with these parameters.
    pub fn get_issue_estimate_fee(
        &self,
        opreturn_len: Option<usize>,
        utxo_max_count: Option<usize>,
    ) -> u64 {
        self.estimate(OpKind::Issue, opreturn_len, utxo_max_count)
    }

    /// Satoshis to pre-fund for a transfer with these parameters.
    pub fn get_transfer_estimate_fee(
        &self,
        opreturn_len: Option<usize>,
        utxo_max_count: Option<usize>,
    ) -> u64 {
        self.estimate(OpKind::Transfer, opreturn_len, utxo_max_count)
    }

    fn estimate(&self, op: OpKind, opreturn_len: Option<usize>, utxo_max_count: Option<usize>) -> u64 {
        estimate_funding(
            op,
            &self.quorum_shape(),
            utxo_max_count.unwrap_or(self.utxo_max_count),
            opreturn_len,
            self.feeb,
        )
    }

    // -----------------------------------------------------------------
    // Planning
    // -----------------------------------------------------------------

    fn quorum_shape(&self) -> QuorumShape {
        QuorumShape {
            verify_count: self.quorum.selected().len(),
            signature_widths: self
                .quorum
                .selected()
                .iter()
                .map(|&idx| self.quorum.signers()[idx].rabin_public_key().byte_len())
                .collect(),
        }
    }

    /// Hash160 over the full signer set's moduli; the code template
    /// commits to it, so it must not depend on the per-call selection.
    fn oracle_set_hash(&self) -> [u8; 20] {
        let mut data = Vec::new();
        for signer in self.quorum.signers() {
            data.extend_from_slice(&signer.rabin_public_key().to_bytes_le());
        }
        hash160(&data)
    }

    fn codehash_hex(&self) -> String {
        hex::encode(hash160(&code_part(
            &self.oracle_set_hash(),
            self.quorum.selected().len(),
        )))
    }

    async fn fee_candidates(
        &self,
        utxos: Option<Vec<FeeUtxo>>,
    ) -> Result<Vec<FeeUtxo>, NftError> {
        match utxos {
            Some(list) => Ok(list),
            None => {
                let records = self.chain.list_utxos(self.purse_address.as_str()).await?;
                records
                    .iter()
                    .map(|r| FeeUtxo::from_record(r, Some(self.purse.to_wif())))
                    .collect()
            }
        }
    }

    async fn plan_genesis(
        &self,
        issuer_pkh: [u8; 20],
        total_supply: u64,
        opreturn_data: Option<&[u8]>,
        utxos: Option<Vec<FeeUtxo>>,
    ) -> Result<TxPlan, NftError> {
        let shape = self.quorum_shape();
        let opreturn_len = opreturn_data.map(<[u8]>::len);
        let candidates = self.fee_candidates(utxos).await?;

        let feeb = self.feeb;
        let selection = select_fee_utxos(&candidates, self.utxo_max_count, |n| {
            estimate_funding(OpKind::Genesis, &shape, n, opreturn_len, feeb)
        })?;

        let series_genesis_id = genesis_id(&selection.utxos[0].outpoint, total_supply);
        let mint_payload = NftPayload {
            kind: TokenKind::MintSlot,
            total_supply,
            token_index: 0,
            owner_pkh: issuer_pkh,
            genesis_id: series_genesis_id,
        };

        let mut tx = Transaction::new();
        for utxo in &selection.utxos {
            add_fee_input(&mut tx, utxo);
        }

        tx.add_output(TransactionOutput {
            satoshis: TOKEN_OUTPUT_SATOSHIS,
            locking_script: build_locking_script(
                &self.oracle_set_hash(),
                shape.verify_count,
                &mint_payload,
            )?,
            change: false,
        });
        if let Some(data) = opreturn_data {
            tx.add_output(opreturn_output(data)?);
        }

        let fee = fee_for_size(
            estimate_size(OpKind::Genesis, &shape, selection.utxos.len(), opreturn_len),
            self.feeb,
        );
        self.add_change(&mut tx, &selection.utxos, selection.total, 0, TOKEN_OUTPUT_SATOSHIS, fee);

        let roles = selection
            .utxos
            .iter()
            .map(|u| InputRole {
                address: u.address.clone(),
                is_p2pkh: true,
            })
            .collect();

        Ok(TxPlan {
            tx,
            roles,
            token_suffix: None,
            fee_utxos: selection.utxos,
        })
    }

    async fn plan_issue(
        &self,
        identity: &TokenIdentity,
        issuer_pkh: [u8; 20],
        receiver: &Address,
        opreturn_data: Option<&[u8]>,
        utxos: Option<Vec<FeeUtxo>>,
    ) -> Result<(TxPlan, u64), NftError> {
        self.check_identity(identity)?;

        let mint_slot = self.fetch_mint_slot(identity).await?;
        if mint_slot.token_index >= mint_slot.total_supply {
            return Err(NftError::SupplyExhausted {
                genesis: identity.genesis.clone(),
                total_supply: mint_slot.total_supply,
            });
        }
        let next_index = mint_slot.token_index;

        let (attestation, spent_script) = self.attest_record(&mint_slot).await?;
        let suffix = attestation_suffix(&attestation)?;

        let shape = self.quorum_shape();
        let opreturn_len = opreturn_data.map(<[u8]>::len);
        let candidates = self.fee_candidates(utxos).await?;
        let feeb = self.feeb;
        let token_in = mint_slot.satoshis;
        let selection = select_fee_utxos(&candidates, self.utxo_max_count, |n| {
            estimate_funding(OpKind::Issue, &shape, n, opreturn_len, feeb).saturating_sub(token_in)
        })?;

        let genesis_bytes = decode_genesis_hex(&identity.genesis)?;

        let mut tx = Transaction::new();
        add_token_input(
            &mut tx,
            &record_outpoint(&mint_slot)?,
            mint_slot.satoshis,
            spent_script,
        );
        for utxo in &selection.utxos {
            add_fee_input(&mut tx, utxo);
        }

        // Output 0: the mint slot, ordinal counter advanced.
        tx.add_output(TransactionOutput {
            satoshis: TOKEN_OUTPUT_SATOSHIS,
            locking_script: build_locking_script(
                &self.oracle_set_hash(),
                shape.verify_count,
                &NftPayload {
                    kind: TokenKind::MintSlot,
                    total_supply: mint_slot.total_supply,
                    token_index: next_index + 1,
                    owner_pkh: issuer_pkh,
                    genesis_id: genesis_bytes,
                },
            )?,
            change: false,
        });
        // Output 1: the minted token.
        tx.add_output(TransactionOutput {
            satoshis: TOKEN_OUTPUT_SATOSHIS,
            locking_script: build_locking_script(
                &self.oracle_set_hash(),
                shape.verify_count,
                &NftPayload {
                    kind: TokenKind::Issued,
                    total_supply: mint_slot.total_supply,
                    token_index: next_index,
                    owner_pkh: receiver.public_key_hash,
                    genesis_id: genesis_bytes,
                },
            )?,
            change: false,
        });
        if let Some(data) = opreturn_data {
            tx.add_output(opreturn_output(data)?);
        }

        let fee = fee_for_size(
            estimate_size(OpKind::Issue, &shape, selection.utxos.len(), opreturn_len),
            self.feeb,
        );
        self.add_change(
            &mut tx,
            &selection.utxos,
            selection.total,
            token_in,
            2 * TOKEN_OUTPUT_SATOSHIS,
            fee,
        );

        let issuer_address = Address::from_public_key_hash(&issuer_pkh, self.network);
        let mut roles = vec![InputRole {
            address: issuer_address,
            is_p2pkh: false,
        }];
        roles.extend(selection.utxos.iter().map(|u| InputRole {
            address: u.address.clone(),
            is_p2pkh: true,
        }));

        Ok((
            TxPlan {
                tx,
                roles,
                token_suffix: Some(suffix),
                fee_utxos: selection.utxos,
            },
            next_index,
        ))
    }

    async fn plan_transfer(
        &self,
        identity: &TokenIdentity,
        sender_pkh: [u8; 20],
        receiver: &Address,
        token_index: u64,
        utxos: Option<Vec<FeeUtxo>>,
    ) -> Result<TxPlan, NftError> {
        self.check_identity(identity)?;

        let records = self
            .chain
            .list_token_utxos(&identity.codehash, &identity.genesis, "")
            .await?;
        let record = records
            .iter()
            .find(|r| !r.is_mint_slot && r.token_index == token_index)
            .ok_or_else(|| NftError::TokenNotFound {
                token_index,
                genesis: identity.genesis.clone(),
            })?;

        let sender_address = Address::from_public_key_hash(&sender_pkh, self.network);
        if record.address != sender_address.address_string {
            return Err(NftError::NotOwner {
                token_index,
                owner: record.address.clone(),
                sender: sender_address.address_string,
            });
        }

        let (attestation, spent_script) = self.attest_record(record).await?;
        let suffix = attestation_suffix(&attestation)?;

        let shape = self.quorum_shape();
        let candidates = self.fee_candidates(utxos).await?;
        let feeb = self.feeb;
        let token_in = record.satoshis;
        let selection = select_fee_utxos(&candidates, self.utxo_max_count, |n| {
            estimate_funding(OpKind::Transfer, &shape, n, None, feeb).saturating_sub(token_in)
        })?;

        let mut tx = Transaction::new();
        add_token_input(&mut tx, &record_outpoint(record)?, record.satoshis, spent_script);
        for utxo in &selection.utxos {
            add_fee_input(&mut tx, utxo);
        }

        tx.add_output(TransactionOutput {
            satoshis: TOKEN_OUTPUT_SATOSHIS,
            locking_script: build_locking_script(
                &self.oracle_set_hash(),
                shape.verify_count,
                &NftPayload {
                    kind: TokenKind::Issued,
                    total_supply: record.total_supply,
                    token_index,
                    owner_pkh: receiver.public_key_hash,
                    genesis_id: decode_genesis_hex(&identity.genesis)?,
                },
            )?,
            change: false,
        });

        let fee = fee_for_size(
            estimate_size(OpKind::Transfer, &shape, selection.utxos.len(), None),
            self.feeb,
        );
        self.add_change(
            &mut tx,
            &selection.utxos,
            selection.total,
            token_in,
            TOKEN_OUTPUT_SATOSHIS,
            fee,
        );

        let mut roles = vec![InputRole {
            address: sender_address,
            is_p2pkh: false,
        }];
        roles.extend(selection.utxos.iter().map(|u| InputRole {
            address: u.address.clone(),
            is_p2pkh: true,
        }));

        Ok(TxPlan {
            tx,
            roles,
            token_suffix: Some(suffix),
            fee_utxos: selection.utxos,
        })
    }

    // -----------------------------------------------------------------
    // Plan finishing
    // -----------------------------------------------------------------

    /// Append the change output when the remainder clears the dust limit.
    /// Sub-dust remainders are donated to the fee.
    fn add_change(
        &self,
        tx: &mut Transaction,
        fee_utxos: &[FeeUtxo],
        fee_total: u64,
        token_in: u64,
        protocol_out: u64,
        fee: u64,
    ) {
        let total_in = fee_total + token_in;
        let spent = protocol_out + fee;
        if total_in > spent {
            let remainder = total_in - spent;
            if remainder >= DUST_LIMIT {
                let payout = fee_utxos
                    .first()
                    .map(|u| u.address.clone())
                    .unwrap_or_else(|| self.purse_address.clone());
                tx.add_output(change_output(remainder, &payout));
            }
        }
    }

    /// Sign every input of a plan in-process.
    ///
    /// The token input (when present) signs with `token_key`; fee inputs
    /// sign with their own WIFs.
    fn sign_plan(&self, plan: &mut TxPlan, token_key: Option<&PrivateKey>) -> Result<(), NftError> {
        let token_offset = usize::from(plan.token_suffix.is_some());

        if let Some(suffix) = &plan.token_suffix {
            let key = token_key.ok_or_else(|| {
                NftError::InvalidConfig("token input requires a signing key".to_string())
            })?;
            let script = sign_input(&plan.tx, 0, key, Some(suffix))?;
            plan.tx.inputs[0].unlocking_script = Some(script);
        }

        for (i, utxo) in plan.fee_utxos.iter().enumerate() {
            let wif = utxo.wif.as_deref().ok_or_else(|| {
                NftError::InvalidConfig(format!(
                    "fee UTXO {} has no signing credential",
                    utxo.outpoint
                ))
            })?;
            let key = PrivateKey::from_wif(wif)
                .map_err(|e| NftError::InvalidConfig(format!("bad fee UTXO WIF: {e}")))?;
            let index = token_offset + i;
            let script = sign_input(&plan.tx, index, &key, None)?;
            plan.tx.inputs[index].unlocking_script = Some(script);
        }
        Ok(())
    }

    /// Convert a plan into the unsigned representation: attestation
    /// suffix stored on the token input, descriptors computed for every
    /// input.
    fn into_unsigned(&self, mut plan: TxPlan) -> Result<UnsignedOperation, NftError> {
        if let Some(suffix) = plan.token_suffix.take() {
            plan.tx.inputs[0].unlocking_script = Some(suffix);
        }
        let sig_hash_list = sighash_descriptors(&plan.tx, &plan.roles)?;
        Ok(UnsignedOperation {
            tx: plan.tx,
            sig_hash_list,
        })
    }

    // -----------------------------------------------------------------
    // Chain/oracle lookups
    // -----------------------------------------------------------------

    fn check_identity(&self, identity: &TokenIdentity) -> Result<(), NftError> {
        let expected = self.codehash_hex();
        if identity.codehash != expected {
            return Err(NftError::InvalidConfig(format!(
                "codehash {} does not match this engine's oracle configuration ({expected})",
                identity.codehash
            )));
        }
        Ok(())
    }

    async fn fetch_mint_slot(
        &self,
        identity: &TokenIdentity,
    ) -> Result<TokenUtxoRecord, NftError> {
        let records = self
            .chain
            .list_token_utxos(&identity.codehash, &identity.genesis, "")
            .await?;
        records
            .into_iter()
            .find(|r| r.is_mint_slot)
            .ok_or_else(|| NftError::SeriesNotFound {
                codehash: identity.codehash.clone(),
                genesis: identity.genesis.clone(),
            })
    }

    /// Fetch the prior transaction of a token record and obtain a fully
    /// verified quorum attestation for the spent output.
    async fn attest_record(
        &self,
        record: &TokenUtxoRecord,
    ) -> Result<(QuorumAttestation, Script), NftError> {
        let raw_hex = self.chain.get_raw_tx(&record.txid).await?;
        let raw = hex::decode(&raw_hex)
            .map_err(|e| NftError::NetworkUnavailable(format!("bad raw tx hex: {e}")))?;
        let prior_tx = Transaction::from_bytes(&raw)?;

        let output_ref = OutputRef::from_transaction(&prior_tx, record.output_index, 0)?;
        let request = AttestRequest {
            output: output_ref,
            prior_raw_tx: raw,
        };
        let attestation = self.quorum.attest_output(&request).await?;

        let spent_script = prior_tx.outputs[record.output_index as usize]
            .locking_script
            .clone();
        Ok((attestation, spent_script))
    }
}

fn record_outpoint(record: &TokenUtxoRecord) -> Result<Outpoint, NftError> {
    Ok(Outpoint {
        txid: Hash::from_hex(&record.txid)?,
        vout: record.output_index,
    })
}

fn decode_genesis_hex(genesis: &str) -> Result<[u8; 20], NftError> {
    let bytes = hex::decode(genesis)
        .map_err(|e| NftError::InvalidConfig(format!("bad genesis hex: {e}")))?;
    bytes
        .try_into()
        .map_err(|_| NftError::InvalidConfig("genesis id must be 20 bytes".to_string()))
}
