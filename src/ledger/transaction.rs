// src/ledger/transaction.rs
use std::fmt;

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::sha256;
use crate::error::LedgerError;

/// Value in the smallest indivisible unit.
///
/// Signed so that a negative declared output can be represented and rejected.
pub type Amount = i64;

/// Most inputs or outputs a transaction may hold. Positions and counts are
/// encoded as `u32`; the builders panic past this limit.
pub const MAX_ENTRIES: usize = u32::MAX as usize;

/// SHA-256 digest of a transaction's raw bytes. Serialized as a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_hex(s: &str) -> Result<Self, LedgerError> {
        let bytes = hex::decode(s).map_err(|_| LedgerError::InvalidHash(s.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| LedgerError::InvalidHash(s.to_string()))?;
        Ok(TxHash(arr))
    }
}

impl From<[u8; 32]> for TxHash {
    fn from(bytes: [u8; 32]) -> Self {
        TxHash(bytes)
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TxHash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Identifies one spendable output: the creating transaction and the output's position in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtxoId {
    pub tx_hash: TxHash,
    pub index: u32,
}

impl UtxoId {
    pub fn new(tx_hash: TxHash, index: u32) -> Self {
        UtxoId { tx_hash, index }
    }
}

impl fmt::Display for UtxoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_hash, self.index)
    }
}

/// An output: how much, and whose signature can spend it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub value: Amount,
    #[serde(with = "hex_key")]
    pub owner: VerifyingKey,
}

impl OutputRecord {
    pub fn new(value: Amount, owner: VerifyingKey) -> Self {
        OutputRecord { value, owner }
    }
}

/// A claim on a previous output together with the owner's authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub prev_tx_hash: TxHash,
    pub output_index: u32,
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
}

impl Input {
    pub fn utxo_id(&self) -> UtxoId {
        UtxoId::new(self.prev_tx_hash, self.output_index)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    inputs: Vec<Input>,
    outputs: Vec<OutputRecord>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an unsigned input claiming `(prev_tx_hash, output_index)`.
    pub fn add_input(&mut self, prev_tx_hash: TxHash, output_index: u32) {
        assert!(self.inputs.len() < MAX_ENTRIES, "transaction input limit reached");
        self.inputs.push(Input {
            prev_tx_hash,
            output_index,
            signature: Vec::new(),
        });
    }

    pub fn add_output(&mut self, value: Amount, owner: VerifyingKey) {
        assert!(self.outputs.len() < MAX_ENTRIES, "transaction output limit reached");
        self.outputs.push(OutputRecord::new(value, owner));
    }

    /// Attach a signature to the input at `index`. Returns false if there is no such input
    /// or the signature is too long to encode.
    pub fn set_signature(&mut self, index: usize, signature: Vec<u8>) -> bool {
        if u32::try_from(signature.len()).is_err() {
            return false;
        }
        match self.inputs.get_mut(index) {
            Some(input) => {
                input.signature = signature;
                true
            }
            None => false,
        }
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputRecord] {
        &self.outputs
    }

    pub fn claimed_utxos(&self) -> impl Iterator<Item = UtxoId> + '_ {
        self.inputs.iter().map(Input::utxo_id)
    }

    /// Ids this transaction creates when accepted under `tx_hash`.
    pub fn output_utxos(&self, tx_hash: TxHash) -> impl Iterator<Item = (UtxoId, &OutputRecord)> {
        self.outputs
            .iter()
            .enumerate()
            .map(move |(i, out)| (UtxoId::new(tx_hash, wire_u32(i)), out))
    }

    /// Canonical bytes signed by the owner of the output claimed at `index`.
    ///
    /// Binds the input position, every input's claim and every output. Signatures are
    /// never part of the payload, so attaching one does not change what the others sign.
    pub fn signable_payload(&self, index: usize) -> Option<Vec<u8>> {
        if index >= self.inputs.len() {
            return None;
        }
        let mut buf = Vec::with_capacity(12 + self.inputs.len() * 36 + self.outputs.len() * 40);
        buf.extend_from_slice(&wire_u32(index).to_be_bytes());
        buf.extend_from_slice(&wire_u32(self.inputs.len()).to_be_bytes());
        for input in &self.inputs {
            write_claim(&mut buf, input);
        }
        write_outputs(&mut buf, &self.outputs);
        Some(buf)
    }

    /// Full canonical serialization, signatures included.
    pub fn raw_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&wire_u32(self.inputs.len()).to_be_bytes());
        for input in &self.inputs {
            write_claim(&mut buf, input);
            buf.extend_from_slice(&wire_u32(input.signature.len()).to_be_bytes());
            buf.extend_from_slice(&input.signature);
        }
        write_outputs(&mut buf, &self.outputs);
        buf
    }

    /// Content hash, recomputed from the current contents on every call.
    pub fn hash(&self) -> TxHash {
        TxHash(sha256(&self.raw_bytes()))
    }
}

// Builders keep every count, position and signature length within u32.
fn wire_u32(n: usize) -> u32 {
    match u32::try_from(n) {
        Ok(n) => n,
        Err(_) => panic!("{} exceeds the u32 wire encoding", n),
    }
}

fn write_claim(buf: &mut Vec<u8>, input: &Input) {
    buf.extend_from_slice(input.prev_tx_hash.as_bytes());
    buf.extend_from_slice(&input.output_index.to_be_bytes());
}

fn write_outputs(buf: &mut Vec<u8>, outputs: &[OutputRecord]) {
    buf.extend_from_slice(&wire_u32(outputs.len()).to_be_bytes());
    for out in outputs {
        buf.extend_from_slice(&out.value.to_be_bytes());
        buf.extend_from_slice(out.owner.as_bytes());
    }
}

// Public keys travel as hex, like the rest of the wire format.
mod hex_key {
    use ed25519_dalek::VerifyingKey;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(key: &VerifyingKey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(key.as_bytes()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<VerifyingKey, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes: [u8; 32] = hex::decode(&s)
            .map_err(D::Error::custom)?
            .try_into()
            .map_err(|_| D::Error::custom("public key must be 32 bytes"))?;
        VerifyingKey::from_bytes(&bytes).map_err(D::Error::custom)
    }
}
