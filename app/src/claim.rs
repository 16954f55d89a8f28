//! Data model for fabricated claims, ledger transactions and provider stats.
//!
//! `Claim::status` and `Claim::consensus` are read-only from outside the
//! crate. They only move through the transitions in `consensus.rs`.

use serde_derive::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClaimStatus {
    /// Submitted, waiting for verification
    Pending,
    /// Consensus voting underway
    Verifying,
    Verified,
    /// Held for manual review
    Flagged,
    Rejected,
    Appealing,
}

impl ClaimStatus {
    /// Statuses whose consensus record can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Verified | ClaimStatus::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VerifierStatus {
    Pending,
    Approved,
    Rejected,
    Abstained,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verifier {
    pub address: String,
    pub name: String,
    pub status: VerifierStatus,
    /// Vote time in unix millis, `None` until the verifier votes
    pub timestamp: Option<i64>,
    pub reputation: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusProgress {
    /// Approved votes so far
    pub(crate) current: u32,
    /// Votes needed for either outcome
    pub(crate) required: u32,
    pub(crate) verifiers: Vec<Verifier>,
    /// Percentage, informational only
    pub(crate) threshold: u32,
    pub(crate) start_time: i64,
    pub(crate) end_time: Option<i64>,
}

impl ConsensusProgress {
    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn required(&self) -> u32 {
        self.required
    }

    pub fn verifiers(&self) -> &[Verifier] {
        &self.verifiers
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    pub fn end_time(&self) -> Option<i64> {
        self.end_time
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "USD")]
    Usd,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: String,
    pub claim_number: String,
    pub patient_id: String,
    pub provider_id: String,
    pub provider_name: String,
    #[serde(rename = "providerNPI")]
    pub provider_npi: String,

    /// ICD-10 codes
    pub diagnosis_codes: Vec<String>,
    /// CPT codes
    pub procedure_codes: Vec<String>,

    /// Whole US dollars
    pub amount: u64,
    pub currency: Currency,

    pub(crate) status: ClaimStatus,
    pub submitted_at: i64,
    pub(crate) updated_at: i64,
    pub(crate) verified_at: Option<i64>,

    pub tx_hash: String,
    pub(crate) block_number: Option<u64>,
    pub ipfs_cid: String,

    pub(crate) consensus: Option<ConsensusProgress>,

    pub description: String,
    pub rejection_reason: Option<String>,
    pub(crate) flag_reason: Option<String>,
    pub notes: Vec<String>,
}

impl Claim {
    pub fn status(&self) -> ClaimStatus {
        self.status
    }

    pub fn consensus(&self) -> Option<&ConsensusProgress> {
        self.consensus.as_ref()
    }

    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    pub fn verified_at(&self) -> Option<i64> {
        self.verified_at
    }

    pub fn block_number(&self) -> Option<u64> {
        self.block_number
    }

    pub fn flag_reason(&self) -> Option<&str> {
        self.flag_reason.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransactionStatus {
    Confirmed,
    Pending,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionType {
    ClaimSubmission,
    Verification,
    Stake,
    Unstake,
    Slash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    pub from: String,
    pub to: String,
    /// ETH
    pub value: String,
    pub timestamp: i64,
    pub block_number: u64,
    pub status: TransactionStatus,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_id: Option<String>,
    pub gas_used: String,
    /// ETH, 8 decimals
    pub gas_cost: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStats {
    pub address: String,
    pub name: String,
    pub npi: String,
    pub reputation: u32,
    pub total_claims: usize,
    pub verified_claims: usize,
    pub rejected_claims: usize,
    /// Pending and verifying claims
    pub pending_claims: usize,
    pub flagged_claims: usize,
    /// ETH
    pub total_staked: String,
    pub average_claim_amount: u64,
    /// Percentage of decided claims that were verified
    pub approval_rate: u32,
    /// Hours
    pub average_verification_time: f64,
    pub joined_date: String,
    pub last_activity_date: String,
}

/// Envelope mirroring the shape of a real API response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MockApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: i64,
    pub demo: bool,
}
