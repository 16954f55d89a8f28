//! Fabricated claims, transactions and provider statistics.
//!
//! Every draw goes through the generator's RNG, so a seeded generator with a
//! fixed clock reproduces the same dataset.

mod codes;

pub use codes::{
    claim_notes, DiagnosisCode, ProcedureCode, VerifierIdentity, CONTRACT_ADDRESS, CPT_CODES,
    FLAG_REASONS, ICD10_CODES, REJECTION_REASONS, VERIFIER_POOL,
};

use crate::claim::{
    Claim, ClaimStatus, ConsensusProgress, Currency, MockApiResponse, ProviderStats, Transaction,
    TransactionStatus, TransactionType, Verifier, VerifierStatus,
};
use crate::consensus::{ConsensusOutcome, CONSENSUS_THRESHOLD, REQUIRED_VOTES};
use crate::demo::DEMO_PROVIDER;
use crate::metrics::{CONSENSUS_SETTLED_TOTAL, CONSENSUS_VOTES_TOTAL};
use chrono::{DateTime, Datelike};
use mock_wallet::{generate_demo_tx_hash, random_base36, random_demo_wallet, unix_millis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

const MINUTE_MS: i64 = 60 * 1000;
const DAY_MS: i64 = 24 * 60 * MINUTE_MS;

/// Verifiers drawn into every consensus round.
pub const VERIFIERS_PER_ROUND: usize = 5;

/// Voting opens this long after submission.
const VOTING_OFFSET_MS: i64 = 5 * MINUTE_MS;
/// Spacing between fabricated historical votes.
const VOTE_SPACING_MS: i64 = 3 * MINUTE_MS;

/// Hours, reported for every provider.
pub const AVERAGE_VERIFICATION_HOURS: f64 = 4.5;

/// Share of simulated votes that approve.
pub const APPROVAL_PROBABILITY: f64 = 0.8;

pub struct MockDataGenerator<R = StdRng> {
    rng: R,
    /// Fixed "now" in unix millis; wall clock when unset
    clock: Option<i64>,
}

impl MockDataGenerator<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> MockDataGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, clock: None }
    }

    pub fn with_clock(mut self, now_ms: i64) -> Self {
        self.clock = Some(now_ms);
        self
    }

    pub fn now(&self) -> i64 {
        self.clock.unwrap_or_else(unix_millis)
    }

    pub(crate) fn rng(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Independent generator seeded from this one, sharing its clock.
    pub fn fork(&mut self) -> MockDataGenerator<StdRng> {
        MockDataGenerator {
            rng: StdRng::seed_from_u64(self.rng.gen()),
            clock: self.clock,
        }
    }

    /// Uniform timestamp in `[now - days_ago, now)`.
    fn random_date(&mut self, days_ago: u32) -> i64 {
        let now = self.now();
        let span = i64::from(days_ago) * DAY_MS;
        if span == 0 {
            return now;
        }
        now - span + self.rng.gen_range(0..span)
    }

    fn ipfs_cid(&mut self) -> String {
        format!("Qm{}", random_base36(&mut self.rng, 44))
    }

    fn patient_id(&mut self) -> String {
        format!("PT{:06}", self.rng.gen_range(0..1_000_000))
    }

    fn tx_hash(&mut self) -> String {
        let now = self.now();
        generate_demo_tx_hash(&mut self.rng, now)
    }

    /// Consensus record shaped to match `status`, or `None` for pending
    /// claims. Verifier order is shuffled; earlier seats vote first.
    pub fn generate_consensus_progress(
        &mut self,
        status: ClaimStatus,
        submitted_at: i64,
    ) -> Option<ConsensusProgress> {
        use VerifierStatus::{Approved, Rejected};

        let votes: Vec<VerifierStatus> = match status {
            ClaimStatus::Pending => return None,
            ClaimStatus::Verifying => {
                let approvals = self.rng.gen_range(1..REQUIRED_VOTES) as usize;
                vec![Approved; approvals]
            }
            ClaimStatus::Verified => vec![Approved; REQUIRED_VOTES as usize],
            ClaimStatus::Rejected | ClaimStatus::Appealing => {
                vec![Rejected; REQUIRED_VOTES as usize]
            }
            ClaimStatus::Flagged => vec![Approved, Rejected],
        };

        let mut pool = VERIFIER_POOL.clone();
        pool.shuffle(&mut self.rng);

        let start_time = submitted_at + VOTING_OFFSET_MS;
        let verifiers: Vec<Verifier> = pool
            .into_iter()
            .take(VERIFIERS_PER_ROUND)
            .enumerate()
            .map(|(seat, identity)| {
                let vote = votes.get(seat).copied();
                Verifier {
                    address: identity.address,
                    name: identity.name.to_string(),
                    status: vote.unwrap_or(VerifierStatus::Pending),
                    timestamp: vote.map(|_| start_time + seat as i64 * VOTE_SPACING_MS),
                    reputation: identity.reputation,
                }
            })
            .collect();

        let mut consensus = ConsensusProgress {
            current: 0,
            required: REQUIRED_VOTES,
            verifiers,
            threshold: CONSENSUS_THRESHOLD,
            start_time,
            end_time: None,
        };
        consensus.current = consensus.approvals();
        if consensus.is_settled() {
            consensus.end_time = Some(start_time + i64::from(REQUIRED_VOTES) * VOTE_SPACING_MS);
        }
        Some(consensus)
    }

    pub fn generate_claim(&mut self, index: usize, status: ClaimStatus, days_ago: u32) -> Claim {
        let diagnosis = ICD10_CODES[self.rng.gen_range(0..ICD10_CODES.len())];
        let procedure = CPT_CODES[self.rng.gen_range(0..CPT_CODES.len())];

        let submitted_at = self.random_date(days_ago);
        let updated_at = match status {
            ClaimStatus::Pending => submitted_at,
            _ => submitted_at + (self.rng.gen::<f64>() * 2.0 * DAY_MS as f64) as i64,
        };

        let year = DateTime::from_timestamp_millis(submitted_at).map_or(1970, |date| date.year());
        let claim_number = format!("CLM-{year}-{:06}", 1000 + index);
        let id = format!("claim_{}_{index}", self.now());

        let jitter = 0.8 + self.rng.gen::<f64>() * 0.4;
        let amount = (procedure.amount as f64 * jitter).floor() as u64;

        let patient_id = self.patient_id();
        let tx_hash = self.tx_hash();
        let block_number = (status == ClaimStatus::Verified)
            .then(|| 5_000_000 + self.rng.gen_range(0..100_000));
        let ipfs_cid = self.ipfs_cid();
        let consensus = self.generate_consensus_progress(status, submitted_at);
        let rejection_reason = (status == ClaimStatus::Rejected)
            .then(|| REJECTION_REASONS[self.rng.gen_range(0..REJECTION_REASONS.len())].to_string());
        let flag_reason = (status == ClaimStatus::Flagged)
            .then(|| FLAG_REASONS[self.rng.gen_range(0..FLAG_REASONS.len())].to_string());

        Claim {
            id,
            claim_number,
            patient_id,
            provider_id: DEMO_PROVIDER.address.to_string(),
            provider_name: DEMO_PROVIDER.name.to_string(),
            provider_npi: DEMO_PROVIDER.npi.to_string(),
            diagnosis_codes: vec![diagnosis.code.to_string()],
            procedure_codes: vec![procedure.code.to_string()],
            amount,
            currency: Currency::Usd,
            status,
            submitted_at,
            updated_at,
            verified_at: (status == ClaimStatus::Verified).then_some(updated_at),
            tx_hash,
            block_number,
            ipfs_cid,
            consensus,
            description: format!("{} for {}", procedure.description, diagnosis.description),
            rejection_reason,
            flag_reason,
            notes: claim_notes(status),
        }
    }

    /// The fixed 14-claim dataset, newest first.
    pub fn generate_mock_claims(&mut self) -> Vec<Claim> {
        let plan = std::iter::repeat((ClaimStatus::Verified, 30))
            .take(8)
            .chain(std::iter::repeat((ClaimStatus::Pending, 2)).take(3))
            .chain(std::iter::once((ClaimStatus::Verifying, 1)))
            .chain(std::iter::once((ClaimStatus::Rejected, 15)))
            .chain(std::iter::once((ClaimStatus::Flagged, 5)));

        let mut claims: Vec<Claim> = plan
            .enumerate()
            .map(|(index, (status, days_ago))| self.generate_claim(index, status, days_ago))
            .collect();
        claims.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        debug!(count = claims.len(), "Generated mock claims");
        claims
    }

    pub fn generate_transaction(
        &mut self,
        kind: TransactionType,
        days_ago: u32,
        claim_id: Option<&str>,
    ) -> Transaction {
        let timestamp = self.random_date(days_ago);
        let block_number = 5_000_000 + self.rng.gen_range(0..100_000);
        let gas_used: u64 = self.rng.gen_range(50_000..200_000);
        let gas_cost = format!("{:.8}", gas_used as f64 * 0.000_000_02);

        let from = match kind {
            TransactionType::Stake | TransactionType::Unstake => DEMO_PROVIDER.address.to_string(),
            TransactionType::ClaimSubmission | TransactionType::Verification => {
                random_demo_wallet(&mut self.rng).to_string()
            }
            TransactionType::Slash => CONTRACT_ADDRESS.clone(),
        };
        let value = match kind {
            TransactionType::Stake | TransactionType::Unstake => "1.0",
            _ => "0.0",
        };

        Transaction {
            hash: self.tx_hash(),
            from,
            to: CONTRACT_ADDRESS.clone(),
            value: value.to_string(),
            timestamp,
            block_number,
            status: TransactionStatus::Confirmed,
            kind,
            claim_id: claim_id.map(str::to_string),
            gas_used: gas_used.to_string(),
            gas_cost,
        }
    }

    /// One submission per claim, one verification per decided claim, plus
    /// the provider's stake history. Newest first.
    pub fn generate_mock_transactions(&mut self, claims: &[Claim]) -> Vec<Transaction> {
        let mut transactions = Vec::with_capacity(claims.len() * 2 + 3);
        for claim in claims {
            transactions.push(self.generate_transaction(
                TransactionType::ClaimSubmission,
                30,
                Some(&claim.id),
            ));
            if matches!(claim.status, ClaimStatus::Verified | ClaimStatus::Rejected) {
                transactions.push(self.generate_transaction(
                    TransactionType::Verification,
                    25,
                    Some(&claim.id),
                ));
            }
        }

        transactions.push(self.generate_transaction(TransactionType::Stake, 60, None));
        transactions.push(self.generate_transaction(TransactionType::Stake, 45, None));
        transactions.push(self.generate_transaction(TransactionType::Unstake, 20, None));

        transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        transactions
    }

    /// Stats over a freshly generated dataset. Use [`provider_stats_for`] to
    /// aggregate a dataset already on screen.
    pub fn generate_mock_provider_stats(&mut self) -> ProviderStats {
        let claims = self.generate_mock_claims();
        provider_stats_for(&claims, self.now())
    }

    pub fn get_mock_claim_by_id(&mut self, id: &str) -> Option<Claim> {
        self.generate_mock_claims()
            .into_iter()
            .find(|claim| claim.id == id)
    }

    pub fn get_mock_claims_by_status(&mut self, status: ClaimStatus) -> Vec<Claim> {
        let mut claims = self.generate_mock_claims();
        claims.retain(|claim| claim.status == status);
        claims
    }

    pub fn get_recent_mock_claims(&mut self, limit: usize) -> Vec<Claim> {
        let mut claims = self.generate_mock_claims();
        claims.truncate(limit);
        claims
    }

    pub fn get_verifying_claims(&mut self) -> Vec<Claim> {
        self.get_mock_claims_by_status(ClaimStatus::Verifying)
    }

    /// Advances a verifying claim by exactly one vote and returns the new
    /// claim. Anything else, including a claim with no one left to vote,
    /// comes back unchanged.
    pub fn update_consensus_progress(&mut self, claim: &Claim) -> Claim {
        if claim.status != ClaimStatus::Verifying {
            return claim.clone();
        }
        let pending = match claim.consensus() {
            Some(consensus) => consensus.pending_verifiers(),
            None => return claim.clone(),
        };
        let Some(&seat) = pending.choose(&mut self.rng) else {
            return claim.clone();
        };

        let vote = if self.rng.gen_bool(APPROVAL_PROBABILITY) {
            VerifierStatus::Approved
        } else {
            VerifierStatus::Rejected
        };

        let mut updated = claim.clone();
        match updated.record_vote(seat, vote, self.now()) {
            Ok(outcome) => {
                CONSENSUS_VOTES_TOTAL
                    .with_label_values(&[vote.to_string().as_str()])
                    .inc();
                if outcome != ConsensusOutcome::Undecided {
                    CONSENSUS_SETTLED_TOTAL
                        .with_label_values(&[updated.status.to_string().as_str()])
                        .inc();
                }
                debug!(claim = %updated.id, seat, %vote, status = %updated.status, "Consensus vote");
                updated
            }
            Err(err) => {
                warn!(claim = %claim.id, "Consensus vote rejected: {err}");
                claim.clone()
            }
        }
    }
}

/// Aggregates `claims` under the demo provider's profile. Pending and
/// verifying claims both count as pending.
pub fn provider_stats_for(claims: &[Claim], now_ms: i64) -> ProviderStats {
    let count = |predicate: fn(ClaimStatus) -> bool| {
        claims.iter().filter(|claim| predicate(claim.status)).count()
    };
    let verified = count(|status| status == ClaimStatus::Verified);
    let rejected = count(|status| status == ClaimStatus::Rejected);
    let pending = count(|status| matches!(status, ClaimStatus::Pending | ClaimStatus::Verifying));
    let flagged = count(|status| status == ClaimStatus::Flagged);

    let total_amount: u64 = claims.iter().map(|claim| claim.amount).sum();
    let average_claim_amount = match claims.len() {
        0 => 0,
        len => total_amount / len as u64,
    };
    let approval_rate = match verified + rejected {
        0 => 0,
        decided => (verified * 100 / decided) as u32,
    };
    let last_activity_date = DateTime::from_timestamp_millis(now_ms)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    ProviderStats {
        address: DEMO_PROVIDER.address.to_string(),
        name: DEMO_PROVIDER.name.to_string(),
        npi: DEMO_PROVIDER.npi.to_string(),
        reputation: DEMO_PROVIDER.reputation,
        total_claims: claims.len(),
        verified_claims: verified,
        rejected_claims: rejected,
        pending_claims: pending,
        flagged_claims: flagged,
        total_staked: DEMO_PROVIDER.total_staked.to_string(),
        average_claim_amount,
        approval_rate,
        average_verification_time: AVERAGE_VERIFICATION_HOURS,
        joined_date: DEMO_PROVIDER.joined_date.to_string(),
        last_activity_date,
    }
}

pub fn create_mock_response<T>(data: T, demo: bool, now_ms: i64) -> MockApiResponse<T> {
    MockApiResponse {
        success: true,
        data,
        timestamp: now_ms,
        demo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    const NOW: i64 = 1_760_000_000_000;

    fn generator(seed: u64) -> MockDataGenerator {
        MockDataGenerator::seeded(seed).with_clock(NOW)
    }

    fn base_price(claim: &Claim) -> u64 {
        CPT_CODES
            .iter()
            .find(|entry| entry.code == claim.procedure_codes[0])
            .map(|entry| entry.amount)
            .unwrap()
    }

    fn count(claims: &[Claim], status: ClaimStatus) -> usize {
        claims.iter().filter(|claim| claim.status() == status).count()
    }

    #[test]
    fn test_amount_within_twenty_percent_of_base_price() {
        for seed in 0..20 {
            for claim in generator(seed).generate_mock_claims() {
                let base = base_price(&claim) as f64;
                let amount = claim.amount as f64;
                assert!(amount >= (base * 0.8).floor(), "{amount} below {base}");
                assert!(amount <= base * 1.2, "{amount} above {base}");
            }
        }
    }

    #[test]
    fn test_mock_claims_partition_and_order() {
        let claims = generator(1).generate_mock_claims();
        assert_eq!(claims.len(), 14);
        assert_eq!(count(&claims, ClaimStatus::Verified), 8);
        assert_eq!(count(&claims, ClaimStatus::Pending), 3);
        assert_eq!(count(&claims, ClaimStatus::Verifying), 1);
        assert_eq!(count(&claims, ClaimStatus::Rejected), 1);
        assert_eq!(count(&claims, ClaimStatus::Flagged), 1);
        assert!(claims
            .windows(2)
            .all(|pair| pair[0].submitted_at >= pair[1].submitted_at));
    }

    #[test]
    fn test_verified_and_rejected_consensus_shapes() {
        for seed in 0..10 {
            for claim in generator(seed).generate_mock_claims() {
                let consensus = claim.consensus();
                match claim.status() {
                    ClaimStatus::Verified => {
                        let consensus = consensus.unwrap();
                        assert_eq!(consensus.current(), consensus.required());
                        assert_eq!(consensus.approvals(), consensus.required());
                        assert!(consensus.end_time().is_some());
                        assert_eq!(claim.verified_at(), Some(claim.updated_at()));
                        assert!((5_000_000..5_100_000).contains(&claim.block_number().unwrap()));
                    }
                    ClaimStatus::Rejected => {
                        let consensus = consensus.unwrap();
                        assert_eq!(consensus.rejections(), consensus.required());
                        assert!(claim.rejection_reason.is_some());
                    }
                    ClaimStatus::Verifying => {
                        let consensus = consensus.unwrap();
                        assert!((1..consensus.required()).contains(&consensus.current()));
                        assert_eq!(consensus.end_time(), None);
                    }
                    ClaimStatus::Flagged => {
                        let consensus = consensus.unwrap();
                        assert_eq!((consensus.approvals(), consensus.rejections()), (1, 1));
                        assert!(claim.flag_reason().is_some());
                    }
                    ClaimStatus::Pending => {
                        assert!(consensus.is_none());
                        assert_eq!(claim.updated_at(), claim.submitted_at);
                    }
                    ClaimStatus::Appealing => unreachable!(),
                }
            }
        }
    }

    #[test]
    fn test_claim_identifiers() {
        let mut generator = generator(3);
        let claim = generator.generate_claim(0, ClaimStatus::Pending, 2);
        assert_eq!(claim.claim_number, "CLM-2025-001000");
        assert_eq!(claim.id, format!("claim_{NOW}_0"));
        assert!(claim.patient_id.starts_with("PT") && claim.patient_id.len() == 8);
        assert!(claim.ipfs_cid.starts_with("Qm") && claim.ipfs_cid.len() == 46);
        assert!(claim.tx_hash.starts_with("0xDemo"));
        assert_eq!(claim.currency, Currency::Usd);
        assert!(claim.description.contains(" for "));
    }

    #[test]
    fn test_consensus_verifiers_are_whole_pool() {
        let consensus = generator(5)
            .generate_consensus_progress(ClaimStatus::Verified, NOW)
            .unwrap();
        let mut names: Vec<_> = consensus.verifiers().iter().map(|v| v.name.clone()).collect();
        names.sort();
        let mut pool: Vec<_> = VERIFIER_POOL.iter().map(|v| v.name.to_string()).collect();
        pool.sort();
        assert_eq!(names, pool);
        assert_eq!(consensus.start_time(), NOW + 5 * MINUTE_MS);
        assert_eq!(consensus.verifiers()[2].timestamp, Some(NOW + 11 * MINUTE_MS));
        assert_eq!(consensus.verifiers()[3].timestamp, None);
    }

    #[test]
    fn test_update_is_identity_on_non_verifying_claims() {
        let mut generator = generator(9);
        for claim in generator.generate_mock_claims() {
            if claim.status() != ClaimStatus::Verifying {
                assert_eq!(generator.update_consensus_progress(&claim), claim);
            }
        }
    }

    #[test]
    fn test_update_adds_at_most_one_vote() {
        for seed in 0..25 {
            let mut generator = generator(seed);
            let mut claim = generator.generate_claim(0, ClaimStatus::Verifying, 1);
            for _ in 0..10 {
                let before = claim.consensus().unwrap().votes_cast();
                let next = generator.update_consensus_progress(&claim);
                let after = next.consensus().unwrap().votes_cast();
                assert!(after >= before);
                assert!(after - before <= 1);
                if claim.status() == ClaimStatus::Verifying {
                    assert_eq!(after, before + 1);
                }
                claim = next;
            }
            assert!(claim.status().is_terminal());
        }
    }

    #[test]
    fn test_update_does_not_mutate_input() {
        let mut generator = generator(11);
        let claim = generator.generate_claim(0, ClaimStatus::Verifying, 1);
        let snapshot = claim.clone();
        let _ = generator.update_consensus_progress(&claim);
        assert_eq!(claim, snapshot);
    }

    #[test]
    fn test_required_approvals_verify_fresh_claim() {
        let mut seeded = generator(2);
        let mut claim = seeded.generate_claim(0, ClaimStatus::Pending, 1);
        let round = seeded
            .generate_consensus_progress(ClaimStatus::Verifying, claim.submitted_at)
            .unwrap();
        claim
            .begin_verification(ConsensusProgress::new(round.verifiers, NOW), NOW)
            .unwrap();

        // an all-zero stream always takes the approval branch
        let mut approving = MockDataGenerator::new(StepRng::new(0, 0)).with_clock(NOW + 1);
        for step in 1..=REQUIRED_VOTES {
            claim = approving.update_consensus_progress(&claim);
            assert_eq!(claim.consensus().unwrap().current(), step);
        }

        assert_eq!(claim.status(), ClaimStatus::Verified);
        assert_eq!(claim.consensus().unwrap().end_time(), Some(NOW + 1));
        assert_eq!(claim.verified_at(), Some(NOW + 1));
    }

    #[test]
    fn test_mock_transactions() {
        let mut generator = generator(4);
        let claims = generator.generate_mock_claims();
        let transactions = generator.generate_mock_transactions(&claims);

        // 14 submissions, 9 verifications, 3 stake movements
        assert_eq!(transactions.len(), 26);
        assert!(transactions
            .windows(2)
            .all(|pair| pair[0].timestamp >= pair[1].timestamp));

        for tx in &transactions {
            assert_eq!(tx.to, *CONTRACT_ADDRESS);
            assert_eq!(tx.status, TransactionStatus::Confirmed);
            let gas: u64 = tx.gas_used.parse().unwrap();
            assert!((50_000..200_000).contains(&gas));
            assert_eq!(tx.gas_cost, format!("{:.8}", gas as f64 * 0.00000002));
            match tx.kind {
                TransactionType::Stake | TransactionType::Unstake => {
                    assert_eq!(tx.from, DEMO_PROVIDER.address);
                    assert_eq!(tx.value, "1.0");
                    assert!(tx.claim_id.is_none());
                }
                _ => {
                    assert_eq!(tx.value, "0.0");
                    assert!(tx.claim_id.is_some());
                }
            }
        }

        let slash = generator.generate_transaction(TransactionType::Slash, 1, None);
        assert_eq!(slash.from, *CONTRACT_ADDRESS);
    }

    #[test]
    fn test_provider_stats() {
        let claims = generator(6).generate_mock_claims();
        let stats = provider_stats_for(&claims, NOW);
        assert_eq!(stats.total_claims, 14);
        assert_eq!(stats.verified_claims, 8);
        assert_eq!(stats.rejected_claims, 1);
        assert_eq!(stats.pending_claims, 4);
        assert_eq!(stats.flagged_claims, 1);
        assert_eq!(stats.approval_rate, 88);
        assert_eq!(stats.last_activity_date, "2025-10-09");
        assert_eq!(stats.joined_date, "2024-03-15");

        let empty = provider_stats_for(&[], NOW);
        assert_eq!((empty.average_claim_amount, empty.approval_rate), (0, 0));
    }

    #[test]
    fn test_lookups_with_fixed_clock() {
        let claims = generator(8).generate_mock_claims();
        let target = &claims[3];
        assert_eq!(generator(8).get_mock_claim_by_id(&target.id).as_ref(), Some(target));
        assert_eq!(generator(8).get_mock_claim_by_id("claim_0_99"), None);
        assert_eq!(generator(8).get_recent_mock_claims(5).len(), 5);
        assert_eq!(generator(8).get_verifying_claims().len(), 1);
        assert_eq!(generator(8).get_mock_claims_by_status(ClaimStatus::Verified).len(), 8);
    }

    #[test]
    fn test_mock_response_envelope() {
        let response = create_mock_response(vec![1, 2], true, NOW);
        assert!(response.success && response.demo);
        assert_eq!(response.timestamp, NOW);
        assert_eq!(response.data, vec![1, 2]);
    }
}
