//! Vote tally and the only transitions that may change a claim's status.

use crate::claim::{Claim, ClaimStatus, ConsensusProgress, Verifier, VerifierStatus};
use crate::error::Error;
use crate::mock_data::claim_notes;
use tracing::debug;

/// Votes needed to decide a round, either way.
pub const REQUIRED_VOTES: u32 = 3;

/// Advertised approval threshold, in percent.
pub const CONSENSUS_THRESHOLD: u32 = 66;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsensusOutcome {
    Undecided,
    Approved,
    Rejected,
}

impl ConsensusProgress {
    /// Fresh round with every verifier still to vote.
    pub fn new(verifiers: Vec<Verifier>, start_time: i64) -> Self {
        let verifiers = verifiers
            .into_iter()
            .map(|verifier| Verifier {
                status: VerifierStatus::Pending,
                timestamp: None,
                ..verifier
            })
            .collect();
        Self {
            current: 0,
            required: REQUIRED_VOTES,
            verifiers,
            threshold: CONSENSUS_THRESHOLD,
            start_time,
            end_time: None,
        }
    }

    fn count(&self, status: VerifierStatus) -> u32 {
        self.verifiers
            .iter()
            .filter(|verifier| verifier.status == status)
            .count() as u32
    }

    pub fn approvals(&self) -> u32 {
        self.count(VerifierStatus::Approved)
    }

    pub fn rejections(&self) -> u32 {
        self.count(VerifierStatus::Rejected)
    }

    /// Approved plus rejected votes.
    pub fn votes_cast(&self) -> u32 {
        self.approvals() + self.rejections()
    }

    /// Indices of verifiers that have not voted yet.
    pub fn pending_verifiers(&self) -> Vec<usize> {
        self.verifiers
            .iter()
            .enumerate()
            .filter(|(_, verifier)| verifier.status == VerifierStatus::Pending)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn outcome(&self) -> ConsensusOutcome {
        if self.approvals() >= self.required {
            ConsensusOutcome::Approved
        } else if self.rejections() >= self.required {
            ConsensusOutcome::Rejected
        } else {
            ConsensusOutcome::Undecided
        }
    }

    pub fn is_settled(&self) -> bool {
        self.outcome() != ConsensusOutcome::Undecided
    }

    /// Records `vote` for the verifier at `index`.
    ///
    /// Returns `None` without touching the tally when the round is already
    /// decided, the verifier has voted, or `vote` is `Pending`. A deciding
    /// vote stamps `end_time`.
    pub fn cast_vote(
        &mut self,
        index: usize,
        vote: VerifierStatus,
        at: i64,
    ) -> Option<ConsensusOutcome> {
        if self.is_settled() || vote == VerifierStatus::Pending {
            return None;
        }
        let verifier = self.verifiers.get_mut(index)?;
        if verifier.status != VerifierStatus::Pending {
            return None;
        }
        verifier.status = vote;
        verifier.timestamp = Some(at);

        self.current = self.approvals();
        let outcome = self.outcome();
        if outcome != ConsensusOutcome::Undecided {
            self.end_time = Some(at);
        }
        Some(outcome)
    }
}

impl Claim {
    fn invalid(&self, action: &'static str) -> Error {
        Error::InvalidTransition {
            from: self.status,
            action,
        }
    }

    fn enter(&mut self, status: ClaimStatus, at: i64) {
        debug!(claim = %self.id, from = %self.status, to = %status, "Claim transition");
        self.status = status;
        self.updated_at = at;
        self.notes = claim_notes(status);
    }

    /// `pending -> verifying`, attaching an undecided consensus round.
    pub fn begin_verification(
        &mut self,
        consensus: ConsensusProgress,
        at: i64,
    ) -> Result<(), Error> {
        if self.status != ClaimStatus::Pending || consensus.is_settled() {
            return Err(self.invalid("begin_verification"));
        }
        self.consensus = Some(consensus);
        self.enter(ClaimStatus::Verifying, at);
        Ok(())
    }

    /// Casts one vote on a verifying claim and settles it when the vote
    /// decides the round.
    pub fn record_vote(
        &mut self,
        index: usize,
        vote: VerifierStatus,
        at: i64,
    ) -> Result<ConsensusOutcome, Error> {
        if self.status != ClaimStatus::Verifying {
            return Err(self.invalid("vote"));
        }
        let outcome = self
            .consensus
            .as_mut()
            .and_then(|consensus| consensus.cast_vote(index, vote, at))
            .ok_or_else(|| self.invalid("vote"))?;

        self.updated_at = at;
        if outcome != ConsensusOutcome::Undecided {
            self.settle(at)?;
        }
        Ok(outcome)
    }

    /// `verifying -> verified | rejected`, allowed only once the tally has
    /// reached `required` votes one way.
    pub fn settle(&mut self, at: i64) -> Result<ClaimStatus, Error> {
        if self.status != ClaimStatus::Verifying {
            return Err(self.invalid("settle"));
        }
        let outcome = self
            .consensus
            .as_ref()
            .map_or(ConsensusOutcome::Undecided, ConsensusProgress::outcome);
        let status = match outcome {
            ConsensusOutcome::Approved => ClaimStatus::Verified,
            ConsensusOutcome::Rejected => ClaimStatus::Rejected,
            ConsensusOutcome::Undecided => return Err(self.invalid("settle")),
        };

        if let Some(consensus) = self.consensus.as_mut() {
            consensus.end_time.get_or_insert(at);
        }
        self.verified_at = (status == ClaimStatus::Verified).then_some(at);
        self.enter(status, at);
        Ok(status)
    }

    /// `verifying -> flagged` for manual review. The round stays open but
    /// no further votes are accepted.
    pub fn flag(&mut self, reason: impl Into<String>, at: i64) -> Result<(), Error> {
        let undecided = self
            .consensus
            .as_ref()
            .is_some_and(|consensus| !consensus.is_settled());
        if self.status != ClaimStatus::Verifying || !undecided {
            return Err(self.invalid("flag"));
        }
        self.flag_reason = Some(reason.into());
        self.enter(ClaimStatus::Flagged, at);
        Ok(())
    }

    /// `rejected | flagged -> appealing`.
    pub fn appeal(&mut self, at: i64) -> Result<(), Error> {
        if !matches!(self.status, ClaimStatus::Rejected | ClaimStatus::Flagged) {
            return Err(self.invalid("appeal"));
        }
        self.enter(ClaimStatus::Appealing, at);
        Ok(())
    }
}
