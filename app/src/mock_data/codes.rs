//! Static tables the generator samples from.

use crate::claim::ClaimStatus;
use mock_wallet::generate_demo_wallet;
use once_cell::sync::Lazy;
use serde_derive::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiagnosisCode {
    pub code: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcedureCode {
    pub code: &'static str,
    pub description: &'static str,
    /// Base price in USD
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifierIdentity {
    pub name: &'static str,
    pub reputation: u32,
    pub address: String,
}

const fn icd(code: &'static str, description: &'static str) -> DiagnosisCode {
    DiagnosisCode { code, description }
}

const fn cpt(code: &'static str, description: &'static str, amount: u64) -> ProcedureCode {
    ProcedureCode {
        code,
        description,
        amount,
    }
}

pub const ICD10_CODES: [DiagnosisCode; 15] = [
    icd("E11.9", "Type 2 diabetes mellitus without complications"),
    icd("I10", "Essential (primary) hypertension"),
    icd(
        "J44.0",
        "Chronic obstructive pulmonary disease with acute lower respiratory infection",
    ),
    icd("M54.5", "Low back pain"),
    icd("E78.5", "Hyperlipidemia, unspecified"),
    icd("F41.1", "Generalized anxiety disorder"),
    icd("K21.9", "Gastro-esophageal reflux disease without esophagitis"),
    icd("J06.9", "Acute upper respiratory infection, unspecified"),
    icd("M79.3", "Panniculitis, unspecified"),
    icd("R51", "Headache"),
    icd(
        "Z00.00",
        "Encounter for general adult medical examination without abnormal findings",
    ),
    icd(
        "I25.10",
        "Atherosclerotic heart disease of native coronary artery without angina pectoris",
    ),
    icd("N39.0", "Urinary tract infection, site not specified"),
    icd("J18.9", "Pneumonia, unspecified organism"),
    icd("E66.9", "Obesity, unspecified"),
];

pub const CPT_CODES: [ProcedureCode; 15] = [
    cpt("99213", "Office visit, established patient, 20-29 minutes", 150),
    cpt("99214", "Office visit, established patient, 30-39 minutes", 220),
    cpt("99215", "Office visit, established patient, 40-54 minutes", 310),
    cpt("99203", "Office visit, new patient, 30-44 minutes", 200),
    cpt("99204", "Office visit, new patient, 45-59 minutes", 275),
    cpt("99285", "Emergency department visit, high severity", 450),
    cpt("93000", "Electrocardiogram, complete", 85),
    cpt("80053", "Comprehensive metabolic panel", 45),
    cpt("85025", "Complete blood count with differential", 35),
    cpt("36415", "Venipuncture", 25),
    cpt("71045", "Chest X-ray, 2 views", 125),
    cpt("73721", "MRI lower extremity without contrast", 850),
    cpt("70450", "CT head without contrast", 650),
    cpt("99386", "Preventive visit, established patient, 40-64 years", 180),
    cpt("90834", "Psychotherapy, 45 minutes", 140),
];

pub static VERIFIER_POOL: Lazy<Vec<VerifierIdentity>> = Lazy::new(|| {
    [
        ("HealthVerify AI", 95, "verifier1"),
        ("MedChain Validator", 92, "verifier2"),
        ("ClaimGuard Systems", 88, "verifier3"),
        ("TrustMed Network", 90, "verifier4"),
        ("Consensus Health", 93, "verifier5"),
    ]
    .into_iter()
    .map(|(name, reputation, seed)| VerifierIdentity {
        name,
        reputation,
        address: generate_demo_wallet(seed),
    })
    .collect()
});

/// Counterparty of every fabricated ledger transaction.
pub static CONTRACT_ADDRESS: Lazy<String> = Lazy::new(|| generate_demo_wallet("contract"));

pub const REJECTION_REASONS: [&str; 6] = [
    "Incomplete documentation provided",
    "Procedure not covered under current policy",
    "Medical necessity not established",
    "Duplicate claim submission detected",
    "Provider credentials verification failed",
    "Claim amount exceeds policy limits",
];

pub const FLAG_REASONS: [&str; 5] = [
    "Unusual claim amount for procedure type",
    "High claim frequency from provider",
    "Conflicting diagnosis and procedure codes",
    "Requires additional documentation",
    "Verifier consensus not reached within time window",
];

pub fn claim_notes(status: ClaimStatus) -> Vec<String> {
    let extra: &[&str] = match status {
        ClaimStatus::Pending => &["Awaiting initial verification"],
        ClaimStatus::Verifying => &["Verification in progress", "Consensus voting underway"],
        ClaimStatus::Verified => &[
            "Verification complete",
            "Consensus reached",
            "Claim approved for payment",
        ],
        ClaimStatus::Rejected => &["Verification complete", "Claim rejected by consensus"],
        ClaimStatus::Flagged => &["Flagged for manual review", "Awaiting administrator decision"],
        ClaimStatus::Appealing => &["Appeal submitted", "Under review by appeals committee"],
    };
    std::iter::once("Claim submitted via blockchain network")
        .chain(extra.iter().copied())
        .map(str::to_string)
        .collect()
}
