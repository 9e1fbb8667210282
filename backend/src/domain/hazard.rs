//! Hazard reports: types, vote tallies, and the peer-review state machine.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use crate::domain::identity::UserId;
use crate::domain::report_id::ReportId;

/// Minimum description length accepted on submission.
pub const DESCRIPTION_MIN: usize = 10;

/// Votes on one side required to decide a report's peer-review state.
pub const VOTES_TO_DECIDE: u32 = 3;

/// Closed set of hazard categories.
///
/// Unknown categories fail closed at the boundary; the enum makes them
/// unrepresentable internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum HazardType {
    #[serde(rename = "Physical Hazard")]
    Physical,
    #[serde(rename = "Biological Hazard")]
    Biological,
    #[serde(rename = "Chemical Hazard")]
    Chemical,
    #[serde(rename = "Electrical Hazard")]
    Electrical,
    #[serde(rename = "Safety Hazard")]
    Safety,
    #[serde(rename = "Ergonomic Hazard")]
    Ergonomic,
    #[serde(rename = "Earthquake")]
    Earthquake,
    #[serde(rename = "Flood")]
    Flood,
    #[serde(rename = "Extreme Weather")]
    ExtremeWeather,
    #[serde(rename = "Sinkhole")]
    Sinkhole,
    #[serde(rename = "Others")]
    Others,
}

/// Error raised when a category string is outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown hazard type: {label}")]
pub struct UnknownHazardType {
    /// The rejected label.
    pub label: String,
}

impl HazardType {
    /// Every category, in urgency-table order.
    pub const ALL: [Self; 11] = [
        Self::Physical,
        Self::Biological,
        Self::Chemical,
        Self::Electrical,
        Self::Safety,
        Self::Ergonomic,
        Self::Earthquake,
        Self::Flood,
        Self::ExtremeWeather,
        Self::Sinkhole,
        Self::Others,
    ];

    /// Display ordering priority, 2 (lowest) to 5 (highest).
    #[must_use]
    pub const fn urgency(self) -> u8 {
        match self {
            Self::Physical => 5,
            Self::Biological | Self::Chemical | Self::Electrical | Self::Safety => 4,
            Self::Ergonomic | Self::Earthquake | Self::Flood | Self::ExtremeWeather => 3,
            Self::Sinkhole | Self::Others => 2,
        }
    }

    /// Canonical label, matching the serialised form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Physical => "Physical Hazard",
            Self::Biological => "Biological Hazard",
            Self::Chemical => "Chemical Hazard",
            Self::Electrical => "Electrical Hazard",
            Self::Safety => "Safety Hazard",
            Self::Ergonomic => "Ergonomic Hazard",
            Self::Earthquake => "Earthquake",
            Self::Flood => "Flood",
            Self::ExtremeWeather => "Extreme Weather",
            Self::Sinkhole => "Sinkhole",
            Self::Others => "Others",
        }
    }
}

impl std::fmt::Display for HazardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HazardType {
    type Err = UnknownHazardType;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == label)
            .ok_or_else(|| UnknownHazardType {
                label: label.to_owned(),
            })
    }
}

/// Validation errors raised when building or rehydrating a report.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReportValidationError {
    /// Description shorter than [`DESCRIPTION_MIN`] characters once trimmed.
    #[error("description must be at least {DESCRIPTION_MIN} characters")]
    DescriptionTooShort,
    /// Latitude outside [-90, 90].
    #[error("latitude must be between -90 and 90")]
    LatitudeOutOfRange,
    /// Longitude outside [-180, 180].
    #[error("longitude must be between -180 and 180")]
    LongitudeOutOfRange,
    /// The voter set does not match the vote tallies.
    #[error("voter set size {voters} does not match tally total {tally}")]
    VoteLedgerMismatch {
        /// Number of recorded voters.
        voters: usize,
        /// Sum of both tallies.
        tally: u32,
    },
}

/// Hazard description, at least [`DESCRIPTION_MIN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Description(String);

impl Description {
    /// Validate and construct a description.
    ///
    /// # Errors
    /// [`ReportValidationError::DescriptionTooShort`] when the trimmed text
    /// is under the minimum.
    pub fn new(text: impl Into<String>) -> Result<Self, ReportValidationError> {
        let text = text.into();
        if text.trim().chars().count() < DESCRIPTION_MIN {
            return Err(ReportValidationError::DescriptionTooShort);
        }
        Ok(Self(text))
    }
}

impl AsRef<str> for Description {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Description> for String {
    fn from(value: Description) -> Self {
        value.0
    }
}

impl TryFrom<String> for Description {
    type Error = ReportValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// WGS84 coordinates of the reported hazard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate and construct a coordinate pair.
    ///
    /// # Errors
    /// Out-of-range components are rejected so a flipped lat/lng pair fails
    /// loudly instead of rendering in the wrong hemisphere.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ReportValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ReportValidationError::LatitudeOutOfRange);
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ReportValidationError::LongitudeOutOfRange);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.longitude
    }
}

/// Content fingerprint standing in for an uploaded image payload.
///
/// The backend stores a SHA-256 digest of the payload rather than the bytes;
/// blob storage is a separate concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Fingerprint an uploaded payload.
    #[must_use]
    pub fn fingerprint(payload: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(payload)))
    }

    /// Hex digest string.
    pub fn as_hex(&self) -> &str {
        self.0.as_str()
    }
}

/// Operational state of a report, independent of peer review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Awaiting action on the ground.
    #[default]
    Pending,
    /// Marked handled by some authenticated user.
    Resolved,
}

/// Peer-review outcome of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Still collecting votes.
    #[default]
    Pending,
    /// Confirmed by [`VOTES_TO_DECIDE`] valid votes. Terminal.
    Valid,
    /// Rejected by [`VOTES_TO_DECIDE`] invalid votes. Terminal.
    Invalid,
}

/// Running vote counts for one report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VoteTally {
    /// Votes confirming the hazard.
    pub valid: u32,
    /// Votes rejecting the hazard.
    pub invalid: u32,
}

impl VoteTally {
    /// Total votes cast.
    #[must_use]
    pub const fn total(self) -> u32 {
        self.valid + self.invalid
    }
}

/// A remediation suggestion attached to a valid vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// Voter who suggested the fix.
    pub validator: UserId,
    /// Free-text suggestion.
    pub text: String,
}

/// Rejections produced by the vote state machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoteError {
    /// The voter already voted on this report.
    #[error("user has already voted on this report")]
    DuplicateVote,
    /// Reporters cannot vote on their own reports.
    #[error("reporters cannot vote on their own reports")]
    OwnReport,
}

/// Outcome of a counted vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    /// Whether this vote moved the report from pending to valid.
    pub newly_valid: bool,
}

/// Input fields for a new report submission.
#[derive(Debug, Clone)]
pub struct ReportDraft {
    /// Authenticated submitter.
    pub reporter: UserId,
    /// Validated description.
    pub description: Description,
    /// Hazard category.
    pub hazard_type: HazardType,
    /// Hazard position.
    pub location: Coordinates,
    /// Optional image fingerprint.
    pub image: Option<ImageRef>,
}

/// A submitted hazard report.
///
/// ## Invariants
/// - `voted_by.len() == votes.total()`.
/// - `validation_status` is terminal once `Valid` or `Invalid`; late votes
///   move the tallies but never the state.
/// - Votes and solutions are append-only; reports are never deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardReport {
    id: ReportId,
    reporter: UserId,
    description: Description,
    hazard_type: HazardType,
    location: Coordinates,
    image: Option<ImageRef>,
    created_at: DateTime<Utc>,
    status: ReportStatus,
    validation_status: ValidationStatus,
    votes: VoteTally,
    voted_by: BTreeSet<UserId>,
    resolved_by: Option<UserId>,
    solutions: Vec<Solution>,
    revision: u32,
}

impl HazardReport {
    /// Create a freshly submitted report with empty vote state.
    #[must_use]
    pub fn submit(draft: ReportDraft, id: ReportId, created_at: DateTime<Utc>) -> Self {
        let ReportDraft {
            reporter,
            description,
            hazard_type,
            location,
            image,
        } = draft;
        Self {
            id,
            reporter,
            description,
            hazard_type,
            location,
            image,
            created_at,
            status: ReportStatus::Pending,
            validation_status: ValidationStatus::Pending,
            votes: VoteTally::default(),
            voted_by: BTreeSet::new(),
            resolved_by: None,
            solutions: Vec::new(),
            revision: 0,
        }
    }

    /// Rehydrate a report from stored fields, checking cross-field
    /// invariants the individual value types cannot see.
    ///
    /// # Errors
    /// [`ReportValidationError::VoteLedgerMismatch`] when the voter set and
    /// tallies disagree.
    #[expect(clippy::too_many_arguments, reason = "snapshot rehydration maps stored columns 1:1")]
    pub fn from_parts(
        id: ReportId,
        reporter: UserId,
        description: Description,
        hazard_type: HazardType,
        location: Coordinates,
        image: Option<ImageRef>,
        created_at: DateTime<Utc>,
        status: ReportStatus,
        validation_status: ValidationStatus,
        votes: VoteTally,
        voted_by: BTreeSet<UserId>,
        resolved_by: Option<UserId>,
        solutions: Vec<Solution>,
        revision: u32,
    ) -> Result<Self, ReportValidationError> {
        if voted_by.len() != usize::try_from(votes.total()).unwrap_or(usize::MAX) {
            return Err(ReportValidationError::VoteLedgerMismatch {
                voters: voted_by.len(),
                tally: votes.total(),
            });
        }
        Ok(Self {
            id,
            reporter,
            description,
            hazard_type,
            location,
            image,
            created_at,
            status,
            validation_status,
            votes,
            voted_by,
            resolved_by,
            solutions,
            revision,
        })
    }

    /// Report identifier.
    #[must_use]
    pub const fn id(&self) -> ReportId {
        self.id
    }

    /// Submitting user.
    pub fn reporter(&self) -> &UserId {
        &self.reporter
    }

    /// Hazard description.
    pub fn description(&self) -> &Description {
        &self.description
    }

    /// Hazard category.
    #[must_use]
    pub const fn hazard_type(&self) -> HazardType {
        self.hazard_type
    }

    /// Category urgency, for display ordering.
    #[must_use]
    pub const fn urgency(&self) -> u8 {
        self.hazard_type.urgency()
    }

    /// Hazard position.
    #[must_use]
    pub const fn location(&self) -> Coordinates {
        self.location
    }

    /// Optional image fingerprint.
    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    /// Submission timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Operational state.
    #[must_use]
    pub const fn status(&self) -> ReportStatus {
        self.status
    }

    /// Peer-review state.
    #[must_use]
    pub const fn validation_status(&self) -> ValidationStatus {
        self.validation_status
    }

    /// Vote counts.
    #[must_use]
    pub const fn votes(&self) -> VoteTally {
        self.votes
    }

    /// Users who have voted, in identifier order.
    pub fn voted_by(&self) -> impl Iterator<Item = &UserId> {
        self.voted_by.iter()
    }

    /// Whether the given user has already voted.
    pub fn has_voted(&self, user: &UserId) -> bool {
        self.voted_by.contains(user)
    }

    /// User who marked the report resolved, if any.
    pub fn resolved_by(&self) -> Option<&UserId> {
        self.resolved_by.as_ref()
    }

    /// Suggested remediations, in submission order.
    pub fn solutions(&self) -> &[Solution] {
        self.solutions.as_slice()
    }

    /// Optimistic-concurrency token for the persistence layer.
    #[must_use]
    pub const fn revision(&self) -> u32 {
        self.revision
    }

    /// Bump the revision ahead of a compare-and-swap write.
    pub fn advance_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Apply one vote.
    ///
    /// A counted vote increments the matching tally, records the voter, and
    /// attaches the solution when the vote is valid. When the report is
    /// still pending, reaching [`VOTES_TO_DECIDE`] valid votes turns it
    /// `Valid` (reported through [`VoteOutcome::newly_valid`] so the caller
    /// awards the reporter exactly once); [`VOTES_TO_DECIDE`] invalid votes
    /// before that turn it `Invalid`. Terminal states never change again.
    ///
    /// # Errors
    /// [`VoteError::OwnReport`] and [`VoteError::DuplicateVote`] reject the
    /// vote with zero side effects.
    pub fn apply_vote(
        &mut self,
        voter: &UserId,
        is_valid: bool,
        solution: Option<String>,
    ) -> Result<VoteOutcome, VoteError> {
        if voter == &self.reporter {
            return Err(VoteError::OwnReport);
        }
        if self.voted_by.contains(voter) {
            return Err(VoteError::DuplicateVote);
        }

        if is_valid {
            self.votes.valid += 1;
        } else {
            self.votes.invalid += 1;
        }
        let _ = self.voted_by.insert(voter.clone());

        if is_valid {
            if let Some(text) = solution {
                let text = text.trim().to_owned();
                if !text.is_empty() {
                    self.solutions.push(Solution {
                        validator: voter.clone(),
                        text,
                    });
                }
            }
        }

        let mut newly_valid = false;
        if self.validation_status == ValidationStatus::Pending {
            if self.votes.valid >= VOTES_TO_DECIDE {
                self.validation_status = ValidationStatus::Valid;
                newly_valid = true;
            } else if self.votes.invalid >= VOTES_TO_DECIDE {
                self.validation_status = ValidationStatus::Invalid;
            }
        }

        Ok(VoteOutcome { newly_valid })
    }

    /// Record an explicit resolution action.
    ///
    /// Resolution is independent of peer review: any authenticated user may
    /// change the operational state regardless of `validation_status`.
    pub fn resolve(&mut self, resolver: UserId, new_status: ReportStatus) {
        self.status = new_status;
        self.resolved_by = Some(resolver);
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id).expect("fixture id")
    }

    fn sample_report() -> HazardReport {
        let draft = ReportDraft {
            reporter: user("reporter1"),
            description: Description::new("Exposed wiring near the bus stop")
                .expect("fixture description"),
            hazard_type: HazardType::Electrical,
            location: Coordinates::new(28.61, 77.21).expect("fixture coordinates"),
            image: None,
        };
        let created_at = Utc
            .timestamp_millis_opt(1_700_000_000_000)
            .single()
            .expect("fixture timestamp");
        HazardReport::submit(draft, ReportId::from_millis(1_700_000_000_000), created_at)
    }

    #[rstest]
    #[case("Physical Hazard", 5)]
    #[case("Biological Hazard", 4)]
    #[case("Chemical Hazard", 4)]
    #[case("Electrical Hazard", 4)]
    #[case("Safety Hazard", 4)]
    #[case("Ergonomic Hazard", 3)]
    #[case("Earthquake", 3)]
    #[case("Flood", 3)]
    #[case("Extreme Weather", 3)]
    #[case("Sinkhole", 2)]
    #[case("Others", 2)]
    fn urgency_table_is_closed_and_complete(#[case] label: &str, #[case] urgency: u8) {
        let hazard_type: HazardType = label.parse().expect("label is in the closed set");
        assert_eq!(hazard_type.urgency(), urgency);
        assert_eq!(hazard_type.as_str(), label);
    }

    #[rstest]
    fn unknown_hazard_types_fail_closed() {
        let err = "Cosmic Hazard".parse::<HazardType>().expect_err("unknown label");
        assert_eq!(err.label, "Cosmic Hazard");
    }

    #[rstest]
    fn description_boundary_is_ten_characters() {
        assert!(Description::new("123456789").is_err());
        assert!(Description::new("1234567890").is_ok());
    }

    #[rstest]
    #[case(91.0, 0.0)]
    #[case(-91.0, 0.0)]
    #[case(0.0, 181.0)]
    #[case(0.0, -181.0)]
    #[case(f64::NAN, 0.0)]
    fn out_of_range_coordinates_are_rejected(#[case] lat: f64, #[case] lng: f64) {
        assert!(Coordinates::new(lat, lng).is_err());
    }

    #[rstest]
    fn image_fingerprints_are_stable_hex_digests() {
        let a = ImageRef::fingerprint(b"payload");
        let b = ImageRef::fingerprint(b"payload");
        assert_eq!(a, b);
        assert_eq!(a.as_hex().len(), 64);
    }

    #[rstest]
    fn fresh_reports_start_pending_on_both_axes() {
        let report = sample_report();
        assert_eq!(report.status(), ReportStatus::Pending);
        assert_eq!(report.validation_status(), ValidationStatus::Pending);
        assert_eq!(report.votes().total(), 0);
    }

    #[rstest]
    fn a_reporter_cannot_vote_on_their_own_report() {
        let mut report = sample_report();
        let reporter = report.reporter().clone();
        let before = report.clone();

        let err = report
            .apply_vote(&reporter, true, Some("move it".to_owned()))
            .expect_err("self vote rejected");
        assert_eq!(err, VoteError::OwnReport);
        assert_eq!(report, before);
    }

    #[rstest]
    fn duplicate_votes_have_zero_side_effects() {
        let mut report = sample_report();
        let voter = user("voter001");
        report
            .apply_vote(&voter, true, None)
            .expect("first vote counts");
        let before = report.clone();

        let err = report
            .apply_vote(&voter, false, Some("changed my mind".to_owned()))
            .expect_err("second vote rejected");
        assert_eq!(err, VoteError::DuplicateVote);
        assert_eq!(report, before);
    }

    #[rstest]
    fn third_valid_vote_transitions_exactly_once() {
        let mut report = sample_report();
        for (index, voter) in ["voter001", "voter002"].iter().enumerate() {
            let outcome = report
                .apply_vote(&user(voter), true, None)
                .expect("vote counts");
            assert!(!outcome.newly_valid, "vote {index} must not transition");
            assert_eq!(report.validation_status(), ValidationStatus::Pending);
        }

        let outcome = report
            .apply_vote(&user("voter003"), true, None)
            .expect("third vote counts");
        assert!(outcome.newly_valid);
        assert_eq!(report.validation_status(), ValidationStatus::Valid);

        // A fourth vote still counts but must not re-fire the transition.
        let outcome = report
            .apply_vote(&user("voter004"), true, None)
            .expect("late vote counts");
        assert!(!outcome.newly_valid);
        assert_eq!(report.votes().valid, 4);
        assert_eq!(report.validation_status(), ValidationStatus::Valid);
    }

    #[rstest]
    fn three_invalid_votes_turn_the_report_invalid() {
        let mut report = sample_report();
        for voter in ["voter001", "voter002", "voter003"] {
            report
                .apply_vote(&user(voter), false, None)
                .expect("vote counts");
        }
        assert_eq!(report.validation_status(), ValidationStatus::Invalid);

        // Terminal: further valid votes cannot flip it.
        for voter in ["voter004", "voter005", "voter006"] {
            report
                .apply_vote(&user(voter), true, None)
                .expect("vote counts");
        }
        assert_eq!(report.validation_status(), ValidationStatus::Invalid);
    }

    #[rstest]
    fn solutions_attach_only_to_valid_votes_with_text() {
        let mut report = sample_report();
        report
            .apply_vote(&user("voter001"), true, Some("  fence it off  ".to_owned()))
            .expect("vote counts");
        report
            .apply_vote(&user("voter002"), false, Some("not applicable".to_owned()))
            .expect("vote counts");
        report
            .apply_vote(&user("voter003"), true, Some("   ".to_owned()))
            .expect("vote counts");

        let solutions = report.solutions();
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions.first().map(|s| s.text.as_str()), Some("fence it off"));
    }

    #[rstest]
    fn voter_ledger_matches_tallies_after_every_vote() {
        let mut report = sample_report();
        for (index, voter) in ["voter001", "voter002", "voter003", "voter004"]
            .iter()
            .enumerate()
        {
            report
                .apply_vote(&user(voter), index % 2 == 0, None)
                .expect("vote counts");
            assert_eq!(report.voted_by().count(), usize::try_from(report.votes().total()).expect("small"));
        }
    }

    #[rstest]
    fn resolution_is_independent_of_peer_review() {
        let mut report = sample_report();
        report.resolve(user("NGO_helper99"), ReportStatus::Resolved);
        assert_eq!(report.status(), ReportStatus::Resolved);
        assert_eq!(report.resolved_by(), Some(&user("NGO_helper99")));
        assert_eq!(report.validation_status(), ValidationStatus::Pending);
    }

    #[rstest]
    fn rehydration_rejects_mismatched_vote_ledgers() {
        let fresh = sample_report();
        let err = HazardReport::from_parts(
            fresh.id(),
            fresh.reporter().clone(),
            fresh.description().clone(),
            fresh.hazard_type(),
            fresh.location(),
            None,
            fresh.created_at(),
            ReportStatus::Pending,
            ValidationStatus::Pending,
            VoteTally { valid: 2, invalid: 0 },
            BTreeSet::from([user("voter001")]),
            None,
            Vec::new(),
            0,
        )
        .expect_err("ledger mismatch rejected");
        assert_eq!(
            err,
            ReportValidationError::VoteLedgerMismatch { voters: 1, tally: 2 }
        );
    }
}
