use serde::{Deserialize, Serialize};

use bursary_auth::{Call, CallerContext, Policy, Requirement};
use bursary_core::{
    Aggregate, ApplicantId, BlockHeight, Entity, EntityKind, EventConflict, Gpa, LedgerError,
    MilestoneId, RecordId, Table,
};
use bursary_events::{Command, Event};

/// Academic record status. New records start out `Verified`; the authority
/// may set any other string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordStatus {
    Verified,
    Other(String),
}

impl RecordStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RecordStatus::Verified => "verified",
            RecordStatus::Other(s) => s,
        }
    }
}

impl RecordStatus {
    /// Map a hand-built `Other("verified")` onto `Verified`.
    pub fn normalized(self) -> Self {
        Self::from(String::from(self))
    }
}

impl From<String> for RecordStatus {
    fn from(value: String) -> Self {
        if value == "verified" {
            RecordStatus::Verified
        } else {
            RecordStatus::Other(value)
        }
    }
}

impl From<&str> for RecordStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<RecordStatus> for String {
    fn from(value: RecordStatus) -> Self {
        match value {
            RecordStatus::Verified => "verified".to_string(),
            RecordStatus::Other(s) => s,
        }
    }
}

impl core::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One semester's academic outcome for an applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AcademicRecord {
    pub id: RecordId,
    pub applicant_id: ApplicantId,
    pub semester: String,
    pub gpa: Gpa,
    pub credits_completed: u32,
    pub status: RecordStatus,
    pub timestamp: BlockHeight,
}

impl Entity for AcademicRecord {
    type Id = RecordId;

    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Milestone {
    pub id: MilestoneId,
    pub applicant_id: ApplicantId,
    pub description: String,
    pub achieved: bool,
    /// Creation height, then the height of the latest achievement mark.
    pub timestamp: BlockHeight,
}

impl Entity for Milestone {
    type Id = MilestoneId;

    fn id(&self) -> MilestoneId {
        self.id
    }
}

/// Command: AddAcademicRecord.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddAcademicRecord {
    pub applicant_id: ApplicantId,
    pub semester: String,
    pub gpa: Gpa,
    pub credits_completed: u32,
}

/// Command: AddMilestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddMilestone {
    pub applicant_id: ApplicantId,
    pub description: String,
}

/// Command: MarkMilestoneAchieved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkMilestoneAchieved {
    pub milestone_id: MilestoneId,
}

/// Command: UpdateRecordStatus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecordStatus {
    pub record_id: RecordId,
    pub status: RecordStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeCommand {
    AddAcademicRecord(AddAcademicRecord),
    AddMilestone(AddMilestone),
    MarkMilestoneAchieved(MarkMilestoneAchieved),
    UpdateRecordStatus(UpdateRecordStatus),
}

impl Command for OutcomeCommand {
    fn operation(&self) -> &'static str {
        match self {
            OutcomeCommand::AddAcademicRecord(_) => "add-academic-record",
            OutcomeCommand::AddMilestone(_) => "add-milestone",
            OutcomeCommand::MarkMilestoneAchieved(_) => "mark-milestone-achieved",
            OutcomeCommand::UpdateRecordStatus(_) => "update-record-status",
        }
    }
}

/// Event: AcademicRecordAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicRecordAdded {
    pub record_id: RecordId,
    pub applicant_id: ApplicantId,
    pub semester: String,
    pub gpa: Gpa,
    pub credits_completed: u32,
    pub timestamp: BlockHeight,
}

/// Event: MilestoneAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneAdded {
    pub milestone_id: MilestoneId,
    pub applicant_id: ApplicantId,
    pub description: String,
    pub timestamp: BlockHeight,
}

/// Event: MilestoneAchieved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneAchieved {
    pub milestone_id: MilestoneId,
    pub timestamp: BlockHeight,
}

/// Event: RecordStatusUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStatusUpdated {
    pub record_id: RecordId,
    pub status: RecordStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeEvent {
    AcademicRecordAdded(AcademicRecordAdded),
    MilestoneAdded(MilestoneAdded),
    MilestoneAchieved(MilestoneAchieved),
    RecordStatusUpdated(RecordStatusUpdated),
}

impl Event for OutcomeEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OutcomeEvent::AcademicRecordAdded(_) => "outcomes.academic_record.added",
            OutcomeEvent::MilestoneAdded(_) => "outcomes.milestone.added",
            OutcomeEvent::MilestoneAchieved(_) => "outcomes.milestone.achieved",
            OutcomeEvent::RecordStatusUpdated(_) => "outcomes.academic_record.status_updated",
        }
    }

    fn version(&self) -> u32 {
        1
    }
}

/// Aggregate root: the academic outcome sub-ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeLedger {
    policy: Policy,
    records: Table<AcademicRecord>,
    milestones: Table<Milestone>,
    version: u64,
}

impl OutcomeLedger {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            records: Table::new(),
            milestones: Table::new(),
            version: 0,
        }
    }

    pub fn academic_record(&self, id: RecordId) -> Option<&AcademicRecord> {
        self.records.get(id)
    }

    pub fn milestone(&self, id: MilestoneId) -> Option<&Milestone> {
        self.milestones.get(id)
    }

    pub fn record_count(&self) -> u64 {
        self.records.count()
    }

    pub fn milestone_count(&self) -> u64 {
        self.milestones.count()
    }
}

impl OutcomeLedger {
    /// Check that a recorded event could have been decided against the
    /// current state before it is applied during replay.
    pub fn check_event(&self, event: &OutcomeEvent) -> Result<(), EventConflict> {
        match event {
            OutcomeEvent::AcademicRecordAdded(e) => self
                .records
                .expect_next(e.record_id, EntityKind::AcademicRecord),
            OutcomeEvent::MilestoneAdded(e) => self
                .milestones
                .expect_next(e.milestone_id, EntityKind::Milestone),
            OutcomeEvent::MilestoneAchieved(e) => self
                .milestones
                .expect_row(e.milestone_id, EntityKind::Milestone)
                .map(drop),
            OutcomeEvent::RecordStatusUpdated(e) => self
                .records
                .expect_row(e.record_id, EntityKind::AcademicRecord)
                .map(drop),
        }
    }
}

impl Aggregate for OutcomeLedger {
    type Command = Call<OutcomeCommand>;
    type Event = OutcomeEvent;
    type Error = LedgerError;

    const NAME: &'static str = "outcomes";

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OutcomeEvent::AcademicRecordAdded(e) => {
                self.records.insert(AcademicRecord {
                    id: e.record_id,
                    applicant_id: e.applicant_id,
                    semester: e.semester.clone(),
                    gpa: e.gpa,
                    credits_completed: e.credits_completed,
                    status: RecordStatus::Verified,
                    timestamp: e.timestamp,
                });
            }
            OutcomeEvent::MilestoneAdded(e) => {
                self.milestones.insert(Milestone {
                    id: e.milestone_id,
                    applicant_id: e.applicant_id,
                    description: e.description.clone(),
                    achieved: false,
                    timestamp: e.timestamp,
                });
            }
            OutcomeEvent::MilestoneAchieved(e) => {
                if let Some(m) = self.milestones.get_mut(e.milestone_id) {
                    m.achieved = true;
                    m.timestamp = e.timestamp;
                }
            }
            OutcomeEvent::RecordStatusUpdated(e) => {
                if let Some(r) = self.records.get_mut(e.record_id) {
                    r.status = e.status.clone();
                }
            }
        }

        self.version += 1;
    }

    fn handle(&self, call: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let caller = &call.caller;
        match &call.command {
            OutcomeCommand::AddAcademicRecord(cmd) => self.handle_add_record(caller, cmd),
            OutcomeCommand::AddMilestone(cmd) => self.handle_add_milestone(caller, cmd),
            OutcomeCommand::MarkMilestoneAchieved(cmd) => self.handle_mark_achieved(caller, cmd),
            OutcomeCommand::UpdateRecordStatus(cmd) => self.handle_update_status(caller, cmd),
        }
    }
}

impl OutcomeLedger {
    fn handle_add_record(
        &self,
        caller: &CallerContext,
        cmd: &AddAcademicRecord,
    ) -> Result<Vec<OutcomeEvent>, LedgerError> {
        self.policy
            .authorize(caller, Requirement::AuthorityOrInstitution)?;

        Ok(vec![OutcomeEvent::AcademicRecordAdded(AcademicRecordAdded {
            record_id: self.records.next_id(),
            applicant_id: cmd.applicant_id,
            semester: cmd.semester.clone(),
            gpa: cmd.gpa,
            credits_completed: cmd.credits_completed,
            timestamp: caller.block_height(),
        })])
    }

    fn handle_add_milestone(
        &self,
        caller: &CallerContext,
        cmd: &AddMilestone,
    ) -> Result<Vec<OutcomeEvent>, LedgerError> {
        self.policy.authorize(caller, Requirement::Authority)?;

        Ok(vec![OutcomeEvent::MilestoneAdded(MilestoneAdded {
            milestone_id: self.milestones.next_id(),
            applicant_id: cmd.applicant_id,
            description: cmd.description.clone(),
            timestamp: caller.block_height(),
        })])
    }

    fn handle_mark_achieved(
        &self,
        caller: &CallerContext,
        cmd: &MarkMilestoneAchieved,
    ) -> Result<Vec<OutcomeEvent>, LedgerError> {
        self.milestones
            .require(cmd.milestone_id, EntityKind::Milestone)?;
        self.policy.authorize(caller, Requirement::Authority)?;

        // No guard for milestones that are already achieved: re-marking
        // succeeds and moves the timestamp forward.
        Ok(vec![OutcomeEvent::MilestoneAchieved(MilestoneAchieved {
            milestone_id: cmd.milestone_id,
            timestamp: caller.block_height(),
        })])
    }

    fn handle_update_status(
        &self,
        caller: &CallerContext,
        cmd: &UpdateRecordStatus,
    ) -> Result<Vec<OutcomeEvent>, LedgerError> {
        self.records
            .require(cmd.record_id, EntityKind::AcademicRecord)?;
        self.policy.authorize(caller, Requirement::Authority)?;

        Ok(vec![OutcomeEvent::RecordStatusUpdated(RecordStatusUpdated {
            record_id: cmd.record_id,
            status: cmd.status.clone().normalized(),
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bursary_events::execute;

    const AUTHORITY: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
    const OTHER: &str = "ST2PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

    fn test_ledger() -> OutcomeLedger {
        OutcomeLedger::new(Policy::new(AUTHORITY))
    }

    fn run_as(
        ledger: &mut OutcomeLedger,
        caller: CallerContext,
        command: OutcomeCommand,
    ) -> Result<Vec<OutcomeEvent>, LedgerError> {
        execute(ledger, &Call::new(caller, command))
    }

    fn run(
        ledger: &mut OutcomeLedger,
        principal: &str,
        command: OutcomeCommand,
    ) -> Result<Vec<OutcomeEvent>, LedgerError> {
        run_as(ledger, CallerContext::new(principal, BlockHeight::new(12345)), command)
    }

    fn add_record(semester: &str) -> OutcomeCommand {
        OutcomeCommand::AddAcademicRecord(AddAcademicRecord {
            applicant_id: ApplicantId::new(1),
            semester: semester.to_string(),
            gpa: Gpa::from_hundredths(385),
            credits_completed: 15,
        })
    }

    fn add_milestone(description: &str) -> OutcomeCommand {
        OutcomeCommand::AddMilestone(AddMilestone {
            applicant_id: ApplicantId::new(1),
            description: description.to_string(),
        })
    }

    fn mark_achieved(id: u64) -> OutcomeCommand {
        OutcomeCommand::MarkMilestoneAchieved(MarkMilestoneAchieved {
            milestone_id: MilestoneId::new(id),
        })
    }

    fn update_status(id: u64, status: &str) -> OutcomeCommand {
        OutcomeCommand::UpdateRecordStatus(UpdateRecordStatus {
            record_id: RecordId::new(id),
            status: status.into(),
        })
    }

    #[test]
    fn authority_adds_verified_academic_record() {
        let mut ledger = test_ledger();
        run(&mut ledger, AUTHORITY, add_record("Fall 2023")).unwrap();

        let record = ledger.academic_record(RecordId::new(1)).unwrap();
        assert_eq!(record.applicant_id, ApplicantId::new(1));
        assert_eq!(record.semester, "Fall 2023");
        assert_eq!(record.gpa, Gpa::from_hundredths(385));
        assert_eq!(record.credits_completed, 15);
        assert_eq!(record.status, RecordStatus::Verified);
        assert_eq!(record.timestamp, BlockHeight::new(12345));
        assert_eq!(ledger.record_count(), 1);
    }

    #[test]
    fn authorized_institution_may_add_academic_record() {
        let mut ledger = test_ledger();
        let caller =
            CallerContext::new(OTHER, BlockHeight::new(20)).with_authorized_institution(true);

        run_as(&mut ledger, caller, add_record("Spring 2024")).unwrap();

        let record = ledger.academic_record(RecordId::new(1)).unwrap();
        assert_eq!(record.semester, "Spring 2024");
        assert_eq!(record.timestamp, BlockHeight::new(20));
    }

    #[test]
    fn unauthorized_caller_cannot_add_academic_record() {
        let mut ledger = test_ledger();
        let err = run(&mut ledger, OTHER, add_record("Spring 2024")).unwrap_err();
        assert_eq!(err, LedgerError::NotAuthorized);
        assert_eq!(ledger.record_count(), 0);
    }

    #[test]
    fn institution_capability_does_not_cover_milestones_or_status() {
        let mut ledger = test_ledger();
        run(&mut ledger, AUTHORITY, add_record("Fall 2023")).unwrap();
        let institution =
            || CallerContext::new(OTHER, BlockHeight::new(1)).with_authorized_institution(true);

        let err = run_as(&mut ledger, institution(), add_milestone("Dean's list")).unwrap_err();
        assert_eq!(err, LedgerError::NotAuthorized);

        let err = run_as(&mut ledger, institution(), update_status(1, "reviewed")).unwrap_err();
        assert_eq!(err, LedgerError::NotAuthorized);
    }

    #[test]
    fn milestone_is_added_unachieved_then_marked_achieved() {
        let mut ledger = test_ledger();
        run(&mut ledger, AUTHORITY, add_milestone("Completed first year with honors")).unwrap();

        let milestone = ledger.milestone(MilestoneId::new(1)).unwrap();
        assert_eq!(milestone.applicant_id, ApplicantId::new(1));
        assert_eq!(milestone.description, "Completed first year with honors");
        assert!(!milestone.achieved);
        assert_eq!(milestone.timestamp, BlockHeight::new(12345));

        let later = CallerContext::new(AUTHORITY, BlockHeight::new(12346));
        run_as(&mut ledger, later, mark_achieved(1)).unwrap();

        let milestone = ledger.milestone(MilestoneId::new(1)).unwrap();
        assert!(milestone.achieved);
        assert_eq!(milestone.timestamp, BlockHeight::new(12346));
    }

    #[test]
    fn re_marking_an_achieved_milestone_refreshes_timestamp() {
        let mut ledger = test_ledger();
        run(&mut ledger, AUTHORITY, add_milestone("Internship")).unwrap();
        run(&mut ledger, AUTHORITY, mark_achieved(1)).unwrap();

        let again = CallerContext::new(AUTHORITY, BlockHeight::new(99_999));
        run_as(&mut ledger, again, mark_achieved(1)).unwrap();

        let milestone = ledger.milestone(MilestoneId::new(1)).unwrap();
        assert!(milestone.achieved);
        assert_eq!(milestone.timestamp, BlockHeight::new(99_999));
    }

    #[test]
    fn milestone_failures() {
        let mut ledger = test_ledger();

        let err = run(&mut ledger, AUTHORITY, mark_achieved(999)).unwrap_err();
        assert_eq!(err, LedgerError::NotFound(EntityKind::Milestone));
        assert_eq!(err.code(), 102);

        let err = run(&mut ledger, OTHER, add_milestone("Internship")).unwrap_err();
        assert_eq!(err, LedgerError::NotAuthorized);
        assert_eq!(ledger.milestone_count(), 0);

        run(&mut ledger, AUTHORITY, add_milestone("Internship")).unwrap();
        let err = run(&mut ledger, OTHER, mark_achieved(1)).unwrap_err();
        assert_eq!(err, LedgerError::NotAuthorized);
        assert!(!ledger.milestone(MilestoneId::new(1)).unwrap().achieved);
    }

    #[test]
    fn update_record_status_overwrites_freely() {
        let mut ledger = test_ledger();
        run(&mut ledger, AUTHORITY, add_record("Fall 2023")).unwrap();

        run(&mut ledger, AUTHORITY, update_status(1, "reviewed")).unwrap();
        assert_eq!(
            ledger.academic_record(RecordId::new(1)).unwrap().status.as_str(),
            "reviewed"
        );

        run(&mut ledger, AUTHORITY, update_status(1, "verified")).unwrap();
        assert_eq!(
            ledger.academic_record(RecordId::new(1)).unwrap().status,
            RecordStatus::Verified
        );
    }

    #[test]
    fn update_record_status_failures() {
        let mut ledger = test_ledger();

        let err = run(&mut ledger, AUTHORITY, update_status(999, "reviewed")).unwrap_err();
        assert_eq!(err, LedgerError::NotFound(EntityKind::AcademicRecord));
        assert_eq!(err.code(), 101);

        run(&mut ledger, AUTHORITY, add_record("Fall 2023")).unwrap();
        let err = run(&mut ledger, OTHER, update_status(1, "revoked")).unwrap_err();
        assert_eq!(err, LedgerError::NotAuthorized);
        assert_eq!(
            ledger.academic_record(RecordId::new(1)).unwrap().status,
            RecordStatus::Verified
        );
    }

    #[test]
    fn record_json_shape() {
        let mut ledger = test_ledger();
        run(&mut ledger, AUTHORITY, add_record("Fall 2023")).unwrap();
        let json = serde_json::to_value(ledger.academic_record(RecordId::new(1)).unwrap()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "applicant-id": 1,
                "semester": "Fall 2023",
                "gpa": 385,
                "credits-completed": 15,
                "status": "verified",
                "timestamp": 12345
            })
        );
    }

    #[test]
    fn hand_built_verified_status_is_normalized() {
        let mut ledger = test_ledger();
        run(&mut ledger, AUTHORITY, add_record("Fall 2023")).unwrap();
        run(&mut ledger, AUTHORITY, update_status(1, "under-review")).unwrap();

        let command = OutcomeCommand::UpdateRecordStatus(UpdateRecordStatus {
            record_id: RecordId::new(1),
            status: RecordStatus::Other("verified".to_string()),
        });
        run(&mut ledger, AUTHORITY, command).unwrap();

        assert_eq!(
            ledger.academic_record(RecordId::new(1)).unwrap().status,
            RecordStatus::Verified
        );
    }

    #[test]
    fn check_event_requires_next_ids_and_existing_rows() {
        let mut ledger = test_ledger();
        run(&mut ledger, AUTHORITY, add_milestone("Completed first year")).unwrap();

        let skipped = OutcomeEvent::AcademicRecordAdded(AcademicRecordAdded {
            record_id: RecordId::new(5),
            applicant_id: ApplicantId::new(1),
            semester: "Fall 2023".to_string(),
            gpa: Gpa::from_hundredths(385),
            credits_completed: 15,
            timestamp: BlockHeight::new(1),
        });
        assert_eq!(
            ledger.check_event(&skipped),
            Err(EventConflict::UnexpectedId {
                kind: EntityKind::AcademicRecord,
                expected: 1,
                found: 5,
            })
        );

        let achieved = |id| {
            OutcomeEvent::MilestoneAchieved(MilestoneAchieved {
                milestone_id: MilestoneId::new(id),
                timestamp: BlockHeight::new(2),
            })
        };
        assert_eq!(ledger.check_event(&achieved(1)), Ok(()));
        assert_eq!(
            ledger.check_event(&achieved(2)),
            Err(EventConflict::MissingRow {
                kind: EntityKind::Milestone,
                id: 2,
            })
        );
    }
}
