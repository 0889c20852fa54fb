use tracing::{debug, info, instrument, warn};

use bursary_applicants::{
    Applicant, ApplicantCommand, ApplicantLedger, Application, ApplicationStatus,
    ApplyForScholarship, RegisterApplicant, UpdateApplicationStatus, VerifyApplicant,
};
use bursary_auth::{Call, CallerContext, Policy, PrincipalId};
use bursary_core::{
    Aggregate, Amount, ApplicantId, ApplicationId, DisbursementId, EventConflict, Gpa,
    InstitutionId, LedgerError, LedgerResult, MilestoneId, RecordId, ScholarshipId, SequentialId,
};
use bursary_disbursements::{
    CancelDisbursement, CreateDisbursement, Disbursement, DisbursementCommand, DisbursementLedger,
    Institution, ProcessDisbursement, RegisterInstitution,
};
use bursary_events::{Command, EventEnvelope, execute};
use bursary_outcomes::{
    AcademicRecord, AddAcademicRecord, AddMilestone, MarkMilestoneAchieved, Milestone,
    OutcomeCommand, OutcomeLedger, RecordStatus, UpdateRecordStatus,
};
use bursary_scholarships::{
    ActivateScholarship, CreateScholarship, DeactivateScholarship, FundScholarship, Scholarship,
    ScholarshipCommand, ScholarshipLedger,
};

use crate::config::EngineConfig;
use crate::journal::{Journal, LedgerEvent, ReplayError};

/// The scholarship ledger: four sub-ledgers behind one authority.
///
/// Every mutating call is all-or-nothing. On success its events are applied
/// to the owning sub-ledger and appended to the journal; on failure neither
/// the sub-ledger nor the journal changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEngine {
    policy: Policy,
    applicants: ApplicantLedger,
    scholarships: ScholarshipLedger,
    disbursements: DisbursementLedger,
    outcomes: OutcomeLedger,
    journal: Journal,
}

impl LedgerEngine {
    pub fn new(config: EngineConfig) -> Self {
        let policy = Policy::new(config.authority);
        Self {
            applicants: ApplicantLedger::new(policy.clone()),
            scholarships: ScholarshipLedger::new(policy.clone()),
            disbursements: DisbursementLedger::new(policy.clone()),
            outcomes: OutcomeLedger::new(policy.clone()),
            policy,
            journal: Journal::new(),
        }
    }

    pub fn with_authority(authority: impl Into<PrincipalId>) -> Self {
        Self::new(EngineConfig::new(authority))
    }

    /// Rebuild an engine by re-applying journal entries in order.
    ///
    /// Entries must be contiguous from sequence number 1, filed under the
    /// stream and event type of their payload, and each event must be one the
    /// owning sub-ledger could have decided at that point: creations carry
    /// the table's next id and every other event targets an existing row.
    #[instrument(skip_all, fields(authority = %config.authority))]
    pub fn replay<I>(config: EngineConfig, envelopes: I) -> Result<Self, ReplayError>
    where
        I: IntoIterator<Item = EventEnvelope<LedgerEvent>>,
    {
        let mut engine = Self::new(config);
        for envelope in envelopes {
            engine.journal.check_next(&envelope)?;
            let sequence_number = envelope.sequence_number();
            let event = envelope.into_payload();
            engine
                .check_event(&event)
                .map_err(|conflict| ReplayError::Conflict {
                    sequence_number,
                    conflict,
                })?;
            engine.apply_event(&event);
            engine.journal.append(event);
        }

        info!(events = engine.journal.len(), "journal replayed");
        Ok(engine)
    }

    pub fn authority(&self) -> &PrincipalId {
        self.policy.authority()
    }

    pub fn journal(&self) -> &[EventEnvelope<LedgerEvent>] {
        self.journal.entries()
    }

    // ---- applicants ----

    pub fn register_applicant(
        &mut self,
        caller: &CallerContext,
        name: impl Into<String>,
        institution: impl Into<String>,
        gpa: Gpa,
        field_of_study: impl Into<String>,
    ) -> LedgerResult<ApplicantId> {
        let command = ApplicantCommand::RegisterApplicant(RegisterApplicant {
            name: name.into(),
            institution: institution.into(),
            gpa,
            field_of_study: field_of_study.into(),
        });
        dispatch(
            &mut self.applicants,
            &mut self.journal,
            caller,
            command,
            LedgerEvent::Applicants,
        )?;
        Ok(ApplicantId::from_seq(self.applicants.applicant_count()))
    }

    pub fn apply_for_scholarship(
        &mut self,
        caller: &CallerContext,
        applicant_id: ApplicantId,
        scholarship_id: ScholarshipId,
    ) -> LedgerResult<ApplicationId> {
        let command = ApplicantCommand::ApplyForScholarship(ApplyForScholarship {
            applicant_id,
            scholarship_id,
        });
        dispatch(
            &mut self.applicants,
            &mut self.journal,
            caller,
            command,
            LedgerEvent::Applicants,
        )?;
        Ok(ApplicationId::from_seq(self.applicants.application_count()))
    }

    pub fn verify_applicant(
        &mut self,
        caller: &CallerContext,
        applicant_id: ApplicantId,
    ) -> LedgerResult<bool> {
        let command = ApplicantCommand::VerifyApplicant(VerifyApplicant { applicant_id });
        dispatch(
            &mut self.applicants,
            &mut self.journal,
            caller,
            command,
            LedgerEvent::Applicants,
        )?;
        Ok(true)
    }

    pub fn update_application_status(
        &mut self,
        caller: &CallerContext,
        application_id: ApplicationId,
        status: impl Into<ApplicationStatus>,
    ) -> LedgerResult<bool> {
        let command = ApplicantCommand::UpdateApplicationStatus(UpdateApplicationStatus {
            application_id,
            status: status.into(),
        });
        dispatch(
            &mut self.applicants,
            &mut self.journal,
            caller,
            command,
            LedgerEvent::Applicants,
        )?;
        Ok(true)
    }

    pub fn applicant(&self, id: ApplicantId) -> Option<&Applicant> {
        self.applicants.applicant(id)
    }

    pub fn application(&self, id: ApplicationId) -> Option<&Application> {
        self.applicants.application(id)
    }

    pub fn applicant_count(&self) -> u64 {
        self.applicants.applicant_count()
    }

    pub fn application_count(&self) -> u64 {
        self.applicants.application_count()
    }

    // ---- scholarships ----

    #[allow(clippy::too_many_arguments)]
    pub fn create_scholarship(
        &mut self,
        caller: &CallerContext,
        name: impl Into<String>,
        description: impl Into<String>,
        total_amount: Amount,
        award_amount: Amount,
        criteria_gpa: Gpa,
        criteria_field: impl Into<String>,
    ) -> LedgerResult<ScholarshipId> {
        let command = ScholarshipCommand::CreateScholarship(CreateScholarship {
            name: name.into(),
            description: description.into(),
            total_amount,
            award_amount,
            criteria_gpa,
            criteria_field: criteria_field.into(),
        });
        dispatch(
            &mut self.scholarships,
            &mut self.journal,
            caller,
            command,
            LedgerEvent::Scholarships,
        )?;
        Ok(ScholarshipId::from_seq(self.scholarships.scholarship_count()))
    }

    pub fn fund_scholarship(
        &mut self,
        caller: &CallerContext,
        scholarship_id: ScholarshipId,
        amount: Amount,
    ) -> LedgerResult<bool> {
        let command = ScholarshipCommand::FundScholarship(FundScholarship {
            scholarship_id,
            amount,
        });
        dispatch(
            &mut self.scholarships,
            &mut self.journal,
            caller,
            command,
            LedgerEvent::Scholarships,
        )?;
        Ok(true)
    }

    pub fn deactivate_scholarship(
        &mut self,
        caller: &CallerContext,
        scholarship_id: ScholarshipId,
    ) -> LedgerResult<bool> {
        let command =
            ScholarshipCommand::DeactivateScholarship(DeactivateScholarship { scholarship_id });
        dispatch(
            &mut self.scholarships,
            &mut self.journal,
            caller,
            command,
            LedgerEvent::Scholarships,
        )?;
        Ok(true)
    }

    pub fn activate_scholarship(
        &mut self,
        caller: &CallerContext,
        scholarship_id: ScholarshipId,
    ) -> LedgerResult<bool> {
        let command =
            ScholarshipCommand::ActivateScholarship(ActivateScholarship { scholarship_id });
        dispatch(
            &mut self.scholarships,
            &mut self.journal,
            caller,
            command,
            LedgerEvent::Scholarships,
        )?;
        Ok(true)
    }

    pub fn scholarship(&self, id: ScholarshipId) -> Option<&Scholarship> {
        self.scholarships.scholarship(id)
    }

    pub fn scholarship_count(&self) -> u64 {
        self.scholarships.scholarship_count()
    }

    /// Whether an applicant's GPA and field meet a scholarship's criteria.
    ///
    /// `None` when either record is missing. Nothing in the ledger enforces
    /// this; it is a read helper for hosts screening applications.
    pub fn scholarship_criteria_met(
        &self,
        applicant_id: ApplicantId,
        scholarship_id: ScholarshipId,
    ) -> Option<bool> {
        let applicant = self.applicants.applicant(applicant_id)?;
        let scholarship = self.scholarships.scholarship(scholarship_id)?;
        Some(scholarship.criteria_met(applicant.gpa, &applicant.field_of_study))
    }

    // ---- disbursements ----

    pub fn register_institution(
        &mut self,
        caller: &CallerContext,
        name: impl Into<String>,
        principal: impl Into<PrincipalId>,
    ) -> LedgerResult<InstitutionId> {
        let command = DisbursementCommand::RegisterInstitution(RegisterInstitution {
            name: name.into(),
            principal: principal.into(),
        });
        dispatch(
            &mut self.disbursements,
            &mut self.journal,
            caller,
            command,
            LedgerEvent::Disbursements,
        )?;
        Ok(InstitutionId::from_seq(self.disbursements.institution_count()))
    }

    pub fn create_disbursement(
        &mut self,
        caller: &CallerContext,
        application_id: ApplicationId,
        institution_id: InstitutionId,
        amount: Amount,
    ) -> LedgerResult<DisbursementId> {
        let command = DisbursementCommand::CreateDisbursement(CreateDisbursement {
            application_id,
            institution_id,
            amount,
        });
        dispatch(
            &mut self.disbursements,
            &mut self.journal,
            caller,
            command,
            LedgerEvent::Disbursements,
        )?;
        Ok(DisbursementId::from_seq(
            self.disbursements.disbursement_count(),
        ))
    }

    pub fn process_disbursement(
        &mut self,
        caller: &CallerContext,
        disbursement_id: DisbursementId,
    ) -> LedgerResult<bool> {
        let command =
            DisbursementCommand::ProcessDisbursement(ProcessDisbursement { disbursement_id });
        dispatch(
            &mut self.disbursements,
            &mut self.journal,
            caller,
            command,
            LedgerEvent::Disbursements,
        )?;
        Ok(true)
    }

    pub fn cancel_disbursement(
        &mut self,
        caller: &CallerContext,
        disbursement_id: DisbursementId,
    ) -> LedgerResult<bool> {
        let command =
            DisbursementCommand::CancelDisbursement(CancelDisbursement { disbursement_id });
        dispatch(
            &mut self.disbursements,
            &mut self.journal,
            caller,
            command,
            LedgerEvent::Disbursements,
        )?;
        Ok(true)
    }

    pub fn institution(&self, id: InstitutionId) -> Option<&Institution> {
        self.disbursements.institution(id)
    }

    pub fn disbursement(&self, id: DisbursementId) -> Option<&Disbursement> {
        self.disbursements.disbursement(id)
    }

    pub fn institution_count(&self) -> u64 {
        self.disbursements.institution_count()
    }

    pub fn disbursement_count(&self) -> u64 {
        self.disbursements.disbursement_count()
    }

    // ---- outcomes ----

    pub fn add_academic_record(
        &mut self,
        caller: &CallerContext,
        applicant_id: ApplicantId,
        semester: impl Into<String>,
        gpa: Gpa,
        credits_completed: u32,
    ) -> LedgerResult<RecordId> {
        let command = OutcomeCommand::AddAcademicRecord(AddAcademicRecord {
            applicant_id,
            semester: semester.into(),
            gpa,
            credits_completed,
        });
        dispatch(
            &mut self.outcomes,
            &mut self.journal,
            caller,
            command,
            LedgerEvent::Outcomes,
        )?;
        Ok(RecordId::from_seq(self.outcomes.record_count()))
    }

    pub fn add_milestone(
        &mut self,
        caller: &CallerContext,
        applicant_id: ApplicantId,
        description: impl Into<String>,
    ) -> LedgerResult<MilestoneId> {
        let command = OutcomeCommand::AddMilestone(AddMilestone {
            applicant_id,
            description: description.into(),
        });
        dispatch(
            &mut self.outcomes,
            &mut self.journal,
            caller,
            command,
            LedgerEvent::Outcomes,
        )?;
        Ok(MilestoneId::from_seq(self.outcomes.milestone_count()))
    }

    pub fn mark_milestone_achieved(
        &mut self,
        caller: &CallerContext,
        milestone_id: MilestoneId,
    ) -> LedgerResult<bool> {
        let command = OutcomeCommand::MarkMilestoneAchieved(MarkMilestoneAchieved { milestone_id });
        dispatch(
            &mut self.outcomes,
            &mut self.journal,
            caller,
            command,
            LedgerEvent::Outcomes,
        )?;
        Ok(true)
    }

    pub fn update_record_status(
        &mut self,
        caller: &CallerContext,
        record_id: RecordId,
        status: impl Into<RecordStatus>,
    ) -> LedgerResult<bool> {
        let command = OutcomeCommand::UpdateRecordStatus(UpdateRecordStatus {
            record_id,
            status: status.into(),
        });
        dispatch(
            &mut self.outcomes,
            &mut self.journal,
            caller,
            command,
            LedgerEvent::Outcomes,
        )?;
        Ok(true)
    }

    pub fn academic_record(&self, id: RecordId) -> Option<&AcademicRecord> {
        self.outcomes.academic_record(id)
    }

    pub fn milestone(&self, id: MilestoneId) -> Option<&Milestone> {
        self.outcomes.milestone(id)
    }

    pub fn record_count(&self) -> u64 {
        self.outcomes.record_count()
    }

    pub fn milestone_count(&self) -> u64 {
        self.outcomes.milestone_count()
    }

    fn check_event(&self, event: &LedgerEvent) -> Result<(), EventConflict> {
        match event {
            LedgerEvent::Applicants(e) => self.applicants.check_event(e),
            LedgerEvent::Scholarships(e) => self.scholarships.check_event(e),
            LedgerEvent::Disbursements(e) => self.disbursements.check_event(e),
            LedgerEvent::Outcomes(e) => self.outcomes.check_event(e),
        }
    }

    fn apply_event(&mut self, event: &LedgerEvent) {
        match event {
            LedgerEvent::Applicants(e) => self.applicants.apply(e),
            LedgerEvent::Scholarships(e) => self.scholarships.apply(e),
            LedgerEvent::Disbursements(e) => self.disbursements.apply(e),
            LedgerEvent::Outcomes(e) => self.outcomes.apply(e),
        }
    }
}

/// Run one command against a sub-ledger and journal what it decided.
///
/// Creation calls read the new id back from the sub-ledger's counter, which
/// names the row just inserted.
fn dispatch<A, C>(
    ledger: &mut A,
    journal: &mut Journal,
    caller: &CallerContext,
    command: C,
    wrap: fn(A::Event) -> LedgerEvent,
) -> LedgerResult<()>
where
    A: Aggregate<Command = Call<C>, Error = LedgerError>,
    C: Command,
{
    let operation = command.operation();
    let call = Call::new(caller.clone(), command);

    match execute(ledger, &call) {
        Ok(events) => {
            for event in events {
                let sequence_number = journal.append(wrap(event));
                debug!(operation, stream = A::NAME, sequence_number, "event journaled");
            }
            info!(
                operation,
                caller = %caller.principal(),
                block_height = caller.block_height().get(),
                "call applied"
            );
            Ok(())
        }
        Err(err) => {
            warn!(
                operation,
                caller = %caller.principal(),
                code = err.code(),
                error = %err,
                "call rejected"
            );
            Err(err)
        }
    }
}
