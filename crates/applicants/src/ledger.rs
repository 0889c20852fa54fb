use serde::{Deserialize, Serialize};

use bursary_auth::{Call, CallerContext, Policy, PrincipalId, Requirement};
use bursary_core::{
    Aggregate, ApplicantId, ApplicationId, BlockHeight, Entity, EntityKind, EventConflict, Gpa,
    LedgerError, ScholarshipId, Table,
};
use bursary_events::{Command, Event};

/// A registered scholarship applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Applicant {
    pub id: ApplicantId,
    /// Identity that registered (and therefore owns) this applicant.
    pub principal: PrincipalId,
    pub name: String,
    pub institution: String,
    pub gpa: Gpa,
    pub field_of_study: String,
    pub verified: bool,
}

impl Entity for Applicant {
    type Id = ApplicantId;

    fn id(&self) -> ApplicantId {
        self.id
    }
}

/// Application status.
///
/// Well-known statuses get their own variant; the authority may set any other
/// string, which is kept verbatim in `Other`. Build values with `From` so a
/// well-known string always lands on its named variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Other(String),
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Other(s) => s,
        }
    }
}

impl ApplicationStatus {
    /// Map a hand-built `Other` that spells a well-known status onto its
    /// named variant, so equal strings always compare equal.
    pub fn normalized(self) -> Self {
        Self::from(String::from(self))
    }
}

impl From<String> for ApplicationStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => ApplicationStatus::Pending,
            "approved" => ApplicationStatus::Approved,
            "rejected" => ApplicationStatus::Rejected,
            _ => ApplicationStatus::Other(value),
        }
    }
}

impl From<&str> for ApplicationStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ApplicationStatus> for String {
    fn from(value: ApplicationStatus) -> Self {
        match value {
            ApplicationStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl core::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An application by an applicant for a scholarship.
///
/// `scholarship_id` is stored as given; it is not checked against the
/// scholarship sub-ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Application {
    pub id: ApplicationId,
    pub applicant_id: ApplicantId,
    pub scholarship_id: ScholarshipId,
    pub status: ApplicationStatus,
    pub created_at: BlockHeight,
}

impl Entity for Application {
    type Id = ApplicationId;

    fn id(&self) -> ApplicationId {
        self.id
    }
}

/// Command: RegisterApplicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterApplicant {
    pub name: String,
    pub institution: String,
    pub gpa: Gpa,
    pub field_of_study: String,
}

/// Command: ApplyForScholarship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyForScholarship {
    pub applicant_id: ApplicantId,
    pub scholarship_id: ScholarshipId,
}

/// Command: VerifyApplicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyApplicant {
    pub applicant_id: ApplicantId,
}

/// Command: UpdateApplicationStatus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateApplicationStatus {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicantCommand {
    RegisterApplicant(RegisterApplicant),
    ApplyForScholarship(ApplyForScholarship),
    VerifyApplicant(VerifyApplicant),
    UpdateApplicationStatus(UpdateApplicationStatus),
}

impl Command for ApplicantCommand {
    fn operation(&self) -> &'static str {
        match self {
            ApplicantCommand::RegisterApplicant(_) => "register-applicant",
            ApplicantCommand::ApplyForScholarship(_) => "apply-for-scholarship",
            ApplicantCommand::VerifyApplicant(_) => "verify-applicant",
            ApplicantCommand::UpdateApplicationStatus(_) => "update-application-status",
        }
    }
}

/// Event: ApplicantRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantRegistered {
    pub applicant_id: ApplicantId,
    pub principal: PrincipalId,
    pub name: String,
    pub institution: String,
    pub gpa: Gpa,
    pub field_of_study: String,
}

/// Event: ApplicationSubmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmitted {
    pub application_id: ApplicationId,
    pub applicant_id: ApplicantId,
    pub scholarship_id: ScholarshipId,
    pub created_at: BlockHeight,
}

/// Event: ApplicantVerified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantVerified {
    pub applicant_id: ApplicantId,
}

/// Event: ApplicationStatusUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStatusUpdated {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicantEvent {
    ApplicantRegistered(ApplicantRegistered),
    ApplicationSubmitted(ApplicationSubmitted),
    ApplicantVerified(ApplicantVerified),
    ApplicationStatusUpdated(ApplicationStatusUpdated),
}

impl Event for ApplicantEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ApplicantEvent::ApplicantRegistered(_) => "applicants.applicant.registered",
            ApplicantEvent::ApplicationSubmitted(_) => "applicants.application.submitted",
            ApplicantEvent::ApplicantVerified(_) => "applicants.applicant.verified",
            ApplicantEvent::ApplicationStatusUpdated(_) => "applicants.application.status_updated",
        }
    }

    fn version(&self) -> u32 {
        1
    }
}

/// Aggregate root: the applicant & application sub-ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicantLedger {
    policy: Policy,
    applicants: Table<Applicant>,
    applications: Table<Application>,
    version: u64,
}

impl ApplicantLedger {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            applicants: Table::new(),
            applications: Table::new(),
            version: 0,
        }
    }

    pub fn applicant(&self, id: ApplicantId) -> Option<&Applicant> {
        self.applicants.get(id)
    }

    pub fn application(&self, id: ApplicationId) -> Option<&Application> {
        self.applications.get(id)
    }

    pub fn applicant_count(&self) -> u64 {
        self.applicants.count()
    }

    pub fn application_count(&self) -> u64 {
        self.applications.count()
    }
}

impl ApplicantLedger {
    /// Check that a recorded event could have been decided against the
    /// current state before it is applied during replay.
    pub fn check_event(&self, event: &ApplicantEvent) -> Result<(), EventConflict> {
        match event {
            ApplicantEvent::ApplicantRegistered(e) => self
                .applicants
                .expect_next(e.applicant_id, EntityKind::Applicant),
            ApplicantEvent::ApplicationSubmitted(e) => {
                self.applicants
                    .expect_row(e.applicant_id, EntityKind::Applicant)?;
                self.applications
                    .expect_next(e.application_id, EntityKind::Application)
            }
            ApplicantEvent::ApplicantVerified(e) => self
                .applicants
                .expect_row(e.applicant_id, EntityKind::Applicant)
                .map(drop),
            ApplicantEvent::ApplicationStatusUpdated(e) => self
                .applications
                .expect_row(e.application_id, EntityKind::Application)
                .map(drop),
        }
    }
}

impl Aggregate for ApplicantLedger {
    type Command = Call<ApplicantCommand>;
    type Event = ApplicantEvent;
    type Error = LedgerError;

    const NAME: &'static str = "applicants";

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ApplicantEvent::ApplicantRegistered(e) => {
                self.applicants.insert(Applicant {
                    id: e.applicant_id,
                    principal: e.principal.clone(),
                    name: e.name.clone(),
                    institution: e.institution.clone(),
                    gpa: e.gpa,
                    field_of_study: e.field_of_study.clone(),
                    verified: false,
                });
            }
            ApplicantEvent::ApplicationSubmitted(e) => {
                self.applications.insert(Application {
                    id: e.application_id,
                    applicant_id: e.applicant_id,
                    scholarship_id: e.scholarship_id,
                    status: ApplicationStatus::Pending,
                    created_at: e.created_at,
                });
            }
            ApplicantEvent::ApplicantVerified(e) => {
                if let Some(applicant) = self.applicants.get_mut(e.applicant_id) {
                    applicant.verified = true;
                }
            }
            ApplicantEvent::ApplicationStatusUpdated(e) => {
                if let Some(application) = self.applications.get_mut(e.application_id) {
                    application.status = e.status.clone();
                }
            }
        }

        self.version += 1;
    }

    fn handle(&self, call: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let caller = &call.caller;
        match &call.command {
            ApplicantCommand::RegisterApplicant(cmd) => self.handle_register(caller, cmd),
            ApplicantCommand::ApplyForScholarship(cmd) => self.handle_apply(caller, cmd),
            ApplicantCommand::VerifyApplicant(cmd) => self.handle_verify(caller, cmd),
            ApplicantCommand::UpdateApplicationStatus(cmd) => {
                self.handle_update_status(caller, cmd)
            }
        }
    }
}

impl ApplicantLedger {
    fn handle_register(
        &self,
        caller: &CallerContext,
        cmd: &RegisterApplicant,
    ) -> Result<Vec<ApplicantEvent>, LedgerError> {
        self.policy.authorize(caller, Requirement::Anyone)?;

        Ok(vec![ApplicantEvent::ApplicantRegistered(ApplicantRegistered {
            applicant_id: self.applicants.next_id(),
            principal: caller.principal().clone(),
            name: cmd.name.clone(),
            institution: cmd.institution.clone(),
            gpa: cmd.gpa,
            field_of_study: cmd.field_of_study.clone(),
        })])
    }

    fn handle_apply(
        &self,
        caller: &CallerContext,
        cmd: &ApplyForScholarship,
    ) -> Result<Vec<ApplicantEvent>, LedgerError> {
        let applicant = self
            .applicants
            .require(cmd.applicant_id, EntityKind::Applicant)?;
        self.policy
            .authorize(caller, Requirement::Owner(&applicant.principal))?;

        Ok(vec![ApplicantEvent::ApplicationSubmitted(ApplicationSubmitted {
            application_id: self.applications.next_id(),
            applicant_id: cmd.applicant_id,
            scholarship_id: cmd.scholarship_id,
            created_at: caller.block_height(),
        })])
    }

    fn handle_verify(
        &self,
        caller: &CallerContext,
        cmd: &VerifyApplicant,
    ) -> Result<Vec<ApplicantEvent>, LedgerError> {
        let applicant = self
            .applicants
            .require(cmd.applicant_id, EntityKind::Applicant)?;
        self.policy.authorize(caller, Requirement::Authority)?;

        if applicant.verified {
            return Err(LedgerError::AlreadyVerified);
        }

        Ok(vec![ApplicantEvent::ApplicantVerified(ApplicantVerified {
            applicant_id: cmd.applicant_id,
        })])
    }

    fn handle_update_status(
        &self,
        caller: &CallerContext,
        cmd: &UpdateApplicationStatus,
    ) -> Result<Vec<ApplicantEvent>, LedgerError> {
        self.applications
            .require(cmd.application_id, EntityKind::Application)?;
        self.policy.authorize(caller, Requirement::Authority)?;

        // Any status may follow any other; there is no transition graph.
        Ok(vec![ApplicantEvent::ApplicationStatusUpdated(
            ApplicationStatusUpdated {
                application_id: cmd.application_id,
                status: cmd.status.clone().normalized(),
            },
        )])
    }
}
