use serde::{Deserialize, Serialize};

use bursary_auth::{Call, CallerContext, Policy, PrincipalId, Requirement};
use bursary_core::{
    Aggregate, Amount, ApplicationId, BlockHeight, DisbursementId, Entity, EntityKind,
    EventConflict, InstitutionId, LedgerError, Table,
};
use bursary_events::{Command, Event};

/// An institution that receives disbursed funds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Institution {
    pub id: InstitutionId,
    pub name: String,
    pub principal: PrincipalId,
    /// Always true: institutions are registered by the authority directly.
    pub verified: bool,
}

impl Entity for Institution {
    type Id = InstitutionId;

    fn id(&self) -> InstitutionId {
        self.id
    }
}

/// Disbursement status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisbursementStatus {
    Pending,
    Completed,
    Cancelled,
}

impl DisbursementStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DisbursementStatus::Pending => "pending",
            DisbursementStatus::Completed => "completed",
            DisbursementStatus::Cancelled => "cancelled",
        }
    }
}

impl core::fmt::Display for DisbursementStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A disbursement of funds to an institution on behalf of an application.
///
/// `application_id` is stored as given; it is not checked against the
/// applicant sub-ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Disbursement {
    pub id: DisbursementId,
    pub application_id: ApplicationId,
    pub institution_id: InstitutionId,
    pub amount: Amount,
    pub status: DisbursementStatus,
    pub created_at: BlockHeight,
}

impl Entity for Disbursement {
    type Id = DisbursementId;

    fn id(&self) -> DisbursementId {
        self.id
    }
}

/// Command: RegisterInstitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterInstitution {
    pub name: String,
    pub principal: PrincipalId,
}

/// Command: CreateDisbursement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDisbursement {
    pub application_id: ApplicationId,
    pub institution_id: InstitutionId,
    pub amount: Amount,
}

/// Command: ProcessDisbursement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDisbursement {
    pub disbursement_id: DisbursementId,
}

/// Command: CancelDisbursement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelDisbursement {
    pub disbursement_id: DisbursementId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisbursementCommand {
    RegisterInstitution(RegisterInstitution),
    CreateDisbursement(CreateDisbursement),
    ProcessDisbursement(ProcessDisbursement),
    CancelDisbursement(CancelDisbursement),
}

impl Command for DisbursementCommand {
    fn operation(&self) -> &'static str {
        match self {
            DisbursementCommand::RegisterInstitution(_) => "register-institution",
            DisbursementCommand::CreateDisbursement(_) => "create-disbursement",
            DisbursementCommand::ProcessDisbursement(_) => "process-disbursement",
            DisbursementCommand::CancelDisbursement(_) => "cancel-disbursement",
        }
    }
}

/// Event: InstitutionRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionRegistered {
    pub institution_id: InstitutionId,
    pub name: String,
    pub principal: PrincipalId,
}

/// Event: DisbursementCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisbursementCreated {
    pub disbursement_id: DisbursementId,
    pub application_id: ApplicationId,
    pub institution_id: InstitutionId,
    pub amount: Amount,
    pub created_at: BlockHeight,
}

/// Event: DisbursementProcessed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisbursementProcessed {
    pub disbursement_id: DisbursementId,
}

/// Event: DisbursementCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisbursementCancelled {
    pub disbursement_id: DisbursementId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisbursementEvent {
    InstitutionRegistered(InstitutionRegistered),
    DisbursementCreated(DisbursementCreated),
    DisbursementProcessed(DisbursementProcessed),
    DisbursementCancelled(DisbursementCancelled),
}

impl Event for DisbursementEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DisbursementEvent::InstitutionRegistered(_) => "disbursements.institution.registered",
            DisbursementEvent::DisbursementCreated(_) => "disbursements.disbursement.created",
            DisbursementEvent::DisbursementProcessed(_) => "disbursements.disbursement.processed",
            DisbursementEvent::DisbursementCancelled(_) => "disbursements.disbursement.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }
}

/// Aggregate root: the institution & disbursement sub-ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisbursementLedger {
    policy: Policy,
    institutions: Table<Institution>,
    disbursements: Table<Disbursement>,
    version: u64,
}

impl DisbursementLedger {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            institutions: Table::new(),
            disbursements: Table::new(),
            version: 0,
        }
    }

    pub fn institution(&self, id: InstitutionId) -> Option<&Institution> {
        self.institutions.get(id)
    }

    pub fn disbursement(&self, id: DisbursementId) -> Option<&Disbursement> {
        self.disbursements.get(id)
    }

    pub fn institution_count(&self) -> u64 {
        self.institutions.count()
    }

    pub fn disbursement_count(&self) -> u64 {
        self.disbursements.count()
    }

    fn set_status(&mut self, id: DisbursementId, status: DisbursementStatus) {
        if let Some(d) = self.disbursements.get_mut(id) {
            d.status = status;
        }
    }
}

impl DisbursementLedger {
    /// Check that a recorded event could have been decided against the
    /// current state before it is applied during replay.
    pub fn check_event(&self, event: &DisbursementEvent) -> Result<(), EventConflict> {
        match event {
            DisbursementEvent::InstitutionRegistered(e) => self
                .institutions
                .expect_next(e.institution_id, EntityKind::Institution),
            DisbursementEvent::DisbursementCreated(e) => {
                self.institutions
                    .expect_row(e.institution_id, EntityKind::Institution)?;
                self.disbursements
                    .expect_next(e.disbursement_id, EntityKind::Disbursement)
            }
            DisbursementEvent::DisbursementProcessed(e) => {
                let disbursement = self
                    .disbursements
                    .expect_row(e.disbursement_id, EntityKind::Disbursement)?;
                self.institutions
                    .expect_row(disbursement.institution_id, EntityKind::Institution)
                    .map(drop)
            }
            DisbursementEvent::DisbursementCancelled(e) => self
                .disbursements
                .expect_row(e.disbursement_id, EntityKind::Disbursement)
                .map(drop),
        }
    }
}

impl Aggregate for DisbursementLedger {
    type Command = Call<DisbursementCommand>;
    type Event = DisbursementEvent;
    type Error = LedgerError;

    const NAME: &'static str = "disbursements";

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            DisbursementEvent::InstitutionRegistered(e) => {
                self.institutions.insert(Institution {
                    id: e.institution_id,
                    name: e.name.clone(),
                    principal: e.principal.clone(),
                    verified: true,
                });
            }
            DisbursementEvent::DisbursementCreated(e) => {
                self.disbursements.insert(Disbursement {
                    id: e.disbursement_id,
                    application_id: e.application_id,
                    institution_id: e.institution_id,
                    amount: e.amount,
                    status: DisbursementStatus::Pending,
                    created_at: e.created_at,
                });
            }
            DisbursementEvent::DisbursementProcessed(e) => {
                self.set_status(e.disbursement_id, DisbursementStatus::Completed);
            }
            DisbursementEvent::DisbursementCancelled(e) => {
                self.set_status(e.disbursement_id, DisbursementStatus::Cancelled);
            }
        }

        self.version += 1;
    }

    fn handle(&self, call: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let caller = &call.caller;
        match &call.command {
            DisbursementCommand::RegisterInstitution(cmd) => {
                self.handle_register_institution(caller, cmd)
            }
            DisbursementCommand::CreateDisbursement(cmd) => self.handle_create(caller, cmd),
            DisbursementCommand::ProcessDisbursement(cmd) => self.handle_process(caller, cmd),
            DisbursementCommand::CancelDisbursement(cmd) => self.handle_cancel(caller, cmd),
        }
    }
}

impl DisbursementLedger {
    fn handle_register_institution(
        &self,
        caller: &CallerContext,
        cmd: &RegisterInstitution,
    ) -> Result<Vec<DisbursementEvent>, LedgerError> {
        self.policy.authorize(caller, Requirement::Authority)?;

        Ok(vec![DisbursementEvent::InstitutionRegistered(
            InstitutionRegistered {
                institution_id: self.institutions.next_id(),
                name: cmd.name.clone(),
                principal: cmd.principal.clone(),
            },
        )])
    }

    fn handle_create(
        &self,
        caller: &CallerContext,
        cmd: &CreateDisbursement,
    ) -> Result<Vec<DisbursementEvent>, LedgerError> {
        self.institutions
            .require(cmd.institution_id, EntityKind::Institution)?;
        self.policy.authorize(caller, Requirement::Authority)?;

        Ok(vec![DisbursementEvent::DisbursementCreated(DisbursementCreated {
            disbursement_id: self.disbursements.next_id(),
            application_id: cmd.application_id,
            institution_id: cmd.institution_id,
            amount: cmd.amount,
            created_at: caller.block_height(),
        })])
    }

    // Processing and cancelling overwrite the status from any prior state,
    // including each other's terminal states.
    fn handle_process(
        &self,
        caller: &CallerContext,
        cmd: &ProcessDisbursement,
    ) -> Result<Vec<DisbursementEvent>, LedgerError> {
        let disbursement = self
            .disbursements
            .require(cmd.disbursement_id, EntityKind::Disbursement)?;
        self.institutions
            .require(disbursement.institution_id, EntityKind::Institution)?;
        self.policy.authorize(caller, Requirement::Authority)?;

        Ok(vec![DisbursementEvent::DisbursementProcessed(
            DisbursementProcessed {
                disbursement_id: cmd.disbursement_id,
            },
        )])
    }

    fn handle_cancel(
        &self,
        caller: &CallerContext,
        cmd: &CancelDisbursement,
    ) -> Result<Vec<DisbursementEvent>, LedgerError> {
        self.disbursements
            .require(cmd.disbursement_id, EntityKind::Disbursement)?;
        self.policy.authorize(caller, Requirement::Authority)?;

        Ok(vec![DisbursementEvent::DisbursementCancelled(
            DisbursementCancelled {
                disbursement_id: cmd.disbursement_id,
            },
        )])
    }
}
