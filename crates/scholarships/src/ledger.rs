use serde::{Deserialize, Serialize};

use bursary_auth::{Call, CallerContext, Policy, Requirement};
use bursary_core::{
    Aggregate, Amount, Entity, EntityKind, EventConflict, Gpa, LedgerError, ScholarshipId, Table,
};
use bursary_events::{Command, Event};

/// A scholarship fund.
///
/// `remaining_funds` starts equal to `total_amount` and only grows through
/// funding; disbursements do not draw it down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Scholarship {
    pub id: ScholarshipId,
    pub name: String,
    pub description: String,
    pub total_amount: Amount,
    pub award_amount: Amount,
    pub remaining_funds: Amount,
    pub criteria_gpa: Gpa,
    pub criteria_field: String,
    pub active: bool,
}

impl Scholarship {
    /// Whether an applicant profile satisfies this scholarship's criteria:
    /// GPA at or above the minimum and an exact field-of-study match.
    pub fn criteria_met(&self, gpa: Gpa, field_of_study: &str) -> bool {
        gpa.meets(self.criteria_gpa) && field_of_study == self.criteria_field
    }
}

impl Entity for Scholarship {
    type Id = ScholarshipId;

    fn id(&self) -> ScholarshipId {
        self.id
    }
}

/// Command: CreateScholarship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateScholarship {
    pub name: String,
    pub description: String,
    pub total_amount: Amount,
    pub award_amount: Amount,
    pub criteria_gpa: Gpa,
    pub criteria_field: String,
}

/// Command: FundScholarship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundScholarship {
    pub scholarship_id: ScholarshipId,
    pub amount: Amount,
}

/// Command: DeactivateScholarship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeactivateScholarship {
    pub scholarship_id: ScholarshipId,
}

/// Command: ActivateScholarship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateScholarship {
    pub scholarship_id: ScholarshipId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScholarshipCommand {
    CreateScholarship(CreateScholarship),
    FundScholarship(FundScholarship),
    DeactivateScholarship(DeactivateScholarship),
    ActivateScholarship(ActivateScholarship),
}

impl Command for ScholarshipCommand {
    fn operation(&self) -> &'static str {
        match self {
            ScholarshipCommand::CreateScholarship(_) => "create-scholarship",
            ScholarshipCommand::FundScholarship(_) => "fund-scholarship",
            ScholarshipCommand::DeactivateScholarship(_) => "deactivate-scholarship",
            ScholarshipCommand::ActivateScholarship(_) => "activate-scholarship",
        }
    }
}

/// Event: ScholarshipCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScholarshipCreated {
    pub scholarship_id: ScholarshipId,
    pub name: String,
    pub description: String,
    pub total_amount: Amount,
    pub award_amount: Amount,
    pub criteria_gpa: Gpa,
    pub criteria_field: String,
}

/// Event: ScholarshipFunded.
///
/// Carries the resulting balances so applying it cannot overflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScholarshipFunded {
    pub scholarship_id: ScholarshipId,
    pub amount: Amount,
    pub total_amount: Amount,
    pub remaining_funds: Amount,
}

/// Event: ScholarshipDeactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScholarshipDeactivated {
    pub scholarship_id: ScholarshipId,
}

/// Event: ScholarshipActivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScholarshipActivated {
    pub scholarship_id: ScholarshipId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScholarshipEvent {
    ScholarshipCreated(ScholarshipCreated),
    ScholarshipFunded(ScholarshipFunded),
    ScholarshipDeactivated(ScholarshipDeactivated),
    ScholarshipActivated(ScholarshipActivated),
}

impl Event for ScholarshipEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ScholarshipEvent::ScholarshipCreated(_) => "scholarships.scholarship.created",
            ScholarshipEvent::ScholarshipFunded(_) => "scholarships.scholarship.funded",
            ScholarshipEvent::ScholarshipDeactivated(_) => "scholarships.scholarship.deactivated",
            ScholarshipEvent::ScholarshipActivated(_) => "scholarships.scholarship.activated",
        }
    }

    fn version(&self) -> u32 {
        1
    }
}

/// Aggregate root: the scholarship sub-ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScholarshipLedger {
    policy: Policy,
    scholarships: Table<Scholarship>,
    version: u64,
}

impl ScholarshipLedger {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            scholarships: Table::new(),
            version: 0,
        }
    }

    pub fn scholarship(&self, id: ScholarshipId) -> Option<&Scholarship> {
        self.scholarships.get(id)
    }

    pub fn scholarship_count(&self) -> u64 {
        self.scholarships.count()
    }
}

impl ScholarshipLedger {
    /// Check that a recorded event could have been decided against the
    /// current state before it is applied during replay.
    pub fn check_event(&self, event: &ScholarshipEvent) -> Result<(), EventConflict> {
        let (id, creation) = match event {
            ScholarshipEvent::ScholarshipCreated(e) => (e.scholarship_id, true),
            ScholarshipEvent::ScholarshipFunded(e) => (e.scholarship_id, false),
            ScholarshipEvent::ScholarshipDeactivated(e) => (e.scholarship_id, false),
            ScholarshipEvent::ScholarshipActivated(e) => (e.scholarship_id, false),
        };

        if creation {
            self.scholarships.expect_next(id, EntityKind::Scholarship)
        } else {
            self.scholarships
                .expect_row(id, EntityKind::Scholarship)
                .map(drop)
        }
    }
}

impl Aggregate for ScholarshipLedger {
    type Command = Call<ScholarshipCommand>;
    type Event = ScholarshipEvent;
    type Error = LedgerError;

    const NAME: &'static str = "scholarships";

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ScholarshipEvent::ScholarshipCreated(e) => {
                self.scholarships.insert(Scholarship {
                    id: e.scholarship_id,
                    name: e.name.clone(),
                    description: e.description.clone(),
                    total_amount: e.total_amount,
                    award_amount: e.award_amount,
                    remaining_funds: e.total_amount,
                    criteria_gpa: e.criteria_gpa,
                    criteria_field: e.criteria_field.clone(),
                    active: true,
                });
            }
            ScholarshipEvent::ScholarshipFunded(e) => {
                if let Some(s) = self.scholarships.get_mut(e.scholarship_id) {
                    s.total_amount = e.total_amount;
                    s.remaining_funds = e.remaining_funds;
                }
            }
            ScholarshipEvent::ScholarshipDeactivated(e) => {
                if let Some(s) = self.scholarships.get_mut(e.scholarship_id) {
                    s.active = false;
                }
            }
            ScholarshipEvent::ScholarshipActivated(e) => {
                if let Some(s) = self.scholarships.get_mut(e.scholarship_id) {
                    s.active = true;
                }
            }
        }

        self.version += 1;
    }

    fn handle(&self, call: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let caller = &call.caller;
        match &call.command {
            ScholarshipCommand::CreateScholarship(cmd) => self.handle_create(caller, cmd),
            ScholarshipCommand::FundScholarship(cmd) => self.handle_fund(caller, cmd),
            ScholarshipCommand::DeactivateScholarship(cmd) => {
                self.handle_set_active(caller, cmd.scholarship_id, false)
            }
            ScholarshipCommand::ActivateScholarship(cmd) => {
                self.handle_set_active(caller, cmd.scholarship_id, true)
            }
        }
    }
}

impl ScholarshipLedger {
    fn handle_create(
        &self,
        caller: &CallerContext,
        cmd: &CreateScholarship,
    ) -> Result<Vec<ScholarshipEvent>, LedgerError> {
        self.policy.authorize(caller, Requirement::Authority)?;

        if cmd.total_amount < cmd.award_amount {
            return Err(LedgerError::InvalidAmount);
        }

        Ok(vec![ScholarshipEvent::ScholarshipCreated(ScholarshipCreated {
            scholarship_id: self.scholarships.next_id(),
            name: cmd.name.clone(),
            description: cmd.description.clone(),
            total_amount: cmd.total_amount,
            award_amount: cmd.award_amount,
            criteria_gpa: cmd.criteria_gpa,
            criteria_field: cmd.criteria_field.clone(),
        })])
    }

    fn handle_fund(
        &self,
        caller: &CallerContext,
        cmd: &FundScholarship,
    ) -> Result<Vec<ScholarshipEvent>, LedgerError> {
        let scholarship = self
            .scholarships
            .require(cmd.scholarship_id, EntityKind::Scholarship)?;
        self.policy.authorize(caller, Requirement::Authority)?;

        let total_amount = scholarship
            .total_amount
            .checked_add(cmd.amount)
            .ok_or(LedgerError::InvalidAmount)?;
        let remaining_funds = scholarship
            .remaining_funds
            .checked_add(cmd.amount)
            .ok_or(LedgerError::InvalidAmount)?;

        Ok(vec![ScholarshipEvent::ScholarshipFunded(ScholarshipFunded {
            scholarship_id: cmd.scholarship_id,
            amount: cmd.amount,
            total_amount,
            remaining_funds,
        })])
    }

    fn handle_set_active(
        &self,
        caller: &CallerContext,
        scholarship_id: ScholarshipId,
        active: bool,
    ) -> Result<Vec<ScholarshipEvent>, LedgerError> {
        self.scholarships
            .require(scholarship_id, EntityKind::Scholarship)?;
        self.policy.authorize(caller, Requirement::Authority)?;

        // Idempotent: toggling to the current value still succeeds.
        let event = if active {
            ScholarshipEvent::ScholarshipActivated(ScholarshipActivated { scholarship_id })
        } else {
            ScholarshipEvent::ScholarshipDeactivated(ScholarshipDeactivated { scholarship_id })
        };
        Ok(vec![event])
    }
}
