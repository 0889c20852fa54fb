//! Outcomes module (academic records and milestones, event-sourced).

pub mod ledger;

pub use ledger::{
    AcademicRecord, AcademicRecordAdded, AddAcademicRecord, AddMilestone, MarkMilestoneAchieved,
    Milestone, MilestoneAchieved, MilestoneAdded, OutcomeCommand, OutcomeEvent, OutcomeLedger,
    RecordStatus, RecordStatusUpdated, UpdateRecordStatus,
};
