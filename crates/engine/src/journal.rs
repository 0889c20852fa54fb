//! Append-only journal of every event the engine has applied.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use bursary_applicants::{ApplicantEvent, ApplicantLedger};
use bursary_core::{Aggregate, EventConflict};
use bursary_disbursements::{DisbursementEvent, DisbursementLedger};
use bursary_events::{Event, EventEnvelope};
use bursary_outcomes::{OutcomeEvent, OutcomeLedger};
use bursary_scholarships::{ScholarshipEvent, ScholarshipLedger};

/// Any event produced by one of the four sub-ledgers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEvent {
    Applicants(ApplicantEvent),
    Scholarships(ScholarshipEvent),
    Disbursements(DisbursementEvent),
    Outcomes(OutcomeEvent),
}

impl LedgerEvent {
    /// Name of the sub-ledger stream this event belongs to.
    pub fn stream(&self) -> &'static str {
        match self {
            LedgerEvent::Applicants(_) => ApplicantLedger::NAME,
            LedgerEvent::Scholarships(_) => ScholarshipLedger::NAME,
            LedgerEvent::Disbursements(_) => DisbursementLedger::NAME,
            LedgerEvent::Outcomes(_) => OutcomeLedger::NAME,
        }
    }
}

impl Event for LedgerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::Applicants(e) => e.event_type(),
            LedgerEvent::Scholarships(e) => e.event_type(),
            LedgerEvent::Disbursements(e) => e.event_type(),
            LedgerEvent::Outcomes(e) => e.event_type(),
        }
    }

    fn version(&self) -> u32 {
        match self {
            LedgerEvent::Applicants(e) => e.version(),
            LedgerEvent::Scholarships(e) => e.version(),
            LedgerEvent::Disbursements(e) => e.version(),
            LedgerEvent::Outcomes(e) => e.version(),
        }
    }
}

/// Errors raised while rebuilding an engine from a journal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("journal gap: expected sequence number {expected}, found {found}")]
    OutOfSequence { expected: u64, found: u64 },

    #[error("event {sequence_number} ({event_type}) is filed under stream '{stream}'")]
    StreamMismatch {
        sequence_number: u64,
        stream: String,
        event_type: String,
    },

    #[error(
        "event {sequence_number} is recorded as '{recorded}' but carries a '{actual}' payload"
    )]
    EventTypeMismatch {
        sequence_number: u64,
        recorded: String,
        actual: String,
    },

    #[error("event {sequence_number} cannot be applied: {conflict}")]
    Conflict {
        sequence_number: u64,
        #[source]
        conflict: EventConflict,
    },
}

/// Ordered, contiguous event log. Sequence numbers start at 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Journal {
    entries: Vec<EventEnvelope<LedgerEvent>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return the sequence number it was filed under.
    pub fn append(&mut self, event: LedgerEvent) -> u64 {
        let sequence_number = self.next_sequence_number();
        let stream = event.stream();
        self.entries
            .push(EventEnvelope::new(sequence_number, stream, event));
        sequence_number
    }

    /// Check that `envelope` is the next entry this journal would accept.
    pub fn check_next(&self, envelope: &EventEnvelope<LedgerEvent>) -> Result<(), ReplayError> {
        let expected = self.next_sequence_number();
        if envelope.sequence_number() != expected {
            return Err(ReplayError::OutOfSequence {
                expected,
                found: envelope.sequence_number(),
            });
        }

        if envelope.stream() != envelope.payload().stream() {
            return Err(ReplayError::StreamMismatch {
                sequence_number: envelope.sequence_number(),
                stream: envelope.stream().to_string(),
                event_type: envelope.payload().event_type().to_string(),
            });
        }

        if envelope.event_type() != envelope.payload().event_type() {
            return Err(ReplayError::EventTypeMismatch {
                sequence_number: envelope.sequence_number(),
                recorded: envelope.event_type().to_string(),
                actual: envelope.payload().event_type().to_string(),
            });
        }

        Ok(())
    }

    pub fn entries(&self) -> &[EventEnvelope<LedgerEvent>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn next_sequence_number(&self) -> u64 {
        self.entries.len() as u64 + 1
    }
}
