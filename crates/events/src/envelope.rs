use serde::{Deserialize, Serialize};

/// Envelope for an event, containing journal metadata.
///
/// This is the unit the engine appends to its journal.
///
/// Notes:
/// - **Append-only**: `sequence_number` is contiguous and 1-based across the
///   whole journal.
/// - `stream` names the sub-ledger that produced the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    sequence_number: u64,
    stream: String,
    event_type: String,
    payload: E,
}

impl<E: crate::Event> EventEnvelope<E> {
    pub fn new(sequence_number: u64, stream: impl Into<String>, payload: E) -> Self {
        Self {
            sequence_number,
            stream: stream.into(),
            event_type: payload.event_type().to_string(),
            payload,
        }
    }
}

impl<E> EventEnvelope<E> {
    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Event;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Pinged {
        n: u32,
    }

    impl Event for Pinged {
        fn event_type(&self) -> &'static str {
            "test.ping.pinged"
        }

        fn version(&self) -> u32 {
            1
        }
    }

    #[test]
    fn envelope_captures_event_type_from_payload() {
        let env = EventEnvelope::new(7, "test", Pinged { n: 3 });
        assert_eq!(env.sequence_number(), 7);
        assert_eq!(env.stream(), "test");
        assert_eq!(env.event_type(), "test.ping.pinged");
        assert_eq!(env.payload(), &Pinged { n: 3 });
    }

    #[test]
    fn envelope_json_shape() {
        let env = EventEnvelope::new(1, "test", Pinged { n: 3 });
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "sequence_number": 1,
                "stream": "test",
                "event_type": "test.ping.pinged",
                "payload": { "n": 3 }
            })
        );
    }
}
