/// A request to mutate a sub-ledger.
///
/// Commands represent **intent** and are transient; a command that passes its
/// checks becomes one or more events, which are the persisted facts. Rejected
/// commands leave no trace in state or journal.
pub trait Command: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// External operation name (e.g. "register-applicant"), used in logs.
    fn operation(&self) -> &'static str;
}
