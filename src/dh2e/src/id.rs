//! Identifier generation for embedded item records.

/// Sequential identifier generator, constructed once per migration run and
/// passed to every record constructor.
///
/// Identifiers follow the `ski11ta1ent0001` pattern already present in
/// migrated data. The sequence is deterministic for a fixed processing
/// order, which keeps repeated runs byte-identical.
#[derive(Debug, Default)]
pub struct IdGenerator {
    counter: u32,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next identifier in the sequence.
    pub fn next_id(&mut self) -> String {
        self.counter += 1;
        format!("ski11ta1ent{:04}", self.counter)
    }
}
