use thiserror::Error;

/// Parse-time failures. All are terminal: the first one aborts the parse
/// and no partial snapshot is returned.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("table already exists: {0}")]
    DuplicateTable(String),

    #[error("chain already exists: {table}/{chain}")]
    DuplicateChain { table: String, chain: String },

    #[error("no table open at line: {0}")]
    NoCurrentTable(String),

    #[error("rule references undeclared chain {table}/{chain}")]
    UnknownChain { table: String, chain: String },

    #[error("invalid line: {0}")]
    MalformedLine(String),

    #[error("invalid counter {value} in line: {line}")]
    InvalidCounter { value: String, line: String },
}

/// Differ failures.
#[derive(Debug, Error)]
pub enum DiffError {
    /// A matched rule's counter moved backwards between the snapshots,
    /// which means the firewall counters were reset (e.g. by a reload).
    /// The whole diff is aborted; recovery policy belongs to the caller.
    #[error(
        "counter went backwards for {table}/{chain} `{args} -j {target}`: {older} -> {newer}"
    )]
    CounterRegression {
        table: String,
        chain: String,
        args: String,
        target: String,
        older: u64,
        newer: u64,
    },
}
