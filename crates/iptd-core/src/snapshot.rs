use serde::Serialize;
use std::collections::BTreeMap;

/// A parsed `iptables-save` dump: tables keyed by name.
///
/// Snapshots are built once by the parser and never mutated afterwards;
/// the differ reads two of them and produces a fresh one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub chains: BTreeMap<String, Chain>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub name: String,
    pub accept_by_default: bool,
    /// Rules in declaration order. Order matters to firewall evaluation,
    /// so it is preserved even though the differ does not depend on it.
    pub rules: Vec<Rule>,
}

/// One counted rule. `args` is the verbatim match/option span between the
/// chain name and the `-j` target; it is not parsed any further.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub args: String,
    pub target: String,
    #[serde(rename = "pktCount")]
    pub pkt_count: u64,
    #[serde(rename = "bytesCount")]
    pub bytes_count: u64,
}

impl Snapshot {
    pub fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }
}

impl Table {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            chains: BTreeMap::new(),
        }
    }
}

impl Chain {
    pub fn new(name: &str, accept_by_default: bool) -> Self {
        Self {
            name: name.to_string(),
            accept_by_default,
            rules: vec![],
        }
    }

    /// First rule matching (args, target), in declaration order.
    ///
    /// Rules carry no identity beyond args and target, so duplicates are
    /// indistinguishable and the first one always wins.
    pub fn find(&self, args: &str, target: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|rule| rule.args == args && rule.target == target)
    }
}

impl Rule {
    pub fn new(args: &str, target: &str, pkt_count: u64, bytes_count: u64) -> Self {
        Self {
            args: args.to_string(),
            target: target.to_string(),
            pkt_count,
            bytes_count,
        }
    }
}
