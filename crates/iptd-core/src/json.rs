use serde_json::{Map, Value, json};

use crate::snapshot::Snapshot;

/// Render a snapshot (full or diff) as the nested tables/chains/rules
/// document. Chains with no rules and tables with no remaining chains are
/// omitted rather than emitted as empty containers.
pub fn to_value(snapshot: &Snapshot) -> Value {
    let mut tables = Map::new();

    for (table_name, table) in &snapshot.tables {
        let mut chains = Map::new();

        for (chain_name, chain) in &table.chains {
            if chain.rules.is_empty() {
                continue;
            }
            chains.insert(chain_name.clone(), json!({ "rules": chain.rules }));
        }

        if chains.is_empty() {
            continue;
        }
        tables.insert(table_name.clone(), json!({ "chains": chains }));
    }

    json!({ "tables": tables })
}

/// Serialize for transport. Escaping is serde_json's, so table or chain
/// names with embedded quotes cannot corrupt the document.
pub fn to_json(snapshot: &Snapshot) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&to_value(snapshot))
}

pub fn to_json_pretty(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&to_value(snapshot))
}
