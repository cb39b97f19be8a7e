use crate::error::DiffError;
use crate::snapshot::{Chain, Rule, Snapshot, Table};

/// Compute the counter movement from `older` to `newer`.
///
/// Tables, chains, and rules that `older` never saw are copied verbatim;
/// matched rules contribute the difference of their counters, or nothing
/// when the counters did not move. Chains and tables left with no rules
/// are omitted from the result. Neither input is modified.
pub fn diff(older: &Snapshot, newer: &Snapshot) -> Result<Snapshot, DiffError> {
    let mut result = Snapshot::new();

    for (table_name, table) in &newer.tables {
        let mut diff_table = Table::new(table_name);

        for (chain_name, chain) in &table.chains {
            let baseline = older
                .tables
                .get(table_name)
                .and_then(|t| t.chains.get(chain_name));

            let rules = match baseline {
                // The chain (or its whole table) appeared since `older`:
                // all of its activity is new.
                None => chain.rules.clone(),
                Some(base) => diff_rules(table_name, chain_name, base, chain)?,
            };

            if rules.is_empty() {
                continue;
            }

            let mut diff_chain = Chain::new(chain_name, chain.accept_by_default);
            diff_chain.rules = rules;
            diff_table.chains.insert(chain_name.clone(), diff_chain);
        }

        if diff_table.chains.is_empty() {
            continue;
        }
        result.tables.insert(table_name.clone(), diff_table);
    }

    Ok(result)
}

fn diff_rules(
    table_name: &str,
    chain_name: &str,
    base: &Chain,
    chain: &Chain,
) -> Result<Vec<Rule>, DiffError> {
    let mut rules = Vec::new();

    for rule in &chain.rules {
        let Some(prev) = base.find(&rule.args, &rule.target) else {
            rules.push(rule.clone());
            continue;
        };

        if prev.pkt_count == rule.pkt_count {
            continue;
        }

        // A counter that shrank means the firewall reloaded and the
        // counters restarted; a delta would be meaningless.
        let (pkt_count, bytes_count) = rule
            .pkt_count
            .checked_sub(prev.pkt_count)
            .zip(rule.bytes_count.checked_sub(prev.bytes_count))
            .ok_or_else(|| DiffError::CounterRegression {
                table: table_name.to_string(),
                chain: chain_name.to_string(),
                args: rule.args.clone(),
                target: rule.target.clone(),
                older: prev.pkt_count,
                newer: rule.pkt_count,
            })?;

        rules.push(Rule::new(&rule.args, &rule.target, pkt_count, bytes_count));
    }

    Ok(rules)
}
