use regex::Regex;
use std::sync::LazyLock;

use crate::error::ParseError;
use crate::snapshot::{Chain, Rule, Snapshot, Table};

/// Counted append line: `[pkt:bytes] -A <chain> <rest>`. The `-j` boundary
/// inside `<rest>` is located separately, because the target is everything
/// after the last ` -j ` on the line.
static RULE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(\d+):(\d+)\] -A (\S+)(?: (.*))?$").unwrap());

/// Parse `iptables-save -c` output into a [`Snapshot`].
///
/// Single pass over the lines; the first malformed or inconsistent line
/// aborts the whole parse and no partial snapshot is returned.
pub fn parse(text: &str) -> Result<Snapshot, ParseError> {
    let mut snapshot = Snapshot::new();
    // Table opened by `*name` and not yet closed by COMMIT.
    let mut current: Option<String> = None;

    for line in text.lines() {
        // banners and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('*') {
            if snapshot.tables.contains_key(name) {
                return Err(ParseError::DuplicateTable(name.to_string()));
            }
            snapshot.tables.insert(name.to_string(), Table::new(name));
            current = Some(name.to_string());
        } else if let Some(decl) = line.strip_prefix(':') {
            let table = current_table(&mut snapshot, &current, line)?;
            let (name, rest) = decl
                .split_once(' ')
                .ok_or_else(|| ParseError::MalformedLine(line.to_string()))?;
            // `:NAME POLICY [counters]` - the counter placeholder is ignored
            let policy = rest.split_once(' ').map_or(rest, |(policy, _)| policy);

            if table.chains.contains_key(name) {
                return Err(ParseError::DuplicateChain {
                    table: table.name.clone(),
                    chain: name.to_string(),
                });
            }
            table
                .chains
                .insert(name.to_string(), Chain::new(name, policy == "ACCEPT"));
        } else if line == "COMMIT" {
            current = None;
        } else {
            let caps = RULE_LINE
                .captures(line)
                .ok_or_else(|| ParseError::MalformedLine(line.to_string()))?;
            let pkt_count = parse_counter(&caps[1], line)?;
            let bytes_count = parse_counter(&caps[2], line)?;
            let chain_name = &caps[3];
            let rest = caps.get(4).map_or("", |m| m.as_str());
            let (args, target) = split_target(rest)
                .ok_or_else(|| ParseError::MalformedLine(line.to_string()))?;

            let table = current_table(&mut snapshot, &current, line)?;
            let table_name = table.name.clone();
            let chain =
                table
                    .chains
                    .get_mut(chain_name)
                    .ok_or_else(|| ParseError::UnknownChain {
                        table: table_name,
                        chain: chain_name.to_string(),
                    })?;
            chain
                .rules
                .push(Rule::new(args, target, pkt_count, bytes_count));
        }
    }

    Ok(snapshot)
}

fn current_table<'a>(
    snapshot: &'a mut Snapshot,
    current: &Option<String>,
    line: &str,
) -> Result<&'a mut Table, ParseError> {
    current
        .as_ref()
        .and_then(|name| snapshot.tables.get_mut(name))
        .ok_or_else(|| ParseError::NoCurrentTable(line.to_string()))
}

fn parse_counter(value: &str, line: &str) -> Result<u64, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidCounter {
        value: value.to_string(),
        line: line.to_string(),
    })
}

/// Split `<args> -j <target>` at the last ` -j ` boundary. A rule with no
/// match arguments is written as a bare `-j <target>`.
fn split_target(rest: &str) -> Option<(&str, &str)> {
    if let Some((args, target)) = rest.rsplit_once(" -j ") {
        return Some((args, target));
    }
    rest.strip_prefix("-j ").map(|target| ("", target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{SAVE_V1, SAVE_V2};

    #[test]
    fn test_parse_save_output() {
        let snapshot = parse(SAVE_V1).unwrap();

        assert_eq!(snapshot.tables.len(), 2);
        assert!(snapshot.tables.contains_key("nat"));
        assert!(snapshot.tables.contains_key("filter"));

        let nat = &snapshot.tables["nat"];
        assert_eq!(nat.chains.len(), 5);
        for chain in ["PREROUTING", "INPUT", "OUTPUT", "POSTROUTING", "DOCKER"] {
            assert!(nat.chains.contains_key(chain), "missing chain {chain}");
        }

        let rules = &nat.chains["PREROUTING"].rules;
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].pkt_count, 5);
        assert_eq!(rules[0].bytes_count, 63);
        assert_eq!(rules[0].args, "-m addrtype --dst-type LOCAL");
        assert_eq!(rules[0].target, "DOCKER");
    }

    #[test]
    fn test_parse_policy_flag() {
        let snapshot = parse(SAVE_V1).unwrap();
        let filter = &snapshot.tables["filter"];

        assert!(filter.chains["INPUT"].accept_by_default);
        assert!(!filter.chains["FORWARD"].accept_by_default);
        assert!(!filter.chains["DOCKER"].accept_by_default);
    }

    #[test]
    fn test_parse_empty_args() {
        let snapshot = parse(SAVE_V1).unwrap();
        let forward = &snapshot.tables["filter"].chains["FORWARD"];

        assert_eq!(forward.rules[0].args, "");
        assert_eq!(forward.rules[0].target, "DOCKER-USER");
    }

    #[test]
    fn test_parse_rule_order_preserved() {
        let snapshot = parse(SAVE_V1).unwrap();
        let targets: Vec<&str> = snapshot.tables["filter"].chains["FORWARD"]
            .rules
            .iter()
            .map(|rule| rule.target.as_str())
            .collect();

        assert_eq!(
            targets,
            [
                "DOCKER-USER",
                "DOCKER-ISOLATION-STAGE-1",
                "ACCEPT",
                "DOCKER",
                "ACCEPT",
                "ACCEPT",
            ]
        );
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse("").unwrap().tables.is_empty());
        assert!(parse("# comment\n\n# another banner\n").unwrap().tables.is_empty());
    }

    #[test]
    fn test_parse_target_with_options() {
        let input = "*nat\n:PREROUTING ACCEPT [0:0]\n\
            [3:120] -A PREROUTING -p tcp --dport 80 -j DNAT --to-destination 10.0.0.1:8080\nCOMMIT\n";
        let snapshot = parse(input).unwrap();

        let rule = &snapshot.tables["nat"].chains["PREROUTING"].rules[0];
        assert_eq!(rule.args, "-p tcp --dport 80");
        assert_eq!(rule.target, "DNAT --to-destination 10.0.0.1:8080");
    }

    #[test]
    fn test_parse_splits_at_last_j_token() {
        let input = "*filter\n:INPUT ACCEPT [0:0]\n\
            [0:0] -A INPUT -m comment --comment \"counts -j jumps\" -j DROP\nCOMMIT\n";
        let snapshot = parse(input).unwrap();

        let rule = &snapshot.tables["filter"].chains["INPUT"].rules[0];
        assert_eq!(rule.args, "-m comment --comment \"counts -j jumps\"");
        assert_eq!(rule.target, "DROP");
    }

    #[test]
    fn test_parse_duplicate_table() {
        let input = "*nat\nCOMMIT\n*nat\nCOMMIT\n";
        assert!(matches!(
            parse(input),
            Err(ParseError::DuplicateTable(name)) if name == "nat"
        ));
    }

    #[test]
    fn test_parse_duplicate_chain() {
        let input = "*nat\n:PREROUTING ACCEPT [0:0]\n:PREROUTING ACCEPT [0:0]\n";
        assert!(matches!(
            parse(input),
            Err(ParseError::DuplicateChain { table, chain }) if table == "nat" && chain == "PREROUTING"
        ));
    }

    #[test]
    fn test_parse_chain_without_table() {
        assert!(matches!(
            parse(":INPUT ACCEPT [0:0]\n"),
            Err(ParseError::NoCurrentTable(_))
        ));
    }

    #[test]
    fn test_parse_rule_without_table() {
        // COMMIT closed the table, so the trailing rule has nowhere to go
        let input = "*nat\n:PREROUTING ACCEPT [0:0]\nCOMMIT\n[0:0] -A PREROUTING -j DROP\n";
        assert!(matches!(
            parse(input),
            Err(ParseError::NoCurrentTable(_))
        ));
    }

    #[test]
    fn test_parse_unknown_chain() {
        let input = "*nat\n:PREROUTING ACCEPT [0:0]\n[0:0] -A DOCKER -i docker0 -j RETURN\n";
        assert!(matches!(
            parse(input),
            Err(ParseError::UnknownChain { table, chain }) if table == "nat" && chain == "DOCKER"
        ));
    }

    #[test]
    fn test_parse_malformed_line() {
        let input = "*filter\n:INPUT ACCEPT [0:0]\nnot a rule line\n";
        assert!(matches!(parse(input), Err(ParseError::MalformedLine(_))));
    }

    #[test]
    fn test_parse_rule_missing_target() {
        let input = "*filter\n:INPUT ACCEPT [0:0]\n[0:0] -A INPUT -p tcp\n";
        assert!(matches!(parse(input), Err(ParseError::MalformedLine(_))));
    }

    #[test]
    fn test_parse_counter_overflow() {
        let input =
            "*filter\n:INPUT ACCEPT [0:0]\n[99999999999999999999999:0] -A INPUT -j DROP\nCOMMIT\n";
        assert!(matches!(
            parse(input),
            Err(ParseError::InvalidCounter { value, .. }) if value == "99999999999999999999999"
        ));
    }

    #[test]
    fn test_parse_non_numeric_counter_does_not_match_rule_shape() {
        let input = "*filter\n:INPUT ACCEPT [0:0]\n[a:b] -A INPUT -j DROP\n";
        assert!(matches!(parse(input), Err(ParseError::MalformedLine(_))));
    }

    #[test]
    fn test_parse_second_capture() {
        let snapshot = parse(SAVE_V2).unwrap();
        let docker = &snapshot.tables["nat"].chains["DOCKER"];

        assert_eq!(docker.rules.len(), 4);
        assert_eq!(docker.rules[1].args, "-i docker1");
        assert_eq!(docker.rules[1].pkt_count, 5);
        assert_eq!(docker.rules[1].bytes_count, 9);
    }
}
