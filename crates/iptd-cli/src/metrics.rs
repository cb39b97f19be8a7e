use anyhow::Result;
use iptd_core::Snapshot;
use prometheus::{
    Encoder, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder,
};

/// Prometheus metrics for the HTTP server
pub struct ServerMetrics {
    registry: Registry,

    requests: IntCounterVec,
    parse_failures: IntCounter,
    counter_regressions: IntCounter,

    tables_count: IntGauge,
    chains_count: IntGaugeVec,
    rules_count: IntGaugeVec,
}

impl ServerMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("iptdelta_requests_total", "HTTP requests by endpoint"),
            &["endpoint"],
        )?;
        registry.register(Box::new(requests.clone()))?;

        let parse_failures = IntCounter::with_opts(Opts::new(
            "iptdelta_parse_failures_total",
            "iptables-save outputs that failed to parse",
        ))?;
        registry.register(Box::new(parse_failures.clone()))?;

        let counter_regressions = IntCounter::with_opts(Opts::new(
            "iptdelta_counter_regressions_total",
            "Diffs aborted because counters moved backwards",
        ))?;
        registry.register(Box::new(counter_regressions.clone()))?;

        let tables_count = IntGauge::with_opts(Opts::new(
            "iptdelta_tables_count",
            "Tables in the most recent snapshot",
        ))?;
        registry.register(Box::new(tables_count.clone()))?;

        let chains_count = IntGaugeVec::new(
            Opts::new(
                "iptdelta_chains_count",
                "Chains per table in the most recent snapshot",
            ),
            &["table_name"],
        )?;
        registry.register(Box::new(chains_count.clone()))?;

        let rules_count = IntGaugeVec::new(
            Opts::new(
                "iptdelta_rules_count",
                "Rules per table in the most recent snapshot",
            ),
            &["table_name"],
        )?;
        registry.register(Box::new(rules_count.clone()))?;

        Ok(Self {
            registry,
            requests,
            parse_failures,
            counter_regressions,
            tables_count,
            chains_count,
            rules_count,
        })
    }

    pub fn record_request(&self, endpoint: &str) {
        self.requests.with_label_values(&[endpoint]).inc();
    }

    pub fn record_parse_failure(&self) {
        self.parse_failures.inc();
    }

    pub fn record_counter_regression(&self) {
        self.counter_regressions.inc();
    }

    /// Update table/chain/rule gauges from a freshly parsed snapshot
    pub fn observe_snapshot(&self, snapshot: &Snapshot) {
        self.tables_count.set(snapshot.tables.len() as i64);

        for (name, table) in &snapshot.tables {
            self.chains_count
                .with_label_values(&[name])
                .set(table.chains.len() as i64);

            let rules: usize = table.chains.values().map(|chain| chain.rules.len()).sum();
            self.rules_count
                .with_label_values(&[name])
                .set(rules as i64);
        }
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iptd_core::parse;

    #[test]
    fn test_metrics_creation() {
        assert!(ServerMetrics::new().is_ok());
    }

    #[test]
    fn test_metrics_rendering() {
        let metrics = ServerMetrics::new().unwrap();

        metrics.record_request("/iptables");
        metrics.record_parse_failure();

        let snapshot = parse(
            "*nat\n:PREROUTING ACCEPT [0:0]\n[5:63] -A PREROUTING -m addrtype --dst-type LOCAL -j DOCKER\nCOMMIT\n",
        )
        .unwrap();
        metrics.observe_snapshot(&snapshot);

        let output = metrics.render().unwrap();
        assert!(output.contains("iptdelta_requests_total"));
        assert!(output.contains("iptdelta_parse_failures_total"));
        assert!(output.contains("iptdelta_tables_count 1"));
        assert!(output.contains("iptdelta_rules_count{table_name=\"nat\"} 1"));
    }
}
