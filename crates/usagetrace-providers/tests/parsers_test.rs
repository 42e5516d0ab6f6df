use std::path::Path;
use usagetrace_providers::{
    ClaudeParser, CodexParser, GeminiParser, PricingMode, SessionParser,
};
use usagetrace_testing::assertions::{assert_cost_eq, log_bodies, metric_values};
use usagetrace_types::parse_timestamp;

#[test]
fn test_claude_two_line_session() {
    let parser = ClaudeParser::new("tests/samples", PricingMode::Auto);
    let result = parser
        .parse_file(Path::new("tests/samples/claude_session.jsonl"))
        .expect("claude sample should parse");

    assert_eq!(result.session_id, "claude_session");
    assert_eq!(result.logs.len(), 2);
    assert_eq!(result.record_count, 2);
    assert_eq!(log_bodies(&result.logs), vec!["claude_code.api_request"; 2]);
    assert!(result.logs.iter().all(|l| l.service_name == "claude-code"));

    let metric = "claude_code.token.usage";
    assert_eq!(metric_values(&result.metrics, metric, Some("input")), vec![1000.0, 800.0]);
    assert_eq!(metric_values(&result.metrics, metric, Some("output")), vec![500.0, 300.0]);
    assert_eq!(metric_values(&result.metrics, metric, Some("cacheRead")), vec![1200.0]);
    assert!(metric_values(&result.metrics, metric, Some("cacheCreation")).is_empty());
    assert_eq!(metric_values(&result.metrics, "claude_code.cost.usage", None), vec![0.05, 0.03]);

    // The user line that precedes the first assistant reply opens the range
    assert_eq!(result.first_time, parse_timestamp("2025-06-01T10:00:00Z"));
    assert_eq!(result.last_time, parse_timestamp("2025-06-01T10:01:10Z"));

    let first = &result.logs[0];
    assert_eq!(first.log_attributes["request.id"], "req_01");
    assert_eq!(first.log_attributes["git.branch"], "main");
    assert_eq!(first.log_attributes["session.id"], "claude_session");
}

#[test]
fn test_codex_cumulative_snapshots_become_deltas() {
    let path = Path::new(
        "tests/samples/rollout-2025-06-01T10-00-00-0197a3b2-1c4d-7e8f-9a0b-1c2d3e4f5a6b.jsonl",
    );
    let parser = CodexParser::new("tests/samples", PricingMode::Auto);
    let result = parser.parse_file(path).expect("codex sample should parse");

    assert_eq!(result.session_id, "0197a3b2-1c4d-7e8f-9a0b-1c2d3e4f5a6b");

    let metric = "codex.token.usage";
    assert_eq!(metric_values(&result.metrics, metric, Some("input")), vec![500.0, 300.0]);
    assert_eq!(metric_values(&result.metrics, metric, Some("output")), vec![200.0, 150.0]);
    assert_eq!(metric_values(&result.metrics, metric, Some("cachedInput")), vec![50.0, 50.0]);
    assert_eq!(metric_values(&result.metrics, metric, Some("reasoningOutput")), vec![10.0, 10.0]);
    assert_eq!(metric_values(&result.metrics, "codex.cost.usage", None).len(), 2);

    assert_eq!(
        log_bodies(&result.logs),
        vec!["codex.session_start", "codex.user_prompt", "codex.agent_message"]
    );
    // meta, prompt, first usage, agent message, second usage
    assert_eq!(result.record_count, 5);

    // Range spans every envelope, including the trailing response_item
    assert_eq!(result.first_time, parse_timestamp("2025-06-01T10:00:00Z"));
    assert_eq!(result.last_time, parse_timestamp("2025-06-01T10:00:31Z"));

    let cost = result
        .metrics
        .iter()
        .find(|m| m.metric_name == "codex.cost.usage")
        .unwrap();
    assert_eq!(cost.attributes["model"], "gpt-5-codex");
    assert_eq!(cost.attributes["cost.source"], "calculated");
}

#[test]
fn test_gemini_last_updated_is_authoritative() {
    let path = Path::new("tests/samples/gemini/5f1a9c/chats/session-2025-06-01T10-00-4b7e.json");
    let parser = GeminiParser::new("tests/samples/gemini", PricingMode::Auto);
    let result = parser.parse_file(path).expect("gemini sample should parse");

    assert_eq!(result.session_id, "4b7e2c11-8f3a-4d2e-b6c5-9a0d1e2f3a4b");
    assert_eq!(result.first_time, parse_timestamp("2025-06-01T10:00:00Z"));
    // Last message is at 10:00:10 but the session header says 11:30
    assert_eq!(result.last_time, parse_timestamp("2025-06-01T11:30:00Z"));

    assert_eq!(result.logs.len(), 3);
    assert_eq!(result.record_count, 3);

    let metric = "gemini_cli.token.usage";
    assert_eq!(metric_values(&result.metrics, metric, Some("input")), vec![2000.0]);
    assert_eq!(metric_values(&result.metrics, metric, Some("cached")), vec![500.0]);
    assert_eq!(metric_values(&result.metrics, metric, Some("thoughts")), vec![120.0]);
    assert!(metric_values(&result.metrics, metric, Some("tool")).is_empty());

    // (2000 - 500) * 1.25 + 500 * 0.3125 + (300 + 120) * 10, per million
    let expected = (1500.0 * 1.25 + 500.0 * 0.3125 + 420.0 * 10.0) / 1_000_000.0;
    let cost = metric_values(&result.metrics, "gemini_cli.cost.usage", None);
    assert_eq!(cost.len(), 1);
    assert_cost_eq(cost[0], expected);
}

#[test]
fn test_discovery_per_source() {
    let codex = CodexParser::new("tests/samples", PricingMode::Auto);
    let files = codex.find_session_files().unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].to_string_lossy().contains("rollout-2025-06-01"));

    let gemini = GeminiParser::new("tests/samples/gemini", PricingMode::Auto);
    assert_eq!(gemini.find_session_files().unwrap().len(), 1);

    let missing = ClaudeParser::new("tests/samples/does-not-exist", PricingMode::Auto);
    assert!(missing.find_session_files().unwrap().is_empty());
}

#[test]
fn test_display_mode_without_declared_cost_reports_zero() {
    let path = Path::new(
        "tests/samples/rollout-2025-06-01T10-00-00-0197a3b2-1c4d-7e8f-9a0b-1c2d3e4f5a6b.jsonl",
    );
    let parser = CodexParser::new("tests/samples", PricingMode::Display);
    let result = parser.parse_file(path).unwrap();

    assert_eq!(metric_values(&result.metrics, "codex.cost.usage", None), vec![0.0, 0.0]);
}
