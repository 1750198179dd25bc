//! Output format contract tests
//! Field order, host collapsing and agreement between text, JSON Lines and CSV

use portscribe::{
    network::Port,
    output::{csv_headers, FIELDS, FIELD_COUNT},
    write_csv_output, write_host_output, write_json_output, HostResult,
};
use proptest::prelude::*;
use serde_json::Value;

fn example() -> HostResult {
    HostResult::new("example.com", "93.184.216.1", vec![Port::tcp(80), Port::tcp(443)])
}

fn json_lines(result: &HostResult) -> Vec<Value> {
    let mut out = Vec::new();
    write_json_output(result, &mut out).unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn csv_rows(result: &HostResult, header: bool) -> Vec<Vec<String>> {
    let mut out = Vec::new();
    write_csv_output(result, header, &mut out).unwrap();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(out.as_slice());
    let rows: Vec<Vec<String>> = reader
        .records()
        .map(|record| record.unwrap().iter().map(str::to_string).collect())
        .collect();
    rows
}

/// Flatten a JSON record into CSV-comparable strings in header order
fn normalize_json(value: &Value) -> Vec<String> {
    csv_headers()
        .iter()
        .map(|key| match (*key, value.get(*key)) {
            ("host", None) | ("cdn-name", None) => String::new(),
            ("cdn", None) => "false".to_string(),
            ("port", Some(port)) => port["port"].to_string(),
            (_, Some(Value::String(s))) => s.clone(),
            (_, Some(other)) => other.to_string(),
            (key, None) => panic!("missing key {key}"),
        })
        .collect()
}

#[test]
fn test_csv_header_has_one_token_per_field() {
    assert_eq!(csv_headers().len(), FIELD_COUNT);
    assert_eq!(FIELDS.len(), FIELD_COUNT);

    let rows = csv_rows(&example(), true);
    assert_eq!(rows[0], vec!["host", "ip", "port", "cdn", "cdn-name", "timestamp"]);
    assert!(rows.iter().all(|row| row.len() == FIELD_COUNT));
}

#[test]
fn test_text_output_exact() {
    let mut out = Vec::new();
    write_host_output(&example(), &mut out).unwrap();
    assert_eq!(out, b"example.com:80\nexample.com:443\n");
}

#[test]
fn test_json_records_differ_only_in_port() {
    let records = json_lines(&example());
    assert_eq!(records.len(), 2);

    for record in &records {
        assert_eq!(record["host"], "example.com");
        assert_eq!(record["ip"], "93.184.216.1");
    }
    let mut first = records[0].clone();
    let mut second = records[1].clone();
    first.as_object_mut().unwrap().remove("port");
    second.as_object_mut().unwrap().remove("port");
    assert_eq!(first, second);
}

#[test]
fn test_host_equal_to_ip_is_collapsed_everywhere() {
    let result = HostResult::new("93.184.216.1", "93.184.216.1", vec![Port::tcp(22)]);

    let mut text = Vec::new();
    write_host_output(&result, &mut text).unwrap();
    assert_eq!(text, b"93.184.216.1:22\n");

    let records = json_lines(&result);
    assert!(records[0].get("host").is_none());
    assert_eq!(records[0]["ip"], "93.184.216.1");

    let rows = csv_rows(&result, false);
    assert_eq!(rows[0][0], "");
    assert_eq!(rows[0][1], "93.184.216.1");
}

#[test]
fn test_json_key_order_matches_csv_header() {
    let result = example().with_cdn(true, Some("cloudflare".to_string()));
    let mut out = Vec::new();
    write_json_output(&result, &mut out).unwrap();
    let line = String::from_utf8(out).unwrap();
    let first = line.lines().next().unwrap();

    let mut last = 0;
    for key in csv_headers() {
        let at = first.find(&format!("\"{}\":", key)).unwrap();
        assert!(at >= last, "{key} out of order in {first}");
        last = at;
    }
}

#[test]
fn test_csv_and_json_agree_field_for_field() {
    let result = HostResult::new(
        "cdn.example",
        "104.16.0.1",
        vec![Port::tcp(80), Port::udp(53).with_tls(false), Port::tcp(8443).with_tls(true)],
    )
    .with_cdn(true, Some("cloudflare".to_string()));

    let json: Vec<Vec<String>> = json_lines(&result).iter().map(normalize_json).collect();
    let csv = csv_rows(&result, false);

    // Each call stamps its own time, compare everything else
    let strip = |rows: Vec<Vec<String>>| -> Vec<Vec<String>> {
        rows.into_iter()
            .map(|mut row| {
                row.truncate(FIELD_COUNT - 1);
                row
            })
            .collect()
    };
    assert_eq!(strip(json), strip(csv));
}

#[test]
fn test_timestamp_shared_within_call() {
    let result = HostResult::new("example.com", "93.184.216.1", (1..=20).map(Port::tcp).collect());
    let records = json_lines(&result);
    assert!(records.windows(2).all(|w| w[0]["timestamp"] == w[1]["timestamp"]));

    let rows = csv_rows(&result, false);
    assert!(rows.windows(2).all(|w| w[0][5] == w[1][5]));
}

#[test]
fn test_timestamps_non_decreasing_across_calls() {
    let first = json_lines(&example());
    let second = json_lines(&example());
    let parse = |v: &Value| {
        chrono::DateTime::parse_from_rfc3339(v["timestamp"].as_str().unwrap()).unwrap()
    };
    assert!(parse(&first[0]) <= parse(&second[0]));
}

#[test]
fn test_text_output_is_deterministic() {
    let result = example().with_cdn(true, Some("fastly".to_string()));
    let mut a = Vec::new();
    let mut b = Vec::new();
    write_host_output(&result, &mut a).unwrap();
    write_host_output(&result, &mut b).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_empty_port_list_writes_nothing() {
    let result = HostResult::new("example.com", "93.184.216.1", Vec::new());
    let mut out = Vec::new();
    write_host_output(&result, &mut out).unwrap();
    write_json_output(&result, &mut out).unwrap();
    write_csv_output(&result, false, &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_csv_escapes_cdn_name() {
    let result = example().with_cdn(true, Some("Acme, Inc.".to_string()));
    let mut out = Vec::new();
    write_csv_output(&result, false, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains(",\"Acme, Inc.\","));

    let rows = csv_rows(&result, false);
    assert_eq!(rows[0][4], "Acme, Inc.");
}

proptest! {
    #[test]
    fn prop_text_one_line_per_port(ports in proptest::collection::vec(1u16.., 0..64)) {
        let result = HostResult::new(
            "scan.example",
            "192.0.2.10",
            ports.iter().copied().map(Port::tcp).collect(),
        );
        let mut out = Vec::new();
        write_host_output(&result, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        prop_assert_eq!(lines.len(), ports.len());
        for (line, port) in lines.iter().zip(&ports) {
            prop_assert_eq!(*line, format!("scan.example:{}", port));
        }
    }

    #[test]
    fn prop_csv_rows_match_ports(ports in proptest::collection::vec(1u16.., 1..32)) {
        let result = HostResult::new(
            "scan.example",
            "192.0.2.10",
            ports.iter().copied().map(Port::tcp).collect(),
        );
        let rows = csv_rows(&result, true);
        prop_assert_eq!(rows.len(), ports.len() + 1);
        for (row, port) in rows[1..].iter().zip(&ports) {
            prop_assert_eq!(&row[2], &port.to_string());
        }
    }
}
