use lynisreport::{ParseOptions, Parser, RecordType, Report};

const FULL_REPORT: &str = include_str!("fixtures/lynis-report.dat");

fn parse(input: &str) -> Result<Report, lynisreport::ParseError> {
    Report::from_reader(input.as_bytes())
}

fn with_version(version: &str) -> String {
    format!(
        "report_version_major=1
report_version_minor=0
report_datetime_start=2022-04-05 13:36:19
auditor=[Not Specified]
lynis_version={version}
warning[]=NETW-2709|Couldn't find 2 responsive nameservers|-|-|
suggestion[]=NETW-3200|Determine if protocol 'dccp' is really needed on this system|-|-|
"
    )
}

#[test]
fn counts_distinct_tests_ignoring_commented_lines() {
    let report = parse(FULL_REPORT).expect("parse report");
    assert_eq!(report.tests.len(), 8);
    assert!(!report.tests.contains_key("NETW-2705"));
    assert_eq!(report.version, "3.0.7");
    assert_eq!(report.time_start, "2022-04-05 13:36:19");
    assert_eq!(report.time_end, "2022-04-05 13:40:02");
}

#[test]
fn flattened_count_matches_record_count() {
    let report = parse(FULL_REPORT).expect("parse report");
    let flat = report.flatten();
    assert_eq!(flat.len(), 9);
    assert_eq!(flat.len(), report.record_count());

    let shared = &report.tests["NETW-2709"];
    assert_eq!(shared.warnings.len(), 1);
    assert_eq!(shared.suggestions.len(), 1);
}

#[test]
fn incompatible_versions_fail_on_their_line() {
    for version in ["3.0.6", "2.0.7"] {
        let err = parse(&with_version(version)).unwrap_err();
        assert_eq!(err.to_string(), "line 5: lynis version is not compatible");
    }
}

#[test]
fn malformed_versions_fail_on_their_line() {
    let err = parse(&with_version("2.7")).unwrap_err();
    assert_eq!(err.to_string(), "line 5: lynis version string invalid format");

    let err = parse(&with_version("3.a.7")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "line 5: lynis version string contains non-number"
    );
}

#[test]
fn newer_versions_are_accepted() {
    let report = parse(&with_version("3.1.2")).expect("parse report");
    assert_eq!(report.version, "3.1.2");
}

#[test]
fn empty_warning_value_is_fatal_with_line_number() {
    let input = "report_version_major=1
report_version_minor=0
report_datetime_start=2022-04-05 13:36:19
auditor=[Not Specified]
lynis_version=3.0.7
warning[]=
suggestion[]=NETW-3200|Determine if protocol 'dccp' is really needed on this system|-|-|
";
    let err = parse(input).unwrap_err();
    assert_eq!(err.line(), Some(6));
    assert_eq!(
        err.to_string(),
        "line 6: malformed line no test name or test is missing info"
    );
}

#[test]
fn iso_timestamp_is_rejected_when_normalizing() {
    let input = "report_version_major=1
report_version_minor=0
report_datetime_start=2022-04-05T13:36:19
lynis_version=3.0.7
";
    let options = ParseOptions {
        timestamp_offset: Some(lynisreport::parser::parse_utc_offset("-06:00").expect("offset")),
    };
    let err = Parser::new(options).parse(input.as_bytes()).unwrap_err();
    assert_eq!(err.line(), Some(3));
    assert!(
        err.to_string().starts_with("line 3: invalid report timestamp"),
        "{err}"
    );
}

#[test]
fn end_to_end_single_test() {
    let input = "lynis_version=3.0.7
warning[]=NETW-1|msg|obj|misc|
suggestion[]=NETW-1|msg2|d2|s2|
";
    let report = parse(input).expect("parse report");
    assert_eq!(report.tests.len(), 1);
    let test = &report.tests["NETW-1"];
    assert_eq!(test.warnings.len(), 1);
    assert_eq!(test.suggestions.len(), 1);
    assert_eq!(test.warnings[0].object, "obj");
    assert_eq!(test.suggestions[0].misc1, "d2");

    let types: Vec<RecordType> = report.flatten().iter().map(|r| r.record_type).collect();
    assert_eq!(types, vec![RecordType::Warning, RecordType::Suggestion]);
}

#[test]
fn json_round_trip_preserves_structure() {
    let report = parse(FULL_REPORT).expect("parse report");
    let bytes = serde_json::to_vec(&report).expect("serialize");
    let back: Report = serde_json::from_slice(&bytes).expect("deserialize");
    assert_eq!(back, report);

    let v: serde_json::Value = serde_json::from_slice(&bytes).expect("value");
    let suggestions = v["tests"]["NETW-2709"]["suggestions"]
        .as_array()
        .expect("suggestions array");
    assert_eq!(suggestions[0]["message"], "Couldn't find 2 responsive nameservers");
}

#[test]
fn record_order_within_a_test_is_arrival_order() {
    let input = "lynis_version=3.0.7
warning[]=T|first|-|-|
suggestion[]=T|s-first|-|-|
warning[]=T|second|-|-|
warning[]=T|third|-|-|
";
    let report = parse(input).expect("parse report");
    let messages: Vec<&str> = report.tests["T"]
        .warnings
        .iter()
        .map(|w| w.message.as_str())
        .collect();
    assert_eq!(messages, vec!["first", "second", "third"]);
}
