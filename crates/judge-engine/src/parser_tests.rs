use super::*;

fn final_result_line() -> Vec<u8> {
    br#"{"type":"final_result","data":{"total":1,"passed":1,"failed":0,"execution_time":3,"cases":[{"id":1,"status":"passed","input":[1,2],"expected":3,"actual":3,"time":3}]}}"#
        .to_vec()
}

#[test]
fn decodes_final_result_after_line_feed() {
    let mut parser = ResultParser::new();
    let mut line = final_result_line();
    line.push(b'\n');
    parser.feed(&line);
    let summary = parser.final_result().expect("final result");
    assert_eq!(summary.total, 1);
    assert_eq!(summary.passed, 1);
}

#[test]
fn retains_trailing_partial_line_across_feeds() {
    let mut parser = ResultParser::new();
    let mut full = final_result_line();
    full.push(b'\n');
    let (first, second) = full.split_at(full.len() - 10);
    parser.feed(first);
    assert!(parser.final_result().is_none());
    parser.feed(second);
    assert!(parser.final_result().is_some());
}

#[test]
fn strips_control_characters_before_framing() {
    let mut parser = ResultParser::new();
    let mut noisy = vec![0x01u8, 0x02, 0x0E];
    noisy.extend(final_result_line());
    noisy.push(b'\n');
    parser.feed(&noisy);
    assert!(parser.final_result().is_some());
}

#[test]
fn discards_log_multiplex_prefix_before_first_brace() {
    let mut parser = ResultParser::new();
    let mut line = b"\x01\x00\x00\x00\x00\x00\x00\x10".to_vec();
    line.extend(final_result_line());
    line.push(b'\n');
    parser.feed(&line);
    assert!(parser.final_result().is_some());
}

#[test]
fn line_of_only_control_characters_is_not_a_parse_error() {
    let mut parser = ResultParser::new();
    parser.feed(&[0x01, 0x02, 0x03, b'\n']);
    assert!(parser.final_result().is_none());
    assert_eq!(parser.test_results_seen(), 0);
}

#[test]
fn malformed_json_is_skipped_not_fatal() {
    let mut parser = ResultParser::new();
    parser.feed(b"{not json}\n");
    parser.feed(&{
        let mut l = final_result_line();
        l.push(b'\n');
        l
    });
    assert!(parser.final_result().is_some());
}

#[test]
fn test_result_events_are_counted_but_not_accumulated() {
    let mut parser = ResultParser::new();
    let line = br#"{"type":"test_result","data":{"id":1,"status":"passed","input":[1],"expected":1,"time":1}}"#;
    let mut buf = line.to_vec();
    buf.push(b'\n');
    parser.feed(&buf);
    assert_eq!(parser.test_results_seen(), 1);
    assert!(parser.final_result().is_none());
}

#[test]
fn later_final_result_overwrites_earlier_one() {
    let mut parser = ResultParser::new();
    let first = br#"{"type":"final_result","data":{"total":1,"passed":0,"failed":1,"execution_time":1,"cases":[]}}"#;
    let mut buf = first.to_vec();
    buf.push(b'\n');
    parser.feed(&buf);
    assert_eq!(parser.final_result().expect("first").passed, 0);

    let mut second = final_result_line();
    second.push(b'\n');
    parser.feed(&second);
    assert_eq!(parser.final_result().expect("second").passed, 1);
}
