use select_harness::assertions::{assert_exact_output, line_diff, sha256_hex};
use select_harness::results::FailureKind;

#[test]
fn identical_bytes_pass() {
    assert_exact_output(b"0,id0,some event 0\n", b"0,id0,some event 0\n")
        .expect("identical output should pass");
}

#[test]
fn mismatch_reports_both_sides_and_digests() {
    let failure = assert_exact_output(b"a\nb\n", b"a\nc\n").expect_err("mismatch");
    assert_eq!(failure.kind, FailureKind::Mismatch);
    assert_eq!(failure.expected.as_deref(), Some("a\nb\n"));
    assert_eq!(failure.actual.as_deref(), Some("a\nc\n"));
    assert_eq!(
        failure.expected_sha256.as_deref(),
        Some(sha256_hex(b"a\nb\n").as_str())
    );
    assert_ne!(failure.expected_sha256, failure.actual_sha256);
    assert!(
        failure.message.contains("-want +got"),
        "unexpected message: {}",
        failure.message
    );
}

#[test]
fn diff_marks_changed_and_missing_lines() {
    let diff = line_diff("a\nb\nc\n", "a\nB\n");
    assert_eq!(diff, "  \"a\\n\"\n- \"b\\n\"\n+ \"B\\n\"\n- \"c\\n\"\n");
}

#[test]
fn diff_exposes_delimiter_and_terminator_differences() {
    let diff = line_diff("0,id0\n", "0\tid0\r\n");
    assert!(diff.contains("\\t"), "tab should be visible: {diff}");
    assert!(diff.contains("\\r"), "carriage return should be visible: {diff}");
}

#[test]
fn sha256_of_empty_input_is_well_known() {
    assert_eq!(
        sha256_hex(b""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}
