use std::fmt::Write as _;

use sha2::{Digest, Sha256};

use crate::results::{FailureKind, ScenarioFailure};

/// Byte-for-byte comparison of a captured select output against the oracle.
pub fn assert_exact_output(expected: &[u8], actual: &[u8]) -> Result<(), ScenarioFailure> {
    if expected == actual {
        return Ok(());
    }
    let expected_text = String::from_utf8_lossy(expected);
    let actual_text = String::from_utf8_lossy(actual);
    let mut failure = ScenarioFailure::new(
        FailureKind::Mismatch,
        format!(
            "select output mismatch (-want +got):\n{}",
            line_diff(&expected_text, &actual_text)
        ),
    );
    failure.expected = Some(expected_text.into_owned());
    failure.actual = Some(actual_text.into_owned());
    failure.expected_sha256 = Some(sha256_hex(expected));
    failure.actual_sha256 = Some(sha256_hex(actual));
    Err(failure)
}

/// Positional line diff. Lines are debug-quoted so tabs and carriage returns show up.
pub fn line_diff(expected: &str, actual: &str) -> String {
    let want = expected.split_inclusive('\n').collect::<Vec<_>>();
    let got = actual.split_inclusive('\n').collect::<Vec<_>>();
    let mut out = String::new();
    for idx in 0..want.len().max(got.len()) {
        match (want.get(idx), got.get(idx)) {
            (Some(w), Some(g)) if w == g => {
                let _ = writeln!(out, "  {w:?}");
            }
            (w, g) => {
                if let Some(w) = w {
                    let _ = writeln!(out, "- {w:?}");
                }
                if let Some(g) = g {
                    let _ = writeln!(out, "+ {g:?}");
                }
            }
        }
    }
    out
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{digest:x}")
}
