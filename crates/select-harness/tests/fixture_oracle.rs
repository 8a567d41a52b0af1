use select_harness::data::datasets::Dataset;
use select_harness::data::encoding::{Conversion, Delimiter, InputEncoding, OutputEncoding};
use select_harness::data::fixtures::{encode_input, FixturePair};
use select_harness::error::HarnessError;

fn conversion(input: InputEncoding, output: OutputEncoding) -> Conversion {
    Conversion::new(input, output).expect("supported conversion")
}

fn text(bytes: &[u8]) -> &str {
    std::str::from_utf8(bytes).expect("utf-8 fixture")
}

#[test]
fn json_lines_to_json_is_identity() {
    let pair = FixturePair::generate(
        2,
        &conversion(InputEncoding::StructuredLines, OutputEncoding::StructuredLines),
    )
    .expect("fixture");
    assert_eq!(
        text(&pair.input),
        "{\"line\":\"0\",\"id\":\"id0\",\"data\":\"some event 0\"}\n\
         {\"line\":\"1\",\"id\":\"id1\",\"data\":\"some event 1\"}\n"
    );
    assert_eq!(pair.expected, pair.input);
}

#[test]
fn json_lines_to_csv_has_no_header() {
    let pair = FixturePair::generate(
        2,
        &conversion(InputEncoding::StructuredLines, OutputEncoding::DelimitedText),
    )
    .expect("fixture");
    assert_eq!(text(&pair.expected), "0,id0,some event 0\n1,id1,some event 1\n");
}

#[test]
fn document_input_is_returned_verbatim() {
    let pair = FixturePair::generate(
        2,
        &conversion(InputEncoding::AggregateDocument, OutputEncoding::StructuredLines),
    )
    .expect("fixture");
    assert_eq!(
        text(&pair.input),
        "{\"obj0\":{\"line\":\"0\",\"id\":\"id0\",\"data\":\"some event 0\"},\
         \"obj1\":{\"line\":\"1\",\"id\":\"id1\",\"data\":\"some event 1\"}}\n"
    );
    assert_eq!(pair.expected, pair.input);
}

#[test]
fn document_keys_follow_byte_order() {
    let input = encode_input(&Dataset::generate(11), InputEncoding::AggregateDocument)
        .expect("document");
    let value: serde_json::Value = serde_json::from_slice(&input).expect("valid json");
    assert_eq!(value.as_object().map(|object| object.len()), Some(11));

    let body = text(&input);
    let obj1 = body.find("\"obj1\"").expect("obj1");
    let obj10 = body.find("\"obj10\"").expect("obj10");
    let obj2 = body.find("\"obj2\"").expect("obj2");
    assert!(obj1 < obj10 && obj10 < obj2, "unexpected key order: {body}");
}

#[test]
fn document_cannot_become_csv() {
    let err = Conversion::new(InputEncoding::AggregateDocument, OutputEncoding::DelimitedText)
        .expect_err("document to csv is undefined");
    assert!(matches!(err, HarnessError::UnsupportedConversion { .. }));
}

#[test]
fn csv_to_json_keeps_header_as_positional_row() {
    let pair = FixturePair::generate(
        1,
        &conversion(
            InputEncoding::DelimitedText(Delimiter::default()),
            OutputEncoding::StructuredLines,
        ),
    )
    .expect("fixture");
    assert_eq!(text(&pair.input), "line,id,data\n0,id0,some event 0\n");
    assert_eq!(
        text(&pair.expected),
        "{\"_1\":\"line\",\"_2\":\"id\",\"_3\":\"data\"}\n\
         {\"_1\":\"0\",\"_2\":\"id0\",\"_3\":\"some event 0\"}\n"
    );
}

#[test]
fn custom_delimiter_is_normalized_to_comma() {
    let tab = Delimiter::parse("tab").expect("tab");
    let pair = FixturePair::generate(
        2,
        &conversion(InputEncoding::DelimitedText(tab), OutputEncoding::DelimitedText),
    )
    .expect("fixture");
    assert_eq!(
        text(&pair.input),
        "line\tid\tdata\n0\tid0\tsome event 0\n1\tid1\tsome event 1\n"
    );
    assert_eq!(
        text(&pair.expected),
        "line,id,data\n0,id0,some event 0\n1,id1,some event 1\n"
    );
}

#[test]
fn delimited_outputs_return_header_plus_records() {
    let pair = FixturePair::generate(
        5,
        &conversion(
            InputEncoding::DelimitedText(Delimiter::default()),
            OutputEncoding::StructuredLines,
        ),
    )
    .expect("fixture");
    assert_eq!(text(&pair.expected).lines().count(), 6);
}

#[test]
fn zero_records_still_carry_the_header() {
    let pair = FixturePair::generate(
        0,
        &conversion(
            InputEncoding::DelimitedText(Delimiter::default()),
            OutputEncoding::DelimitedText,
        ),
    )
    .expect("fixture");
    assert_eq!(text(&pair.expected), "line,id,data\n");

    let lines = FixturePair::generate(
        0,
        &conversion(InputEncoding::StructuredLines, OutputEncoding::StructuredLines),
    )
    .expect("fixture");
    assert!(lines.input.is_empty());
    assert!(lines.expected.is_empty());
}

#[test]
fn generation_is_deterministic() {
    let conversion = conversion(
        InputEncoding::DelimitedText(Delimiter::new(';').expect("semicolon")),
        OutputEncoding::StructuredLines,
    );
    let first = FixturePair::generate(7, &conversion).expect("fixture");
    let second = FixturePair::generate(7, &conversion).expect("fixture");
    assert_eq!(first, second);
}

#[test]
fn tab_delimited_to_json_emits_header_then_positional_rows() {
    let pair = FixturePair::generate(
        5,
        &conversion(
            InputEncoding::DelimitedText(Delimiter::new('\t').expect("tab")),
            OutputEncoding::StructuredLines,
        ),
    )
    .expect("fixture");
    let mut want = String::from("{\"_1\":\"line\",\"_2\":\"id\",\"_3\":\"data\"}\n");
    for idx in 0..5 {
        want.push_str(&format!(
            "{{\"_1\":\"{idx}\",\"_2\":\"id{idx}\",\"_3\":\"some event {idx}\"}}\n"
        ));
    }
    assert_eq!(text(&pair.expected), want);
}

#[test]
fn json_lines_to_csv_five_records() {
    let pair = FixturePair::generate(
        5,
        &conversion(InputEncoding::StructuredLines, OutputEncoding::DelimitedText),
    )
    .expect("fixture");
    assert_eq!(
        text(&pair.expected),
        "0,id0,some event 0\n\
         1,id1,some event 1\n\
         2,id2,some event 2\n\
         3,id3,some event 3\n\
         4,id4,some event 4\n"
    );
}

#[test]
fn csv_output_does_not_depend_on_input_delimiter() {
    let delimiters = [',', '\t', ';', '|'].map(|ch| Delimiter::new(ch).expect("delimiter"));
    for rows in [0, 1, 5, 12] {
        let canonical = FixturePair::generate(
            rows,
            &conversion(
                InputEncoding::DelimitedText(Delimiter::default()),
                OutputEncoding::DelimitedText,
            ),
        )
        .expect("fixture");
        for delimiter in delimiters {
            let pair = FixturePair::generate(
                rows,
                &conversion(InputEncoding::DelimitedText(delimiter), OutputEncoding::DelimitedText),
            )
            .expect("fixture");
            assert_eq!(
                pair.expected,
                canonical.expected,
                "rows={rows} delimiter={:?}",
                delimiter.as_char()
            );
        }
    }
}
