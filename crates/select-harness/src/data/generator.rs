use super::datasets::Record;

pub fn generate_records(rows: usize) -> Vec<Record> {
    (0..rows)
        .map(|sequence| Record {
            sequence: sequence.to_string(),
            identifier: format!("id{sequence}"),
            payload: format!("some event {sequence}"),
        })
        .collect()
}
