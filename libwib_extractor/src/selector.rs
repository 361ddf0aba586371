use super::constants::{TRIGGER_RECORD_HEADER, TRIGGER_RECORD_PREFIX};

/// Construct the trigger record group name for a trigger number (5-digit zero padded)
pub fn trigger_record_name(trigger_number: u64) -> String {
    format!("{TRIGGER_RECORD_PREFIX}{trigger_number:0>5}")
}

/// Select the fragment datasets belonging to one trigger record.
///
/// A path matches if, after any leading '/', it begins with the trigger record name and is
/// not a trigger record header. Input order is kept. An empty selection is not an error.
pub fn select_fragment_datasets(datasets: &[String], trigger_number: u64) -> Vec<String> {
    let record_name = trigger_record_name(trigger_number);
    datasets
        .iter()
        .filter(|path| {
            path.trim_start_matches('/').starts_with(&record_name)
                && !path.contains(TRIGGER_RECORD_HEADER)
        })
        .cloned()
        .collect()
}
