/// Suffix of DAG definition files.
pub const DEFINITION_SUFFIX: &str = ".yaml";

/// Link to the run history page of a DAG in the web UI.
///
/// The DAG id is the file name of `location` without its definition suffix.
pub fn history_url(base_url: &str, location: &str) -> String {
    let stripped = location.replace(DEFINITION_SUFFIX, "");
    let id = stripped.rsplit('/').next().unwrap_or_default();
    format!("{}/dags/{}/history", base_url.trim_end_matches('/'), id)
}
