use std::path::Path;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Display name for an employee found in the input files but not in the
/// roster.
pub fn fallback_employee_name(id: u32) -> String {
    format!("employee-{}", id)
}
