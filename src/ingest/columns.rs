//! The fixed column set every upload must carry.

/// Columns kept in the output, in output order.
pub const REQUIRED_COLUMNS: [&str; 13] = [
    "Case ID",
    "Mother name",
    "User name",
    "User Phone",
    "User Role",
    "Child ID",
    "Child Name",
    "Child DOB",
    "Child Weight Zscore",
    "Last Weight Zscore",
    "Mother Location",
    "User Block/Project/Tehsil",
    "User Facility/Center",
];

/// Column that decides the severity bucket.
pub const SCORE_COLUMN: &str = "Last Weight Zscore";

/// Returns the required columns absent from `headers`, in required order.
pub fn missing_columns<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h.as_ref() == **required))
        .map(|required| required.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_column_is_required() {
        assert!(REQUIRED_COLUMNS.contains(&SCORE_COLUMN));
    }

    #[test]
    fn nothing_missing_from_full_header() {
        let mut headers: Vec<&str> = REQUIRED_COLUMNS.to_vec();
        headers.reverse();
        headers.push("Extra");
        assert!(missing_columns(&headers).is_empty());
    }

    #[test]
    fn reports_missing_in_required_order() {
        let headers: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| *c != "User Role" && *c != "Case ID")
            .collect();
        assert_eq!(missing_columns(&headers), vec!["Case ID", "User Role"]);
    }

    #[test]
    fn matching_is_exact() {
        let headers: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .map(|c| if *c == "Child DOB" { "child dob ".to_string() } else { c.to_string() })
            .collect();
        assert_eq!(missing_columns(&headers), vec!["Child DOB"]);
    }
}
