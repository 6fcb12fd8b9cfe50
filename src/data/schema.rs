//! Fixed column layout of the customer churn table.
//!
//! One row per customer: an identifier, ~20 categorical/numeric profile
//! attributes, and a binary churn label. The layout is dictated by the
//! source file, not configurable.

/// All columns of the source table, in file order.
pub const COLUMNS: [&str; 21] = [
    "customerID",
    "gender",
    "SeniorCitizen",
    "Partner",
    "Dependents",
    "tenure",
    "PhoneService",
    "MultipleLines",
    "InternetService",
    "OnlineSecurity",
    "OnlineBackup",
    "DeviceProtection",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
    "Contract",
    "PaperlessBilling",
    "PaymentMethod",
    "MonthlyCharges",
    "TotalCharges",
    "Churn",
];

/// The customer identifier. Uninformative for prediction and dropped
/// during cleaning.
pub const ID_COLUMN: &str = "customerID";

/// The binary churn label column ("Yes" / "No").
pub const LABEL_COLUMN: &str = "Churn";

/// Columns parsed directly as numbers (everything else is categorical).
pub const NUMERIC_COLUMNS: [&str; 4] = ["SeniorCitizen", "tenure", "MonthlyCharges", "TotalCharges"];

/// Columns dropped after encoding because they are linearly redundant
/// with columns that remain. The choice is fixed, made from observed
/// pairwise correlation on the source data; `TotalCharges` tracks
/// `tenure * MonthlyCharges` almost exactly.
pub const REDUNDANT_COLUMNS: [&str; 1] = ["TotalCharges"];

/// Returns true if `name` is one of the numeric source columns.
#[must_use]
pub fn is_numeric(name: &str) -> bool {
    NUMERIC_COLUMNS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_has_label_last() {
        assert_eq!(COLUMNS[COLUMNS.len() - 1], LABEL_COLUMN);
    }

    #[test]
    fn test_id_and_label_are_in_layout() {
        assert!(COLUMNS.contains(&ID_COLUMN));
        assert!(COLUMNS.contains(&LABEL_COLUMN));
    }

    #[test]
    fn test_numeric_columns_are_in_layout() {
        for col in NUMERIC_COLUMNS {
            assert!(COLUMNS.contains(&col), "{col} missing from layout");
        }
    }

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric("tenure"));
        assert!(!is_numeric("Contract"));
    }
}
