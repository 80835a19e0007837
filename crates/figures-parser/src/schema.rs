/// Header names the source file must carry. Extra columns are allowed.
pub const SOURCE_COLUMNS: [&str; 10] = [
    "ID",
    "Name",
    "Short description",
    "Gender",
    "Country",
    "Occupation",
    "Birth year",
    "Death year",
    "Manner of death",
    "Age of death",
];

/// Cell contents (after trimming) that are read as a missing value.
pub const MISSING_TOKENS: [&str; 12] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "NULL", "null", "None", "#N/A", "<NA>",
];
