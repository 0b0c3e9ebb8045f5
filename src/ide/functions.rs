//! Built-in Trilogy functions, for completion and signature help.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterInfo {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: &'static str,
    pub signature: &'static str,
    pub description: &'static str,
    pub parameters: &'static [ParameterInfo],
}

const fn param(name: &'static str, description: &'static str) -> ParameterInfo {
    ParameterInfo { name, description }
}

const fn function(
    name: &'static str,
    signature: &'static str,
    description: &'static str,
    parameters: &'static [ParameterInfo],
) -> FunctionInfo {
    FunctionInfo {
        name,
        signature,
        description,
        parameters,
    }
}

pub static TRILOGY_FUNCTIONS: &[FunctionInfo] = &[
    function(
        "count",
        "count(concept) -> int",
        "Count the number of distinct values of a concept.",
        &[param("concept", "The concept to count distinct values of")],
    ),
    function(
        "sum",
        "sum(concept) -> numeric",
        "Calculate the sum of all values of a concept.",
        &[param("concept", "The numeric concept to sum")],
    ),
    function(
        "avg",
        "avg(concept) -> float",
        "Calculate the average of all values of a concept.",
        &[param("concept", "The numeric concept to average")],
    ),
    function(
        "min",
        "min(concept) -> value",
        "Find the minimum value of a concept.",
        &[param("concept", "The concept to find the minimum of")],
    ),
    function(
        "max",
        "max(concept) -> value",
        "Find the maximum value of a concept.",
        &[param("concept", "The concept to find the maximum of")],
    ),
    function(
        "coalesce",
        "coalesce(value1, value2, ...) -> value",
        "Return the first non-null value from the arguments.",
        &[
            param("value1", "First value to check"),
            param("value2", "Second value to check (optional)"),
        ],
    ),
    function(
        "concat",
        "concat(string1, string2, ...) -> string",
        "Concatenate multiple strings together.",
        &[
            param("string1", "First string"),
            param("string2", "Second string"),
        ],
    ),
    function(
        "length",
        "length(string) -> int",
        "Return the length of a string.",
        &[param("string", "The string to measure")],
    ),
    function(
        "upper",
        "upper(string) -> string",
        "Convert a string to uppercase.",
        &[param("string", "The string to convert")],
    ),
    function(
        "lower",
        "lower(string) -> string",
        "Convert a string to lowercase.",
        &[param("string", "The string to convert")],
    ),
    function(
        "trim",
        "trim(string) -> string",
        "Remove leading and trailing whitespace from a string.",
        &[param("string", "The string to trim")],
    ),
    function(
        "substring",
        "substring(string, start, length) -> string",
        "Extract a substring from a string.",
        &[
            param("string", "The source string"),
            param("start", "Starting position (1-indexed)"),
            param("length", "Number of characters to extract"),
        ],
    ),
    function(
        "abs",
        "abs(value) -> numeric",
        "Return the absolute value of a number.",
        &[param("value", "The numeric value")],
    ),
    function(
        "round",
        "round(value, decimals?) -> numeric",
        "Round a number to the specified number of decimal places.",
        &[
            param("value", "The numeric value to round"),
            param("decimals", "Number of decimal places (default: 0)"),
        ],
    ),
    function(
        "floor",
        "floor(value) -> int",
        "Round a number down to the nearest integer.",
        &[param("value", "The numeric value")],
    ),
    function(
        "ceil",
        "ceil(value) -> int",
        "Round a number up to the nearest integer.",
        &[param("value", "The numeric value")],
    ),
    function(
        "date",
        "date(year, month, day) -> date",
        "Create a date from year, month, and day components.",
        &[
            param("year", "The year"),
            param("month", "The month (1-12)"),
            param("day", "The day of the month"),
        ],
    ),
    function(
        "year",
        "year(date) -> int",
        "Extract the year from a date.",
        &[param("date", "The date to extract from")],
    ),
    function(
        "month",
        "month(date) -> int",
        "Extract the month from a date.",
        &[param("date", "The date to extract from")],
    ),
    function(
        "day",
        "day(date) -> int",
        "Extract the day from a date.",
        &[param("date", "The date to extract from")],
    ),
    function(
        "now",
        "now() -> timestamp",
        "Return the current timestamp.",
        &[],
    ),
    function("today", "today() -> date", "Return the current date.", &[]),
    function(
        "cast",
        "cast(value, type) -> value",
        "Cast a value to a different data type.",
        &[
            param("value", "The value to cast"),
            param("type", "The target data type"),
        ],
    ),
    function(
        "case",
        "case(when condition then value, ..., else default) -> value",
        "Conditional expression that returns different values based on conditions.",
        &[
            param("condition", "Boolean condition to test"),
            param("value", "Value to return if condition is true"),
        ],
    ),
    function(
        "if",
        "if(condition, then_value, else_value) -> value",
        "Return one of two values based on a condition.",
        &[
            param("condition", "Boolean condition to test"),
            param("then_value", "Value to return if condition is true"),
            param("else_value", "Value to return if condition is false"),
        ],
    ),
    function(
        "nullif",
        "nullif(value1, value2) -> value",
        "Return NULL if value1 equals value2, otherwise return value1.",
        &[
            param("value1", "The value to compare and potentially return"),
            param("value2", "The value to compare against"),
        ],
    ),
    function(
        "like",
        "like(string, pattern) -> bool",
        "Check if a string matches a pattern (using % and _ wildcards).",
        &[
            param("string", "The string to match"),
            param("pattern", "The pattern to match against"),
        ],
    ),
    function(
        "unnest",
        "unnest(array) -> values",
        "Expand an array into multiple rows.",
        &[param("array", "The array to expand")],
    ),
    function(
        "array_agg",
        "array_agg(value) -> array",
        "Aggregate values into an array.",
        &[param("value", "The values to aggregate")],
    ),
    function(
        "string_agg",
        "string_agg(value, separator) -> string",
        "Concatenate values into a string with a separator.",
        &[
            param("value", "The values to concatenate"),
            param("separator", "The separator between values"),
        ],
    ),
];

/// Case-insensitive lookup.
pub fn lookup_function(name: &str) -> Option<&'static FunctionInfo> {
    TRILOGY_FUNCTIONS
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(name))
}
