//! Query model, parameter validation and request encoding.
//!
//! The EIA v2 API takes everything as query-string parameters. Facets use
//! array-style keys (`facets[series][]=RWTC`) repeated once per value, and
//! sort order is a JSON array under a single `sort` key.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EiaError, EiaResult};

/// Upper bound on rows per request enforced by the API.
pub const MAX_LIMIT: u32 = 5000;

/// Default field requested when none are given.
pub const DEFAULT_DATA_FIELD: &str = "value";

/// Data frequency accepted by the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Daily observations
    Daily,
    /// Weekly observations
    Weekly,
    /// Monthly observations
    #[default]
    Monthly,
    /// Annual observations
    Annual,
}

impl Frequency {
    /// All accepted frequencies, in the order they are listed to users.
    pub const ALL: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Annual,
    ];

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Annual => "annual",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = EiaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frequency::ALL
            .into_iter()
            .find(|freq| freq.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Frequency::ALL.iter().map(Frequency::as_str).collect();
                EiaError::Validation(format!(
                    "Invalid frequency: '{s}'. Valid options: {}",
                    valid.join(", ")
                ))
            })
    }
}

/// Sort direction for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

/// One `{column, direction}` sort entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Column to sort by (e.g. `period`)
    pub column: String,
    /// Direction
    pub direction: SortDirection,
}

impl SortSpec {
    /// Sort descending by `column`.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Sort ascending by `column`.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }
}

/// A single EIA data query.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    /// Route after `/v2/`, e.g. `petroleum/pri/spt`
    pub path: String,
    /// Facet name to series identifiers
    pub facets: BTreeMap<String, Vec<String>>,
    /// Start date (YYYY-MM-DD or YYYY-MM)
    pub start: Option<String>,
    /// End date (YYYY-MM-DD or YYYY-MM)
    pub end: Option<String>,
    /// Data frequency
    pub frequency: Frequency,
    /// Fields to return
    pub data_fields: Vec<String>,
    /// Sort order
    pub sort: Vec<SortSpec>,
    /// Maximum rows to return, clamped to [`MAX_LIMIT`]
    pub limit: u32,
}

impl QuerySpec {
    /// Creates a query for `path` with monthly frequency and the API maximum limit.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            facets: BTreeMap::new(),
            start: None,
            end: None,
            frequency: Frequency::default(),
            data_fields: vec![DEFAULT_DATA_FIELD.to_string()],
            sort: Vec::new(),
            limit: MAX_LIMIT,
        }
    }

    /// Creates a query from raw string arguments, failing on an empty path
    /// or unknown frequency.
    pub fn parse(path: &str, frequency: &str) -> EiaResult<Self> {
        let frequency = validate_path_and_frequency(path, frequency)?;
        Ok(Self::new(path).with_frequency(frequency))
    }

    /// Sets the frequency.
    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Appends values for a facet, keeping their order.
    pub fn with_facet<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facets
            .entry(name.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Replaces all facets.
    pub fn with_facets(mut self, facets: BTreeMap<String, Vec<String>>) -> Self {
        self.facets = facets;
        self
    }

    /// Sets the start date. Empty strings are treated as absent.
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = non_empty(start.into());
        self
    }

    /// Sets the end date. Empty strings are treated as absent.
    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = non_empty(end.into());
        self
    }

    /// Replaces the requested data fields.
    pub fn with_data_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a sort entry.
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort.push(sort);
        self
    }

    /// Sets the row limit. Values above [`MAX_LIMIT`] are clamped when encoded.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Result of a successful [`validate_params`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedParams {
    /// Parsed frequency
    pub frequency: Frequency,
    /// Limit after clamping
    pub limit: u32,
}

/// Validates the query preconditions.
///
/// Fails when `path` is empty or `frequency` is not one of the four
/// accepted values. A `limit` above [`MAX_LIMIT`] is never an error; it is
/// clamped and logged.
pub fn validate_params(path: &str, frequency: &str, limit: u32) -> EiaResult<ValidatedParams> {
    let frequency = validate_path_and_frequency(path, frequency)?;
    Ok(ValidatedParams {
        frequency,
        limit: clamp_limit(limit),
    })
}

fn validate_path_and_frequency(path: &str, frequency: &str) -> EiaResult<Frequency> {
    if path.is_empty() {
        return Err(EiaError::Validation(
            "path required: Path parameter is required".to_string(),
        ));
    }
    frequency.parse()
}

/// Clamps a row limit to [`MAX_LIMIT`].
pub fn clamp_limit(limit: u32) -> u32 {
    if limit > MAX_LIMIT {
        tracing::warn!(limit, max = MAX_LIMIT, "limit exceeds maximum, capping");
        MAX_LIMIT
    } else {
        limit
    }
}

/// Encodes a query into EIA request parameters. Pure; performs no I/O.
///
/// Order: `api_key`, `frequency`, `data[0]`, `limit`, then `start`/`end`
/// when present, one `facets[<name>][]` entry per facet value (facet names
/// in sorted order, values in input order), and `sort` last.
pub fn build_params(api_key: &str, spec: &QuerySpec) -> Vec<(String, String)> {
    let data_fields = if spec.data_fields.is_empty() {
        DEFAULT_DATA_FIELD.to_string()
    } else {
        spec.data_fields.join(",")
    };

    let mut params = vec![
        ("api_key".to_string(), api_key.to_string()),
        ("frequency".to_string(), spec.frequency.as_str().to_string()),
        ("data[0]".to_string(), data_fields),
        ("limit".to_string(), spec.limit.min(MAX_LIMIT).to_string()),
    ];

    if let Some(start) = spec.start.as_deref().filter(|s| !s.is_empty()) {
        params.push(("start".to_string(), start.to_string()));
    }
    if let Some(end) = spec.end.as_deref().filter(|s| !s.is_empty()) {
        params.push(("end".to_string(), end.to_string()));
    }

    for (name, values) in &spec.facets {
        let key = format!("facets[{name}][]");
        for value in values {
            params.push((key.clone(), value.clone()));
        }
    }

    if !spec.sort.is_empty() {
        // Serializing plain strings and unit enums cannot fail.
        let sort = serde_json::to_string(&spec.sort).unwrap_or_default();
        params.push(("sort".to_string(), sort));
    }

    params
}

/// Parses a facet filter given as a JSON object, e.g. `{"series": ["RWTC"]}`.
///
/// List values keep their order; scalar values become single-element lists.
pub fn parse_facets(json: &str) -> EiaResult<BTreeMap<String, Vec<String>>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| EiaError::Validation(format!("Invalid facets JSON: {e}")))?;

    let Value::Object(map) = value else {
        return Err(EiaError::Validation(
            "Invalid facets JSON: expected an object such as {\"series\": [\"RWTC\"]}".to_string(),
        ));
    };

    Ok(map
        .into_iter()
        .map(|(name, values)| {
            let values = match values {
                Value::Array(items) => items.into_iter().map(facet_value_to_string).collect(),
                other => vec![facet_value_to_string(other)],
            };
            (name, values)
        })
        .collect())
}

fn facet_value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
