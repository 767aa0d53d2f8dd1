//! Markdown rendering of tool results.
//!
//! Currency is shown to 2 decimals, percentages to 1 decimal.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde_json::Value;

use marketbot_analytics::simulation::SimulationResult;
use marketbot_analytics::statistics::StatisticsResult;
use marketbot_analytics::AnalyticsError;
use marketbot_eia::{BROWSER_URL, REGISTRATION_URL};

use crate::auth::AuthenticatedUser;
use crate::glossary::{self, CategoryFilter, GlossaryEntry, TermCategory};

/// Groups the integer digits of a non-negative number string in threes.
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Integer with thousands separators: `1000` -> `1,000`.
pub fn format_count(n: u64) -> String {
    group_digits(&n.to_string())
}

/// Number with thousands separators and 2 decimals: `1234.5` -> `1,234.50`.
pub fn format_grouped(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    format!("{sign}{}.{frac_part}", group_digits(int_part))
}

/// First character uppercased, the rest lowercased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Greeting
// ============================================================================

/// Greeting with the caller's identity, if any.
pub fn hello(name: &str, user: Option<&AuthenticatedUser>) -> String {
    let mut out = format!("Hello, {name}! Welcome to the Market Analysis Bot.");

    match user {
        Some(user) => {
            let _ = write!(out, "\n\nAuthenticated as: {}", user.email);
            if !user.connector_access_tokens.is_empty() {
                let connectors: Vec<_> = user.connector_names().collect();
                let _ = write!(out, "\nAvailable connectors: {}", connectors.join(", "));
            }
        }
        None => out.push_str("\n\n(No authentication detected)"),
    }

    out.push_str("\n\nServer Status: ✓ Running");
    out.push_str("\nThis is a demonstration MCP server for energy trading market analysis.");
    out
}

// ============================================================================
// EIA data
// ============================================================================

/// Heading for an EIA route.
pub fn data_type(path: &str) -> &'static str {
    if path.contains("petroleum") && path.contains("pri") {
        "Petroleum Prices"
    } else if path.contains("natural-gas") && path.contains("pri") {
        "Natural Gas Prices"
    } else if path.contains("prod") {
        "Production Data"
    } else if path.contains("steo") {
        "STEO Forecast"
    } else {
        "Energy Data"
    }
}

/// EIA returns values as numbers or numeric strings.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn columns(records: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        if let Value::Object(map) = record {
            for key in map.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
    }
    columns
}

/// Keeps a value on one table row: pipes are escaped, line breaks become spaces.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}

fn table_row<S: AsRef<str>>(cells: &[S]) -> String {
    let cells: Vec<String> = cells.iter().map(|c| escape_cell(c.as_ref())).collect();
    format!("| {} |", cells.join(" | "))
}

fn markdown_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = table_row(header);
    out.push('\n');
    let rule: Vec<&str> = header.iter().map(|_| "---").collect();
    let _ = writeln!(out, "|{}|", rule.join("|"));
    for row in rows {
        let _ = writeln!(out, "{}", table_row(row));
    }
    out.truncate(out.trim_end().len());
    out
}

/// Records rendered as a markdown report with summary and metadata.
///
/// `records` is the `response.data` array, newest first as returned by the API.
pub fn eia_data(
    records: &[Value],
    path: &str,
    frequency: &str,
    facets: &BTreeMap<String, Vec<String>>,
) -> String {
    let data_type = data_type(path);
    let mut out = format!("## {data_type}\n\n");

    let columns = columns(records);
    let has_value = columns.iter().any(|c| c == "value");
    let has_period = columns.iter().any(|c| c == "period");

    if has_value && has_period {
        let is_price = data_type.contains("Price") || path.to_lowercase().contains("steo");
        let rows: Vec<Vec<String>> = records
            .iter()
            .map(|record| {
                let raw = record.get("value");
                let value = match raw.and_then(numeric) {
                    Some(v) if is_price => format!("${v:.2}"),
                    Some(v) => format_grouped(v),
                    None => cell(raw),
                };
                vec![cell(record.get("period")), value]
            })
            .collect();
        let header = if is_price {
            ["Period", "Price"]
        } else {
            ["Period", "Value"]
        };
        out.push_str(&markdown_table(&header, &rows));
    } else {
        let header: Vec<&str> = columns.iter().map(String::as_str).collect();
        let rows: Vec<Vec<String>> = records
            .iter()
            .map(|record| columns.iter().map(|c| cell(record.get(c))).collect())
            .collect();
        out.push_str(&markdown_table(&header, &rows));
    }

    let values: Vec<f64> = records
        .iter()
        .filter_map(|record| record.get("value").and_then(numeric))
        .collect();
    if values.len() > 1 {
        let latest = values[0];
        let oldest = values[values.len() - 1];
        let average = values.iter().sum::<f64>() / values.len() as f64;

        out.push_str("\n\n### Summary\n");
        let _ = writeln!(out, "- **Latest**: {latest:.2}");
        let _ = writeln!(out, "- **Average**: {average:.2}");
        if values.len() > 2 && oldest != 0.0 {
            let change = (latest - oldest) / oldest * 100.0;
            let _ = writeln!(out, "- **Change**: {change:+.1}% over period");
        }
    }

    out.push_str("\n\n### Metadata\n");
    out.push_str("- **Source**: EIA Open Data API\n");
    let _ = writeln!(out, "- **Path**: `{path}`");
    let _ = writeln!(out, "- **Frequency**: {}", capitalize(frequency));
    let _ = writeln!(out, "- **Records**: {}", records.len());
    if let Some(series) = facets.get("series") {
        let _ = writeln!(out, "- **Series**: {}", series.join(", "));
    }

    out.push_str("\n*Data updated regularly by U.S. Energy Information Administration*");
    out
}

/// Shown when the server has no EIA API key.
pub fn eia_key_missing() -> String {
    format!(
        "❌ **EIA API Key Not Configured**\n\n\
         The EIA_API_KEY environment variable is not set.\n\n\
         **To get an API key:**\n\
         1. Visit: {REGISTRATION_URL}\n\
         2. Register for a free API key\n\
         3. Add to .env file: EIA_API_KEY=your-key-here\n\
         4. Restart the server"
    )
}

/// Shown when the facets argument is not a JSON object.
pub fn invalid_facets(error: &str, input: &str) -> String {
    format!(
        "❌ **Invalid Facets JSON**\n\n\
         Error: {error}\n\n\
         **Example facets format:**\n\
         ```json\n{{\"series\": [\"RWTC\"]}}\n```\n\n\
         Your input: `{input}`"
    )
}

/// Shown when a query succeeds with no records.
pub fn no_data(path: &str, frequency: &str, start: &str, end: &str, facets: &str) -> String {
    let or = |s: &str, fallback: &str| {
        if s.is_empty() {
            fallback.to_string()
        } else {
            s.to_string()
        }
    };
    format!(
        "ℹ️ **No Data Found**\n\n\
         The query returned no results.\n\n\
         **Query Details:**\n\
         - Path: `{path}`\n\
         - Frequency: `{frequency}`\n\
         - Date Range: {} to {}\n\
         - Facets: {}\n\n\
         **Suggestions:**\n\
         - Try a broader date range\n\
         - Check the series ID in facets\n\
         - Verify the path is correct\n\
         - Browse available data: {BROWSER_URL}",
        or(start, "not specified"),
        or(end, "not specified"),
        or(facets, "none"),
    )
}

/// Shown for parameter validation failures.
pub fn invalid_parameters(message: &str) -> String {
    format!("❌ **Invalid Parameters**\n\n{message}")
}

/// Shown for upstream and network failures.
pub fn eia_query_error(message: &str) -> String {
    format!(
        "❌ **Error Querying EIA API**\n\n\
         {message}\n\n\
         **Troubleshooting:**\n\
         - Check your API key is valid\n\
         - Verify the path exists: {BROWSER_URL}\n\
         - Check series ID in facets\n\
         - Ensure date format is YYYY-MM-DD or YYYY-MM"
    )
}

// ============================================================================
// Analysis
// ============================================================================

/// Monte Carlo report: inputs, distribution, confidence intervals and
/// interpretation.
pub fn simulation(result: &SimulationResult) -> String {
    let request = &result.request;
    let d = &result.distribution;
    let (lo95, hi95) = result.ci_95();
    let (lo68, hi68) = result.ci_68();

    let mut out = String::from("## Monte Carlo Price Simulation\n\n");
    let _ = writeln!(out, "**Starting Price**: ${:.2}", request.current_price);
    let _ = writeln!(out, "**Volatility**: {:.1}% annual", request.volatility * 100.0);
    let _ = writeln!(out, "**Time Horizon**: {} days", request.days);
    let _ = writeln!(
        out,
        "**Simulations**: {}\n",
        format_count(u64::from(request.path_count))
    );

    let _ = writeln!(out, "### Price Distribution (Day {})\n", request.days);
    out.push_str("| Statistic | Price |\n");
    out.push_str("|-----------|-------|\n");
    let _ = writeln!(out, "| Mean | ${:.2} |", d.mean);
    let _ = writeln!(out, "| Median | ${:.2} |", d.median);
    let _ = writeln!(out, "| Std Dev | ${:.2} |\n", d.std_dev);

    out.push_str("### Confidence Intervals\n\n");
    out.push_str("| Confidence | Lower Bound | Upper Bound | Range |\n");
    out.push_str("|------------|-------------|-------------|-------|\n");
    let _ = writeln!(out, "| 95% | ${lo95:.2} | ${hi95:.2} | ${:.2} |", hi95 - lo95);
    let _ = writeln!(out, "| 68% | ${lo68:.2} | ${hi68:.2} | ${:.2} |\n", hi68 - lo68);

    out.push_str("### Interpretation\n\n");
    let _ = writeln!(out, "- **Upside Potential (95% CI)**: +{:.1}%", result.upside_pct());
    let _ = writeln!(out, "- **Downside Risk (95% CI)**: -{:.1}%", result.downside_pct());
    let _ = writeln!(out, "- **Expected Change**: {:+.1}%\n", result.expected_change_pct());

    out.push_str(
        "*Simulation uses geometric Brownian motion. Past volatility may not predict future movement.*",
    );
    out
}

/// Shown when a simulation request is rejected.
pub fn simulation_error(message: &str) -> String {
    format!("❌ **Simulation Error**: {message}")
}

/// Summary statistics table with a variability assessment.
pub fn statistics(label: &str, stats: &StatisticsResult) -> String {
    let mut out = format!("## Statistical Analysis: {label}\n\n");
    let _ = writeln!(out, "**Sample Size**: {} values\n", stats.sample_size);

    out.push_str("| Measure | Value |\n");
    out.push_str("|---------|-------|\n");
    let _ = writeln!(out, "| Mean | {:.2} |", stats.mean);
    let _ = writeln!(out, "| Median | {:.2} |", stats.median);
    let _ = writeln!(out, "| Std Deviation | {:.2} |", stats.std_dev);
    let _ = writeln!(out, "| Minimum | {:.2} |", stats.min);
    let _ = writeln!(out, "| Maximum | {:.2} |", stats.max);
    let _ = writeln!(out, "| Range | {:.2} |\n", stats.range);

    out.push_str("### Variability\n\n");
    match stats.coefficient_of_variation() {
        Ok(cv) => {
            let band = stats
                .volatility_band()
                .map(|b| b.as_str())
                .unwrap_or("Undefined");
            let _ = writeln!(out, "- **Coefficient of Variation**: {cv:.1}%");
            let _ = writeln!(out, "- **Volatility**: {band}");
        }
        Err(AnalyticsError::DivisionByZero { .. }) => {
            out.push_str("- **Coefficient of Variation**: undefined (mean is zero)\n");
            out.push_str("- **Volatility**: undefined\n");
        }
        Err(_) => {
            out.push_str("- **Coefficient of Variation**: undefined (mean too close to zero)\n");
            out.push_str("- **Volatility**: undefined\n");
        }
    }
    out
}

/// Shown when the values argument does not parse.
pub fn invalid_number_format() -> String {
    "❌ **Error**: Invalid number format. Use comma-separated values like: 71.5,70.2,72.1"
        .to_string()
}

/// Shown for any other statistics failure.
pub fn calculation_error(message: &str) -> String {
    format!("❌ **Calculation Error**: {message}")
}

// ============================================================================
// Glossary
// ============================================================================

/// Full explanation of one term, echoing the term as typed.
pub fn term_explanation(term: &str, entry: &GlossaryEntry) -> String {
    format!(
        "## {}\n\n**Term**: `{term}`\n\n### Definition\n{}\n\n### Trading Context\n{}\n",
        entry.full_name, entry.definition, entry.context
    )
}

/// Unknown term, with the first 10 glossary keys as suggestions.
pub fn term_not_found(term: &str) -> String {
    let mut out = format!("❓ **Term not found**: `{term}`\n\n");
    out.push_str("### Available Terms\n");
    out.push_str("Try these common trading terms:\n");
    for key in glossary::keys(10) {
        let _ = writeln!(out, "- `{key}`");
    }
    let _ = write!(out, "\n*Total terms in glossary: {}*", glossary::len());
    out
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Glossary listing for a category filter.
pub fn term_list(filter: CategoryFilter) -> String {
    let mut out = String::from("## Energy Trading Glossary\n\n");

    for category in filter.categories() {
        let _ = writeln!(out, "### {}", category.heading());
        for entry in category.entries() {
            // Concepts are self-describing; the rest show their expansion.
            if category == TermCategory::Concepts {
                let _ = writeln!(
                    out,
                    "- **{}**: {}...",
                    entry.key,
                    truncate_chars(entry.definition, 60)
                );
            } else {
                let _ = writeln!(out, "- **{}**: {}", entry.key, entry.full_name);
            }
        }
        out.push('\n');
    }

    out.push_str("*Use `explain_trading_term` to get detailed explanations.*");
    out
}
