//! # marketbot-eia
//!
//! Client for the U.S. Energy Information Administration (EIA) Open Data API v2.
//!
//! The EIA publishes authoritative data on petroleum and natural gas prices
//! (WTI, Brent, Henry Hub), production volumes, imports/exports and the
//! Short-Term Energy Outlook (STEO). This crate provides:
//!
//! - **Query model**: [`QuerySpec`] with facets, date range, frequency, sort and limit
//! - **Validation**: empty paths and unknown frequencies fail before any network call
//! - **Encoding**: array-style facet parameters (`facets[series][]=RWTC`)
//! - **Rate awareness**: a rolling hourly counter that warns at 80% of the 5,000 request quota
//! - **Error taxonomy**: HTTP statuses mapped onto [`EiaError`]
//!
//! ## Example
//!
//! ```ignore
//! use marketbot_eia::{EiaClient, Frequency, QuerySpec};
//!
//! let client = EiaClient::new(std::env::var("EIA_API_KEY")?)?;
//! let spec = QuerySpec::new("petroleum/pri/spt")
//!     .with_facet("series", ["RWTC"])
//!     .with_frequency(Frequency::Weekly)
//!     .with_start("2025-01-01");
//! let result = client.query(&spec).await?;
//! println!("{} records", result.records().len());
//! ```
//!
//! API documentation: <https://www.eia.gov/opendata/documentation.php>

#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod query;
pub mod rate_limit;
pub mod transport;

pub use client::{EiaClient, QueryResult, BASE_URL, REQUEST_TIMEOUT};
pub use error::{EiaError, EiaResult, BROWSER_URL, REGISTRATION_URL};
pub use query::{
    build_params, parse_facets, validate_params, Frequency, QuerySpec, SortDirection, SortSpec,
    ValidatedParams, MAX_LIMIT,
};
pub use rate_limit::{RateState, RateStatus, RateTracker, RATE_LIMIT, RATE_LIMIT_WARNING};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};
