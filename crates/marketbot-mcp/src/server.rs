//! MCP Server implementation for market analysis.

use std::collections::BTreeMap;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::schemars::JsonSchema;
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;

use marketbot_analytics::simulation::{simulate_par, SimulationRequest};
use marketbot_analytics::statistics::compute_statistics_str;
use marketbot_analytics::AnalyticsError;
use marketbot_eia::{parse_facets, EiaClient, EiaError, HttpTransport, QuerySpec, ReqwestTransport};

use crate::auth::AuthenticatedUser;
use crate::config::ServerConfig;
use crate::glossary::{self, CategoryFilter};
use crate::render;
use crate::{SERVER_NAME, SERVER_TITLE, SERVER_VERSION};

/// EIA client with a type-erased transport.
pub type SharedEiaClient = EiaClient<Arc<dyn HttpTransport>>;

/// Rendered tool output. `Err` marks the result as a tool error.
pub type ToolOutput = Result<String, String>;

/// Per-call context handed to every tool.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    /// Caller identity from the bearer token, if any
    pub user: Option<AuthenticatedUser>,
}

impl ToolContext {
    /// Context without a caller identity.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context for an authenticated caller.
    pub fn for_user(user: AuthenticatedUser) -> Self {
        Self { user: Some(user) }
    }

    /// Reads the caller identity the HTTP auth layer stored on the request.
    /// Over stdio there is no HTTP request and the context is anonymous.
    pub fn from_request(ctx: &RequestContext<RoleServer>) -> Self {
        let user = ctx
            .extensions
            .get::<http::request::Parts>()
            .and_then(|parts| parts.extensions.get::<AuthenticatedUser>())
            .cloned();
        Self { user }
    }

    fn log_caller(&self, action: &str) {
        match &self.user {
            Some(user) => tracing::info!(email = %user.email, "{action} requested by authenticated user"),
            None => tracing::debug!("{action} requested without authentication"),
        }
    }
}

/// MCP Server for energy market analysis
#[derive(Clone)]
pub struct MarketAnalysisServer {
    /// EIA client, absent when no API key is configured
    eia: Option<Arc<SharedEiaClient>>,
    /// Seed for Monte Carlo runs
    simulation_seed: u64,
    /// Tool router for MCP tools
    tool_router: ToolRouter<Self>,
}

impl MarketAnalysisServer {
    /// Create a server with an optional EIA client.
    pub fn new(eia: Option<SharedEiaClient>, simulation_seed: u64) -> Self {
        Self {
            eia: eia.map(Arc::new),
            simulation_seed,
            tool_router: Self::tool_router(),
        }
    }

    /// Create a server from resolved configuration, using the `reqwest`
    /// transport for EIA.
    pub fn from_config(config: &ServerConfig) -> Self {
        let eia = config.eia_api_key.as_deref().and_then(|key| {
            let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new());
            match EiaClient::with_transport(key, transport) {
                Ok(client) => Some(client),
                Err(err) => {
                    tracing::error!(error = %err, "EIA client disabled");
                    None
                }
            }
        });
        Self::new(eia, config.simulation_seed)
    }

    /// True if the EIA data tool can query the API.
    pub fn has_eia(&self) -> bool {
        self.eia.is_some()
    }

    /// Seed used for simulations.
    pub fn simulation_seed(&self) -> u64 {
        self.simulation_seed
    }

    /// Names of all registered tools.
    pub fn tool_names(&self) -> Vec<String> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect()
    }

    fn into_call_result(output: ToolOutput) -> CallToolResult {
        match output {
            Ok(text) => CallToolResult::success(vec![Content::text(text)]),
            Err(text) => CallToolResult::error(vec![Content::text(text)]),
        }
    }

    /// Greeting that shows the caller's identity.
    pub fn greet(&self, ctx: &ToolContext, name: &str) -> ToolOutput {
        tracing::info!(name, "hello_world tool called");
        ctx.log_caller("greeting");
        Ok(render::hello(name, ctx.user.as_ref()))
    }

    /// Queries EIA and renders the records.
    pub async fn extract_eia_data(&self, ctx: &ToolContext, params: &EiaDataParams) -> ToolOutput {
        tracing::info!(
            path = %params.path,
            frequency = %params.frequency,
            "EIA data extractor called"
        );
        ctx.log_caller("EIA query");

        let Some(client) = &self.eia else {
            return Err(render::eia_key_missing());
        };

        let facets = if params.facets.trim().is_empty() {
            BTreeMap::new()
        } else {
            parse_facets(&params.facets)
                .map_err(|e| render::invalid_facets(&e.to_string(), &params.facets))?
        };

        if params.limit < 1 {
            return Err(render::invalid_parameters(&format!(
                "limit must be a positive integer, got {}",
                params.limit
            )));
        }
        let limit = u32::try_from(params.limit).unwrap_or(u32::MAX);

        let spec = QuerySpec::parse(&params.path, &params.frequency)
            .map_err(|e| render::invalid_parameters(&e.to_string()))?
            .with_facets(facets)
            .with_start(params.start.as_str())
            .with_end(params.end.as_str())
            .with_limit(limit);

        let result = client.query(&spec).await.map_err(|err| match err {
            EiaError::Validation(_) => render::invalid_parameters(&err.to_string()),
            other => render::eia_query_error(&other.to_string()),
        })?;

        let records = result.records();
        if records.is_empty() {
            return Ok(render::no_data(
                &params.path,
                &params.frequency,
                &params.start,
                &params.end,
                &params.facets,
            ));
        }

        Ok(render::eia_data(
            records,
            &spec.path,
            spec.frequency.as_str(),
            &spec.facets,
        ))
    }

    /// Runs a seeded Monte Carlo simulation and renders the distribution.
    ///
    /// CPU-bound; async callers should run it on a blocking thread.
    pub fn run_simulation(&self, ctx: &ToolContext, params: &MonteCarloParams) -> ToolOutput {
        tracing::info!(
            price = params.current_price,
            volatility = params.volatility,
            days = params.days,
            "Monte Carlo simulation"
        );
        ctx.log_caller("simulation");

        let request = params.to_request().map_err(|e| render::simulation_error(&e))?;
        let result = simulate_par(&request, self.simulation_seed)
            .map_err(|e| render::simulation_error(&e.to_string()))?;

        Ok(render::simulation(&result))
    }

    /// Parses comma-separated values and renders summary statistics.
    pub fn summarize_values(&self, params: &StatisticsParams) -> ToolOutput {
        tracing::info!(label = %params.label, "statistics calculation");

        match compute_statistics_str(&params.values) {
            Ok(stats) => Ok(render::statistics(&params.label, &stats)),
            Err(AnalyticsError::InvalidNumber { .. }) => Err(render::invalid_number_format()),
            Err(err) => Err(render::calculation_error(&err.to_string())),
        }
    }

    /// Explains a glossary term; unknown terms list suggestions.
    pub fn explain_term(&self, term: &str) -> ToolOutput {
        tracing::info!(term, "vernacular lookup");
        Ok(match glossary::lookup(term) {
            Some(entry) => render::term_explanation(term, entry),
            None => render::term_not_found(term),
        })
    }

    /// Lists glossary terms for a category.
    pub fn list_terms(&self, category: &str) -> ToolOutput {
        tracing::info!(category, "listing terms");
        let filter = category.parse().unwrap_or(CategoryFilter::Unknown);
        Ok(render::term_list(filter))
    }
}

// ============================================================================
// Tool Parameter Types
// ============================================================================

fn default_name() -> String {
    "World".to_string()
}

fn default_frequency() -> String {
    "monthly".to_string()
}

fn default_limit() -> i64 {
    100
}

fn default_days() -> i64 {
    30
}

fn default_simulations() -> i64 {
    1000
}

fn default_label() -> String {
    "Data".to_string()
}

fn default_category() -> String {
    "all".to_string()
}

/// Greeting parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct HelloWorldParams {
    /// Name to greet
    #[serde(default = "default_name")]
    pub name: String,
}

/// EIA query parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EiaDataParams {
    /// API route after /v2/, e.g. "petroleum/pri/spt", "natural-gas/pri/sum", "steo"
    pub path: String,
    /// JSON object of facet filters, e.g. {"series": ["RWTC"]}
    #[serde(default)]
    pub facets: String,
    /// Start date, YYYY-MM-DD or YYYY-MM
    #[serde(default)]
    pub start: String,
    /// End date, YYYY-MM-DD or YYYY-MM
    #[serde(default)]
    pub end: String,
    /// daily, weekly, monthly or annual
    #[serde(default = "default_frequency")]
    pub frequency: String,
    /// Maximum rows to return (max 5000)
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl EiaDataParams {
    /// Parameters for `path` with all defaults.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            facets: String::new(),
            start: String::new(),
            end: String::new(),
            frequency: default_frequency(),
            limit: default_limit(),
        }
    }
}

/// Monte Carlo parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MonteCarloParams {
    /// Starting price, e.g. 71.50 for WTI at $71.50/barrel
    pub current_price: f64,
    /// Annual volatility as a decimal, e.g. 0.25 for 25%
    pub volatility: f64,
    /// Number of trading days to simulate
    #[serde(default = "default_days")]
    pub days: i64,
    /// Number of simulated paths
    #[serde(default = "default_simulations")]
    pub simulations: i64,
    /// Expected daily return as a decimal
    #[serde(default)]
    pub drift: f64,
}

impl MonteCarloParams {
    /// Parameters with default horizon, path count and drift.
    pub fn new(current_price: f64, volatility: f64) -> Self {
        Self {
            current_price,
            volatility,
            days: default_days(),
            simulations: default_simulations(),
            drift: 0.0,
        }
    }

    /// Converts to an engine request, rejecting non-positive counts and
    /// requests above the engine's size ceilings.
    pub fn to_request(&self) -> Result<SimulationRequest, String> {
        let days = u32::try_from(self.days)
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| format!("days must be a positive integer, got {}", self.days))?;
        let path_count = u32::try_from(self.simulations)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                format!(
                    "simulations must be a positive integer, got {}",
                    self.simulations
                )
            })?;

        let request = SimulationRequest::new(self.current_price, self.volatility)
            .with_days(days)
            .with_path_count(path_count)
            .with_drift(self.drift);
        request.validate().map_err(|e| e.to_string())?;
        Ok(request)
    }
}

/// Statistics parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StatisticsParams {
    /// Comma-separated numbers, e.g. "71.5,70.2,72.1,69.8"
    pub values: String,
    /// Label for the dataset, e.g. "WTI Prices"
    #[serde(default = "default_label")]
    pub label: String,
}

/// Glossary lookup parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExplainTermParams {
    /// Term to explain, e.g. "wti", "contango", "crack spread"
    pub term: String,
}

/// Glossary listing parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTermsParams {
    /// "all", "benchmarks", "concepts" or "measurements"
    #[serde(default = "default_category")]
    pub category: String,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl MarketAnalysisServer {
    /// Greeting for testing connectivity and authentication
    #[tool(
        description = "A simple greeting tool for testing the MCP server. Returns a personalized greeting and shows the authenticated user if available."
    )]
    pub async fn hello_world(
        &self,
        Parameters(params): Parameters<HelloWorldParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let ctx = ToolContext::from_request(&ctx);
        Ok(Self::into_call_result(self.greet(&ctx, &params.name)))
    }

    /// Extract data from the EIA Open Data API
    #[tool(
        description = "Extract energy data from the U.S. Energy Information Administration (EIA) API: petroleum and natural gas prices, production volumes, and STEO forecasts. Common queries: path=\"petroleum/pri/spt\" with facets='{\"series\":[\"RWTC\"]}' for WTI Cushing spot, '{\"series\":[\"RBRTE\"]}' for Brent; path=\"natural-gas/pri/sum\" for Henry Hub; path=\"petroleum/prod/sum\" with '{\"series\":[\"MCRFPUS1\"]}' for U.S. crude production; path=\"steo\" with '{\"series\":[\"WTIPUUS\"]}' for the STEO WTI forecast. Browse all series: https://www.eia.gov/opendata/browser/"
    )]
    pub async fn eia_data_extractor(
        &self,
        Parameters(params): Parameters<EiaDataParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let ctx = ToolContext::from_request(&ctx);
        Ok(Self::into_call_result(
            self.extract_eia_data(&ctx, &params).await,
        ))
    }

    /// Monte Carlo price simulation
    #[tool(
        description = "Run a Monte Carlo simulation for price forecasting using geometric Brownian motion. Volatility is annual as a decimal (0.25 for 25%); drift is the expected daily return. Returns the price distribution and 95%/68% confidence intervals."
    )]
    pub async fn monte_carlo_simulation(
        &self,
        Parameters(params): Parameters<MonteCarloParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let ctx = ToolContext::from_request(&ctx);
        let server = self.clone();
        let output = tokio::task::spawn_blocking(move || server.run_simulation(&ctx, &params))
            .await
            .map_err(|e| McpError::internal_error(format!("simulation task failed: {e}"), None))?;
        Ok(Self::into_call_result(output))
    }

    /// Summary statistics for a list of values
    #[tool(
        description = "Calculate mean, median, standard deviation, min, max, range and coefficient of variation for comma-separated numbers (e.g. \"71.5,70.2,72.1,69.8\")."
    )]
    pub async fn calculate_statistics(
        &self,
        Parameters(params): Parameters<StatisticsParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(Self::into_call_result(self.summarize_values(&params)))
    }

    /// Explain a trading term
    #[tool(
        description = "Explain energy trading terminology: full name, definition and trading context (e.g. \"wti\", \"contango\", \"crack spread\")."
    )]
    pub async fn explain_trading_term(
        &self,
        Parameters(params): Parameters<ExplainTermParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(Self::into_call_result(self.explain_term(&params.term)))
    }

    /// List glossary terms
    #[tool(
        description = "List available trading terms. Category: \"all\", \"benchmarks\", \"concepts\" or \"measurements\"."
    )]
    pub async fn list_trading_terms(
        &self,
        Parameters(params): Parameters<ListTermsParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(Self::into_call_result(self.list_terms(&params.category)))
    }
}

#[tool_handler]
impl ServerHandler for MarketAnalysisServer {
    fn get_info(&self) -> ServerInfo {
        let eia_note = if self.has_eia() {
            "EIA data is available via eia_data_extractor."
        } else {
            "EIA data is unavailable: no EIA API key is configured."
        };

        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
                title: Some(SERVER_TITLE.to_string()),
                icons: None,
                website_url: None,
            },
            instructions: Some(format!(
                "Market Analysis Assistant - energy trading analysis. Query U.S. energy data \
                 (eia_data_extractor), run Monte Carlo price simulations (monte_carlo_simulation), \
                 summarize price series (calculate_statistics) and look up trading terms \
                 (explain_trading_term, list_trading_terms). {eia_note}"
            )),
        }
    }
}
