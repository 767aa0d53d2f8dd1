//! Energy trading glossary.

use std::fmt;
use std::str::FromStr;

/// A glossary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlossaryEntry {
    /// Lookup key, lowercase
    pub key: &'static str,
    /// Expanded name
    pub full_name: &'static str,
    /// Plain definition
    pub definition: &'static str,
    /// How traders use the term
    pub context: &'static str,
}

/// All terms, in display order.
pub static GLOSSARY: &[GlossaryEntry] = &[
    GlossaryEntry {
        key: "wti",
        full_name: "West Texas Intermediate",
        definition: "Light, sweet crude oil benchmark priced at Cushing, Oklahoma. Primary US oil price reference.",
        context: "Trading: 'WTI futures' refers to NYMEX contracts. 'WTI spot' is physical oil at Cushing.",
    },
    GlossaryEntry {
        key: "brent",
        full_name: "Brent Crude",
        definition: "Global oil price benchmark from North Sea production. Priced at ICE exchange.",
        context: "Trading: Brent is the international standard. Typically trades at premium to WTI.",
    },
    GlossaryEntry {
        key: "crack spread",
        full_name: "Crack Spread",
        definition: "Difference between crude oil price and refined product prices (gasoline, diesel).",
        context: "Trading: Refiners monitor crack spreads to assess profitability. '3-2-1 crack' = 3 barrels crude to 2 gasoline, 1 diesel.",
    },
    GlossaryEntry {
        key: "contango",
        full_name: "Contango",
        definition: "Market condition where future prices are higher than spot prices.",
        context: "Trading: Indicates excess supply or storage costs. Traders can profit by buying spot, selling futures, and storing.",
    },
    GlossaryEntry {
        key: "backwardation",
        full_name: "Backwardation",
        definition: "Market condition where future prices are lower than spot prices.",
        context: "Trading: Indicates tight supply. No incentive to store. Immediate demand exceeds future expectations.",
    },
    GlossaryEntry {
        key: "eia",
        full_name: "U.S. Energy Information Administration",
        definition: "Federal agency providing energy data, forecasts, and analysis.",
        context: "Trading: EIA weekly petroleum reports (Wed 10:30 AM ET) are market-moving events. Track inventory levels closely.",
    },
    GlossaryEntry {
        key: "opec",
        full_name: "Organization of Petroleum Exporting Countries",
        definition: "Cartel of oil-producing nations coordinating production policy.",
        context: "Trading: OPEC+ meetings drive market volatility. Production cuts/increases directly impact prices.",
    },
    GlossaryEntry {
        key: "cushing",
        full_name: "Cushing, Oklahoma",
        definition: "Major oil storage hub and delivery point for NYMEX WTI futures contracts.",
        context: "Trading: Cushing inventory levels signal US supply tightness. Low storage = bullish. High storage = bearish.",
    },
    GlossaryEntry {
        key: "nymex",
        full_name: "New York Mercantile Exchange",
        definition: "Primary commodity futures exchange for WTI crude and natural gas.",
        context: "Trading: WTI futures (CL contract) trade on NYMEX. Contract size: 1,000 barrels. Tick: $0.01/barrel = $10.",
    },
    GlossaryEntry {
        key: "henry hub",
        full_name: "Henry Hub",
        definition: "Natural gas pipeline hub in Louisiana. Pricing point for NYMEX gas futures.",
        context: "Trading: NG contract settled at Henry Hub. Regional basis differentials affect local gas pricing.",
    },
    GlossaryEntry {
        key: "mcf",
        full_name: "Thousand Cubic Feet",
        definition: "Unit of natural gas volume measurement. 1 MCF ≈ 1 MMBtu.",
        context: "Trading: Natural gas priced in $/MMBtu. Production reported in MCF or BCF (billion cubic feet).",
    },
    GlossaryEntry {
        key: "mmbtu",
        full_name: "Million British Thermal Units",
        definition: "Energy content measurement for natural gas. Standard trading unit.",
        context: "Trading: Henry Hub futures quoted in $/MMBtu. 1 MMBtu ≈ 1 MCF for pipeline-quality gas.",
    },
    GlossaryEntry {
        key: "strip",
        full_name: "Calendar Strip",
        definition: "Series of futures contracts spanning a time period (month, quarter, year).",
        context: "Trading: 'Buying the 2026 strip' = buying all 12 monthly contracts for 2026. Provides price certainty.",
    },
    GlossaryEntry {
        key: "basis",
        full_name: "Basis Differential",
        definition: "Price difference between local market and benchmark (e.g., WTI minus Houston crude).",
        context: "Trading: Basis risk affects hedging. Narrow basis = strong local market. Wide basis = weak local demand.",
    },
    GlossaryEntry {
        key: "arb",
        full_name: "Arbitrage",
        definition: "Exploiting price differences between related markets or contracts.",
        context: "Trading: 'Brent-WTI arb' = spread between benchmarks. 'Time arb' = contango/backwardation play.",
    },
    GlossaryEntry {
        key: "prompt",
        full_name: "Prompt Month",
        definition: "Nearest futures contract month. Most liquid and actively traded.",
        context: "Trading: Prompt WTI = front-month contract. Price most sensitive to immediate supply/demand.",
    },
    GlossaryEntry {
        key: "long",
        full_name: "Long Position",
        definition: "Owning an asset or futures contract. Profits when price rises.",
        context: "Trading: 'Long 100 WTI' = own 100 contracts (100,000 barrels). Bullish position.",
    },
    GlossaryEntry {
        key: "short",
        full_name: "Short Position",
        definition: "Selling an asset you don't own or selling futures. Profits when price falls.",
        context: "Trading: 'Short 50 NG' = sold 50 contracts without owning. Bearish position. Must buy back to close.",
    },
];

/// Looks up a term, ignoring case and surrounding whitespace.
pub fn lookup(term: &str) -> Option<&'static GlossaryEntry> {
    let key = term.trim().to_lowercase();
    GLOSSARY.iter().find(|entry| entry.key == key)
}

/// Number of terms in the glossary.
pub fn len() -> usize {
    GLOSSARY.len()
}

/// The first `n` keys in display order.
pub fn keys(n: usize) -> impl Iterator<Item = &'static str> {
    GLOSSARY.iter().take(n).map(|entry| entry.key)
}

/// Grouping used by the term listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermCategory {
    /// Price benchmarks and exchanges
    Benchmarks,
    /// Market structure and spreads
    Concepts,
    /// Units
    Measurements,
    /// Agencies and cartels
    Organizations,
    /// Long and short
    Positions,
}

impl TermCategory {
    /// Categories in listing order.
    pub const ALL: [TermCategory; 5] = [
        TermCategory::Benchmarks,
        TermCategory::Concepts,
        TermCategory::Measurements,
        TermCategory::Organizations,
        TermCategory::Positions,
    ];

    /// Keys in this category.
    pub fn terms(&self) -> &'static [&'static str] {
        match self {
            TermCategory::Benchmarks => &["wti", "brent", "henry hub", "cushing", "nymex"],
            TermCategory::Concepts => &[
                "contango",
                "backwardation",
                "crack spread",
                "basis",
                "arb",
                "strip",
                "prompt",
            ],
            TermCategory::Measurements => &["mcf", "mmbtu"],
            TermCategory::Organizations => &["eia", "opec"],
            TermCategory::Positions => &["long", "short"],
        }
    }

    /// Entries in this category, skipping keys missing from the glossary.
    pub fn entries(&self) -> impl Iterator<Item = &'static GlossaryEntry> {
        self.terms().iter().filter_map(|key| lookup(key))
    }

    /// Section heading.
    pub fn heading(&self) -> &'static str {
        match self {
            TermCategory::Benchmarks => "📊 Benchmarks & Markets",
            TermCategory::Concepts => "💡 Trading Concepts",
            TermCategory::Measurements => "📏 Measurements",
            TermCategory::Organizations => "🏢 Organizations",
            TermCategory::Positions => "📈 Positions",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            TermCategory::Benchmarks => "benchmarks",
            TermCategory::Concepts => "concepts",
            TermCategory::Measurements => "measurements",
            TermCategory::Organizations => "organizations",
            TermCategory::Positions => "positions",
        }
    }
}

impl fmt::Display for TermCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category filter accepted by the term listing.
///
/// `all` shows every category. A single category can be selected by name;
/// organizations and positions only appear under `all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Every category
    All,
    /// One selectable category
    Only(TermCategory),
    /// Unrecognized name; lists nothing
    Unknown,
}

impl CategoryFilter {
    /// Categories selected by this filter, in listing order.
    pub fn categories(&self) -> Vec<TermCategory> {
        match self {
            CategoryFilter::All => TermCategory::ALL.to_vec(),
            CategoryFilter::Only(category) => vec![*category],
            CategoryFilter::Unknown => Vec::new(),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "all" => CategoryFilter::All,
            "benchmarks" => CategoryFilter::Only(TermCategory::Benchmarks),
            "concepts" => CategoryFilter::Only(TermCategory::Concepts),
            "measurements" => CategoryFilter::Only(TermCategory::Measurements),
            _ => CategoryFilter::Unknown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glossary_size() {
        assert_eq!(len(), 18);
    }

    #[test]
    fn test_lookup_normalizes() {
        assert_eq!(lookup("WTI").map(|e| e.full_name), Some("West Texas Intermediate"));
        assert_eq!(lookup("  Crack Spread ").map(|e| e.key), Some("crack spread"));
        assert!(lookup("unknown_term_xyz").is_none());
    }

    #[test]
    fn test_first_keys() {
        let keys: Vec<_> = keys(3).collect();
        assert_eq!(keys, vec!["wti", "brent", "crack spread"]);
        assert_eq!(super::keys(100).count(), 18);
    }

    #[test]
    fn test_categories_cover_glossary() {
        let mut listed: Vec<_> = TermCategory::ALL
            .iter()
            .flat_map(|c| c.terms().iter().copied())
            .collect();
        listed.sort_unstable();
        let mut all: Vec<_> = GLOSSARY.iter().map(|e| e.key).collect();
        all.sort_unstable();
        assert_eq!(listed, all);
    }

    #[test]
    fn test_category_filter() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap().categories().len(), 5);
        assert_eq!(
            "benchmarks".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(TermCategory::Benchmarks)
        );
        // Organizations only appear in the full listing
        assert_eq!(
            "organizations".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Unknown
        );
        assert!(CategoryFilter::Unknown.categories().is_empty());
    }
}
