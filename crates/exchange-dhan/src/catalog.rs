//! Instrument catalog: the Dhan scrip master, parsed and cached.
//!
//! The scrip master is a daily CSV of every tradable instrument. The
//! catalog keeps only NSE derivatives rows and resolves
//! (underlying, strike, option type, expiry) to a security id by exact
//! match over index options.
//!
//! The cache populates at most once per process and is never refreshed
//! within a session, even across an expiry rollover. Acceptable for a
//! same-day tool; restart to pick up a new file.

use crate::client::DhanClient;
use crate::error::{DhanError, Result};
use crate::types::InstrumentRecord;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use straddle_core::{OptionType, Strike};
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Columns of interest in the scrip master header.
const COL_EXCHANGE: &str = "SEM_EXM_EXCH_ID";
const COL_SEGMENT: &str = "SEM_SEGMENT";
const COL_INSTRUMENT: &str = "SEM_INSTRUMENT_NAME";
const COL_UNDERLYING: &str = "SEM_UNDERLYING_SYMBOL";
const COL_EXPIRY: &str = "SEM_EXPIRY_DATE";
const COL_STRIKE: &str = "SEM_STRIKE_PRICE";
const COL_OPTION_TYPE: &str = "SEM_OPTION_TYPE";
const COL_SECURITY_ID: &str = "SEM_SECURITY_ID";

/// Exchange and segment the assistant trades on.
const EXCHANGE_NSE: &str = "NSE";
const SEGMENT_DERIVATIVES: &str = "D";

/// Instrument kind for index options.
const INSTRUMENT_OPTIDX: &str = "OPTIDX";

/// Parsed, filtered scrip master.
#[derive(Debug, Clone, Default)]
pub struct InstrumentCatalog {
    records: Vec<InstrumentRecord>,
}

impl InstrumentCatalog {
    /// Parses scrip master CSV text into a catalog of NSE derivative rows.
    ///
    /// Rows with unparseable fields (futures without option type, malformed
    /// strikes) are skipped; a malformed header or a body with no usable
    /// rows is a load failure.
    ///
    /// # Errors
    /// `DhanError::CatalogLoad` when the header lacks a required column or
    /// the filtered catalog comes out empty.
    pub fn parse_csv(text: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let col = |name: &str| -> Result<usize> {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                DhanError::catalog_load(format!("scrip master header missing column {name}"))
            })
        };

        let exchange_idx = col(COL_EXCHANGE)?;
        let segment_idx = col(COL_SEGMENT)?;
        let instrument_idx = col(COL_INSTRUMENT)?;
        let underlying_idx = col(COL_UNDERLYING)?;
        let expiry_idx = col(COL_EXPIRY)?;
        let strike_idx = col(COL_STRIKE)?;
        let option_type_idx = col(COL_OPTION_TYPE)?;
        let security_id_idx = col(COL_SECURITY_ID)?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let field = |idx: usize| row.get(idx).unwrap_or("");

            if field(exchange_idx) != EXCHANGE_NSE || field(segment_idx) != SEGMENT_DERIVATIVES
            {
                continue;
            }

            // Futures rows carry no option type; options without a clean
            // strike are useless to us. Both are skipped, not fatal.
            let Some(option_type) = OptionType::from_code(field(option_type_idx)) else {
                continue;
            };
            let Some(strike) = parse_strike(field(strike_idx)) else {
                continue;
            };
            let Some(expiry) = parse_expiry(field(expiry_idx)) else {
                debug!(row = ?row, "skipping row with unparseable expiry");
                continue;
            };

            records.push(InstrumentRecord {
                exchange: field(exchange_idx).to_string(),
                segment: field(segment_idx).to_string(),
                instrument: field(instrument_idx).to_string(),
                underlying: field(underlying_idx).to_string(),
                expiry,
                strike,
                option_type,
                security_id: field(security_id_idx).to_string(),
            });
        }

        if records.is_empty() {
            return Err(DhanError::catalog_load(
                "scrip master contained no NSE derivative option rows",
            ));
        }

        info!(rows = records.len(), "instrument catalog loaded");
        Ok(Self { records })
    }

    /// Number of catalog rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the catalog holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolves a leg to its tradable security id by exact match over index
    /// options.
    ///
    /// Pure over the catalog snapshot: identical inputs always yield the
    /// same id or the same failure.
    ///
    /// # Errors
    /// `DhanError::InstrumentNotFound` naming the exact missing contract.
    pub fn resolve(
        &self,
        underlying: &str,
        strike: Strike,
        option_type: OptionType,
        expiry: NaiveDate,
    ) -> Result<String> {
        self.records
            .iter()
            .find(|r| {
                r.instrument == INSTRUMENT_OPTIDX
                    && r.underlying == underlying
                    && r.expiry == expiry
                    && r.strike == strike
                    && r.option_type == option_type
            })
            .map(|r| r.security_id.clone())
            .ok_or_else(|| {
                DhanError::instrument_not_found(underlying, strike, option_type, expiry)
            })
    }
}

/// Strike field parses like `"24800.000000"`; rendered to the integer grid.
fn parse_strike(field: &str) -> Option<Strike> {
    let value: f64 = field.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(Strike(value.round() as u32))
}

/// Expiry field is an ISO date, sometimes with a trailing time component.
fn parse_expiry(field: &str) -> Option<NaiveDate> {
    let date_part = field.get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

// =============================================================================
// Process-wide cache
// =============================================================================

/// Lazily populated, at-most-once catalog cache.
///
/// Population happens on first need; a failed load leaves the cell empty so
/// the next user-initiated action fetches again. A successful load is held
/// for the life of the process and never invalidated.
#[derive(Debug, Default)]
pub struct CatalogCache {
    cell: OnceCell<InstrumentCatalog>,
}

impl CatalogCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached catalog, fetching and parsing it first if this is
    /// the initial call.
    ///
    /// # Errors
    /// Propagates fetch/parse failures as `DhanError::CatalogLoad`.
    pub async fn get_or_load(&self, client: &DhanClient) -> Result<&InstrumentCatalog> {
        self.cell
            .get_or_try_init(|| async {
                let text = client.fetch_instrument_master().await?;
                InstrumentCatalog::parse_csv(&text)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionAuth;
    use crate::client::DhanClientConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HEADER: &str = "SEM_EXM_EXCH_ID,SEM_SEGMENT,SEM_SMST_SECURITY_ID,SEM_INSTRUMENT_NAME,SEM_EXPIRY_DATE,SEM_STRIKE_PRICE,SEM_OPTION_TYPE,SEM_UNDERLYING_SYMBOL,SEM_SECURITY_ID";

    fn sample_csv() -> String {
        [
            HEADER,
            "NSE,D,1,OPTIDX,2026-08-27,24800.000000,CE,NIFTY,49081",
            "NSE,D,2,OPTIDX,2026-08-27,24800.000000,PE,NIFTY,49082",
            "NSE,D,3,OPTIDX,2026-08-27,24850.000000,CE,NIFTY,49083",
            "NSE,D,4,OPTIDX,2026-09-03,24800.000000,CE,NIFTY,49181",
            "NSE,D,5,OPTIDX,2026-08-27,52000.000000,CE,BANKNIFTY,51081",
            "NSE,D,6,FUTIDX,2026-08-27,0.000000,,NIFTY,40001",
            "BSE,D,7,OPTIDX,2026-08-27,24800.000000,CE,NIFTY,60001",
            "NSE,E,8,EQUITY,,,,RELIANCE,70001",
        ]
        .join("\n")
    }

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 27).unwrap()
    }

    #[test]
    fn parse_filters_to_nse_derivative_options() {
        let catalog = InstrumentCatalog::parse_csv(&sample_csv()).unwrap();
        // 5 NSE/D option rows survive; futures, BSE, and equity rows drop.
        assert_eq!(catalog.len(), 5);
    }

    #[test]
    fn resolve_exact_match() {
        let catalog = InstrumentCatalog::parse_csv(&sample_csv()).unwrap();
        let id = catalog
            .resolve("NIFTY", Strike(24800), OptionType::Call, expiry())
            .unwrap();
        assert_eq!(id, "49081");

        let id = catalog
            .resolve("NIFTY", Strike(24800), OptionType::Put, expiry())
            .unwrap();
        assert_eq!(id, "49082");
    }

    #[test]
    fn resolve_is_pure_over_a_snapshot() {
        let catalog = InstrumentCatalog::parse_csv(&sample_csv()).unwrap();
        let a = catalog.resolve("NIFTY", Strike(24850), OptionType::Call, expiry());
        let b = catalog.resolve("NIFTY", Strike(24850), OptionType::Call, expiry());
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn resolve_miss_names_the_contract() {
        let catalog = InstrumentCatalog::parse_csv(&sample_csv()).unwrap();
        let err = catalog
            .resolve("NIFTY", Strike(24900), OptionType::Call, expiry())
            .unwrap_err();
        match err {
            DhanError::InstrumentNotFound {
                underlying,
                strike,
                option_type,
                expiry: missing_expiry,
            } => {
                assert_eq!(underlying, "NIFTY");
                assert_eq!(strike, Strike(24900));
                assert_eq!(option_type, OptionType::Call);
                assert_eq!(missing_expiry, expiry());
            }
            other => panic!("expected InstrumentNotFound, got {other:?}"),
        }
    }

    #[test]
    fn resolve_does_not_cross_expiry_or_underlying() {
        let catalog = InstrumentCatalog::parse_csv(&sample_csv()).unwrap();
        let next_week = NaiveDate::from_ymd_opt(2026, 9, 3).unwrap();

        // 24850 CE exists this week but not next.
        assert!(catalog
            .resolve("NIFTY", Strike(24850), OptionType::Call, next_week)
            .is_err());
        // 52000 CE exists only for BANKNIFTY.
        assert!(catalog
            .resolve("NIFTY", Strike(52000), OptionType::Call, expiry())
            .is_err());
    }

    #[test]
    fn missing_header_column_is_a_load_failure() {
        let err = InstrumentCatalog::parse_csv("A,B,C\n1,2,3").unwrap_err();
        match err {
            DhanError::CatalogLoad(message) => {
                assert!(message.contains("SEM_EXM_EXCH_ID"));
            }
            other => panic!("expected CatalogLoad, got {other:?}"),
        }
    }

    #[test]
    fn no_usable_rows_is_a_load_failure() {
        let text = format!("{HEADER}\nBSE,D,1,OPTIDX,2026-08-27,100.0,CE,SENSEX,1");
        assert!(matches!(
            InstrumentCatalog::parse_csv(&text),
            Err(DhanError::CatalogLoad(_))
        ));
    }

    #[test]
    fn expiry_with_time_component_parses() {
        assert_eq!(parse_expiry("2026-08-27 14:30:00"), Some(expiry()));
        assert_eq!(parse_expiry("2026-08-27"), Some(expiry()));
        assert_eq!(parse_expiry("soon"), None);
    }

    #[tokio::test]
    async fn cache_fetches_at_most_once() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api-scrip-master.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string(sample_csv()))
            .expect(1)
            .mount(&server)
            .await;

        let config = DhanClientConfig::default()
            .with_base_url(server.uri())
            .with_scrip_master_url(format!("{}/api-scrip-master.csv", server.uri()));
        let auth = SessionAuth::new("test-token", "1100012345").unwrap();
        let client = DhanClient::new(config, auth).unwrap();

        let cache = CatalogCache::new();
        let first = cache.get_or_load(&client).await.unwrap().len();
        let second = cache.get_or_load(&client).await.unwrap().len();
        assert_eq!(first, second);
        // MockServer::expect(1) verifies the single fetch on drop.
    }
}
