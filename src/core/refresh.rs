//! Input acquisition into the data directory
//!
//! FRED series land in `raw/` and are preprocessed into `processed/macro.csv`;
//! index and equal-weight closes land in `processed/market_prices.csv` and
//! `processed/breadth_prices.csv`.

use tracing::{info, warn};

use crate::config;
use crate::core::pipeline::PipelineError;
use crate::services::fred::{fetch_all, FredClient, FredSeries, MacroDataSource};
use crate::services::preprocess::preprocess_macro;
use crate::services::prices::{
    fetch_breadth_prices, fetch_market_prices, PriceSource, YahooChartClient,
};
use crate::services::store::DataStore;

/// Row counts written by [`refresh_prices`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRefresh {
    pub market_rows: usize,
    /// `None` when the breadth download failed and the previous file was kept.
    pub breadth_rows: Option<usize>,
}

/// Download every FRED series, store the raw files and rebuild the macro observations.
pub async fn refresh_macro(
    store: &DataStore,
    source: &dyn MacroDataSource,
) -> Result<usize, PipelineError> {
    store.ensure_dirs()?;
    for (series, observations) in fetch_all(source, &FredSeries::ALL).await? {
        store.write_raw(series, &observations)?;
    }

    let observations = preprocess_macro(&store.load_raw_macro()?);
    info!(rows = observations.len(), "Macro observations preprocessed");
    store.write_macro_observations(&observations)?;
    Ok(observations.len())
}

/// Download market and breadth closes.
///
/// Market closes are required. Breadth fails open: on error the existing
/// breadth file, if any, is left untouched.
pub async fn refresh_prices(
    store: &DataStore,
    source: &dyn PriceSource,
) -> Result<PriceRefresh, PipelineError> {
    store.ensure_dirs()?;
    let market = fetch_market_prices(source).await?;
    store.write_market_prices(&market)?;

    let breadth_rows = match fetch_breadth_prices(source).await {
        Ok(points) => {
            store.write_breadth_prices(&points)?;
            Some(points.len())
        }
        Err(e) => {
            warn!(error = %e, "Breadth download failed, keeping existing breadth prices");
            None
        }
    };

    Ok(PriceRefresh {
        market_rows: market.len(),
        breadth_rows,
    })
}

/// Run the downloads enabled through `FRED_FETCH` and `MARKET_FETCH`.
pub async fn refresh_from_env(store: &DataStore) -> Result<(), PipelineError> {
    if config::fred_fetch_enabled() {
        let client = FredClient::new(&config::get_fred_base_url())?;
        refresh_macro(store, &client).await?;
    }

    if config::market_fetch_enabled() {
        let client = YahooChartClient::new(&config::get_price_base_url())?;
        let written = refresh_prices(store, &client).await?;
        info!(
            market_rows = written.market_rows,
            breadth_rows = ?written.breadth_rows,
            "Price inputs refreshed"
        );
    }

    Ok(())
}
