//! Data collaborators feeding the engines: FRED and price downloads,
//! preprocessing, trend projection and CSV storage.

pub mod fred;
pub mod preprocess;
pub mod prices;
pub mod projection;
pub mod store;

pub use fred::{fetch_all, FredClient, FredError, FredSeries, MacroDataSource};
pub use preprocess::{preprocess_macro, RawMacroSeries};
pub use prices::{
    fetch_breadth_prices, fetch_market_prices, PriceError, PriceInterval, PriceSource,
    YahooChartClient,
};
pub use projection::{project_macro, project_market};
pub use store::{DataStore, StoreError};
