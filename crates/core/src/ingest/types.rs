use crate::domain::price::PriceBar;
use serde::{Deserialize, Serialize};

/// Response body of the market-data HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPricesResponse {
    pub ticker: String,
    pub bars: Vec<PriceBar>,
}
