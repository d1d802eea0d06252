pub mod screener;
pub mod snapshot;
pub mod trading_score;

pub use screener::{ScreenPage, ScreenerQuery, ScreenerRecord, SecurityRow};
pub use snapshot::SecurityMetricSnapshot;
pub use trading_score::{CategoryWeights, FundamentalPercentages, TradingScoreRecord};
