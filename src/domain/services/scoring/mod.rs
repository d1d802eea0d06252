pub mod aggregator;
pub mod analyst;
pub mod fundamental;
pub mod news_sentiment;
pub mod score_calculator;
pub mod social_sentiment;
pub mod technical;

pub use aggregator::{TradingScoreAggregator, TradingScoreReport};
pub use analyst::{AnalystInput, AnalystScore, AnalystScoreCalculator};
pub use fundamental::{
    FundamentalInput, FundamentalScore, FundamentalScoreCalculator, SectorComparison,
};
pub use news_sentiment::{NewsSentimentCalculator, NewsSentimentScore};
pub use score_calculator::{CategoryScore, CategoryScoreCalculator};
pub use social_sentiment::{SocialSentimentCalculator, SocialSentimentScore};
pub use technical::{TechnicalScore, TechnicalScoreCalculator};
