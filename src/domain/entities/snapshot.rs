use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Latest technical indicators for a security
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalMetrics {
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub price: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub adx: Option<f64>,
    pub plus_di: Option<f64>,
    pub minus_di: Option<f64>,
    pub upper_band: Option<f64>,
    pub lower_band: Option<f64>,
    pub middle_band: Option<f64>,
    /// Bullish MACD crossover flag, derived upstream
    pub bullish_flag: Option<bool>,
}

/// Fundamental ratios. Growth and margin figures are percentages (12.5 = 12.5%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundamentalMetrics {
    pub pe_ttm: Option<f64>,
    pub ps_ttm: Option<f64>,
    pub eps_growth_yoy: Option<f64>,
    pub revenue_growth_yoy: Option<f64>,
    pub net_margin: Option<f64>,
    pub roe: Option<f64>,
    pub gross_margin: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub ev_to_ebitda: Option<f64>,
}

/// Sector-average counterparts of [`FundamentalMetrics`]
pub type SectorBenchmark = FundamentalMetrics;

/// Earnings quality letter grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EarningsQualityGrade {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl EarningsQualityGrade {
    /// Points out of 25 awarded by the fundamental calculator
    pub fn points(&self) -> f64 {
        match self {
            EarningsQualityGrade::A => 25.0,
            EarningsQualityGrade::AMinus => 22.0,
            EarningsQualityGrade::BPlus => 20.0,
            EarningsQualityGrade::B => 17.0,
            EarningsQualityGrade::BMinus => 15.0,
            EarningsQualityGrade::CPlus => 12.0,
            EarningsQualityGrade::C => 10.0,
            EarningsQualityGrade::CMinus => 7.0,
            EarningsQualityGrade::D => 5.0,
            EarningsQualityGrade::F => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EarningsQualityGrade::A => "A",
            EarningsQualityGrade::AMinus => "A-",
            EarningsQualityGrade::BPlus => "B+",
            EarningsQualityGrade::B => "B",
            EarningsQualityGrade::BMinus => "B-",
            EarningsQualityGrade::CPlus => "C+",
            EarningsQualityGrade::C => "C",
            EarningsQualityGrade::CMinus => "C-",
            EarningsQualityGrade::D => "D",
            EarningsQualityGrade::F => "F",
        }
    }
}

impl fmt::Display for EarningsQualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EarningsQualityGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(EarningsQualityGrade::A),
            "A-" => Ok(EarningsQualityGrade::AMinus),
            "B+" => Ok(EarningsQualityGrade::BPlus),
            "B" => Ok(EarningsQualityGrade::B),
            "B-" => Ok(EarningsQualityGrade::BMinus),
            "C+" => Ok(EarningsQualityGrade::CPlus),
            "C" => Ok(EarningsQualityGrade::C),
            "C-" => Ok(EarningsQualityGrade::CMinus),
            "D" => Ok(EarningsQualityGrade::D),
            "F" => Ok(EarningsQualityGrade::F),
            other => Err(format!("Unknown earnings quality grade: {}", other)),
        }
    }
}

/// Empty or unrecognized grades decode as no grade, which scores 0
fn lenient_grade<'de, D>(deserializer: D) -> Result<Option<EarningsQualityGrade>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|grade| grade.parse().ok()))
}

/// Company news sentiment aggregates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsSentiment {
    /// Company news score in [0, 1]
    pub company_news_score: Option<f64>,
    /// Sector-average news score, when the source provides one
    pub sector_average_news_score: Option<f64>,
    pub bullish_percent: Option<f64>,
    pub bearish_percent: Option<f64>,
}

/// Social media mention counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialSentiment {
    pub positive_mentions: u64,
    pub negative_mentions: u64,
    pub total_mentions: u64,
}

/// Analyst recommendation counts and price target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalystMetrics {
    pub buy: u32,
    pub strong_buy: u32,
    pub hold: u32,
    pub sell: u32,
    pub strong_sell: u32,
    pub target_median: Option<f64>,
    pub current_price: Option<f64>,
}

impl AnalystMetrics {
    /// Sum of every rating count, widened so external counts cannot overflow
    pub fn total_ratings(&self) -> u64 {
        [self.buy, self.strong_buy, self.hold, self.sell, self.strong_sell]
            .iter()
            .map(|&count| u64::from(count))
            .sum()
    }
}

/// Most recent earnings report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarningsRecord {
    pub eps_estimate: Option<f64>,
    pub eps_actual: Option<f64>,
}

/// All metrics available for one security at scoring time.
///
/// Every category is optional; a missing category scores 0 in the composite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityMetricSnapshot {
    pub symbol: String,
    pub security_id: Option<i64>,
    pub technical: Option<TechnicalMetrics>,
    pub fundamental: Option<FundamentalMetrics>,
    pub sector_benchmark: Option<SectorBenchmark>,
    #[serde(deserialize_with = "lenient_grade")]
    pub earnings_quality: Option<EarningsQualityGrade>,
    pub news_sentiment: Option<NewsSentiment>,
    pub social_sentiment: Option<SocialSentiment>,
    pub analyst: Option<AnalystMetrics>,
    pub earnings: Option<EarningsRecord>,
}

impl SecurityMetricSnapshot {
    pub fn new(symbol: impl Into<String>) -> Self {
        SecurityMetricSnapshot {
            symbol: symbol.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_points_table() {
        let expected = [
            ("A", 25.0),
            ("A-", 22.0),
            ("B+", 20.0),
            ("B", 17.0),
            ("B-", 15.0),
            ("C+", 12.0),
            ("C", 10.0),
            ("C-", 7.0),
            ("D", 5.0),
            ("F", 0.0),
        ];
        for (grade, points) in expected {
            let parsed: EarningsQualityGrade = grade.parse().unwrap();
            assert_eq!(parsed.points(), points, "grade {}", grade);
            assert_eq!(parsed.as_str(), grade);
        }
    }

    #[test]
    fn test_grade_parse_unknown() {
        assert!("E".parse::<EarningsQualityGrade>().is_err());
        assert!("".parse::<EarningsQualityGrade>().is_err());
        assert_eq!(
            " b+ ".parse::<EarningsQualityGrade>().unwrap(),
            EarningsQualityGrade::BPlus
        );
    }

    #[test]
    fn test_snapshot_deserializes_with_missing_categories() {
        let snapshot: SecurityMetricSnapshot =
            serde_json::from_str(r#"{"symbol":"MSFT","earnings_quality":"B-"}"#).unwrap();
        assert_eq!(snapshot.symbol, "MSFT");
        assert!(snapshot.technical.is_none());
        assert_eq!(snapshot.earnings_quality, Some(EarningsQualityGrade::BMinus));
    }

    #[test]
    fn test_total_ratings() {
        let analyst = AnalystMetrics {
            buy: 3,
            strong_buy: 2,
            hold: 4,
            sell: 1,
            strong_sell: 0,
            ..Default::default()
        };
        assert_eq!(analyst.total_ratings(), 10);
    }

    #[test]
    fn test_total_ratings_does_not_overflow() {
        let analyst = AnalystMetrics {
            buy: u32::MAX,
            strong_buy: u32::MAX,
            hold: 1,
            ..Default::default()
        };
        assert_eq!(analyst.total_ratings(), 2 * u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_empty_or_unknown_grade_decodes_as_none() {
        for payload in [
            r#"{"symbol":"X","earnings_quality":""}"#,
            r#"{"symbol":"X","earnings_quality":"Z"}"#,
            r#"{"symbol":"X","earnings_quality":null}"#,
        ] {
            let snapshot: SecurityMetricSnapshot = serde_json::from_str(payload).unwrap();
            assert_eq!(snapshot.earnings_quality, None, "payload {}", payload);
        }

        let snapshot: SecurityMetricSnapshot =
            serde_json::from_str(r#"{"symbol":"X","earnings_quality":" a- "}"#).unwrap();
        assert_eq!(snapshot.earnings_quality, Some(EarningsQualityGrade::AMinus));
    }

    #[test]
    fn test_grade_survives_json_round_trip() {
        let mut snapshot = SecurityMetricSnapshot::new("X");
        snapshot.earnings_quality = Some(EarningsQualityGrade::CPlus);
        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: SecurityMetricSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, snapshot);
    }
}
