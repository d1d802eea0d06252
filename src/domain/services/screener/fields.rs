use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A column of the joined "latest metrics per security" dataset.
///
/// The string form matches the metric names stored in `security_metrics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricField {
    #[serde(rename = "sector")]
    Sector,
    #[serde(rename = "industry")]
    Industry,
    #[serde(rename = "market_cap")]
    MarketCap,
    #[serde(rename = "close")]
    Close,
    #[serde(rename = "percent_change")]
    PercentChange,
    #[serde(rename = "volume")]
    Volume,
    #[serde(rename = "avg_volume_10d")]
    AvgVolume10d,
    #[serde(rename = "avg_volume_3m")]
    AvgVolume3m,
    #[serde(rename = "rsi")]
    Rsi,
    #[serde(rename = "macd")]
    Macd,
    #[serde(rename = "macd_signal")]
    MacdSignal,
    #[serde(rename = "macd_hist")]
    MacdHist,
    #[serde(rename = "sma50")]
    Sma50,
    #[serde(rename = "sma200")]
    Sma200,
    #[serde(rename = "adx")]
    Adx,
    #[serde(rename = "plus_di")]
    PlusDi,
    #[serde(rename = "minus_di")]
    MinusDi,
    #[serde(rename = "upper_band")]
    UpperBand,
    #[serde(rename = "middle_band")]
    MiddleBand,
    #[serde(rename = "lower_band")]
    LowerBand,
    #[serde(rename = "pettm")]
    PeTtm,
    #[serde(rename = "pbannual")]
    PbAnnual,
    #[serde(rename = "psttm")]
    PsTtm,
    #[serde(rename = "pfcfsharettm")]
    PfcfShareTtm,
    #[serde(rename = "evebitdattm")]
    EvEbitdaTtm,
    #[serde(rename = "pegttm")]
    PegTtm,
    #[serde(rename = "roettm")]
    RoeTtm,
    #[serde(rename = "grossmarginttm")]
    GrossMarginTtm,
    #[serde(rename = "operatingmarginttm")]
    OperatingMarginTtm,
    #[serde(rename = "netprofitmarginttm")]
    NetProfitMarginTtm,
    #[serde(rename = "revenuegrowthttmyoy")]
    RevenueGrowthTtmYoy,
    #[serde(rename = "epsgrowthttmyoy")]
    EpsGrowthTtmYoy,
    #[serde(rename = "currentdividendyieldttm")]
    DividendYieldTtm,
    #[serde(rename = "payoutratiottm")]
    PayoutRatioTtm,
    #[serde(rename = "currentratioannual")]
    CurrentRatioAnnual,
    #[serde(rename = "quickratioannual")]
    QuickRatioAnnual,
    #[serde(rename = "totaldebt_totalequityannual")]
    DebtToEquityAnnual,
    #[serde(rename = "beta")]
    Beta,
}

impl MetricField {
    pub const ALL: [MetricField; 38] = [
        MetricField::Sector,
        MetricField::Industry,
        MetricField::MarketCap,
        MetricField::Close,
        MetricField::PercentChange,
        MetricField::Volume,
        MetricField::AvgVolume10d,
        MetricField::AvgVolume3m,
        MetricField::Rsi,
        MetricField::Macd,
        MetricField::MacdSignal,
        MetricField::MacdHist,
        MetricField::Sma50,
        MetricField::Sma200,
        MetricField::Adx,
        MetricField::PlusDi,
        MetricField::MinusDi,
        MetricField::UpperBand,
        MetricField::MiddleBand,
        MetricField::LowerBand,
        MetricField::PeTtm,
        MetricField::PbAnnual,
        MetricField::PsTtm,
        MetricField::PfcfShareTtm,
        MetricField::EvEbitdaTtm,
        MetricField::PegTtm,
        MetricField::RoeTtm,
        MetricField::GrossMarginTtm,
        MetricField::OperatingMarginTtm,
        MetricField::NetProfitMarginTtm,
        MetricField::RevenueGrowthTtmYoy,
        MetricField::EpsGrowthTtmYoy,
        MetricField::DividendYieldTtm,
        MetricField::PayoutRatioTtm,
        MetricField::CurrentRatioAnnual,
        MetricField::QuickRatioAnnual,
        MetricField::DebtToEquityAnnual,
        MetricField::Beta,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricField::Sector => "sector",
            MetricField::Industry => "industry",
            MetricField::MarketCap => "market_cap",
            MetricField::Close => "close",
            MetricField::PercentChange => "percent_change",
            MetricField::Volume => "volume",
            MetricField::AvgVolume10d => "avg_volume_10d",
            MetricField::AvgVolume3m => "avg_volume_3m",
            MetricField::Rsi => "rsi",
            MetricField::Macd => "macd",
            MetricField::MacdSignal => "macd_signal",
            MetricField::MacdHist => "macd_hist",
            MetricField::Sma50 => "sma50",
            MetricField::Sma200 => "sma200",
            MetricField::Adx => "adx",
            MetricField::PlusDi => "plus_di",
            MetricField::MinusDi => "minus_di",
            MetricField::UpperBand => "upper_band",
            MetricField::MiddleBand => "middle_band",
            MetricField::LowerBand => "lower_band",
            MetricField::PeTtm => "pettm",
            MetricField::PbAnnual => "pbannual",
            MetricField::PsTtm => "psttm",
            MetricField::PfcfShareTtm => "pfcfsharettm",
            MetricField::EvEbitdaTtm => "evebitdattm",
            MetricField::PegTtm => "pegttm",
            MetricField::RoeTtm => "roettm",
            MetricField::GrossMarginTtm => "grossmarginttm",
            MetricField::OperatingMarginTtm => "operatingmarginttm",
            MetricField::NetProfitMarginTtm => "netprofitmarginttm",
            MetricField::RevenueGrowthTtmYoy => "revenuegrowthttmyoy",
            MetricField::EpsGrowthTtmYoy => "epsgrowthttmyoy",
            MetricField::DividendYieldTtm => "currentdividendyieldttm",
            MetricField::PayoutRatioTtm => "payoutratiottm",
            MetricField::CurrentRatioAnnual => "currentratioannual",
            MetricField::QuickRatioAnnual => "quickratioannual",
            MetricField::DebtToEquityAnnual => "totaldebt_totalequityannual",
            MetricField::Beta => "beta",
        }
    }

    /// Text-valued columns; everything else is numeric
    pub fn is_text(&self) -> bool {
        matches!(self, MetricField::Sector | MetricField::Industry)
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MetricField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        MetricField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == key)
            .ok_or_else(|| format!("Unknown metric field: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_field_names_are_unique_and_parse_back() {
        let mut seen = HashSet::new();
        for field in MetricField::ALL {
            assert!(seen.insert(field.as_str()), "duplicate {}", field);
            assert_eq!(field.as_str().parse::<MetricField>().unwrap(), field);
        }
    }

    #[test]
    fn test_serde_name_matches_as_str() {
        for field in MetricField::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("PETTM".parse::<MetricField>().unwrap(), MetricField::PeTtm);
        assert!("not_a_metric".parse::<MetricField>().is_err());
    }

    #[test]
    fn test_text_fields() {
        assert!(MetricField::Sector.is_text());
        assert!(!MetricField::Close.is_text());
    }
}
