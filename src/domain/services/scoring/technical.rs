use serde::{Deserialize, Serialize};

use crate::domain::entities::snapshot::TechnicalMetrics;
use crate::domain::entities::trading_score::{clamp_score, round2, TECHNICAL_WEIGHT};
use crate::domain::services::scoring::score_calculator::{CategoryScore, CategoryScoreCalculator};

/// Technical score breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalScore {
    /// RSI contribution [0, 30]
    pub rsi_score: f64,
    /// MACD contribution [0, 30]
    pub macd_score: f64,
    /// Moving average / price contribution [0, 30]
    pub ma_price_score: f64,
    /// Bollinger band contribution [0, 30]
    pub bollinger_score: f64,
    /// ADX/DI trend strength [0, 25], informational only
    pub adx_score: f64,
    /// Sum of the four contributions [0, 120]
    pub raw_score: f64,
    /// min(raw_score, 100)
    pub total_score: f64,
}

impl CategoryScore for TechnicalScore {
    fn total(&self) -> f64 {
        self.total_score
    }
}

/// Scores RSI, MACD, moving averages and Bollinger bands.
///
/// ADX is reported but deliberately left out of the total.
#[derive(Debug, Clone, Default)]
pub struct TechnicalScoreCalculator;

impl TechnicalScoreCalculator {
    pub fn new() -> Self {
        TechnicalScoreCalculator
    }

    /// 0 up to RSI 50, linear to 20 at RSI 70, then up to 10 more by RSI 85
    pub fn rsi_score(rsi: Option<f64>) -> f64 {
        match rsi {
            Some(rsi) if rsi > 70.0 => 20.0 + (((rsi - 70.0) / 15.0) * 10.0).min(10.0),
            Some(rsi) if rsi > 50.0 => ((rsi - 50.0) / 20.0) * 20.0,
            _ => 0.0,
        }
    }

    pub fn macd_score(metrics: &TechnicalMetrics) -> f64 {
        let mut score = 0.0;
        if let (Some(macd), Some(signal)) = (metrics.macd, metrics.macd_signal) {
            if macd > signal {
                score += 10.0;
            }
        }
        if metrics.macd_hist.map_or(false, |hist| hist > 0.0) {
            score += 10.0;
        }
        if metrics.bullish_flag.unwrap_or(false) {
            score += 10.0;
        }
        score
    }

    pub fn ma_price_score(metrics: &TechnicalMetrics) -> f64 {
        let Some(price) = metrics.price else {
            return 0.0;
        };

        let sma50_score = match metrics.sma50 {
            Some(sma50) if sma50 > 0.0 => (((price - sma50) / sma50) * 200.0).clamp(0.0, 10.0),
            _ => 0.0,
        };
        let sma200_score = match metrics.sma200 {
            Some(sma200) if sma200 > 0.0 => {
                (((price - sma200) / sma200) * 100.0).clamp(0.0, 10.0)
            }
            _ => 0.0,
        };
        let golden_cross = match (metrics.sma50, metrics.sma200) {
            (Some(sma50), Some(sma200)) if sma50 > sma200 => 10.0,
            _ => 0.0,
        };

        (sma50_score + sma200_score + golden_cross).min(30.0)
    }

    pub fn bollinger_score(metrics: &TechnicalMetrics) -> f64 {
        let (Some(price), Some(upper)) = (metrics.price, metrics.upper_band) else {
            return 0.0;
        };

        if price > upper {
            return 30.0;
        }
        if let Some(lower) = metrics.lower_band {
            let band_width = upper - lower;
            if band_width > 0.0 && price >= upper - band_width / 3.0 {
                return 20.0;
            }
        }
        match metrics.middle_band {
            Some(middle) if price >= middle => 10.0,
            _ => 0.0,
        }
    }

    pub fn adx_score(metrics: &TechnicalMetrics) -> f64 {
        let (Some(adx), Some(plus_di), Some(minus_di)) =
            (metrics.adx, metrics.plus_di, metrics.minus_di)
        else {
            return 0.0;
        };

        let mut score: f64 = 0.0;
        if adx > 25.0 && plus_di > minus_di {
            score += 15.0;
            if adx > 30.0 {
                score += 10.0;
            }
        }
        score.min(25.0)
    }
}

impl CategoryScoreCalculator for TechnicalScoreCalculator {
    type Input = TechnicalMetrics;
    type Output = TechnicalScore;

    fn calculate(&self, metrics: &TechnicalMetrics) -> TechnicalScore {
        let rsi_score = Self::rsi_score(metrics.rsi);
        let macd_score = Self::macd_score(metrics);
        let ma_price_score = Self::ma_price_score(metrics);
        let bollinger_score = Self::bollinger_score(metrics);
        let adx_score = Self::adx_score(metrics);

        let raw_score = rsi_score + macd_score + ma_price_score + bollinger_score;

        TechnicalScore {
            rsi_score: round2(rsi_score),
            macd_score,
            ma_price_score: round2(ma_price_score),
            bollinger_score,
            adx_score,
            raw_score: round2(raw_score),
            total_score: round2(clamp_score(raw_score)),
        }
    }

    fn name(&self) -> &str {
        "technical"
    }

    fn weight(&self) -> f64 {
        TECHNICAL_WEIGHT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullish_metrics() -> TechnicalMetrics {
        TechnicalMetrics {
            rsi: Some(75.0),
            macd: Some(1.5),
            macd_signal: Some(1.0),
            macd_hist: Some(0.5),
            bullish_flag: Some(true),
            price: Some(120.0),
            sma50: Some(100.0),
            sma200: Some(90.0),
            upper_band: Some(115.0),
            middle_band: Some(105.0),
            lower_band: Some(95.0),
            adx: Some(35.0),
            plus_di: Some(30.0),
            minus_di: Some(15.0),
        }
    }

    #[test]
    fn test_rsi_score_boundaries() {
        assert_eq!(TechnicalScoreCalculator::rsi_score(Some(50.0)), 0.0);
        assert_eq!(TechnicalScoreCalculator::rsi_score(Some(30.0)), 0.0);
        assert_eq!(TechnicalScoreCalculator::rsi_score(Some(60.0)), 10.0);
        assert_eq!(TechnicalScoreCalculator::rsi_score(Some(70.0)), 20.0);
        assert_eq!(TechnicalScoreCalculator::rsi_score(Some(85.0)), 30.0);
        assert_eq!(TechnicalScoreCalculator::rsi_score(Some(100.0)), 30.0);
        assert_eq!(TechnicalScoreCalculator::rsi_score(None), 0.0);
    }

    #[test]
    fn test_macd_score_steps() {
        let mut metrics = TechnicalMetrics::default();
        assert_eq!(TechnicalScoreCalculator::macd_score(&metrics), 0.0);

        metrics.macd = Some(2.0);
        metrics.macd_signal = Some(1.0);
        assert_eq!(TechnicalScoreCalculator::macd_score(&metrics), 10.0);

        metrics.macd_hist = Some(1.0);
        assert_eq!(TechnicalScoreCalculator::macd_score(&metrics), 20.0);

        metrics.bullish_flag = Some(true);
        assert_eq!(TechnicalScoreCalculator::macd_score(&metrics), 30.0);

        metrics.macd_hist = Some(-0.2);
        assert_eq!(TechnicalScoreCalculator::macd_score(&metrics), 20.0);
    }

    #[test]
    fn test_ma_price_score_components() {
        let metrics = TechnicalMetrics {
            price: Some(102.0),
            sma50: Some(100.0),
            sma200: Some(110.0),
            ..Default::default()
        };
        // sma50: 2% * 200 = 4, sma200: negative -> 0, no golden cross
        let score = TechnicalScoreCalculator::ma_price_score(&metrics);
        assert!((score - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_ma_price_score_guards_zero_sma() {
        let metrics = TechnicalMetrics {
            price: Some(50.0),
            sma50: Some(0.0),
            sma200: Some(-1.0),
            ..Default::default()
        };
        // Neither SMA usable; sma50 0 > sma200 -1 still counts as golden cross
        assert_eq!(TechnicalScoreCalculator::ma_price_score(&metrics), 10.0);
    }

    #[test]
    fn test_bollinger_score_zones() {
        let mut metrics = TechnicalMetrics {
            upper_band: Some(110.0),
            middle_band: Some(100.0),
            lower_band: Some(80.0),
            ..Default::default()
        };

        metrics.price = Some(111.0);
        assert_eq!(TechnicalScoreCalculator::bollinger_score(&metrics), 30.0);

        // top third starts at 110 - 30/3 = 100
        metrics.price = Some(101.0);
        assert_eq!(TechnicalScoreCalculator::bollinger_score(&metrics), 20.0);

        metrics.middle_band = Some(95.0);
        metrics.price = Some(97.0);
        assert_eq!(TechnicalScoreCalculator::bollinger_score(&metrics), 10.0);

        metrics.price = Some(90.0);
        assert_eq!(TechnicalScoreCalculator::bollinger_score(&metrics), 0.0);
    }

    #[test]
    fn test_adx_score_is_informational() {
        let calc = TechnicalScoreCalculator::new();
        let metrics = TechnicalMetrics {
            adx: Some(40.0),
            plus_di: Some(30.0),
            minus_di: Some(10.0),
            ..Default::default()
        };
        let score = calc.calculate(&metrics);
        assert_eq!(score.adx_score, 25.0);
        assert_eq!(score.total_score, 0.0);
        assert_eq!(score.raw_score, 0.0);
    }

    #[test]
    fn test_adx_score_levels() {
        let mut metrics = TechnicalMetrics {
            adx: Some(27.0),
            plus_di: Some(20.0),
            minus_di: Some(10.0),
            ..Default::default()
        };
        assert_eq!(TechnicalScoreCalculator::adx_score(&metrics), 15.0);

        metrics.minus_di = Some(25.0);
        assert_eq!(TechnicalScoreCalculator::adx_score(&metrics), 0.0);
    }

    #[test]
    fn test_fully_bullish_snapshot_clamps_to_100() {
        let calc = TechnicalScoreCalculator::new();
        let score = calc.calculate(&bullish_metrics());

        assert_eq!(score.macd_score, 30.0);
        assert_eq!(score.ma_price_score, 30.0);
        assert_eq!(score.bollinger_score, 30.0);
        assert!(score.raw_score > 100.0);
        assert_eq!(score.total_score, 100.0);
    }

    #[test]
    fn test_empty_metrics_score_zero() {
        let calc = TechnicalScoreCalculator::new();
        let score = calc.calculate(&TechnicalMetrics::default());
        assert_eq!(score.total_score, 0.0);
        assert!(TechnicalScoreCalculator::validate_score(score.total_score));
    }
}
