pub mod cache;
pub mod dimension_filters;
pub mod fields;
pub mod planner;
pub mod predicate;
pub mod presets;

pub use cache::{CacheStats, ScreenCache};
pub use dimension_filters::{
    list_market_cap_brackets, list_performance_brackets, list_price_brackets, MarketCapBracket,
    PerformanceBracket, PerformanceWindow, PriceBracket, KNOWN_SECTORS,
};
pub use fields::MetricField;
pub use planner::{NormalizedQuery, PageLimits, ScreenerQueryPlanner};
pub use predicate::{Comparator, Condition, MetricRecord, Operand, Predicate};
pub use presets::{list_categories, list_presets, preset, PresetCatalog, PresetCategory, ScreenerPreset};
