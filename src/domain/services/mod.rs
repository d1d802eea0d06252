pub mod scoring;
pub mod screener;
