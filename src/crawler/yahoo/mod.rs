//! # Yahoo 財經採集模組
//!
//! 下載個股過去一段期間的日線 CSV（Date,Open,High,Low,Close,Adj Close,Volume）。

/// 歷史價格下載子模組
pub mod history;

/// Yahoo 財經歷史資料下載主機
pub const HOST: &str = "query1.finance.yahoo.com";
