use std::fmt;

/// 單日價格列，只取最高價與最低價
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRow {
    pub high: f64,
    pub low: f64,
}

impl PriceRow {
    pub fn new(high: f64, low: f64) -> Self {
        PriceRow { high, low }
    }

    /// (high + low) / 2
    pub fn midpoint(&self) -> f64 {
        (self.high + self.low) / 2.0
    }
}

/// One line of the result file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingResult {
    pub ticker: String,
    pub average_price: f64,
}

impl ProcessingResult {
    pub fn new(ticker: &str, average_price: f64) -> Self {
        ProcessingResult {
            ticker: ticker.to_string(),
            average_price,
        }
    }
}

impl fmt::Display for ProcessingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ticker, self.average_price)
    }
}

/// 一次執行的統計
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} succeeded, {} failed",
            self.succeeded, self.total, self.failed
        )
    }
}
