use std::path::Path;

use anyhow::{Context, Result};

/// 讀取股票代號清單
///
/// Lines are trimmed and kept in file order, duplicates included. Lines that
/// are empty after trimming are skipped.
pub async fn load<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read ticker file {}", path.display()))?;

    Ok(parse(&text))
}

fn parse(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
