use anyhow::{Context, Result};
use concat_string::concat_string;

use crate::util::{self, datetime::Window};

/// Builds the daily-interval history download URL for `ticker`.
///
/// `host` carries the scheme, e.g. `https://query1.finance.yahoo.com`.
pub fn url(host: &str, ticker: &str, window: Window) -> String {
    concat_string!(
        host,
        "/v7/finance/download/",
        ticker,
        "?period1=",
        window.start.to_string(),
        "&period2=",
        window.end.to_string(),
        "&interval=1d&events=history&includeAdjustedClose=true"
    )
}

/// 下載指定股票在區間內的日線 CSV
pub async fn visit(host: &str, ticker: &str, window: Window) -> Result<String> {
    let url = url(host, ticker, window);
    util::http::get(&url, None)
        .await
        .with_context(|| format!("Failed to download price history of {}", ticker))
}

#[cfg(test)]
mod tests {
    use axum::{extract::Path, http::StatusCode, response::IntoResponse, routing::get, Router};

    use super::*;

    const CSV: &str = "Date,Open,High,Low,Close,Adj Close,Volume\n\
                       2024-01-02,10,12,10,11,11,100\n";

    #[test]
    fn test_url() {
        let window = Window {
            start: 1_672_531_200,
            end: 1_704_067_200,
        };

        assert_eq!(
            url("https://query1.finance.yahoo.com", "AAPL", window),
            "https://query1.finance.yahoo.com/v7/finance/download/AAPL\
             ?period1=1672531200&period2=1704067200\
             &interval=1d&events=history&includeAdjustedClose=true"
        );
    }

    #[tokio::test]
    async fn test_visit() {
        async fn download(Path(ticker): Path<String>) -> impl IntoResponse {
            if ticker == "AAPL" {
                (StatusCode::OK, CSV).into_response()
            } else {
                StatusCode::NOT_FOUND.into_response()
            }
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let host = format!("http://{}", listener.local_addr().unwrap());
        let app = Router::new().route("/v7/finance/download/{ticker}", get(download));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let window = Window::one_year_until_now();
        assert_eq!(visit(&host, "AAPL", window).await.unwrap(), CSV);

        let why = visit(&host, "NOPE", window).await.unwrap_err();
        assert!(format!("{:#}", why).contains("NOPE"), "{:#}", why);
    }
}
