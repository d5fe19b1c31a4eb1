use std::sync::Arc;

use anyhow::Result;
use scopeguard::defer;

use crate::{
    calculation,
    config::App,
    crawler::yahoo,
    declare::{ProcessingResult, Summary},
    logging,
    result_file::ResultFile,
    ticker,
    util::datetime::Window,
};

/// Everything a ticker task needs, shared by all of them.
struct Job {
    host: String,
    result_file: ResultFile,
}

/// 讀取股票清單，每檔股票各自一個 task 計算一年期平均中間價
///
/// Only a failure to load the ticker list is returned as an error. Each
/// ticker succeeds or fails on its own and ends up in the summary.
pub async fn execute(settings: &App) -> Result<Summary> {
    logging::info_file_async("計算平均價開始");
    defer! {
        logging::info_file_async("計算平均價結束");
    }

    let tickers = ticker::load(&settings.input.ticker_file).await?;
    let job = Arc::new(Job {
        host: settings.history.host.clone(),
        result_file: ResultFile::new(
            &settings.output.result_file,
            settings.output.probe_interval(),
        ),
    });

    let tasks = tickers
        .iter()
        .map(|ticker| {
            let job = Arc::clone(&job);
            let ticker = ticker.clone();
            tokio::spawn(async move { process(&job, &ticker).await })
        })
        .collect::<Vec<_>>();

    let mut summary = Summary {
        total: tickers.len(),
        ..Default::default()
    };

    for (ticker, joined) in tickers.iter().zip(futures::future::join_all(tasks).await) {
        match joined {
            Ok(true) => summary.succeeded += 1,
            Ok(false) => summary.failed += 1,
            Err(why) => {
                summary.failed += 1;
                logging::error_console(format!("task for {} did not finish: {}", ticker, why));
                logging::error_file_async(format!("task for {} did not finish: {:?}", ticker, why));
            }
        }
    }

    logging::info_console(format!("all tasks completed, {}", summary));
    if summary.failed > 0 {
        logging::warn_file_async(format!("all tasks completed, {}", summary));
    } else {
        logging::info_file_async(format!("all tasks completed, {}", summary));
    }

    Ok(summary)
}

/// Runs one ticker end to end and reports the outcome. Returns whether a
/// result line was written.
async fn process(job: &Job, ticker: &str) -> bool {
    match calculate_and_append(job, ticker).await {
        Ok(result) => {
            logging::info_console(format!("task for {} completed", ticker));
            logging::info_file_async(format!(
                "task for {} completed, {} appended to {}",
                ticker,
                result,
                job.result_file.path().display()
            ));
            true
        }
        Err(why) => {
            logging::error_console(format!("failed to process {}: {:#}", ticker, why));
            logging::error_file_async(format!("failed to process {}: {:?}", ticker, why));
            false
        }
    }
}

async fn calculate_and_append(job: &Job, ticker: &str) -> Result<ProcessingResult> {
    let window = Window::one_year_until_now();
    logging::debug_file_async(format!(
        "{} window {} ~ {}",
        ticker, window.start, window.end
    ));
    let body = yahoo::history::visit(&job.host, ticker, window).await?;
    let average_price = calculation::average_price::from_csv(&body)?;
    let result = ProcessingResult::new(ticker, average_price);

    job.result_file.append(&result).await?;

    Ok(result)
}
