use std::{env, path::PathBuf, str::FromStr, time::Duration};

use config::{Config as config_config, File as config_file};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{crawler::yahoo, logging};

const CONFIG_PATH: &str = "app.json";

pub static SETTINGS: Lazy<App> = Lazy::new(App::get);

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub input: Input,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub history: History,
}

const TICKER_FILE: &str = "TICKER_FILE";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Input {
    /// 股票代號清單，一行一個
    #[serde(default = "default_ticker_file")]
    pub ticker_file: String,
}

impl Default for Input {
    fn default() -> Self {
        Input {
            ticker_file: default_ticker_file(),
        }
    }
}

fn default_ticker_file() -> String {
    "ticker.txt".to_string()
}

const RESULT_FILE: &str = "RESULT_FILE";
const RESULT_PROBE_INTERVAL_MS: &str = "RESULT_PROBE_INTERVAL_MS";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Output {
    #[serde(default = "default_result_file")]
    pub result_file: String,
    /// Sleep between two probes of a busy result file.
    #[serde(default = "default_probe_interval_ms")]
    pub probe_interval_ms: u64,
}

impl Output {
    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }
}

impl Default for Output {
    fn default() -> Self {
        Output {
            result_file: default_result_file(),
            probe_interval_ms: default_probe_interval_ms(),
        }
    }
}

fn default_result_file() -> String {
    "result.txt".to_string()
}

fn default_probe_interval_ms() -> u64 {
    1000
}

const HISTORY_HOST: &str = "HISTORY_HOST";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct History {
    /// Scheme and authority of the download endpoint, no trailing slash.
    #[serde(default = "default_history_host")]
    pub host: String,
}

impl Default for History {
    fn default() -> Self {
        History {
            host: default_history_host(),
        }
    }
}

fn default_history_host() -> String {
    format!("https://{}", yahoo::HOST)
}

impl App {
    /// 讀取 app.json（若存在），再以環境變數覆蓋
    fn get() -> Self {
        let config_path = config_path();
        if !config_path.exists() {
            return App::default().override_with_env();
        }

        let from_file = config_config::builder()
            .add_source(config_file::from(config_path))
            .build()
            .and_then(|c| c.try_deserialize::<App>());

        match from_file {
            Ok(app) => app.override_with_env(),
            Err(why) => {
                logging::error_file_async(format!(
                    "I can't read the config context because {:?}",
                    why
                ));
                App::default().override_with_env()
            }
        }
    }

    /// 將來自於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Self {
        if let Ok(ticker_file) = env::var(TICKER_FILE) {
            self.input.ticker_file = ticker_file;
        }

        if let Ok(result_file) = env::var(RESULT_FILE) {
            self.output.result_file = result_file;
        }

        if let Ok(interval) = env::var(RESULT_PROBE_INTERVAL_MS) {
            self.output.probe_interval_ms =
                u64::from_str(&interval).unwrap_or_else(|_| default_probe_interval_ms());
        }

        if let Ok(host) = env::var(HISTORY_HOST) {
            self.history.host = host.trim_end_matches('/').to_string();
        }

        self
    }
}

fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let app = App::default();
        assert_eq!(app.input.ticker_file, "ticker.txt");
        assert_eq!(app.output.result_file, "result.txt");
        assert_eq!(app.output.probe_interval(), Duration::from_secs(1));
        assert_eq!(app.history.host, "https://query1.finance.yahoo.com");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        std::fs::write(&path, r#"{ "output": { "result_file": "out.txt" } }"#).unwrap();

        let app: App = config_config::builder()
            .add_source(config_file::from(path))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(app.output.result_file, "out.txt");
        assert_eq!(app.output.probe_interval_ms, 1000);
        assert_eq!(app.input.ticker_file, "ticker.txt");
        assert_eq!(app.history.host, "https://query1.finance.yahoo.com");
    }
}
