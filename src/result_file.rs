use std::{
    fs::{File, OpenOptions, TryLockError},
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;

use crate::declare::ProcessingResult;

/// The shared, append-only result file.
///
/// Writers wait until a probe finds the file free and then append with a
/// separate open. The probe only checks contention at one instant, it does
/// not hold anything across the append, so two tasks can still append at the
/// same time. Each line goes out in a single append write, which keeps lines
/// whole on a local filesystem.
#[derive(Debug, Clone)]
pub struct ResultFile {
    path: PathBuf,
    probe_interval: Duration,
}

impl ResultFile {
    pub fn new<P: Into<PathBuf>>(path: P, probe_interval: Duration) -> Self {
        ResultFile {
            path: path.into(),
            probe_interval,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the file and tries to take an exclusive lock without waiting.
    ///
    /// A missing file is free, the append will create it.
    pub fn is_busy(&self) -> Result<bool> {
        let file = match OpenOptions::new().read(true).write(true).open(&self.path) {
            Ok(file) => file,
            Err(why) if why.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(why) => {
                return Err(why)
                    .with_context(|| format!("Failed to probe {}", self.path.display()))
            }
        };

        probe_lock(&file).with_context(|| format!("Failed to probe {}", self.path.display()))
    }

    /// 等待檔案可用後附加一行結果
    pub async fn append(&self, result: &ProcessingResult) -> Result<()> {
        while self.is_busy()? {
            tokio::time::sleep(self.probe_interval).await;
        }

        let line = format!("{}\n", result);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        file.write_all(line.as_bytes())
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        file.flush().await?;

        Ok(())
    }
}

/// The lock is released when `file` is dropped by the caller.
fn probe_lock(file: &File) -> io::Result<bool> {
    match file.try_lock() {
        Ok(()) => Ok(false),
        Err(TryLockError::WouldBlock) => Ok(true),
        Err(TryLockError::Error(why)) => Err(why),
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc};

    use super::*;

    fn result_file(dir: &Path) -> ResultFile {
        ResultFile::new(dir.join("result.txt"), Duration::from_millis(10))
    }

    #[test]
    fn test_missing_file_is_not_busy() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!result_file(dir.path()).is_busy().unwrap());
    }

    #[tokio::test]
    async fn test_append_creates_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let file = result_file(dir.path());

        file.append(&ProcessingResult::new("AAA", 11.0)).await.unwrap();
        file.append(&ProcessingResult::new("BBB", 2.5)).await.unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, "AAA:11\nBBB:2.5\n");
    }

    #[tokio::test]
    async fn test_append_waits_while_locked() {
        let dir = tempfile::tempdir().unwrap();
        let file = result_file(dir.path());
        std::fs::write(file.path(), "").unwrap();

        let holder = OpenOptions::new()
            .read(true)
            .write(true)
            .open(file.path())
            .unwrap();
        holder.lock().unwrap();
        assert!(file.is_busy().unwrap());

        let writer = {
            let file = file.clone();
            tokio::spawn(async move { file.append(&ProcessingResult::new("AAA", 1.0)).await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "");

        drop(holder);
        writer.await.unwrap().unwrap();
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "AAA:1\n");
    }

    #[tokio::test]
    async fn test_concurrent_appends_keep_lines_whole() {
        let dir = tempfile::tempdir().unwrap();
        let file = Arc::new(result_file(dir.path()));

        let tasks: Vec<_> = (0..64)
            .map(|i| {
                let file = Arc::clone(&file);
                tokio::spawn(async move {
                    let ticker = format!("T{:03}", i);
                    file.append(&ProcessingResult::new(&ticker, i as f64 + 0.5))
                        .await
                })
            })
            .collect();

        for result in futures::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: HashSet<&str> = content.lines().collect();
        assert_eq!(content.lines().count(), 64);
        for i in 0..64 {
            let expected = format!("T{:03}:{}", i, i as f64 + 0.5);
            assert!(lines.contains(expected.as_str()), "missing {}", expected);
        }
    }
}
