//! Diagnostic copy of the submitted answers.

use crate::types::AnswerRecord;
use chrono::{DateTime, Local};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Upper bound on `_N` suffixes tried for a taken file name.
const MAX_SUFFIX: u32 = 1000;

/// `answers_<YYYYMMDD_HHMMSS>.json`, with `_N` appended for `attempt > 0`.
fn answers_file_name(now: &DateTime<Local>, attempt: u32) -> String {
    let stamp = now.format("%Y%m%d_%H%M%S");
    if attempt == 0 {
        format!("answers_{}.json", stamp)
    } else {
        format!("answers_{}_{}.json", stamp, attempt)
    }
}

/// Write `answers` as a JSON array into `dir`, never overwriting a file.
///
/// Returns the path written.
pub async fn save_answers(dir: &Path, answers: &[AnswerRecord]) -> io::Result<PathBuf> {
    save_answers_at(dir, answers, &Local::now()).await
}

pub(crate) async fn save_answers_at(
    dir: &Path,
    answers: &[AnswerRecord],
    now: &DateTime<Local>,
) -> io::Result<PathBuf> {
    let json = serde_json::to_vec(answers)?;

    for attempt in 0..MAX_SUFFIX {
        let path = dir.join(answers_file_name(now, attempt));
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        };

        file.write_all(&json).await?;
        file.flush().await?;
        return Ok(path);
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free answers file name in {}", dir.display()),
    ))
}
