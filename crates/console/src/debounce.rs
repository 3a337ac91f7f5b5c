//! Debouncing of search keystrokes.

use std::time::Duration;

use tokio::sync::mpsc;

/// Quiet period after the last keystroke before a search is sent.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Forward only the last value of each burst from `input`.
///
/// A value is emitted once `delay` has passed without a newer one arriving.
/// When `input` closes, any pending value is flushed and the output closes.
/// When the output is dropped the task stops and later sends on `input`
/// fail.
pub fn spawn<T>(delay: Duration, mut input: mpsc::Receiver<T>) -> mpsc::Receiver<T>
where
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        while let Some(mut latest) = input.recv().await {
            let closed = loop {
                match tokio::time::timeout(delay, input.recv()).await {
                    Ok(Some(next)) => latest = next,
                    Ok(None) => break true,
                    Err(_elapsed) => break false,
                }
            };
            if tx.send(latest).await.is_err() || closed {
                break;
            }
        }
    });

    rx
}
