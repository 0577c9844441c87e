//! Pull-driven parsing of asynchronous byte streams
//!
//! [`parse_web_stream`] spawns a task on the current tokio runtime that runs
//! its own read loop: read a chunk, decode, run a parse step, read again.
//! The returned [`StreamReader`] lets the caller cancel the loop or wait for
//! it to complete.
//!
//! # Example
//!
//! ```no_run
//! use dsvstream::{parse_web_stream, ParseOptions};
//!
//! # async fn run() -> dsvstream::Result<()> {
//! let file = tokio::fs::File::open("large.csv").await?;
//! let reader = parse_web_stream(
//!     file,
//!     ParseOptions::default(),
//!     |row| println!("{:?}", row),
//!     |err| {
//!         if let Some(err) = err {
//!             eprintln!("read failed: {}", err);
//!         }
//!     },
//! )?;
//!
//! reader.closed().await?;
//! # Ok(())
//! # }
//! ```

use crate::dsv::Parser;
use crate::error::{DsvError, Result};
use crate::stream::CHUNK_SIZE;
use crate::types::{ParseOptions, Row};
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Handle to a running read loop
///
/// Dropping the handle does not stop the loop; use [`cancel`](Self::cancel).
#[derive(Debug)]
pub struct StreamReader {
    cancel: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl StreamReader {
    /// Stop reading from the source
    ///
    /// The loop treats cancellation like end of stream: text already
    /// received is flushed as rows and the end callback gets `None`. Has no
    /// effect once the loop has finished.
    pub fn cancel(&self) {
        self.cancel.notify_one();
    }

    /// Check if the read loop has finished
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the read loop to finish
    ///
    /// Fails only if the loop task itself panicked or was aborted; source
    /// errors are delivered to the end callback instead.
    pub async fn closed(self) -> Result<()> {
        self.handle
            .await
            .map_err(|e| DsvError::ReadError(format!("Read task failed: {}", e)))
    }
}

/// Parse an asynchronous byte source on a background task
///
/// Rows reach `on_row` in arrival order; exactly one parse step runs at a
/// time. On end of stream (or [`StreamReader::cancel`]) the remainder is
/// flushed and `on_end(None)` is called. A read error is handed to
/// `on_end(Some(err))` unchanged. No backpressure is applied beyond the
/// source's own.
///
/// Must be called from within a tokio runtime; otherwise, or for invalid
/// options, an error is returned and nothing is read.
pub fn parse_web_stream<S, R, E>(
    source: S,
    options: ParseOptions,
    on_row: R,
    on_end: E,
) -> Result<StreamReader>
where
    S: AsyncRead + Unpin + Send + 'static,
    R: FnMut(Row) + Send + 'static,
    E: FnOnce(Option<std::io::Error>) + Send + 'static,
{
    let parser = Parser::with_options(options)?;
    let runtime = Handle::try_current()
        .map_err(|e| DsvError::ReadError(format!("No async runtime available: {}", e)))?;

    let cancel = Arc::new(Notify::new());
    let handle = runtime.spawn(read_loop(source, parser, on_row, on_end, Arc::clone(&cancel)));

    Ok(StreamReader { cancel, handle })
}

async fn read_loop<S, R, E>(mut source: S, mut parser: Parser, mut on_row: R, on_end: E, cancel: Arc<Notify>)
where
    S: AsyncRead + Unpin,
    R: FnMut(Row),
    E: FnOnce(Option<std::io::Error>),
{
    let mut chunk = vec![0u8; CHUNK_SIZE];

    loop {
        let read = tokio::select! {
            biased;
            _ = cancel.notified() => {
                tracing::debug!(rows = parser.rows_emitted(), "stream cancelled");
                None
            }
            result = source.read(&mut chunk) => Some(result),
        };

        match read {
            None | Some(Ok(0)) => {
                let total = parser.finish(&mut on_row);
                tracing::debug!(rows = total, "stream finished");
                on_end(None);
                return;
            }
            Some(Ok(n)) => parser.push_bytes(&chunk[..n], &mut on_row),
            Some(Err(e)) if e.kind() == ErrorKind::Interrupted => continue,
            Some(Err(e)) => {
                tracing::debug!(error = %e, rows = parser.rows_emitted(), "stream failed");
                on_end(Some(e));
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::parse_to_rows;
    use std::collections::VecDeque;
    use std::io;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncWriteExt, ReadBuf};
    use tokio::sync::oneshot;

    /// Source replaying a fixed sequence of read results, then EOF
    struct Scripted {
        reads: VecDeque<io::Result<Vec<u8>>>,
    }

    impl Scripted {
        fn new(reads: Vec<io::Result<Vec<u8>>>) -> Self {
            Scripted {
                reads: reads.into(),
            }
        }
    }

    impl AsyncRead for Scripted {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            match self.reads.pop_front() {
                Some(Ok(bytes)) => {
                    buf.put_slice(&bytes);
                    Poll::Ready(Ok(()))
                }
                Some(Err(e)) => Poll::Ready(Err(e)),
                None => Poll::Ready(Ok(())),
            }
        }
    }

    type Collected = Arc<Mutex<Vec<Row>>>;

    fn collector() -> (Collected, impl FnMut(Row) + Send + 'static) {
        let rows: Collected = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&rows);
        (rows, move |row| sink.lock().unwrap().push(row))
    }

    #[tokio::test]
    async fn test_reads_until_eof() -> Result<()> {
        let text = "a,\"b\nc\",d\r\ne,f,g\nh";
        let (rows, on_row) = collector();
        let (tx, rx) = oneshot::channel();

        let reader = parse_web_stream(text.as_bytes(), ParseOptions::default(), on_row, move |err| {
            let _ = tx.send(err.is_none());
        })?;
        reader.closed().await?;

        assert!(rx.await.unwrap());
        let expected = parse_to_rows(text, &ParseOptions::default())?;
        assert_eq!(*rows.lock().unwrap(), expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_chunked_duplex_stream() -> Result<()> {
        let (mut writer, reader_half) = tokio::io::duplex(8);
        let (rows, on_row) = collector();

        let reader = parse_web_stream(reader_half, ParseOptions::default(), on_row, |_| {})?;

        for piece in ["na", "me,\"no", "te\"\"s\"\nbo", "b,\"x,y\"\n"] {
            writer.write_all(piece.as_bytes()).await?;
        }
        drop(writer);
        reader.closed().await?;

        assert_eq!(
            *rows.lock().unwrap(),
            vec![vec!["name", "note\"s"], vec!["bob", "x,y"]]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_flushes_and_ends() -> Result<()> {
        let (mut writer, reader_half) = tokio::io::duplex(64);
        let (rows, on_row) = collector();
        let (tx, rx) = oneshot::channel();

        let reader = parse_web_stream(reader_half, ParseOptions::default(), on_row, move |err| {
            let _ = tx.send(err.is_none());
        })?;

        writer.write_all(b"a,b\nc,d").await?;
        // Wait until the loop has taken the chunk
        while rows.lock().unwrap().is_empty() {
            tokio::task::yield_now().await;
        }
        reader.cancel();
        reader.closed().await?;

        assert!(rx.await.unwrap());
        assert_eq!(*rows.lock().unwrap(), vec![vec!["a", "b"], vec!["c", "d"]]);
        // The source stays open on the writer side
        drop(writer);
        Ok(())
    }

    #[tokio::test]
    async fn test_read_error_goes_to_end_callback() -> Result<()> {
        let source = Scripted::new(vec![
            Ok(b"a,b\nc,".to_vec()),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer went away")),
            Ok(b"d\n".to_vec()),
        ]);
        let (rows, on_row) = collector();
        let (tx, rx) = oneshot::channel();

        let reader = parse_web_stream(source, ParseOptions::default(), on_row, move |err| {
            let _ = tx.send(err);
        })?;
        reader.closed().await?;

        // Complete rows before the failure are delivered, the partial one is not
        assert_eq!(*rows.lock().unwrap(), vec![vec!["a", "b"]]);
        let err = rx.await.unwrap().expect("error should be reported");
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(err.to_string(), "peer went away");
        Ok(())
    }

    #[tokio::test]
    async fn test_interrupted_read_is_retried() -> Result<()> {
        let source = Scripted::new(vec![
            Ok(b"a,".to_vec()),
            Err(io::Error::from(io::ErrorKind::Interrupted)),
            Ok(b"b\nc,d".to_vec()),
        ]);
        let (rows, on_row) = collector();
        let (tx, rx) = oneshot::channel();

        let reader = parse_web_stream(source, ParseOptions::default(), on_row, move |err| {
            let _ = tx.send(err.is_none());
        })?;
        reader.closed().await?;

        assert!(rx.await.unwrap());
        assert_eq!(*rows.lock().unwrap(), vec![vec!["a", "b"], vec!["c", "d"]]);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_options_rejected() {
        let result = parse_web_stream(
            &b"a\n"[..],
            ParseOptions::default().delimiter('"'),
            |_| {},
            |_| {},
        );
        assert!(matches!(result, Err(DsvError::InvalidOptions(_))));
    }

    #[test]
    fn test_requires_runtime() {
        let result = parse_web_stream(&b"a\n"[..], ParseOptions::default(), |_| {}, |_| {});
        assert!(matches!(result, Err(DsvError::ReadError(_))));
    }
}
