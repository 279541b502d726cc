//! File streaming with optional bandwidth pacing.
//!
//! # Responsibilities
//! - Open a resolved file and expose it as an HTTP response body
//! - Pace throttled transfers to a configured byte rate
//! - Set content disposition for download vs. inline viewing
//!
//! # Design Decisions
//! - Pacing delays chunks, it never drops them: delivered bytes always
//!   equal the file size
//! - The file handle is owned by the body stream, so a client disconnect
//!   drops the stream and releases the handle
//! - A mid-stream read error terminates the body with an error, which
//!   aborts the connection instead of signaling clean completion

use std::io;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, Response, StatusCode};
use futures_util::Stream;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::io::ReaderStream;

use crate::fs::resolve::ResolvedPath;

/// Chunk granularity for paced transfers.
const PACED_CHUNK_BYTES: usize = 64 * 1024;

/// Error type for stream setup.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The path is missing, unreadable, or not a regular file.
    #[error("file not found")]
    NotFound,
}

/// How the client should treat the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Save-as with the original basename.
    Attachment,
    /// Render inline as plain text.
    Inline,
}

/// An open file ready to be streamed as a response body.
pub struct FileStream {
    file: File,
    len: u64,
    name: String,
}

impl FileStream {
    /// Open `path` for streaming. Directories and unreadable paths fail
    /// with [`StreamError::NotFound`]; the raw I/O error stays in the log.
    pub async fn open(path: &ResolvedPath) -> Result<Self, StreamError> {
        let meta = tokio::fs::metadata(path).await.map_err(|e| {
            tracing::debug!(path = %path.as_path().display(), error = %e, "Stat failed");
            StreamError::NotFound
        })?;
        if !meta.is_file() {
            return Err(StreamError::NotFound);
        }
        let file = File::open(path).await.map_err(|e| {
            tracing::warn!(path = %path.as_path().display(), error = %e, "Open failed");
            StreamError::NotFound
        })?;
        let name = path.file_name().unwrap_or("download").to_string();
        Ok(Self {
            file,
            len: meta.len(),
            name,
        })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Consume the stream into a full HTTP response. When `pace` is set,
    /// the body is released at no more than that many bytes per second.
    pub fn into_response(self, disposition: Disposition, pace: Option<u64>) -> Response<Body> {
        let body = match pace {
            Some(bytes_per_sec) => Body::from_stream(paced(self.file, bytes_per_sec)),
            None => Body::from_stream(ReaderStream::new(self.file)),
        };

        let mut response = Response::new(body);
        *response.status_mut() = StatusCode::OK;
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(self.len));
        match disposition {
            Disposition::Attachment => {
                let value = format!("attachment; filename=\"{}\"", self.name);
                headers.insert(
                    header::CONTENT_DISPOSITION,
                    HeaderValue::from_str(&value)
                        .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
                );
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/octet-stream"),
                );
            }
            Disposition::Inline => {
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                );
            }
        }
        response
    }
}

/// Read in fixed chunks, releasing one chunk per tick so the average
/// rate stays at or below `bytes_per_sec`.
fn paced<R>(reader: R, bytes_per_sec: u64) -> impl Stream<Item = io::Result<Bytes>>
where
    R: AsyncRead + Unpin,
{
    let bytes_per_sec = bytes_per_sec.max(1);
    let tick = Duration::from_secs_f64(PACED_CHUNK_BYTES as f64 / bytes_per_sec as f64);
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    futures_util::stream::unfold(
        (reader, interval, false),
        |(mut reader, mut interval, done)| async move {
            if done {
                return None;
            }
            interval.tick().await;
            let mut buf = vec![0u8; PACED_CHUNK_BYTES];
            match reader.read(&mut buf).await {
                Ok(0) => None,
                Ok(n) => {
                    buf.truncate(n);
                    Some((Ok(Bytes::from(buf)), (reader, interval, false)))
                }
                // Yield the error, then end the stream on the next poll.
                Err(e) => Some((Err(e), (reader, interval, true))),
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::resolve::ServedRoot;
    use futures_util::StreamExt;
    use std::time::Instant;

    fn fixture_file(contents: &[u8]) -> (tempfile::TempDir, ResolvedPath) {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("payload.bin"), contents).unwrap();
        let root = ServedRoot::open(tmp.path()).unwrap();
        let path = root.resolve("payload.bin").unwrap();
        (tmp, path)
    }

    async fn collect(stream: impl Stream<Item = io::Result<Bytes>>) -> Vec<u8> {
        let mut out = Vec::new();
        futures_util::pin_mut!(stream);
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn missing_file_fails_with_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let root = ServedRoot::open(tmp.path()).unwrap();
        let path = root.resolve("nope.txt").unwrap();
        assert!(matches!(
            FileStream::open(&path).await,
            Err(StreamError::NotFound)
        ));
    }

    #[tokio::test]
    async fn directories_are_not_streamable() {
        let tmp = tempfile::tempdir().unwrap();
        let root = ServedRoot::open(tmp.path()).unwrap();
        let path = root.resolve("").unwrap();
        assert!(matches!(
            FileStream::open(&path).await,
            Err(StreamError::NotFound)
        ));
    }

    #[tokio::test]
    async fn paced_stream_delivers_every_byte() {
        let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let (_tmp, path) = fixture_file(&payload);

        let opened = FileStream::open(&path).await.unwrap();
        assert_eq!(opened.len(), payload.len() as u64);
        // High rate keeps the test fast; byte-equality is what matters.
        let out = collect(paced(opened.file, 50_000_000)).await;
        assert_eq!(out, payload);
    }

    #[tokio::test]
    async fn pacing_slows_the_transfer_down() {
        let payload = vec![7u8; 3 * PACED_CHUNK_BYTES];
        let (_tmp, path) = fixture_file(&payload);

        // 2 chunks/sec: three chunks need at least one full tick of delay.
        let rate = (PACED_CHUNK_BYTES * 2) as u64;
        let opened = FileStream::open(&path).await.unwrap();
        let start = Instant::now();
        let out = collect(paced(opened.file, rate)).await;
        assert_eq!(out.len(), payload.len());
        assert!(start.elapsed() >= Duration::from_millis(900));
    }

    /// Serves one chunk of data, then fails every subsequent read.
    struct DyingReader {
        served: bool,
    }

    impl AsyncRead for DyingReader {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<io::Result<()>> {
            let this = self.get_mut();
            if this.served {
                return std::task::Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "backing store went away",
                )));
            }
            this.served = true;
            buf.put_slice(&[42u8; 1000]);
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn mid_stream_read_error_ends_the_body_with_an_error() {
        let stream = paced(DyingReader { served: false }, 50_000_000);
        futures_util::pin_mut!(stream);

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.as_ref(), &[42u8; 1000]);

        // The failure surfaces as an Err item, never as clean completion.
        let second = stream.next().await.unwrap();
        let err = second.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);

        // After the error the stream is finished.
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn attachment_response_carries_the_basename() {
        let (_tmp, path) = fixture_file(b"hello");
        let opened = FileStream::open(&path).await.unwrap();
        let response = opened.into_response(Disposition::Attachment, None);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"payload.bin\""
        );
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "5");
    }

    #[tokio::test]
    async fn inline_response_is_plain_text() {
        let (_tmp, path) = fixture_file(b"hello");
        let opened = FileStream::open(&path).await.unwrap();
        let response = opened.into_response(Disposition::Inline, None);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert!(!response.headers().contains_key(header::CONTENT_DISPOSITION));
    }
}
