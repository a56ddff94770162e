//! Fan-out writer for dual-sink output capture.
//!
//! One input stream, two sinks: the invoking terminal and the durable
//! session log. Every chunk is written to both sinks in full before the next
//! read, so the two copies are byte-for-byte identical.

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Writes every buffer to both sinks.
#[derive(Debug)]
pub struct Tee<L, R> {
    left: L,
    right: R,
}

impl<L, R> Tee<L, R>
where
    L: AsyncWrite + Unpin,
    R: AsyncWrite + Unpin,
{
    pub fn new(left: L, right: R) -> Self {
        Self { left, right }
    }

    /// Write the full buffer to both sinks.
    pub async fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.left.write_all(buf).await?;
        self.right.write_all(buf).await?;
        Ok(())
    }

    pub async fn flush(&mut self) -> io::Result<()> {
        self.left.flush().await?;
        self.right.flush().await?;
        Ok(())
    }

    pub fn into_inner(self) -> (L, R) {
        (self.left, self.right)
    }
}

/// Drain a reader into a tee until EOF, returning the byte count.
///
/// Chunks are flushed as they arrive so the terminal stays live while the
/// remote session runs.
pub async fn drain<S, L, R>(mut source: S, tee: &mut Tee<L, R>) -> io::Result<u64>
where
    S: AsyncRead + Unpin,
    L: AsyncWrite + Unpin,
    R: AsyncWrite + Unpin,
{
    let mut buf = [0u8; 8192];
    let mut total = 0u64;
    loop {
        let n = source.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        tee.write_all(&buf[..n]).await?;
        tee.flush().await?;
        total += n as u64;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_both_sinks_receive_identical_bytes() {
        let mut tee = Tee::new(Vec::new(), Vec::new());
        tee.write_all(b"hello ").await.unwrap();
        tee.write_all(b"world\n").await.unwrap();
        let (left, right) = tee.into_inner();
        assert_eq!(left, b"hello world\n");
        assert_eq!(left, right);
    }

    #[tokio::test]
    async fn test_drain_copies_everything() {
        let source: &[u8] = b"line one\nline two\n";
        let mut tee = Tee::new(Vec::new(), Vec::new());
        let copied = drain(source, &mut tee).await.unwrap();
        assert_eq!(copied, source.len() as u64);
        let (left, right) = tee.into_inner();
        assert_eq!(left, source);
        assert_eq!(right, source);
    }

    #[tokio::test]
    async fn test_drain_empty_source() {
        let source: &[u8] = b"";
        let mut tee = Tee::new(Vec::new(), Vec::new());
        assert_eq!(drain(source, &mut tee).await.unwrap(), 0);
    }
}
