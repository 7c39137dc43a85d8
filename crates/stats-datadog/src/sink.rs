//! Write-only destinations for encoded frames

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::UdpSocket;
use tracing::info;

/// Destination for encoded frames.
///
/// Writes are fire-and-forget: callers do not retry and a successful return
/// says nothing about delivery.
#[async_trait]
pub trait Sink: Send {
    /// Write one frame
    async fn write(&mut self, frame: &[u8]) -> io::Result<()>;

    /// Release the underlying resource
    async fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<S: Sink + ?Sized> Sink for Box<S> {
    async fn write(&mut self, frame: &[u8]) -> io::Result<()> {
        (**self).write(frame).await
    }

    async fn close(&mut self) -> io::Result<()> {
        (**self).close().await
    }
}

/// UDP sink sending one datagram per frame
pub struct UdpSink {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpSink {
    /// Resolve `address` and connect an ephemeral UDP socket to it
    pub async fn connect(address: &str) -> ClientResult<Self> {
        let peer = tokio::net::lookup_host(address)
            .await
            .map_err(|e| ClientError::InvalidAddress(format!("{}: {}", address, e)))?
            .next()
            .ok_or_else(|| ClientError::InvalidAddress(address.to_string()))?;

        let local: SocketAddr = if peer.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(peer).await?;
        info!("Forwarding metrics to {} ({})", address, peer);

        Ok(Self { socket, peer })
    }

    /// Address of the collector
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Local address of the socket
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

#[async_trait]
impl Sink for UdpSink {
    async fn write(&mut self, frame: &[u8]) -> io::Result<()> {
        self.socket.send(frame).await.map(|_| ())
    }
}

/// Sink over any async writer (files, pipes, in-memory buffers)
pub struct WriterSink<W> {
    writer: W,
}

impl<W> WriterSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Unwrap the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Sink for WriterSink<W> {
    async fn write(&mut self, frame: &[u8]) -> io::Result<()> {
        self.writer.write_all(frame).await?;
        self.writer.flush().await
    }

    async fn close(&mut self) -> io::Result<()> {
        self.writer.shutdown().await
    }
}

#[derive(Default)]
struct MemoryState {
    writes: Vec<Vec<u8>>,
    closed: bool,
    failing: bool,
}

/// Sink recording every write in memory.
///
/// Clones share the same record, so a clone can be handed to a client while
/// the original is kept for inspection.
#[derive(Clone, Default)]
pub struct MemorySink {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames written so far
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state.lock().writes.clone()
    }

    /// Number of frames written so far
    pub fn write_count(&self) -> usize {
        self.state.lock().writes.len()
    }

    /// Whether `close` was called
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Make subsequent writes fail without recording them
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().failing = failing;
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn write(&mut self, frame: &[u8]) -> io::Result<()> {
        let mut state = self.state.lock();
        if state.failing {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink failing"));
        }
        state.writes.push(frame.to_vec());
        Ok(())
    }

    async fn close(&mut self) -> io::Result<()> {
        self.state.lock().closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_sink_records_writes() {
        let sink = MemorySink::new();
        let mut handle = sink.clone();

        handle.write(b"a:1|c\n").await.unwrap();
        handle.write(b"b:2|g\n").await.unwrap();
        assert_eq!(sink.write_count(), 2);
        assert_eq!(sink.writes()[1], b"b:2|g\n".to_vec());

        assert!(!sink.is_closed());
        handle.close().await.unwrap();
        assert!(sink.is_closed());
    }

    #[tokio::test]
    async fn test_memory_sink_failing() {
        let sink = MemorySink::new();
        sink.set_failing(true);
        let mut handle = sink.clone();
        assert!(handle.write(b"x").await.is_err());
        assert_eq!(sink.write_count(), 0);
    }

    #[tokio::test]
    async fn test_boxed_sink() {
        let sink = MemorySink::new();
        let mut boxed: Box<dyn Sink> = Box::new(sink.clone());
        boxed.write(b"x").await.unwrap();
        boxed.close().await.unwrap();
        assert_eq!(sink.write_count(), 1);
        assert!(sink.is_closed());
    }

    #[tokio::test]
    async fn test_writer_sink() {
        let mut sink = WriterSink::new(Vec::new());
        sink.write(b"a:1|c\n").await.unwrap();
        sink.write(b"b:1|c\n").await.unwrap();
        assert_eq!(sink.into_inner(), b"a:1|c\nb:1|c\n".to_vec());
    }

    #[tokio::test]
    async fn test_udp_sink_sends_datagrams() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();

        let mut sink = UdpSink::connect(&addr.to_string()).await.unwrap();
        assert_eq!(sink.peer_addr(), addr);
        let local = sink.local_addr().unwrap();
        assert!(local.is_ipv4());
        assert_ne!(local.port(), 0);
        sink.write(b"hits:1|c\n").await.unwrap();

        let mut buf = [0u8; 64];
        let (n, from) = tokio::time::timeout(std::time::Duration::from_secs(1), server.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&buf[..n], b"hits:1|c\n");
        assert_eq!(from.port(), local.port());
    }

    #[tokio::test]
    async fn test_udp_sink_bad_address() {
        let result = UdpSink::connect("not an address").await;
        assert!(matches!(result, Err(ClientError::InvalidAddress(_))));
    }
}
