//! One DNS request/response exchange over UDP or TCP
//!
//! Each phase (dial, write, read) has its own timeout. Dial covers address
//! resolution as well as connecting.

use crate::config::{ProbeTimeouts, ServerEndpoint, Transport};
use crate::error::{ExchangePhase, ProbeError};
use std::future::Future;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};

/// Largest UDP response accepted (EDNS-sized buffer)
const MAX_UDP_RESPONSE: usize = 4096;

/// Send `query` to `endpoint` and return the raw response bytes
pub(crate) async fn exchange(
    endpoint: &ServerEndpoint,
    query: &[u8],
    timeouts: &ProbeTimeouts,
) -> Result<Vec<u8>, ProbeError> {
    match endpoint.transport {
        Transport::Udp => exchange_udp(&endpoint.address, query, timeouts).await,
        Transport::Tcp => exchange_tcp(&endpoint.address, query, timeouts).await,
    }
}

async fn exchange_udp(
    address: &str,
    query: &[u8],
    timeouts: &ProbeTimeouts,
) -> Result<Vec<u8>, ProbeError> {
    let socket = within(ExchangePhase::Dial, timeouts.dial, async {
        let server = resolve(address).await?;
        let local: SocketAddr = match server {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local).await.map_err(ProbeError::Dial)?;
        socket.connect(server).await.map_err(ProbeError::Dial)?;
        Ok::<_, ProbeError>(socket)
    })
    .await?;

    within(ExchangePhase::Write, timeouts.write, async {
        socket.send(query).await.map_err(ProbeError::Write)
    })
    .await?;

    let mut buf = vec![0u8; MAX_UDP_RESPONSE];
    let len = within(ExchangePhase::Read, timeouts.read, async {
        socket.recv(&mut buf).await.map_err(ProbeError::Read)
    })
    .await?;
    buf.truncate(len);

    Ok(buf)
}

async fn exchange_tcp(
    address: &str,
    query: &[u8],
    timeouts: &ProbeTimeouts,
) -> Result<Vec<u8>, ProbeError> {
    let mut stream = within(ExchangePhase::Dial, timeouts.dial, async {
        let server = resolve(address).await?;
        TcpStream::connect(server).await.map_err(ProbeError::Dial)
    })
    .await?;

    // TCP messages carry a two-byte length prefix (RFC 1035 4.2.2)
    let len = u16::try_from(query.len())
        .map_err(|_| ProbeError::Encode(format!("query of {} bytes is too large", query.len())))?;
    let mut framed = Vec::with_capacity(query.len() + 2);
    framed.extend_from_slice(&len.to_be_bytes());
    framed.extend_from_slice(query);

    within(ExchangePhase::Write, timeouts.write, async {
        stream.write_all(&framed).await.map_err(ProbeError::Write)
    })
    .await?;

    within(ExchangePhase::Read, timeouts.read, async {
        let len = stream.read_u16().await.map_err(ProbeError::Read)?;
        let mut buf = vec![0u8; usize::from(len)];
        stream.read_exact(&mut buf).await.map_err(ProbeError::Read)?;
        Ok::<_, ProbeError>(buf)
    })
    .await
}

/// Resolve `host:port` to the first socket address
async fn resolve(address: &str) -> Result<SocketAddr, ProbeError> {
    let mut addrs = tokio::net::lookup_host(address)
        .await
        .map_err(|e| ProbeError::Resolve {
            server: address.to_string(),
            reason: e.to_string(),
        })?;

    addrs.next().ok_or_else(|| ProbeError::Resolve {
        server: address.to_string(),
        reason: "no addresses found".to_string(),
    })
}

/// Run one exchange phase under its timeout
async fn within<T>(
    phase: ExchangePhase,
    limit: Duration,
    phase_future: impl Future<Output = Result<T, ProbeError>>,
) -> Result<T, ProbeError> {
    tokio::time::timeout(limit, phase_future)
        .await
        .map_err(|_| ProbeError::Timeout { phase })?
}
