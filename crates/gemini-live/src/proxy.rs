//! HTTP CONNECT tunneling for proxied live connections.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_tungstenite::client_async_tls;
use tracing::debug;

use crate::error::LiveError;
use crate::session::WsTransport;

const MAX_CONNECT_RESPONSE_BYTES: usize = 4096;

/// Establishes the websocket connection through an HTTP proxy.
///
/// Opens a TCP connection to the proxy, issues a CONNECT for the target
/// host and upgrades the tunneled stream to TLS plus websocket.
pub(crate) async fn connect_via_proxy(
    uri: &str,
    proxy_url: &str,
    target_host: &str,
) -> Result<WsTransport, LiveError> {
    let proxy_addr = proxy_authority(proxy_url);
    debug!(proxy = %proxy_addr, target = %target_host, "tunneling live connection");

    let mut tcp = TcpStream::connect(&proxy_addr)
        .await
        .map_err(|e| LiveError::Proxy(format!("connect to {proxy_addr}: {e}")))?;

    let connect_request = format!(
        "CONNECT {target_host}:443 HTTP/1.1\r\nHost: {target_host}:443\r\nProxy-Connection: keep-alive\r\n\r\n"
    );
    tcp.write_all(connect_request.as_bytes())
        .await
        .map_err(|e| LiveError::Proxy(format!("send CONNECT: {e}")))?;

    read_connect_response(&mut tcp).await?;

    let (transport, _) = client_async_tls(uri, tcp).await.map_err(LiveError::Connect)?;
    Ok(transport)
}

/// Strips the scheme from a proxy URL, leaving `host:port`.
fn proxy_authority(proxy_url: &str) -> String {
    let authority = proxy_url
        .split_once("://")
        .map_or(proxy_url, |(_, rest)| rest);
    let authority = authority.trim_end_matches('/');
    if authority.contains(':') {
        authority.to_string()
    } else {
        format!("{authority}:80")
    }
}

/// Reads the proxy's response headers and verifies the tunnel was granted.
///
/// Reads one byte at a time so nothing past the blank line is consumed;
/// whatever follows belongs to the TLS handshake.
async fn read_connect_response<S>(stream: &mut S) -> Result<(), LiveError>
where
    S: AsyncRead + Unpin,
{
    let mut response = Vec::with_capacity(128);
    let mut byte = [0u8; 1];
    while !response.ends_with(b"\r\n\r\n") {
        if response.len() >= MAX_CONNECT_RESPONSE_BYTES {
            return Err(LiveError::Proxy("oversized CONNECT response".to_string()));
        }
        let n = stream
            .read(&mut byte)
            .await
            .map_err(|e| LiveError::Proxy(format!("read CONNECT response: {e}")))?;
        if n == 0 {
            return Err(LiveError::Proxy(
                "proxy closed the connection during CONNECT".to_string(),
            ));
        }
        response.push(byte[0]);
    }

    let response = String::from_utf8_lossy(&response);
    let status_line = response.lines().next().unwrap_or_default();
    if status_line.split_whitespace().nth(1) == Some("200") {
        Ok(())
    } else {
        Err(LiveError::Proxy(format!("CONNECT rejected: {status_line}")))
    }
}
