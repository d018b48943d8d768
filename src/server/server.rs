//! Tool server transports
//!
//! Both transports speak newline-delimited JSON-RPC. Requests on one
//! connection run concurrently; responses are written as they complete.

use anyhow::Result;
use futures::sink::SinkExt;
use futures::stream::StreamExt;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixListener;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};

use super::handlers::handle_line;
use super::protocol::{Response, error_codes};
use crate::core::PackageService;

/// Longest accepted request line
pub(crate) const MAX_LINE_LENGTH: usize = 4 * 1024 * 1024;

/// Serve one session on stdin/stdout until EOF or Ctrl-C
pub async fn run_stdio(service: PackageService) -> Result<()> {
    tracing::info!("serving on stdio");
    tokio::select! {
        result = serve(tokio::io::stdin(), tokio::io::stdout(), service) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
            Ok(())
        }
    }
}

/// Accept connections on `listener` until Ctrl-C, one session per connection
pub async fn run_socket(listener: UnixListener, service: PackageService) -> Result<()> {
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, _addr) = result?;
                let service = service.clone();
                let mut shutdown_rx = shutdown_tx.subscribe();

                tokio::spawn(async move {
                    tracing::debug!("client connected");
                    let (reader, writer) = stream.into_split();
                    tokio::select! {
                        result = serve(reader, writer, service) => {
                            if let Err(e) = result {
                                tracing::error!("Client error: {e}");
                            }
                        }
                        _ = shutdown_rx.recv() => {
                            tracing::debug!("Client connection closed due to shutdown");
                        }
                    }
                    tracing::debug!("client disconnected");
                });
            }

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received, cleaning up...");
                let _ = shutdown_tx.send(());
                break;
            }
        }
    }

    Ok(())
}

/// Bind a user-only socket at `path`, replacing a stale one
pub fn bind_socket(path: &Path) -> Result<UnixListener> {
    if path.exists() {
        tracing::debug!("Removing existing socket at {}", path.display());
        std::fs::remove_file(path)?;
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let listener = UnixListener::bind(path)?;

    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    std::fs::set_permissions(path, perms)?;

    tracing::info!("Listening on {}", path.display());
    Ok(listener)
}

/// Serve one newline-delimited JSON-RPC session
pub async fn serve<R, W>(reader: R, writer: W, service: PackageService) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));
    let (tx, mut rx) = mpsc::channel::<String>(64);

    let writer_task = tokio::spawn(async move {
        let mut sink = FramedWrite::new(writer, LinesCodec::new());
        while let Some(line) = rx.recv().await {
            sink.send(line).await?;
        }
        Ok::<_, LinesCodecError>(())
    });

    let mut in_flight = JoinSet::new();
    while let Some(line) = lines.next().await {
        let line = match line {
            Ok(line) => line,
            Err(LinesCodecError::MaxLineLengthExceeded) => {
                tracing::warn!("dropping request longer than {MAX_LINE_LENGTH} bytes");
                let response = Response::error(
                    serde_json::Value::Null,
                    error_codes::INVALID_REQUEST,
                    "request too large",
                );
                send(&tx, &response).await;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if line.trim().is_empty() {
            continue;
        }

        let service = service.clone();
        let tx = tx.clone();
        in_flight.spawn(async move {
            if let Some(response) = handle_line(&service, &line).await {
                send(&tx, &response).await;
            }
        });
    }

    while in_flight.join_next().await.is_some() {}
    drop(tx);
    writer_task.await??;
    Ok(())
}

async fn send(tx: &mpsc::Sender<String>, response: &Response) {
    match serde_json::to_string(response) {
        Ok(text) => {
            if tx.send(text).await.is_err() {
                tracing::debug!("client went away before the response was written");
            }
        }
        Err(e) => tracing::error!("could not encode response: {e}"),
    }
}
