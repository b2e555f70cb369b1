use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

pub mod api;
pub mod http;

use crate::core::Pipeline;
use crate::error::AppError;
use http::{HttpError, HttpResponse};
pub const READ_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Server {
    listener: TcpListener,
    pipeline: Arc<Pipeline>,
}

impl Server {
    pub async fn bind(addr: &str, pipeline: Arc<Pipeline>) -> Result<Self, AppError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Bind(addr.to_string(), e))?;
        Ok(Self { listener, pipeline })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
    pub async fn run(self) -> Result<(), AppError> {
        self.run_until(shutdown_signal()).await
    }

    pub async fn run_until<F>(self, shutdown: F) -> Result<(), AppError>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        tracing::info!(%addr, "listening");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("shutting down");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let pipeline = self.pipeline.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, peer, &pipeline).await {
                                tracing::debug!(%peer, error = %e, "connection dropped");
                            }
                        });
                    }
                    Err(e) => tracing::warn!(error = %e, "accept failed"),
                },
            }
        }
        Ok(())
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    pipeline: &Pipeline,
) -> Result<(), HttpError> {
    let read = tokio::time::timeout(READ_TIMEOUT, http::read_request(&mut stream)).await;
    let response = match read {
        Ok(Ok(request)) => {
            let response = api::route(pipeline, &request).await;
            tracing::debug!(
                %peer,
                method = request.method.as_str(),
                path = %request.path,
                status = response.status.0,
                "request"
            );
            response
        }
        Ok(Err(e)) => match e.status() {
            Some(status) => {
                tracing::debug!(%peer, error = %e, "rejected request");
                HttpResponse::error(status, &e.to_string())
            }
            None => return Err(e),
        },
        Err(_) => return Err(HttpError::Malformed("timed out reading request".to_string())),
    };

    stream.write_all(&api::with_cors(response).serialize()).await?;
    stream.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
