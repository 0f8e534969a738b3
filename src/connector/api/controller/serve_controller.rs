use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::connector::adapter::ChatHttpServer;

use super::super::Container;

/// Serves the HTTP front door until Ctrl-C.
pub struct ServeController<'a> {
    container: &'a Container,
}

impl<'a> ServeController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn serve(&self, port: u16, public: bool) -> Result<String> {
        let ip = if public {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        };
        let listener = TcpListener::bind(SocketAddr::new(ip, port)).await?;

        let session = self.container.new_session(false);
        let server = ChatHttpServer::new(Arc::new(self.container.submit_use_case(session)));

        let shutdown = CancellationToken::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Shutting down chat server");
                    trigger.cancel();
                }
                Err(e) => warn!("Failed to listen for Ctrl-C: {e}"),
            }
        });

        server.serve(listener, shutdown).await?;
        Ok("Chat server stopped.".to_string())
    }
}
