//! `dashrun serve` — run the dashboard endpoint in the foreground.

use std::net::{SocketAddr, ToSocketAddrs};

use anyhow::{Context, Result};
use clap::Args;

use dashrun_core::settings;

use super::RootArg;

/// Arguments for `dashrun serve`. Flags override `automation/dashrun.yaml`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub root: RootArg,

    /// Interface to bind.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind.
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    pub fn run(self) -> Result<()> {
        let root = self.root.resolve()?;
        let settings = settings::load_at(&root).context("failed to load dashrun.yaml")?;
        let host = self.host.unwrap_or(settings.server.host);
        let port = self.port.unwrap_or(settings.server.port);
        let addr = bind_address(&host, port)?;

        println!("Serving {} on http://{addr}/ (Ctrl-C to stop)", root.display());
        dashrun_daemon::start_blocking(root, addr).context("server exited with error")
    }
}

fn bind_address(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .with_context(|| format!("cannot resolve {host}:{port}"))?
        .next()
        .with_context(|| format!("{host} resolved to no address"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_addresses_resolve() {
        let addr = bind_address("127.0.0.1", 8080).expect("addr");
        assert_eq!(addr.port(), 8080);
        assert!(addr.ip().is_loopback());
    }
}
