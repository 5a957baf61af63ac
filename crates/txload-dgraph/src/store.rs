use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, info, instrument};
use txload_core::{Store, StoreError};

use crate::config::{DgraphConfig, endpoint_uri};
use crate::doc;
use crate::errors::DgraphError;
use crate::proto::{Operation, dgraph_client::DgraphClient};
use crate::txn::DgraphTxn;

/// Connection pool over one or more Dgraph alphas.
///
/// Each transaction is pinned to one endpoint, picked round robin.
pub struct DgraphStore {
    clients: Vec<DgraphClient<Channel>>,
    next: AtomicUsize,
}

impl DgraphStore {
    /// Dial every configured host. Any failure aborts before a workload can start.
    #[instrument(level = "info", skip(cfg), fields(hosts = cfg.hosts.len()))]
    pub async fn connect(cfg: &DgraphConfig) -> Result<Self, DgraphError> {
        if cfg.hosts.is_empty() {
            return Err(DgraphError::NoHosts);
        }

        let mut clients = Vec::with_capacity(cfg.hosts.len());
        for host in &cfg.hosts {
            let uri = endpoint_uri(host);
            let endpoint = Endpoint::from_shared(uri.clone())
                .map_err(|source| DgraphError::InvalidEndpoint {
                    endpoint: uri.clone(),
                    source,
                })?
                .connect_timeout(cfg.connect_timeout);
            let channel = endpoint
                .connect()
                .await
                .map_err(|source| DgraphError::Connect {
                    endpoint: uri.clone(),
                    source,
                })?;
            debug!(endpoint = %uri, "connected");
            clients.push(DgraphClient::new(channel));
        }

        info!(endpoints = clients.len(), "dgraph connected");
        Ok(Self::from_clients(clients))
    }

    pub(crate) fn from_clients(clients: Vec<DgraphClient<Channel>>) -> Self {
        Self {
            clients,
            next: AtomicUsize::new(0),
        }
    }

    fn pick(&self) -> DgraphClient<Channel> {
        let i = self.next.fetch_add(1, Ordering::Relaxed) % self.clients.len();
        self.clients[i].clone()
    }

    pub fn endpoints(&self) -> usize {
        self.clients.len()
    }
}

#[async_trait]
impl Store for DgraphStore {
    type Txn = DgraphTxn;

    fn name(&self) -> &'static str {
        "dgraph"
    }

    async fn setup(&self) -> Result<(), StoreError> {
        let op = Operation {
            schema: doc::SCHEMA.to_string(),
            ..Default::default()
        };
        self.pick()
            .alter(op)
            .await
            .map_err(|s| StoreError::from(DgraphError::from(s)))?;
        info!("schema applied");
        Ok(())
    }

    fn begin(&self) -> DgraphTxn {
        DgraphTxn::new(self.pick())
    }
}
