use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::Channel;
use tracing::{debug, trace};
use txload_core::{Lookup, StoreError, Transaction, Upserted};

use crate::doc;
use crate::errors::DgraphError;
use crate::proto::{self, Mutation, Request, TxnContext, dgraph_client::DgraphClient};

/// Client-side transaction state.
///
/// Tracks the start timestamp and the conflict keys/predicates returned by every response;
/// these are sent back on commit or abort.
pub struct DgraphTxn {
    client: DgraphClient<Channel>,
    ctx: TxnContext,
    finished: bool,
    mutated: bool,
}

impl DgraphTxn {
    pub(crate) fn new(client: DgraphClient<Channel>) -> Self {
        Self {
            client,
            ctx: TxnContext::default(),
            finished: false,
            mutated: false,
        }
    }

    pub fn start_ts(&self) -> u64 {
        self.ctx.start_ts
    }

    async fn execute(&mut self, mut req: Request) -> Result<proto::Response, DgraphError> {
        if self.finished {
            return Err(DgraphError::Finished);
        }
        if !req.mutations.is_empty() {
            self.mutated = true;
        }
        req.start_ts = self.ctx.start_ts;

        let resp = self.client.query(req).await?.into_inner();
        if let Some(src) = &resp.txn {
            self.merge(src)?;
        }
        Ok(resp)
    }

    fn merge(&mut self, src: &TxnContext) -> Result<(), DgraphError> {
        if self.ctx.start_ts == 0 {
            self.ctx.start_ts = src.start_ts;
        }
        if self.ctx.start_ts != src.start_ts {
            return Err(DgraphError::StartTsMismatch {
                ours: self.ctx.start_ts,
                theirs: src.start_ts,
            });
        }
        self.ctx.keys.extend(src.keys.iter().cloned());
        self.ctx.preds.extend(src.preds.iter().cloned());
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), DgraphError> {
        if self.finished {
            return Err(DgraphError::Finished);
        }
        self.finished = true;
        if !self.mutated {
            return Ok(());
        }

        let done = self.client.commit_or_abort(self.ctx.clone()).await?.into_inner();
        if done.aborted && !self.ctx.aborted {
            return Err(DgraphError::Aborted);
        }
        Ok(())
    }
}

fn processing(resp: &proto::Response) -> Duration {
    resp.latency
        .as_ref()
        .map(|l| Duration::from_nanos(l.processing_ns))
        .unwrap_or_default()
}

#[async_trait]
impl Transaction for DgraphTxn {
    async fn lookup(&mut self, key: &str) -> Result<Lookup, StoreError> {
        let req = Request {
            query: doc::LOOKUP_QUERY.to_string(),
            vars: doc::lookup_vars(key),
            ..Default::default()
        };
        let resp = self.execute(req).await?;
        let uid = doc::parse_lookup(&resp.json)?;
        Ok(Lookup {
            uid,
            latency: processing(&resp),
        })
    }

    async fn upsert(
        &mut self,
        uid: Option<&str>,
        key: &str,
        body: &str,
    ) -> Result<Upserted, StoreError> {
        let mutation = Mutation {
            set_json: doc::mutation_json(uid, key, body)?,
            ..Default::default()
        };
        let req = Request {
            mutations: vec![mutation],
            ..Default::default()
        };
        let resp = self.execute(req).await?;

        let uid = match uid {
            Some(uid) => uid.to_string(),
            None => resp
                .uids
                .get(doc::NEW_NODE)
                .cloned()
                .ok_or(DgraphError::MissingUid)?,
        };
        Ok(Upserted {
            uid,
            latency: processing(&resp),
        })
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        self.finish().await?;
        trace!(start_ts = self.ctx.start_ts, "transaction committed");
        Ok(())
    }

    async fn discard(&mut self) {
        if self.finished {
            return;
        }
        self.ctx.aborted = true;
        if let Err(e) = self.finish().await {
            debug!(start_ts = self.ctx.start_ts, error = %e, "discard failed");
        }
    }
}

impl Drop for DgraphTxn {
    // Abort on the server when the owning task was cancelled mid-transaction.
    fn drop(&mut self) {
        if self.finished || !self.mutated {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let mut client = self.client.clone();
        let mut ctx = std::mem::take(&mut self.ctx);
        ctx.aborted = true;
        handle.spawn(async move {
            if let Err(e) = client.commit_or_abort(ctx).await {
                debug!(error = %e, "background abort failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lazy_client() -> DgraphClient<Channel> {
        let channel = Channel::from_static("http://127.0.0.1:1").connect_lazy();
        DgraphClient::new(channel)
    }

    #[tokio::test]
    async fn merge_adopts_first_start_ts_and_collects_keys() {
        let mut txn = DgraphTxn::new(lazy_client());
        txn.merge(&TxnContext {
            start_ts: 10,
            keys: vec!["k1".into()],
            preds: vec!["docKey".into()],
            ..Default::default()
        })
        .unwrap();
        txn.merge(&TxnContext {
            start_ts: 10,
            keys: vec!["k2".into()],
            ..Default::default()
        })
        .unwrap();

        assert_eq!(txn.start_ts(), 10);
        assert_eq!(txn.ctx.keys, ["k1", "k2"]);
        assert_eq!(txn.ctx.preds, ["docKey"]);
    }

    #[tokio::test]
    async fn merge_rejects_foreign_start_ts() {
        let mut txn = DgraphTxn::new(lazy_client());
        txn.merge(&TxnContext {
            start_ts: 10,
            ..Default::default()
        })
        .unwrap();
        let err = txn
            .merge(&TxnContext {
                start_ts: 11,
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            DgraphError::StartTsMismatch {
                ours: 10,
                theirs: 11
            }
        ));
    }

    #[tokio::test]
    async fn read_only_commit_skips_the_server() {
        let mut txn = DgraphTxn::new(lazy_client());
        txn.commit().await.unwrap();
        assert!(matches!(txn.commit().await, Err(StoreError::Finished)));
    }
}
