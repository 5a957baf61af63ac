//! Minimal in-process Dgraph server for tests.
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use tonic::{Request, Response, Status};

use crate::doc::DocMutation;
use crate::proto::{
    self, Latency, Operation, Payload, TxnContext,
    dgraph_server::{Dgraph, DgraphServer},
};

pub const PROCESSING_NS: u64 = 1_500;

#[derive(Default)]
pub struct FakeState {
    pub schema: Option<String>,
    pub docs: HashMap<String, String>,
    pub bodies: HashMap<String, String>,
    pub commits: u64,
    pub aborts: u64,
    pub queries: u64,
    pub abort_commits: bool,
    next_ts: u64,
    next_uid: u64,
    staged: HashMap<u64, Vec<(String, String, String)>>,
}

#[derive(Clone, Default)]
pub struct FakeDgraph {
    pub state: Arc<Mutex<FakeState>>,
}

#[tonic::async_trait]
impl Dgraph for FakeDgraph {
    async fn query(
        &self,
        request: Request<proto::Request>,
    ) -> Result<Response<proto::Response>, Status> {
        let req = request.into_inner();
        let mut st = self.state.lock().unwrap();
        st.queries += 1;

        let start_ts = if req.start_ts == 0 {
            st.next_ts += 1;
            st.next_ts
        } else {
            req.start_ts
        };
        let mut txn = TxnContext {
            start_ts,
            ..Default::default()
        };
        let mut resp = proto::Response {
            latency: Some(Latency {
                processing_ns: PROCESSING_NS,
                ..Default::default()
            }),
            ..Default::default()
        };

        if req.mutations.is_empty() {
            let key = req.vars.get("$key").cloned().unwrap_or_default();
            let q: Vec<_> = st
                .docs
                .get(&key)
                .map(|uid| json!({ "uid": uid }))
                .into_iter()
                .collect();
            resp.json = serde_json::to_vec(&json!({ "q": q })).unwrap();
        }

        for m in req.mutations {
            let doc: DocMutation = serde_json::from_slice(&m.set_json)
                .map_err(|e| Status::invalid_argument(e.to_string()))?;
            let uid = match doc.uid.strip_prefix("_:") {
                Some(blank) => {
                    st.next_uid += 1;
                    let uid = format!("{:#x}", st.next_uid);
                    resp.uids.insert(blank.to_string(), uid.clone());
                    uid
                }
                None => doc.uid.clone(),
            };
            txn.keys.push(doc.doc_key.clone());
            st.staged
                .entry(start_ts)
                .or_default()
                .push((doc.doc_key, uid, doc.body));
        }

        resp.txn = Some(txn);
        Ok(Response::new(resp))
    }

    async fn alter(&self, request: Request<Operation>) -> Result<Response<Payload>, Status> {
        let op = request.into_inner();
        self.state.lock().unwrap().schema = Some(op.schema);
        Ok(Response::new(Payload::default()))
    }

    async fn commit_or_abort(
        &self,
        request: Request<TxnContext>,
    ) -> Result<Response<TxnContext>, Status> {
        let ctx = request.into_inner();
        let mut st = self.state.lock().unwrap();
        let staged = st.staged.remove(&ctx.start_ts).unwrap_or_default();

        if ctx.aborted {
            st.aborts += 1;
            return Ok(Response::new(ctx));
        }
        if st.abort_commits {
            st.aborts += 1;
            return Err(Status::aborted("transaction has been aborted"));
        }
        for (key, uid, body) in staged {
            st.docs.insert(key, uid.clone());
            st.bodies.insert(uid, body);
        }
        st.commits += 1;
        st.next_ts += 1;
        let commit_ts = st.next_ts;
        Ok(Response::new(TxnContext { commit_ts, ..ctx }))
    }
}

/// Serve `fake` on a free local port and wait until it accepts connections.
pub async fn spawn(fake: FakeDgraph) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    tokio::spawn(
        tonic::transport::Server::builder()
            .add_service(DgraphServer::new(fake))
            .serve(addr),
    );
    for _ in 0..200 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    addr
}
