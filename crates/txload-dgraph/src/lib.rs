//! Dgraph backend for the txload store traits.
pub mod proto {
    tonic::include_proto!("api");
}

mod config;
pub use config::DgraphConfig;

mod errors;
pub use errors::DgraphError;

mod doc;

mod txn;
pub use txn::DgraphTxn;

mod store;
pub use store::DgraphStore;

#[cfg(test)]
mod fake;
