//! Schema, query and JSON shapes of the `Doc` type.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::DgraphError;

pub const SCHEMA: &str = r#"
    docKey: string @index(hash) @upsert .
    body: string .
    type Doc {
        docKey
        body
    }
"#;

pub const LOOKUP_QUERY: &str = r#"
    query Doc($key: string) {
        q(func: eq(docKey, $key)) {
            uid
            body
        }
    }
"#;

/// Blank node name for a record created by the mutation.
pub const NEW_NODE: &str = "new";

pub fn lookup_vars(key: &str) -> HashMap<String, String> {
    HashMap::from([("$key".to_string(), key.to_string())])
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    #[serde(default)]
    q: Vec<Found>,
}

#[derive(Debug, Deserialize)]
struct Found {
    uid: String,
}

/// uid of the first match, if any.
pub fn parse_lookup(json: &[u8]) -> Result<Option<String>, DgraphError> {
    if json.is_empty() {
        return Ok(None);
    }
    let result: LookupResult = serde_json::from_slice(json).map_err(DgraphError::Decode)?;
    Ok(result.q.into_iter().next().map(|f| f.uid))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocMutation {
    #[serde(rename = "dgraph.type")]
    pub kind: String,
    pub uid: String,
    #[serde(rename = "docKey")]
    pub doc_key: String,
    pub body: String,
}

/// `set_json` payload; a missing uid becomes the blank node `_:new`.
pub fn mutation_json(uid: Option<&str>, key: &str, body: &str) -> Result<Vec<u8>, DgraphError> {
    let doc = DocMutation {
        kind: "Doc".to_string(),
        uid: uid.map_or_else(|| format!("_:{NEW_NODE}"), str::to_string),
        doc_key: key.to_string(),
        body: body.to_string(),
    };
    serde_json::to_vec(&doc).map_err(DgraphError::Encode)
}
