use std::{env, error::Error};

const PROTO_DIR: &str = "proto";
const DGRAPH_API: &str = "proto/api.proto";

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed={DGRAPH_API}");

    let protoc = protoc_bin_vendored::protoc_bin_path()
        .map_err(|e| format!("vendored protoc unavailable: {e}"))?;
    unsafe {
        env::set_var("PROTOC", &protoc);
    }

    // The server half backs the in-process fake used by the tests.
    tonic_build::configure()
        .build_client(true)
        .build_server(true)
        .compile_protos(&[DGRAPH_API], &[PROTO_DIR])?;
    Ok(())
}
