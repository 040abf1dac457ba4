//! Build script for generating protobuf code
//!
//! Generates the `slr.v1` client and server from the proto definitions.
//! If protoc is not available, it will skip code generation.

use std::path::PathBuf;
use std::process::Command;

const PROTO_FILE: &str = "../../proto/slr/v1/regression.proto";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Re-run if proto files change
    println!("cargo:rerun-if-changed={}", PROTO_FILE);

    // Check if protoc is available
    let protoc_available =
        std::env::var("PROTOC").is_ok() || Command::new("protoc").arg("--version").output().is_ok();

    if !protoc_available {
        println!("cargo:warning=protoc not found, skipping proto generation");
        println!("cargo:warning=Install protoc or set PROTOC env var to generate proto code");
        return Ok(());
    }

    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);

    // The server binary serves and the CLI calls the same service
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .out_dir(&out_dir)
        .compile(&[PROTO_FILE], &["../../proto"])?;

    Ok(())
}
