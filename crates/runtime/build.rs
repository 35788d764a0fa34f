//! Build script for compiling protobuf definitions into Rust code

#[cfg(feature = "grpc-server")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    tonic_build::configure()
        .build_client(true)
        .build_server(true)
        .compile(&["proto/vm_runtime.proto"], &["proto"])?;
    Ok(())
}

#[cfg(not(feature = "grpc-server"))]
fn main() {
    // No-op when grpc-server feature is not enabled
}
