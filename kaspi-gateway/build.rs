const PROTOS: &[&str] = &[
    "../proto/kaspi/gateway/v1/device.proto",
    "../proto/kaspi/gateway/v1/payment.proto",
    "../proto/kaspi/gateway/v1/refund.proto",
    "../proto/kaspi/gateway/v1/utility.proto",
    "../proto/kaspi/gateway/v1/enhanced_refund.proto",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = std::path::PathBuf::from(std::env::var("OUT_DIR")?);

    // Descriptor set feeds server reflection and the gate coverage test
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .file_descriptor_set_path(out_dir.join("kaspi_gateway_descriptor.bin"))
        .compile_protos(PROTOS, &["../proto"])?;

    for proto in PROTOS {
        println!("cargo:rerun-if-changed={}", proto);
    }

    Ok(())
}
