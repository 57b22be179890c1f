fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile the wire schema for record events
    let proto_files: Vec<_> = std::fs::read_dir("proto")?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "proto"))
        .map(|e| e.path())
        .collect();

    let mut config = prost_build::Config::new();
    config.bytes([".robocar.events.FrameMessage.frame"]);
    config.compile_protos(&proto_files, &["proto"])?;

    for proto_file in &proto_files {
        println!("cargo:rerun-if-changed={}", proto_file.display());
    }
    println!("cargo:rerun-if-changed=proto");

    Ok(())
}
