fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile the proto file for the zero-shot classifier client (and the
    // server stubs used by tests to stand up a mock classifier)
    tonic_build::compile_protos("../../proto/classifier.proto")?;
    println!("cargo:rerun-if-changed=../../proto/classifier.proto");
    Ok(())
}
