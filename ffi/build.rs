//! Generates `posts_ffi.h` in `OUT_DIR` for C, Swift and JNI hosts.

use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let (Ok(crate_dir), Ok(out_dir)) = (std::env::var("CARGO_MANIFEST_DIR"), std::env::var("OUT_DIR"))
    else {
        println!("cargo:warning=CARGO_MANIFEST_DIR or OUT_DIR unset; header not generated");
        return;
    };
    let crate_dir = PathBuf::from(crate_dir);
    let out = PathBuf::from(out_dir).join("posts_ffi.h");

    let config = match cbindgen::Config::from_file(crate_dir.join("cbindgen.toml")) {
        Ok(config) => config,
        Err(err) => {
            println!("cargo:warning=reading cbindgen.toml failed: {err}");
            return;
        }
    };
    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            let mut header = Vec::new();
            bindings.write(&mut header);
            if let Err(err) = std::fs::write(&out, header) {
                println!("cargo:warning=writing {} failed: {err}", out.display());
            }
        }
        // hosts linking only the Rust side don't need the header
        Err(err) => println!("cargo:warning=cbindgen failed: {err}"),
    }
}
