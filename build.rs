use std::env;
use std::fs;
use std::path::Path;

fn main() {
    let crate_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");

    let lib_path = Path::new(&crate_dir).join("src/lib.rs");
    if !lib_path.exists() {
        panic!("src/lib.rs missing; create the file before building");
    }

    // C header for the `ffi` module
    match cbindgen::generate(&crate_dir) {
        Ok(bindings) => {
            let header_path = Path::new(&crate_dir).join("include/bulkxor.h");
            if let Some(parent) = header_path.parent() {
                if let Err(e) = fs::create_dir_all(parent) {
                    println!("cargo:warning=Failed to create include/ directory: {}", e);
                }
            }
            if !bindings.write_to_file(&header_path) {
                println!("cargo:warning=bulkxor.h unchanged");
            }
        }
        Err(e) => {
            println!("cargo:warning=cbindgen generation failed: {}", e);
        }
    }

    println!("cargo:rerun-if-changed=src/");
    println!("cargo:rerun-if-changed=build.rs");
}
