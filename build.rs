// Build script for isl-core-ffi
//
// The C header (include/islcore.h) is maintained manually: cbindgen does not
// recognize Rust 2024's #[unsafe(no_mangle)] attribute syntax.
//
// With the `isl` feature the system integer set library is linked. Set
// ISL_LIB_DIR to add a non-standard library search path.

fn main() {
    println!("cargo:rerun-if-changed=src/");
    println!("cargo:rerun-if-env-changed=ISL_LIB_DIR");

    if std::env::var_os("CARGO_FEATURE_ISL").is_some() {
        if let Some(dir) = std::env::var_os("ISL_LIB_DIR") {
            println!("cargo:rustc-link-search=native={}", dir.to_string_lossy());
        }
        println!("cargo:rustc-link-lib=isl");
    }
}
