use std::{env, fs, path::Path};

fn package_field<'a>(pkg: &'a toml::Table, key: &str, fallback: &'a str) -> &'a str {
    pkg.get(key).and_then(|v| v.as_str()).unwrap_or(fallback)
}

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let manifest_path = Path::new(&manifest_dir).join("Cargo.toml");
    println!("cargo:rerun-if-changed={}", manifest_path.display());

    let content = fs::read_to_string(&manifest_path)
        .unwrap_or_else(|e| panic!("Failed to read Cargo.toml: {e}"));
    let manifest: toml::Table =
        toml::from_str(&content).unwrap_or_else(|e| panic!("Failed to parse Cargo.toml: {e}"));
    let pkg = manifest
        .get("package")
        .and_then(|p| p.as_table())
        .expect("Cargo.toml missing [package]");

    let name = package_field(pkg, "name", "brand-intake");
    let version = package_field(pkg, "version", "0.0.0");
    let description = package_field(pkg, "description", "");

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let dest = Path::new(&out_dir).join("pkg_info.rs");
    let contents = format!(
        r#"pub const PKG_NAME: &str = "{name}";
pub const PKG_VERSION: &str = "{version}";
pub const PKG_DESCRIPTION: &str = "{description}";
/// Directory name used under the platform data and download folders.
pub const DATA_DIR_NAME: &str = "{name}";
"#
    );
    fs::write(&dest, contents).expect("Failed to write pkg_info.rs");
}
