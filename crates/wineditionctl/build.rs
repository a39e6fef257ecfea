// Build script for wineditionctl - embeds version at compile time

fn main() {
    let version = std::env::var("WINEDITION_VERSION")
        .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=WINEDITION_VERSION={}", version);

    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=WINEDITION_VERSION");
}
