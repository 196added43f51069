use std::env;
use std::fs;
use std::path::Path;

/// Кладёт config.toml из корня workspace рядом с собранным бинарником
fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");

    let Ok(out_dir) = env::var("OUT_DIR") else {
        return;
    };
    let Ok(profile) = env::var("PROFILE") else {
        return;
    };

    // OUT_DIR: target/<profile>/build/backend-xxx/out
    let Some(target_dir) = Path::new(&out_dir)
        .ancestors()
        .find(|p| p.ends_with(&profile))
    else {
        println!("cargo:warning=target profile directory not found, config.toml not copied");
        return;
    };

    let source_config = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config.toml");
    if !source_config.exists() {
        println!("cargo:warning=config.toml not found, the embedded default will be used");
        return;
    }

    if let Err(e) = fs::copy(&source_config, target_dir.join("config.toml")) {
        println!("cargo:warning=failed to copy config.toml: {}", e);
    }
}
