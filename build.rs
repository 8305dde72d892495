use std::env;
use std::fs;
use std::path::Path;

/// Claves que lee `ScannerConfig::from_env()` con `option_env!`
const FORWARDED_KEYS: &[&str] = &[
    "VALIDATION_URL",
    "REQUEST_TIMEOUT_MS",
    "SCANNER_FPS",
    "SCANNER_QRBOX",
    "SCANNER_CONTAINER_ID",
    "ENABLE_LOGGING",
];

fn main() {
    for key in FORWARDED_KEYS {
        println!("cargo:rerun-if-env-changed={}", key);
    }
    println!("cargo:rerun-if-changed=build.rs");

    let env_file = Path::new(".env");
    if !env_file.exists() {
        return;
    }
    println!("cargo:rerun-if-changed=.env");

    let Ok(contents) = fs::read_to_string(env_file) else {
        println!("cargo:warning=.env existe pero no se pudo leer, usando defaults");
        return;
    };

    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_matches('"');

        // La variable del shell tiene prioridad sobre .env
        if FORWARDED_KEYS.contains(&key) && env::var(key).is_err() {
            println!("cargo:rustc-env={}={}", key, value);
        }
    }
}
