use std::{env, process::Command};

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");

    let fallback = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "unknown".to_string());
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty=-modified", "--tags"])
        .output();
    let version = match output {
        Ok(out) if out.status.success() => {
            String::from_utf8_lossy(&out.stdout).trim().to_string()
        }
        Ok(out) => {
            println!(
                "cargo:warning=git describe failed, using {fallback}: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            );
            fallback
        }
        Err(e) => {
            println!("cargo:warning=failed to run git, using {fallback}: {e}");
            fallback
        }
    };
    println!("cargo:rustc-env=APP_VERSION={version}");
}
