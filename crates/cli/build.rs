use std::env;
use std::process::Command;

/// Run git in the workspace and return trimmed stdout on success.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}

fn main() {
    for path in ["../../.git/HEAD", "../../.git/refs/heads", "../../.git/index"] {
        println!("cargo:rerun-if-changed={path}");
    }

    // `abc1234` or `abc1234-dirty`; `unknown` outside a checkout.
    let describe = git(&["describe", "--always", "--dirty", "--abbrev=7"])
        .unwrap_or_else(|| String::from("unknown"));
    println!("cargo:rustc-env=CLUSTERCMP_GIT_DESCRIBE={describe}");

    for (key, var) in [("CLUSTERCMP_TARGET", "TARGET"), ("CLUSTERCMP_PROFILE", "PROFILE")] {
        let value = env::var(var).unwrap_or_else(|_| String::from("unknown"));
        println!("cargo:rustc-env={key}={value}");
    }
}
