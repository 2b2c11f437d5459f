use std::fs;
use std::path::{Path, PathBuf};

const ALLOWED_HTTP_CLIENT_OWNERS: &[&str] = &["src/transport.rs"];

fn collect_rust_files(root: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rust_files(&path, out);
            continue;
        }
        if path.extension().and_then(|s| s.to_str()) == Some("rs") {
            out.push(path);
        }
    }
}

#[test]
fn outbound_http_goes_through_the_transport_seam() {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let src_root = repo_root.join("src");
    let mut files = Vec::new();
    collect_rust_files(&src_root, &mut files);
    assert!(!files.is_empty(), "no sources found under {}", src_root.display());

    let mut offenders = Vec::new();
    for file in files {
        let rel = file
            .strip_prefix(repo_root)
            .unwrap_or(&file)
            .to_string_lossy()
            .replace('\\', "/");
        if ALLOWED_HTTP_CLIENT_OWNERS
            .iter()
            .any(|allowed| *allowed == rel)
        {
            continue;
        }
        let content = fs::read_to_string(&file).unwrap_or_default();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            let builds_client = trimmed.contains("reqwest::Client")
                || trimmed.contains("reqwest::get(")
                || trimmed.contains("Client::builder()");
            if builds_client {
                offenders.push(format!("{rel}:{}: {}", idx + 1, trimmed));
            }
        }
    }

    assert!(
        offenders.is_empty(),
        "HTTP client used outside the transport module:\n{}",
        offenders.join("\n")
    );
}
