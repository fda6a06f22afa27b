use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn ragfb_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("ragfb");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[vectorstore]
dir = "{}/embeddings"

[seed]
pdf_dir = "{}/data/best_practices"
websites = []

[server]
bind = "127.0.0.1:0"
"#,
        root.display(),
        root.display()
    );

    let config_path = config_dir.join("ragfb.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_ragfb(root: &Path, config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = ragfb_binary();
    let output = Command::new(&binary)
        .current_dir(root)
        .env_remove("GEMINI_API_KEY")
        .env_remove("VECTORSTORE_DIR")
        .env_remove("GEMINI_API_BASE")
        .env("RUST_LOG", "warn")
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run ragfb binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_init_creates_vector_store() {
    let (tmp, config_path) = setup_test_env();
    let (stdout, stderr, success) = run_ragfb(tmp.path(), &config_path, &["init"]);
    assert!(success, "init failed: {}", stderr);
    assert!(stdout.contains("Vector store initialized"));
    assert!(stdout.contains("(0 chunks)"));
    assert!(tmp.path().join("embeddings").join("index.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (tmp, config_path) = setup_test_env();
    let (_, _, first) = run_ragfb(tmp.path(), &config_path, &["init"]);
    let (stdout, stderr, second) = run_ragfb(tmp.path(), &config_path, &["init"]);
    assert!(first);
    assert!(second, "second init failed: {}", stderr);
    assert!(stdout.contains("(0 chunks)"));
}

#[test]
fn test_search_on_empty_index() {
    let (tmp, config_path) = setup_test_env();
    let (stdout, stderr, success) = run_ragfb(tmp.path(), &config_path, &["search", "python"]);
    assert!(success, "search failed: {}", stderr);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_seed_requires_api_key() {
    let (tmp, config_path) = setup_test_env();
    let (_, stderr, success) = run_ragfb(tmp.path(), &config_path, &["seed"]);
    assert!(!success);
    assert!(stderr.contains("GEMINI_API_KEY"), "stderr: {}", stderr);
}

#[test]
fn test_add_webpage_unreachable_fails_without_writing() {
    let (tmp, config_path) = setup_test_env();
    let (_, stderr, success) = run_ragfb(
        tmp.path(),
        &config_path,
        &["add-webpage", "http://127.0.0.1:1/guide", "--language", "go"],
    );
    assert!(!success);
    assert!(stderr.contains("failed to fetch"), "stderr: {}", stderr);

    let (stdout, _, _) = run_ragfb(tmp.path(), &config_path, &["init"]);
    assert!(stdout.contains("(0 chunks)"));
}

#[test]
fn test_invalid_chunking_config_is_rejected() {
    let (tmp, config_path) = setup_test_env();
    let mut content = fs::read_to_string(&config_path).unwrap();
    content.push_str("\n[chunking]\nchunk_size = 100\nchunk_overlap = 100\n");
    fs::write(&config_path, content).unwrap();

    let (_, stderr, success) = run_ragfb(tmp.path(), &config_path, &["init"]);
    assert!(!success);
    assert!(stderr.contains("chunk_overlap"), "stderr: {}", stderr);
}

#[test]
fn test_missing_config_file_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("config").join("absent.toml");
    let (stdout, stderr, success) = run_ragfb(tmp.path(), &missing, &["init"]);
    assert!(success, "init failed: {}", stderr);
    assert!(stdout.contains("(0 chunks)"));
    assert!(tmp.path().join("embeddings").join("index.sqlite").exists());
}
