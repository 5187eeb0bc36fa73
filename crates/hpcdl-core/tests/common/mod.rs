//! Shared helpers: a scriptable fake transfer tool standing in for curl.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use hpcdl_core::config::HpcConfig;

/// Writes an executable shell script into `dir` and returns its path.
pub fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-transfer.sh");
    fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// Standard fake transfer tool. Appends each invocation's URL to `log`,
/// then keys its behavior off the URL: `*fail*` exits 22, `*empty*`
/// reports success but leaves a zero-byte file, anything else writes a
/// 2 MiB payload and exits 0. Argument layout matches the real tool:
/// the output path follows `-o`, the URL is the last argument.
pub fn fake_transfer(dir: &Path, log: &Path) -> PathBuf {
    let body = format!(
        r#"out=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then out="$a"; fi
  prev="$a"
done
url="$a"
echo "$url" >> "{log}"
case "$url" in
  *fail*) exit 22 ;;
  *empty*) : > "$out"; exit 0 ;;
  *) head -c 2097152 /dev/zero > "$out"; exit 0 ;;
esac
"#,
        log = log.display()
    );
    write_script(dir, &body)
}

/// Fake transfer tool that records how many invocations are in flight
/// while it sleeps, for asserting the worker-pool bound.
pub fn counting_transfer(dir: &Path, active_dir: &Path, counts: &Path) -> PathBuf {
    let body = format!(
        r#"mkdir -p "{active}"
touch "{active}/$$"
sleep 1
ls "{active}" | wc -l >> "{counts}"
out=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then out="$a"; fi
  prev="$a"
done
rm -f "{active}/$$"
head -c 2097152 /dev/zero > "$out"
exit 0
"#,
        active = active_dir.display(),
        counts = counts.display()
    );
    write_script(dir, &body)
}

/// URLs recorded by the fake tool, one per invocation, in invocation order.
pub fn invocations(log: &Path) -> Vec<String> {
    fs::read_to_string(log)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Config pointed at tempdirs and the fake tool, with zero backoff so
/// retry-heavy scenarios finish quickly.
pub fn test_config(download_dir: &Path, script: &Path) -> HpcConfig {
    let mut cfg = HpcConfig::default();
    cfg.download_dir = download_dir.to_path_buf();
    cfg.transfer_command = script.display().to_string();
    cfg.max_concurrent_downloads = 3;
    cfg.retry_workers = 2;
    cfg.downloader_max_retries = 1;
    cfg.downloader_initial_retry_delay_seconds = 0;
    cfg.downloader_aggressive_max_retries = 2;
    cfg.downloader_aggressive_initial_retry_delay_seconds = 0;
    cfg
}

pub fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|u| u.to_string()).collect()
}
