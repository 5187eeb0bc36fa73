//! Target filename derivation from URLs.
//!
//! The mapping must be deterministic for a given links file so a re-run
//! resolves each URL to the same payload path and state marker.

/// Derives the local filename for a URL.
///
/// Uses the last segment of the URL path. URLs without a usable path
/// segment fall back to `file_<index>.download`, where the index is the
/// URL's position in the original links list; a URL that is not in the
/// list at all (should not happen) gets a timestamp-based name.
///
/// Two distinct URLs can collide under the index fallback if the list
/// contains duplicates; that is accepted, the marker then serves both.
pub fn target_filename(url: &str, original_links: &[String]) -> String {
    if let Some(name) = filename_from_url_path(url) {
        return name;
    }
    match original_links.iter().position(|l| l == url) {
        Some(idx) => format!("file_{idx}.download"),
        None => format!("file_unknown_{}.download", chrono::Utc::now().timestamp()),
    }
}

/// Extracts the final path segment from a URL, or `None` if the URL cannot
/// be parsed or the path ends in a slash (directory-style URLs carry no
/// filename and must use the fallback).
fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().rsplit('/').next()?;
    if segment.is_empty() || segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn filename_from_path_segment() {
        let l = links(&["https://example.com/data/genome.fa.gz"]);
        assert_eq!(target_filename(&l[0], &l), "genome.fa.gz");
    }

    #[test]
    fn query_string_is_ignored() {
        let l = links(&["https://example.com/reads.bam?token=abc"]);
        assert_eq!(target_filename(&l[0], &l), "reads.bam");
    }

    #[test]
    fn root_path_falls_back_to_index() {
        let l = links(&[
            "https://example.com/data/a.bin",
            "https://example.com/",
        ]);
        assert_eq!(target_filename(&l[1], &l), "file_1.download");
    }

    #[test]
    fn trailing_slash_means_no_filename() {
        // https://host/data/ names a directory, not a file called "data".
        let l = links(&[
            "https://example.com/data/",
            "https://example.com/data/a.bin",
        ]);
        assert_eq!(target_filename(&l[0], &l), "file_0.download");
        assert_eq!(target_filename(&l[1], &l), "a.bin");
    }

    #[test]
    fn index_fallback_is_deterministic_across_calls() {
        let l = links(&["https://one.example/", "https://two.example/"]);
        assert_eq!(target_filename(&l[0], &l), target_filename(&l[0], &l));
        assert_eq!(target_filename(&l[0], &l), "file_0.download");
        assert_eq!(target_filename(&l[1], &l), "file_1.download");
    }

    #[test]
    fn unknown_url_gets_timestamp_name() {
        let l = links(&["https://example.com/a.bin"]);
        let name = target_filename("https://other.example/", &l);
        assert!(name.starts_with("file_unknown_"));
        assert!(name.ends_with(".download"));
    }
}
