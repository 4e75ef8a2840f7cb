use std::sync::LazyLock;

use regex::Regex;

static VALID_PDF_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+\.pdf$").expect("filename regex is valid")
});

/// Final path segment of a URL, used as the on-disk name when it is safe.
pub fn candidate_filename(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Letters, digits, `_` and `-` followed by a lowercase `.pdf`.
pub fn is_valid_pdf_filename(name: &str) -> bool {
    VALID_PDF_FILENAME.is_match(name)
}

/// Hands out on-disk filenames for one materializer run.
///
/// Names that fail validation are replaced by `tmp_fn_<N>.pdf`, where `N`
/// counts up from zero for the lifetime of the allocator.
#[derive(Debug, Default)]
pub struct FilenameAllocator {
    next_placeholder: usize,
}

impl FilenameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, candidate: &str) -> String {
        if is_valid_pdf_filename(candidate) {
            return candidate.to_string();
        }
        let name = format!("tmp_fn_{}.pdf", self.next_placeholder);
        self.next_placeholder += 1;
        name
    }

    pub fn placeholders_issued(&self) -> usize {
        self.next_placeholder
    }
}
