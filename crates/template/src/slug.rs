/// Turn arbitrary text into a URL slug: lowercase, runs of
/// non-alphanumeric characters become a single hyphen, ends trimmed.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn collapses_symbol_runs() {
        assert_eq!(slugify("Ada -- Lovelace!!"), "ada-lovelace");
    }

    #[test]
    fn trims_edge_hyphens() {
        assert_eq!(slugify("  --Launch Day--  "), "launch-day");
    }

    #[test]
    fn empty_and_symbol_only_inputs() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(slugify("Q3 2025 Report"), "q3-2025-report");
    }
}
