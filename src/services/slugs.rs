/// Derives a URL-safe slug from a display name: lowercased ASCII
/// alphanumerics, everything else collapsed into single hyphens.
pub(crate) fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Acme Corp"), "acme-corp");
    }

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(slugify("Devworks & Co.  Ltd"), "devworks-co-ltd");
    }

    #[test]
    fn trims_leading_and_trailing_separators() {
        assert_eq!(slugify("  --Acme--  "), "acme");
    }

    #[test]
    fn drops_non_ascii() {
        assert_eq!(slugify("Café 24/7"), "caf-24-7");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(slugify("!!!"), "");
    }
}
