use url::Url;

/// Builds the URL of listing page `page` for a category seed
///
/// The page parameter is appended as `&page=n` when the seed already carries a
/// query string, otherwise as `?page=n`. Existing parameters are kept as they
/// are, including an existing `page` parameter.
///
/// # Examples
///
/// ```
/// use catalog_trawler::url::page_url;
/// use url::Url;
///
/// let seed = Url::parse("https://example.com/en/used-cars/kia").unwrap();
/// assert_eq!(page_url(&seed, 2).as_str(), "https://example.com/en/used-cars/kia?page=2");
///
/// let seed = Url::parse("https://example.com/search?make=kia").unwrap();
/// assert_eq!(page_url(&seed, 3).as_str(), "https://example.com/search?make=kia&page=3");
/// ```
pub fn page_url(seed: &Url, page: u32) -> Url {
    let mut url = seed.clone();
    let query = match seed.query() {
        Some(existing) if !existing.is_empty() => format!("{}&page={}", existing, page),
        _ => format!("page={}", page),
    };
    url.set_query(Some(&query));
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_page_without_query() {
        let url = page_url(&seed("https://example.com/en/used-cars/audi"), 1);
        assert_eq!(url.as_str(), "https://example.com/en/used-cars/audi?page=1");
    }

    #[test]
    fn test_page_with_query() {
        let url = page_url(&seed("https://example.com/search?brand=audi"), 4);
        assert_eq!(url.as_str(), "https://example.com/search?brand=audi&page=4");
    }

    #[test]
    fn test_page_with_empty_query() {
        let url = page_url(&seed("https://example.com/audi?"), 2);
        assert_eq!(url.as_str(), "https://example.com/audi?page=2");
    }

    #[test]
    fn test_fragment_kept_out_of_query() {
        let url = page_url(&seed("https://example.com/audi#top"), 2);
        assert_eq!(url.query(), Some("page=2"));
    }

    #[test]
    fn test_seed_not_modified() {
        let original = seed("https://example.com/audi");
        let _ = page_url(&original, 9);
        assert_eq!(original.query(), None);
    }
}
