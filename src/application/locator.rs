//! Finds Reddit links in free text and turns them into item locators.

use regex::Regex;
use std::sync::OnceLock;

use crate::domain::types::ItemLocator;

const URL_PATTERN: &str =
    r"((https://)?((www|old|np|mod)\.)?(reddit|redd)(\.com|\.it)([a-zA-Z0-9/_]+))";

const MODMAIL_PREFIX: &str = "https://mod.reddit.com/mail/";

fn url_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(URL_PATTERN).ok()).as_ref()
}

/// Absolute Reddit URLs in `text`, in order of appearance.
pub fn extract_urls(text: &str) -> Vec<String> {
    let Some(pattern) = url_pattern() else {
        return Vec::new();
    };
    pattern
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|url| url.starts_with("https://"))
        .map(str::to_string)
        .collect()
}

/// Parses one URL. Unknown shapes yield `None`.
pub fn parse_url(url: &str) -> Option<ItemLocator> {
    let segments: Vec<&str> = url
        .trim_start_matches("https://")
        .split('/')
        .skip(1)
        .filter(|s| !s.is_empty())
        .collect();

    if url.starts_with(MODMAIL_PREFIX) {
        // mail/<folder>/<conversation>
        return segments
            .last()
            .filter(|_| segments.len() >= 3)
            .map(|id| ItemLocator::Conversation { id: id.to_string() });
    }

    if url.contains("redd.it/") {
        return segments.first().map(|id| ItemLocator::Submission { id: id.to_string() });
    }

    let comments = segments.iter().position(|s| *s == "comments")?;
    let rest = &segments[comments + 1..];
    match rest {
        [] => None,
        [link] | [link, _] => Some(ItemLocator::Submission { id: link.to_string() }),
        [link, _, id, ..] => Some(ItemLocator::Comment {
            link_id: link.to_string(),
            id: id.to_string(),
        }),
    }
}

/// Locators of every recognised link in `text`.
pub fn find_locators(text: &str) -> Vec<(String, ItemLocator)> {
    extract_urls(text)
        .into_iter()
        .filter_map(|url| parse_url(&url).map(|locator| (url, locator)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_urls() {
        let text = "look at https://www.reddit.com/r/pics/comments/abc/title and reddit.com/r/x \
                    or https://redd.it/xyz";
        assert_eq!(
            extract_urls(text),
            vec![
                "https://www.reddit.com/r/pics/comments/abc/title".to_string(),
                "https://redd.it/xyz".to_string(),
            ]
        );
        assert!(extract_urls("nothing here").is_empty());
    }

    #[test]
    fn test_parse_url() {
        assert_eq!(
            parse_url("https://www.reddit.com/r/pics/comments/abc"),
            Some(ItemLocator::Submission { id: "abc".to_string() })
        );
        assert_eq!(
            parse_url("https://old.reddit.com/r/pics/comments/abc/some_title/"),
            Some(ItemLocator::Submission { id: "abc".to_string() })
        );
        assert_eq!(
            parse_url("https://www.reddit.com/r/pics/comments/abc/_/c1"),
            Some(ItemLocator::Comment {
                link_id: "abc".to_string(),
                id: "c1".to_string()
            })
        );
        assert_eq!(
            parse_url("https://mod.reddit.com/mail/all/conv1"),
            Some(ItemLocator::Conversation { id: "conv1".to_string() })
        );
        assert_eq!(
            parse_url("https://redd.it/xyz"),
            Some(ItemLocator::Submission { id: "xyz".to_string() })
        );
        assert_eq!(parse_url("https://www.reddit.com/r/pics"), None);
        assert_eq!(parse_url("https://mod.reddit.com/mail/all"), None);
    }

    #[test]
    fn test_find_locators_skips_unknown() {
        let found = find_locators(
            "https://www.reddit.com/r/pics https://www.reddit.com/r/pics/comments/abc",
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, ItemLocator::Submission { id: "abc".to_string() });
    }
}
