use rand::Rng;
use url::Url;

/// Length of every generated short code.
pub const CODE_LEN: usize = 6;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Prefix `http://` unless the input already starts with `scheme://`.
///
/// Never fails. The result may still be unparseable; callers validate it with
/// [`is_valid_url`].
pub fn normalize(url: &str) -> String {
    let url = url.trim();
    if has_scheme(url) {
        url.to_owned()
    } else {
        format!("http://{url}")
    }
}

/// `true` if the string parses as an absolute URL.
///
/// Control characters are rejected outright: the parser silently drops tabs
/// and newlines, so the stored string would differ from what was checked.
pub fn is_valid_url(url: &str) -> bool {
    !url.chars().any(|c| c.is_control()) && Url::parse(url).is_ok()
}

/// `true` for absolute `http`/`https` URLs, the only ones safe to link to or
/// redirect to.
pub fn is_web_url(url: &str) -> bool {
    is_valid_url(url)
        && Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// Random 6-character code over `[A-Za-z0-9]`, no uniqueness check.
pub fn generate_short_code() -> String {
    generate_short_code_with(&mut rand::thread_rng())
}

pub fn generate_short_code_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

fn has_scheme(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn alphabet_has_62_unique_symbols() {
        let unique: HashSet<_> = ALPHABET.iter().collect();
        assert_eq!(ALPHABET.len(), 62);
        assert_eq!(unique.len(), 62);
    }

    #[test]
    fn normalize_prepends_http_when_scheme_missing() {
        assert_eq!(normalize("github.com"), "http://github.com");
        assert_eq!(normalize("  example.com/a?b=1 "), "http://example.com/a?b=1");
    }

    #[test]
    fn normalize_keeps_existing_scheme() {
        assert_eq!(
            normalize("https://openai.com/very/long/path?x=1"),
            "https://openai.com/very/long/path?x=1"
        );
        assert_eq!(normalize("ftp://files.example.org"), "ftp://files.example.org");
        assert_eq!(normalize("git+ssh://host/repo"), "git+ssh://host/repo");
    }

    #[test]
    fn normalize_does_not_treat_embedded_separator_as_scheme() {
        assert_eq!(
            normalize("example.com/redirect?to=https://x.org"),
            "http://example.com/redirect?to=https://x.org"
        );
        assert_eq!(normalize("1ab://host"), "http://1ab://host");
    }

    #[test]
    fn validity_requires_absolute_url() {
        assert!(!is_valid_url("example.com"));
        assert!(is_valid_url(&normalize("example.com")));
        assert!(!is_valid_url(""));
        assert!(!is_valid_url(&normalize("http://exa mple.com")));
    }

    #[test]
    fn validity_rejects_control_characters() {
        assert!(!is_valid_url("http://example.com/a\nb"));
        assert!(!is_valid_url("http://example.com/\ta"));
        assert!(!is_valid_url(&normalize("example.com/a\rb")));
        assert!(!is_valid_url("http://example.com/a\u{7f}b"));
    }

    #[test]
    fn only_http_and_https_are_web_urls() {
        assert!(is_web_url("http://github.com"));
        assert!(is_web_url("https://openai.com/very/long/path?x=1"));
        assert!(!is_web_url("javascript://%0aalert(document.cookie)"));
        assert!(!is_web_url("ftp://files.example.org"));
        assert!(!is_web_url("http://example.com/a\nb"));
    }

    #[test]
    fn generated_codes_are_six_alphanumerics() {
        for _ in 0..500 {
            let code = generate_short_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = generate_short_code_with(&mut StdRng::seed_from_u64(7));
        let b = generate_short_code_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }
}
