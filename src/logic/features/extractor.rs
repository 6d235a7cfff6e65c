//! URL Feature Extractor
//!
//! Turns a raw URL string into the fixed-width lexical feature vector the
//! classifier consumes. Extraction is pure and deterministic: no I/O, no
//! normalization (no lowercasing, no percent-decoding), all statistics
//! operate on the string exactly as given.

use super::entropy::entropy;
use super::layout::FEATURE_COUNT;
use super::vector::FeatureVector;
use crate::error::AppError;

/// Structural parts of a URL. Splitting degrades gracefully: a URL without
/// a scheme yields an empty authority and the whole string as path, so
/// every downstream statistic must accept empty strings.
#[derive(Debug, PartialEq)]
struct UrlParts<'a> {
    authority: &'a str,
    path: &'a str,
    query: &'a str,
}

/// Extract the feature vector for `url`.
///
/// Fails on empty input and on authorities with unbalanced IPv6 brackets;
/// everything else decomposes into (possibly empty) parts.
pub fn extract(url: &str) -> Result<FeatureVector, AppError> {
    if url.is_empty() {
        return Err(AppError::MissingUrl);
    }

    let parts = split_url(url)?;
    let domain = parts.authority;

    // Subdomain statistics. The averaging statistic spans every label except
    // the registrable domain (last two labels); the remaining five are
    // computed from the first label only. Both are gated on the authority
    // containing more than one dot.
    let labels: Vec<&str> = domain.split('.').collect();
    let first_label = labels.first().copied().unwrap_or("");
    let domain_dots = count_char(domain, '.');
    let in_subdomain_region = domain_dots > 1;

    let average_subdomain_length = if in_subdomain_region {
        let head = &labels[..labels.len().saturating_sub(2)];
        if head.is_empty() {
            0.0
        } else {
            let total: usize = head.iter().map(|l| l.chars().count()).sum();
            total as f64 / head.len() as f64
        }
    } else {
        0.0
    };
    let gated = |value: f64| if in_subdomain_region { value } else { 0.0 };
    let subdomain_dots = gated(count_char(first_label, '.') as f64);
    let subdomain_hyphens = gated(count_char(first_label, '-') as f64);
    let subdomain_specials = gated(special_count(first_label) as f64);
    let subdomain_digits = gated(digit_count(first_label) as f64);

    let entropy_of_url = entropy(url).unwrap_or(0.0);
    let entropy_of_domain = entropy(domain).unwrap_or(0.0);

    let entries: [(&str, f64); FEATURE_COUNT] = [
        ("url_length", url.chars().count() as f64),
        ("number_of_dots_in_url", count_char(url, '.') as f64),
        ("having_repeated_digits_in_url", flag(has_repeated_digits(url))),
        ("number_of_digits_in_url", digit_count(url) as f64),
        ("number_of_special_char_in_url", special_count(url) as f64),
        ("number_of_hyphens_in_url", count_char(url, '-') as f64),
        ("number_of_underline_in_url", count_char(url, '_') as f64),
        ("number_of_slash_in_url", count_char(url, '/') as f64),
        ("number_of_questionmark_in_url", count_char(url, '?') as f64),
        ("number_of_equal_in_url", count_char(url, '=') as f64),
        ("number_of_at_in_url", count_char(url, '@') as f64),
        ("number_of_dollar_in_url", count_char(url, '$') as f64),
        ("number_of_exclamation_in_url", count_char(url, '!') as f64),
        ("number_of_hashtag_in_url", count_char(url, '#') as f64),
        ("number_of_percent_in_url", count_char(url, '%') as f64),
        ("domain_length", domain.chars().count() as f64),
        ("number_of_dots_in_domain", domain_dots as f64),
        ("number_of_hyphens_in_domain", count_char(domain, '-') as f64),
        (
            "having_special_characters_in_domain",
            // The boolean excludes '.' and '-'; the count below does not.
            flag(domain.chars().any(|c| !c.is_ascii_alphanumeric() && c != '.' && c != '-')),
        ),
        ("number_of_special_characters_in_domain", special_count(domain) as f64),
        ("having_digits_in_domain", flag(digit_count(domain) > 0)),
        ("number_of_digits_in_domain", digit_count(domain) as f64),
        ("having_repeated_digits_in_domain", flag(has_repeated_digits(domain))),
        // Signed on purpose: a dotless authority yields -1, never clamped.
        ("number_of_subdomains", domain_dots as f64 - 1.0),
        ("having_dot_in_subdomain", flag(domain_dots > 1)),
        ("having_hyphen_in_subdomain", flag(first_label.contains('-'))),
        ("average_subdomain_length", average_subdomain_length),
        ("average_number_of_dots_in_subdomain", subdomain_dots),
        ("average_number_of_hyphens_in_subdomain", subdomain_hyphens),
        ("having_special_characters_in_subdomain", flag(subdomain_specials > 0.0)),
        ("number_of_special_characters_in_subdomain", subdomain_specials),
        ("having_digits_in_subdomain", flag(subdomain_digits > 0.0)),
        ("number_of_digits_in_subdomain", subdomain_digits),
        ("having_repeated_digits_in_subdomain", gated(flag(has_repeated_digits(first_label)))),
        ("having_path", flag(!parts.path.is_empty())),
        ("path_length", parts.path.chars().count() as f64),
        ("having_query", flag(!parts.query.is_empty())),
        // Raw-string heuristics: a literal '#' anywhere, and the substring
        // "anchor" anywhere, regardless of what the parser made of them.
        ("having_fragment", flag(url.contains('#'))),
        ("having_anchor", flag(url.contains("anchor"))),
        ("entropy_of_url", entropy_of_url),
        ("entropy_of_domain", entropy_of_domain),
    ];

    FeatureVector::from_entries(&entries)
}

/// Split a URL into authority, path and query without normalizing anything.
///
/// Follows generic URI splitting: an optional `scheme:` prefix, an authority
/// only when the remainder starts with `//`, fragment split before query.
fn split_url(url: &str) -> Result<UrlParts<'_>, AppError> {
    let mut rest = url;

    if let Some(idx) = rest.find(':') {
        if is_scheme(&rest[..idx]) {
            rest = &rest[idx + 1..];
        }
    }

    let authority = if let Some(stripped) = rest.strip_prefix("//") {
        let end = stripped
            .find(|c| matches!(c, '/' | '?' | '#'))
            .unwrap_or(stripped.len());
        let (authority, tail) = stripped.split_at(end);
        rest = tail;
        authority
    } else {
        ""
    };

    if authority.contains('[') != authority.contains(']') {
        return Err(AppError::Parse(format!(
            "unbalanced IPv6 brackets in authority '{authority}'"
        )));
    }

    let before_fragment = match rest.split_once('#') {
        Some((head, _)) => head,
        None => rest,
    };
    let (path, query) = match before_fragment.split_once('?') {
        Some((path, query)) => (path, query),
        None => (before_fragment, ""),
    };

    Ok(UrlParts { authority, path, query })
}

/// `scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn count_char(s: &str, target: char) -> usize {
    s.chars().filter(|&c| c == target).count()
}

fn digit_count(s: &str) -> usize {
    s.chars().filter(char::is_ascii_digit).count()
}

/// Count of characters outside `[a-zA-Z0-9]`.
fn special_count(s: &str) -> usize {
    s.chars().filter(|c| !c.is_ascii_alphanumeric()).count()
}

/// True when the string contains at least three digit characters in any
/// relative order, not necessarily contiguous.
fn has_repeated_digits(s: &str) -> bool {
    digit_count(s) >= 3
}

fn flag(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}
