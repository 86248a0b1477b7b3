//! Reference-label parsing.
//!
//! Labels like `RM1`, `RM1check`, `RM2 cone` carry a sequence number and a
//! role in free text. The rules here are deliberate, exact string scans
//! (lower-casing, keyword stripping, last-digit-run extraction, role-token
//! search) rather than a regex dependency, so the accepted grammar is
//! visible in one place.

use rmdrift_model::{RmInfo, RmRole};

/// True when the label begins with the keyword, ignoring ASCII case.
///
/// This is the classification filter: every such row is treated as a
/// reference-material reading.
pub fn is_reference_label(label: &str, keyword: &str) -> bool {
    label
        .get(..keyword.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(keyword))
}

/// True when the label is exactly the keyword plus an optional digit run
/// (`RM`, `RM7`). Case-sensitive: this is the exclusion applied during
/// drift application, where `rm1` (wrong case) is still an ordinary row.
pub fn is_bare_reference_label(label: &str, keyword: &str) -> bool {
    match label.strip_prefix(keyword) {
        Some(rest) => rest.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

/// Parse a reference label into `(sequence number, role)`.
///
/// Procedure: lower-case, strip a leading keyword plus optional `-`/`_`/
/// whitespace separator, look for a role token (`chek`/`check` -> Check,
/// `cone` -> Cone) anywhere in the remainder, then take the last digit run
/// before the role token (or in the whole remainder when no role token is
/// present) as the sequence number, defaulting to 0.
///
/// `RM1` -> (1, Base); `RM1check` -> (1, Check); `RM2 cone` -> (2, Cone);
/// `RMcheck` -> (0, Check); `RM` -> (0, Base).
pub fn extract_rm_info(label: &str, keyword: &str) -> RmInfo {
    let lowered = label.trim().to_lowercase();
    let keyword_lowered = keyword.to_lowercase();
    let cleaned = match lowered.strip_prefix(&keyword_lowered) {
        Some(rest) => strip_separator(rest),
        None => lowered.as_str(),
    };

    let (role, search_region) = match find_role_token(cleaned) {
        Some((start, role)) => (role, &cleaned[..start]),
        None => (RmRole::Base, cleaned),
    };

    RmInfo {
        number: last_digit_run(search_region).unwrap_or(0),
        role,
    }
}

/// Drop leading whitespace, one optional `-`/`_`, and more whitespace.
fn strip_separator(rest: &str) -> &str {
    let rest = rest.trim_start();
    let rest = rest.strip_prefix(['-', '_']).unwrap_or(rest);
    rest.trim_start()
}

/// Earliest role token in the (already lowered) remainder, with its byte
/// offset. Tokens may be glued directly to digits or other text.
fn find_role_token(cleaned: &str) -> Option<(usize, RmRole)> {
    for (idx, _) in cleaned.char_indices() {
        let rest = &cleaned[idx..];
        if rest.starts_with("chek") || rest.starts_with("check") {
            return Some((idx, RmRole::Check));
        }
        if rest.starts_with("cone") {
            return Some((idx, RmRole::Cone));
        }
    }
    None
}

/// The last contiguous digit run in the region, as a number.
fn last_digit_run(region: &str) -> Option<u32> {
    let mut last: Option<u32> = None;
    let mut current: Option<u32> = None;
    for ch in region.chars() {
        if let Some(digit) = ch.to_digit(10) {
            let acc = current.unwrap_or(0);
            current = Some(acc.saturating_mul(10).saturating_add(digit));
        } else if current.is_some() {
            last = current.take();
        }
    }
    current.or(last)
}

/// Normalize a sample label that begins with the keyword (case-sensitive).
///
/// `keyword`, an optional `-`/whitespace separator, a number-or-word
/// token, and an optional trailing repeat of the keyword collapse to
/// `keyword + token` (`"RM - 1"` -> `"RM1"`, `"RM2 RM extra"` -> `"RM2"`).
/// Labels that do not fit the shape are returned unchanged.
pub fn clean_reference_label(label: &str, keyword: &str) -> String {
    let Some(rest) = label.strip_prefix(keyword) else {
        return label.to_string();
    };
    let body = skip_cleanup_separator(rest);
    // Token alternatives in match-priority order: digit run, then word run
    // (with optional closing parenthesis), then no token at all.
    for token in [digit_token(body), word_token(body), Some("")] {
        let Some(token) = token else { continue };
        let tail = &body[token.len()..];
        if cleanup_tail_ok(tail, keyword) {
            return format!("{keyword}{token}");
        }
    }
    label.to_string()
}

fn skip_cleanup_separator(rest: &str) -> &str {
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('-').unwrap_or(rest);
    rest.trim_start()
}

fn digit_token(body: &str) -> Option<&str> {
    let end = body
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(body.len(), |(idx, _)| idx);
    if end == 0 { None } else { Some(&body[..end]) }
}

fn word_token(body: &str) -> Option<&str> {
    let mut end = body
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
        .map_or(body.len(), |(idx, _)| idx);
    if end == 0 {
        return None;
    }
    if body[end..].starts_with(')') {
        end += 1;
    }
    Some(&body[..end])
}

/// The cleanup only fires when nothing follows the token, or what follows
/// is whitespace plus a repeat of the keyword.
fn cleanup_tail_ok(tail: &str, keyword: &str) -> bool {
    let trimmed = tail.trim_start();
    trimmed.is_empty() || trimmed.starts_with(keyword)
}
