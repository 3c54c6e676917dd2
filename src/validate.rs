//! Field-format checks shared by the route modules.

/// Loose email shape check: something before and after an `@`, a dot in the
/// domain, no whitespace.
pub fn email_ok(s: &str) -> bool {
    if s.len() > 254 || s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Phone numbers: 9 to 15 characters out of `+ 0-9 space - ( )`, at least
/// one digit.
pub fn phone_ok(s: &str) -> bool {
    (9..=15).contains(&s.len())
        && s.chars().any(|c| c.is_ascii_digit())
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'))
}

/// Rates carry the display format `€<digits>/h`, e.g. `€150/h`.
pub fn rate_ok(s: &str) -> bool {
    s.strip_prefix('€')
        .and_then(|rest| rest.strip_suffix("/h"))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// `HH:MM`, 24-hour clock.
pub fn clock_time_ok(s: &str) -> bool {
    let Some((h, m)) = s.split_once(':') else {
        return false;
    };
    let hours: Option<u8> = h.parse().ok().filter(|_| (1..=2).contains(&h.len()));
    let minutes: Option<u8> = m.parse().ok().filter(|_| m.len() == 2);
    matches!((hours, minutes), (Some(h), Some(m)) if h < 24 && m < 60)
}
