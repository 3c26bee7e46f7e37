//! Indonesian WhatsApp number normalisation.
//!
//! Contact numbers are entered by customers and admins in whatever format they
//! are used to: `0812-3456-7890`, `+62 812…`, bare `812…`. Storage and the
//! `wa.me` deep link both require the canonical international form — digits
//! only, starting with `62` — while tables and forms need the display and
//! local forms derived from it.
//!
//! All functions are total over arbitrary strings and idempotent: feeding a
//! canonical number back through [`normalize_whatsapp`] returns it unchanged.

/// Country calling code prefix used for canonical numbers.
const COUNTRY_PREFIX: &str = "62";

/// Converts a raw phone number input into canonical `62…` form.
///
/// The input is reduced to its digits, then:
/// - empty input stays empty,
/// - a leading `62` is kept as-is,
/// - a leading `0` (local trunk prefix) is replaced by `62`,
/// - anything else gets `62` prepended.
///
/// # Examples
///
/// ```
/// use kedai_rules::phone::normalize_whatsapp;
///
/// assert_eq!(normalize_whatsapp("0812-3456-7890"), "6281234567890");
/// assert_eq!(normalize_whatsapp("+62 812 3456 7890"), "6281234567890");
/// assert_eq!(normalize_whatsapp(""), "");
/// ```
pub fn normalize_whatsapp(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return digits;
    }

    if digits.starts_with(COUNTRY_PREFIX) {
        digits
    } else if let Some(rest) = digits.strip_prefix('0') {
        format!("{COUNTRY_PREFIX}{rest}")
    } else {
        format!("{COUNTRY_PREFIX}{digits}")
    }
}

/// Formats a raw phone number for table/detail display.
///
/// Empty input renders as `"-"`. Otherwise the canonical form is split after
/// the `62` prefix and the remaining digits are grouped in chunks of four from
/// the left, joined with `-` and prefixed with `"+62 "`.
///
/// # Examples
///
/// ```
/// use kedai_rules::phone::format_whatsapp_display;
///
/// assert_eq!(format_whatsapp_display("081234567890"), "+62 8123-4567-890");
/// assert_eq!(format_whatsapp_display(""), "-");
/// ```
pub fn format_whatsapp_display(raw: &str) -> String {
    let canonical = normalize_whatsapp(raw);
    if canonical.is_empty() {
        return "-".to_string();
    }

    let rest = canonical
        .strip_prefix(COUNTRY_PREFIX)
        .unwrap_or(&canonical);
    if rest.is_empty() {
        return "+62".to_string();
    }

    let chunks: Vec<String> = rest
        .as_bytes()
        .chunks(4)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect();

    format!("+62 {}", chunks.join("-"))
}

/// Converts a raw phone number into the local `0…` form.
///
/// Used only to pre-fill editable form fields; the canonical `62…` form is
/// what gets persisted.
pub fn to_local_whatsapp(raw: &str) -> String {
    let canonical = normalize_whatsapp(raw);
    if canonical.is_empty() {
        return canonical;
    }

    match canonical.strip_prefix(COUNTRY_PREFIX) {
        Some(rest) => format!("0{rest}"),
        None => canonical,
    }
}

/// Builds a `wa.me` deep link for a raw phone number.
///
/// Returns `None` when the input contains no digits at all, so callers can
/// skip rendering the link rather than producing a dead one.
pub fn wa_link(raw: &str) -> Option<String> {
    let canonical = normalize_whatsapp(raw);
    if canonical.is_empty() {
        return None;
    }
    Some(format!("https://wa.me/{canonical}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_empty_input() {
        assert_eq!(normalize_whatsapp(""), "");
        assert_eq!(normalize_whatsapp("   "), "");
        assert_eq!(normalize_whatsapp("abc-+()"), "");
    }

    #[test]
    fn normalize_local_prefix() {
        assert_eq!(normalize_whatsapp("081234567890"), "6281234567890");
        assert_eq!(normalize_whatsapp("0812-3456-7890"), "6281234567890");
    }

    #[test]
    fn normalize_already_international() {
        assert_eq!(normalize_whatsapp("+6281234567890"), "6281234567890");
        assert_eq!(normalize_whatsapp("6281234567890"), "6281234567890");
        assert_eq!(normalize_whatsapp("+62 812 3456 7890"), "6281234567890");
    }

    #[test]
    fn normalize_bare_subscriber_number() {
        assert_eq!(normalize_whatsapp("81234567890"), "6281234567890");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in [
            "",
            "081234567890",
            "+6281234567890",
            "81234567890",
            "0812-3456-7890",
            "no digits here",
            "620",
            "0",
        ] {
            let once = normalize_whatsapp(raw);
            assert_eq!(normalize_whatsapp(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn normalize_output_shape() {
        for raw in ["0812 abc 345", "+62(812)345", "99", "62"] {
            let canonical = normalize_whatsapp(raw);
            assert!(canonical.is_empty() || canonical.starts_with("62"));
            assert!(canonical.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn display_groups_in_fours() {
        assert_eq!(format_whatsapp_display("081234567890"), "+62 8123-4567-890");
        assert_eq!(format_whatsapp_display("6281234567890"), "+62 8123-4567-890");
    }

    #[test]
    fn display_degenerate_inputs() {
        assert_eq!(format_whatsapp_display(""), "-");
        assert_eq!(format_whatsapp_display("no digits"), "-");
        // Only the country code left after normalisation.
        assert_eq!(format_whatsapp_display("62"), "+62");
    }

    #[test]
    fn local_form_roundtrip() {
        assert_eq!(to_local_whatsapp("6281234567890"), "081234567890");
        assert_eq!(to_local_whatsapp("081234567890"), "081234567890");
        assert_eq!(to_local_whatsapp(""), "");
    }

    #[test]
    fn wa_link_from_formatted_input() {
        assert_eq!(
            wa_link("0812-3456-7890").as_deref(),
            Some("https://wa.me/6281234567890")
        );
        assert_eq!(wa_link("  "), None);
    }
}
