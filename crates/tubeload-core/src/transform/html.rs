use quick_xml::escape::resolve_html5_entity;

use crate::records::Comment;

/// Longest named reference in the HTML5 table is `&CounterClockwiseContourIntegral;`.
const MAX_ENTITY_LEN: usize = 32;

/// Decode HTML character references (`&amp;`, `&eacute;`, `&#39;`, `&#x1F600;`).
///
/// Named references resolve against the full HTML5 entity table. A reference
/// that is unknown, unterminated, or has malformed digits is kept verbatim,
/// so text without valid references comes back unchanged.
#[must_use]
pub fn unescape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp + 1..];

        let decoded = candidate
            .find(';')
            .filter(|&semi| semi > 0 && semi <= MAX_ENTITY_LEN)
            .and_then(|semi| decode_reference(&candidate[..semi]).map(|text| (semi, text)));

        match decoded {
            Some((semi, text)) => {
                out.push_str(&text);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = candidate;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Unescape `text_display` on every comment in place.
pub fn unescape_comment_text(comments: &mut [Comment]) {
    for comment in comments {
        if comment.text_display.contains('&') {
            comment.text_display = unescape_html(&comment.text_display);
        }
    }
}

fn decode_reference(name: &str) -> Option<String> {
    if let Some(numeric) = name.strip_prefix('#') {
        let code = if let Some(hex) = numeric
            .strip_prefix('x')
            .or_else(|| numeric.strip_prefix('X'))
        {
            parse_saturating(hex, 16)?
        } else {
            parse_saturating(numeric, 10)?
        };
        return decode_code_point(code).map(String::from);
    }

    if !name.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    resolve_html5_entity(name).map(str::to_string)
}

/// Parse the digits of a numeric reference, clamping anything too large to
/// `u32::MAX` so it still maps to U+FFFD.
fn parse_saturating(digits: &str, radix: u32) -> Option<u32> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0u32, |acc, c| {
        let digit = c.to_digit(radix)?;
        Some(acc.saturating_mul(radix).saturating_add(digit))
    })
}

/// Map a numeric reference to a character the way browsers do: NUL and
/// out-of-range values become U+FFFD, and the C1 range is read as Windows-1252.
fn decode_code_point(code: u32) -> Option<char> {
    const WINDOWS_1252: [u32; 32] = [
        0x20AC, 0x81, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, 0x02C6, 0x2030, 0x0160,
        0x2039, 0x0152, 0x8D, 0x017D, 0x8F, 0x90, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013,
        0x2014, 0x02DC, 0x2122, 0x0161, 0x203A, 0x0153, 0x9D, 0x017E, 0x0178,
    ];

    let mapped = match code {
        0 => 0xFFFD,
        0x80..=0x9F => WINDOWS_1252[(code - 0x80) as usize],
        0xD800..=0xDFFF => 0xFFFD,
        c if c > 0x10_FFFF => 0xFFFD,
        c => c,
    };
    char::from_u32(mapped)
}
