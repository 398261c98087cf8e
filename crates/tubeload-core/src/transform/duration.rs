use super::TransformError;

const SECS_PER_MINUTE: f64 = 60.0;
const SECS_PER_HOUR: f64 = 3_600.0;
const SECS_PER_DAY: f64 = 86_400.0;
const SECS_PER_WEEK: f64 = 604_800.0;

/// Convert an ISO-8601 duration (`PT5M30S`, `P1DT2H`, `P0D`) into total seconds.
///
/// Supports the `W`, `D`, `H`, `M` and `S` designators; only the seconds
/// component may carry a fraction. Year and month designators are rejected
/// because their length in seconds is not fixed.
///
/// # Errors
///
/// Returns [`TransformError::Duration`] for anything that is not a
/// well-formed duration in that subset.
pub fn parse_duration_secs(value: &str) -> Result<f64, TransformError> {
    let fail = |reason: &str| TransformError::Duration {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let body = value
        .strip_prefix('P')
        .ok_or_else(|| fail("missing leading 'P'"))?;
    if body.is_empty() {
        return Err(fail("no components"));
    }

    let (date_part, time_part) = match body.split_once('T') {
        Some((_, "")) => return Err(fail("empty time part after 'T'")),
        Some((date, time)) => (date, Some(time)),
        None => (body, None),
    };

    let mut total = 0.0_f64;
    let mut last_rank = 0;
    for (amount, designator) in components(date_part).map_err(|r| fail(&r))? {
        let (rank, factor) = match designator {
            'W' => (1, SECS_PER_WEEK),
            'D' => (2, SECS_PER_DAY),
            'Y' | 'M' => return Err(fail("year and month lengths are ambiguous")),
            other => return Err(fail(&format!("unexpected date designator '{other}'"))),
        };
        if rank <= last_rank {
            return Err(fail("date designators out of order"));
        }
        if amount.fract() != 0.0 {
            return Err(fail("only seconds may be fractional"));
        }
        last_rank = rank;
        total += amount * factor;
    }

    if let Some(time) = time_part {
        let parts = components(time).map_err(|r| fail(&r))?;
        let mut last_rank = 0;
        for (idx, (amount, designator)) in parts.iter().enumerate() {
            let (rank, factor) = match designator {
                'H' => (1, SECS_PER_HOUR),
                'M' => (2, SECS_PER_MINUTE),
                'S' => (3, 1.0),
                other => return Err(fail(&format!("unexpected time designator '{other}'"))),
            };
            if rank <= last_rank {
                return Err(fail("time designators out of order"));
            }
            if amount.fract() != 0.0 && (*designator != 'S' || idx + 1 != parts.len()) {
                return Err(fail("only seconds may be fractional"));
            }
            last_rank = rank;
            total += amount * factor;
        }
    }

    Ok(total)
}

/// Split `"1H2M3.5S"` into `[(1.0, 'H'), (2.0, 'M'), (3.5, 'S')]`.
fn components(part: &str) -> Result<Vec<(f64, char)>, String> {
    let mut out = Vec::new();
    let mut number = String::new();
    for c in part.chars() {
        if c.is_ascii_digit() || c == '.' || c == ',' {
            number.push(if c == ',' { '.' } else { c });
        } else if c.is_ascii_uppercase() {
            if number.is_empty() {
                return Err(format!("designator '{c}' has no value"));
            }
            let amount = number
                .parse::<f64>()
                .map_err(|_| format!("invalid number \"{number}\""))?;
            out.push((amount, c));
            number.clear();
        } else {
            return Err(format!("unexpected character '{c}'"));
        }
    }
    if !number.is_empty() {
        return Err(format!("trailing number \"{number}\" without designator"));
    }
    Ok(out)
}
