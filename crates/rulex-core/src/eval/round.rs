use rulex_lang::format_number;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RoundMode {
    /// Half away from zero.
    HalfUp,
    /// Toward positive infinity.
    Ceiling,
    /// Toward negative infinity.
    Floor,
}

/// Round `n` to `places` decimal places (negative: tens, hundreds, ...).
///
/// Works on the shortest decimal text of `n` rather than its binary value,
/// so `12.345` at two places is `12.35`.
pub(crate) fn round_to(n: f64, places: i64, mode: RoundMode) -> f64 {
    // Beyond f64's decimal range every outcome is already decided.
    let places = places.clamp(-400, 400);
    let negative = n < 0.0;
    let text = format_number(n.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes())
        .map(|b| b - b'0')
        .collect();

    // Number of leading digits that survive.
    let keep = (int_part.len() as i64).saturating_add(places);
    if keep >= digits.len() as i64 {
        return n;
    }
    let split = keep.max(0) as usize;
    let (kept, dropped) = digits.split_at(split);
    let any_dropped = dropped.iter().any(|&d| d != 0);

    let away_from_zero = match mode {
        RoundMode::HalfUp => keep >= 0 && dropped.first().is_some_and(|&d| d >= 5),
        RoundMode::Ceiling => !negative && any_dropped,
        RoundMode::Floor => negative && any_dropped,
    };

    let mut kept = kept.to_vec();
    if away_from_zero {
        increment(&mut kept);
    }
    let magnitude = scale(&kept, places).parse::<f64>().unwrap_or(0.0);
    if negative { -magnitude } else { magnitude }
}

/// Add one to a big-endian decimal digit string.
fn increment(digits: &mut Vec<u8>) {
    for d in digits.iter_mut().rev() {
        if *d == 9 {
            *d = 0;
        } else {
            *d += 1;
            return;
        }
    }
    digits.insert(0, 1);
}

/// Text of `digits × 10^-places`.
fn scale(digits: &[u8], places: i64) -> String {
    let mut text: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
    if text.is_empty() {
        return "0".to_string();
    }
    if places <= 0 {
        text.extend(std::iter::repeat_n('0', places.unsigned_abs() as usize));
        return text;
    }
    let places = places as usize;
    if text.len() <= places {
        let pad = "0".repeat(places - text.len() + 1);
        text.insert_str(0, &pad);
    }
    text.insert(text.len() - places, '.');
    text
}
