//! Parsing of compact duration strings such as `1d`, `12h30m` or `500u`.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ManifestError, ManifestResult};

fn duration_pair() -> &'static Regex {
  static PAIR: OnceLock<Regex> = OnceLock::new();
  PAIR.get_or_init(|| Regex::new(r"([0-9]+)([^0-9]+)").expect("invalid duration pair regex"))
}

fn unit_factor(unit: &str) -> Option<u64> {
  match unit {
    "d" => Some(86_400_000),
    "h" => Some(3_600_000),
    "m" => Some(60_000),
    "s" => Some(1_000),
    "u" => Some(1),
    _ => None,
  }
}

/// Parse a duration string into milliseconds.
///
/// The string is a sequence of `<digits><unit>` pairs whose values are summed, so `1d12h`
/// is a day and a half. Units are `d`, `h`, `m`, `s` and `u` (milliseconds). Every
/// character must belong to a pair.
pub fn parse_duration(input: &str) -> ManifestResult<u64> {
  if input.is_empty() {
    return Err(ManifestError::invalid_duration(input, "empty duration"));
  }

  let mut total: u64 = 0;
  let mut consumed = 0;

  for captures in duration_pair().captures_iter(input) {
    let (Some(whole), Some(amount), Some(unit)) = (captures.get(0), captures.get(1), captures.get(2))
    else {
      continue;
    };
    if whole.start() != consumed {
      return Err(ManifestError::invalid_duration(
        input,
        format!("unexpected {:?}", &input[consumed..whole.start()]),
      ));
    }
    consumed = whole.end();

    let factor = unit_factor(unit.as_str()).ok_or_else(|| {
      ManifestError::invalid_duration(input, format!("unknown unit {:?}", unit.as_str()))
    })?;
    let amount: u64 = amount
      .as_str()
      .parse()
      .map_err(|_| ManifestError::invalid_duration(input, "amount out of range"))?;

    total = amount
      .checked_mul(factor)
      .and_then(|value| total.checked_add(value))
      .ok_or_else(|| ManifestError::invalid_duration(input, "duration overflows"))?;
  }

  if consumed != input.len() {
    return Err(ManifestError::invalid_duration(
      input,
      format!("unexpected {:?}", &input[consumed..]),
    ));
  }

  Ok(total)
}
