//! Version name arithmetic.

use space_schema::VersionMode;
use space_schema::defaults::BASE_VERSION_NAME;
use uuid::Uuid;

/// Compute the version name that follows `previous` under `mode`.
///
/// Numeric dotted names (`1`, `1.2`, `1.2.3.4`) are padded to three segments
/// and bumped; every segment after the bumped one is zeroed. Segments are
/// incremented as decimal text, so there is no upper bound. Any other name
/// cannot be ordered, so a fresh random token is returned instead. `Default`
/// and `Override` keep the previous name.
pub fn next_version(previous: Option<&str>, mode: VersionMode) -> String {
  let previous = previous
    .filter(|p| !p.is_empty())
    .unwrap_or(BASE_VERSION_NAME);

  if matches!(mode, VersionMode::Default | VersionMode::Override) {
    return previous.to_string();
  }

  let Some(mut segments) = numeric_segments(previous) else {
    return Uuid::new_v4().to_string();
  };
  while segments.len() < 3 {
    segments.push("0".to_string());
  }

  let bumped = match mode {
    VersionMode::Major => 0,
    VersionMode::Minor => 1,
    _ => 2,
  };
  segments[bumped] = increment(&segments[bumped]);
  for segment in &mut segments[bumped + 1..] {
    *segment = "0".to_string();
  }

  segments.join(".")
}

/// Segments of a dotted numeric name with leading zeros stripped, `None` when
/// any segment is not a number.
fn numeric_segments(name: &str) -> Option<Vec<String>> {
  name
    .split('.')
    .map(|segment| {
      if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
      }
      let trimmed = segment.trim_start_matches('0');
      let digits = if trimmed.is_empty() { "0" } else { trimmed };
      Some(digits.to_string())
    })
    .collect()
}

/// Add one to a string of ASCII digits.
fn increment(digits: &str) -> String {
  let mut out = digits.as_bytes().to_vec();
  for digit in out.iter_mut().rev() {
    if *digit == b'9' {
      *digit = b'0';
    } else {
      *digit += 1;
      return String::from_utf8_lossy(&out).into_owned();
    }
  }
  out.insert(0, b'1');
  String::from_utf8_lossy(&out).into_owned()
}
