//! Small utility helpers used across modules.

/// Normalize a typed answer for comparison: trimmed and lowercased.
pub fn normalize(s: &str) -> String {
  s.trim().to_lowercase()
}

/// Case-insensitive, whitespace-trimmed equality.
pub fn answers_match(expected: &str, response: &str) -> bool {
  normalize(expected) == normalize(response)
}

/// URL slug from a display name: "The Bug on Jug" -> "the-bug-on-jug".
/// Non-alphanumerics collapse to a single dash.
pub fn slugify(name: &str) -> String {
  let mut out = String::with_capacity(name.len());
  let mut dash = false;
  for ch in name.chars() {
    if ch.is_ascii_alphanumeric() {
      out.push(ch.to_ascii_lowercase());
      dash = false;
    } else if !out.is_empty() && !dash {
      out.push('-');
      dash = true;
    }
  }
  while out.ends_with('-') {
    out.pop();
  }
  out
}

/// Log-safe truncation for user-typed text.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let head: String = s.chars().take(max).collect();
    format!("{}… ({} chars total)", head, s.chars().count())
  }
}
