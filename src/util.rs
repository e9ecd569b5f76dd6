//! Small utility helpers used across modules.

/// Opening and closing delimiters of a blank marker inside a code line.
pub const BLANK_OPEN: &str = "{{";
pub const BLANK_CLOSE: &str = "}}";

/// Blank ids referenced by a code line, in order of appearance.
/// `"print({{fn}}({{arg}}))"` yields `["fn", "arg"]`. An unterminated
/// `{{` ends the scan.
pub fn blank_ids(line: &str) -> Vec<&str> {
  let mut out = Vec::new();
  let mut rest = line;
  while let Some(start) = rest.find(BLANK_OPEN) {
    let after = &rest[start + BLANK_OPEN.len()..];
    match after.find(BLANK_CLOSE) {
      Some(end) => {
        out.push(after[..end].trim());
        rest = &after[end + BLANK_CLOSE.len()..];
      }
      None => break,
    }
  }
  out
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}
