use std::fmt::{Debug, Display};
use std::ops::Deref;

use beef::lean::Cow;

/// An immutable heap string with its precomputed FNV-1a hash.
///
/// Interned strings are unique per byte content and compare by identity;
/// non-interned strings own their buffer and compare by bytes.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Str {
  data: Cow<'static, str>,
  hash: u32,
  interned: bool,
}

impl Str {
  pub fn new(data: impl Into<Cow<'static, str>>, interned: bool) -> Self {
    let data = data.into();
    let hash = hash_str(&data);
    Self {
      data,
      hash,
      interned,
    }
  }

  pub fn as_str(&self) -> &str {
    self.data.as_ref()
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  #[inline]
  pub fn hash(&self) -> u32 {
    self.hash
  }

  #[inline]
  pub fn interned(&self) -> bool {
    self.interned
  }
}

/// 32-bit FNV-1a.
pub fn hash_str(s: &str) -> u32 {
  let mut hash: u32 = 2166136261;
  for byte in s.bytes() {
    hash ^= byte as u32;
    hash = hash.wrapping_mul(16777619);
  }
  hash
}

impl Display for Str {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    Display::fmt(&self.data, f)
  }
}

impl Debug for Str {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    Debug::fmt(&self.data, f)
  }
}

impl Deref for Str {
  type Target = str;

  fn deref(&self) -> &Self::Target {
    self.data.as_ref()
  }
}

impl AsRef<str> for Str {
  fn as_ref(&self) -> &str {
    self.data.as_ref()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fnv1a_known_values() {
    // reference values for the 32-bit FNV-1a of short strings
    assert_eq!(hash_str(""), 2166136261);
    assert_eq!(hash_str("a"), 0xe40c292c);
    assert_eq!(hash_str("foobar"), 0xbf9cf968);
  }

  #[test]
  fn equal_content_equal_hash() {
    let a = Str::new("abc", true);
    let b = Str::new(String::from("abc"), false);
    assert_eq!(a.hash(), b.hash());
    assert_eq!(a.as_str(), b.as_str());
    assert!(a.interned());
    assert!(!b.interned());
  }
}
