//! The open-addressed hash table used for globals, fields, methods, and the
//! string intern table.
//!
//! Keys are interned strings, so lookups compare handles by identity. Probing
//! is linear with a 75% max load factor; deletions leave tombstones so probe
//! chains stay intact.

use crate::gc::Handle;
use crate::value::Value;

#[derive(Clone, Copy)]
struct Entry {
  key: Option<Handle>,
  hash: u32,
  value: Value,
}

impl Entry {
  const EMPTY: Entry = Entry {
    key: None,
    hash: 0,
    value: Value::Nil,
  };

  fn is_tombstone(&self) -> bool {
    self.key.is_none() && matches!(self.value, Value::Bool(true))
  }
}

#[derive(Default)]
pub struct Table {
  // `count` includes tombstones, like the probe math expects
  count: usize,
  entries: Vec<Entry>,
}

impl Table {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn capacity(&self) -> usize {
    self.entries.len()
  }

  pub fn byte_size(&self) -> usize {
    self.entries.capacity() * std::mem::size_of::<Entry>()
  }

  fn find_entry(entries: &[Entry], key: Handle, hash: u32) -> usize {
    let mut index = hash as usize & (entries.len() - 1);
    let mut tombstone = None;
    loop {
      let entry = &entries[index];
      match entry.key {
        None => {
          if entry.is_tombstone() {
            tombstone.get_or_insert(index);
          } else {
            return tombstone.unwrap_or(index);
          }
        }
        Some(existing) if existing == key => return index,
        Some(_) => {}
      }
      index = (index + 1) & (entries.len() - 1);
    }
  }

  pub fn get(&self, key: Handle, hash: u32) -> Option<Value> {
    if self.entries.is_empty() {
      return None;
    }
    let index = Self::find_entry(&self.entries, key, hash);
    let entry = &self.entries[index];
    entry.key.map(|_| entry.value)
  }

  /// Inserts or updates an entry. Returns `true` if the key was new.
  pub fn set(&mut self, key: Handle, hash: u32, value: Value) -> bool {
    if (self.count + 1) * 4 > self.entries.len() * 3 {
      self.grow();
    }

    let index = Self::find_entry(&self.entries, key, hash);
    let is_new = self.entries[index].key.is_none();
    if is_new && !self.entries[index].is_tombstone() {
      self.count += 1;
    }
    self.entries[index] = Entry {
      key: Some(key),
      hash,
      value,
    };
    is_new
  }

  /// Replaces the entry with a tombstone, preserving probe chains.
  pub fn delete(&mut self, key: Handle, hash: u32) -> bool {
    if self.entries.is_empty() {
      return false;
    }
    let index = Self::find_entry(&self.entries, key, hash);
    let entry = &mut self.entries[index];
    if entry.key.is_none() {
      return false;
    }
    *entry = Entry {
      key: None,
      hash: 0,
      value: Value::Bool(true),
    };
    true
  }

  /// Copies every live entry of `from` into `self`.
  pub fn add_all(&mut self, from: &Table) {
    for entry in &from.entries {
      if let Some(key) = entry.key {
        self.set(key, entry.hash, entry.value);
      }
    }
  }

  /// Probes for a key by hash, comparing candidates with `eq`. This is the
  /// byte-comparing lookup the string intern table uses.
  pub fn find_key(&self, hash: u32, mut eq: impl FnMut(Handle) -> bool) -> Option<Handle> {
    if self.entries.is_empty() {
      return None;
    }
    let mut index = hash as usize & (self.entries.len() - 1);
    loop {
      let entry = &self.entries[index];
      match entry.key {
        None => {
          if !entry.is_tombstone() {
            return None;
          }
        }
        Some(key) => {
          if entry.hash == hash && eq(key) {
            return Some(key);
          }
        }
      }
      index = (index + 1) & (self.entries.len() - 1);
    }
  }

  /// Tombstones every entry whose key fails `is_marked`. Run before sweep so
  /// a dead string cannot be resurrected through the intern table.
  pub fn remove_white(&mut self, mut is_marked: impl FnMut(Handle) -> bool) {
    for entry in &mut self.entries {
      if let Some(key) = entry.key {
        if !is_marked(key) {
          *entry = Entry {
            key: None,
            hash: 0,
            value: Value::Bool(true),
          };
        }
      }
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = (Handle, Value)> + '_ {
    self
      .entries
      .iter()
      .filter_map(|entry| entry.key.map(|key| (key, entry.value)))
  }

  pub fn len(&self) -> usize {
    self.iter().count()
  }

  pub fn is_empty(&self) -> bool {
    self.iter().next().is_none()
  }

  fn grow(&mut self) {
    let capacity = if self.entries.is_empty() {
      8
    } else {
      self.entries.len() * 2
    };
    let mut entries = vec![Entry::EMPTY; capacity];
    let mut count = 0;
    for entry in &self.entries {
      if let Some(key) = entry.key {
        let index = Self::find_entry(&entries, key, entry.hash);
        entries[index] = *entry;
        count += 1;
      }
    }
    self.entries = entries;
    self.count = count;
  }
}
