use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};

/// An OS file handle with its mode flags. Dropping the object (including via
/// sweep) closes the handle.
pub struct File {
  handle: Option<fs::File>,
  pub readable: bool,
  pub writable: bool,
}

impl File {
  /// Opens `path` with a C-style mode string (`r`, `w`, `a`, with `+`).
  pub fn open(path: &str, mode: &str) -> std::io::Result<Self> {
    let mut readable = false;
    let mut writable = false;
    let mut append = false;
    let mut truncate = false;
    let mut create = false;
    for c in mode.chars() {
      match c {
        'r' => readable = true,
        'w' => {
          writable = true;
          truncate = true;
          create = true;
        }
        'a' => {
          writable = true;
          append = true;
          create = true;
        }
        '+' => {
          readable = true;
          writable = true;
        }
        _ => {}
      }
    }

    let handle = fs::OpenOptions::new()
      .read(readable)
      .write(writable && !append)
      .append(append)
      .truncate(truncate && !append)
      .create(create)
      .open(path)?;

    Ok(Self {
      handle: Some(handle),
      readable,
      writable,
    })
  }

  pub fn is_open(&self) -> bool {
    self.handle.is_some()
  }

  pub fn close(&mut self) {
    self.handle = None;
    self.readable = false;
    self.writable = false;
  }

  /// Reads the whole file without disturbing the current position.
  pub fn read_all(&mut self) -> std::io::Result<String> {
    let handle = self
      .handle
      .as_mut()
      .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "file is closed"))?;
    let start = handle.stream_position()?;
    handle.seek(SeekFrom::Start(0))?;
    let mut out = String::new();
    handle.read_to_string(&mut out)?;
    handle.seek(SeekFrom::Start(start))?;
    Ok(out)
  }

  pub fn write_str(&mut self, data: &str) -> std::io::Result<()> {
    let handle = self
      .handle
      .as_mut()
      .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "file is closed"))?;
    handle.write_all(data.as_bytes())?;
    handle.flush()
  }
}
