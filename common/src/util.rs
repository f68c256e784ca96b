use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
};

use eyre::{Context, Result};
use serde::de::DeserializeOwned;

const TAIL_CHUNK: usize = 4096;

pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).wrap_err_with(|| format!("Opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .wrap_err_with(|| format!("Parsing {}", path.display()))
}

/// Returns the last line of a file without reading it front to back.
///
/// Scans backward from the end collecting bytes until a newline is found
/// with at least one byte already collected, so a single trailing newline
/// belongs to the last line rather than terminating the scan. The result is
/// trimmed. An empty file yields an empty string.
pub fn read_last_line(path: &Path) -> Result<String> {
    let mut file = File::open(path).wrap_err_with(|| format!("Opening {}", path.display()))?;
    let mut pos = file.seek(SeekFrom::End(0))?;
    // collected in reverse
    let mut line = Vec::new();
    let mut buf = [0u8; TAIL_CHUNK];

    'scan: while pos > 0 {
        let len = pos.min(TAIL_CHUNK as u64) as usize;
        pos -= len as u64;
        file.seek(SeekFrom::Start(pos))?;
        file.read_exact(&mut buf[..len])?;
        for &byte in buf[..len].iter().rev() {
            if byte == b'\n' && !line.is_empty() {
                break 'scan;
            }
            line.push(byte);
        }
    }

    line.reverse();
    let line = String::from_utf8(line)
        .wrap_err_with(|| format!("Last line of {} is not UTF-8", path.display()))?;
    Ok(line.trim().to_owned())
}
