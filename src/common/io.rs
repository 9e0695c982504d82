use std::fs::File;
use std::io::{self, Read};
use std::ops::Deref;
use std::path::Path;

use memchr::memchr_iter;
use memmap2::MmapOptions;

use crate::column::{Bitmask, MaskState, StringColumn};
use crate::error::Result;

/// Holds input data — either zero-copy mmap or an owned Vec.
/// Dereferences to `&[u8]` for transparent use.
pub enum FileData {
    Mmap(memmap2::Mmap),
    Owned(Vec<u8>),
}

impl Deref for FileData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileData::Mmap(m) => m,
            FileData::Owned(v) => v,
        }
    }
}

/// Threshold below which we use read() instead of mmap.
/// For files under 1MB the mmap setup/teardown costs more than the copy.
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Read a file with zero-copy mmap for large regular files, read() otherwise.
pub fn read_file(path: &Path) -> io::Result<FileData> {
    let file = File::open(path)?;
    let metadata = file.metadata()?;
    let len = metadata.len();

    if len >= MMAP_THRESHOLD && metadata.file_type().is_file() {
        // SAFETY: read-only mapping; the input is not modified while mapped.
        if let Ok(mmap) = unsafe { MmapOptions::new().map(&file) } {
            #[cfg(target_os = "linux")]
            {
                let _ = mmap.advise(memmap2::Advice::Sequential);
            }
            return Ok(FileData::Mmap(mmap));
        }
    }

    let mut buf = Vec::with_capacity(len as usize);
    let mut reader = file;
    reader.read_to_end(&mut buf)?;
    Ok(FileData::Owned(buf))
}

/// Read all of stdin.
pub fn read_stdin() -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    io::stdin().lock().read_to_end(&mut buf)?;
    Ok(buf)
}

/// Read `path`, or stdin for `-`.
pub fn read_input(path: &str) -> io::Result<FileData> {
    if path == "-" {
        read_stdin().map(FileData::Owned)
    } else {
        read_file(Path::new(path))
    }
}

/// Build a string column with one row per `line_delim`-terminated line.
/// A final line without a terminator is still a row. Lines equal to
/// `null_marker` become null rows (pass `None` to disable).
pub fn lines_to_column(data: &[u8], line_delim: u8, null_marker: Option<&[u8]>) -> Result<StringColumn> {
    let mut chars = Vec::with_capacity(data.len());
    let mut offsets = vec![0usize];
    let mut nulls = Vec::new();

    let mut start = 0;
    let mut push = |line: &[u8], chars: &mut Vec<u8>, offsets: &mut Vec<usize>| {
        if null_marker == Some(line) {
            nulls.push(offsets.len() - 1);
        } else {
            chars.extend_from_slice(line);
        }
        offsets.push(chars.len());
    };
    for end in memchr_iter(line_delim, data) {
        push(&data[start..end], &mut chars, &mut offsets);
        start = end + 1;
    }
    if start < data.len() {
        push(&data[start..], &mut chars, &mut offsets);
    }

    let validity = (!nulls.is_empty()).then(|| {
        let mut mask = Bitmask::new(offsets.len() - 1, MaskState::AllValid);
        for &row in &nulls {
            mask.set(row, false);
        }
        mask
    });
    StringColumn::new(chars, offsets, validity)
}
