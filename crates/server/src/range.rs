#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    Invalid,
    Unsatisfiable,
}

/// Resolves a `Range` header against a body of `size` bytes.
///
/// `Ok(None)` means the header does not describe a byte range and the whole
/// body should be sent. An end bound that is missing, past the end, or
/// before the start is clamped to the last byte. For `bytes=-N` the number
/// is also read as the end bound, which then always clamps to the last byte.
pub fn parse_range_header(value: &str, size: u64) -> Result<Option<ByteRange>, RangeError> {
    let value = value.trim();
    let range = match value.strip_prefix("bytes=") {
        Some(range) => range.trim(),
        None => return Ok(None),
    };
    if range.contains(',') {
        return Err(RangeError::Invalid);
    }

    let (start_str, end_str) = match range.split_once('-') {
        Some(parts) => parts,
        None => return Err(RangeError::Invalid),
    };
    let start_str = start_str.trim();
    let end_str = end_str.trim();
    if start_str.is_empty() && end_str.is_empty() {
        return Err(RangeError::Invalid);
    }

    let end_bound = if end_str.is_empty() {
        None
    } else {
        Some(end_str.parse::<u64>().map_err(|_| RangeError::Invalid)?)
    };

    let start = if start_str.is_empty() {
        // suffix form: last N bytes
        let suffix = end_bound.unwrap_or(0);
        size.saturating_sub(suffix)
    } else {
        start_str.parse::<u64>().map_err(|_| RangeError::Invalid)?
    };

    if start >= size {
        return Err(RangeError::Unsatisfiable);
    }

    let last = size - 1;
    let end = match end_bound {
        Some(end) if end >= start && end <= last => end,
        _ => last,
    };

    Ok(Some(ByteRange { start, end }))
}
