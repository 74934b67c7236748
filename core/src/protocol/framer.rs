/// Accumulates raw serial bytes and splits them into newline-terminated records.
///
/// Bytes are held until a `\n` arrives, so a record (or a multi-byte UTF-8
/// character) split across reads is reassembled before it is decoded.
#[derive(Debug, Default)]
pub struct LineFramer {
    pending: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `bytes` and returns the complete lines now available.
    ///
    /// Lines are produced lazily; any line not pulled from the iterator stays
    /// buffered and is returned by the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> FramedLines<'_> {
        self.pending.extend_from_slice(bytes);
        FramedLines { framer: self }
    }

    fn next_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        let record: Vec<u8> = self.pending.drain(..=end).collect();
        Some(String::from_utf8_lossy(&record).trim().to_string())
    }
}

pub struct FramedLines<'a> {
    framer: &'a mut LineFramer,
}

impl Iterator for FramedLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.framer.next_line()
    }
}
