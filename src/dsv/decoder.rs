//! Incremental UTF-8 decoding of byte chunks

/// Decodes byte chunks into text, carrying code points split across chunk
/// boundaries over to the next call
///
/// Invalid sequences are replaced with U+FFFD, the same as
/// [`String::from_utf8_lossy`] would on the concatenated input.
#[derive(Debug, Default, Clone)]
pub struct ChunkDecoder {
    // Leading bytes of an incomplete code point (at most 3)
    pending: Vec<u8>,
}

impl ChunkDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `chunk` and append the text to `out`
    ///
    /// Returns the byte offset in `out` where the newly decoded text starts.
    pub fn decode(&mut self, chunk: &[u8], out: &mut String) -> usize {
        let start = out.len();
        let joined;
        let mut rest: &[u8] = if self.pending.is_empty() {
            chunk
        } else {
            let mut bytes = std::mem::take(&mut self.pending);
            bytes.extend_from_slice(chunk);
            joined = bytes;
            &joined
        };

        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(err) => {
                    let (valid, tail) = rest.split_at(err.valid_up_to());
                    if let Ok(text) = std::str::from_utf8(valid) {
                        out.push_str(text);
                    }
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &tail[len..];
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more bytes
                            self.pending.extend_from_slice(tail);
                            break;
                        }
                    }
                }
            }
        }

        start
    }

    /// Flush a dangling partial code point at end of input
    pub fn finish(&mut self, out: &mut String) {
        if !self.pending.is_empty() {
            self.pending.clear();
            out.push(char::REPLACEMENT_CHARACTER);
        }
    }

    /// Check if bytes are waiting for the rest of their code point
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
