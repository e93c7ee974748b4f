//! Write-side byte cursor.
//!
//! `Writer` is pre-sized by the caller (normally from the Length Estimator's
//! result) but grows on demand rather than panicking if a caller under-sized it;
//! [`crate::codec::write_frame`] treats any growth as a bug and reports it via
//! [`crate::error::EncodeError::LengthMismatch`] rather than letting it pass
//! silently.

pub struct Writer {
    buf: Vec<u8>,
    pos: usize,
}

impl Writer {
    pub fn with_capacity(n: usize) -> Self {
        Writer { buf: vec![0u8; n], pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, n: usize) {
        self.pos = n;
    }

    pub fn skip(&mut self, n: usize) {
        self.pos += n;
    }

    fn reserve(&mut self, n: usize) {
        let end = self.pos + n;
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write_u8(if v { 1 } else { 0 });
    }

    pub fn write_u8(&mut self, v: u8) {
        self.reserve(1);
        self.buf[self.pos] = v;
        self.pos += 1;
    }

    pub fn write_i16(&mut self, v: i16) {
        self.write_u16(v as u16);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.reserve(2);
        self.buf[self.pos..self.pos + 2].copy_from_slice(&v.to_le_bytes());
        self.pos += 2;
    }

    pub fn write_i32(&mut self, v: i32) {
        self.write_u32(v as u32);
    }

    pub fn write_u32(&mut self, v: u32) {
        self.reserve(4);
        self.buf[self.pos..self.pos + 4].copy_from_slice(&v.to_le_bytes());
        self.pos += 4;
    }

    /// Writes a 64-bit value as the (low32, high32) pair the wire format expects.
    pub fn write_i64(&mut self, v: i64) {
        self.write_u64(v as u64);
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write_u32(v as u32);
        self.write_u32((v >> 32) as u32);
    }

    pub fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    pub fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    /// Emits UTF-16LE code units followed by a terminating zero word. Supplementary
    /// characters are expanded to surrogate pairs by `encode_utf16`, matching the
    /// caller-responsibility note for code points above U+FFFF.
    pub fn write_string(&mut self, s: &str) {
        for unit in s.encode_utf16() {
            self.write_u16(unit);
        }
        self.write_u16(0);
    }

    pub fn write_bytes(&mut self, b: &[u8]) {
        self.reserve(b.len());
        self.buf[self.pos..self.pos + b.len()].copy_from_slice(b);
        self.pos += b.len();
    }

    /// Overwrites the u16 at `at` without disturbing the current cursor.
    pub fn patch_u16(&mut self, at: usize, v: u16) {
        let saved = self.pos;
        self.seek(at);
        self.write_u16(v);
        self.seek(saved);
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}
