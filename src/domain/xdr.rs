//! Minimal XDR (RFC 4506) encoding for the ledger structures this client
//! builds.
//!
//! Only the writer side is general. Reading is limited to pulling fixed-offset
//! fields out of ledger entries returned by the RPC server.

/// Values that know how to append their XDR form to a writer.
pub trait XdrEncode {
    fn encode(&self, w: &mut XdrWriter);

    fn to_xdr(&self) -> Vec<u8> {
        let mut w = XdrWriter::new();
        self.encode(&mut w);
        w.into_bytes()
    }
}

/// Big-endian, 4-byte aligned byte sink.
#[derive(Debug, Default)]
pub struct XdrWriter {
    buf: Vec<u8>,
}

impl XdrWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write_u32(u32::from(v));
    }

    /// `opaque[n]`: the bytes followed by zero padding to a multiple of four.
    pub fn write_fixed_opaque(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.pad(bytes.len());
    }

    /// `opaque<>`: a length prefix, the bytes, then padding.
    pub fn write_var_opaque(&mut self, bytes: &[u8]) {
        self.write_u32(bytes.len() as u32);
        self.write_fixed_opaque(bytes);
    }

    pub fn write_array<T: XdrEncode>(&mut self, items: &[T]) {
        self.write_u32(items.len() as u32);
        for item in items {
            item.encode(self);
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn pad(&mut self, written: usize) {
        let rem = written % 4;
        if rem != 0 {
            self.buf.extend(std::iter::repeat_n(0u8, 4 - rem));
        }
    }
}

/// Reads a big-endian `int64` at `offset`, if the buffer is long enough.
pub fn read_i64_at(bytes: &[u8], offset: usize) -> Option<i64> {
    let end = offset.checked_add(8)?;
    let raw: [u8; 8] = bytes.get(offset..end)?.try_into().ok()?;
    Some(i64::from_be_bytes(raw))
}

/// Reads a big-endian `int32` at `offset`, if the buffer is long enough.
pub fn read_i32_at(bytes: &[u8], offset: usize) -> Option<i32> {
    let end = offset.checked_add(4)?;
    let raw: [u8; 4] = bytes.get(offset..end)?.try_into().ok()?;
    Some(i32::from_be_bytes(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_are_big_endian() {
        let mut w = XdrWriter::new();
        w.write_i32(-2);
        w.write_u64(1);
        assert_eq!(
            w.into_bytes(),
            vec![0xff, 0xff, 0xff, 0xfe, 0, 0, 0, 0, 0, 0, 0, 1]
        );
    }

    #[test]
    fn test_fixed_opaque_is_padded() {
        let mut w = XdrWriter::new();
        w.write_fixed_opaque(b"ABC");
        assert_eq!(w.into_bytes(), vec![b'A', b'B', b'C', 0]);

        let mut w = XdrWriter::new();
        w.write_fixed_opaque(b"ABCD");
        assert_eq!(w.into_bytes().len(), 4);
    }

    #[test]
    fn test_var_opaque_has_length_prefix() {
        let mut w = XdrWriter::new();
        w.write_var_opaque(&[9, 9, 9, 9, 9]);
        assert_eq!(w.into_bytes(), vec![0, 0, 0, 5, 9, 9, 9, 9, 9, 0, 0, 0]);
    }

    #[test]
    fn test_read_helpers() {
        let mut w = XdrWriter::new();
        w.write_i32(7);
        w.write_i64(123_456_789_012);
        let bytes = w.into_bytes();

        assert_eq!(read_i32_at(&bytes, 0), Some(7));
        assert_eq!(read_i64_at(&bytes, 4), Some(123_456_789_012));
        assert_eq!(read_i64_at(&bytes, 8), None);
    }
}
