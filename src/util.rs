use bytes::BufMut;

/// Number of octets needed to pad `len` up to the next 32-bit boundary.
pub fn get_padding_size(len: usize) -> usize {
    if len % 4 == 0 {
        0
    } else {
        4 - (len % 4)
    }
}

/// Writes padding octets for a body of `len` octets; the last octet carries
/// the padding count as RFC 3550 requires.
pub(crate) fn put_padding(mut buf: &mut [u8], len: usize) {
    let padding_size = get_padding_size(len);
    for i in 0..padding_size {
        if i == padding_size - 1 {
            buf.put_u8(padding_size as u8);
        } else {
            buf.put_u8(0);
        }
    }
}
