//! String descriptors

use crate::DescriptorType;

/// English (United States)
pub const LANGID_EN_US: u16 = 0x0409;

/// The output buffer can't hold the descriptor
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BufferTooSmall;

/// Size of the string descriptor that encodes `s`
pub fn encoded_len(s: &str) -> usize {
    2 + 2 * s.encode_utf16().count()
}

/// Writes the string descriptor with index 0: the list of supported languages
pub fn write_langids(langids: &[u16], buf: &mut [u8]) -> Result<usize, BufferTooSmall> {
    let len = 2 + 2 * langids.len();
    if len > usize::from(u8::max_value()) || buf.len() < len {
        return Err(BufferTooSmall);
    }

    buf[0] = len as u8;
    buf[1] = DescriptorType::STRING as u8;
    for (chunk, langid) in buf[2..len].chunks_exact_mut(2).zip(langids) {
        chunk.copy_from_slice(&langid.to_le_bytes());
    }

    Ok(len)
}

/// Writes `s` as a UTF-16LE string descriptor
pub fn write(s: &str, buf: &mut [u8]) -> Result<usize, BufferTooSmall> {
    let len = encoded_len(s);
    if len > usize::from(u8::max_value()) || buf.len() < len {
        return Err(BufferTooSmall);
    }

    buf[0] = len as u8;
    buf[1] = DescriptorType::STRING as u8;
    for (chunk, unit) in buf[2..len].chunks_exact_mut(2).zip(s.encode_utf16()) {
        chunk.copy_from_slice(&unit.to_le_bytes());
    }

    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::{write, write_langids, BufferTooSmall, LANGID_EN_US};

    #[test]
    fn langids() {
        let mut buf = [0; 4];
        assert_eq!(write_langids(&[LANGID_EN_US], &mut buf), Ok(4));
        assert_eq!(buf, [4, 3, 0x09, 0x04]);
    }

    #[test]
    fn utf16le() {
        let mut buf = [0; 16];
        let n = write("Blinky", &mut buf).unwrap();

        assert_eq!(n, 14);
        assert_eq!(
            &buf[..n],
            &[14, 3, b'B', 0, b'l', 0, b'i', 0, b'n', 0, b'k', 0, b'y', 0]
        );
    }

    #[test]
    fn too_small() {
        let mut buf = [0; 4];
        assert_eq!(write("CH55x", &mut buf), Err(BufferTooSmall));
    }
}
