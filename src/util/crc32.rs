/*!
A small implementation of CRC-32 (the reflected polynomial used by zlib,
gzip and friends).

This is used to give every parsed TZif image a cheap fingerprint. Two time
zones are only considered equal when they were produced from byte-for-byte
identical data, and comparing checksums is how that's done without holding
on to the original bytes.
*/

/// Computes the CRC-32 checksum of the given bytes.
///
/// This is the standard reflected CRC-32 with polynomial `0xEDB88320`,
/// initial value `0xFFFFFFFF` and a final inversion.
pub(crate) fn sum(bytes: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in bytes {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        // Standard check value for CRC-32.
        assert_eq!(sum(b"123456789"), 0xCBF4_3926);
        assert_eq!(sum(b""), 0);
        assert_eq!(sum(b"TZif"), sum(b"TZif"));
        assert_ne!(sum(b"TZif2"), sum(b"TZif3"));
    }
}
