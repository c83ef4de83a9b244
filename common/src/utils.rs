//! Common Utilities
//!
//! Provides utility functions used across the RRC SAP implementation

/// Convert a byte slice to hex string for debugging
pub fn bytes_to_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Calculate CRC-16/CCITT (polynomial 0x1021, initial value 0xFFFF)
pub fn crc16(data: &[u8]) -> u16 {
    const CRC16_POLY: u16 = 0x1021;
    let mut crc: u16 = 0xFFFF;

    for byte in data {
        crc ^= (*byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ CRC16_POLY;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_hex() {
        let data = vec![0x12, 0x34, 0xAB, 0xCD];
        assert_eq!(bytes_to_hex(&data), "12 34 ab cd");
        assert_eq!(bytes_to_hex(&[]), "");
    }

    #[test]
    fn test_crc16_check_value() {
        // CRC-16/CCITT-FALSE check value
        assert_eq!(crc16(b"123456789"), 0x29B1);
    }

    #[test]
    fn test_crc16_detects_bit_flip() {
        let data = b"handover".to_vec();
        let mut flipped = data.clone();
        flipped[3] ^= 0x01;
        assert_ne!(crc16(&data), crc16(&flipped));
    }
}
