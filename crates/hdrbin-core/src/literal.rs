//! Decoding of initializer bodies into byte sequences.
//!
//! A body is scanned left to right for numeric tokens:
//!
//! - `0x` / `0X` followed by one or more hex digits
//! - a run of decimal digits
//!
//! Everything else (commas, whitespace, line breaks, stray letters) separates
//! tokens and carries no value. Each token is truncated to its low 8 bits, the
//! same thing a `uint8_t` element does with an out-of-range constant.

/// Iterator over the byte values of the numeric tokens in a body.
#[derive(Debug, Clone)]
pub struct Literals<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Literals<'a> {
    /// Creates an iterator over the literals in `body`
    pub fn new(body: &'a str) -> Self {
        Self {
            bytes: body.as_bytes(),
            position: 0,
        }
    }
}

impl Iterator for Literals<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let bytes = self.bytes;

        while self.position < bytes.len() {
            let start = self.position;
            if !bytes[start].is_ascii_digit() {
                self.position += 1;
                continue;
            }

            let is_hex = bytes[start] == b'0'
                && matches!(bytes.get(start + 1), Some(b'x' | b'X'))
                && bytes.get(start + 2).is_some_and(u8::is_ascii_hexdigit);

            let (value, len) = if is_hex {
                let (value, digits) = low_byte(&bytes[start + 2..], 16);
                (value, digits + 2)
            } else {
                low_byte(&bytes[start..], 10)
            };

            self.position = start + len;
            return Some(value);
        }

        None
    }
}

/// Decodes every literal in `body`, in source order.
pub fn decode(body: &str) -> Vec<u8> {
    Literals::new(body).collect()
}

/// Reduces the leading digit run of `digits` modulo 256.
///
/// Returns the reduced value and the number of digits consumed. Reducing after
/// every digit keeps arbitrarily long tokens from overflowing.
fn low_byte(digits: &[u8], radix: u32) -> (u8, usize) {
    let mut acc: u32 = 0;
    let mut len = 0;

    for &d in digits {
        let Some(v) = char::from(d).to_digit(radix) else {
            break;
        };
        acc = (acc * radix + v) & 0xFF;
        len += 1;
    }

    (acc as u8, len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mixed_hex_and_decimal() {
        assert_eq!(decode("0x01,2,0xFF,4"), vec![0x01, 0x02, 0xFF, 0x04]);
    }

    #[test]
    fn test_hex_prefix_and_digits_are_case_insensitive() {
        assert_eq!(decode("0xAB, 0Xab, 0xaB, 171"), vec![171, 171, 171, 171]);
    }

    #[test]
    fn test_values_are_masked_to_low_byte() {
        assert_eq!(decode("256, 257, 0x1FF, 0x100, 1000"), vec![0, 1, 0xFF, 0, 232]);
    }

    #[test]
    fn test_long_tokens_do_not_overflow() {
        // 2^64 + 5 and 0x1_0000_0000_0000_0000_07
        assert_eq!(
            decode("18446744073709551621, 0x10000000000000000007"),
            vec![5, 7]
        );
    }

    #[test]
    fn test_irregular_layout() {
        let body = "\n\t0x10 ,\n  0x20,,\r\n   48 \n";
        assert_eq!(decode(body), vec![0x10, 0x20, 48]);
    }

    #[test]
    fn test_empty_and_separator_only_bodies() {
        assert!(decode("").is_empty());
        assert!(decode(" , ,\n").is_empty());
    }

    #[test]
    fn test_bare_hex_prefix_is_decimal_zero() {
        assert_eq!(decode("0x, 0xg"), vec![0, 0]);
    }

    #[test]
    fn test_suffixes_are_separators() {
        assert_eq!(decode("0x7Fu, 12U"), vec![0x7F, 12]);
    }

    #[test]
    fn test_iterator_is_lazy() {
        let mut literals = Literals::new("1, 2, 3");
        assert_eq!(literals.next(), Some(1));
        assert_eq!(literals.next(), Some(2));
        assert_eq!(literals.next(), Some(3));
        assert_eq!(literals.next(), None);
    }
}
