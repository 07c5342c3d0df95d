//! Zig-zag encoded signed varints, riding on top of [`super::uleb128`].

use super::uleb128;

/// Decodes a zig-zag varint from the start of `values`.
/// Returns `(value, bytes_consumed)`.
pub fn decode(values: &[u8]) -> (i64, usize) {
    let (u, consumed) = uleb128::decode(values);
    ((u >> 1) as i64 ^ -((u & 1) as i64), consumed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_mapping() {
        // see e.g. https://developers.google.com/protocol-buffers/docs/encoding#signed-ints
        let cases = vec![
            (0u8, 0i64),
            (1, -1),
            (2, 1),
            (3, -2),
            (4, 2),
            (5, -3),
            (6, 3),
            (7, -4),
            (8, 4),
            (9, -5),
        ];
        for (data, expected) in cases {
            let (result, consumed) = decode(&[data]);
            assert_eq!(result, expected);
            assert_eq!(consumed, 1);
        }
    }
}
