//! Native, fixed-width physical representations of Parquet primitive types.

/// A physical native representation of a Parquet fixed-size type: INT32, INT64,
/// FLOAT and DOUBLE all implement this so that decoders can be generic over the
/// element width.
pub trait NativeType: Sized + Copy + Send + Sync + std::fmt::Debug + Default + 'static {
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default;

    fn to_le_bytes(&self) -> Self::Bytes;
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! native {
    ($type:ty, $len:expr) => {
        impl NativeType for $type {
            type Bytes = [u8; $len];

            #[inline]
            fn to_le_bytes(&self) -> Self::Bytes {
                Self::to_le_bytes(*self)
            }

            #[inline]
            fn from_le_bytes(bytes: Self::Bytes) -> Self {
                Self::from_le_bytes(bytes)
            }
        }
    };
}

native!(i32, 4);
native!(i64, 8);
native!(f32, 4);
native!(f64, 8);

/// INT96 physical values: 12 raw bytes, interpreted by the row layer as a
/// (nanoseconds-of-day, Julian day) pair for legacy timestamp columns.
pub type Int96 = [u32; 3];

impl NativeType for Int96 {
    type Bytes = [u8; 12];

    #[inline]
    fn to_le_bytes(&self) -> Self::Bytes {
        let mut out = [0u8; 12];
        out[0..4].copy_from_slice(&self[0].to_le_bytes());
        out[4..8].copy_from_slice(&self[1].to_le_bytes());
        out[8..12].copy_from_slice(&self[2].to_le_bytes());
        out
    }

    #[inline]
    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        [
            u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
            u32::from_le_bytes(bytes[8..12].try_into().unwrap()),
        ]
    }
}

/// Julian-day epoch used by the legacy Parquet INT96 timestamp encoding.
const JULIAN_DAY_OF_EPOCH: i64 = 2_440_588;
const NANOS_PER_DAY: i64 = 24 * 60 * 60 * 1_000_000_000;

/// Converts an INT96 value (nanos-of-day in the low 8 bytes, Julian day in the high
/// 4 bytes) into nanoseconds since the Unix epoch.
pub fn int96_to_i64_ns(value: Int96) -> i64 {
    let nanos = ((value[1] as i64) << 32) + value[0] as i64;
    let day = value[2] as i64 - JULIAN_DAY_OF_EPOCH;
    day * NANOS_PER_DAY + nanos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_roundtrip() {
        let v: i64 = -123_456_789;
        assert_eq!(i64::from_le_bytes(v.to_le_bytes()), v);
    }

    #[test]
    fn int96_roundtrip() {
        let v: Int96 = [123, 456, 2_440_588];
        assert_eq!(Int96::from_le_bytes(v.to_le_bytes()), v);
    }

    #[test]
    fn int96_epoch() {
        // day == JULIAN_DAY_OF_EPOCH, 0 nanos => unix epoch
        let v: Int96 = [0, 0, JULIAN_DAY_OF_EPOCH as u32];
        assert_eq!(int96_to_i64_ns(v), 0);
    }
}
