//! Hash functions that can be plugged into a [`crate::ring::RingHash`].
//!
//! The ring only needs a deterministic `fn(&[u8]) -> u32` that spreads its outputs roughly uniformly
//! over the 32-bit space. Keys and virtual points are projected onto the same space, so the whole
//! consistency guarantee of the ring rests on this function.
use murmur3::murmur3_32;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use strum_macros::{Display, EnumString};

/// The hash space of the ring is [0, 2^32)
pub type HashFunctionReturnType = u32;

/// A pluggable hash function.
///
/// A plain function pointer is enough here: ring ids and keys are small byte slices, so there is no
/// need for a streaming `Hasher` API.
pub type HashFn = fn(&[u8]) -> HashFunctionReturnType;

/// CRC32 (IEEE polynomial). This is the default hash of the ring.
pub fn crc32_ieee(key: &[u8]) -> HashFunctionReturnType {
    crc32fast::hash(key)
}

/// CRC32-C (Castagnoli polynomial)
pub fn crc32_castagnoli(key: &[u8]) -> HashFunctionReturnType {
    crc32c::crc32c(key)
}

/// Murmur3 x86 32 bits, seed 0
pub fn murmur3_x86_32(key: &[u8]) -> HashFunctionReturnType {
    // reading from an in-memory cursor never returns an io error
    murmur3_32(&mut Cursor::new(key), 0).expect("in-memory read can't fail")
}

/// The hash functions that can be selected by name, e.g. from a [`crate::config::RingConfig`]
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HashAlgorithm {
    #[default]
    Crc32,
    Crc32c,
    Murmur3,
}

impl HashAlgorithm {
    pub fn hash_fn(&self) -> HashFn {
        match self {
            HashAlgorithm::Crc32 => crc32_ieee,
            HashAlgorithm::Crc32c => crc32_castagnoli,
            HashAlgorithm::Murmur3 => murmur3_x86_32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{crc32_ieee, HashAlgorithm};
    use std::str::FromStr;

    #[test]
    fn crc32_matches_known_vector() {
        // standard CRC32 check value
        assert_eq!(crc32_ieee(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn algorithm_names() {
        assert_eq!(HashAlgorithm::from_str("crc32").unwrap(), HashAlgorithm::Crc32);
        assert_eq!(HashAlgorithm::from_str("crc32c").unwrap(), HashAlgorithm::Crc32c);
        assert_eq!(HashAlgorithm::from_str("murmur3").unwrap(), HashAlgorithm::Murmur3);
        assert!(HashAlgorithm::from_str("md5").is_err());
        assert_eq!(HashAlgorithm::Murmur3.to_string(), "murmur3");
        assert_eq!(HashAlgorithm::default(), HashAlgorithm::Crc32);
    }

    #[quickcheck]
    fn hash_functions_are_deterministic(key: Vec<u8>) -> bool {
        [HashAlgorithm::Crc32, HashAlgorithm::Crc32c, HashAlgorithm::Murmur3]
            .iter()
            .all(|algorithm| {
                let hash_fn = algorithm.hash_fn();
                hash_fn(&key) == hash_fn(&key)
            })
    }
}
