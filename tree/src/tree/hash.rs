// MIT LICENSE
//
// Copyright (c) 2021 Dash Core Group
//
// Permission is hereby granted, free of charge, to any
// person obtaining a copy of this software and associated
// documentation files (the "Software"), to deal in the
// Software without restriction, including without
// limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software
// is furnished to do so, subject to the following
// conditions:
//
// The above copyright notice and this permission notice
// shall be included in all copies or substantial portions
// of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF
// ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED
// TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A
// PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT
// SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY
// CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR
// IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

use integer_encoding::VarInt;
use sha2::{Digest, Sha256};

use crate::Version;

/// The length of a `Hash` (in bytes).
pub const HASH_LENGTH: usize = 32;

/// A cryptographic hash digest.
pub type CryptoHash = [u8; HASH_LENGTH];

fn finalize(hasher: Sha256) -> CryptoHash {
    let mut hash: CryptoHash = Default::default();
    hash.copy_from_slice(hasher.finalize().as_slice());
    hash
}

/// Writes the varint header shared by leaf and inner node hashes.
fn node_header(height: i8, size: i64, version: Version) -> Sha256 {
    let mut hasher = Sha256::new();
    hasher.update((height as i64).encode_var_vec());
    hasher.update(size.encode_var_vec());
    hasher.update(version.encode_var_vec());
    hasher
}

fn update_length_prefixed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update(bytes.len().encode_var_vec());
    hasher.update(bytes);
}

/// Hashes a value
pub fn value_hash(value: &[u8]) -> CryptoHash {
    let mut hasher = Sha256::new();
    hasher.update(value);
    finalize(hasher)
}

/// Root hash of a tree with no nodes.
pub fn empty_hash() -> CryptoHash {
    finalize(Sha256::new())
}

/// Hashes a leaf node.
///
/// The result is H(height, size, version, key_len, key, 32, H(value)) with
/// signed varints for the header fields.
pub fn leaf_hash(height: i8, size: i64, version: Version, key: &[u8], value: &[u8]) -> CryptoHash {
    let mut hasher = node_header(height, size, version);
    update_length_prefixed(&mut hasher, key);
    update_length_prefixed(&mut hasher, &value_hash(value));
    finalize(hasher)
}

/// Hashes an inner node from the hashes of its children, left first.
pub fn inner_hash(
    height: i8,
    size: i64,
    version: Version,
    left: &CryptoHash,
    right: &CryptoHash,
) -> CryptoHash {
    let mut hasher = node_header(height, size, version);
    update_length_prefixed(&mut hasher, left);
    update_length_prefixed(&mut hasher, right);
    finalize(hasher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_hash_is_sha256_of_nothing() {
        assert_eq!(
            hex::encode(empty_hash()),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn leaf_hash_vector() {
        assert_eq!(
            hex::encode(leaf_hash(0, 1, 1, b"a", b"1")),
            "bbe33cd0a785b97b9fb1f964aa71159dacd9e0ade84df7403dc0f9dc24818404"
        );
    }

    #[test]
    fn inner_hash_is_order_sensitive() {
        let left = leaf_hash(0, 1, 1, b"a", b"1");
        let right = leaf_hash(0, 1, 1, b"b", b"2");
        assert_eq!(
            hex::encode(inner_hash(1, 2, 1, &left, &right)),
            "94b037ab65e50f94eb827902a873ee796cb04e3c9ad38c9860d84cbad668a9e7"
        );
        assert_ne!(
            inner_hash(1, 2, 1, &left, &right),
            inner_hash(1, 2, 1, &right, &left)
        );
    }

    #[test]
    fn version_is_part_of_the_hash() {
        assert_ne!(
            leaf_hash(0, 1, 1, b"a", b"1"),
            leaf_hash(0, 1, 2, b"a", b"1")
        );
    }
}
