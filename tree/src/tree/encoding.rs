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

use std::io::{self, Read, Write};

use ed::{Decode, Encode, Result, Terminated};
use integer_encoding::{VarInt, VarIntReader, VarIntWriter};

use super::{CryptoHash, Node, NodeKey, HASH_LENGTH};

const MODE_LEFT_CHILD: u8 = 0b01;
const MODE_RIGHT_CHILD: u8 = 0b10;

/// Length of [NodeKey::to_storage_bytes].
pub const NODE_KEY_STORAGE_LENGTH: usize = 12;

impl NodeKey {
    /// Fixed width big-endian form, so that storage keys sort by version and
    /// then by position.
    pub fn to_storage_bytes(&self) -> [u8; NODE_KEY_STORAGE_LENGTH] {
        let mut bytes = [0; NODE_KEY_STORAGE_LENGTH];
        bytes[..8].copy_from_slice(&self.version.to_be_bytes());
        bytes[8..].copy_from_slice(&self.position.to_be_bytes());
        bytes
    }

    pub fn from_storage_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != NODE_KEY_STORAGE_LENGTH {
            return None;
        }
        let mut version = [0; 8];
        let mut position = [0; 4];
        version.copy_from_slice(&bytes[..8]);
        position.copy_from_slice(&bytes[8..]);
        Some(Self::new(i64::from_be_bytes(version), u32::from_be_bytes(position)))
    }
}

impl Encode for NodeKey {
    #[inline]
    fn encode_into<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_varint(self.version)?;
        out.write_varint(self.position)?;
        Ok(())
    }

    #[inline]
    fn encoding_length(&self) -> Result<usize> {
        Ok(self.version.required_space() + self.position.required_space())
    }
}

impl Decode for NodeKey {
    #[inline]
    fn decode<R: Read>(mut input: R) -> Result<Self> {
        let version: i64 = input.read_varint()?;
        let position: u32 = input.read_varint()?;
        Ok(Self::new(version, position))
    }
}

impl Terminated for NodeKey {}

fn write_bytes<W: Write>(out: &mut W, bytes: &[u8]) -> Result<()> {
    out.write_varint(bytes.len())?;
    out.write_all(bytes)?;
    Ok(())
}

fn bytes_length(bytes: &[u8]) -> usize {
    bytes.len().required_space() + bytes.len()
}

fn read_bytes<R: Read>(input: &mut R) -> Result<Vec<u8>> {
    let length: usize = input.read_varint()?;
    let mut bytes = Vec::new();
    input.take(length as u64).read_to_end(&mut bytes)?;
    if bytes.len() != length {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }
    Ok(bytes)
}

fn read_u8<R: Read>(input: &mut R) -> Result<u8> {
    let mut byte = [0];
    input.read_exact(byte.as_mut())?;
    Ok(byte[0])
}

impl Encode for Node {
    /// Writes height, size and key, then the value for leaves or the hash and
    /// child identities for inner nodes.
    ///
    /// Encoding an inner node that has not been hashed yet is an error.
    fn encode_into<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_varint(self.height as i64)?;
        out.write_varint(self.size)?;
        write_bytes(out, &self.key)?;

        if self.is_leaf() {
            write_bytes(out, self.value.as_deref().unwrap_or_default())?;
            return Ok(());
        }

        let hash = self
            .hash
            .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidInput))?;
        write_bytes(out, &hash)?;

        let mut mode = 0;
        if self.left_node_key.is_some() {
            mode |= MODE_LEFT_CHILD;
        }
        if self.right_node_key.is_some() {
            mode |= MODE_RIGHT_CHILD;
        }
        out.write_all(&[mode])?;
        if let Some(left) = &self.left_node_key {
            left.encode_into(out)?;
        }
        if let Some(right) = &self.right_node_key {
            right.encode_into(out)?;
        }

        Ok(())
    }

    fn encoding_length(&self) -> Result<usize> {
        let mut length = (self.height as i64).required_space()
            + self.size.required_space()
            + bytes_length(&self.key);

        if self.is_leaf() {
            length += bytes_length(self.value.as_deref().unwrap_or_default());
        } else {
            length += bytes_length(&[0; HASH_LENGTH]) + 1;
            for child in [&self.left_node_key, &self.right_node_key]
                .into_iter()
                .flatten()
            {
                length += child.encoding_length()?;
            }
        }

        Ok(length)
    }
}

impl Node {
    #[inline]
    pub fn encode(&self) -> Result<Vec<u8>> {
        Encode::encode(self)
    }

    /// Decodes a node stored under `node_key`. Leaf hashes are not stored and
    /// are left to be recomputed by [Node::hash].
    pub fn decode(node_key: NodeKey, mut input: &[u8]) -> Result<Self> {
        let height: i64 = input.read_varint()?;
        let height =
            i8::try_from(height).map_err(|_| io::Error::from(io::ErrorKind::InvalidData))?;
        let size: i64 = input.read_varint()?;
        let key = read_bytes(&mut input)?;

        let mut node = Node {
            key,
            value: None,
            node_key,
            height,
            size,
            hash: None,
            left_node_key: None,
            right_node_key: None,
            left_node: None,
            right_node: None,
        };

        if height == 0 {
            node.value = Some(read_bytes(&mut input)?);
            return Ok(node);
        }

        let hash_bytes = read_bytes(&mut input)?;
        if hash_bytes.len() != HASH_LENGTH {
            return Err(io::Error::from(io::ErrorKind::InvalidData).into());
        }
        let mut hash: CryptoHash = Default::default();
        hash.copy_from_slice(&hash_bytes);
        node.hash = Some(hash);

        let mode = read_u8(&mut input)?;
        if mode & !(MODE_LEFT_CHILD | MODE_RIGHT_CHILD) != 0 {
            return Err(ed::Error::UnexpectedByte(mode));
        }
        if mode & MODE_LEFT_CHILD != 0 {
            node.left_node_key = Some(NodeKey::decode(&mut input)?);
        }
        if mode & MODE_RIGHT_CHILD != 0 {
            node.right_node_key = Some(NodeKey::decode(&mut input)?);
        }

        Ok(node)
    }
}
