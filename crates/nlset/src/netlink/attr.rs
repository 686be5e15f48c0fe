//! Netlink attribute (nlattr) handling.
//!
//! Attributes are TLV nodes: a 4-byte header (`u16` length including the
//! header, `u16` type) followed by the payload and zero padding up to the
//! next 4-byte boundary. Container attributes carry [`NLA_F_NESTED`] in the
//! type field and hold a sequence of encoded child attributes as payload.
//!
//! ```text
//! ┌──────────┬──────────┬─────────────────────┬─────────┐
//! │ len: u16 │ type: u16│ payload (len - 4)   │ padding │
//! └──────────┴──────────┴─────────────────────┴─────────┘
//! ```

use super::error::{Error, Result};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Netlink attribute alignment.
pub const NLA_ALIGNTO: usize = 4;

/// Align a length to NLA_ALIGNTO boundary.
#[inline]
pub const fn nla_align(len: usize) -> usize {
    (len + NLA_ALIGNTO - 1) & !(NLA_ALIGNTO - 1)
}

/// Size of the attribute header.
pub const NLA_HDRLEN: usize = 4; // nla_align(size_of::<NlAttr>())

/// Netlink attribute header (mirrors struct nlattr).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlAttr {
    /// Length including header.
    pub nla_len: u16,
    /// Attribute type.
    pub nla_type: u16,
}

/// Attribute type flags.
pub const NLA_F_NESTED: u16 = 1 << 15;
pub const NLA_F_NET_BYTEORDER: u16 = 1 << 14;
pub const NLA_TYPE_MASK: u16 = !(NLA_F_NESTED | NLA_F_NET_BYTEORDER);

impl NlAttr {
    /// Get the attribute type without flags.
    pub fn kind(&self) -> u16 {
        self.nla_type & NLA_TYPE_MASK
    }

    /// Check if this is a nested attribute.
    pub fn is_nested(&self) -> bool {
        self.nla_type & NLA_F_NESTED != 0
    }

    /// Check if the payload is in network byte order.
    pub fn is_net_byteorder(&self) -> bool {
        self.nla_type & NLA_F_NET_BYTEORDER != 0
    }

    /// Convert to bytes.
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    /// Parse from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::read_from_prefix(data)
            .map(|(attr, _)| attr)
            .map_err(|_| {
                Error::MalformedAttribute(format!(
                    "truncated attribute header: {} bytes",
                    data.len()
                ))
            })
    }
}

/// Payload of an [`Attribute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Raw bytes, without padding.
    Leaf(Vec<u8>),
    /// Ordered child attributes.
    Nested(Vec<Attribute>),
}

/// An owned attribute tree node.
///
/// The type tag is stored without flag bits; the nested flag is derived from
/// the value and the byte-order flag is kept separately so that decoding an
/// encoded tree reproduces it exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    kind: u16,
    net_byteorder: bool,
    value: AttrValue,
}

impl Attribute {
    /// Create a leaf attribute with a raw payload.
    pub fn leaf(kind: u16, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: kind & NLA_TYPE_MASK,
            net_byteorder: false,
            value: AttrValue::Leaf(payload.into()),
        }
    }

    /// Create a container attribute.
    pub fn nested(kind: u16, children: Vec<Attribute>) -> Self {
        Self {
            kind: kind & NLA_TYPE_MASK,
            net_byteorder: false,
            value: AttrValue::Nested(children),
        }
    }

    /// Create a u8 attribute.
    pub fn u8(kind: u16, value: u8) -> Self {
        Self::leaf(kind, [value])
    }

    /// Create a u32 attribute in network byte order.
    ///
    /// Sets [`NLA_F_NET_BYTEORDER`] on the type, which ipset requires for
    /// 32-bit values.
    pub fn u32_be(kind: u16, value: u32) -> Self {
        Self::leaf(kind, value.to_be_bytes()).with_net_byteorder()
    }

    /// Create a null-terminated string attribute.
    pub fn string(kind: u16, value: &str) -> Self {
        let mut data = Vec::with_capacity(value.len() + 1);
        data.extend_from_slice(value.as_bytes());
        data.push(0);
        Self::leaf(kind, data)
    }

    /// Mark the payload as network byte order.
    pub fn with_net_byteorder(mut self) -> Self {
        self.net_byteorder = true;
        self
    }

    /// Get the attribute type without flags.
    pub fn kind(&self) -> u16 {
        self.kind
    }

    /// Check if this is a container attribute.
    pub fn is_nested(&self) -> bool {
        matches!(self.value, AttrValue::Nested(_))
    }

    /// Check if the payload is marked as network byte order.
    pub fn is_net_byteorder(&self) -> bool {
        self.net_byteorder
    }

    /// Get the attribute value.
    pub fn value(&self) -> &AttrValue {
        &self.value
    }

    /// Get the leaf payload, or `None` for containers.
    pub fn payload(&self) -> Option<&[u8]> {
        match &self.value {
            AttrValue::Leaf(data) => Some(data),
            AttrValue::Nested(_) => None,
        }
    }

    /// Get the children of a container, or `None` for leaves.
    pub fn children(&self) -> Option<&[Attribute]> {
        match &self.value {
            AttrValue::Nested(children) => Some(children),
            AttrValue::Leaf(_) => None,
        }
    }

    /// Find the first child with the given type.
    pub fn find(&self, kind: u16) -> Option<&Attribute> {
        self.children().and_then(|children| find(children, kind))
    }

    /// The full type field as written on the wire.
    pub fn type_field(&self) -> u16 {
        let mut field = self.kind;
        if self.is_nested() {
            field |= NLA_F_NESTED;
        }
        if self.net_byteorder {
            field |= NLA_F_NET_BYTEORDER;
        }
        field
    }

    /// Encoded size including header and trailing padding.
    pub fn encoded_len(&self) -> usize {
        nla_align(self.unpadded_len())
    }

    fn unpadded_len(&self) -> usize {
        NLA_HDRLEN
            + match &self.value {
                AttrValue::Leaf(data) => data.len(),
                AttrValue::Nested(children) => children.iter().map(Self::encoded_len).sum(),
            }
    }

    /// Append the encoded attribute to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) -> Result<()> {
        let len = self.unpadded_len();
        let nla_len = u16::try_from(len).map_err(|_| {
            Error::MalformedAttribute(format!(
                "attribute {} does not fit in 16-bit length ({} bytes)",
                self.kind, len
            ))
        })?;

        let start = buf.len();
        let header = NlAttr {
            nla_len,
            nla_type: self.type_field(),
        };
        buf.extend_from_slice(header.as_bytes());

        match &self.value {
            AttrValue::Leaf(data) => buf.extend_from_slice(data),
            AttrValue::Nested(children) => {
                for child in children {
                    child.encode_into(buf)?;
                }
            }
        }

        // Pad to alignment
        buf.resize(start + nla_align(len), 0);
        Ok(())
    }

    /// Extract a u8 value.
    pub fn as_u8(&self) -> Result<u8> {
        get::u8(self.leaf_payload()?)
    }

    /// Extract a u32 value (big endian / network order).
    pub fn as_u32_be(&self) -> Result<u32> {
        get::u32_be(self.leaf_payload()?)
    }

    /// Extract a null-terminated string.
    pub fn as_str(&self) -> Result<&str> {
        get::string(self.leaf_payload()?)
    }

    fn leaf_payload(&self) -> Result<&[u8]> {
        self.payload().ok_or_else(|| {
            Error::MalformedAttribute(format!("attribute {} is nested, expected a value", self.kind))
        })
    }
}

/// Encode a sequence of attributes.
pub fn encode(attrs: &[Attribute]) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(attrs.iter().map(Attribute::encoded_len).sum());
    for attr in attrs {
        attr.encode_into(&mut buf)?;
    }
    Ok(buf)
}

/// Decode a buffer of attributes into a tree.
///
/// Containers are recognized by [`NLA_F_NESTED`] and decoded recursively.
/// Fails on a header shorter than [`NLA_HDRLEN`], a declared length that
/// runs past the buffer, or non-zero padding.
pub fn decode(mut data: &[u8]) -> Result<Vec<Attribute>> {
    let mut attrs = Vec::new();

    while !data.is_empty() {
        let header = NlAttr::from_bytes(data)?;
        let len = header.nla_len as usize;

        if len < NLA_HDRLEN {
            return Err(Error::MalformedAttribute(format!(
                "attribute {} declares length {} shorter than its header",
                header.kind(),
                len
            )));
        }
        if len > data.len() {
            return Err(Error::MalformedAttribute(format!(
                "attribute {} declares length {} but only {} bytes remain",
                header.kind(),
                len,
                data.len()
            )));
        }

        // The last attribute of a buffer may omit its padding.
        let padded = nla_align(len).min(data.len());
        if data[len..padded].iter().any(|&b| b != 0) {
            return Err(Error::MalformedAttribute(format!(
                "non-zero padding after attribute {}",
                header.kind()
            )));
        }

        let payload = &data[NLA_HDRLEN..len];
        let value = if header.is_nested() {
            AttrValue::Nested(decode(payload)?)
        } else {
            AttrValue::Leaf(payload.to_vec())
        };

        attrs.push(Attribute {
            kind: header.kind(),
            net_byteorder: header.is_net_byteorder(),
            value,
        });

        data = &data[padded..];
    }

    Ok(attrs)
}

/// Find the first attribute with the given type.
pub fn find(attrs: &[Attribute], kind: u16) -> Option<&Attribute> {
    attrs.iter().find(|attr| attr.kind == kind)
}

/// Helper functions for extracting typed values from attribute payloads.
pub mod get {
    use super::*;

    /// Extract a u8 value.
    pub fn u8(data: &[u8]) -> Result<u8> {
        data.first()
            .copied()
            .ok_or_else(|| Error::MalformedAttribute("empty u8 attribute".into()))
    }

    /// Extract a u32 value (big endian / network order).
    pub fn u32_be(data: &[u8]) -> Result<u32> {
        if data.len() < 4 {
            return Err(Error::MalformedAttribute("truncated u32 attribute".into()));
        }
        Ok(u32::from_be_bytes([data[0], data[1], data[2], data[3]]))
    }

    /// Extract a null-terminated string.
    pub fn string(data: &[u8]) -> Result<&str> {
        // Find null terminator or use whole buffer
        let len = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        std::str::from_utf8(&data[..len])
            .map_err(|e| Error::MalformedAttribute(format!("invalid UTF-8: {}", e)))
    }
}
