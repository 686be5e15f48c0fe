//! Message builder for constructing netlink messages.

use super::attr::Attribute;
use super::error::Result;
use super::message::{NLMSG_HDRLEN, NlMsgHdr, nlmsg_align};
use super::nfnl::NfGenMsg;

/// Builder for constructing netlink messages.
///
/// The header is written up front and patched by [`set_seq`](Self::set_seq),
/// [`set_pid`](Self::set_pid) and [`finish`](Self::finish).
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    buf: Vec<u8>,
}

impl MessageBuilder {
    /// Create a new message builder with the given type and flags.
    pub fn new(msg_type: u16, flags: u16) -> Self {
        let header = NlMsgHdr::new(msg_type, flags);
        let mut buf = vec![0u8; NLMSG_HDRLEN];
        buf[..std::mem::size_of::<NlMsgHdr>()].copy_from_slice(header.as_bytes());
        Self { buf }
    }

    /// Get the current message length.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if the message is empty (header only).
    pub fn is_empty(&self) -> bool {
        self.buf.len() == NLMSG_HDRLEN
    }

    /// Message type from the header.
    pub fn msg_type(&self) -> u16 {
        u16::from_ne_bytes([self.buf[4], self.buf[5]])
    }

    /// Message flags from the header.
    pub fn flags(&self) -> u16 {
        u16::from_ne_bytes([self.buf[6], self.buf[7]])
    }

    /// Append raw bytes to the message (with alignment padding).
    pub fn append_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
        // Pad to alignment
        let aligned = nlmsg_align(self.buf.len());
        self.buf.resize(aligned, 0);
    }

    /// Append the nfnetlink family header.
    pub fn append_nfgen(&mut self, family: u8) {
        self.append_bytes(&NfGenMsg::new(family).as_bytes());
    }

    /// Append an encoded attribute tree.
    pub fn append_attribute(&mut self, attr: &Attribute) -> Result<()> {
        attr.encode_into(&mut self.buf)
    }

    /// Append several attributes in order.
    pub fn append_attributes(&mut self, attrs: &[Attribute]) -> Result<()> {
        for attr in attrs {
            self.append_attribute(attr)?;
        }
        Ok(())
    }

    /// Set the sequence number.
    pub fn set_seq(&mut self, seq: u32) {
        let bytes = seq.to_ne_bytes();
        self.buf[8..12].copy_from_slice(&bytes);
    }

    /// Get the sequence number.
    pub fn seq(&self) -> u32 {
        u32::from_ne_bytes([self.buf[8], self.buf[9], self.buf[10], self.buf[11]])
    }

    /// Set the port ID.
    pub fn set_pid(&mut self, pid: u32) {
        let bytes = pid.to_ne_bytes();
        self.buf[12..16].copy_from_slice(&bytes);
    }

    /// Finalize and return the message bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.write_len();
        self.buf
    }

    /// Get the framed message (length filled in) for inspection.
    pub fn as_bytes(&mut self) -> &[u8] {
        self.write_len();
        &self.buf
    }

    fn write_len(&mut self) {
        let len = self.buf.len() as u32;
        self.buf[0..4].copy_from_slice(&len.to_ne_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::attr::{self, NLA_HDRLEN};
    use crate::netlink::message::{NLM_F_ACK, NLM_F_REQUEST};
    use crate::netlink::nfnl::NFGENMSG_LEN;

    #[test]
    fn test_simple_message() {
        let msg = MessageBuilder::new(0x601, NLM_F_REQUEST).finish();
        assert_eq!(msg.len(), NLMSG_HDRLEN);

        let header = NlMsgHdr::from_bytes(&msg).unwrap();
        assert_eq!(header.nlmsg_len as usize, NLMSG_HDRLEN);
        assert_eq!(header.nlmsg_type, 0x601);
        assert_eq!(header.nlmsg_flags, NLM_F_REQUEST);
    }

    #[test]
    fn test_seq_and_pid() {
        let mut builder = MessageBuilder::new(0x602, NLM_F_REQUEST | NLM_F_ACK);
        builder.set_seq(42);
        builder.set_pid(1234);
        assert_eq!(builder.seq(), 42);
        assert_eq!(builder.flags(), NLM_F_REQUEST | NLM_F_ACK);

        let msg = builder.finish();
        let header = NlMsgHdr::from_bytes(&msg).unwrap();
        assert_eq!(header.nlmsg_seq, 42);
        assert_eq!(header.nlmsg_pid, 1234);
    }

    #[test]
    fn test_nfgen_and_attributes() {
        let mut builder = MessageBuilder::new(0x601, NLM_F_REQUEST);
        builder.append_nfgen(2);
        builder.append_attribute(&Attribute::u8(1, 7)).unwrap();
        let msg = builder.finish();

        assert_eq!(msg.len(), NLMSG_HDRLEN + NFGENMSG_LEN + NLA_HDRLEN + 4);
        assert_eq!(msg[NLMSG_HDRLEN], 2);
        assert_eq!(msg[NLMSG_HDRLEN + 1], 0);

        let attrs = attr::decode(&msg[NLMSG_HDRLEN + NFGENMSG_LEN..]).unwrap();
        assert_eq!(attrs, vec![Attribute::u8(1, 7)]);
    }

    #[test]
    fn test_length_tracks_nested_attribute() {
        let mut builder = MessageBuilder::new(0x609, NLM_F_REQUEST);
        builder.append_nfgen(2);
        builder
            .append_attribute(&Attribute::nested(7, vec![Attribute::u32_be(6, 60)]))
            .unwrap();
        let len = builder.len();
        let msg = builder.finish();

        let header = NlMsgHdr::from_bytes(&msg).unwrap();
        assert_eq!(header.nlmsg_len as usize, len);
        assert_eq!(len % 4, 0);
    }
}
