//! Test fixtures: hand-built kernel replies and a scripted transport.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;

use bytes::BytesMut;

use super::attr::{self, Attribute};
use super::message::{MessageIter, NLMSG_HDRLEN, NlMsgHdr, NlMsgType, nlmsg_align};
use super::nfnl::{NFNL_SUBSYS_IPSET, NfGenMsg, msg_type};
use super::socket::Transport;

/// Frame a single netlink message.
pub fn frame(msg_type: u16, seq: u32, payload: &[u8]) -> Vec<u8> {
    let mut header = NlMsgHdr::new(msg_type, 0);
    header.nlmsg_len = (NLMSG_HDRLEN + payload.len()) as u32;
    header.nlmsg_seq = seq;
    let mut buf = header.as_bytes().to_vec();
    buf.extend_from_slice(payload);
    buf.resize(nlmsg_align(buf.len()), 0);
    buf
}

/// `NLMSG_ERROR` carrying `-errno` (0 for an ack).
pub fn error(seq: u32, errno: i32) -> Vec<u8> {
    let mut payload = (-errno).to_ne_bytes().to_vec();
    let mut echoed = NlMsgHdr::new(msg_type(NFNL_SUBSYS_IPSET, 1), 0);
    echoed.nlmsg_seq = seq;
    payload.extend_from_slice(echoed.as_bytes());
    frame(NlMsgType::ERROR, seq, &payload)
}

/// Positive acknowledgement.
pub fn ack(seq: u32) -> Vec<u8> {
    error(seq, 0)
}

/// An ipset data message.
pub fn ipset_data(cmd: u8, seq: u32, family: u8, attrs: &[Attribute]) -> Vec<u8> {
    let mut payload = NfGenMsg::new(family).as_bytes().to_vec();
    payload.extend(attr::encode(attrs).expect("fixture attributes encode"));
    frame(msg_type(NFNL_SUBSYS_IPSET, cmd), seq, &payload)
}

/// How the next `send` call behaves.
#[derive(Debug, Clone, Copy)]
pub enum SendStep {
    /// Accept at most this many bytes.
    Partial(usize),
    /// Fail with `Interrupted` without writing.
    Interrupted,
    /// Fail with the given error kind.
    Fail(io::ErrorKind),
}

/// A transport that replays scripted datagrams and records what was sent.
#[derive(Default)]
pub struct MockTransport {
    written: RefCell<Vec<u8>>,
    send_steps: RefCell<VecDeque<SendStep>>,
    replies: RefCell<VecDeque<io::Result<Vec<u8>>>>,
    send_calls: RefCell<usize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a datagram for `recv`.
    pub fn push_reply(&self, datagram: Vec<u8>) -> &Self {
        self.replies.borrow_mut().push_back(Ok(datagram));
        self
    }

    /// Queue an error for `recv`.
    pub fn push_recv_error(&self, kind: io::ErrorKind) -> &Self {
        self.replies.borrow_mut().push_back(Err(kind.into()));
        self
    }

    /// Script the behaviour of the next `send` calls.
    pub fn push_send_step(&self, step: SendStep) -> &Self {
        self.send_steps.borrow_mut().push_back(step);
        self
    }

    /// Number of `send` calls made.
    pub fn send_calls(&self) -> usize {
        *self.send_calls.borrow()
    }

    /// All bytes written, in order.
    pub fn written(&self) -> Vec<u8> {
        self.written.borrow().clone()
    }

    /// Headers and attributes of every complete message written.
    pub fn sent_messages(&self) -> Vec<(NlMsgHdr, NfGenMsg, Vec<Attribute>)> {
        let written = self.written();
        MessageIter::new(&written)
            .map(|msg| {
                let (header, payload) = msg.expect("written message frames");
                let (nfgen, rest) = NfGenMsg::split(payload).expect("written nfgenmsg");
                (header, nfgen, attr::decode(rest).expect("written attributes"))
            })
            .collect()
    }

    /// Whether every scripted reply was consumed.
    pub fn drained(&self) -> bool {
        self.replies.borrow().is_empty()
    }
}

impl Transport for MockTransport {
    fn send(&self, buf: &[u8]) -> io::Result<usize> {
        *self.send_calls.borrow_mut() += 1;
        let n = match self.send_steps.borrow_mut().pop_front() {
            None => buf.len(),
            Some(SendStep::Partial(n)) => n.min(buf.len()),
            Some(SendStep::Interrupted) => return Err(io::ErrorKind::Interrupted.into()),
            Some(SendStep::Fail(kind)) => return Err(kind.into()),
        };
        self.written.borrow_mut().extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn recv(&self, buf: &mut BytesMut) -> io::Result<usize> {
        match self.replies.borrow_mut().pop_front() {
            Some(Ok(datagram)) => {
                buf.extend_from_slice(&datagram);
                Ok(datagram.len())
            }
            Some(Err(e)) => Err(e),
            None => Err(io::ErrorKind::WouldBlock.into()),
        }
    }

    fn port_id(&self) -> u32 {
        4242
    }
}
