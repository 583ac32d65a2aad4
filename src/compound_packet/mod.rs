
use std::fmt;

use util::marshal::{Marshal, MarshalSize};

use crate::error::Error;
use crate::packet::{Packet, RtcpPacket};

type Result<T> = std::result::Result<T, util::Error>;

/// A CompoundPacket is the ordered set of sub-packets carried by one RTCP
/// datagram. Serializing it concatenates every sub-packet back to back, in
/// order, into a single buffer.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct CompoundPacket(pub Vec<Packet>);

impl CompoundPacket {
    /// destination_ssrc returns the SSRC values all sub-packets refer to.
    pub fn destination_ssrc(&self) -> Vec<u32> {
        self.0
            .iter()
            .flat_map(|p| p.destination_ssrc())
            .collect()
    }
}

impl fmt::Display for CompoundPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for p in &self.0 {
            out += p.to_string().as_str();
            out += "\n";
        }
        write!(f, "{out}")
    }
}

impl MarshalSize for CompoundPacket {
    fn marshal_size(&self) -> usize {
        self.0.iter().map(|p| p.marshal_size()).sum()
    }
}

impl Marshal for CompoundPacket {
    /// marshal_to serializes every sub-packet into `buf` at its cumulative
    /// offset, producing one contiguous datagram.
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if buf.len() < self.marshal_size() {
            return Err(Error::BufferTooShort.into());
        }

        for packet in &self.0 {
            let n = packet.marshal_to(buf)?;
            buf = &mut buf[n..];
        }

        Ok(self.marshal_size())
    }
}
