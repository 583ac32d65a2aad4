//! The RFC 2032 feedback forms, packet types 192 and 193. Long superseded by
//! the RFC 4585/5104 feedback messages, but still registered in the RTCP type
//! range and still emitted by old H.261 endpoints.

#[cfg(test)]
mod legacy_test;

use std::fmt;

use bytes::{Buf, BufMut};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::RtcpPacket;

type Result<T> = std::result::Result<T, util::Error>;

const LEGACY_FIR_LENGTH: usize = HEADER_LENGTH + SSRC_LENGTH;
const LEGACY_NACK_LENGTH: usize = HEADER_LENGTH + SSRC_LENGTH + 4;

/// A LegacyFir packet requests a full intra-frame from the sender identified
/// by its SSRC. RFC 2032, Section 5.2.1.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct LegacyFir {
    /// SSRC of the sender being asked for an intra frame.
    pub ssrc: u32,
}

impl fmt::Display for LegacyFir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LegacyFir {:x}", self.ssrc)
    }
}

impl RtcpPacket for LegacyFir {
    fn header(&self) -> Header {
        Header {
            padding: false,
            count: 0,
            packet_type: PacketType::Fir,
            length: ((self.marshal_size() / 4) - 1) as u16,
        }
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.ssrc]
    }

    fn raw_size(&self) -> usize {
        LEGACY_FIR_LENGTH
    }
}

impl MarshalSize for LegacyFir {
    fn marshal_size(&self) -> usize {
        self.raw_size()
    }
}

impl Marshal for LegacyFir {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::BufferTooShort.into());
        }

        let h = self.header();
        let n = h.marshal_to(buf)?;
        buf = &mut buf[n..];

        buf.put_u32(self.ssrc);

        Ok(self.marshal_size())
    }
}

impl Unmarshal for LegacyFir {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if raw_packet.remaining() < LEGACY_FIR_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        let header = Header::unmarshal(raw_packet)?;
        if header.packet_type != PacketType::Fir {
            return Err(Error::WrongType.into());
        }

        let ssrc = raw_packet.get_u32();

        if raw_packet.has_remaining() {
            raw_packet.advance(raw_packet.remaining());
        }

        Ok(LegacyFir { ssrc })
    }
}

/// A LegacyNack packet reports one or more lost packets: a first sequence
/// number plus a bitmask of the sixteen packets following it.
/// RFC 2032, Section 5.2.2.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct LegacyNack {
    /// SSRC of the sender whose packets were lost.
    pub ssrc: u32,
    /// First sequence number lost.
    pub first_sequence_number: u16,
    /// Bitmask of the sixteen packets following the first one.
    pub bitmask: u16,
}

impl fmt::Display for LegacyNack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LegacyNack {:x} {} {:b}",
            self.ssrc, self.first_sequence_number, self.bitmask
        )
    }
}

impl RtcpPacket for LegacyNack {
    fn header(&self) -> Header {
        Header {
            padding: false,
            count: 0,
            packet_type: PacketType::Nack,
            length: ((self.marshal_size() / 4) - 1) as u16,
        }
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.ssrc]
    }

    fn raw_size(&self) -> usize {
        LEGACY_NACK_LENGTH
    }
}

impl MarshalSize for LegacyNack {
    fn marshal_size(&self) -> usize {
        self.raw_size()
    }
}

impl Marshal for LegacyNack {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::BufferTooShort.into());
        }

        let h = self.header();
        let n = h.marshal_to(buf)?;
        buf = &mut buf[n..];

        buf.put_u32(self.ssrc);
        buf.put_u16(self.first_sequence_number);
        buf.put_u16(self.bitmask);

        Ok(self.marshal_size())
    }
}

impl Unmarshal for LegacyNack {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if raw_packet.remaining() < LEGACY_NACK_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        let header = Header::unmarshal(raw_packet)?;
        if header.packet_type != PacketType::Nack {
            return Err(Error::WrongType.into());
        }

        let ssrc = raw_packet.get_u32();
        let first_sequence_number = raw_packet.get_u16();
        let bitmask = raw_packet.get_u16();

        if raw_packet.has_remaining() {
            raw_packet.advance(raw_packet.remaining());
        }

        Ok(LegacyNack {
            ssrc,
            first_sequence_number,
            bitmask,
        })
    }
}
