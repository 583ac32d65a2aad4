
use std::fmt;

use bytes::{Buf, BufMut};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::RtcpPacket;

type Result<T> = std::result::Result<T, util::Error>;

const FIR_FCI_OFFSET: usize = HEADER_LENGTH + SSRC_LENGTH * 2;
const FIR_ENTRY_LENGTH: usize = 8;

/// A FirEntry is a (SSRC, seqno) pair, as carried in the FCI of a FullIntraRequest.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct FirEntry {
    /// SSRC of the target encoder
    pub ssrc: u32,
    /// Command sequence number, incremented modulo 256 for each new command
    pub sequence_number: u8,
}

/// The FullIntraRequest packet requests that a receiver send a decoder
/// refresh point as soon as possible. RFC 5104, Section 4.3.1.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct FullIntraRequest {
    /// SSRC of sender
    pub sender_ssrc: u32,
    /// SSRC of the media source
    pub media_ssrc: u32,
    pub fir: Vec<FirEntry>,
}

impl fmt::Display for FullIntraRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = format!("FullIntraRequest {:x} {:x}", self.sender_ssrc, self.media_ssrc);
        for e in &self.fir {
            out += format!(" ({:x} {})", e.ssrc, e.sequence_number).as_str();
        }
        write!(f, "{out}")
    }
}

impl RtcpPacket for FullIntraRequest {
    fn header(&self) -> Header {
        debug_assert!(self.marshal_size() / 4 - 1 <= u16::MAX as usize);
        Header {
            padding: false,
            count: FORMAT_FIR,
            packet_type: PacketType::PayloadSpecificFeedback,
            length: ((self.marshal_size() / 4) - 1) as u16,
        }
    }

    /// destination_ssrc returns an array of SSRC values that this packet refers to.
    fn destination_ssrc(&self) -> Vec<u32> {
        self.fir.iter().map(|e| e.ssrc).collect()
    }

    fn raw_size(&self) -> usize {
        FIR_FCI_OFFSET + self.fir.len() * FIR_ENTRY_LENGTH
    }
}

impl MarshalSize for FullIntraRequest {
    fn marshal_size(&self) -> usize {
        self.raw_size()
    }
}

impl Marshal for FullIntraRequest {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::BufferTooShort.into());
        }

        /*
         *  0                   1                   2                   3
         *  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |V=2|P|  FMT=4  |  PT=PSFB=206  |             length            |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |                  SSRC of packet sender                        |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |                  SSRC of media source                         |
         * +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         * |                              SSRC                             |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * | Seq nr.       |    Reserved                                   |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         */
        let h = self.header();
        let n = h.marshal_to(buf)?;
        buf = &mut buf[n..];

        buf.put_u32(self.sender_ssrc);
        buf.put_u32(self.media_ssrc);

        for fir in &self.fir {
            buf.put_u32(fir.ssrc);
            buf.put_u8(fir.sequence_number);
            buf.put_u8(0);
            buf.put_u16(0);
        }

        Ok(self.marshal_size())
    }
}

impl Unmarshal for FullIntraRequest {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let raw_packet_len = raw_packet.remaining();
        if raw_packet_len < FIR_FCI_OFFSET {
            return Err(Error::PacketTooShort.into());
        }

        let header = Header::unmarshal(raw_packet)?;
        if header.packet_type != PacketType::PayloadSpecificFeedback {
            return Err(Error::WrongType.into());
        }
        if header.count != FORMAT_FIR {
            return Err(Error::WrongFeedbackType.into());
        }

        let sender_ssrc = raw_packet.get_u32();
        let media_ssrc = raw_packet.get_u32();

        let fci_len = raw_packet_len - FIR_FCI_OFFSET;
        if fci_len % FIR_ENTRY_LENGTH != 0 {
            return Err(Error::PacketTooShort.into());
        }

        let mut fir = Vec::with_capacity(fci_len / FIR_ENTRY_LENGTH);
        for _ in 0..(fci_len / FIR_ENTRY_LENGTH) {
            let ssrc = raw_packet.get_u32();
            let sequence_number = raw_packet.get_u8();
            raw_packet.advance(3); // reserved
            fir.push(FirEntry {
                ssrc,
                sequence_number,
            });
        }

        Ok(FullIntraRequest {
            sender_ssrc,
            media_ssrc,
            fir,
        })
    }
}
