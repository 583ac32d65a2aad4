
use std::fmt;

use bytes::{Buf, BufMut, Bytes};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::RtcpPacket;

type Result<T> = std::result::Result<T, util::Error>;

const APP_PACKET_OFFSET: usize = HEADER_LENGTH + SSRC_LENGTH + 4;

/// An ApplicationDefined (APP) packet carries application-specific data
/// intended for experimental use, RFC 3550, 6.7.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct ApplicationDefined {
    /// A subtype chosen by the application, carried in the header count field.
    pub subtype: u8,
    /// The synchronization source identifier for the originator of this packet.
    pub ssrc: u32,
    /// A name chosen by the person defining the set of APP packets to be
    /// unique with respect to other APP packets this application might
    /// receive. Four ASCII octets.
    pub name: [u8; 4],
    /// Application-dependent data, a multiple of 32 bits long.
    ///
    /// Decoding keeps any padding octets a padded wire packet carried at the
    /// tail of this field.
    pub data: Bytes,
}

impl fmt::Display for ApplicationDefined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ApplicationDefined {:x} {} subtype {}: {:?}",
            self.ssrc,
            String::from_utf8_lossy(&self.name),
            self.subtype,
            self.data
        )
    }
}

impl RtcpPacket for ApplicationDefined {
    fn header(&self) -> Header {
        debug_assert!(self.marshal_size() / 4 - 1 <= u16::MAX as usize);
        Header {
            padding: false,
            count: self.subtype,
            packet_type: PacketType::ApplicationDefined,
            length: ((self.marshal_size() / 4) - 1) as u16,
        }
    }

    /// destination_ssrc returns an array of SSRC values that this packet refers to.
    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.ssrc]
    }

    fn raw_size(&self) -> usize {
        APP_PACKET_OFFSET + self.data.len()
    }
}

impl MarshalSize for ApplicationDefined {
    fn marshal_size(&self) -> usize {
        // data is required to already be 32-bit aligned
        self.raw_size()
    }
}

impl Marshal for ApplicationDefined {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if self.subtype as usize > COUNT_MAX {
            return Err(Error::InvalidHeader.into());
        }

        if self.data.len() % 4 != 0 {
            return Err(Error::InvalidAppData.into());
        }

        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::BufferTooShort.into());
        }

        /*
         *  0                   1                   2                   3
         *  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |V=2|P| subtype |   PT=APP=204  |             length            |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |                           SSRC/CSRC                           |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |                          name (ASCII)                         |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |                   application-dependent data                ...
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         */
        let h = self.header();
        let n = h.marshal_to(buf)?;
        buf = &mut buf[n..];

        buf.put_u32(self.ssrc);
        buf.put_slice(&self.name);
        buf.put(self.data.clone());

        Ok(self.marshal_size())
    }
}

impl Unmarshal for ApplicationDefined {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let raw_packet_len = raw_packet.remaining();
        if raw_packet_len < APP_PACKET_OFFSET {
            return Err(Error::PacketTooShort.into());
        }

        let header = Header::unmarshal(raw_packet)?;
        if header.packet_type != PacketType::ApplicationDefined {
            return Err(Error::WrongType.into());
        }

        if (raw_packet_len - APP_PACKET_OFFSET) % 4 != 0 {
            return Err(Error::InvalidAppData.into());
        }

        let ssrc = raw_packet.get_u32();

        let mut name = [0u8; 4];
        raw_packet.copy_to_slice(&mut name);

        let data = raw_packet.copy_to_bytes(raw_packet.remaining());

        Ok(ApplicationDefined {
            subtype: header.count,
            ssrc,
            name,
            data,
        })
    }
}
