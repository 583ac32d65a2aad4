use std::fmt;

use bytes::{Buf, BufMut};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;

pub(crate) const RECEPTION_REPORT_LENGTH: usize = 24;

/// A ReceptionReport block conveys statistics on the reception of RTP packets
/// from a single synchronization source. It appears in both SenderReport and
/// ReceiverReport packets.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct ReceptionReport {
    /// The SSRC identifier of the source to which the information in this
    /// reception report block pertains.
    pub ssrc: u32,
    /// The fraction of RTP data packets from source SSRC lost since the
    /// previous SR or RR packet was sent, expressed as a fixed point
    /// number with the binary point at the left edge of the field.
    pub fraction_lost: u8,
    /// The total number of RTP data packets from source SSRC that have
    /// been lost since the beginning of reception. Carried as 24 bits on
    /// the wire.
    pub total_lost: u32,
    /// The least significant 16 bits contain the highest sequence number
    /// received in an RTP data packet from source SSRC, and the most
    /// significant 16 bits extend that sequence number with the
    /// corresponding count of sequence number cycles.
    pub last_sequence_number: u32,
    /// An estimate of the statistical variance of the RTP data packet
    /// interarrival time, measured in timestamp units.
    pub jitter: u32,
    /// The middle 32 bits out of 64 in the NTP timestamp received as part
    /// of the most recent SR packet from source SSRC, or zero.
    pub last_sender_report: u32,
    /// The delay, expressed in units of 1/65536 seconds, between receiving
    /// the last SR packet from source SSRC and sending this block, or zero.
    pub delay: u32,
}

impl fmt::Display for ReceptionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl MarshalSize for ReceptionReport {
    fn marshal_size(&self) -> usize {
        RECEPTION_REPORT_LENGTH
    }
}

impl Marshal for ReceptionReport {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize, util::Error> {
        /*
         *  0                   1                   2                   3
         *  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         * +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         * |                              SSRC                             |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * | fraction lost |       cumulative number of packets lost       |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |           extended highest sequence number received           |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |                      interarrival jitter                      |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |                         last SR (LSR)                         |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |                   delay since last SR (DLSR)                  |
         * +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         */
        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::BufferTooShort.into());
        }

        buf.put_u32(self.ssrc);
        buf.put_u8(self.fraction_lost);

        // total_lost is packed into 24 bits
        if self.total_lost >= (1 << 24) {
            return Err(Error::InvalidTotalLost.into());
        }
        buf.put_u8(((self.total_lost >> 16) & 0xFF) as u8);
        buf.put_u8(((self.total_lost >> 8) & 0xFF) as u8);
        buf.put_u8((self.total_lost & 0xFF) as u8);

        buf.put_u32(self.last_sequence_number);
        buf.put_u32(self.jitter);
        buf.put_u32(self.last_sender_report);
        buf.put_u32(self.delay);

        Ok(self.marshal_size())
    }
}

impl Unmarshal for ReceptionReport {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self, util::Error>
    where
        Self: Sized,
        B: Buf,
    {
        if raw_packet.remaining() < RECEPTION_REPORT_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        let ssrc = raw_packet.get_u32();
        let fraction_lost = raw_packet.get_u8();

        let t0 = raw_packet.get_u8();
        let t1 = raw_packet.get_u8();
        let t2 = raw_packet.get_u8();
        let total_lost = (t2 as u32) | (t1 as u32) << 8 | (t0 as u32) << 16;

        let last_sequence_number = raw_packet.get_u32();
        let jitter = raw_packet.get_u32();
        let last_sender_report = raw_packet.get_u32();
        let delay = raw_packet.get_u32();

        Ok(ReceptionReport {
            ssrc,
            fraction_lost,
            total_lost,
            last_sequence_number,
            jitter,
            last_sender_report,
            delay,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_reception_report_roundtrip() {
        let report = ReceptionReport {
            ssrc: 0x902f9e2e,
            fraction_lost: 81,
            total_lost: 92,
            last_sequence_number: 23,
            jitter: 22,
            last_sender_report: 28,
            delay: 36,
        };

        let data = report.marshal().expect("marshal");
        assert_eq!(data.len(), RECEPTION_REPORT_LENGTH);

        let decoded = ReceptionReport::unmarshal(&mut data.clone()).expect("unmarshal");
        assert_eq!(decoded, report);
    }

    #[test]
    fn test_reception_report_total_lost_limit() {
        let report = ReceptionReport {
            total_lost: 1 << 24,
            ..Default::default()
        };

        let err = report.marshal().expect_err("want error");
        assert_eq!(Error::InvalidTotalLost, err);
    }

    #[test]
    fn test_reception_report_too_short() {
        let mut data = Bytes::from_static(&[0x90, 0x2f, 0x9e, 0x2e]);
        let err = ReceptionReport::unmarshal(&mut data).expect_err("want error");
        assert_eq!(Error::PacketTooShort, err);
    }
}
