use bytes::{Buf, BufMut};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;

/// RTCP packet types registered with IANA.
/// See: <https://www.iana.org/assignments/rtp-parameters/rtp-parameters.xhtml#rtp-parameters-4>
///
/// `Unsupported` carries a wire value inside the IANA RTCP range that no
/// decoder in this crate claims; `parse` skips such sub-packets by length.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PacketType {
    /// Full intra-frame request, RFC 2032
    Fir,
    /// Negative acknowledgement, RFC 2032
    Nack,
    /// Sender report, RFC 3550, 6.4.1
    SenderReport,
    /// Receiver report, RFC 3550, 6.4.2
    ReceiverReport,
    /// Source description, RFC 3550, 6.5
    SourceDescription,
    /// Goodbye, RFC 3550, 6.6
    Goodbye,
    /// Application-defined, RFC 3550, 6.7
    ApplicationDefined,
    /// Transport layer feedback, RFC 4585, 6.2
    TransportSpecificFeedback,
    /// Payload-specific feedback, RFC 4585, 6.3
    PayloadSpecificFeedback,
    /// Any other value in [192, 223]
    Unsupported(u8),
}

/// Transport and payload-specific feedback messages overload the count field
/// to act as a message type (FMT). The formats this crate decodes are listed
/// here.
pub const FORMAT_TLN: u8 = 1;
pub const FORMAT_PLI: u8 = 1;
pub const FORMAT_FIR: u8 = 4;

/// Lowest wire value the RTCP type range covers (RFC 5761, section 4).
pub const PACKET_TYPE_MIN: u8 = 192;
/// Highest wire value the RTCP type range covers.
pub const PACKET_TYPE_MAX: u8 = 223;

impl PacketType {
    /// The fixed diagnostic label for this packet type.
    pub fn name(&self) -> &'static str {
        match self {
            PacketType::Fir => "FIR",
            PacketType::Nack => "NACK",
            PacketType::SenderReport => "SR",
            PacketType::ReceiverReport => "RR",
            PacketType::SourceDescription => "SDES",
            PacketType::Goodbye => "BYE",
            PacketType::ApplicationDefined => "APP",
            PacketType::TransportSpecificFeedback => "RTPFB",
            PacketType::PayloadSpecificFeedback => "PSFB",
            PacketType::Unsupported(_) => "Unsupported",
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            PacketType::Fir => 192,
            PacketType::Nack => 193,
            PacketType::SenderReport => 200,
            PacketType::ReceiverReport => 201,
            PacketType::SourceDescription => 202,
            PacketType::Goodbye => 203,
            PacketType::ApplicationDefined => 204,
            PacketType::TransportSpecificFeedback => 205,
            PacketType::PayloadSpecificFeedback => 206,
            PacketType::Unsupported(b) => *b,
        }
    }
}

impl std::fmt::Display for PacketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<u8> for PacketType {
    fn from(b: u8) -> Self {
        match b {
            192 => PacketType::Fir,
            193 => PacketType::Nack,
            200 => PacketType::SenderReport,
            201 => PacketType::ReceiverReport,
            202 => PacketType::SourceDescription,
            203 => PacketType::Goodbye,
            204 => PacketType::ApplicationDefined,
            205 => PacketType::TransportSpecificFeedback,
            206 => PacketType::PayloadSpecificFeedback,
            _ => PacketType::Unsupported(b),
        }
    }
}

impl Default for PacketType {
    fn default() -> Self {
        PacketType::Unsupported(0)
    }
}

pub const RTP_VERSION: u8 = 2;
pub const VERSION_SHIFT: u8 = 6;
pub const VERSION_MASK: u8 = 0x3;
pub const PADDING_SHIFT: u8 = 5;
pub const PADDING_MASK: u8 = 0x1;
pub const COUNT_SHIFT: u8 = 0;
pub const COUNT_MASK: u8 = 0x1f;

pub const HEADER_LENGTH: usize = 4;
pub const COUNT_MAX: usize = (1 << 5) - 1;
pub const SSRC_LENGTH: usize = 4;

/// A Header is the common header shared by all RTCP packets.
///
/// The version field is not stored: a header only decodes if it reads 2 on
/// the wire, and it is always written back as 2.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct Header {
    /// If the padding bit is set, this individual RTCP packet contains
    /// some additional padding octets at the end which are not part of
    /// the control information but are included in the length field.
    pub padding: bool,
    /// The number of reception reports, sources contained or FMT in this
    /// packet (depending on the Type).
    pub count: u8,
    /// The RTCP packet type for this packet.
    pub packet_type: PacketType,
    /// The length of this RTCP packet in 32-bit words minus one,
    /// including the header and any padding.
    pub length: u16,
}

impl MarshalSize for Header {
    fn marshal_size(&self) -> usize {
        HEADER_LENGTH
    }
}

impl Marshal for Header {
    /// Encodes the header in binary. Bit fields are assembled with explicit
    /// shifts so the layout is identical on any host byte order.
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize, util::Error> {
        if self.count > COUNT_MASK {
            return Err(Error::InvalidHeader.into());
        }
        if buf.remaining_mut() < HEADER_LENGTH {
            return Err(Error::BufferTooShort.into());
        }

        /*
         *  0                   1                   2                   3
         *  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |V=2|P|    RC   |      PT       |             length            |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         */
        let b0 = (RTP_VERSION << VERSION_SHIFT)
            | ((self.padding as u8) << PADDING_SHIFT)
            | (self.count << COUNT_SHIFT);

        buf.put_u8(b0);
        buf.put_u8(self.packet_type.as_u8());
        buf.put_u16(self.length);

        Ok(HEADER_LENGTH)
    }
}

impl Unmarshal for Header {
    /// Decodes the header from binary.
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self, util::Error>
    where
        Self: Sized,
        B: Buf,
    {
        if raw_packet.remaining() < HEADER_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        let b0 = raw_packet.get_u8();
        let version = (b0 >> VERSION_SHIFT) & VERSION_MASK;
        if version != RTP_VERSION {
            return Err(Error::BadVersion.into());
        }

        let padding = ((b0 >> PADDING_SHIFT) & PADDING_MASK) > 0;
        let count = (b0 >> COUNT_SHIFT) & COUNT_MASK;
        let packet_type = PacketType::from(raw_packet.get_u8());
        let length = raw_packet.get_u16();

        Ok(Header {
            padding,
            count,
            packet_type,
            length,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_header_unmarshal() {
        let tests = vec![
            (
                "valid",
                Bytes::from_static(&[
                    // v=2, p=0, count=1, RR, len=7
                    0x81u8, 0xc9, 0x00, 0x07,
                ]),
                Header {
                    padding: false,
                    count: 1,
                    packet_type: PacketType::ReceiverReport,
                    length: 7,
                },
                None,
            ),
            (
                "padding and unregistered type",
                Bytes::from_static(&[
                    // v=2, p=1, count=1, PT=210, len=7
                    0xa1, 0xd2, 0x00, 0x07,
                ]),
                Header {
                    padding: true,
                    count: 1,
                    packet_type: PacketType::Unsupported(210),
                    length: 7,
                },
                None,
            ),
            (
                "bad version",
                Bytes::from_static(&[
                    // v=0, p=0, count=0, RR, len=4
                    0x00, 0xc9, 0x00, 0x04,
                ]),
                Header::default(),
                Some(Error::BadVersion),
            ),
            (
                "too short",
                Bytes::from_static(&[0x81, 0xc9]),
                Header::default(),
                Some(Error::PacketTooShort),
            ),
        ];

        for (name, data, want, want_error) in tests {
            let buf = &mut data.clone();
            let got = Header::unmarshal(buf);

            assert_eq!(
                got.is_err(),
                want_error.is_some(),
                "Unmarshal {name}: err = {got:?}, want {want_error:?}"
            );

            if let Some(want_error) = want_error {
                let got_err = got.err().unwrap();
                assert_eq!(
                    want_error, got_err,
                    "Unmarshal {name}: err = {got_err:?}, want {want_error:?}",
                );
            } else {
                let actual = got.unwrap();
                assert_eq!(
                    actual, want,
                    "Unmarshal {name}: got {actual:?}, want {want:?}"
                );
            }
        }
    }

    #[test]
    fn test_header_roundtrip() {
        let tests = vec![
            (
                "valid",
                Header {
                    padding: true,
                    count: 31,
                    packet_type: PacketType::SenderReport,
                    length: 4,
                },
                None,
            ),
            (
                "also valid",
                Header {
                    padding: false,
                    count: 28,
                    packet_type: PacketType::ReceiverReport,
                    length: 65535,
                },
                None,
            ),
            (
                "invalid count",
                Header {
                    padding: false,
                    count: 40,
                    packet_type: PacketType::Unsupported(0),
                    length: 0,
                },
                Some(Error::InvalidHeader),
            ),
        ];

        for (name, want, want_error) in tests {
            let got = want.marshal();

            assert_eq!(
                got.is_ok(),
                want_error.is_none(),
                "Marshal {name}: err = {got:?}, want {want_error:?}"
            );

            if let Some(err) = want_error {
                let got_err = got.err().unwrap();
                assert_eq!(
                    err, got_err,
                    "Marshal {name}: err = {got_err:?}, want {err:?}",
                );
            } else {
                let data = got.ok().unwrap();
                let buf = &mut data.clone();
                let actual = Header::unmarshal(buf).unwrap_or_else(|_| panic!("Unmarshal {name}"));

                assert_eq!(
                    actual, want,
                    "{name} round trip: got {actual:?}, want {want:?}"
                )
            }
        }
    }

    #[test]
    fn test_packet_type_name() {
        let tests = vec![
            (PacketType::Fir, "FIR"),
            (PacketType::Nack, "NACK"),
            (PacketType::SenderReport, "SR"),
            (PacketType::ReceiverReport, "RR"),
            (PacketType::SourceDescription, "SDES"),
            (PacketType::Goodbye, "BYE"),
            (PacketType::ApplicationDefined, "APP"),
            (PacketType::TransportSpecificFeedback, "RTPFB"),
            (PacketType::PayloadSpecificFeedback, "PSFB"),
            (PacketType::Unsupported(210), "Unsupported"),
        ];

        for (pt, want) in tests {
            assert_eq!(pt.name(), want);
            assert_eq!(pt.to_string(), want);
            assert_eq!(PacketType::from(pt.as_u8()), pt);
        }
    }
}
