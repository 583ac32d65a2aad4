use std::fmt;

use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::app_defined::ApplicationDefined;
use crate::compound_packet::CompoundPacket;
use crate::error::Error;
use crate::goodbye::Goodbye;
use crate::header::*;
use crate::legacy::{LegacyFir, LegacyNack};
use crate::payload_feedbacks::full_intra_request::FullIntraRequest;
use crate::payload_feedbacks::picture_loss_indication::PictureLossIndication;
use crate::receiver_report::ReceiverReport;
use crate::sender_report::SenderReport;
use crate::source_description::SourceDescription;
use crate::transport_feedbacks::transport_layer_nack::TransportLayerNack;

type Result<T> = std::result::Result<T, util::Error>;

/// RtcpPacket is the contract every RTCP sub-packet codec implements.
///
/// `header()` carries the sub-packet's wire type and count field;
/// `marshal_size()` (via [`MarshalSize`]) is the exact number of bytes the
/// sub-packet occupies when serialized, header included.
pub trait RtcpPacket: Marshal + fmt::Display + fmt::Debug {
    fn header(&self) -> Header;
    fn destination_ssrc(&self) -> Vec<u32>;
    fn raw_size(&self) -> usize;
}

/// One RTCP sub-packet of a compound message, one variant per registered
/// packet type.
#[derive(Debug, PartialEq, Clone)]
pub enum Packet {
    LegacyFir(LegacyFir),
    LegacyNack(LegacyNack),
    SenderReport(SenderReport),
    ReceiverReport(ReceiverReport),
    SourceDescription(SourceDescription),
    Goodbye(Goodbye),
    ApplicationDefined(ApplicationDefined),
    TransportLayerNack(TransportLayerNack),
    PictureLossIndication(PictureLossIndication),
    FullIntraRequest(FullIntraRequest),
}

impl Packet {
    fn inner(&self) -> &dyn RtcpPacket {
        match self {
            Packet::LegacyFir(p) => p,
            Packet::LegacyNack(p) => p,
            Packet::SenderReport(p) => p,
            Packet::ReceiverReport(p) => p,
            Packet::SourceDescription(p) => p,
            Packet::Goodbye(p) => p,
            Packet::ApplicationDefined(p) => p,
            Packet::TransportLayerNack(p) => p,
            Packet::PictureLossIndication(p) => p,
            Packet::FullIntraRequest(p) => p,
        }
    }

    /// The sub-packet's wire type, fixed at construction.
    pub fn packet_type(&self) -> PacketType {
        self.header().packet_type
    }

    /// The header count field: a report count, a source count or a feedback
    /// message type, depending on the packet type.
    pub fn count(&self) -> u8 {
        self.header().count
    }
}

impl RtcpPacket for Packet {
    fn header(&self) -> Header {
        self.inner().header()
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        self.inner().destination_ssrc()
    }

    fn raw_size(&self) -> usize {
        self.inner().raw_size()
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner())
    }
}

impl MarshalSize for Packet {
    fn marshal_size(&self) -> usize {
        self.inner().marshal_size()
    }
}

impl Marshal for Packet {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        self.inner().marshal_to(buf)
    }
}

/// is_rtcp reports whether `data` looks like the start of an RTCP compound
/// message on an RTP/RTCP-muxed flow. It never allocates and never reads
/// past the buffer.
pub fn is_rtcp(data: &[u8]) -> bool {
    if data.len() < HEADER_LENGTH {
        return false;
    }

    // RFC 5761 mux discriminator: the first octet of RTCP falls in (127, 192)
    if data[0] <= 127 || data[0] >= 192 {
        return false;
    }

    if (data[0] >> VERSION_SHIFT) & VERSION_MASK != RTP_VERSION {
        return false;
    }

    // IANA-assigned RTCP packet type range
    data[1] >= PACKET_TYPE_MIN && data[1] <= PACKET_TYPE_MAX
}

/// parse walks an entire datagram of compound RTCP and returns the typed
/// sub-packets it contains, in wire order.
///
/// A malformed sub-packet invalidates the whole message: no partial result is
/// ever returned. A sub-packet whose type is inside the IANA RTCP range but
/// not registered here (and a registered feedback type carrying an unknown
/// FMT) is skipped by its declared length instead of failing, so one unknown
/// report cannot break the rest of the compound message.
pub fn parse(data: &[u8]) -> Result<CompoundPacket> {
    if !is_rtcp(data) {
        return Err(Error::NotRtcp.into());
    }

    let mut packets = vec![];
    let mut remaining = data;

    while remaining.len() >= HEADER_LENGTH {
        let header = Header::unmarshal(&mut &remaining[..HEADER_LENGTH])?;

        if header.length == 0 {
            return Err(Error::UnsupportedLength.into());
        }

        let sub_len = (header.length as usize + 1) * 4;
        if sub_len > remaining.len() {
            return Err(Error::PacketTooShort.into());
        }

        if let Some(packet) = decode_sub_packet(&header, &remaining[..sub_len])? {
            packets.push(packet);
        }
        remaining = &remaining[sub_len..];
    }

    if !remaining.is_empty() {
        return Err(Error::TrailingGarbage.into());
    }

    Ok(CompoundPacket(packets))
}

/// decode_sub_packet dispatches one `sub_len`-byte slice (header included) to
/// the codec registered for its packet type. `Ok(None)` means the sub-packet
/// was well-formed but is not decoded by this crate.
fn decode_sub_packet(header: &Header, raw_packet: &[u8]) -> Result<Option<Packet>> {
    let mut buf = raw_packet;

    let packet = match header.packet_type {
        PacketType::Fir => Some(Packet::LegacyFir(LegacyFir::unmarshal(&mut buf)?)),
        PacketType::Nack => Some(Packet::LegacyNack(LegacyNack::unmarshal(&mut buf)?)),
        PacketType::SenderReport => {
            Some(Packet::SenderReport(SenderReport::unmarshal(&mut buf)?))
        }
        PacketType::ReceiverReport => {
            Some(Packet::ReceiverReport(ReceiverReport::unmarshal(&mut buf)?))
        }
        PacketType::SourceDescription => Some(Packet::SourceDescription(
            SourceDescription::unmarshal(&mut buf)?,
        )),
        PacketType::Goodbye => Some(Packet::Goodbye(Goodbye::unmarshal(&mut buf)?)),
        PacketType::ApplicationDefined => Some(Packet::ApplicationDefined(
            ApplicationDefined::unmarshal(&mut buf)?,
        )),

        PacketType::TransportSpecificFeedback => match header.count {
            FORMAT_TLN => Some(Packet::TransportLayerNack(TransportLayerNack::unmarshal(
                &mut buf,
            )?)),
            _ => None,
        },
        PacketType::PayloadSpecificFeedback => match header.count {
            FORMAT_PLI => Some(Packet::PictureLossIndication(
                PictureLossIndication::unmarshal(&mut buf)?,
            )),
            FORMAT_FIR => Some(Packet::FullIntraRequest(FullIntraRequest::unmarshal(
                &mut buf,
            )?)),
            _ => None,
        },

        PacketType::Unsupported(pt) => {
            if pt < PACKET_TYPE_MIN || pt > PACKET_TYPE_MAX {
                return Err(Error::InvalidPacketType.into());
            }
            None
        }
    };

    Ok(packet)
}

#[cfg(test)]
mod test {
    use bytes::Bytes;

    use super::*;
    use crate::reception_report::ReceptionReport;
    use crate::source_description::{
        SdesType, SourceDescriptionChunk, SourceDescriptionItem,
    };

    #[test]
    fn test_is_rtcp() {
        let tests: Vec<(&str, &[u8], bool)> = vec![
            ("empty", &[], false),
            ("three bytes", &[0x81, 0xc9, 0x00], false),
            (
                "valid sr header",
                &[0x81, 0xc8, 0x00, 0x06], // v=2, count=1, SR
                true,
            ),
            (
                "first byte too low",
                &[0x7f, 0xc8, 0x00, 0x06], // below the mux range
                false,
            ),
            (
                "first byte too high",
                &[0xc0, 0xc8, 0x00, 0x06], // at/above 192
                false,
            ),
            (
                "rtp packet",
                &[0x80, 0x60, 0x00, 0x01], // v=2 but payload type 96
                false,
            ),
            (
                "packet type above rtcp range",
                &[0x81, 0xe0, 0x00, 0x06], // PT=224
                false,
            ),
            (
                "unregistered but in range",
                &[0x81, 0xd2, 0x00, 0x06], // PT=210
                true,
            ),
        ];

        for (name, data, want) in tests {
            assert_eq!(is_rtcp(data), want, "is_rtcp {name}");
        }
    }

    #[test]
    fn test_parse_single_sender_report() {
        let data = Bytes::from_static(&[
            0x80, 0xc8, 0x00, 0x06, // v=2, p=0, count=0, SR, len=6
            0x90, 0x2f, 0x9e, 0x2e, // ssrc=0x902f9e2e
            0xda, 0x8b, 0xd1, 0xfc, // ntp=0xda8bd1fcdddda05a
            0xdd, 0xdd, 0xa0, 0x5a, //
            0xaa, 0xf4, 0xed, 0xd5, // rtp=0xaaf4edd5
            0x00, 0x00, 0x07, 0x27, // packetCount=1831
            0x00, 0x00, 0x05, 0x70, // octetCount=1392
        ]);

        let compound = parse(&data).expect("parse");
        assert_eq!(compound.0.len(), 1);
        assert_eq!(compound.0[0].packet_type(), PacketType::SenderReport);
        assert_eq!(compound.0[0].marshal_size(), 28);
    }

    #[test]
    fn test_parse_compound() {
        let mut data = vec![];
        data.extend_from_slice(&[
            // Receiver Report (offset=0)
            0x81, 0xc9, 0x00, 0x07, // v=2, p=0, count=1, RR, len=7
            0x90, 0x2f, 0x9e, 0x2e, // ssrc=0x902f9e2e
            0xbc, 0x5e, 0x9a, 0x40, // ssrc=0xbc5e9a40
            0x00, 0x00, 0x00, 0x00, // fracLost=0, totalLost=0
            0x00, 0x00, 0x46, 0xe1, // lastSeq=0x46e1
            0x00, 0x00, 0x01, 0x11, // jitter=273
            0x09, 0xf3, 0x64, 0x32, // lsr=0x9f36432
            0x00, 0x02, 0x4a, 0x79, // delay=150137
            // Source Description (offset=32)
            0x81, 0xca, 0x00, 0x02, // v=2, p=0, count=1, SDES, len=2
            0x90, 0x2f, 0x9e, 0x2e, // ssrc=0x902f9e2e
            0x01, 0x01, 0x41, 0x00, // CNAME, len=1, content=A + END
            // Goodbye (offset=44)
            0x81, 0xcb, 0x00, 0x01, // v=2, p=0, count=1, BYE, len=1
            0x90, 0x2f, 0x9e, 0x2e, // source=0x902f9e2e
            // Picture Loss Indication (offset=52)
            0x81, 0xce, 0x00, 0x02, // v=2, p=0, fmt=1, PSFB, len=2
            0x90, 0x2f, 0x9e, 0x2e, // sender=0x902f9e2e
            0x90, 0x2f, 0x9e, 0x2e, // media=0x902f9e2e
            // Transport Layer Nack (offset=64)
            0x81, 0xcd, 0x00, 0x03, // v=2, p=0, fmt=1, RTPFB, len=3
            0x90, 0x2f, 0x9e, 0x2e, // sender=0x902f9e2e
            0x90, 0x2f, 0x9e, 0x2e, // media=0x902f9e2e
            0x00, 0x01, 0xaa, 0xaa, // nack 0x0001 aaaa
        ]);

        let compound = parse(&data).expect("parse");

        let expected = vec![
            Packet::ReceiverReport(ReceiverReport {
                ssrc: 0x902f9e2e,
                reports: vec![ReceptionReport {
                    ssrc: 0xbc5e9a40,
                    fraction_lost: 0,
                    total_lost: 0,
                    last_sequence_number: 0x46e1,
                    jitter: 273,
                    last_sender_report: 0x9f36432,
                    delay: 150137,
                }],
                ..Default::default()
            }),
            Packet::SourceDescription(SourceDescription {
                chunks: vec![SourceDescriptionChunk {
                    source: 0x902f9e2e,
                    items: vec![SourceDescriptionItem {
                        sdes_type: SdesType::SdesCname,
                        text: Bytes::from_static(b"A"),
                    }],
                }],
            }),
            Packet::Goodbye(Goodbye {
                sources: vec![0x902f9e2e],
                ..Default::default()
            }),
            Packet::PictureLossIndication(PictureLossIndication {
                sender_ssrc: 0x902f9e2e,
                media_ssrc: 0x902f9e2e,
            }),
            Packet::TransportLayerNack(TransportLayerNack {
                sender_ssrc: 0x902f9e2e,
                media_ssrc: 0x902f9e2e,
                nacks: vec![crate::transport_feedbacks::transport_layer_nack::NackPair {
                    packet_id: 1,
                    lost_packets: 0xaaaa,
                }],
            }),
        ];

        assert_eq!(compound.0, expected);

        // wire order survives a whole-chain serialize
        let marshaled = compound.marshal().expect("marshal");
        assert_eq!(&marshaled[..], &data[..]);

        // truncating or mutating the buffer must fail, never panic
        for cut in 1..data.len() {
            let _ = parse(&data[..cut]);
        }
        for i in 0..data.len() {
            let mut mutated = data.clone();
            mutated[i] ^= 0xff;
            let _ = parse(&mutated);
        }
        data.truncate(0);
        let err = parse(&data).expect_err("want error");
        assert_eq!(Error::NotRtcp, err);
    }

    #[test]
    fn test_parse_rejects_overlong_sub_packet() {
        let data = Bytes::from_static(&[
            // Goodbye claiming 101 words
            0x81, 0xcb, 0x00, 0x64, // v=2, p=0, count=1, BYE, len=100
            0x90, 0x2f, 0x9e, 0x2e, // source=0x902f9e2e
        ]);

        let err = parse(&data).expect_err("want error");
        assert_eq!(Error::PacketTooShort, err);
    }

    #[test]
    fn test_parse_rejects_second_overlong_sub_packet() {
        let data = Bytes::from_static(&[
            // well-formed BYE
            0x81, 0xcb, 0x00, 0x01, // v=2, p=0, count=1, BYE, len=1
            0x90, 0x2f, 0x9e, 0x2e, // source=0x902f9e2e
            // second BYE overruns the buffer
            0x81, 0xcb, 0x00, 0x04, // v=2, p=0, count=1, BYE, len=4
            0x90, 0x2f, 0x9e, 0x2e, // source=0x902f9e2e
        ]);

        let err = parse(&data).expect_err("want error");
        assert_eq!(Error::PacketTooShort, err);
    }

    #[test]
    fn test_parse_rejects_zero_length_sub_packet() {
        let data = Bytes::from_static(&[
            // BYE with a zero length field
            0x80, 0xcb, 0x00, 0x00, // v=2, p=0, count=0, BYE, len=0
        ]);

        let err = parse(&data).expect_err("want error");
        assert_eq!(Error::UnsupportedLength, err);
    }

    #[test]
    fn test_parse_rejects_short_buffers() {
        let err = parse(&[]).expect_err("want error");
        assert_eq!(Error::NotRtcp, err);

        let err = parse(&[0x81, 0xc9, 0x00]).expect_err("want error");
        assert_eq!(Error::NotRtcp, err);
    }

    #[test]
    fn test_parse_rejects_trailing_garbage() {
        let data = Bytes::from_static(&[
            0x81, 0xcb, 0x00, 0x01, // v=2, p=0, count=1, BYE, len=1
            0x90, 0x2f, 0x9e, 0x2e, // source=0x902f9e2e
            0x81, 0xcb, // half a header
        ]);

        let err = parse(&data).expect_err("want error");
        assert_eq!(Error::TrailingGarbage, err);
    }

    #[test]
    fn test_parse_skips_unregistered_types() {
        let data = Bytes::from_static(&[
            // XR (PT=207), not decoded by this crate
            0x80, 0xcf, 0x00, 0x02, // v=2, p=0, count=0, PT=207, len=2
            0x90, 0x2f, 0x9e, 0x2e, // ssrc
            0x00, 0x00, 0x00, 0x00, //
            // PT=210, unregistered
            0x80, 0xd2, 0x00, 0x01, // v=2, p=0, count=0, PT=210, len=1
            0xde, 0xad, 0xbe, 0xef, //
            // well-formed BYE afterwards must still decode
            0x81, 0xcb, 0x00, 0x01, // v=2, p=0, count=1, BYE, len=1
            0x90, 0x2f, 0x9e, 0x2e, // source=0x902f9e2e
        ]);

        let compound = parse(&data).expect("parse");
        assert_eq!(compound.0.len(), 1);
        assert_eq!(
            compound.0[0],
            Packet::Goodbye(Goodbye {
                sources: vec![0x902f9e2e],
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_parse_skips_unknown_feedback_formats() {
        let data = Bytes::from_static(&[
            // RTPFB with FMT=15 (transport-cc), not decoded by this crate
            0x8f, 0xcd, 0x00, 0x04, // v=2, p=0, fmt=15, RTPFB, len=4
            0x90, 0x2f, 0x9e, 0x2e, // sender
            0x90, 0x2f, 0x9e, 0x2e, // media
            0x00, 0x01, 0x00, 0x00, //
            0x00, 0x00, 0x00, 0x00, //
            // PSFB with FMT=15 (REMB), not decoded by this crate
            0x8f, 0xce, 0x00, 0x02, // v=2, p=0, fmt=15, PSFB, len=2
            0x90, 0x2f, 0x9e, 0x2e, // sender
            0x00, 0x00, 0x00, 0x00, // media
            // well-formed PLI afterwards must still decode
            0x81, 0xce, 0x00, 0x02, // v=2, p=0, fmt=1, PSFB, len=2
            0x90, 0x2f, 0x9e, 0x2e, // sender
            0x90, 0x2f, 0x9e, 0x2e, // media
        ]);

        let compound = parse(&data).expect("parse");
        assert_eq!(compound.0.len(), 1);
        assert_eq!(
            compound.0[0],
            Packet::PictureLossIndication(PictureLossIndication {
                sender_ssrc: 0x902f9e2e,
                media_ssrc: 0x902f9e2e,
            })
        );
    }

    #[test]
    fn test_parse_rejects_type_outside_rtcp_range() {
        let data = Bytes::from_static(&[
            0x81, 0xcb, 0x00, 0x01, // v=2, p=0, count=1, BYE, len=1
            0x90, 0x2f, 0x9e, 0x2e, // source=0x902f9e2e
            // second sub-packet claims PT=224, outside [192, 223]
            0x80, 0xe0, 0x00, 0x01, // v=2, p=0, count=0, PT=224, len=1
            0xde, 0xad, 0xbe, 0xef, //
        ]);

        let err = parse(&data).expect_err("want error");
        assert_eq!(Error::InvalidPacketType, err);
    }

    #[test]
    fn test_parse_all_skipped_is_ok() {
        let data = Bytes::from_static(&[
            0x80, 0xd2, 0x00, 0x01, // v=2, p=0, count=0, PT=210, len=1
            0xde, 0xad, 0xbe, 0xef, //
        ]);

        let compound = parse(&data).expect("parse");
        assert!(compound.0.is_empty());
    }

    #[test]
    fn test_parse_sub_decode_failure_aborts() {
        let data = Bytes::from_static(&[
            // SR claiming one report block but carrying none
            0x81, 0xc8, 0x00, 0x06, // v=2, p=0, count=1, SR, len=6
            0x90, 0x2f, 0x9e, 0x2e, // ssrc=0x902f9e2e
            0xda, 0x8b, 0xd1, 0xfc, //
            0xdd, 0xdd, 0xa0, 0x5a, //
            0xaa, 0xf4, 0xed, 0xd5, //
            0x00, 0x00, 0x07, 0x27, //
            0x00, 0x00, 0x05, 0x70, //
            // well-formed BYE afterwards is discarded with the rest
            0x81, 0xcb, 0x00, 0x01, // v=2, p=0, count=1, BYE, len=1
            0x90, 0x2f, 0x9e, 0x2e, // source=0x902f9e2e
        ]);

        let err = parse(&data).expect_err("want error");
        assert_eq!(Error::PacketTooShort, err);
    }

    #[test]
    fn test_packet_accessors() {
        let packet = Packet::ReceiverReport(ReceiverReport {
            ssrc: 0x902f9e2e,
            reports: vec![ReceptionReport::default()],
            ..Default::default()
        });

        assert_eq!(packet.packet_type(), PacketType::ReceiverReport);
        assert_eq!(packet.count(), 1);
        assert_eq!(packet.marshal_size(), 32);
        assert_eq!(packet.destination_ssrc(), vec![0]);
    }
}
