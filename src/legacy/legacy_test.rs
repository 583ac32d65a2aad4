use bytes::Bytes;

use super::*;

#[test]
fn test_legacy_fir_unmarshal() {
    let mut data = Bytes::from_static(&[
        0x80, 0xc0, 0x00, 0x01, // v=2, p=0, count=0, FIR, len=1
        0x90, 0x2f, 0x9e, 0x2e, // ssrc=0x902f9e2e
    ]);

    let fir = LegacyFir::unmarshal(&mut data).expect("unmarshal");
    assert_eq!(fir, LegacyFir { ssrc: 0x902f9e2e });
    assert_eq!(fir.header().packet_type, PacketType::Fir);
}

#[test]
fn test_legacy_fir_roundtrip() {
    let fir = LegacyFir { ssrc: 0x4baae1ab };

    let data = fir.marshal().expect("marshal");
    assert_eq!(data.len(), fir.marshal_size());
    assert_eq!(data.len(), (fir.header().length as usize + 1) * 4);

    let decoded = LegacyFir::unmarshal(&mut data.clone()).expect("unmarshal");
    assert_eq!(decoded, fir);
}

#[test]
fn test_legacy_fir_too_short() {
    let mut data = Bytes::from_static(&[0x80, 0xc0, 0x00, 0x01]);
    let err = LegacyFir::unmarshal(&mut data).expect_err("want error");
    assert_eq!(Error::PacketTooShort, err);
}

#[test]
fn test_legacy_nack_unmarshal() {
    let mut data = Bytes::from_static(&[
        0x80, 0xc1, 0x00, 0x02, // v=2, p=0, count=0, NACK, len=2
        0x90, 0x2f, 0x9e, 0x2e, // ssrc=0x902f9e2e
        0x00, 0x2a, 0x00, 0x05, // fsn=42, blp=0b101
    ]);

    let nack = LegacyNack::unmarshal(&mut data).expect("unmarshal");
    assert_eq!(
        nack,
        LegacyNack {
            ssrc: 0x902f9e2e,
            first_sequence_number: 42,
            bitmask: 0x05,
        }
    );
}

#[test]
fn test_legacy_nack_roundtrip() {
    let nack = LegacyNack {
        ssrc: 0x4baae1ab,
        first_sequence_number: 1034,
        bitmask: 0x8001,
    };

    let data = nack.marshal().expect("marshal");
    assert_eq!(data.len(), nack.marshal_size());
    assert_eq!(data.len(), (nack.header().length as usize + 1) * 4);

    let decoded = LegacyNack::unmarshal(&mut data.clone()).expect("unmarshal");
    assert_eq!(decoded, nack);
}

#[test]
fn test_legacy_wrong_type() {
    let mut data = Bytes::from_static(&[
        0x80, 0xc1, 0x00, 0x01, // v=2, p=0, count=0, NACK, len=1
        0x90, 0x2f, 0x9e, 0x2e, // ssrc=0x902f9e2e
    ]);

    let err = LegacyFir::unmarshal(&mut data).expect_err("want error");
    assert_eq!(Error::WrongType, err);
}
