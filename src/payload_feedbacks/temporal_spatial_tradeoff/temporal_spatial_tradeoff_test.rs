use bytes::Bytes;

use super::*;

#[test]
fn test_tst_item_unmarshal() {
    let tests = vec![
        (
            "valid",
            Bytes::from_static(&[
                0x00, 0x00, 0x00, 0x00, // ssrc=0x0
                0x08, // seq=8
                0x00, 0x00, 0x08, // reserved | index=1
            ]),
            TstItem {
                ssrc: 0,
                sequence_number: 8,
                index: 1,
            },
            None,
        ),
        (
            "reserved bits ignored",
            Bytes::from_static(&[
                0x12, 0x34, 0x56, 0x78, // ssrc=0x12345678
                0xff, // seq=255
                0xff, 0xff, 0xff, // reserved set | index=31
            ]),
            TstItem {
                ssrc: 0x12345678,
                sequence_number: 255,
                index: 31,
            },
            None,
        ),
        (
            "packet too short",
            Bytes::from_static(&[0x00, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00]),
            TstItem::default(),
            Some(Error::PacketTooShort),
        ),
    ];

    for (name, mut data, want, want_error) in tests {
        let got = TstItem::unmarshal(&mut data);

        assert_eq!(
            got.is_err(),
            want_error.is_some(),
            "Unmarshal {name}: err = {got:?}, want {want_error:?}"
        );

        if let Some(err) = want_error {
            let got_err = got.err().unwrap();
            assert_eq!(
                err, got_err,
                "Unmarshal {name}: err = {got_err:?}, want {err:?}",
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
fn test_tst_item_marshal() {
    // Reserved bits are cleared on the way out.
    let mut data = Bytes::from_static(&[0x12, 0x34, 0x56, 0x78, 0xff, 0xff, 0xff, 0xff]);
    let item = TstItem::unmarshal(&mut data).unwrap();

    let got = item.marshal().unwrap();
    assert_eq!(
        got,
        Bytes::from_static(&[0x12, 0x34, 0x56, 0x78, 0xff, 0x00, 0x00, 0xf8])
    );

    let mut short = [0u8; TST_ITEM_LENGTH - 1];
    let got = item.marshal_to(&mut short);
    assert_eq!(Error::BufferTooShort, got.unwrap_err());
}

#[test]
fn test_tst_item_new() {
    let item = TstItem::new(0x4bc4fcb4, 3, 31).unwrap();
    assert_eq!(item.ssrc(), 0x4bc4fcb4);
    assert_eq!(item.sequence_number(), 3);
    assert_eq!(item.index(), 31);

    assert_eq!(TstItem::new(0x4bc4fcb4, 3, 32), Err(Error::InvalidTstIndex));
}

#[test]
fn test_temporal_spatial_tradeoff_notification_unmarshal() {
    let tests = vec![
        (
            "valid",
            Bytes::from_static(&[
                0x86, 0xce, 0x00, 0x06, // v=2, p=0, FMT=6, PSFB, len=6
                0x00, 0x00, 0x00, 0x01, // sender=0x1
                0x00, 0x00, 0x00, 0x00, // media=0x0
                0x4b, 0xc4, 0xfc, 0xb4, // ssrc=0x4bc4fcb4
                0x08, 0x00, 0x00, 0x08, // seq=8, index=1
                0x12, 0x34, 0x56, 0x78, // ssrc=0x12345678
                0x09, 0x00, 0x00, 0xf8, // seq=9, index=31
            ]),
            TemporalSpatialTradeoffNotification {
                sender_ssrc: 1,
                media_ssrc: 0,
                items: vec![
                    TstItem {
                        ssrc: 0x4bc4fcb4,
                        sequence_number: 8,
                        index: 1,
                    },
                    TstItem {
                        ssrc: 0x12345678,
                        sequence_number: 9,
                        index: 31,
                    },
                ],
            },
            None,
        ),
        (
            "no items",
            Bytes::from_static(&[
                0x86, 0xce, 0x00, 0x02, // v=2, p=0, FMT=6, PSFB, len=2
                0x00, 0x00, 0x00, 0x01, // sender=0x1
                0x00, 0x00, 0x00, 0x00, // media=0x0
            ]),
            TemporalSpatialTradeoffNotification {
                sender_ssrc: 1,
                media_ssrc: 0,
                items: vec![],
            },
            None,
        ),
        (
            "partial item",
            Bytes::from_static(&[
                0x86, 0xce, 0x00, 0x03, // v=2, p=0, FMT=6, PSFB, len=3
                0x00, 0x00, 0x00, 0x01, // sender=0x1
                0x00, 0x00, 0x00, 0x00, // media=0x0
                0x4b, 0xc4, 0xfc, 0xb4, // ssrc=0x4bc4fcb4
            ]),
            TemporalSpatialTradeoffNotification::default(),
            Some(Error::PacketTooShort),
        ),
        (
            "truncated",
            Bytes::from_static(&[
                0x86, 0xce, 0x00, 0x04, // v=2, p=0, FMT=6, PSFB, len=4
                0x00, 0x00, 0x00, 0x01, // sender=0x1
                0x00, 0x00, 0x00, 0x00, // media=0x0
                0x4b, 0xc4, 0xfc, 0xb4, // ssrc=0x4bc4fcb4
                0x08, 0x00, 0x00, // missing last octet
            ]),
            TemporalSpatialTradeoffNotification::default(),
            Some(Error::PacketTooShort),
        ),
        (
            "wrong fmt",
            Bytes::from_static(&[
                0x85, 0xce, 0x00, 0x04, // v=2, p=0, FMT=5, PSFB, len=4
                0x00, 0x00, 0x00, 0x01, // sender=0x1
                0x00, 0x00, 0x00, 0x00, // media=0x0
                0x4b, 0xc4, 0xfc, 0xb4, // ssrc=0x4bc4fcb4
                0x08, 0x00, 0x00, 0x08, // seq=8, index=1
            ]),
            TemporalSpatialTradeoffNotification::default(),
            Some(Error::WrongType),
        ),
        (
            "wrong type",
            Bytes::from_static(&[
                0x86, 0xcd, 0x00, 0x04, // v=2, p=0, FMT=6, TSFB, len=4
                0x00, 0x00, 0x00, 0x01, // sender=0x1
                0x00, 0x00, 0x00, 0x00, // media=0x0
                0x4b, 0xc4, 0xfc, 0xb4, // ssrc=0x4bc4fcb4
                0x08, 0x00, 0x00, 0x08, // seq=8, index=1
            ]),
            TemporalSpatialTradeoffNotification::default(),
            Some(Error::WrongType),
        ),
    ];

    for (name, mut data, want, want_error) in tests {
        let got = TemporalSpatialTradeoffNotification::unmarshal(&mut data);

        assert_eq!(
            got.is_err(),
            want_error.is_some(),
            "Unmarshal {name}: err = {got:?}, want {want_error:?}"
        );

        if let Some(err) = want_error {
            let got_err = got.err().unwrap();
            assert_eq!(
                err, got_err,
                "Unmarshal {name}: err = {got_err:?}, want {err:?}",
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
fn test_temporal_spatial_tradeoff_request_roundtrip() {
    let want = TemporalSpatialTradeoffRequest {
        sender_ssrc: 0x902f9e2e,
        media_ssrc: 0,
        items: vec![
            TstItem::new(0xbc5e9a40, 1, 0).unwrap(),
            TstItem::new(0xbc5e9a41, 2, 17).unwrap(),
        ],
    };

    let mut data = want.marshal().unwrap();
    assert_eq!(data.len(), want.marshal_size());
    assert_eq!(data[0], 0x85);
    assert_eq!(data[1], 206);

    let got = TemporalSpatialTradeoffRequest::unmarshal(&mut data).unwrap();
    assert_eq!(got, want);
    assert_eq!(got.destination_ssrc(), vec![0xbc5e9a40, 0xbc5e9a41]);
    assert_eq!(got.header().length, 6);
}

#[test]
fn test_temporal_spatial_tradeoff_display() {
    let tstn = TemporalSpatialTradeoffNotification {
        sender_ssrc: 0x1,
        media_ssrc: 0,
        items: vec![TstItem::new(0xab, 8, 1).unwrap()],
    };

    assert_eq!(
        tstn.to_string(),
        "TemporalSpatialTradeoffNotification 1 0 (ab 8 1)"
    );
}
