use bytes::Bytes;

use super::*;

#[test]
fn test_vbcm_item_unmarshal() {
    let tests = vec![
        (
            "valid",
            Bytes::from_static(&[
                0x00, 0x00, 0x00, 0x00, // ssrc=0x0
                0x08, // seq=8
                0x02, // payload type=1 | zero
                0x00, 0x01, // length=1
                0x01, // VBCM octet string
                0x00, 0x00, 0x00, // padding
            ]),
            VbcmItem {
                ssrc: 0,
                sequence_number: 8,
                payload_type: 1,
                value: Bytes::from_static(&[0x01]),
            },
            None,
        ),
        (
            "aligned value",
            Bytes::from_static(&[
                0x12, 0x34, 0x56, 0x78, // ssrc=0x12345678
                0x01, // seq=1
                0xfe, // payload type=127 | zero
                0x00, 0x04, // length=4
                0xde, 0xad, 0xbe, 0xef, // VBCM octet string
            ]),
            VbcmItem {
                ssrc: 0x12345678,
                sequence_number: 1,
                payload_type: 127,
                value: Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
            },
            None,
        ),
        (
            "empty value",
            Bytes::from_static(&[
                0x12, 0x34, 0x56, 0x78, // ssrc=0x12345678
                0x01, // seq=1
                0x61, // payload type=48 | reserved bit set
                0x00, 0x00, // length=0
            ]),
            VbcmItem {
                ssrc: 0x12345678,
                sequence_number: 1,
                payload_type: 48,
                value: Bytes::new(),
            },
            None,
        ),
        (
            "header too short",
            Bytes::from_static(&[0x00, 0x00, 0x00, 0x00, 0x08, 0x02, 0x00]),
            VbcmItem::default(),
            Some(Error::PacketTooShort),
        ),
        (
            "length beyond buffer",
            Bytes::from_static(&[
                0x00, 0x00, 0x00, 0x00, // ssrc=0x0
                0x08, // seq=8
                0x02, // payload type=1 | zero
                0x00, 0x09, // length=9
                0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
            ]),
            VbcmItem::default(),
            Some(Error::PacketTooShort),
        ),
        (
            "missing padding",
            Bytes::from_static(&[
                0x00, 0x00, 0x00, 0x00, // ssrc=0x0
                0x08, // seq=8
                0x02, // payload type=1 | zero
                0x00, 0x01, // length=1
                0x01, // VBCM octet string
                0x00, 0x00, // padding, one octet short
            ]),
            VbcmItem::default(),
            Some(Error::PacketTooShort),
        ),
    ];

    for (name, mut data, want, want_error) in tests {
        let got = VbcmItem::unmarshal(&mut data);

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
            assert!(!data.has_remaining(), "Unmarshal {name}: leftover octets");
        }
    }
}

#[test]
fn test_vbcm_item_marshal_padding() {
    let item = VbcmItem::new(0x4bc4fcb4, 7, 96, Bytes::from_static(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee]))
        .unwrap();
    assert_eq!(item.length(), 5);
    assert_eq!(item.marshal_size(), 16);

    let mut buf = [0xffu8; 16];
    let n = item.marshal_to(&mut buf).unwrap();
    assert_eq!(n, 16);
    assert_eq!(
        buf,
        [
            0x4b, 0xc4, 0xfc, 0xb4, // ssrc
            0x07, // seq
            0xc0, // payload type=96 | zero
            0x00, 0x05, // length=5
            0xaa, 0xbb, 0xcc, 0xdd, 0xee, // value
            0x00, 0x00, 0x00, // padding
        ]
    );

    let mut data = Bytes::copy_from_slice(&buf);
    let got = VbcmItem::unmarshal(&mut data).unwrap();
    assert_eq!(got.value(), &Bytes::from_static(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee]));

    let mut short = [0u8; 15];
    let got = item.marshal_to(&mut short);
    assert_eq!(Error::BufferTooShort, got.unwrap_err());
}

#[test]
fn test_vbcm_item_new() {
    let got = VbcmItem::new(1, 1, 128, Bytes::new());
    assert_eq!(got, Err(Error::InvalidPayloadType));

    let got = VbcmItem::new(1, 1, 1, Bytes::from(vec![0u8; u16::MAX as usize + 1]));
    assert_eq!(got, Err(Error::VbcmValueTooLong));

    let item = VbcmItem::new(1, 2, 3, Bytes::from_static(b"abc")).unwrap();
    assert_eq!(item.ssrc(), 1);
    assert_eq!(item.sequence_number(), 2);
    assert_eq!(item.payload_type(), 3);
    assert_eq!(item.length(), 3);
    assert_eq!(item.value(), &Bytes::from_static(b"abc"));
}

#[test]
fn test_video_back_channel_message_unmarshal() {
    let mut data = Bytes::from_static(&[
        0x87, 0xce, 0x00, 0x08, // v=2, p=0, FMT=7, PSFB, len=8
        0x00, 0x00, 0x00, 0x01, // sender=0x1
        0x00, 0x00, 0x00, 0x00, // media=0x0
        0x00, 0x00, 0x00, 0x00, // ssrc=0x0
        0x08, 0x02, 0x00, 0x01, // seq=8, payload type=1, length=1
        0x01, 0x00, 0x00, 0x00, // value, padding
        0x4b, 0xc4, 0xfc, 0xb4, // ssrc=0x4bc4fcb4
        0x09, 0x04, 0x00, 0x02, // seq=9, payload type=2, length=2
        0xab, 0xcd, 0x00, 0x00, // value, padding
    ]);

    let want = VideoBackChannelMessage {
        sender_ssrc: 1,
        media_ssrc: 0,
        items: vec![
            VbcmItem::new(0, 8, 1, Bytes::from_static(&[0x01])).unwrap(),
            VbcmItem::new(0x4bc4fcb4, 9, 2, Bytes::from_static(&[0xab, 0xcd])).unwrap(),
        ],
    };

    let raw = data.clone();
    let got = VideoBackChannelMessage::unmarshal(&mut data).unwrap();
    assert_eq!(got, want);
    assert_eq!(got.destination_ssrc(), vec![0, 0x4bc4fcb4]);

    let output = got.marshal().unwrap();
    assert_eq!(output, raw);
}

#[test]
fn test_video_back_channel_message_wrong_fmt() {
    let mut data = Bytes::from_static(&[
        0x86, 0xce, 0x00, 0x04, // v=2, p=0, FMT=6, PSFB, len=4
        0x00, 0x00, 0x00, 0x01, // sender=0x1
        0x00, 0x00, 0x00, 0x00, // media=0x0
        0x00, 0x00, 0x00, 0x00, // ssrc=0x0
        0x08, 0x02, 0x00, 0x00, // seq=8, payload type=1, length=0
    ]);

    let got = VideoBackChannelMessage::unmarshal(&mut data);
    assert_eq!(Error::WrongType, got.unwrap_err());
}
