#[cfg(test)]
mod video_back_channel_message_test;

use std::fmt;

use bytes::{Buf, BufMut, Bytes};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use super::{marshal_items, unmarshal_items};
use crate::error::Error;
use crate::header::*;
use crate::packet::*;
use crate::util::*;

type Result<T> = std::result::Result<T, util::Error>;

pub const VBCM_ITEM_HEADER_LENGTH: usize = 8;

const PAYLOAD_TYPE_OFFSET: usize = 0;
const PAYLOAD_TYPE_WIDTH: usize = 7;
const PAYLOAD_TYPE_MAX: u8 = (1 << PAYLOAD_TYPE_WIDTH) - 1;

/// VbcmItem is a single FCI entry of a VBCM message, RFC 5104 4.3.4.1.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                              SSRC                             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Seq nr.       | Payload Type|0|           Length              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                    VBCM Octet String....      |    Padding    |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The payload type occupies the seven high bits of its octet, as deployed senders
/// write it. The octet string is copied out of the packet on unmarshal and the
/// padding that follows it is dropped.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct VbcmItem {
    ssrc: u32,
    sequence_number: u8,
    payload_type: u8,
    value: Bytes,
}

impl VbcmItem {
    pub fn new(
        ssrc: u32,
        sequence_number: u8,
        payload_type: u8,
        value: Bytes,
    ) -> crate::Result<Self> {
        if payload_type > PAYLOAD_TYPE_MAX {
            return Err(Error::InvalidPayloadType);
        }
        if value.len() > u16::MAX as usize {
            return Err(Error::VbcmValueTooLong);
        }

        Ok(VbcmItem {
            ssrc,
            sequence_number,
            payload_type,
            value,
        })
    }

    /// SSRC of the media sender the message is addressed to
    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    pub fn sequence_number(&self) -> u8 {
        self.sequence_number
    }

    /// RTP payload type the octet string applies to
    pub fn payload_type(&self) -> u8 {
        self.payload_type
    }

    /// length of the octet string, padding excluded
    pub fn length(&self) -> u16 {
        self.value.len() as u16
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }

    fn raw_size(&self) -> usize {
        VBCM_ITEM_HEADER_LENGTH + self.value.len()
    }
}

impl fmt::Display for VbcmItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:x} {} {} {:?})",
            self.ssrc, self.sequence_number, self.payload_type, self.value
        )
    }
}

impl MarshalSize for VbcmItem {
    fn marshal_size(&self) -> usize {
        let l = self.raw_size();
        // align to 32-bit boundary
        l + get_padding_size(l)
    }
}

impl Marshal for VbcmItem {
    /// marshal_to writes the item and the zero padding after its octet string
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::BufferTooShort.into());
        }

        let mut payload_type = [0u8; 1];
        set_nbits(
            &mut payload_type,
            PAYLOAD_TYPE_OFFSET,
            PAYLOAD_TYPE_WIDTH,
            self.payload_type as u32,
        )?;

        buf.put_u32(self.ssrc);
        buf.put_u8(self.sequence_number);
        buf.put_slice(&payload_type);
        buf.put_u16(self.length());
        buf.put_slice(&self.value);

        put_padding(buf, self.raw_size());

        Ok(self.marshal_size())
    }
}

impl Unmarshal for VbcmItem {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if raw_packet.remaining() < VBCM_ITEM_HEADER_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        let ssrc = raw_packet.get_u32();
        let sequence_number = raw_packet.get_u8();
        let payload_type = get_nbits(
            &[raw_packet.get_u8()],
            PAYLOAD_TYPE_OFFSET,
            PAYLOAD_TYPE_WIDTH,
        )? as u8;

        let length = raw_packet.get_u16() as usize;
        let padding = get_padding_size(VBCM_ITEM_HEADER_LENGTH + length);
        if raw_packet.remaining() < length + padding {
            return Err(Error::PacketTooShort.into());
        }

        let mut value = vec![0u8; length];
        raw_packet.copy_to_slice(&mut value);
        raw_packet.advance(padding);

        Ok(VbcmItem {
            ssrc,
            sequence_number,
            payload_type,
            value: Bytes::from(value),
        })
    }
}

/// VideoBackChannelMessage carries codec-specific control messages from a
/// media receiver to a media sender, RFC 5104 4.3.4.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct VideoBackChannelMessage {
    /// SSRC of sender
    pub sender_ssrc: u32,
    /// SSRC of the media source, unused and set to 0
    pub media_ssrc: u32,

    pub items: Vec<VbcmItem>,
}

impl VideoBackChannelMessage {
    pub(crate) fn unmarshal_body(envelope: &FeedbackHeader, body: &mut Bytes) -> Result<Self> {
        if envelope.fmt() != FORMAT_VBCM {
            return Err(Error::WrongType.into());
        }

        Ok(VideoBackChannelMessage {
            sender_ssrc: envelope.sender_ssrc,
            media_ssrc: envelope.media_ssrc,
            items: unmarshal_items(body)?,
        })
    }
}

impl fmt::Display for VideoBackChannelMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VideoBackChannelMessage {:x} {:x}",
            self.sender_ssrc, self.media_ssrc
        )?;
        for item in &self.items {
            write!(f, " {item}")?;
        }
        Ok(())
    }
}

impl Packet for VideoBackChannelMessage {
    fn header(&self) -> Header {
        Header {
            padding: false,
            count: FORMAT_VBCM,
            packet_type: PacketType::PayloadSpecificFeedback,
            length: ((self.marshal_size() / 4) - 1) as u16,
        }
    }

    fn sender_ssrc(&self) -> u32 {
        self.sender_ssrc
    }

    fn media_ssrc(&self) -> u32 {
        self.media_ssrc
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        self.items.iter().map(|item| item.ssrc).collect()
    }

    fn raw_size(&self) -> usize {
        FEEDBACK_HEADER_LENGTH
            + self
                .items
                .iter()
                .map(|item| item.marshal_size())
                .sum::<usize>()
    }
}

impl MarshalSize for VideoBackChannelMessage {
    fn marshal_size(&self) -> usize {
        // every item is already aligned to 32-bit boundary
        self.raw_size()
    }
}

impl Marshal for VideoBackChannelMessage {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        marshal_items(&self.feedback_header(), &self.items, buf)
    }
}

impl Unmarshal for VideoBackChannelMessage {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let envelope = FeedbackHeader::unmarshal(raw_packet)?;
        let mut body = envelope.read_body(raw_packet)?;
        Self::unmarshal_body(&envelope, &mut body)
    }
}
