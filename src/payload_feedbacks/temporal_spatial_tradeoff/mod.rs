#[cfg(test)]
mod temporal_spatial_tradeoff_test;

use std::fmt;

use bytes::{Buf, BufMut, Bytes};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use super::{marshal_items, unmarshal_items};
use crate::error::Error;
use crate::header::*;
use crate::packet::*;
use crate::util::*;

type Result<T> = std::result::Result<T, util::Error>;

pub const TST_ITEM_LENGTH: usize = 8;

const INDEX_OFFSET: usize = 16;
const INDEX_WIDTH: usize = 5;
const INDEX_MAX: u8 = (1 << INDEX_WIDTH) - 1;

/// TstItem is a single FCI entry of a TSTR or TSTN message, RFC 5104 4.3.2.1 and 4.3.3.1.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                              SSRC                             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Seq nr.      |  Reserved                       | Index   |Rsv|
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The index sits in the five most significant bits of the last octet, which is
/// where deployed senders put it. Reserved bits are ignored on read and written as zero.
#[derive(Debug, PartialEq, Eq, Default, Clone, Copy)]
pub struct TstItem {
    ssrc: u32,
    sequence_number: u8,
    index: u8,
}

impl TstItem {
    pub fn new(ssrc: u32, sequence_number: u8, index: u8) -> crate::Result<Self> {
        if index > INDEX_MAX {
            return Err(Error::InvalidTstIndex);
        }

        Ok(TstItem {
            ssrc,
            sequence_number,
            index,
        })
    }

    /// SSRC of the media sender the trade-off applies to
    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    pub fn sequence_number(&self) -> u8 {
        self.sequence_number
    }

    /// Trade-off index, 0 favours spatial quality and 31 favours frame rate
    pub fn index(&self) -> u8 {
        self.index
    }
}

impl fmt::Display for TstItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:x} {} {})",
            self.ssrc, self.sequence_number, self.index
        )
    }
}

impl MarshalSize for TstItem {
    fn marshal_size(&self) -> usize {
        TST_ITEM_LENGTH
    }
}

impl Marshal for TstItem {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if buf.remaining_mut() < TST_ITEM_LENGTH {
            return Err(Error::BufferTooShort.into());
        }

        let mut reserved_index = [0u8; 3];
        set_nbits(
            &mut reserved_index,
            INDEX_OFFSET,
            INDEX_WIDTH,
            self.index as u32,
        )?;

        buf.put_u32(self.ssrc);
        buf.put_u8(self.sequence_number);
        buf.put_slice(&reserved_index);

        Ok(TST_ITEM_LENGTH)
    }
}

impl Unmarshal for TstItem {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if raw_packet.remaining() < TST_ITEM_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        let ssrc = raw_packet.get_u32();
        let sequence_number = raw_packet.get_u8();

        let mut reserved_index = [0u8; 3];
        raw_packet.copy_to_slice(&mut reserved_index);
        let index = get_nbits(&reserved_index, INDEX_OFFSET, INDEX_WIDTH)? as u8;

        Ok(TstItem {
            ssrc,
            sequence_number,
            index,
        })
    }
}

fn check_fmt(envelope: &FeedbackHeader, fmt: u8) -> Result<()> {
    if envelope.fmt() != fmt {
        return Err(Error::WrongType.into());
    }
    Ok(())
}

/// TemporalSpatialTradeoffRequest asks a media sender to move its
/// temporal-spatial trade-off to the given index, RFC 5104 4.3.2.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct TemporalSpatialTradeoffRequest {
    /// SSRC of sender
    pub sender_ssrc: u32,
    /// SSRC of the media source, unused and set to 0
    pub media_ssrc: u32,

    pub items: Vec<TstItem>,
}

impl TemporalSpatialTradeoffRequest {
    pub(crate) fn unmarshal_body(envelope: &FeedbackHeader, body: &mut Bytes) -> Result<Self> {
        check_fmt(envelope, FORMAT_TSTR)?;

        Ok(TemporalSpatialTradeoffRequest {
            sender_ssrc: envelope.sender_ssrc,
            media_ssrc: envelope.media_ssrc,
            items: unmarshal_items(body)?,
        })
    }
}

impl fmt::Display for TemporalSpatialTradeoffRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TemporalSpatialTradeoffRequest {:x} {:x}",
            self.sender_ssrc, self.media_ssrc
        )?;
        for item in &self.items {
            write!(f, " {item}")?;
        }
        Ok(())
    }
}

impl Packet for TemporalSpatialTradeoffRequest {
    fn header(&self) -> Header {
        Header {
            padding: false,
            count: FORMAT_TSTR,
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
        FEEDBACK_HEADER_LENGTH + self.items.len() * TST_ITEM_LENGTH
    }
}

impl MarshalSize for TemporalSpatialTradeoffRequest {
    fn marshal_size(&self) -> usize {
        self.raw_size()
    }
}

impl Marshal for TemporalSpatialTradeoffRequest {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        marshal_items(&self.feedback_header(), &self.items, buf)
    }
}

impl Unmarshal for TemporalSpatialTradeoffRequest {
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

/// TemporalSpatialTradeoffNotification acknowledges a TSTR and reports the
/// trade-off index the media sender has settled on, RFC 5104 4.3.3.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct TemporalSpatialTradeoffNotification {
    /// SSRC of sender
    pub sender_ssrc: u32,
    /// SSRC of the media source, unused and set to 0
    pub media_ssrc: u32,

    pub items: Vec<TstItem>,
}

impl TemporalSpatialTradeoffNotification {
    pub(crate) fn unmarshal_body(envelope: &FeedbackHeader, body: &mut Bytes) -> Result<Self> {
        check_fmt(envelope, FORMAT_TSTN)?;

        Ok(TemporalSpatialTradeoffNotification {
            sender_ssrc: envelope.sender_ssrc,
            media_ssrc: envelope.media_ssrc,
            items: unmarshal_items(body)?,
        })
    }
}

impl fmt::Display for TemporalSpatialTradeoffNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TemporalSpatialTradeoffNotification {:x} {:x}",
            self.sender_ssrc, self.media_ssrc
        )?;
        for item in &self.items {
            write!(f, " {item}")?;
        }
        Ok(())
    }
}

impl Packet for TemporalSpatialTradeoffNotification {
    fn header(&self) -> Header {
        Header {
            padding: false,
            count: FORMAT_TSTN,
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
        FEEDBACK_HEADER_LENGTH + self.items.len() * TST_ITEM_LENGTH
    }
}

impl MarshalSize for TemporalSpatialTradeoffNotification {
    fn marshal_size(&self) -> usize {
        self.raw_size()
    }
}

impl Marshal for TemporalSpatialTradeoffNotification {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        marshal_items(&self.feedback_header(), &self.items, buf)
    }
}

impl Unmarshal for TemporalSpatialTradeoffNotification {
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
