
pub mod receiver_estimated_maximum_bitrate;
pub mod temporal_spatial_tradeoff;
pub mod video_back_channel_message;

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use log::trace;
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::*;
use receiver_estimated_maximum_bitrate::*;
use temporal_spatial_tradeoff::*;
use video_back_channel_message::*;

type Result<T> = std::result::Result<T, util::Error>;

/// marshal_items writes the envelope followed by every FCI entry of a list-shaped message.
pub(crate) fn marshal_items<T>(
    envelope: &FeedbackHeader,
    items: &[T],
    mut buf: &mut [u8],
) -> Result<usize>
where
    T: Marshal,
{
    let size = FEEDBACK_HEADER_LENGTH
        + items
            .iter()
            .map(|item| item.marshal_size())
            .sum::<usize>();
    if size / 4 - 1 > u16::MAX as usize {
        return Err(Error::PacketTooLong.into());
    }
    if buf.remaining_mut() < size {
        return Err(Error::BufferTooShort.into());
    }

    let n = envelope.marshal_to(buf)?;
    buf = &mut buf[n..];

    for item in items {
        let n = item.marshal_to(buf)?;
        buf = &mut buf[n..];
    }

    Ok(size)
}

/// unmarshal_items reads FCI entries until the body is exhausted.
pub(crate) fn unmarshal_items<T>(body: &mut Bytes) -> Result<Vec<T>>
where
    T: Unmarshal,
{
    let mut items = vec![];
    while body.has_remaining() {
        items.push(T::unmarshal(body)?);
    }
    Ok(items)
}

/// PayloadFeedback is one decoded payload-specific feedback packet, selected by
/// the FMT field of its envelope (and, for FMT=15, the application identifier).
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum PayloadFeedback {
    ReceiverEstimatedMaximumBitrate(ReceiverEstimatedMaximumBitrate),
    TemporalSpatialTradeoffRequest(TemporalSpatialTradeoffRequest),
    TemporalSpatialTradeoffNotification(TemporalSpatialTradeoffNotification),
    VideoBackChannelMessage(VideoBackChannelMessage),
}

impl From<ReceiverEstimatedMaximumBitrate> for PayloadFeedback {
    fn from(p: ReceiverEstimatedMaximumBitrate) -> Self {
        PayloadFeedback::ReceiverEstimatedMaximumBitrate(p)
    }
}

impl From<TemporalSpatialTradeoffRequest> for PayloadFeedback {
    fn from(p: TemporalSpatialTradeoffRequest) -> Self {
        PayloadFeedback::TemporalSpatialTradeoffRequest(p)
    }
}

impl From<TemporalSpatialTradeoffNotification> for PayloadFeedback {
    fn from(p: TemporalSpatialTradeoffNotification) -> Self {
        PayloadFeedback::TemporalSpatialTradeoffNotification(p)
    }
}

impl From<VideoBackChannelMessage> for PayloadFeedback {
    fn from(p: VideoBackChannelMessage) -> Self {
        PayloadFeedback::VideoBackChannelMessage(p)
    }
}

impl PayloadFeedback {
    fn as_packet(&self) -> &dyn Packet {
        match self {
            PayloadFeedback::ReceiverEstimatedMaximumBitrate(p) => p,
            PayloadFeedback::TemporalSpatialTradeoffRequest(p) => p,
            PayloadFeedback::TemporalSpatialTradeoffNotification(p) => p,
            PayloadFeedback::VideoBackChannelMessage(p) => p,
        }
    }
}

impl fmt::Display for PayloadFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_packet(), f)
    }
}

impl Packet for PayloadFeedback {
    fn header(&self) -> Header {
        self.as_packet().header()
    }

    fn sender_ssrc(&self) -> u32 {
        self.as_packet().sender_ssrc()
    }

    fn media_ssrc(&self) -> u32 {
        self.as_packet().media_ssrc()
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        self.as_packet().destination_ssrc()
    }

    fn raw_size(&self) -> usize {
        self.as_packet().raw_size()
    }
}

impl MarshalSize for PayloadFeedback {
    fn marshal_size(&self) -> usize {
        self.as_packet().marshal_size()
    }
}

impl Marshal for PayloadFeedback {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        self.as_packet().marshal_to(buf)
    }
}

impl Unmarshal for PayloadFeedback {
    /// unmarshal reads the envelope, then hands the FCI to the parser registered
    /// for its FMT and identifier.
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let envelope = FeedbackHeader::unmarshal(raw_packet)?;
        let mut body = envelope.read_body(raw_packet)?;

        let parse = find_body_parser(envelope.fmt(), &body)?;
        parse(&envelope, &mut body)
    }
}

type BodyParser = fn(&FeedbackHeader, &mut Bytes) -> Result<PayloadFeedback>;

/// FMT, optional leading identifier of the FCI, parser.
const BODY_PARSERS: [(u8, Option<&[u8; 4]>, BodyParser); 4] = [
    (FORMAT_TSTR, None, parse_tstr as BodyParser),
    (FORMAT_TSTN, None, parse_tstn as BodyParser),
    (FORMAT_VBCM, None, parse_vbcm as BodyParser),
    (FORMAT_AFB, Some(&UNIQUE_IDENTIFIER), parse_remb as BodyParser),
];

fn find_body_parser(fmt: u8, body: &[u8]) -> Result<BodyParser> {
    for (format, identifier, parser) in BODY_PARSERS {
        if format != fmt {
            continue;
        }
        match identifier {
            Some(id) if !body.starts_with(id) => continue,
            _ => return Ok(parser),
        }
    }

    trace!(
        "no parser for payload-specific feedback fmt={} ({} octets of FCI)",
        fmt,
        body.len()
    );
    Err(Error::UnsupportedFormat.into())
}

fn parse_tstr(envelope: &FeedbackHeader, body: &mut Bytes) -> Result<PayloadFeedback> {
    TemporalSpatialTradeoffRequest::unmarshal_body(envelope, body).map(Into::into)
}

fn parse_tstn(envelope: &FeedbackHeader, body: &mut Bytes) -> Result<PayloadFeedback> {
    TemporalSpatialTradeoffNotification::unmarshal_body(envelope, body).map(Into::into)
}

fn parse_vbcm(envelope: &FeedbackHeader, body: &mut Bytes) -> Result<PayloadFeedback> {
    VideoBackChannelMessage::unmarshal_body(envelope, body).map(Into::into)
}

fn parse_remb(envelope: &FeedbackHeader, body: &mut Bytes) -> Result<PayloadFeedback> {
    ReceiverEstimatedMaximumBitrate::unmarshal_body(envelope, body).map(Into::into)
}

/// marshal takes an array of feedback packets and serializes them to a single buffer
pub fn marshal(packets: &[PayloadFeedback]) -> Result<Bytes> {
    let mut out = BytesMut::new();
    for p in packets {
        let data = p.marshal()?;
        out.put(data);
    }
    Ok(out.freeze())
}

/// unmarshal takes an entire datagram, which may carry several payload-specific
/// feedback packets back to back, and returns the packets it contains in order.
pub fn unmarshal<B>(raw_data: &mut B) -> Result<Vec<PayloadFeedback>>
where
    B: Buf,
{
    let mut packets = vec![];

    while raw_data.has_remaining() {
        packets.push(PayloadFeedback::unmarshal(raw_data)?);
    }

    if packets.is_empty() {
        return Err(Error::InvalidHeader.into());
    }

    Ok(packets)
}
