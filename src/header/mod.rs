
use bytes::{Buf, BufMut, Bytes};
use log::trace;
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;

type Result<T> = std::result::Result<T, util::Error>;

/// PacketType specifies the type of an RTCP packet
/// RTCP packet types registered with IANA. See: https://www.iana.org/assignments/rtp-parameters/rtp-parameters.xhtml#rtp-parameters-4
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketType {
    #[default]
    Unsupported = 0,
    SenderReport = 200,              // RFC 3550, 6.4.1
    ReceiverReport = 201,            // RFC 3550, 6.4.2
    SourceDescription = 202,         // RFC 3550, 6.5
    Goodbye = 203,                   // RFC 3550, 6.6
    ApplicationDefined = 204,        // RFC 3550, 6.7
    TransportSpecificFeedback = 205, // RFC 4585, 6051
    PayloadSpecificFeedback = 206,   // RFC 4585, 6.3
    ExtendedReport = 207,            // RFC 3611
}

/// Payload specific feedback messages overload the count field to act as a message type. those are listed here.
///
/// Temporal-Spatial Trade-off Request, RFC 5104 4.3.2
pub const FORMAT_TSTR: u8 = 5;
/// Temporal-Spatial Trade-off Notification, RFC 5104 4.3.3
pub const FORMAT_TSTN: u8 = 6;
/// Video Back Channel Message, RFC 5104 4.3.4
pub const FORMAT_VBCM: u8 = 7;
/// Application Layer Feedback, RFC 4585 6.4. REMB is the only AFB message understood here.
pub const FORMAT_AFB: u8 = 15;
/// https://tools.ietf.org/html/draft-alvestrand-rmcat-remb-03#section-2.2
pub const FORMAT_REMB: u8 = FORMAT_AFB;

impl std::fmt::Display for PacketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PacketType::Unsupported => "Unsupported",
            PacketType::SenderReport => "SR",
            PacketType::ReceiverReport => "RR",
            PacketType::SourceDescription => "SDES",
            PacketType::Goodbye => "BYE",
            PacketType::ApplicationDefined => "APP",
            PacketType::TransportSpecificFeedback => "TSFB",
            PacketType::PayloadSpecificFeedback => "PSFB",
            PacketType::ExtendedReport => "XR",
        };
        write!(f, "{s}")
    }
}

impl From<u8> for PacketType {
    fn from(b: u8) -> Self {
        match b {
            200 => PacketType::SenderReport,
            201 => PacketType::ReceiverReport,
            202 => PacketType::SourceDescription,
            203 => PacketType::Goodbye,
            204 => PacketType::ApplicationDefined,
            205 => PacketType::TransportSpecificFeedback,
            206 => PacketType::PayloadSpecificFeedback,
            207 => PacketType::ExtendedReport,
            _ => PacketType::Unsupported,
        }
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
/// Common header plus SSRC of packet sender and SSRC of media source.
pub const FEEDBACK_HEADER_LENGTH: usize = HEADER_LENGTH + 2 * SSRC_LENGTH;

/// A Header is the common header shared by all RTCP packets
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct Header {
    /// If the padding bit is set, this individual RTCP packet contains
    /// some additional padding octets at the end which are not part of
    /// the control information but are included in the length field.
    pub padding: bool,
    /// The number of reception reports, sources contained or FMT in this packet (depending on the Type)
    pub count: u8,
    /// The RTCP packet type for this packet
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
    /// marshal_to encodes the Header in binary
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if self.count as usize > COUNT_MAX {
            return Err(Error::InvalidHeader.into());
        }
        if buf.remaining_mut() < HEADER_LENGTH {
            return Err(Error::BufferTooShort.into());
        }

        /*
         *  0                   1                   2                   3
         *  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |V=2|P|   FMT   |   PT=PSFB=206 |             length            |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         */
        let b0 = (RTP_VERSION << VERSION_SHIFT)
            | ((self.padding as u8) << PADDING_SHIFT)
            | (self.count << COUNT_SHIFT);

        buf.put_u8(b0);
        buf.put_u8(self.packet_type as u8);
        buf.put_u16(self.length);

        Ok(HEADER_LENGTH)
    }
}

impl Unmarshal for Header {
    /// unmarshal decodes the Header from binary
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
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

/// FeedbackHeader is the envelope shared by every payload-specific feedback message,
/// see RFC 4585 6.1.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |V=2|P|   FMT   |      PT       |          length               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                  SSRC of packet sender                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                  SSRC of media source                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// :            Feedback Control Information (FCI)                 :
/// ```
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct FeedbackHeader {
    pub header: Header,
    /// SSRC of packet sender
    pub sender_ssrc: u32,
    /// SSRC of media source
    pub media_ssrc: u32,
}

impl FeedbackHeader {
    /// fmt returns the feedback message type carried in the count field.
    pub fn fmt(&self) -> u8 {
        self.header.count
    }

    /// body_length returns the number of FCI octets announced by the length field,
    /// RTCP padding included.
    pub fn body_length(&self) -> usize {
        (self.header.length as usize * 4).saturating_sub(2 * SSRC_LENGTH)
    }

    /// read_body takes the FCI that follows the envelope out of `raw_packet`,
    /// with any RTCP padding removed.
    pub fn read_body<B>(&self, raw_packet: &mut B) -> Result<Bytes>
    where
        B: Buf,
    {
        let body_length = self.body_length();
        if raw_packet.remaining() < body_length {
            return Err(Error::PacketTooShort.into());
        }

        let mut body = raw_packet.copy_to_bytes(body_length);
        if self.header.padding {
            let padding = match body.last() {
                Some(&p) if p != 0 && p as usize <= body.len() => p as usize,
                _ => return Err(Error::WrongPadding.into()),
            };
            trace!("stripping {} octets of RTCP padding", padding);
            body.truncate(body.len() - padding);
        }

        Ok(body)
    }
}

impl MarshalSize for FeedbackHeader {
    fn marshal_size(&self) -> usize {
        FEEDBACK_HEADER_LENGTH
    }
}

impl Marshal for FeedbackHeader {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if buf.remaining_mut() < FEEDBACK_HEADER_LENGTH {
            return Err(Error::BufferTooShort.into());
        }

        let n = self.header.marshal_to(buf)?;
        buf = &mut buf[n..];

        buf.put_u32(self.sender_ssrc);
        buf.put_u32(self.media_ssrc);

        Ok(FEEDBACK_HEADER_LENGTH)
    }
}

impl Unmarshal for FeedbackHeader {
    /// unmarshal decodes the envelope and checks that the whole packet announced by
    /// the length field is available.
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if raw_packet.remaining() < FEEDBACK_HEADER_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        let header = Header::unmarshal(raw_packet)?;
        if header.packet_type != PacketType::PayloadSpecificFeedback {
            return Err(Error::WrongType.into());
        }

        let length = header.length as usize * 4;
        if length < 2 * SSRC_LENGTH || raw_packet.remaining() < length {
            return Err(Error::PacketTooShort.into());
        }

        let sender_ssrc = raw_packet.get_u32();
        let media_ssrc = raw_packet.get_u32();

        Ok(FeedbackHeader {
            header,
            sender_ssrc,
            media_ssrc,
        })
    }
}
