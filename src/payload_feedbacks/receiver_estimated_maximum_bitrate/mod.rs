
use std::fmt;

use bytes::{Buf, BufMut, Bytes};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::*;
use crate::util::*;

type Result<T> = std::result::Result<T, util::Error>;

/// Unique identifier, num SSRC and the exponent/mantissa field.
const REMB_OFFSET: usize = 8;

const EXP_OFFSET: usize = 0;
const EXP_WIDTH: usize = 6;
const MANTISSA_OFFSET: usize = EXP_OFFSET + EXP_WIDTH;
const MANTISSA_WIDTH: usize = 18;

pub const EXP_MAX: u8 = (1 << EXP_WIDTH) - 1;
pub const MANTISSA_MAX: u32 = (1 << MANTISSA_WIDTH) - 1;

/// Keep a table of powers to units for fast conversion.
const BIT_UNITS: [&str; 7] = ["b", "Kb", "Mb", "Gb", "Tb", "Pb", "Eb"];
pub const UNIQUE_IDENTIFIER: [u8; 4] = [b'R', b'E', b'M', b'B'];

/// encode_bitrate returns the smallest exponent, and its mantissa, such that
/// `mantissa << exp == bitrate`. Bitrates that would lose precision in the 18-bit
/// mantissa are rejected rather than rounded.
pub fn encode_bitrate(bitrate: u64) -> crate::Result<(u8, u32)> {
    let mut exp = 0u8;
    let mut mantissa = bitrate;

    while mantissa > MANTISSA_MAX as u64 {
        if mantissa & 1 != 0 {
            return Err(Error::InvalidBitrate);
        }
        mantissa >>= 1;
        exp += 1;
    }

    Ok((exp, mantissa as u32))
}

/// decode_bitrate returns `mantissa << exp`, failing when the pair is out of range
/// or the result doesn't fit in 64 bits.
pub fn decode_bitrate(exp: u8, mantissa: u32) -> crate::Result<u64> {
    if exp > EXP_MAX || mantissa > MANTISSA_MAX {
        return Err(Error::InvalidBitrate);
    }

    let bitrate = (mantissa as u64) << exp;
    if bitrate >> exp != mantissa as u64 {
        return Err(Error::InvalidBitrate);
    }

    Ok(bitrate)
}

/// ReceiverEstimatedMaximumBitrate contains the receiver's estimated maximum bitrate.
///
/// ## Specifications
///
/// * [draft-alvestrand-rmcat-remb-03]
///
/// [draft-alvestrand-rmcat-remb-03]: https://tools.ietf.org/html/draft-alvestrand-rmcat-remb-03
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct ReceiverEstimatedMaximumBitrate {
    /// SSRC of sender
    sender_ssrc: u32,

    /// SSRC of media source, 0 for REMB
    media_ssrc: u32,

    /// Estimated maximum bitrate in bits per second
    bitrate: u64,

    /// SSRC entries which this packet applies to
    ssrcs: Vec<u32>,
}

impl ReceiverEstimatedMaximumBitrate {
    /// new returns an empty report, to be filled with set_ssrcs and set_bitrate.
    pub fn new(sender_ssrc: u32, media_ssrc: u32) -> Self {
        ReceiverEstimatedMaximumBitrate {
            sender_ssrc,
            media_ssrc,
            ..Default::default()
        }
    }

    pub fn bitrate(&self) -> u64 {
        self.bitrate
    }

    pub fn ssrcs(&self) -> &[u32] {
        &self.ssrcs
    }

    /// set_bitrate replaces the estimate. It fails, leaving the previous value in place,
    /// when `bitrate` has no exact 18-bit mantissa / 6-bit exponent form.
    pub fn set_bitrate(&mut self, bitrate: u64) -> crate::Result<()> {
        encode_bitrate(bitrate)?;
        self.bitrate = bitrate;
        Ok(())
    }

    /// set_ssrcs replaces the SSRC entries, wire order is the order given.
    pub fn set_ssrcs(&mut self, ssrcs: Vec<u32>) {
        self.ssrcs = ssrcs;
    }

    pub(crate) fn unmarshal_body(envelope: &FeedbackHeader, body: &mut Bytes) -> Result<Self> {
        if envelope.fmt() != FORMAT_REMB {
            return Err(Error::WrongType.into());
        }

        /*
            0                   1                   2                   3
            0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
           +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
           |  Unique identifier 'R' 'E' 'M' 'B'                            |
           +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
           |  Num SSRC     | BR Exp    |  BR Mantissa                      |
           +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
           |   SSRC feedback                                               |
           +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
           |  ...                                                          |
        */
        if body.remaining() < REMB_OFFSET {
            return Err(Error::PacketTooShort.into());
        }

        // REMB rules all around me
        let mut unique_identifier = [0u8; 4];
        body.copy_to_slice(&mut unique_identifier);
        if unique_identifier != UNIQUE_IDENTIFIER {
            return Err(Error::MissingRembIdentifier.into());
        }

        // The next byte is the number of SSRC entries at the end.
        let ssrcs_len = body.get_u8() as usize;

        let mut exp_mantissa = [0u8; 3];
        body.copy_to_slice(&mut exp_mantissa);
        let exp = get_nbits(&exp_mantissa, EXP_OFFSET, EXP_WIDTH)? as u8;
        let mantissa = get_nbits(&exp_mantissa, MANTISSA_OFFSET, MANTISSA_WIDTH)?;
        let bitrate = decode_bitrate(exp, mantissa)?;

        if body.remaining() < ssrcs_len * SSRC_LENGTH {
            return Err(Error::PacketTooShort.into());
        }
        if body.remaining() != ssrcs_len * SSRC_LENGTH {
            return Err(Error::SsrcNumAndLengthMismatch.into());
        }

        let mut ssrcs = Vec::with_capacity(ssrcs_len);
        for _ in 0..ssrcs_len {
            ssrcs.push(body.get_u32());
        }

        Ok(ReceiverEstimatedMaximumBitrate {
            sender_ssrc: envelope.sender_ssrc,
            media_ssrc: envelope.media_ssrc,
            bitrate,
            ssrcs,
        })
    }
}

/// String prints the REMB packet in a human-readable format.
impl fmt::Display for ReceiverEstimatedMaximumBitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do some unit conversions because b/s is far too difficult to read.
        let mut bitrate = self.bitrate as f64;
        let mut powers = 0;

        // Keep dividing the bitrate until it's under 1000
        while bitrate >= 1000.0 && powers < BIT_UNITS.len() - 1 {
            bitrate /= 1000.0;
            powers += 1;
        }

        let unit = BIT_UNITS[powers];

        write!(
            f,
            "ReceiverEstimatedMaximumBitrate {:x} {:.2} {}/s",
            self.sender_ssrc, bitrate, unit,
        )
    }
}

impl Packet for ReceiverEstimatedMaximumBitrate {
    /// Header returns the Header associated with this packet.
    fn header(&self) -> Header {
        Header {
            padding: false,
            count: FORMAT_REMB,
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

    /// destination_ssrc returns an array of SSRC values that this packet refers to.
    fn destination_ssrc(&self) -> Vec<u32> {
        self.ssrcs.clone()
    }

    fn raw_size(&self) -> usize {
        FEEDBACK_HEADER_LENGTH + REMB_OFFSET + self.ssrcs.len() * SSRC_LENGTH
    }
}

impl MarshalSize for ReceiverEstimatedMaximumBitrate {
    fn marshal_size(&self) -> usize {
        self.raw_size()
    }
}

impl Marshal for ReceiverEstimatedMaximumBitrate {
    /// marshal_to serializes the packet into buf.
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        /*
            0                   1                   2                   3
            0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
           +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
           |V=2|P| FMT=15  |   PT=206      |             length            |
           +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
           |                  SSRC of packet sender                        |
           +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
           |                  SSRC of media source                         |
           +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
           |  Unique identifier 'R' 'E' 'M' 'B'                            |
           +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
           |  Num SSRC     | BR Exp    |  BR Mantissa                      |
           +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
           |   SSRC feedback                                               |
           +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
           |  ...                                                          |
        */
        if self.ssrcs.len() > u8::MAX as usize {
            return Err(Error::TooManySources.into());
        }
        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::BufferTooShort.into());
        }

        let (exp, mantissa) = encode_bitrate(self.bitrate)?;
        let mut exp_mantissa = [0u8; 3];
        set_nbits(&mut exp_mantissa, EXP_OFFSET, EXP_WIDTH, exp as u32)?;
        set_nbits(&mut exp_mantissa, MANTISSA_OFFSET, MANTISSA_WIDTH, mantissa)?;

        let n = self.feedback_header().marshal_to(buf)?;
        buf = &mut buf[n..];

        buf.put_slice(&UNIQUE_IDENTIFIER);

        // Write the length of the ssrcs to follow at the end
        buf.put_u8(self.ssrcs.len() as u8);
        buf.put_slice(&exp_mantissa);

        // Write the SSRCs at the very end.
        for ssrc in &self.ssrcs {
            buf.put_u32(*ssrc);
        }

        Ok(self.marshal_size())
    }
}

impl Unmarshal for ReceiverEstimatedMaximumBitrate {
    /// unmarshal reads a REMB packet from the given byte slice.
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
