use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Compound datagram contains no packet.
    #[error("Invalid header")]
    InvalidHeader,
    /// Packet received is too short.
    #[error("Packet too short to be read")]
    PacketTooShort,
    /// Buffer is too short.
    #[error("Buffer too short to be written")]
    BufferTooShort,
    /// Packet does not fit the 16-bit length field.
    #[error("Packet too long to be written")]
    PacketTooLong,
    /// Wrong packet type or feedback message type.
    #[error("Wrong packet type")]
    WrongType,
    /// Invalid packet version.
    #[error("Invalid packet version")]
    BadVersion,
    /// Invalid padding value.
    #[error("Invalid padding value")]
    WrongPadding,
    /// Payload-specific feedback format (or AFB identifier) has no parser.
    #[error("Unsupported payload-specific feedback format")]
    UnsupportedFormat,
    /// Missing REMB identifier.
    #[error("Missing REMB identifier")]
    MissingRembIdentifier,
    /// SSRC number and length mismatches.
    #[error("SSRC num and length do not match")]
    SsrcNumAndLengthMismatch,
    /// Too many sources.
    #[error("too many sources")]
    TooManySources,
    /// Bitrate can't be expressed as an 18-bit mantissa and 6-bit exponent.
    #[error("Invalid bitrate")]
    InvalidBitrate,
    /// Invalid size or start index.
    #[error("Invalid size or startIndex")]
    InvalidSizeOrStartIndex,
    /// TST index doesn't fit in 5 bits.
    #[error("TST index must be < 32")]
    InvalidTstIndex,
    /// VBCM payload type doesn't fit in 7 bits.
    #[error("VBCM payload type must be < 128")]
    InvalidPayloadType,
    /// VBCM value doesn't fit the 16-bit length field.
    #[error("VBCM value must be < 65536 octets long")]
    VbcmValueTooLong,
}

impl From<Error> for util::Error {
    fn from(e: Error) -> Self {
        util::Error::from_std(e)
    }
}

impl PartialEq<util::Error> for Error {
    fn eq(&self, other: &util::Error) -> bool {
        if let Some(down) = other.downcast_ref::<Error>() {
            return self == down;
        }
        false
    }
}
