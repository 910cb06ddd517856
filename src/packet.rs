use std::fmt;

use util::marshal::{Marshal, Unmarshal};

use crate::header::{FeedbackHeader, Header};

/// Packet represents a payload-specific feedback message, carried as a single RTCP packet
pub trait Packet: Marshal + Unmarshal + fmt::Display + fmt::Debug {
    /// header returns the common RTCP header of this packet.
    fn header(&self) -> Header;
    /// sender_ssrc returns the SSRC of the packet sender.
    fn sender_ssrc(&self) -> u32;
    /// media_ssrc returns the SSRC of the media source.
    fn media_ssrc(&self) -> u32;
    /// destination_ssrc returns an array of SSRC values that this packet refers to.
    fn destination_ssrc(&self) -> Vec<u32>;
    /// raw_size returns the number of octets of the packet before RTCP padding.
    fn raw_size(&self) -> usize;

    /// feedback_header returns the envelope written in front of the FCI.
    fn feedback_header(&self) -> FeedbackHeader {
        FeedbackHeader {
            header: self.header(),
            sender_ssrc: self.sender_ssrc(),
            media_ssrc: self.media_ssrc(),
        }
    }
}
