#![warn(rust_2018_idioms)]

//! Package rtcp-psfb implements encoding and decoding of RTCP Payload-Specific Feedback
//! messages according to RFC 4585, RFC 5104 and draft-alvestrand-rmcat-remb.
//!
//! Payload-specific feedback (packet type 206) carries codec control messages between a
//! media receiver and the media sender. This crate covers:
//!
//! * Receiver Estimated Maximum Bitrate (REMB, FMT=15 with the `REMB` identifier)
//! * Temporal-Spatial Trade-off Request and Notification (TSTR, FMT=5 and TSTN, FMT=6)
//! * Video Back-Channel Message (VBCM, FMT=7)
//!
//! Decoding feedback packets:
//!```nobuild
//!     let feedback = PayloadFeedback::unmarshal(&mut rtcp_data)?;
//!
//!     if let PayloadFeedback::ReceiverEstimatedMaximumBitrate(remb) = &feedback {
//!         estimator.on_remb(remb.bitrate(), remb.ssrcs());
//!     }
//!```
//!
//! Encoding feedback packets:
//!```nobuild
//!     let mut remb = ReceiverEstimatedMaximumBitrate::new(sender_ssrc, 0);
//!     remb.set_ssrcs(vec![media_ssrc]);
//!     remb.set_bitrate(estimate)?;
//!
//!     let remb_data = remb.marshal()?;
//!     // ...
//!```

mod error;
pub mod header;
pub mod packet;
pub mod payload_feedbacks;
mod util;

pub use error::{Error, Result};
