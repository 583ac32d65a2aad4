#![warn(rust_2018_idioms)]
#![allow(dead_code)]

//! Parsing and serialization of compound RTCP messages.
//!
//! An RTCP datagram is a chain of sub-packets, each starting with the common
//! four byte header of RFC 3550. [`packet::parse`] walks a whole datagram and
//! returns the typed sub-packets it contains; [`packet::is_rtcp`] classifies
//! a buffer on an RTP/RTCP-muxed flow without decoding it.
//!
//! ## Decoding
//!
//! ```no_run
//! # use rtcp_core::packet::{is_rtcp, parse};
//! # fn handle(data: &[u8]) -> Result<(), rtcp_core::error::Error> {
//! if is_rtcp(data) {
//!     let compound = parse(data)?;
//!     for packet in &compound.0 {
//!         println!("{packet}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Encoding
//!
//! ```
//! use rtcp_core::compound_packet::CompoundPacket;
//! use rtcp_core::goodbye::Goodbye;
//! use rtcp_core::packet::Packet;
//! use util::marshal::Marshal;
//!
//! let compound = CompoundPacket(vec![Packet::Goodbye(Goodbye {
//!     sources: vec![0x902f9e2e],
//!     ..Default::default()
//! })]);
//! let data = compound.marshal().unwrap();
//! ```

pub mod app_defined;
pub mod compound_packet;
pub mod error;
pub mod goodbye;
pub mod header;
pub mod legacy;
pub mod packet;
pub mod payload_feedbacks;
pub mod reception_report;
pub mod receiver_report;
pub mod sender_report;
pub mod source_description;
pub mod transport_feedbacks;

mod util;

pub use crate::compound_packet::CompoundPacket;
pub use crate::error::Error;
pub use crate::header::{Header, PacketType};
pub use crate::packet::{is_rtcp, parse, Packet, RtcpPacket};
