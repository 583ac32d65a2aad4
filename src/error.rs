use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Buffer does not hold RTCP at all (mux discriminator, version or
    /// packet type range check failed).
    #[error("Buffer is not an RTCP packet")]
    NotRtcp,
    /// Version field is not 2.
    #[error("Invalid packet version")]
    BadVersion,
    /// Packet received is too short, or a sub-packet declares more bytes
    /// than the buffer holds.
    #[error("Packet too short")]
    PacketTooShort,
    /// A sub-packet declares zero 32-bit words after its header.
    #[error("Sub-packet length of zero words is not supported")]
    UnsupportedLength,
    /// A compound message ended with an undecodable sub-header remainder.
    #[error("Trailing bytes after last sub-packet")]
    TrailingGarbage,
    /// Packet type is outside the IANA RTCP range [192, 223].
    #[error("Packet type out of RTCP range")]
    InvalidPacketType,
    /// Packet contains an invalid header.
    #[error("Invalid header")]
    InvalidHeader,
    /// Buffer is too short to be written.
    #[error("Buffer too short to be written")]
    BufferTooShort,
    /// Header packet type does not match the decoder invoked.
    #[error("Wrong packet type")]
    WrongType,
    /// Feedback message type (FMT) does not match the decoder invoked.
    #[error("Wrong feedback message type")]
    WrongFeedbackType,
    /// More reception reports than the 5-bit count field can carry.
    #[error("Too many reports")]
    TooManyReports,
    /// More SDES chunks than the 5-bit count field can carry.
    #[error("Too many chunks")]
    TooManyChunks,
    /// More BYE sources than the 5-bit count field can carry.
    #[error("too many sources")]
    TooManySources,
    /// Packet lost exceeds maximum amount of packets
    /// that can possibly be lost.
    #[error("Invalid total lost count")]
    InvalidTotalLost,
    /// SDES type is missing.
    #[error("SDES item missing type")]
    SdesMissingType,
    /// SDES text is too long.
    #[error("SDES must be < 255 octets long")]
    SdesTextTooLong,
    /// BYE reason is too long.
    #[error("Reason must be < 255 octets long")]
    ReasonTooLong,
    /// APP data is not 32-bit aligned.
    #[error("Application packet data must be a multiple of 4 octets")]
    InvalidAppData,

    #[error("{0}")]
    Util(#[from] util::Error),

    #[error("{0}")]
    Other(String),
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
