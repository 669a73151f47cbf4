//! External encoder/prober orchestration.
//!
//! Every interaction with ffmpeg/ffprobe goes through the traits in
//! [`cmd`], so jobs are testable without the binaries installed.

pub mod cmd;
pub mod extract;
pub mod probe;
pub mod transcode;

pub use cmd::{EncoderRunner, MediaProber, RealEncoderRunner, RealMediaProber};
pub use probe::{probe_media, MediaInfo, ProbeError};
pub use transcode::{encode_ladder, EncodeError};
