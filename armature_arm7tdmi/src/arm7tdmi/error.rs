use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("illegal instruction encoding: {0:#010x}")]
    IllegalEncoding(u32),

    #[error("no instruction fetched: reset() must run before stepping")]
    NothingFetched,

    #[error("entry point {0:#010x} is outside the mapped memory")]
    IllegalEntryFetch(u32),

    #[error("memory segments `{0}` and `{1}` overlap")]
    OverlappingSegments(String, String),

    #[error("memory segment `{0}` does not fit in the 32-bit address space")]
    SegmentAddressOverflow(String),
}
