//! Rezka Core - Stream resolution for the HDRezka catalog
//!
//! This crate provides the backend logic for turning a title into a set of
//! playable stream URLs:
//! - Catalog search and media page loading
//! - Translator (dub track) selection with a priority fallback
//! - Single-request CDN stream resolution for both movies and TV series
//! - Parsing of the delimited stream-descriptor payload
//! - Assembly of the quality → HLS-manifest-URL response
//!
//! # Architecture
//!
//! ```text
//! title ──► Catalog::search ──► Catalog::load_media ──► MediaDescriptor
//!                                                            │
//!                                 translator::select_preferred
//!                                                            │
//!                                  StreamResolver::resolve (one POST)
//!                                                            │
//!                      trash::clear_trash ──► chunks::parse_stream_chunks
//!                                                            │
//!                                          assemble::assemble ──► ApiResponse
//! ```

pub mod assemble;
pub mod catalog;
pub mod chunks;
pub mod error;
pub mod resolver;
pub mod translator;
pub mod trash;
pub mod types;

pub use assemble::{assemble, ApiResponse};
pub use catalog::{Catalog, RezkaCatalog};
pub use chunks::parse_stream_chunks;
pub use error::{Error, Result};
pub use resolver::StreamResolver;
pub use translator::{select, select_preferred, Selection};
pub use types::{
    MediaDescriptor, MediaKind, SearchHit, StreamRequest, StreamResult, Subtitles, Translator,
    TranslatorId, TranslatorRef, UpstreamSession, VideoSet,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
