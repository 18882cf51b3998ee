//! Core library for extracting Project Sekai music assets.
//!
//! The pipeline resolves a canonical song id from each long-audio file name,
//! gathers the charts, jacket and audio variants belonging to that id into a
//! [`Music`] record, exports the record into a per-song directory and finally
//! summarises the run in a JSON manifest. Bundle parsing and audio decoding
//! sit behind the [`BundleReader`] and [`AudioDecoder`] traits.

pub mod aggregate;
pub mod bundle;
pub mod config;
pub mod decoder;
pub mod error;
pub mod export;
pub mod identity;
pub mod locate;
pub mod manifest;
pub mod model;
pub mod pipeline;

pub use aggregate::Aggregator;
pub use bundle::{BundleObject, BundleReader, DumpBundleReader, TextAsset};
pub use config::{AssetLayout, DecoderConfig, ExtractConfig};
pub use decoder::{AudioDecoder, VgmstreamDecoder};
pub use error::{ExtractError, NameError, Result};
pub use export::{ExportReport, Exporter};
pub use identity::SongIdentity;
pub use manifest::{Manifest, MusicSummary};
pub use model::{Jacket, Music, Score, Track};
pub use pipeline::{extract_music, ExtractSummary};
