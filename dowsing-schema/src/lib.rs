//! Field schema, INI codecs and the metadata record shared by every
//! backend reader. No I/O lives here; this crate is pure data and pure
//! functions so it can be unit tested without touching a filesystem.

pub mod codec;
pub mod record;
pub mod schema;

pub use codec::{Codec, Decoded};
pub use record::{MetadataRecord, PackageDir, Packages};
pub use schema::{FieldSchema, IniLocation, MetadataName, SETUP_ARGS};
