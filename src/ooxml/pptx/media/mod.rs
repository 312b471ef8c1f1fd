//! Media parts and their per-presentation deduplication index.
//!
//! Every image, audio or video clip added to a presentation is first wrapped in
//! a [`MediaStream`], which carries a SHA-256 content hash. The
//! [`MediaCollection`] maps those hashes onto existing media parts so that
//! byte-identical content is stored once, no matter how many slides refer to it.
//!
//! # Examples
//!
//! ```rust,ignore
//! let stream = MediaStream::image(bytes)?;
//! if let Some(partname) = media.try_get_part(stream.hash()) {
//!     // reuse the part
//! }
//! ```

pub mod collection;
pub mod stream;

pub use collection::MediaCollection;
pub use stream::MediaStream;
