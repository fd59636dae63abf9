//! Python interpreter versions.
//!
//! - [`PyVersion`]: a full release such as `3.12.1` or `3.13.0rc2`, ordered
//!   the way CPython releases are (pre-releases sort before the final).
//! - [`VersionSpec`]: a partial version (`3`, `3.11`) used to pick an
//!   interpreter.

pub use self::spec::VersionSpec;
pub use self::version::{PreRelease, PyVersion, VersionError};

mod spec;
mod version;
