//! Package manager backends for system packages

mod detect;
mod dnf;
mod dpkg;
mod null;
pub mod parse;
mod rpm;
mod traits;
mod zypper;

pub use detect::detect_backend;
pub use dpkg::DpkgBackend;
pub use null::NullBackend;
pub use rpm::{RpmBackend, RpmFlavor};
pub use traits::PackageBackend;
