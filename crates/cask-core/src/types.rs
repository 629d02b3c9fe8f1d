pub use cask_schema::{
    Arch, MacOsRelease, MacOsRequirement, MacOsVersion, PackageName, Sha256Digest, Version,
};
