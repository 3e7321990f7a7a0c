//! Output decoration flags.

use crate::{Error, Result};
use std::str::FromStr;

bitflags::bitflags! {
    /// Toggles for what a logger adds around each message.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    pub struct FormatFlags: u8 {
        /// Caller `file:line`
        const SHORTFILE = 1 << 0;
        const DATE = 1 << 1;
        const TIME = 1 << 2;
        const COLOR = 1 << 3;

        const DATETIME = Self::DATE.bits() | Self::TIME.bits();
        /// Everything on, for development
        const VERBOSE = Self::DATETIME.bits() | Self::SHORTFILE.bits() | Self::COLOR.bits();
        const STANDARD = Self::DATETIME.bits() | Self::COLOR.bits();
    }
}

impl Default for FormatFlags {
    fn default() -> Self {
        FormatFlags::STANDARD
    }
}

impl FromStr for FormatFlags {
    type Err = Error;

    /// Accepts a preset name (`standard`, `verbose`, `none`) or a
    /// comma separated list of `shortfile`, `date`, `time`, `datetime`, `color`.
    fn from_str(s: &str) -> Result<Self> {
        let mut flags = FormatFlags::empty();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            flags |= match part.to_lowercase().as_str() {
                "standard" => FormatFlags::STANDARD,
                "verbose" | "dev" => FormatFlags::VERBOSE,
                "none" => FormatFlags::empty(),
                "shortfile" | "caller" => FormatFlags::SHORTFILE,
                "date" => FormatFlags::DATE,
                "time" => FormatFlags::TIME,
                "datetime" => FormatFlags::DATETIME,
                "color" => FormatFlags::COLOR,
                other => return Err(Error::Format(format!("unknown format flag '{}'", other))),
            };
        }
        Ok(flags)
    }
}
