//! Header timestamp formatting
//!
//! Headers carry a `YYYY-MM-DD HH:MM:SS` timestamp rendered either in the
//! machine's local timezone or in a configured IANA zone.

use chrono::{Local, Utc};
use chrono_tz::Tz;

use crate::core::error::{LoggerError, Result};

/// Time format used in every message header.
pub const HEADER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, Default)]
pub struct Clock {
    zone: Option<Tz>,
}

impl Clock {
    /// A clock following the machine's local timezone.
    #[must_use]
    pub fn local() -> Self {
        Self { zone: None }
    }

    /// A clock pinned to a named IANA timezone.
    pub fn for_zone(name: &str) -> Result<Self> {
        let zone = name.parse::<Tz>().map_err(|_| {
            LoggerError::invalid_argument("timezone", format!("'{}' is not a known IANA zone", name))
        })?;
        Ok(Self { zone: Some(zone) })
    }

    /// Configured zone name, if any.
    #[must_use]
    pub fn zone(&self) -> Option<&'static str> {
        self.zone.map(|z| z.name())
    }

    /// Current time rendered with [`HEADER_TIME_FORMAT`].
    #[must_use]
    pub fn now_string(&self) -> String {
        match self.zone {
            Some(zone) => Utc::now()
                .with_timezone(&zone)
                .format(HEADER_TIME_FORMAT)
                .to_string(),
            None => Local::now().format(HEADER_TIME_FORMAT).to_string(),
        }
    }
}
