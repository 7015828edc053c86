//! Socket group specs such as `5RRG` or `RGB`

use super::enums::SocketColor;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of sockets an item can have
pub const MAX_SOCKETS: u8 = 6;

/// Required socket colors plus an optional link count
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SocketGroup {
    sockets: Vec<(SocketColor, u8)>,
    links: Option<u8>,
}

impl SocketGroup {
    /// Build a socket group, rejecting more than six sockets in total
    pub fn new(sockets: Vec<(SocketColor, u8)>, links: Option<u8>) -> Result<Self> {
        let mut total: u32 = 0;
        for (color, count) in &sockets {
            if *count > MAX_SOCKETS {
                return Err(CoreError::InvalidSocketGroup(format!(
                    "{} {} sockets, socket count cannot be greater than six",
                    count, color
                )));
            }
            total += u32::from(*count);
        }
        if total > u32::from(MAX_SOCKETS) {
            return Err(CoreError::InvalidSocketGroup(format!(
                "{} sockets, total socket count cannot be greater than six",
                total
            )));
        }
        if let Some(links) = links {
            if links > MAX_SOCKETS {
                return Err(CoreError::InvalidSocketGroup(format!(
                    "link count {} is greater than six",
                    links
                )));
            }
        }

        // Collapse duplicates and keep the canonical R G B D A W order
        let mut counts: Vec<(SocketColor, u8)> = Vec::new();
        for color in SocketColor::ALL {
            let count: u8 = sockets
                .iter()
                .filter(|(c, _)| c == color)
                .map(|(_, n)| *n)
                .sum();
            if count > 0 {
                counts.push((*color, count));
            }
        }

        Ok(SocketGroup {
            sockets: counts,
            links,
        })
    }

    /// (color, count) pairs with a non-zero count
    pub fn sockets(&self) -> &[(SocketColor, u8)] {
        &self.sockets
    }

    pub fn links(&self) -> Option<u8> {
        self.links
    }

    /// Total number of sockets across all colors
    pub fn total(&self) -> u8 {
        self.sockets.iter().map(|(_, n)| *n).sum()
    }
}

impl FromStr for SocketGroup {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut chars = s.chars().peekable();
        let mut links = None;
        if let Some(c) = chars.peek() {
            if ('0'..='6').contains(c) {
                links = c.to_digit(10).map(|d| d as u8);
                chars.next();
            }
        }

        let mut sockets: Vec<(SocketColor, u8)> = Vec::new();
        for c in chars {
            let color: SocketColor = c
                .to_string()
                .parse()
                .map_err(|_| CoreError::InvalidSocketGroup(s.to_string()))?;
            match sockets.iter_mut().find(|(existing, _)| *existing == color) {
                Some((_, count)) => *count = count.saturating_add(1),
                None => sockets.push((color, 1)),
            }
        }

        if links.is_none() && sockets.is_empty() {
            return Err(CoreError::InvalidSocketGroup(s.to_string()));
        }

        SocketGroup::new(sockets, links)
    }
}

impl fmt::Display for SocketGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(links) = self.links {
            write!(f, "{}", links)?;
        }
        for (color, count) in &self.sockets {
            for _ in 0..*count {
                f.write_str(color.as_str())?;
            }
        }
        Ok(())
    }
}

impl Serialize for SocketGroup {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SocketGroup {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
