//! Domain value types
//!
//! - Colors (RGBA, hex, named palettes)
//! - Socket group specs
//! - Keyword enums (rarity, influence, shapes...)

pub mod color;
pub mod enums;
pub mod socket;

pub use color::Color;
pub use enums::{AltQuality, Influence, NamedColor, Rarity, Shape, SocketColor};
pub use socket::SocketGroup;
