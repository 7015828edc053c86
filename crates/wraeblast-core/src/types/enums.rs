//! Enumerated domain values used by conditions and actions

keyword_enum! {
    /// Item rarity
    pub enum Rarity("rarity") {
        Normal => "Normal",
        Magic => "Magic",
        Rare => "Rare",
        Unique => "Unique",
    }
}

keyword_enum! {
    /// Item influence
    pub enum Influence("influence") {
        Shaper => "Shaper",
        Elder => "Elder",
        Crusader => "Crusader",
        Hunter => "Hunter",
        Redeemer => "Redeemer",
        Warlord => "Warlord",
        None => "None",
    }
}

keyword_enum! {
    /// Minimap icon shape
    pub enum Shape("shape") {
        Circle => "Circle",
        Cross => "Cross",
        Diamond => "Diamond",
        Hexagon => "Hexagon",
        Kite => "Kite",
        Moon => "Moon",
        Pentagon => "Pentagon",
        Raindrop => "Raindrop",
        Square => "Square",
        Star => "Star",
        Triangle => "Triangle",
        UpsideDownHouse => "UpsideDownHouse",
    }
}

keyword_enum! {
    /// Colors accepted by minimap icons and beam effects
    pub enum NamedColor("named color") {
        Blue => "Blue",
        Brown => "Brown",
        Cyan => "Cyan",
        Green => "Green",
        Grey => "Grey",
        Orange => "Orange",
        Pink => "Pink",
        Purple => "Purple",
        Red => "Red",
        White => "White",
        Yellow => "Yellow",
    }
}

keyword_enum! {
    /// Socket colors, in the order socket groups are written
    pub enum SocketColor("socket color") {
        Red => "R",
        Green => "G",
        Blue => "B",
        Delve => "D",
        Abyss => "A",
        White => "W",
    }
}

keyword_enum! {
    /// Alternate gem quality prefixes
    pub enum AltQuality("alternate quality") {
        Anomalous => "Anomalous",
        Divergent => "Divergent",
        Phantasmal => "Phantasmal",
    }
}

impl NamedColor {
    /// Reference RGB value used when a named color has to become a real color
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            NamedColor::Blue => (0, 0, 255),
            NamedColor::Brown => (165, 42, 42),
            NamedColor::Cyan => (0, 255, 255),
            NamedColor::Green => (0, 128, 0),
            NamedColor::Grey => (128, 128, 128),
            NamedColor::Orange => (255, 165, 0),
            NamedColor::Pink => (255, 192, 203),
            NamedColor::Purple => (128, 0, 128),
            NamedColor::Red => (255, 0, 0),
            NamedColor::White => (255, 255, 255),
            NamedColor::Yellow => (255, 255, 0),
        }
    }
}

impl AltQuality {
    /// Strip a leading alternate-quality prefix from a gem name
    pub fn strip_prefix(name: &str) -> &str {
        for quality in AltQuality::ALL {
            if let Some(rest) = name
                .strip_prefix(quality.as_str())
                .and_then(|rest| rest.strip_prefix(' '))
            {
                return rest;
            }
        }
        name
    }
}
