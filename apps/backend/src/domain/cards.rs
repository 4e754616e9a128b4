//! Card type and deck composition.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One of the eleven Lo Siento card faces.
///
/// Note there is no 6 or 9; `Sorry` is the only non-numeric card.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Card {
    One,
    Two,
    Three,
    Four,
    Five,
    Seven,
    Eight,
    Ten,
    Eleven,
    Twelve,
    Sorry,
}

impl Card {
    /// All faces in deck-composition order.
    pub const ALL: [Card; 11] = [
        Card::One,
        Card::Two,
        Card::Three,
        Card::Four,
        Card::Five,
        Card::Seven,
        Card::Eight,
        Card::Ten,
        Card::Eleven,
        Card::Twelve,
        Card::Sorry,
    ];

    /// Copies of this face in a fresh deck: five 1s, four of everything else.
    pub const fn copies(&self) -> usize {
        match self {
            Card::One => 5,
            _ => 4,
        }
    }

    /// Wire label for this face.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Card::One => "1",
            Card::Two => "2",
            Card::Three => "3",
            Card::Four => "4",
            Card::Five => "5",
            Card::Seven => "7",
            Card::Eight => "8",
            Card::Ten => "10",
            Card::Eleven => "11",
            Card::Twelve => "12",
            Card::Sorry => "Sorry!",
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "1" => Ok(Card::One),
            "2" => Ok(Card::Two),
            "3" => Ok(Card::Three),
            "4" => Ok(Card::Four),
            "5" => Ok(Card::Five),
            "7" => Ok(Card::Seven),
            "8" => Ok(Card::Eight),
            "10" => Ok(Card::Ten),
            "11" => Ok(Card::Eleven),
            "12" => Ok(Card::Twelve),
            "Sorry!" => Ok(Card::Sorry),
            _ => Err(serde::de::Error::custom(format!("Invalid card: {s}"))),
        }
    }
}
