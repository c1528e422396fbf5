//! The buildable district cards and the composition of the draw deck.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistrictColor {
    Noble,
    Trade,
    Religious,
    Military,
    Unique,
}

/// A district kind. Card instances in play carry a `CardId` on top of this;
/// city uniqueness is judged by kind (equivalently, by name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum District {
    // Noble
    Manor,
    Castle,
    Palace,
    // Religious
    Temple,
    Church,
    Monastery,
    Cathedral,
    // Trade
    Tavern,
    Market,
    TradingPost,
    Docks,
    Harbor,
    TownHall,
    // Military
    Watchtower,
    Prison,
    Battlefield,
    Fortress,
    // Unique
    HauntedQuarter,
    Keep,
    Observatory,
    Laboratory,
    Smithy,
    Graveyard,
    ImperialTreasury,
    MapRoom,
    GreatWall,
    Library,
    MagicSchool,
    University,
    DragonGate,
}

impl District {
    pub const ALL: [District; 30] = [
        District::Manor,
        District::Castle,
        District::Palace,
        District::Temple,
        District::Church,
        District::Monastery,
        District::Cathedral,
        District::Tavern,
        District::Market,
        District::TradingPost,
        District::Docks,
        District::Harbor,
        District::TownHall,
        District::Watchtower,
        District::Prison,
        District::Battlefield,
        District::Fortress,
        District::HauntedQuarter,
        District::Keep,
        District::Observatory,
        District::Laboratory,
        District::Smithy,
        District::Graveyard,
        District::ImperialTreasury,
        District::MapRoom,
        District::GreatWall,
        District::Library,
        District::MagicSchool,
        District::University,
        District::DragonGate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            District::Manor => "Manor",
            District::Castle => "Castle",
            District::Palace => "Palace",
            District::Temple => "Temple",
            District::Church => "Church",
            District::Monastery => "Monastery",
            District::Cathedral => "Cathedral",
            District::Tavern => "Tavern",
            District::Market => "Market",
            District::TradingPost => "Trading Post",
            District::Docks => "Docks",
            District::Harbor => "Harbor",
            District::TownHall => "Town Hall",
            District::Watchtower => "Watchtower",
            District::Prison => "Prison",
            District::Battlefield => "Battlefield",
            District::Fortress => "Fortress",
            District::HauntedQuarter => "Haunted Quarter",
            District::Keep => "Keep",
            District::Observatory => "Observatory",
            District::Laboratory => "Laboratory",
            District::Smithy => "Smithy",
            District::Graveyard => "Graveyard",
            District::ImperialTreasury => "Imperial Treasury",
            District::MapRoom => "Map Room",
            District::GreatWall => "Great Wall",
            District::Library => "Library",
            District::MagicSchool => "Magic School",
            District::University => "University",
            District::DragonGate => "Dragon Gate",
        }
    }

    pub fn cost(self) -> u32 {
        match self {
            District::Temple | District::Tavern | District::Watchtower => 1,
            District::Church
            | District::Market
            | District::TradingPost
            | District::Prison
            | District::HauntedQuarter => 2,
            District::Manor
            | District::Monastery
            | District::Docks
            | District::Battlefield
            | District::Keep => 3,
            District::Castle | District::Harbor | District::Observatory => 4,
            District::Palace
            | District::Cathedral
            | District::TownHall
            | District::Fortress
            | District::Laboratory
            | District::Smithy
            | District::Graveyard
            | District::ImperialTreasury
            | District::MapRoom => 5,
            District::GreatWall
            | District::Library
            | District::MagicSchool
            | District::University
            | District::DragonGate => 6,
        }
    }

    pub fn color(self) -> DistrictColor {
        match self {
            District::Manor | District::Castle | District::Palace => DistrictColor::Noble,
            District::Temple | District::Church | District::Monastery | District::Cathedral => {
                DistrictColor::Religious
            }
            District::Tavern
            | District::Market
            | District::TradingPost
            | District::Docks
            | District::Harbor
            | District::TownHall => DistrictColor::Trade,
            District::Watchtower | District::Prison | District::Battlefield | District::Fortress => {
                DistrictColor::Military
            }
            _ => DistrictColor::Unique,
        }
    }

    /// Unique (purple) buildings carry a one-per-game special ability.
    pub fn is_unique(self) -> bool {
        self.color() == DistrictColor::Unique
    }

    /// Number of copies of this kind in a fresh deck.
    pub fn copies(self) -> usize {
        match self {
            District::Manor | District::Tavern => 5,
            District::Castle | District::Market => 4,
            District::Temple
            | District::Church
            | District::Monastery
            | District::Palace
            | District::TradingPost
            | District::Docks
            | District::Harbor
            | District::Watchtower
            | District::Prison
            | District::Battlefield => 3,
            District::Cathedral | District::TownHall | District::Fortress => 2,
            _ => 1,
        }
    }
}

/// The full deck as an unshuffled list of district kinds.
pub static DECK_TEMPLATE: Lazy<Vec<District>> = Lazy::new(|| {
    let mut deck = Vec::new();
    for kind in District::ALL {
        for _ in 0..kind.copies() {
            deck.push(kind);
        }
    }
    deck
});
