//! The eight character roles, in canonical turn order.

use serde::{Deserialize, Serialize};

use super::districts::DistrictColor;

/// A hidden character card. The numeric rank (1–8) is the order in which
/// roles act during the action phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Assassin,
    Thief,
    Magician,
    King,
    Bishop,
    Merchant,
    Architect,
    Warlord,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Assassin,
        Role::Thief,
        Role::Magician,
        Role::King,
        Role::Bishop,
        Role::Merchant,
        Role::Architect,
        Role::Warlord,
    ];

    /// Turn-order rank, 1..=8.
    pub fn rank(self) -> u8 {
        match self {
            Role::Assassin => 1,
            Role::Thief => 2,
            Role::Magician => 3,
            Role::King => 4,
            Role::Bishop => 5,
            Role::Merchant => 6,
            Role::Architect => 7,
            Role::Warlord => 8,
        }
    }

    pub fn from_rank(rank: u8) -> Option<Role> {
        Role::ALL.get(rank.checked_sub(1)? as usize).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            Role::Assassin => "Assassin",
            Role::Thief => "Thief",
            Role::Magician => "Magician",
            Role::King => "King",
            Role::Bishop => "Bishop",
            Role::Merchant => "Merchant",
            Role::Architect => "Architect",
            Role::Warlord => "Warlord",
        }
    }

    /// City color that earns this role +1 gold per matching district.
    pub fn income_color(self) -> Option<DistrictColor> {
        match self {
            Role::King => Some(DistrictColor::Noble),
            Role::Bishop => Some(DistrictColor::Religious),
            Role::Merchant => Some(DistrictColor::Trade),
            Role::Warlord => Some(DistrictColor::Military),
            _ => None,
        }
    }

    /// Reveal image shown when the role becomes public.
    pub fn portrait(self) -> &'static str {
        match self {
            Role::Assassin => "roles/assassin.png",
            Role::Thief => "roles/thief.png",
            Role::Magician => "roles/magician.png",
            Role::King => "roles/king.png",
            Role::Bishop => "roles/bishop.png",
            Role::Merchant => "roles/merchant.png",
            Role::Architect => "roles/architect.png",
            Role::Warlord => "roles/warlord.png",
        }
    }

    /// Roles with a player-activated ability (open a pending interaction).
    pub fn has_active_ability(self) -> bool {
        matches!(
            self,
            Role::Assassin | Role::Thief | Role::Magician | Role::Warlord
        )
    }
}
