//! Player verbs and the `(verb, argument)` parser that produces them.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{WORK_DEFAULT_HOURS, WORK_MAX_HOURS};
use crate::error::Rejection;
use crate::inventory::Device;
use crate::jobs::QuestVerb;
use crate::resources::Consumable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampStyle {
    Stealth,
    Paid,
    Dispersed,
}

impl CampStyle {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stealth => "stealth",
            Self::Paid => "paid",
            Self::Dispersed => "dispersed",
        }
    }
}

impl FromStr for CampStyle {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stealth" => Ok(Self::Stealth),
            "paid" => Ok(Self::Paid),
            "dispersed" | "" => Ok(Self::Dispersed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetVerb {
    Feed,
    Water,
    Walk,
    Play,
    Guard,
    Calm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeMethod {
    Station,
    Solar,
    Wind,
}

/// Anything the outfitter sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "item", rename_all = "snake_case")]
pub enum BuyItem {
    Supply(Consumable),
    Device(Device),
    /// One 200 W panel.
    Solar,
    /// One 300 W turbine.
    Wind,
    /// EV battery module.
    Battery,
    /// Water and pantry expansion.
    Storage,
}

impl BuyItem {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Supply(kind) => kind.as_str(),
            Self::Device(device) => device.as_str(),
            Self::Solar => "solar",
            Self::Wind => "wind",
            Self::Battery => "battery",
            Self::Storage => "storage",
        }
    }
}

impl FromStr for BuyItem {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        match key.as_str() {
            "solar" => return Ok(Self::Solar),
            "wind" => return Ok(Self::Wind),
            "battery" => return Ok(Self::Battery),
            "storage" => return Ok(Self::Storage),
            _ => {}
        }
        key.parse::<Device>()
            .map(Self::Device)
            .or_else(|()| key.parse::<Consumable>().map(Self::Supply))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Hike,
    Work { hours: u32 },
    Nap,
    Cook,
    Eat,
    Pet { verb: PetVerb },
    Refuel { gallons: f32 },
    Read,
    Watch,
    TakePhoto,
    Perform,
    GuideHike,
    GatherParts,
    Drive { miles: f32 },
    Camp { style: CampStyle },
    Buy { item: BuyItem, qty: u32 },
    Charge { method: ChargeMethod },
    Toggle { device: Device, on: bool },
    Repair,
    AdoptPet,
}

impl Action {
    /// Parse a dispatcher's `(verb, argument)` pair. Verbs are
    /// case-insensitive; multi-word verbs may arrive whole in `verb` or split
    /// across `verb` and the leading words of `arg`.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::InvalidAction`] for unknown verbs or malformed
    /// arguments.
    pub fn parse(verb: &str, arg: &str) -> Result<Self, Rejection> {
        let verb = normalize(verb);
        let words: Vec<&str> = arg.split_whitespace().collect();
        for taken in 0..=words.len().min(2) {
            let candidate = if taken == 0 {
                verb.clone()
            } else {
                format!("{verb} {}", normalize(&words[..taken].join(" ")))
            };
            if let Some(action) = Self::parse_exact(&candidate, &words[taken..].join(" "))? {
                return Ok(action);
            }
        }
        Err(Rejection::invalid(format!("unknown verb {verb}")))
    }

    fn parse_exact(verb: &str, arg: &str) -> Result<Option<Self>, Rejection> {
        let action = match verb {
            "HIKE" => Self::Hike,
            "WORK" => Self::Work {
                hours: parse_hours(arg)?,
            },
            "NAP" | "SLEEP" => Self::Nap,
            "COOK" => Self::Cook,
            "EAT" => Self::Eat,
            "FEED PET" => Self::Pet {
                verb: PetVerb::Feed,
            },
            "WATER PET" => Self::Pet {
                verb: PetVerb::Water,
            },
            "WALK PET" => Self::Pet {
                verb: PetVerb::Walk,
            },
            "PLAY PET" | "PLAY WITH PET" => Self::Pet {
                verb: PetVerb::Play,
            },
            "COMMAND PET" => Self::Pet {
                verb: parse_command(arg)?,
            },
            "REFUEL" => Self::Refuel {
                gallons: parse_positive(arg, "REFUEL <gallons>")?,
            },
            "READ" => Self::Read,
            "WATCH" => Self::Watch,
            "TAKE PHOTO" => Self::TakePhoto,
            "PERFORM" => Self::Perform,
            "GUIDE HIKE" => Self::GuideHike,
            "GATHER PARTS" => Self::GatherParts,
            "DRIVE" => Self::Drive {
                miles: parse_positive(arg, "DRIVE <miles>")?,
            },
            "CAMP" => Self::Camp {
                style: arg
                    .parse()
                    .map_err(|()| Rejection::invalid("CAMP stealth | paid | dispersed"))?,
            },
            "BUY" => parse_buy(arg)?,
            "CHARGE" => Self::Charge {
                method: parse_charge(arg)?,
            },
            "TOGGLE" => parse_toggle(arg)?,
            "REPAIR" => Self::Repair,
            "ADOPT PET" => Self::AdoptPet,
            _ => return Ok(None),
        };
        Ok(Some(action))
    }

    /// Canonical verb text, as a dispatcher would print it.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Hike => "HIKE",
            Self::Work { .. } => "WORK",
            Self::Nap => "NAP",
            Self::Cook => "COOK",
            Self::Eat => "EAT",
            Self::Pet { verb } => match verb {
                PetVerb::Feed => "FEED PET",
                PetVerb::Water => "WATER PET",
                PetVerb::Walk => "WALK PET",
                PetVerb::Play => "PLAY WITH PET",
                PetVerb::Guard | PetVerb::Calm => "COMMAND PET",
            },
            Self::Refuel { .. } => "REFUEL",
            Self::Read => "READ",
            Self::Watch => "WATCH",
            Self::TakePhoto => "TAKE PHOTO",
            Self::Perform => "PERFORM",
            Self::GuideHike => "GUIDE HIKE",
            Self::GatherParts => "GATHER PARTS",
            Self::Drive { .. } => "DRIVE",
            Self::Camp { .. } => "CAMP",
            Self::Buy { .. } => "BUY",
            Self::Charge { .. } => "CHARGE",
            Self::Toggle { .. } => "TOGGLE",
            Self::Repair => "REPAIR",
            Self::AdoptPet => "ADOPT PET",
        }
    }

    /// Quest verb this action counts toward, before job or signal checks.
    #[must_use]
    pub const fn quest_verb(&self) -> Option<QuestVerb> {
        match self {
            Self::TakePhoto => Some(QuestVerb::TakePhoto),
            Self::Perform => Some(QuestVerb::Perform),
            Self::GuideHike => Some(QuestVerb::GuideHike),
            Self::GatherParts => Some(QuestVerb::GatherParts),
            Self::Work { .. } => Some(QuestVerb::RemoteWork),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())?;
        match self {
            Self::Work { hours } => write!(f, " {hours}"),
            Self::Refuel { gallons } => write!(f, " {gallons}"),
            Self::Drive { miles } => write!(f, " {miles}"),
            Self::Camp { style } => write!(f, " {}", style.as_str()),
            Self::Buy { item, qty } => write!(f, " {} {qty}", item.as_str()),
            Self::Pet {
                verb: PetVerb::Guard,
            } => f.write_str(" GUARD"),
            Self::Pet {
                verb: PetVerb::Calm,
            } => f.write_str(" CALM"),
            Self::Toggle { device, on } => {
                write!(f, " {device} {}", if *on { "on" } else { "off" })
            }
            _ => Ok(()),
        }
    }
}

fn normalize(verb: &str) -> String {
    verb.split(|c: char| c.is_whitespace() || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_hours(arg: &str) -> Result<u32, Rejection> {
    let token = arg.split_whitespace().last().unwrap_or("");
    if token.is_empty() {
        return Ok(WORK_DEFAULT_HOURS);
    }
    match token.parse::<u32>() {
        Ok(hours) if (1..=WORK_MAX_HOURS).contains(&hours) => Ok(hours),
        _ => Err(Rejection::invalid(format!(
            "WORK takes 1-{WORK_MAX_HOURS} hours"
        ))),
    }
}

fn parse_positive(arg: &str, usage: &str) -> Result<f32, Rejection> {
    match arg.trim().parse::<f32>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(Rejection::invalid(usage)),
    }
}

fn parse_command(arg: &str) -> Result<PetVerb, Rejection> {
    match arg.trim().to_ascii_uppercase().as_str() {
        "GUARD" => Ok(PetVerb::Guard),
        "CALM" => Ok(PetVerb::Calm),
        _ => Err(Rejection::invalid("COMMAND PET GUARD | CALM")),
    }
}

fn parse_charge(arg: &str) -> Result<ChargeMethod, Rejection> {
    match arg.trim().to_ascii_lowercase().as_str() {
        "" | "station" => Ok(ChargeMethod::Station),
        "solar" => Ok(ChargeMethod::Solar),
        "wind" => Ok(ChargeMethod::Wind),
        _ => Err(Rejection::invalid("CHARGE station | solar | wind")),
    }
}

fn parse_buy(arg: &str) -> Result<Action, Rejection> {
    let mut parts = arg.split_whitespace();
    let item = parts
        .next()
        .and_then(|token| token.parse::<BuyItem>().ok())
        .ok_or_else(|| Rejection::invalid("BUY <item> [qty]"))?;
    let qty = match parts.next() {
        None => 1,
        Some(token) => match token.parse::<u32>() {
            Ok(qty) if qty > 0 => qty,
            _ => return Err(Rejection::invalid("quantity must be a positive number")),
        },
    };
    Ok(Action::Buy { item, qty })
}

fn parse_toggle(arg: &str) -> Result<Action, Rejection> {
    let mut parts = arg.split_whitespace();
    let device = parts
        .next()
        .and_then(|token| token.parse::<Device>().ok())
        .ok_or_else(|| Rejection::invalid("TOGGLE <fridge|starlink|heater> <on|off>"))?;
    let on = match parts.next().map(str::to_ascii_lowercase).as_deref() {
        Some("on" | "true" | "1") => true,
        Some("off" | "false" | "0") => false,
        _ => return Err(Rejection::invalid("TOGGLE <device> <on|off>")),
    };
    Ok(Action::Toggle { device, on })
}
