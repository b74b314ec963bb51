//! Card effect taxonomy and the mini-language that defines it.
//!
//! Effects come in three pieces:
//! - `EffectDef`: closed enumeration of every effect kind a card can carry
//! - `parse_effects`: the sole parser of the effect-definitions string
//! - `EffectRegistry`: read-only lookup from card to parsed effects
//!
//! Definitions are parsed exactly once, at card construction; game code
//! only ever sees typed `EffectDef` values. The raw string exists for
//! serialization and the authoring tool.

mod effect;
mod parser;
mod registry;

pub use effect::{
    ActivatedAction, ActivatedEffect, ContinuousEffect, CostDomain, CostModEffect, EffectDef,
    EffectScope, InterruptEffect, PlayAction, PlayEffect, ProtectionEffect, TriggerEvent,
    TriggeredAction, TriggeredEffect,
};
pub use parser::{parse_effects, EffectParseError};
pub use registry::EffectRegistry;
