//! Buffs and DoTs (§3 Buff/DoT, §4.4, §8 properties 2/3/8).
//!
//! Mirrors the reference engine's `ActiveAuras`/`Aura` component pair
//! (`components/mod.rs`), generalized to arbitrary delta-valued stat
//! modifiers and a stable `icon` key for refresh-not-stack semantics.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::abilities::IconId;

/// Per-stat deltas a buff applies. Stored as the *exact* values applied
/// (§3 invariant 5) so removal can subtract them precisely.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StatModifiers {
    pub armor: i32,
    pub resist: i32,
    pub attack_power: i32,
    pub spell_power: i32,
    pub crit: i32,
    pub max_health: i32,
}

impl StatModifiers {
    pub fn negate(&self) -> StatModifiers {
        StatModifiers {
            armor: -self.armor,
            resist: -self.resist,
            attack_power: -self.attack_power,
            spell_power: -self.spell_power,
            crit: -self.crit,
            max_health: -self.max_health,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Buff {
    pub icon: IconId,
    pub duration: f32,
    pub max_duration: f32,
    pub is_debuff: bool,
    pub stacks: u32,
    pub rank: u8,
    pub stat_modifiers: StatModifiers,
    /// `isStun` (§3 invariant 8): control debuffs with no damage tick.
    pub is_stun: bool,
    pub damage_per_tick: f32,
    pub tick_interval: f32,
    pub last_tick_time: f32,
}

impl Buff {
    pub fn new(icon: IconId, duration: f32, is_debuff: bool) -> Self {
        Self {
            icon,
            duration,
            max_duration: duration,
            is_debuff,
            stacks: 1,
            rank: 1,
            stat_modifiers: StatModifiers::default(),
            is_stun: false,
            damage_per_tick: 0.0,
            tick_interval: 0.0,
            last_tick_time: 0.0,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.duration <= 0.0
    }

    /// `buff.damagePerTick > 0` implies a damaging debuff; `isStun` marks
    /// control debuffs with zero tick damage (§3 invariant 8).
    pub fn is_damaging_dot(&self) -> bool {
        self.damage_per_tick > 0.0
    }
}

/// Owning component: every buff/debuff currently on an entity, keyed so a
/// re-application with the same `icon` refreshes instead of stacking (§8
/// property 3).
#[derive(Component, Debug, Clone, Default)]
pub struct ActiveBuffs {
    pub entries: Vec<Buff>,
}

impl ActiveBuffs {
    pub fn find(&self, icon: IconId) -> Option<&Buff> {
        self.entries.iter().find(|b| b.icon == icon)
    }

    /// Apply or refresh a buff by icon. Returns the stat-modifier delta that
    /// the caller must add to the entity's effective stats (zero if this was
    /// a pure refresh of an identical modifier — the reference design never
    /// double-applies).
    pub fn apply(&mut self, mut buff: Buff) -> StatModifiersDelta {
        if let Some(existing) = self.entries.iter_mut().find(|b| b.icon == buff.icon) {
            let removed = existing.stat_modifiers;
            if buff.icon == IconId::ShamanAncestralSpirit {
                buff.stacks = 1;
            }
            *existing = buff;
            StatModifiersDelta {
                removed,
                added: existing.stat_modifiers,
            }
        } else {
            let added = buff.stat_modifiers;
            self.entries.push(buff);
            StatModifiersDelta {
                removed: StatModifiers::default(),
                added,
            }
        }
    }

    /// Remove a buff by icon, returning the negated delta to subtract from
    /// effective stats (§3 invariant 5).
    pub fn remove(&mut self, icon: IconId) -> Option<StatModifiers> {
        let idx = self.entries.iter().position(|b| b.icon == icon)?;
        let removed = self.entries.remove(idx);
        Some(removed.stat_modifiers)
    }

    pub fn has(&self, icon: IconId) -> bool {
        self.find(icon).is_some()
    }

    pub fn is_stunned(&self) -> bool {
        self.entries.iter().any(|b| b.is_stun)
    }

    /// Advance durations and tick DoTs for one tick; returns (expired icons,
    /// pending DoT ticks as (icon, damage)).
    pub fn advance(&mut self, delta_time: f32) -> (Vec<IconId>, Vec<(IconId, i32)>) {
        let mut expired = Vec::new();
        let mut dot_ticks = Vec::new();
        for buff in &mut self.entries {
            buff.duration -= delta_time;
            if buff.is_damaging_dot() {
                buff.last_tick_time += delta_time;
                if buff.last_tick_time >= buff.tick_interval {
                    buff.last_tick_time -= buff.tick_interval;
                    dot_ticks.push((buff.icon, buff.damage_per_tick.round() as i32));
                }
            }
            if buff.is_expired() {
                expired.push(buff.icon);
            }
        }
        self.entries.retain(|b| !b.is_expired());
        (expired, dot_ticks)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StatModifiersDelta {
    pub removed: StatModifiers,
    pub added: StatModifiers,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reapplying_same_icon_refreshes_not_stacks() {
        let mut buffs = ActiveBuffs::default();
        let mut b = Buff::new(IconId::WarriorRend, 15.0, true);
        b.stat_modifiers.armor = -5;
        buffs.apply(b.clone());
        buffs.entries[0].duration = 2.0;
        buffs.apply(b);
        assert_eq!(buffs.entries.len(), 1);
        assert_eq!(buffs.entries[0].duration, 15.0);
    }

    #[test]
    fn stun_buff_blocks_action() {
        let mut buffs = ActiveBuffs::default();
        let mut b = Buff::new(IconId::MagePyroblastStun, 2.0, true);
        b.is_stun = true;
        buffs.apply(b);
        assert!(buffs.is_stunned());
    }

    #[test]
    fn dot_ticks_on_interval_and_expires() {
        let mut buffs = ActiveBuffs::default();
        let mut b = Buff::new(IconId::WarlockCorruption, 6.0, true);
        b.damage_per_tick = 10.0;
        b.tick_interval = 3.0;
        buffs.apply(b);
        let (expired, ticks) = buffs.advance(3.0);
        assert!(expired.is_empty());
        assert_eq!(ticks, vec![(IconId::WarlockCorruption, 10)]);
        let (expired, _) = buffs.advance(3.0);
        assert_eq!(expired, vec![IconId::WarlockCorruption]);
    }
}
