//! Pet AI (§4.7 step 13).

use glam::Vec2;

use crate::entities::pet::PetType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetAction {
    None,
    Taunt,
    Attack,
}

/// Taunt-all-in-range every 5s (totems never taunt, §3).
pub fn decide_taunt(kind: PetType, taunt_cooldown: f32) -> bool {
    kind.can_taunt() && taunt_cooldown <= 0.0
}

/// Attack nearest enemy within pet range every 1.5s.
pub fn decide_attack(kind: PetType, attack_cooldown: f32, nearest_enemy_distance: Option<f32>) -> PetAction {
    match nearest_enemy_distance {
        Some(distance) if attack_cooldown <= 0.0 && distance <= kind.attack_range() => PetAction::Attack,
        _ => PetAction::None,
    }
}

/// Non-totem pets follow their owner when far away (§3).
pub fn should_follow_owner(kind: PetType, pet_position: Vec2, owner_position: Vec2) -> bool {
    kind.follows_owner() && pet_position.distance(owner_position) > crate::entities::pet::PET_FOLLOW_DISTANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totems_never_taunt() {
        assert!(!decide_taunt(PetType::Totem, 0.0));
        assert!(decide_taunt(PetType::Imp, 0.0));
    }

    #[test]
    fn attack_requires_range_and_cooldown() {
        assert_eq!(decide_attack(PetType::Imp, 0.0, Some(250.0)), PetAction::Attack);
        assert_eq!(decide_attack(PetType::Imp, 0.0, Some(400.0)), PetAction::None);
        assert_eq!(decide_attack(PetType::Imp, 0.5, Some(250.0)), PetAction::None);
    }
}
