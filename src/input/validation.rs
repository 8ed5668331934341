//! `CREATE_RUN_FROM_SAVE` validation (§6, §8 property 14).

use crate::catalog::classes::ClassId;
use crate::error::{DungeonError, DungeonResult};
use crate::net::intents::SaveData;

pub const MAX_NAME_LEN: usize = 30;
pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 50;
pub const MAX_GOLD: u32 = 99_999;
pub const MIN_FLOOR: u32 = 1;
pub const MAX_FLOOR: u32 = 30;
pub const MAX_ABILITIES: usize = 10;
pub const MAX_BACKPACK_ITEMS: usize = 20;
pub const MAX_LIVES: u8 = 5;

/// Rejects on any of the conditions enumerated in §6; never partially
/// applies a bad save to Run state (§7 "never mutate state").
pub fn validate_save_data(save: &SaveData) -> DungeonResult<()> {
    if save.name.is_empty() || save.name.len() > MAX_NAME_LEN {
        return Err(DungeonError::Validation(format!(
            "name length must be 1..={MAX_NAME_LEN}, got {}",
            save.name.len()
        )));
    }
    if ClassId::from_str(&save.class_id).is_none() {
        return Err(DungeonError::Validation(format!("unknown classId {:?}", save.class_id)));
    }
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&save.level) {
        return Err(DungeonError::Validation(format!(
            "level must be {MIN_LEVEL}..={MAX_LEVEL}, got {}",
            save.level
        )));
    }
    if save.gold > MAX_GOLD {
        return Err(DungeonError::Validation(format!("gold must be <= {MAX_GOLD}, got {}", save.gold)));
    }
    if !(MIN_FLOOR..=MAX_FLOOR).contains(&save.floor) {
        return Err(DungeonError::Validation(format!(
            "floor must be {MIN_FLOOR}..={MAX_FLOOR}, got {}",
            save.floor
        )));
    }
    if save.abilities.len() > MAX_ABILITIES {
        return Err(DungeonError::Validation(format!(
            "abilities must be <= {MAX_ABILITIES}, got {}",
            save.abilities.len()
        )));
    }
    if save.backpack_len > MAX_BACKPACK_ITEMS {
        return Err(DungeonError::Validation(format!(
            "backpack must be <= {MAX_BACKPACK_ITEMS}, got {}",
            save.backpack_len
        )));
    }
    if save.xp < 0 {
        return Err(DungeonError::Validation(format!("xp must be >= 0, got {}", save.xp)));
    }
    if save.lives > MAX_LIVES {
        return Err(DungeonError::Validation(format!("lives must be <= {MAX_LIVES}, got {}", save.lives)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_save() -> SaveData {
        SaveData {
            name: "Thrall".into(),
            class_id: "warrior".into(),
            level: 10,
            gold: 500,
            floor: 3,
            abilities: vec![],
            backpack_len: 5,
            xp: 100,
            lives: 3,
        }
    }

    #[test]
    fn accepts_a_well_formed_save() {
        assert!(validate_save_data(&valid_save()).is_ok());
    }

    #[test]
    fn rejects_empty_name() {
        let mut save = valid_save();
        save.name = String::new();
        assert!(validate_save_data(&save).is_err());
    }

    #[test]
    fn rejects_name_over_max_length() {
        let mut save = valid_save();
        save.name = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_save_data(&save).is_err());
    }

    #[test]
    fn rejects_unknown_class() {
        let mut save = valid_save();
        save.class_id = "necromancer".into();
        assert!(validate_save_data(&save).is_err());
    }

    #[test]
    fn rejects_out_of_range_level_gold_floor_lives() {
        let mut save = valid_save();
        save.level = 0;
        assert!(validate_save_data(&save).is_err());

        let mut save = valid_save();
        save.gold = MAX_GOLD + 1;
        assert!(validate_save_data(&save).is_err());

        let mut save = valid_save();
        save.floor = 0;
        assert!(validate_save_data(&save).is_err());

        let mut save = valid_save();
        save.lives = MAX_LIVES + 1;
        assert!(validate_save_data(&save).is_err());
    }

    #[test]
    fn rejects_too_many_abilities_or_backpack_items() {
        let mut save = valid_save();
        save.abilities = vec![crate::catalog::abilities::AbilityId::WarriorStrike; MAX_ABILITIES + 1];
        assert!(validate_save_data(&save).is_err());

        let mut save = valid_save();
        save.backpack_len = MAX_BACKPACK_ITEMS + 1;
        assert!(validate_save_data(&save).is_err());
    }

    #[test]
    fn rejects_negative_xp() {
        let mut save = valid_save();
        save.xp = -1;
        assert!(validate_save_data(&save).is_err());
    }
}
