//! Static catalogues of enemies, shadows and levels.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Resources required to raise a wall.
pub const WALL_BUILD_COST: u32 = 5;

/// Types of enemies that guard a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Balanced guard.
    SecurityAgent,
    /// Fragile, fast and hard-hitting.
    ElfArcher,
    /// Slow, armored and durable.
    AlphaBear,
}

impl EnemyKind {
    /// Static tuning for the enemy kind.
    #[must_use]
    pub const fn profile(self) -> EnemyProfile {
        match self {
            Self::SecurityAgent => EnemyProfile {
                name: "Security Agent",
                health: 30,
                damage: 5,
                move_interval: Duration::from_millis(500),
                detection_range: 8,
                armor: 0,
            },
            Self::ElfArcher => EnemyProfile {
                name: "Elf Archer",
                health: 20,
                damage: 12,
                move_interval: Duration::from_millis(350),
                detection_range: 10,
                armor: 1,
            },
            Self::AlphaBear => EnemyProfile {
                name: "Alpha Bear",
                health: 80,
                damage: 8,
                move_interval: Duration::from_millis(450),
                detection_range: 6,
                armor: 2,
            },
        }
    }
}

/// Tuning shared by every enemy of one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyProfile {
    /// Display name.
    pub name: &'static str,
    /// Health at spawn.
    pub health: u32,
    /// Damage dealt per attack.
    pub damage: u32,
    /// Time between successive steps.
    pub move_interval: Duration,
    /// Manhattan distance below which the target is detected.
    pub detection_range: u32,
    /// Flat reduction applied to incoming hits.
    pub armor: u32,
}

/// Types of shadow companions the player can summon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadowKind {
    /// Cheap infantry.
    Shadow,
    /// Swift elite warrior.
    Igris,
    /// Assassin with the highest damage.
    Beru,
}

impl ShadowKind {
    /// Static tuning for the shadow kind.
    #[must_use]
    pub const fn profile(self) -> ShadowProfile {
        match self {
            Self::Shadow => ShadowProfile {
                name: "Shadow Agent",
                health: 40,
                damage: 5,
                move_interval: Duration::from_millis(400),
                cost: 15,
            },
            Self::Igris => ShadowProfile {
                name: "Igris",
                health: 60,
                damage: 15,
                move_interval: Duration::from_millis(300),
                cost: 40,
            },
            Self::Beru => ShadowProfile {
                name: "Beru",
                health: 50,
                damage: 20,
                move_interval: Duration::from_millis(350),
                cost: 50,
            },
        }
    }
}

/// Tuning shared by every shadow of one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShadowProfile {
    /// Display name.
    pub name: &'static str,
    /// Health at summon time.
    pub health: u32,
    /// Damage dealt per attack.
    pub damage: u32,
    /// Time between successive steps.
    pub move_interval: Duration,
    /// Resources charged on summon and refunded on dismissal.
    pub cost: u32,
}

/// Layout and roster of a single level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelConfig {
    /// Nominal grid size; the generated map is scaled from this value.
    pub grid_size: u32,
    /// Resources the player starts the level with.
    pub start_resources: u32,
    /// Number of resource tiles scattered over the level.
    pub resource_count: u32,
    /// Enemy kinds and how many of each to spawn, in spawn order.
    pub enemies: &'static [(EnemyKind, u32)],
}

const LEVELS: [LevelConfig; 5] = [
    LevelConfig {
        grid_size: 12,
        start_resources: 15,
        resource_count: 3,
        enemies: &[(EnemyKind::SecurityAgent, 1)],
    },
    LevelConfig {
        grid_size: 14,
        start_resources: 12,
        resource_count: 4,
        enemies: &[(EnemyKind::SecurityAgent, 1)],
    },
    LevelConfig {
        grid_size: 16,
        start_resources: 10,
        resource_count: 5,
        enemies: &[(EnemyKind::SecurityAgent, 1), (EnemyKind::AlphaBear, 1)],
    },
    LevelConfig {
        grid_size: 18,
        start_resources: 8,
        resource_count: 6,
        enemies: &[(EnemyKind::SecurityAgent, 1), (EnemyKind::AlphaBear, 1)],
    },
    LevelConfig {
        grid_size: 20,
        start_resources: 5,
        resource_count: 7,
        enemies: &[
            (EnemyKind::ElfArcher, 1),
            (EnemyKind::AlphaBear, 1),
            (EnemyKind::SecurityAgent, 1),
        ],
    },
];

impl LevelConfig {
    /// Number of levels in the campaign.
    pub const COUNT: u32 = LEVELS.len() as u32;

    /// Configuration of the opening level.
    #[must_use]
    pub const fn first() -> LevelConfig {
        LEVELS[0]
    }

    /// Configuration of the one-based level, or `None` past the final level.
    #[must_use]
    pub fn for_level(level: u32) -> Option<LevelConfig> {
        let index = usize::try_from(level.checked_sub(1)?).ok()?;
        LEVELS.get(index).copied()
    }

    /// Total number of enemies spawned on the level.
    #[must_use]
    pub fn enemy_count(&self) -> u32 {
        self.enemies.iter().map(|(_, count)| count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_one_based_and_bounded() {
        assert!(LevelConfig::for_level(0).is_none());
        assert_eq!(LevelConfig::for_level(1).map(|config| config.grid_size), Some(12));
        assert_eq!(
            LevelConfig::for_level(LevelConfig::COUNT).map(|config| config.enemy_count()),
            Some(3)
        );
        assert!(LevelConfig::for_level(LevelConfig::COUNT + 1).is_none());
    }

    #[test]
    fn levels_escalate() {
        let sizes: Vec<u32> = (1..=LevelConfig::COUNT)
            .filter_map(LevelConfig::for_level)
            .map(|config| config.grid_size)
            .collect();
        assert!(sizes.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn faster_enemies_move_more_often() {
        let elf = EnemyKind::ElfArcher.profile();
        let bear = EnemyKind::AlphaBear.profile();
        assert!(elf.move_interval < bear.move_interval);
        assert!(elf.detection_range > bear.detection_range);
    }
}
