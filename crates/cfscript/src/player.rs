//! Player identity and stat snapshot.
//!
//! Every field starts out unknown. A `request` response fills in a whole
//! category and marks it present; a `watch stats` push patches one field
//! without marking its category present.

/// Requests that populate every category of [`PlayerInfo`].
pub const PLAYER_REQUESTS: [&str; 4] = ["player", "stat hp", "stat stats", "stat cmbt"];

/// Identity reported by `request player`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    /// Object tag of the player.
    pub tag: u32,
    /// Title such as `Thor the wizard`.
    pub title: String,
}

/// Vital stats (`request stat hp`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VitalStats {
    /// Hit points.
    pub hp: Option<i64>,
    /// Maximum hit points.
    pub maxhp: Option<i64>,
    /// Spell points.
    pub sp: Option<i64>,
    /// Maximum spell points.
    pub maxsp: Option<i64>,
    /// Grace.
    pub grace: Option<i64>,
    /// Maximum grace.
    pub maxgrace: Option<i64>,
    /// Food.
    pub food: Option<i64>,
}

/// Combat stats (`request stat cmbt`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatStats {
    /// Weapon class.
    pub wc: Option<i64>,
    /// Armour class.
    pub ac: Option<i64>,
    /// Damage.
    pub dam: Option<i64>,
    /// Movement speed.
    pub speed: Option<i64>,
    /// Weapon speed.
    pub weapon_sp: Option<i64>,
}

/// Ability scores (`request stat stats`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbilityScores {
    /// Strength.
    pub str: Option<i64>,
    /// Constitution.
    pub con: Option<i64>,
    /// Dexterity.
    pub dex: Option<i64>,
    /// Intelligence.
    pub int: Option<i64>,
    /// Wisdom.
    pub wis: Option<i64>,
    /// Power.
    pub pow: Option<i64>,
    /// Charisma.
    pub cha: Option<i64>,
}

/// Stat categories answered by `request stat <block>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatBlock {
    /// `hp`: hp maxhp sp maxsp grace maxgrace food.
    Vitals,
    /// `cmbt`: wc ac dam speed `weapon_sp`.
    Combat,
    /// `stats`: str con dex int wis pow cha.
    Abilities,
}

impl StatBlock {
    /// Resolves the block keyword used on the wire.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "hp" => Some(Self::Vitals),
            "cmbt" => Some(Self::Combat),
            "stats" => Some(Self::Abilities),
            _ => None,
        }
    }

    /// Wire keyword of the block.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Vitals => "hp",
            Self::Combat => "cmbt",
            Self::Abilities => "stats",
        }
    }

    /// Field names in wire order.
    #[must_use]
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Vitals => &["hp", "maxhp", "sp", "maxsp", "grace", "maxgrace", "food"],
            Self::Combat => &["wc", "ac", "dam", "speed", "weapon_sp"],
            Self::Abilities => &["str", "con", "dex", "int", "wis", "pow", "cha"],
        }
    }
}

/// Mutable snapshot of what the script knows about its player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerInfo {
    identity: Option<PlayerIdentity>,
    vitals: VitalStats,
    combat: CombatStats,
    abilities: AbilityScores,
    have_vitals: bool,
    have_combat: bool,
    have_abilities: bool,
}

impl PlayerInfo {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Player identity, once `request player` has been answered.
    #[must_use]
    pub const fn identity(&self) -> Option<&PlayerIdentity> {
        self.identity.as_ref()
    }

    /// Player object tag.
    #[must_use]
    pub fn tag(&self) -> Option<u32> {
        self.identity.as_ref().map(|identity| identity.tag)
    }

    /// Full title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.identity
            .as_ref()
            .map(|identity| identity.title.as_str())
    }

    /// Player name: the first word of the title.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.title()
            .map(|title| title.split(' ').next().unwrap_or(title))
    }

    /// Vital stats known so far.
    #[must_use]
    pub const fn vitals(&self) -> &VitalStats {
        &self.vitals
    }

    /// Combat stats known so far.
    #[must_use]
    pub const fn combat(&self) -> &CombatStats {
        &self.combat
    }

    /// Ability scores known so far.
    #[must_use]
    pub const fn abilities(&self) -> &AbilityScores {
        &self.abilities
    }

    /// Whether `block` has been answered at least once.
    #[must_use]
    pub const fn has_block(&self, block: StatBlock) -> bool {
        match block {
            StatBlock::Vitals => self.have_vitals,
            StatBlock::Combat => self.have_combat,
            StatBlock::Abilities => self.have_abilities,
        }
    }

    /// Whether every category has been populated at least once.
    #[must_use]
    pub const fn has_all_stats(&self) -> bool {
        self.identity.is_some() && self.have_vitals && self.have_combat && self.have_abilities
    }

    /// Records the player identity.
    ///
    /// A leading `Player:` label on the title is dropped.
    pub fn set_identity(&mut self, tag: u32, title: &str) {
        let title = title.strip_prefix("Player:").unwrap_or(title).trim_start();
        self.identity = Some(PlayerIdentity {
            tag,
            title: title.to_owned(),
        });
    }

    /// Replaces a whole block from a `request stat` response.
    ///
    /// `values` must hold one entry per [`StatBlock::fields`] name, in order;
    /// the router checks the arity before calling this.
    pub fn set_block(&mut self, block: StatBlock, values: &[i64]) {
        for (name, value) in block.fields().iter().zip(values) {
            self.set_stat(name, *value);
        }
        match block {
            StatBlock::Vitals => self.have_vitals = true,
            StatBlock::Combat => self.have_combat = true,
            StatBlock::Abilities => self.have_abilities = true,
        }
    }

    /// Applies one `watch stats <name> <value>` push.
    ///
    /// Returns `false` for stat names this snapshot does not track; the
    /// client pushes several of those and they are ignored.
    pub fn set_stat(&mut self, name: &str, value: i64) -> bool {
        let slot = match name {
            "hp" => &mut self.vitals.hp,
            "maxhp" => &mut self.vitals.maxhp,
            "sp" => &mut self.vitals.sp,
            "maxsp" => &mut self.vitals.maxsp,
            "grace" => &mut self.vitals.grace,
            "maxgrace" => &mut self.vitals.maxgrace,
            "food" => &mut self.vitals.food,
            "wc" => &mut self.combat.wc,
            "ac" => &mut self.combat.ac,
            "dam" => &mut self.combat.dam,
            "speed" => &mut self.combat.speed,
            "weapon_sp" => &mut self.combat.weapon_sp,
            "str" => &mut self.abilities.str,
            "con" => &mut self.abilities.con,
            "dex" => &mut self.abilities.dex,
            "int" => &mut self.abilities.int,
            "wis" => &mut self.abilities.wis,
            "pow" => &mut self.abilities.pow,
            "cha" => &mut self.abilities.cha,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Whether `name` is a stat this snapshot tracks.
    #[must_use]
    pub fn tracks_stat(name: &str) -> bool {
        [StatBlock::Vitals, StatBlock::Combat, StatBlock::Abilities]
            .iter()
            .any(|block| block.fields().contains(&name))
    }
}
