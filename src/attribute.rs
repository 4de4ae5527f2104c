//! Attribute ledger.
//!
//! Holds the six base attributes, the point-buy economy used to purchase
//! them, and racial bonus application. An attribute's modifier is always
//! derived from its value and can never be written on its own.

use crate::gate::Blocked;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Points available to the point-buy before racial bonuses.
pub const POINT_POOL: i32 = 27;

/// Lowest value purchasable with points.
pub const MIN_PURCHASE: i32 = 8;

/// Highest value purchasable with points.
pub const MAX_PURCHASE: i32 = 15;

/// One of the six base attributes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Attribute {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Attribute {
    /// All six attributes in sheet order.
    pub const ALL: [Attribute; 6] = [
        Attribute::Strength,
        Attribute::Dexterity,
        Attribute::Constitution,
        Attribute::Intelligence,
        Attribute::Wisdom,
        Attribute::Charisma,
    ];

    /// Three-letter abbreviation used on printed sheets.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Attribute::Strength => "STR",
            Attribute::Dexterity => "DEX",
            Attribute::Constitution => "CON",
            Attribute::Intelligence => "INT",
            Attribute::Wisdom => "WIS",
            Attribute::Charisma => "CHA",
        }
    }
}

/// Modifier derived from an attribute value: `floor((value - 10) / 2)`.
///
/// Defined for every integer, including post-bonus values above 15.
///
/// # Examples
///
/// ```rust
/// use sheetsmith::attribute::modifier_of;
///
/// assert_eq!(modifier_of(10), 0);
/// assert_eq!(modifier_of(15), 2);
/// assert_eq!(modifier_of(8), -1);
/// assert_eq!(modifier_of(7), -2);
/// ```
pub fn modifier_of(value: i32) -> i32 {
    value.div_euclid(2) - 5
}

/// Point-buy cost of a single attribute value.
///
/// Values 8 to 13 cost `value - 8`; 14 costs 7 and 15 costs 9. Anything
/// outside 8..=15 costs nothing: below 8 is unreachable through the
/// purchase controls and above 15 only happens after racial bonuses.
///
/// # Examples
///
/// ```rust
/// use sheetsmith::attribute::point_buy_cost;
///
/// assert_eq!(point_buy_cost(8), 0);
/// assert_eq!(point_buy_cost(13), 5);
/// assert_eq!(point_buy_cost(14), 7);
/// assert_eq!(point_buy_cost(15), 9);
/// assert_eq!(point_buy_cost(16), 0);
/// ```
pub fn point_buy_cost(value: i32) -> i32 {
    match value {
        8..=13 => value - 8,
        14 => 7,
        15 => 9,
        _ => 0,
    }
}

/// Sum of [`point_buy_cost`] over all six attributes.
pub fn total_points_spent(set: &AttributeSet) -> i32 {
    set.iter().map(|(_, score)| point_buy_cost(score.value())).sum()
}

/// An attribute value together with its derived modifier.
///
/// Serialized as `{"value": .., "mod": ..}`. On deserialization the
/// modifier is recomputed from the value, whatever the input says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeScore {
    value: i32,
    modifier: i32,
}

impl AttributeScore {
    pub fn new(value: i32) -> Self {
        Self {
            value,
            modifier: modifier_of(value),
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    /// The modifier, always `modifier_of(self.value())`.
    pub fn modifier(&self) -> i32 {
        self.modifier
    }

    pub fn set_value(&mut self, value: i32) {
        *self = Self::new(value);
    }

    /// Add a signed delta to the value.
    pub fn adjust(&mut self, delta: i32) {
        self.set_value(self.value.saturating_add(delta));
    }
}

impl Default for AttributeScore {
    fn default() -> Self {
        Self::new(10)
    }
}

#[derive(Serialize, Deserialize)]
struct RawScore {
    value: i32,
    #[serde(rename = "mod", default)]
    modifier: i32,
}

impl Serialize for AttributeScore {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        RawScore {
            value: self.value,
            modifier: self.modifier,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AttributeScore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawScore::deserialize(deserializer)?;
        Ok(AttributeScore::new(raw.value))
    }
}

/// All six attributes; every key is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AttributeSet {
    strength: AttributeScore,
    dexterity: AttributeScore,
    constitution: AttributeScore,
    intelligence: AttributeScore,
    wisdom: AttributeScore,
    charisma: AttributeScore,
}

impl AttributeSet {
    /// Build a set from values in [`Attribute::ALL`] order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sheetsmith::attribute::{Attribute, AttributeSet};
    ///
    /// let set = AttributeSet::from_values([15, 14, 13, 12, 10, 8]);
    /// assert_eq!(set.value(Attribute::Dexterity), 14);
    /// assert_eq!(set.modifier(Attribute::Charisma), -1);
    /// ```
    pub fn from_values(values: [i32; 6]) -> Self {
        let mut set = Self::default();
        for (attribute, value) in Attribute::ALL.into_iter().zip(values) {
            set.set_value(attribute, value);
        }
        set
    }

    pub fn get(&self, attribute: Attribute) -> &AttributeScore {
        match attribute {
            Attribute::Strength => &self.strength,
            Attribute::Dexterity => &self.dexterity,
            Attribute::Constitution => &self.constitution,
            Attribute::Intelligence => &self.intelligence,
            Attribute::Wisdom => &self.wisdom,
            Attribute::Charisma => &self.charisma,
        }
    }

    fn get_mut(&mut self, attribute: Attribute) -> &mut AttributeScore {
        match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Dexterity => &mut self.dexterity,
            Attribute::Constitution => &mut self.constitution,
            Attribute::Intelligence => &mut self.intelligence,
            Attribute::Wisdom => &mut self.wisdom,
            Attribute::Charisma => &mut self.charisma,
        }
    }

    pub fn value(&self, attribute: Attribute) -> i32 {
        self.get(attribute).value()
    }

    pub fn modifier(&self, attribute: Attribute) -> i32 {
        self.get(attribute).modifier()
    }

    pub fn set_value(&mut self, attribute: Attribute, value: i32) {
        self.get_mut(attribute).set_value(value);
    }

    pub fn adjust(&mut self, attribute: Attribute, delta: i32) {
        self.get_mut(attribute).adjust(delta);
    }

    /// Iterate in [`Attribute::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &AttributeScore)> + '_ {
        Attribute::ALL
            .into_iter()
            .map(move |attribute| (attribute, self.get(attribute)))
    }
}

/// Where a racial bonus lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusTarget {
    Fixed(Attribute),
    /// The player picks the attribute.
    FreeChoice,
}

/// A signed racial modifier to one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RacialBonus {
    pub target: BonusTarget,
    pub modifier: i32,
}

impl RacialBonus {
    /// A bonus to a named attribute.
    pub fn to(attribute: Attribute, modifier: i32) -> Self {
        Self {
            target: BonusTarget::Fixed(attribute),
            modifier,
        }
    }

    /// A bonus the player assigns.
    pub fn free(modifier: i32) -> Self {
        Self {
            target: BonusTarget::FreeChoice,
            modifier,
        }
    }

    pub fn is_free_choice(&self) -> bool {
        self.target == BonusTarget::FreeChoice
    }
}

impl fmt::Display for RacialBonus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            BonusTarget::Fixed(attribute) => write!(f, "{attribute} {:+}", self.modifier),
            BonusTarget::FreeChoice => write!(f, "Free {:+}", self.modifier),
        }
    }
}

/// Apply every bonus that names a concrete attribute.
///
/// Free-choice bonuses are skipped; see [`apply_free_bonuses`].
///
/// # Examples
///
/// ```rust
/// use sheetsmith::attribute::{apply_racial_bonuses, Attribute, AttributeSet, RacialBonus};
///
/// let set = AttributeSet::default();
/// let bonuses = [RacialBonus::to(Attribute::Wisdom, 2), RacialBonus::free(1)];
/// let boosted = apply_racial_bonuses(&set, &bonuses);
///
/// assert_eq!(boosted.value(Attribute::Wisdom), 12);
/// assert_eq!(boosted.modifier(Attribute::Wisdom), 1);
/// assert_eq!(set.value(Attribute::Wisdom), 10);
/// ```
pub fn apply_racial_bonuses(set: &AttributeSet, bonuses: &[RacialBonus]) -> AttributeSet {
    let mut result = *set;
    for bonus in bonuses {
        if let BonusTarget::Fixed(attribute) = bonus.target {
            result.adjust(attribute, bonus.modifier);
        }
    }
    result
}

/// Apply the free-choice bonuses, the i-th one to `picks[i]`.
///
/// Every free-choice bonus must be assigned exactly once and no attribute
/// may be picked twice.
pub fn apply_free_bonuses(
    set: &AttributeSet,
    bonuses: &[RacialBonus],
    picks: &[Attribute],
) -> Result<AttributeSet, Blocked> {
    let free: Vec<&RacialBonus> = bonuses.iter().filter(|b| b.is_free_choice()).collect();
    if picks.len() != free.len() {
        return Err(Blocked::FreeBonusUnassigned {
            required: free.len(),
            assigned: picks.len(),
        });
    }
    for (idx, pick) in picks.iter().enumerate() {
        if picks[..idx].contains(pick) {
            return Err(Blocked::DuplicateFreeBonus(*pick));
        }
    }

    let mut result = *set;
    for (bonus, pick) in free.into_iter().zip(picks) {
        result.adjust(*pick, bonus.modifier);
    }
    Ok(result)
}

/// Point-buy spend against a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointBudget {
    pub spent: i32,
    pub pool: i32,
}

impl PointBudget {
    pub fn of(set: &AttributeSet, pool: i32) -> Self {
        Self {
            spent: total_points_spent(set),
            pool,
        }
    }

    /// Points left; negative when over budget.
    pub fn remaining(&self) -> i32 {
        self.pool - self.spent
    }

    pub fn within(&self) -> bool {
        self.spent <= self.pool
    }
}

impl fmt::Display for PointBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let remaining = self.remaining();
        if remaining >= 0 {
            write!(f, "{remaining} of {} points remaining", self.pool)
        } else {
            write!(f, "You exceeded the limit by {} points", -remaining)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_modifier_of_floor_division() {
        assert_eq!(modifier_of(10), 0);
        assert_eq!(modifier_of(11), 0);
        assert_eq!(modifier_of(12), 1);
        assert_eq!(modifier_of(9), -1);
        assert_eq!(modifier_of(8), -1);
        assert_eq!(modifier_of(1), -5);
        assert_eq!(modifier_of(20), 5);
    }

    #[test]
    fn test_modifier_of_extremes() {
        assert_eq!(modifier_of(i32::MIN), i32::MIN / 2 - 5);
        assert_eq!(modifier_of(i32::MIN + 1), i32::MIN / 2 - 5);
        assert_eq!(modifier_of(i32::MAX), i32::MAX / 2 - 5);
        for value in -40..=40 {
            assert_eq!(modifier_of(value), (value - 10).div_euclid(2));
        }
    }

    #[test]
    fn test_adjust_saturates() {
        let mut score = AttributeScore::new(i32::MAX - 1);
        score.adjust(5);
        assert_eq!(score.value(), i32::MAX);
        assert_eq!(score.modifier(), modifier_of(i32::MAX));
    }

    #[test]
    fn test_point_buy_cost_breakpoints() {
        for value in 8..=13 {
            assert_eq!(point_buy_cost(value), value - 8);
        }
        assert_eq!(point_buy_cost(14), 7);
        assert_eq!(point_buy_cost(15), 9);
        assert_eq!(point_buy_cost(7), 0);
        assert_eq!(point_buy_cost(-3), 0);
        assert_eq!(point_buy_cost(18), 0);
    }

    #[test]
    fn test_total_points_spent() {
        let set = AttributeSet::from_values([15, 14, 13, 12, 10, 8]);
        assert_eq!(total_points_spent(&set), 9 + 7 + 5 + 4 + 2);
        assert_eq!(total_points_spent(&AttributeSet::default()), 12);
    }

    #[test]
    fn test_score_modifier_tracks_value() {
        let mut score = AttributeScore::new(13);
        assert_eq!(score.modifier(), 1);
        score.adjust(4);
        assert_eq!(score.value(), 17);
        assert_eq!(score.modifier(), 3);
    }

    #[test]
    fn test_score_deserialize_recomputes_modifier() {
        let score: AttributeScore = serde_json::from_str(r#"{"value": 14, "mod": 9}"#).unwrap();
        assert_eq!(score.modifier(), 2);
        let json = serde_json::to_string(&score).unwrap();
        assert_eq!(json, r#"{"value":14,"mod":2}"#);
    }

    #[test]
    fn test_attribute_from_str() {
        let attribute: Attribute = "wisdom".parse().unwrap();
        assert_eq!(attribute, Attribute::Wisdom);
        assert_eq!(Attribute::iter().count(), 6);
    }

    #[test]
    fn test_negative_racial_bonus() {
        let set = AttributeSet::default();
        let boosted = apply_racial_bonuses(&set, &[RacialBonus::to(Attribute::Charisma, -1)]);
        assert_eq!(boosted.value(Attribute::Charisma), 9);
        assert_eq!(boosted.modifier(Attribute::Charisma), -1);
    }

    #[test]
    fn test_free_bonuses_require_every_pick() {
        let set = AttributeSet::default();
        let bonuses = [RacialBonus::free(1), RacialBonus::free(1), RacialBonus::free(1)];

        let err = apply_free_bonuses(&set, &bonuses, &[Attribute::Strength]).unwrap_err();
        assert_eq!(
            err,
            Blocked::FreeBonusUnassigned {
                required: 3,
                assigned: 1
            }
        );

        let err = apply_free_bonuses(
            &set,
            &bonuses,
            &[Attribute::Strength, Attribute::Wisdom, Attribute::Strength],
        )
        .unwrap_err();
        assert_eq!(err, Blocked::DuplicateFreeBonus(Attribute::Strength));

        let ok = apply_free_bonuses(
            &set,
            &bonuses,
            &[Attribute::Strength, Attribute::Wisdom, Attribute::Charisma],
        )
        .unwrap();
        assert_eq!(ok.value(Attribute::Strength), 11);
        assert_eq!(ok.value(Attribute::Dexterity), 10);
    }

    #[test]
    fn test_point_budget_display() {
        let budget = PointBudget::of(&AttributeSet::from_values([15, 15, 15, 10, 10, 10]), 27);
        assert_eq!(budget.spent, 33);
        assert!(!budget.within());
        assert_eq!(budget.to_string(), "You exceeded the limit by 6 points");

        let budget = PointBudget::of(&AttributeSet::from_values([8; 6]), 27);
        assert_eq!(budget.to_string(), "27 of 27 points remaining");
    }
}
