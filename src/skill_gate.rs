//! Skill gate.
//!
//! Splits a class's skill rules into the skills the class forces and the
//! quota of skills the player chooses freely, and enforces that the free
//! quota is met exactly.

use crate::catalog::{ClassDescriptor, SkillRuleGroup};
use crate::gate::Blocked;
use crate::skill::Skill;
use std::collections::BTreeSet;

/// Skill rules of one class, ready for checking selections.
///
/// # Examples
///
/// ```rust
/// use sheetsmith::catalog::{ClassDescriptor, SkillRuleGroup};
/// use sheetsmith::skill::Skill;
/// use sheetsmith::skill_gate::SkillGate;
///
/// let class = ClassDescriptor::new("Ranger", 16, 4, 4, 4)
///     .with_skill_group(SkillRuleGroup::AllOf(vec![Skill::Survival]))
///     .with_skill_group(SkillRuleGroup::OneOf(vec![Skill::Fight, Skill::Aim]))
///     .with_free_skills(2, vec![Skill::Stealth, Skill::Perception, Skill::Riding]);
/// let gate = SkillGate::for_class(&class);
///
/// assert!(gate.is_mandatory(Skill::Survival));
/// assert!(!gate.is_mandatory(Skill::Fight));
/// assert!(gate.can_proceed(&[Skill::Stealth, Skill::Riding]));
/// assert!(!gate.can_proceed(&[Skill::Stealth]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillGate {
    mandatory: BTreeSet<Skill>,
    allowed: Vec<Skill>,
    required: usize,
}

impl SkillGate {
    pub fn for_class(class: &ClassDescriptor) -> Self {
        let mut mandatory = BTreeSet::new();
        for group in &class.skill_groups {
            match group {
                SkillRuleGroup::AllOf(list) => mandatory.extend(list.iter().copied()),
                SkillRuleGroup::OneOf(list) if list.len() == 1 => {
                    mandatory.extend(list.iter().copied())
                }
                SkillRuleGroup::OneOf(_) => {}
            }
        }

        Self {
            mandatory,
            allowed: class.free_skills.allowed.clone(),
            required: class.free_skills.count,
        }
    }

    /// Skills the class always trains.
    pub fn mandatory(&self) -> &BTreeSet<Skill> {
        &self.mandatory
    }

    pub fn is_mandatory(&self, skill: Skill) -> bool {
        self.mandatory.contains(&skill)
    }

    /// Skills offered for free selection, in catalog order.
    pub fn allowed(&self) -> &[Skill] {
        &self.allowed
    }

    /// Number of free selections the class requires.
    pub fn required(&self) -> usize {
        self.required
    }

    /// The free part of a selection: everything that is not mandatory,
    /// without duplicates, in first-seen order.
    pub fn free_part(&self, selected: &[Skill]) -> Vec<Skill> {
        let mut free = Vec::new();
        for skill in selected {
            if !self.is_mandatory(*skill) && !free.contains(skill) {
                free.push(*skill);
            }
        }
        free
    }

    /// Check a selection against the rules.
    ///
    /// Mandatory skills in `selected` are ignored; every other entry counts
    /// toward the quota and must come from the allowed list.
    pub fn check(&self, selected: &[Skill]) -> Result<(), Blocked> {
        let free = self.free_part(selected);
        if let Some(skill) = free.iter().find(|s| !self.allowed.contains(s)) {
            return Err(Blocked::SkillNotAllowed(*skill));
        }
        if free.len() != self.required {
            return Err(Blocked::SkillCount {
                selected: free.len(),
                required: self.required,
            });
        }
        Ok(())
    }

    /// Exactly the required number of free skills is selected.
    pub fn can_proceed(&self, selected: &[Skill]) -> bool {
        self.free_part(selected).len() == self.required
    }

    /// Mandatory skills plus the free part of `selected`.
    pub fn trained(&self, selected: &[Skill]) -> BTreeSet<Skill> {
        let mut trained = self.mandatory.clone();
        trained.extend(self.free_part(selected));
        trained
    }
}

/// An interactive skill selection that honors the gate's lock and cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillSelection {
    gate: SkillGate,
    free: Vec<Skill>,
}

impl SkillSelection {
    /// Start from an earlier selection, e.g. when the player returns to
    /// the skills step. Mandatory entries are dropped from the free part.
    pub fn new(gate: SkillGate, previous: &[Skill]) -> Self {
        let free = gate.free_part(previous);
        Self { gate, free }
    }

    pub fn gate(&self) -> &SkillGate {
        &self.gate
    }

    /// Freely chosen skills, in selection order.
    pub fn free(&self) -> &[Skill] {
        &self.free
    }

    pub fn is_selected(&self, skill: Skill) -> bool {
        self.gate.is_mandatory(skill) || self.free.contains(&skill)
    }

    /// A candidate that cannot be toggled on right now.
    pub fn is_disabled(&self, skill: Skill) -> bool {
        if self.gate.is_mandatory(skill) {
            return true;
        }
        !self.free.contains(&skill) && self.free.len() >= self.gate.required
    }

    /// Toggle a skill; returns whether the selection changed.
    ///
    /// Mandatory skills cannot be deselected, and once the quota is full
    /// new candidates are refused.
    pub fn toggle(&mut self, skill: Skill) -> bool {
        if self.gate.is_mandatory(skill) {
            return false;
        }
        if let Some(pos) = self.free.iter().position(|s| *s == skill) {
            self.free.remove(pos);
            return true;
        }
        if self.is_disabled(skill) || !self.gate.allowed.contains(&skill) {
            return false;
        }
        self.free.push(skill);
        true
    }

    /// Skills still to pick; negative when over the quota.
    pub fn remaining(&self) -> i64 {
        self.gate.required as i64 - self.free.len() as i64
    }

    pub fn can_proceed(&self) -> bool {
        self.gate.can_proceed(&self.free)
    }

    /// Progress message for the quota.
    pub fn status(&self) -> String {
        match self.remaining() {
            n if n >= 0 => format!("{n} skill(s) remaining"),
            n => format!("{} skill(s) over the limit", -n),
        }
    }

    /// Every selected skill, mandatory first.
    pub fn selected(&self) -> Vec<Skill> {
        self.gate
            .mandatory
            .iter()
            .copied()
            .chain(self.free.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_of_five() -> ClassDescriptor {
        ClassDescriptor::new("Rogue", 12, 3, 4, 4)
            .with_skill_group(SkillRuleGroup::AllOf(vec![Skill::Thievery, Skill::Stealth]))
            .with_skill_group(SkillRuleGroup::OneOf(vec![Skill::Reflexes]))
            .with_free_skills(
                2,
                vec![
                    Skill::Acrobatics,
                    Skill::Deception,
                    Skill::Perception,
                    Skill::Gambling,
                    Skill::Investigation,
                ],
            )
    }

    #[test]
    fn test_mandatory_union() {
        let gate = SkillGate::for_class(&two_of_five());
        let mandatory: Vec<Skill> = gate.mandatory().iter().copied().collect();
        assert_eq!(
            mandatory,
            vec![Skill::Stealth, Skill::Thievery, Skill::Reflexes]
        );
    }

    #[test]
    fn test_multi_entry_one_of_is_not_mandatory() {
        let class = ClassDescriptor::new("Fighter", 20, 5, 3, 3)
            .with_skill_group(SkillRuleGroup::OneOf(vec![Skill::Fight, Skill::Aim]));
        let gate = SkillGate::for_class(&class);
        assert!(gate.mandatory().is_empty());
    }

    #[test]
    fn test_exact_count() {
        let gate = SkillGate::for_class(&two_of_five());
        assert!(!gate.can_proceed(&[Skill::Acrobatics]));
        assert!(gate.can_proceed(&[Skill::Acrobatics, Skill::Gambling]));
        assert!(!gate.can_proceed(&[Skill::Acrobatics, Skill::Gambling, Skill::Perception]));
        // mandatory entries never count toward the quota
        assert!(gate.can_proceed(&[Skill::Stealth, Skill::Acrobatics, Skill::Gambling]));
    }

    #[test]
    fn test_check_rejects_foreign_skill() {
        let gate = SkillGate::for_class(&two_of_five());
        assert_eq!(
            gate.check(&[Skill::Acrobatics, Skill::Mysticism]),
            Err(Blocked::SkillNotAllowed(Skill::Mysticism))
        );
        assert_eq!(
            gate.check(&[Skill::Acrobatics]),
            Err(Blocked::SkillCount {
                selected: 1,
                required: 2
            })
        );
    }

    #[test]
    fn test_trained_includes_mandatory() {
        let gate = SkillGate::for_class(&two_of_five());
        let trained = gate.trained(&[Skill::Deception]);
        assert!(trained.contains(&Skill::Thievery));
        assert!(trained.contains(&Skill::Reflexes));
        assert!(trained.contains(&Skill::Deception));
        assert_eq!(trained.len(), 4);
    }

    #[test]
    fn test_selection_cap_and_lock() {
        let gate = SkillGate::for_class(&two_of_five());
        let mut selection = SkillSelection::new(gate, &[]);

        assert!(!selection.toggle(Skill::Stealth));
        assert!(selection.is_selected(Skill::Stealth));

        assert!(selection.toggle(Skill::Acrobatics));
        assert!(selection.toggle(Skill::Deception));
        assert!(selection.can_proceed());
        assert!(selection.is_disabled(Skill::Perception));
        assert!(!selection.toggle(Skill::Perception));
        assert_eq!(selection.remaining(), 0);
        assert_eq!(selection.status(), "0 skill(s) remaining");

        assert!(selection.toggle(Skill::Acrobatics));
        assert!(!selection.is_disabled(Skill::Perception));
        assert!(!selection.can_proceed());
        assert_eq!(selection.remaining(), 1);
    }

    #[test]
    fn test_selection_from_previous() {
        let gate = SkillGate::for_class(&two_of_five());
        let selection =
            SkillSelection::new(gate, &[Skill::Thievery, Skill::Gambling, Skill::Gambling]);
        assert_eq!(selection.free(), &[Skill::Gambling]);
        assert_eq!(selection.selected().len(), 4);
    }

    #[test]
    fn test_status_over_quota() {
        let gate = SkillGate::for_class(&two_of_five());
        // previous selections are kept as given, even past the quota
        let selection = SkillSelection::new(
            gate,
            &[Skill::Acrobatics, Skill::Deception, Skill::Gambling],
        );
        assert_eq!(selection.remaining(), -1);
        assert_eq!(selection.status(), "1 skill(s) over the limit");
        assert!(!selection.can_proceed());
    }
}
