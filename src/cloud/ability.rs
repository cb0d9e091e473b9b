// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{AsRefStr, Display, EnumString, VariantNames};

/// Named feature flag of a Crownstone.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumString,
    VariantNames,
    Deserialize,
    Serialize,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum Ability {
    Dimming,
    TapToToggle,
    Switchcraft,
}

/// Human readable ability state used in the entity attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
pub enum AbilityState {
    Enabled,
    Disabled,
}

impl From<bool> for AbilityState {
    fn from(enabled: bool) -> Self {
        if enabled {
            AbilityState::Enabled
        } else {
            AbilityState::Disabled
        }
    }
}

/// Enabled state of all abilities of a Crownstone.
///
/// Abilities not reported by the cloud are treated as disabled.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Abilities(HashMap<Ability, bool>);

impl Abilities {
    pub fn is_enabled(&self, ability: Ability) -> bool {
        self.0.get(&ability).copied().unwrap_or_default()
    }

    pub fn state(&self, ability: Ability) -> AbilityState {
        self.is_enabled(ability).into()
    }

    /// Set the enabled state of an ability.
    ///
    /// Returns true if the state changed.
    pub fn set_enabled(&mut self, ability: Ability, enabled: bool) -> bool {
        let previous = self.is_enabled(ability);
        self.0.insert(ability, enabled);
        previous != enabled
    }
}

impl<const N: usize> From<[(Ability, bool); N]> for Abilities {
    fn from(value: [(Ability, bool); N]) -> Self {
        Self(HashMap::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case("dimming", Ability::Dimming)]
    #[case("tapToToggle", Ability::TapToToggle)]
    #[case("switchcraft", Ability::Switchcraft)]
    fn ability_from_cloud_type(#[case] name: &str, #[case] expected: Ability) {
        assert_eq!(Ok(expected), Ability::from_str(name));
        assert_eq!(name, expected.to_string());
    }

    #[test]
    fn missing_ability_is_disabled() {
        let abilities = Abilities::from([(Ability::Dimming, true)]);
        assert!(abilities.is_enabled(Ability::Dimming));
        assert!(!abilities.is_enabled(Ability::Switchcraft));
        assert_eq!(AbilityState::Disabled, abilities.state(Ability::TapToToggle));
        assert_eq!("Enabled", abilities.state(Ability::Dimming).to_string());
    }

    #[test]
    fn set_enabled_reports_changes_only() {
        let mut abilities = Abilities::from([(Ability::Dimming, false)]);
        assert!(!abilities.set_enabled(Ability::Dimming, false));
        assert!(abilities.set_enabled(Ability::Dimming, true));
        assert!(!abilities.set_enabled(Ability::Dimming, true));
    }

    #[test]
    fn deserialize_abilities_map() {
        let abilities: Abilities =
            serde_json::from_str(r#"{"dimming": true, "tapToToggle": false}"#).unwrap();
        assert!(abilities.is_enabled(Ability::Dimming));
        assert!(!abilities.is_enabled(Ability::TapToToggle));
    }
}
