//=========================================================================
// Idle-Threshold Planning
//=========================================================================
//
// Pure decision logic between persisted settings and the external
// idle-signal collaborator. The collaborator owns actual idle detection;
// this module only computes which knobs it should be handed, as an
// ordered action list, so the decisions stay trivially testable.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::settings::PowerMode;

//=== Constants ===========================================================

pub const DEFAULT_IDLE_THRESHOLD_SECS: u32 = 300;

//=== Threshold Computation ===============================================

/// Idle threshold in seconds for a configured minute count. The
/// collaborator rejects thresholds under a minute, so 60 is the floor.
pub fn idle_threshold_secs(minutes: u32) -> u32 {
    (minutes * 60).max(60)
}

/// Whether the collaborator's threshold needs re-arming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdUpdate {
    pub should_update: bool,
    pub new_threshold: u32,
}

pub fn should_update_idle_threshold(minutes: u32, current_threshold: u32, force: bool) -> ThresholdUpdate {
    let new_threshold = idle_threshold_secs(minutes);
    ThresholdUpdate {
        should_update: force || new_threshold != current_threshold,
        new_threshold,
    }
}

//=== Action Planning =====================================================

/// One instruction for the idle-signal collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleAction {
    SetPowerMode(PowerMode),
    SetIdleThreshold { minutes: u32, force: bool },
    Disable,
}

/// An enablement decision plus the actions realizing it, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdlePlan {
    pub enabled: bool,
    pub actions: Vec<IdleAction>,
}

/// Plans collaborator setup from freshly-loaded settings.
///
/// The threshold set is always forced here: skipping it when the value
/// looks unchanged left the collaborator unarmed after a restart.
pub fn plan_startup(
    power_mode: Option<PowerMode>,
    idle_minutes: Option<u32>,
    local_enabled: Option<bool>,
    default_idle_minutes: u32,
) -> IdlePlan {
    let enabled = local_enabled.unwrap_or(true);
    let mut actions = Vec::new();

    if enabled {
        if let Some(mode) = power_mode {
            actions.push(IdleAction::SetPowerMode(mode));
        }
        actions.push(IdleAction::SetIdleThreshold {
            minutes: idle_minutes.filter(|m| *m > 0).unwrap_or(default_idle_minutes),
            force: true,
        });
    } else {
        actions.push(IdleAction::Disable);
    }

    IdlePlan { enabled, actions }
}

/// Plans collaborator updates for a settings-changed notification.
pub fn plan_settings_change(enabled: bool, power_mode: PowerMode, idle_minutes: Option<u32>) -> IdlePlan {
    let mut actions = Vec::new();

    if enabled {
        actions.push(IdleAction::SetPowerMode(power_mode));
        if let Some(minutes) = idle_minutes.filter(|m| *m > 0) {
            actions.push(IdleAction::SetIdleThreshold { minutes, force: false });
        }
    } else {
        actions.push(IdleAction::Disable);
    }

    IdlePlan { enabled, actions }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    //=====================================================================
    // Threshold Tests
    //=====================================================================

    #[test]
    fn threshold_converts_minutes_to_seconds() {
        assert_eq!(idle_threshold_secs(5), 300);
        assert_eq!(idle_threshold_secs(2), 120);
    }

    #[test]
    fn threshold_enforces_one_minute_floor() {
        assert_eq!(idle_threshold_secs(0), 60, "sub-minute thresholds clamp to 60s");
    }

    #[test]
    fn update_skips_when_unchanged() {
        let u = should_update_idle_threshold(5, 300, false);
        assert!(!u.should_update);
        assert_eq!(u.new_threshold, 300);
    }

    #[test]
    fn update_fires_on_change_or_force() {
        assert!(should_update_idle_threshold(10, 300, false).should_update);
        assert!(should_update_idle_threshold(5, 300, true).should_update);
    }

    //=====================================================================
    // Startup Planning Tests
    //=====================================================================

    #[test]
    fn startup_defaults_to_enabled() {
        let plan = plan_startup(None, None, None, 5);
        assert!(plan.enabled);
        assert_eq!(
            plan.actions,
            vec![IdleAction::SetIdleThreshold { minutes: 5, force: true }],
            "the threshold set must always be forced on startup"
        );
    }

    #[test]
    fn startup_applies_power_mode_first() {
        let plan = plan_startup(Some(PowerMode::Display), Some(3), Some(true), 5);
        assert_eq!(
            plan.actions,
            vec![
                IdleAction::SetPowerMode(PowerMode::Display),
                IdleAction::SetIdleThreshold { minutes: 3, force: true },
            ]
        );
    }

    #[test]
    fn startup_disabled_yields_only_disable() {
        let plan = plan_startup(Some(PowerMode::System), Some(3), Some(false), 5);
        assert!(!plan.enabled);
        assert_eq!(plan.actions, vec![IdleAction::Disable]);
    }

    //=====================================================================
    // Settings-change Planning Tests
    //=====================================================================

    #[test]
    fn change_without_minutes_skips_threshold() {
        let plan = plan_settings_change(true, PowerMode::Normal, None);
        assert_eq!(plan.actions, vec![IdleAction::SetPowerMode(PowerMode::Normal)]);
    }

    #[test]
    fn change_with_minutes_rearms_unforced() {
        let plan = plan_settings_change(true, PowerMode::Normal, Some(7));
        assert_eq!(
            plan.actions,
            vec![
                IdleAction::SetPowerMode(PowerMode::Normal),
                IdleAction::SetIdleThreshold { minutes: 7, force: false },
            ]
        );
    }

    #[test]
    fn change_to_disabled_yields_disable() {
        let plan = plan_settings_change(false, PowerMode::Display, Some(7));
        assert_eq!(plan.actions, vec![IdleAction::Disable]);
    }
}
