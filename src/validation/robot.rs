// src/validation/robot.rs

use crate::model::RobotProfile;
use crate::protocol::RobotPlan;

/// Deterministic repair pass over a proposed robot program.
///
/// Clamps out-of-range durations, speeds and temperatures to the profile's
/// declared limits and appends one warning per repair. Steps whose mode is
/// unknown to the profile get a single warning and are otherwise left alone;
/// no step is ever dropped. Checks run in a fixed order per step and steps in
/// program order, so the warning sequence is reproducible for the same
/// plan/profile pair. Re-validating an already-valid plan changes nothing.
pub fn validate(mut plan: RobotPlan, profile: &RobotProfile) -> RobotPlan {
    let RobotPlan {
        robot_program,
        warnings,
        ..
    } = &mut plan;

    for step in robot_program.iter_mut() {
        let Some(spec) = profile.mode_spec(&step.mode) else {
            warnings.push(format!("Mode '{}' is not in robot profile.", step.mode));
            continue;
        };

        if let Some(max) = spec.max_duration_sec {
            if step.duration_sec > max {
                warnings.push(format!(
                    "{}: duration {}s > max {}s; clamped.",
                    step.mode, step.duration_sec, max
                ));
                step.duration_sec = max;
            }
        }

        if let (Some(speed), Some((lo, hi))) = (step.speed, spec.speed_range) {
            if speed < lo || speed > hi {
                warnings.push(format!(
                    "{}: speed {} out of range {}-{}; clamped.",
                    step.mode, speed, lo, hi
                ));
                step.speed = Some(speed.clamp(lo, hi));
            }
        }

        if let (Some(temp), Some((lo, hi))) = (step.temperature_c, spec.temp_c_range) {
            if temp < lo || temp > hi {
                warnings.push(format!(
                    "{}: temp {}°C out of range {}-{}; clamped.",
                    step.mode, temp, lo, hi
                ));
                step.temperature_c = Some(temp.clamp(lo, hi));
            }
        }

        // Categorical field: nothing to clamp to, warn only.
        if let Some(attachment) = &step.attachment {
            if !profile.has_attachment(attachment) {
                warnings.push(format!(
                    "Attachment '{}' not in robot profile attachments list.",
                    attachment
                ));
            }
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RobotModeSpec;
    use crate::protocol::RobotProgramStep;

    fn chef1() -> RobotProfile {
        RobotProfile {
            robot_model: "chef1".into(),
            bowl_capacity_ml: 2500,
            bowl_max_fill_ml: 2000,
            bowl_max_mass_g: 3000,
            attachments: vec!["whisk".into(), "blade".into()],
            modes: vec![
                RobotModeSpec {
                    mode: "HEAT".into(),
                    speed_range: None,
                    temp_c_range: Some((50, 120)),
                    max_duration_sec: Some(600),
                    supports_pulse: None,
                    stir_speeds: None,
                },
                RobotModeSpec {
                    mode: "MIX".into(),
                    speed_range: Some((1, 10)),
                    temp_c_range: None,
                    max_duration_sec: Some(1800),
                    supports_pulse: Some(true),
                    stir_speeds: Some(vec![1, 2, 3]),
                },
            ],
            idioms: serde_json::Map::new(),
        }
    }

    fn step(mode: &str) -> RobotProgramStep {
        RobotProgramStep {
            mode: mode.into(),
            duration_sec: 0,
            speed: None,
            temperature_c: None,
            attachment: None,
            notes: None,
        }
    }

    #[test]
    fn heat_step_clamps_duration_and_temperature() {
        let plan = RobotPlan {
            robot_program: vec![RobotProgramStep {
                duration_sec: 900,
                temperature_c: Some(200),
                ..step("HEAT")
            }],
            ..RobotPlan::default()
        };

        let plan = validate(plan, &chef1());
        let s = &plan.robot_program[0];
        assert_eq!(s.duration_sec, 600);
        assert_eq!(s.temperature_c, Some(120));
        assert_eq!(
            plan.warnings,
            vec![
                "HEAT: duration 900s > max 600s; clamped.".to_string(),
                "HEAT: temp 200°C out of range 50-120; clamped.".to_string(),
            ]
        );
    }

    #[test]
    fn speed_clamps_to_nearer_bound() {
        let plan = RobotPlan {
            robot_program: vec![
                RobotProgramStep {
                    duration_sec: 60,
                    speed: Some(0),
                    ..step("MIX")
                },
                RobotProgramStep {
                    duration_sec: 60,
                    speed: Some(15),
                    ..step("MIX")
                },
            ],
            ..RobotPlan::default()
        };

        let plan = validate(plan, &chef1());
        assert_eq!(plan.robot_program[0].speed, Some(1));
        assert_eq!(plan.robot_program[1].speed, Some(10));
        assert_eq!(plan.warnings.len(), 2);
    }

    #[test]
    fn unknown_mode_gets_one_warning_and_no_repairs() {
        let plan = RobotPlan {
            robot_program: vec![RobotProgramStep {
                duration_sec: 99_999,
                speed: Some(99),
                temperature_c: Some(500),
                attachment: Some("hook".into()),
                ..step("SOUS_VIDE")
            }],
            ..RobotPlan::default()
        };

        let plan = validate(plan, &chef1());
        let s = &plan.robot_program[0];
        // Untouched: unknown mode skips every other check.
        assert_eq!(s.duration_sec, 99_999);
        assert_eq!(s.speed, Some(99));
        assert_eq!(s.temperature_c, Some(500));
        assert_eq!(
            plan.warnings,
            vec!["Mode 'SOUS_VIDE' is not in robot profile.".to_string()]
        );
    }

    #[test]
    fn missing_attachment_warns_but_keeps_value() {
        let plan = RobotPlan {
            robot_program: vec![RobotProgramStep {
                duration_sec: 60,
                attachment: Some("dough hook".into()),
                ..step("MIX")
            }],
            ..RobotPlan::default()
        };

        let plan = validate(plan, &chef1());
        assert_eq!(plan.robot_program[0].attachment.as_deref(), Some("dough hook"));
        assert_eq!(
            plan.warnings,
            vec!["Attachment 'dough hook' not in robot profile attachments list.".to_string()]
        );
    }

    #[test]
    fn validation_is_idempotent() {
        let plan = RobotPlan {
            robot_program: vec![RobotProgramStep {
                duration_sec: 900,
                temperature_c: Some(200),
                attachment: Some("whisk".into()),
                ..step("HEAT")
            }],
            manual_steps: vec!["Подготовить овощи".into()],
            ..RobotPlan::default()
        };

        let once = validate(plan, &chef1());
        let twice = validate(once.clone(), &chef1());
        assert_eq!(once, twice);
    }

    #[test]
    fn untouched_lists_survive() {
        let plan = RobotPlan {
            robot_program: vec![step("HEAT")],
            manual_steps: vec!["manual".into()],
            warnings: vec!["pre-existing".into()],
            questions: vec![serde_json::json!({"key": "q"})],
            cannot_map: vec!["flambé".into()],
        };

        let plan = validate(plan, &chef1());
        assert_eq!(plan.manual_steps, vec!["manual".to_string()]);
        assert_eq!(plan.warnings, vec!["pre-existing".to_string()]);
        assert_eq!(plan.questions.len(), 1);
        assert_eq!(plan.cannot_map, vec!["flambé".to_string()]);
    }
}
