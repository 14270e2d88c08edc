//! Layered configuration: defaults, TOML file, then environment.

use std::path::Path;

use figment::Jail;
use softfall::{ConfigError, Settings, BASE_ACT_DISTANCE};

fn load(path: Option<&Path>) -> figment::error::Result<Settings> {
    Settings::load(path).map_err(|err| figment::Error::from(err.to_string()))
}

#[test]
fn file_then_environment_override_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "softfall.toml",
            r"
                [policy]
                max_act_distance = 9.0
                velocity_gain = 1.4

                [orchestrator]
                recover_water = false
            ",
        )?;
        jail.set_env("SOFTFALL_POLICY__MAX_ACT_DISTANCE", "11.5");

        let settings = load(Some(Path::new("softfall.toml")))?;
        assert!((settings.policy.max_act_distance - 11.5).abs() < f64::EPSILON);
        assert!((settings.policy.velocity_gain - 1.4).abs() < f64::EPSILON);
        assert!((settings.policy.base_act_distance - BASE_ACT_DISTANCE).abs() < f64::EPSILON);
        assert!(!settings.orchestrator.recover_water);
        Ok(())
    });
}

#[test]
fn defaults_load_without_a_file() {
    Jail::expect_with(|_| {
        assert_eq!(load(None)?, Settings::default());
        Ok(())
    });
}

#[test]
fn out_of_range_environment_value_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("SOFTFALL_SIMULATION__VERTICAL_DRAG", "1.5");
        match Settings::load(None) {
            Err(ConfigError::Invalid { field, detail }) => {
                assert_eq!(field, "simulation.vertical_drag");
                assert!(detail.contains("1.5"));
            }
            other => panic!("expected invalid drag, got {other:?}"),
        }
        Ok(())
    });
}

#[test]
fn mistyped_value_is_a_load_error() {
    Jail::expect_with(|jail| {
        jail.create_file("bad.toml", "[simulation]\nmax_ticks = \"many\"\n")?;
        assert!(matches!(
            Settings::load(Some(Path::new("bad.toml"))),
            Err(ConfigError::Load(_))
        ));
        Ok(())
    });
}
