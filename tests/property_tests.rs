//! Property-based tests for duolog using proptest

use duolog::prelude::*;
use proptest::prelude::*;

fn registry() -> TypeRegistry {
    TypeRegistry::new(StyleTable::new(true))
}

fn level() -> impl Strategy<Value = f64> {
    -1000.0..1000.0f64
}

fn bound() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![Just(None), (-1000.0..1000.0f64).prop_map(Some)]
}

proptest! {
    /// A non-forced type's flag always equals the closed-range check against
    /// the sink's thresholds, with unset sides unbounded.
    #[test]
    fn prop_gate_matches_range(ty_level in level(), min in bound(), max in bound()) {
        let (min, max) = match (min, max) {
            (Some(lo), Some(hi)) if lo > hi => (Some(hi), Some(lo)),
            other => other,
        };
        let mut reg = registry();
        reg.add("probe", LogTypeSpec::new().with_level(ty_level)).unwrap();
        reg.set_minimum_level(Sink::File, min.map(LevelSpec::Value)).unwrap();
        reg.set_maximum_level(Sink::File, max.map(LevelSpec::Value)).unwrap();

        let expected = ty_level >= min.unwrap_or(f64::NEG_INFINITY)
            && ty_level <= max.unwrap_or(f64::INFINITY);
        prop_assert_eq!(reg.get("probe").unwrap().file_enabled(), expected);
        // the other sink is untouched and stays enabled
        prop_assert!(reg.get("probe").unwrap().stdout_enabled());
    }

    /// Forced flags are immune to any sequence of threshold changes until
    /// released, after which they re-derive.
    #[test]
    fn prop_forced_flag_is_stable(
        ty_level in level(),
        pinned in any::<bool>(),
        bounds in prop::collection::vec((bound(), bound()), 1..5),
    ) {
        let mut reg = registry();
        reg.add("probe", LogTypeSpec::new().with_level(ty_level)).unwrap();
        reg.force_flag("probe", Sink::Stdout, Some(pinned)).unwrap();

        let (mut last_min, mut last_max) = (None, None);
        for (min, max) in bounds {
            let (min, max) = match (min, max) {
                (Some(lo), Some(hi)) if lo > hi => (Some(hi), Some(lo)),
                other => other,
            };
            // clear both bounds first so any ordering is accepted
            reg.set_minimum_level(Sink::Stdout, None).unwrap();
            reg.set_maximum_level(Sink::Stdout, max.map(LevelSpec::Value)).unwrap();
            reg.set_minimum_level(Sink::Stdout, min.map(LevelSpec::Value)).unwrap();
            prop_assert_eq!(reg.get("probe").unwrap().stdout_enabled(), pinned);
            (last_min, last_max) = (min, max);
        }

        reg.force_flag("probe", Sink::Stdout, None).unwrap();
        let expected = ty_level >= last_min.unwrap_or(f64::NEG_INFINITY)
            && ty_level <= last_max.unwrap_or(f64::INFINITY);
        prop_assert_eq!(reg.get("probe").unwrap().stdout_enabled(), expected);
    }

    /// Recalculation is idempotent: running it again never changes a flag.
    #[test]
    fn prop_recalculation_idempotent(
        levels in prop::collection::vec(level(), 1..8),
        min in bound(),
        max in bound(),
    ) {
        let (min, max) = match (min, max) {
            (Some(lo), Some(hi)) if lo > hi => (Some(hi), Some(lo)),
            other => other,
        };
        let mut reg = registry();
        for (i, l) in levels.iter().enumerate() {
            reg.add(&format!("t{}", i), LogTypeSpec::new().with_level(*l)).unwrap();
        }
        reg.set_minimum_level(Sink::File, min.map(LevelSpec::Value)).unwrap();
        reg.set_maximum_level(Sink::File, max.map(LevelSpec::Value)).unwrap();

        let before: Vec<bool> = (0..levels.len())
            .map(|i| reg.get(&format!("t{}", i)).unwrap().file_enabled())
            .collect();
        reg.recalculate(Sink::File);
        let after: Vec<bool> = (0..levels.len())
            .map(|i| reg.get(&format!("t{}", i)).unwrap().file_enabled())
            .collect();
        prop_assert_eq!(before, after);
    }

    /// Patching with absent fields preserves the current values exactly.
    #[test]
    fn prop_patch_preserves_absent_fields(
        name in "[a-z]{1,12}",
        ty_level in level(),
        new_name in prop::option::of("[A-Z]{1,12}"),
        new_level in prop::option::of(level()),
    ) {
        let mut reg = registry();
        reg.add(
            "probe",
            LogTypeSpec::new().with_name(name.clone()).with_level(ty_level).with_color("green"),
        ).unwrap();

        let patch = LogTypeSpec {
            name: new_name.clone(),
            level: new_level,
            ..LogTypeSpec::default()
        };
        reg.update("probe", patch).unwrap();

        let ty = reg.get("probe").unwrap();
        let expected_name = new_name.unwrap_or(name);
        prop_assert_eq!(ty.name(), expected_name.as_str());
        prop_assert_eq!(ty.level(), new_level.unwrap_or(ty_level));
        // untouched fields survive any patch
        prop_assert_eq!(ty.color(), Some("green"));
    }

    /// Style wrapping always preserves the body and only ever adds escape
    /// sequences around it.
    #[test]
    fn prop_style_wrap_preserves_body(body in "[ -~]{0,64}") {
        let styled = StyleTable::new(true)
            .resolve(Some("red"), None, &["bold".to_string()])
            .unwrap();
        let wrapped = styled.wrap(&body);
        prop_assert!(wrapped.contains(&body));
        prop_assert!(wrapped.starts_with("\x1b["));
        prop_assert!(wrapped.ends_with("\x1b[0m"));

        let plain = StyleTable::new(false)
            .resolve(Some("red"), None, &["bold".to_string()])
            .unwrap();
        prop_assert_eq!(plain.wrap(&body), body);
    }
}
