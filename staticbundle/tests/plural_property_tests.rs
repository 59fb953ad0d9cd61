use proptest::prelude::*;
use staticbundle::{LocaleSetting, PluralRule, Processor, SourceSetConfig};
use std::{collections::BTreeMap, fs};
use tempfile::TempDir;

/// Well-known gettext rules with their number of forms.
const RULES: &[(&str, usize, &str)] = &[
    ("ja", 1, "0"),
    ("en", 2, "n != 1"),
    ("fr", 2, "n > 1 ? 1 : 0"),
    (
        "ru",
        3,
        "n % 10 == 1 && n % 100 != 11 ? 0 : n % 10 >= 2 && n % 10 <= 4 && (n % 100 < 10 || n % 100 >= 20) ? 1 : 2",
    ),
    (
        "pl",
        3,
        "n == 1 ? 0 : n % 10 >= 2 && n % 10 <= 4 && (n % 100 < 10 || n % 100 >= 20) ? 1 : 2",
    ),
    ("cs", 3, "(n == 1) ? 0 : (n >= 2 && n <= 4) ? 1 : 2"),
    (
        "ar",
        6,
        "n == 0 ? 0 : n == 1 ? 1 : n == 2 ? 2 : n % 100 >= 3 && n % 100 <= 10 ? 3 : n % 100 >= 11 ? 4 : 5",
    ),
];

fn compiled() -> Vec<PluralRule> {
    RULES
        .iter()
        .map(|(locale, forms, source)| PluralRule::compile(*locale, *forms, *source).unwrap())
        .collect()
}

#[test]
fn test_known_rules_pass_range_sampling() {
    for rule in compiled() {
        assert_eq!(rule.find_out_of_range(), None, "{}", rule.locale);
    }
}

#[test]
fn test_sampling_catches_rules_that_only_fail_for_negatives() {
    let rule = PluralRule::compile("xx", 2, "n % 2").unwrap();
    assert_eq!(rule.find_out_of_range(), Some((-15, -1)));
}

proptest! {
    #[test]
    fn prop_known_rules_stay_in_range(n in 0i64..=i64::MAX) {
        for rule in compiled() {
            prop_assert!(rule.form_index(n).is_some(), "{} yields {} for {}", rule.locale, rule.evaluate(n), n);
        }
    }

    #[test]
    fn prop_evaluation_is_pure(n in any::<i64>()) {
        for rule in compiled() {
            prop_assert_eq!(rule.evaluate(n), rule.evaluate(n));
        }
    }

    #[test]
    fn prop_remainder_matches_checked_rem(n in any::<i64>(), d in 1i64..1000) {
        let rule = PluralRule::compile("xx", 1000, format!("n % {}", d)).unwrap();
        prop_assert_eq!(rule.evaluate(n), n.checked_rem(d).unwrap_or(0));
    }
}

fn key_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("k[a-z0-9]{0,11}").expect("valid key regex")
}

fn value_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 ,!\\?\\.]{1,30}").expect("valid value regex")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_output_is_independent_of_location(
        values in prop::collection::btree_map(key_strategy(), value_strategy(), 1..8)
    ) {
        let render = |values: &BTreeMap<String, String>| {
            let dir = TempDir::new().unwrap();
            let res = dir.path().join("res");
            fs::create_dir_all(&res).unwrap();
            let content: String = values
                .iter()
                .map(|(k, v)| format!("{}={}\n", k, v.trim_start()))
                .collect();
            fs::write(res.join("messages.properties"), content).unwrap();

            let config = SourceSetConfig::new(
                "gen_text::Texts",
                vec![LocaleSetting::root(2, "n != 1")],
            );
            let generated = Processor::new(config, &res, dir.path().join("out"))
                .generate()
                .unwrap();
            fs::read(generated.path()).unwrap()
        };
        prop_assert_eq!(render(&values), render(&values));
    }
}
