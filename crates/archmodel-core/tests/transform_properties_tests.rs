use archmodel_core::projection::{
    apply_transform, to_kebab_case, to_pascal_case, to_snake_case, PropertyTransform,
    TransformKind,
};
use archmodel_core::PropertyValue;
use proptest::prelude::*;

proptest! {
    #[test]
    fn kebab_is_idempotent(input in "\\PC{0,40}") {
        let once = to_kebab_case(&input);
        prop_assert_eq!(to_kebab_case(&once), once);
    }

    #[test]
    fn snake_is_idempotent(input in "\\PC{0,40}") {
        let once = to_snake_case(&input);
        prop_assert_eq!(to_snake_case(&once), once);
    }

    #[test]
    fn pascal_is_idempotent(input in "\\PC{0,40}") {
        let once = to_pascal_case(&input);
        prop_assert_eq!(to_pascal_case(&once), once);
    }

    #[test]
    fn kebab_output_is_lowercase_and_dash_separated(input in "\\PC{0,40}") {
        let out = to_kebab_case(&input);
        prop_assert!(out
            .chars()
            .all(|c| c == '-' || (c.is_alphanumeric() && c.to_lowercase().eq(std::iter::once(c)))));
        prop_assert!(!out.starts_with('-'));
        prop_assert!(!out.ends_with('-'));
        prop_assert!(!out.contains("--"));
    }

    #[test]
    fn kebab_and_snake_agree_on_words(input in "\\PC{0,40}") {
        prop_assert_eq!(to_kebab_case(&input).replace('-', "_"), to_snake_case(&input));
    }

    #[test]
    fn string_list_transforms_element_wise(items in proptest::collection::vec("[a-zA-Z ]{0,12}", 0..6)) {
        let transform = PropertyTransform::new(TransformKind::Kebab);
        let transformed = apply_transform(PropertyValue::StringList(items.clone()), &transform);
        let expected: Vec<String> = items.iter().map(|s| to_kebab_case(s)).collect();
        prop_assert_eq!(transformed, PropertyValue::StringList(expected));
    }
}

#[test]
fn test_prefix_and_suffix_are_not_case_transforms() {
    let prefix = PropertyTransform::with_value(TransformKind::Prefix, "svc-");
    let suffix = PropertyTransform::with_value(TransformKind::Suffix, "-v1");

    assert_eq!(
        apply_transform("Orders".into(), &prefix),
        PropertyValue::from("svc-Orders")
    );
    assert_eq!(
        apply_transform("Orders".into(), &suffix),
        PropertyValue::from("Orders-v1")
    );
}

#[test]
fn test_maps_pass_through() {
    let map = PropertyValue::from(serde_json::json!({"a": "b"}));
    let transform = PropertyTransform::new(TransformKind::Uppercase);
    assert_eq!(apply_transform(map.clone(), &transform), map);
}

#[test]
fn test_dotted_capital_keeps_element_ids_stable() {
    let once = to_kebab_case("İstanbul Office");
    assert_eq!(once, "istanbul-office");
    assert_eq!(to_kebab_case(&once), once);
    assert_eq!(to_snake_case("İstanbul Office"), "istanbul_office");
}
