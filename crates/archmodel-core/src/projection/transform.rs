//! Case conversions and mapping transforms
//!
//! Word boundaries: any non-alphanumeric character, a capital after a
//! character that is not one (`fooBar`, `v2Api`), and the last capital of an
//! acronym run when a lowercase letter follows (`HTTPServer` is
//! `HTTP` + `Server`). A capital is any character lowercasing changes.
//!
//! Case mapping can emit combining marks (`İ` lowercases to `i` + U+0307);
//! those are dropped so every conversion is idempotent.

use crate::model::PropertyValue;

use super::rule::{PropertyTransform, TransformKind};

fn is_capital(c: char) -> bool {
    !c.to_lowercase().eq(std::iter::once(c))
}

fn split_words(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if is_capital(c) && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if !is_capital(prev) || next_is_lower {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn lowercase_words(input: &str) -> Vec<String> {
    split_words(input)
        .iter()
        .map(|word| {
            word.to_lowercase()
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

/// `Customer Management` becomes `customer-management`
pub fn to_kebab_case(input: &str) -> String {
    lowercase_words(input).join("-")
}

/// `Customer Management` becomes `customer_management`
pub fn to_snake_case(input: &str) -> String {
    lowercase_words(input).join("_")
}

/// `customer management` becomes `CustomerManagement`
///
/// Only the first letter of each word is uppercased; lowercase letters keep
/// their case so acronyms survive. Titlecase digraphs (`ǅ`) anywhere in a word
/// become capitals, which keeps the conversion idempotent.
pub fn to_pascal_case(input: &str) -> String {
    let mut out = String::new();
    for word in split_words(input) {
        for (i, c) in word.chars().enumerate() {
            if i == 0 || is_capital(c) {
                out.extend(c.to_uppercase().filter(|u| u.is_alphanumeric()));
            } else {
                out.push(c);
            }
        }
    }
    out
}

fn transform_str(input: &str, transform: &PropertyTransform) -> String {
    let arg = transform.value.as_deref().unwrap_or_default();
    match transform.kind {
        TransformKind::Uppercase => input.to_uppercase(),
        TransformKind::Lowercase => input.to_lowercase(),
        TransformKind::Kebab => to_kebab_case(input),
        TransformKind::Snake => to_snake_case(input),
        TransformKind::Pascal => to_pascal_case(input),
        TransformKind::Prefix => format!("{}{}", arg, input),
        TransformKind::Suffix => format!("{}{}", input, arg),
        TransformKind::Template => arg.replace("{value}", input),
    }
}

/// Apply a transform to a resolved mapping value
///
/// Strings are transformed directly, string lists element-wise, and scalars
/// through their text form. Maps and mixed lists pass through unchanged.
pub fn apply_transform(value: PropertyValue, transform: &PropertyTransform) -> PropertyValue {
    match value {
        PropertyValue::String(s) => PropertyValue::String(transform_str(&s, transform)),
        PropertyValue::StringList(items) => PropertyValue::StringList(
            items.iter().map(|s| transform_str(s, transform)).collect(),
        ),
        scalar @ PropertyValue::Scalar(_) => {
            PropertyValue::String(transform_str(&scalar.to_string(), transform))
        }
        other @ (PropertyValue::Map(_) | PropertyValue::List(_)) => other,
    }
}
