//! Naming utilities shared by the template model and the template helpers.
//!
//! There is exactly one implementation of case conversion and inflection in
//! the crate; the Tera filters registered by the template engine call straight
//! into these functions so templates and model fields can never disagree.

use std::path::{Component, Path};

/// Prefix used when a derived identifier would not start with a letter.
pub const ENTITY_NAME_PREFIX: &str = "Entity";

/// Splits an identifier into word tokens.
///
/// Tokens are separated by `_`, `-` and spaces, and a new token starts at
/// every upper-case letter. Splitting at every upper-case letter makes
/// [`to_pascal_case`] a fixed point of itself: its output is re-tokenized
/// into exactly the tokens that produced it.
///
/// # Examples
/// ```
/// use formgen::core::utils::tokenize;
///
/// assert_eq!(tokenize("first_name"), vec!["first", "name"]);
/// assert_eq!(tokenize("firstName"), vec!["first", "Name"]);
/// assert_eq!(tokenize("Order-Line item"), vec!["Order", "Line", "item"]);
/// ```
pub fn tokenize(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in s.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }
        if ch.is_uppercase() && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }

    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Upper-cases the first character of a token and lower-cases the rest.
fn capitalize_token(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

/// Lower-cases only the first character of `s`.
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// Converts a string to PascalCase.
///
/// # Examples
/// ```
/// use formgen::core::utils::to_pascal_case;
///
/// assert_eq!(to_pascal_case("first_name"), "FirstName");
/// assert_eq!(to_pascal_case("date-of birth"), "DateOfBirth");
/// assert_eq!(to_pascal_case("emailAddress"), "EmailAddress");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    tokenize(s).iter().map(|t| capitalize_token(t)).collect()
}

/// Converts a string to camelCase (PascalCase with a lower-case first character).
pub fn to_camel_case(s: &str) -> String {
    lower_first(&to_pascal_case(s))
}

/// Converts a string to snake_case.
///
/// The PascalCase form is lower-cased at its first character and an
/// underscore is inserted before every subsequent upper-case character.
///
/// # Examples
/// ```
/// use formgen::core::utils::to_snake_case;
///
/// assert_eq!(to_snake_case("FirstName"), "first_name");
/// assert_eq!(to_snake_case("date-of birth"), "date_of_birth");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut result = String::with_capacity(pascal.len() + 4);

    for (i, ch) in pascal.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

const SIBILANT_PLURAL_SUFFIXES: &[&str] = &["sses", "shes", "ches", "xes", "zes", "uses"];

/// Endings of singular nouns that take `es` rather than being left alone
const SINGULAR_S_ENDINGS: &[&str] = &["ss", "us", "is", "as", "os"];

/// Returns true when `lower` ends in a suffix [`pluralize`] itself produces:
/// `ies`, `es`, or `s` after a consonant other than `s`.
fn looks_plural(lower: &str) -> bool {
    if lower.len() > 3 && lower.ends_with("ies") {
        return true;
    }
    if SINGULAR_S_ENDINGS.iter().any(|s| lower.ends_with(s)) {
        return false;
    }
    if lower.ends_with("es") {
        return true;
    }
    let mut tail = lower.chars().rev();
    match (tail.next(), tail.next()) {
        (Some('s'), Some(before)) => before.is_alphabetic() && !"aeious".contains(before),
        _ => false,
    }
}

/// Pluralizes an English noun using the regular suffix rules.
///
/// - `y` becomes `ies`
/// - `s`, `x`, `z`, `ch`, `sh` take `es`
/// - everything else takes `s`
///
/// Words that already end in one of the produced plural suffixes are
/// returned unchanged. Singular nouns ending in `s` (`Canvas`, `Status`)
/// still take `es`.
///
/// # Examples
/// ```
/// use formgen::core::utils::pluralize;
///
/// assert_eq!(pluralize("Category"), "Categories");
/// assert_eq!(pluralize("Box"), "Boxes");
/// assert_eq!(pluralize("Contact"), "Contacts");
/// assert_eq!(pluralize("Contacts"), "Contacts");
/// assert_eq!(pluralize("Canvas"), "Canvases");
/// ```
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_lowercase();
    if looks_plural(&lower) {
        return word.to_string();
    }

    if lower.ends_with('y') {
        format!("{}ies", &word[..word.len() - 1])
    } else if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        format!("{word}es")
    } else {
        format!("{word}s")
    }
}

/// Reverses [`pluralize`] for regular nouns.
///
/// # Examples
/// ```
/// use formgen::core::utils::singularize;
///
/// assert_eq!(singularize("Categories"), "Category");
/// assert_eq!(singularize("Boxes"), "Box");
/// assert_eq!(singularize("Contacts"), "Contact");
/// assert_eq!(singularize("Address"), "Address");
/// ```
pub fn singularize(word: &str) -> String {
    let lower = word.to_lowercase();

    if lower.len() > 3 && lower.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if SIBILANT_PLURAL_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        return word[..word.len() - 2].to_string();
    }
    if lower.ends_with('s') && !SINGULAR_S_ENDINGS.iter().any(|s| lower.ends_with(s)) {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Derives the canonical entity name from a project name.
///
/// Non-alphanumeric characters are stripped and act as word boundaries (the
/// character following one is upper-cased). Letters and digits outside ASCII
/// are kept. If the result does not start with a letter,
/// [`ENTITY_NAME_PREFIX`] is prepended.
///
/// # Examples
/// ```
/// use formgen::core::utils::derive_entity_name;
///
/// assert_eq!(derive_entity_name("customer registration"), "CustomerRegistration");
/// assert_eq!(derive_entity_name("Contact-Form!"), "ContactForm");
/// assert_eq!(derive_entity_name("2024 survey"), "Entity2024Survey");
/// assert_eq!(derive_entity_name("café order"), "CaféOrder");
/// ```
pub fn derive_entity_name(project_name: &str) -> String {
    let mut name = String::with_capacity(project_name.len());
    let mut boundary = true;

    for ch in project_name.chars() {
        if ch.is_alphanumeric() {
            if boundary {
                name.extend(ch.to_uppercase());
            } else {
                name.push(ch);
            }
            boundary = false;
        } else {
            boundary = true;
        }
    }

    match name.chars().next() {
        Some(first) if first.is_alphabetic() => name,
        _ => format!("{ENTITY_NAME_PREFIX}{name}"),
    }
}

/// True when joining `path` onto a directory cannot leave that directory:
/// no `..`, root or drive-prefix components.
pub fn is_confined_relative(path: &Path) -> bool {
    !path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("find_pets_by_status"), vec!["find", "pets", "by", "status"]);
        assert_eq!(tokenize("find-pets by status"), vec!["find", "pets", "by", "status"]);
        assert_eq!(tokenize("findPetsByStatus"), vec!["find", "Pets", "By", "Status"]);
        assert_eq!(tokenize("__a__b__"), vec!["a", "b"]);
        assert!(tokenize("").is_empty());
        assert!(tokenize(" _-").is_empty());
    }

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("find_pets_by_status"), "FindPetsByStatus");
        assert_eq!(to_pascal_case("findPetsByStatus"), "FindPetsByStatus");
        assert_eq!(to_pascal_case("find-pets-by-status"), "FindPetsByStatus");
        assert_eq!(to_pascal_case("first name"), "FirstName");
        assert_eq!(to_pascal_case("address2_line"), "Address2Line");
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn test_pascal_case_is_idempotent() {
        let inputs = [
            "first_name",
            "firstName",
            "FIRST_NAME",
            "a_b_c",
            "HTTPResponse",
            "date-of birth",
            "x",
            "2nd_address",
            "  spaced  out  ",
        ];
        for input in inputs {
            let once = to_pascal_case(input);
            assert_eq!(to_pascal_case(&once), once, "input: {input}");
        }
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("find_pets_by_status"), "findPetsByStatus");
        assert_eq!(to_camel_case("FindPetsByStatus"), "findPetsByStatus");
        assert_eq!(to_camel_case("email"), "email");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("findPetsByStatus"), "find_pets_by_status");
        assert_eq!(to_snake_case("FindPetsByStatus"), "find_pets_by_status");
        assert_eq!(to_snake_case("find-pets-by-status"), "find_pets_by_status");
        assert_eq!(to_snake_case("find_pets_by_status"), "find_pets_by_status");
        assert_eq!(to_snake_case("email"), "email");
    }

    #[test]
    fn test_pluralize_suffix_classes() {
        assert_eq!(pluralize("Category"), "Categories");
        assert_eq!(pluralize("status"), "statuses");
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("quiz"), "quizes");
        assert_eq!(pluralize("church"), "churches");
        assert_eq!(pluralize("wish"), "wishes");
        assert_eq!(pluralize("Contact"), "Contacts");
        assert_eq!(pluralize(""), "");
    }

    #[test]
    fn test_pluralize_singular_nouns_ending_in_s() {
        assert_eq!(pluralize("Canvas"), "Canvases");
        assert_eq!(pluralize("Atlas"), "Atlases");
        assert_eq!(pluralize("Gas"), "Gases");
        assert_eq!(pluralize("Bus"), "Buses");
    }

    #[test]
    fn test_pluralize_leaves_plurals_alone() {
        assert_eq!(pluralize("Contacts"), "Contacts");
        assert_eq!(pluralize("Employees"), "Employees");
        assert_eq!(pluralize("Days"), "Days");
        assert_eq!(pluralize("Canvases"), "Canvases");
    }

    #[test]
    fn test_pluralize_is_stable_on_plurals() {
        for word in [
            "Category", "box", "church", "wish", "status", "Contact", "quiz", "Canvas", "Employee",
            "Gas",
        ] {
            let plural = pluralize(word);
            assert_eq!(pluralize(&plural), plural, "word: {word}");
        }
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("Categories"), "Category");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("churches"), "church");
        assert_eq!(singularize("statuses"), "status");
        assert_eq!(singularize("Contacts"), "Contact");
        assert_eq!(singularize("Contact"), "Contact");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("Canvas"), "Canvas");
        assert_eq!(singularize("Types"), "Type");
    }

    #[test]
    fn test_derive_entity_name() {
        assert_eq!(derive_entity_name("Customer"), "Customer");
        assert_eq!(derive_entity_name("customer registration"), "CustomerRegistration");
        assert_eq!(derive_entity_name("contact_form v2"), "ContactFormV2");
        assert_eq!(derive_entity_name("123"), "Entity123");
        assert_eq!(derive_entity_name("!!!"), "Entity");
        assert_eq!(derive_entity_name("myForm"), "MyForm");
    }

    #[test]
    fn test_is_confined_relative() {
        assert!(is_confined_relative(Path::new("Backend/Models")));
        assert!(is_confined_relative(Path::new("")));
        assert!(is_confined_relative(Path::new("./Lead.cs")));
        assert!(!is_confined_relative(Path::new("../../x.cs")));
        assert!(!is_confined_relative(Path::new("Backend/../../x.cs")));
        assert!(!is_confined_relative(Path::new("/etc/x.cs")));
    }

    #[test]
    fn test_derive_entity_name_keeps_non_ascii_letters() {
        assert_eq!(derive_entity_name("Café"), "Café");
        assert_eq!(derive_entity_name("über form"), "ÜberForm");
        assert_eq!(derive_entity_name("٣ items"), "Entity٣Items");
    }
}
