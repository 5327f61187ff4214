//! Member-name case conversion
//!
//! Built-in modes are pure ASCII casing transforms from `convert_case`;
//! custom converters come through the code-loader port or as inline closures.

use convert_case::{Case, Casing};

use crate::config::MemberConverter;
use crate::error::RewriteError;
use crate::loader::CodeLoader;

/// Apply a member converter to a raw imported name
///
/// `MemberConverter::None` is identity. A custom converter that fails maps to
/// `RewriteError::ConverterFailure`; an unresolvable reference maps to
/// `RewriteError::TransformLoadFailure`.
pub fn convert(
    name: &str,
    converter: &MemberConverter,
    loader: &dyn CodeLoader,
) -> Result<String, RewriteError> {
    let case = match converter {
        MemberConverter::None => return Ok(name.to_string()),
        MemberConverter::Camel => Case::Camel,
        MemberConverter::Pascal => Case::Pascal,
        MemberConverter::Kebab => Case::Kebab,
        MemberConverter::Snake => Case::Snake,
        MemberConverter::Reference(reference) => {
            let f = loader.load_converter(reference)?;
            return run_custom(name, &*f);
        }
        MemberConverter::Function(f) => return run_custom(name, &**f),
    };

    Ok(name.to_case(case))
}

fn run_custom(
    name: &str,
    f: &(dyn Fn(&str) -> Result<String, String> + Send + Sync),
) -> Result<String, RewriteError> {
    f(name).map_err(|reason| RewriteError::ConverterFailure {
        name: name.to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::FnRegistry;

    fn built_in(name: &str, converter: MemberConverter) -> String {
        convert(name, &converter, &FnRegistry::new()).unwrap()
    }

    #[test]
    fn test_identity_when_unset() {
        assert_eq!(built_in("FooBar", MemberConverter::None), "FooBar");
    }

    #[test]
    fn test_built_in_modes() {
        assert_eq!(built_in("FooBar", MemberConverter::Camel), "fooBar");
        assert_eq!(built_in("foo_bar", MemberConverter::Pascal), "FooBar");
        assert_eq!(built_in("FooBar", MemberConverter::Kebab), "foo-bar");
        assert_eq!(built_in("FooBar", MemberConverter::Snake), "foo_bar");
    }

    #[test]
    fn test_built_ins_idempotent() {
        for converter in [
            MemberConverter::Camel,
            MemberConverter::Pascal,
            MemberConverter::Kebab,
            MemberConverter::Snake,
        ] {
            let once = built_in("FooBarBaz", converter.clone());
            let twice = built_in(&once, converter);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_custom_converter_via_loader() {
        let mut registry = FnRegistry::new();
        registry.register_converter("./upper.js", |name| Ok(name.to_uppercase()));

        let converter = MemberConverter::Reference("./upper.js".into());
        assert_eq!(convert("grid", &converter, &registry).unwrap(), "GRID");
    }

    #[test]
    fn test_custom_converter_failure_propagates() {
        let converter = MemberConverter::function(|_| Err("not a string".into()));
        let err = convert("grid", &converter, &FnRegistry::new()).unwrap_err();
        assert!(matches!(err, RewriteError::ConverterFailure { .. }));
    }

    #[test]
    fn test_unresolvable_reference_is_load_failure() {
        let converter = MemberConverter::Reference("./missing.js".into());
        let err = convert("grid", &converter, &FnRegistry::new()).unwrap_err();
        assert!(matches!(err, RewriteError::TransformLoadFailure { .. }));
    }
}
