use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;

fn fallback() -> Locale {
	Locale::with_region("fr", "CA")
}

fn parse(input: &str) -> Locale {
	Locale::parse_with_fallback(input, &fallback())
}

#[test]
fn empty_input_is_the_fallback() {
	assert_eq!(parse(""), fallback());
	assert_eq!(parse("__"), fallback());
}

#[rstest]
#[case("en", Locale::new("en"))]
#[case("DE", Locale::new("de"))]
#[case("invalid", Locale::new("fr"))]
#[case("de_DE", Locale::with_region("de", "DE"))]
#[case("de_de", Locale::with_region("de", "DE"))]
#[case("DE_de", Locale::with_region("de", "DE"))]
#[case("de-DE", Locale::with_region("de", "DE"))]
#[case("EN_gb", Locale::with_region("en", "GB"))]
#[case("invalid_GB", Locale::with_region("fr", "GB"))]
#[case("en_invalid", Locale::with_region("en", "CA"))]
#[case("en-invalid", Locale::with_region("en", "CA"))]
#[case("en_Han1", Locale::with_region("en", "CA"))]
#[case("en-QB", Locale::with_region("en", "CA"))]
fn language_and_region(#[case] input: &str, #[case] expected: Locale) {
	assert_eq!(parse(input), expected);
}

#[rstest]
#[case("de_XZ", "XZ")]
#[case("de_AA", "AA")]
#[case("de_QX", "QX")]
#[case("de_ZZ", "ZZ")]
#[case("de_xa", "XA")]
fn private_use_regions_are_kept(#[case] input: &str, #[case] region: &str) {
	assert_eq!(parse(input), Locale::with_region("de", region));
}

#[rstest]
#[case("en_GB_variant1")]
#[case("en_GB_variant1_something")]
#[case("en-GB-variant1-something-else")]
fn trailing_segments_after_variant_are_ignored(#[case] input: &str) {
	assert_eq!(parse(input), Locale::from_parts("en", "", "GB", "variant1"));
}

#[rstest]
#[case("zh_hans", Locale::from_parts("zh", "Hans", "", ""))]
#[case("zh-hans-cn", Locale::from_parts("zh", "Hans", "CN", ""))]
#[case("zh_hans_cn_variant1", Locale::from_parts("zh", "Hans", "CN", "variant1"))]
#[case("zh-hans-cn-variant1-variant2", Locale::from_parts("zh", "Hans", "CN", "variant1"))]
fn scripts(#[case] input: &str, #[case] expected: Locale) {
	assert_eq!(parse(input), expected);
}

#[test]
fn malformed_variant_degrades() {
	// With a script the variant is dropped, otherwise it is kept verbatim.
	assert_eq!(parse("zh_Hans_CN_x"), Locale::from_parts("zh", "Hans", "CN", ""));
	assert_eq!(parse("en_GB_x"), Locale::from_parts("en", "", "GB", "x"));
}

#[test]
fn variant_validation() {
	assert!(is_valid_variant("variant1"));
	assert!(is_valid_variant("1901"));
	assert!(is_valid_variant("posix_1994x"));
	assert!(!is_valid_variant("abcd"));
	assert!(!is_valid_variant("toolongvariant"));
	assert!(!is_valid_variant(""));
}

#[test]
fn display_and_language_tag() {
	let locale = Locale::from_parts("zh", "hans", "cn", "variant1");
	assert_eq!(locale.to_string(), "zh_Hans_CN_variant1");
	assert_eq!(locale.to_language_tag(), "zh-Hans-CN-variant1");
	assert_eq!(Locale::from_parts("en", "", "", "POSIX").to_string(), "en__POSIX");
	assert_eq!(Locale::root().to_string(), "");
}

#[test]
fn parent_rules_in_precedence_order() {
	let default = Locale::new("en");
	let cases = [
		(Locale::from_parts("zh", "Hans", "CN", "variant1"), Some(Locale::from_parts("zh", "Hans", "CN", ""))),
		(Locale::from_parts("zh", "Hans", "CN", ""), Some(Locale::from_parts("zh", "Hans", "", ""))),
		(Locale::from_parts("zh", "Hans", "", ""), Some(Locale::new("zh"))),
		(Locale::from_parts("zh", "", "CN", "variant1"), Some(Locale::with_region("zh", "CN"))),
		(Locale::with_region("zh", "CN"), Some(Locale::new("zh"))),
		(Locale::new("zh"), Some(default.clone())),
		(default.clone(), None),
	];
	for (locale, expected) in cases {
		assert_eq!(locale.parent(&default), expected, "parent of {locale}");
	}
}

#[test]
fn chains_terminate_at_default() {
	let default = Locale::new("fr");
	let names = |input: &str| parse(input).chain(&default).map(|l| l.to_string()).collect::<Vec<_>>();

	assert_eq!(names("en_GB_variant1"), ["en_GB_variant1", "en_GB", "en", "fr"]);
	assert_eq!(names("zh_Hans_CN_variant1"), ["zh_Hans_CN_variant1", "zh_Hans_CN", "zh_Hans", "zh", "fr"]);
	assert_eq!(names("fr_CA"), ["fr_CA", "fr"]);
}

#[test]
fn chain_with_regional_default_stays_finite() {
	let default = Locale::with_region("en", "GB");
	let chain: Vec<_> = Locale::new("de").chain(&default).collect();
	assert_eq!(chain, [Locale::new("de"), default.clone(), Locale::new("en")]);
}
