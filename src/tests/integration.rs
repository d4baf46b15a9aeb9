#[cfg(test)]
mod integration_tests {
    use std::{
        fs,
        path::Path,
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        thread,
    };

    use crate::{
        Configuration, DirectoryPackage, Error, FormatArg, LoadError, Locale, ResType,
        ResourceManager, TableError,
        qualifier::QualifierKey,
        testing::index_writer::{IndexWriter, Item},
    };

    const APP_NAME: u32 = 0x0100_0000;
    const GREETING: u32 = 0x0100_0001;
    const REF_ONE: u32 = 0x0100_0002;
    const REF_TWO: u32 = 0x0100_0003;
    const REF_THREE: u32 = 0x0100_0004;
    const LOOP_A: u32 = 0x0100_0005;
    const LOOP_B: u32 = 0x0100_0006;
    const ARRAY_REF: u32 = 0x0100_0007;
    const DANGLING: u32 = 0x0100_0008;
    const WRONG_TYPE_REF: u32 = 0x0100_0009;
    const LITERAL: u32 = 0x0100_000a;
    const TEMPLATE: u32 = 0x0100_000b;

    const DAYS: u32 = 0x0100_0010;

    const BOOL_TRUE: u32 = 0x0100_0020;
    const BOOL_FALSE: u32 = 0x0100_0021;
    const BOOL_BAD: u32 = 0x0100_0022;

    const INTEGER: u32 = 0x0100_0030;
    const INT_REF: u32 = 0x0100_0031;
    const INT_ARRAY: u32 = 0x0100_0032;

    const FLOAT: u32 = 0x0100_0040;

    const COLOR_ALPHA: u32 = 0x0100_0050;
    const COLOR_OPAQUE: u32 = 0x0100_0051;

    const PATTERN_BASE: u32 = 0x0100_0060;
    const PATTERN_CHILD: u32 = 0x0100_0061;
    const PATTERN_GRANDCHILD: u32 = 0x0100_0062;
    const PATTERN_ORPHAN: u32 = 0x0100_0063;

    const THEME_BASE: u32 = 0x0100_0070;
    const THEME_CHILD: u32 = 0x0100_0071;

    const APPLES: u32 = 0x0100_0080;

    const PROFILE: u32 = 0x0100_0090;
    const MEDIA: u32 = 0x0100_0091;

    const SAME_STRING: u32 = 0x0100_00a0;
    const SAME_BOOL: u32 = 0x0100_00a1;
    const SAME_INT: u32 = 0x0100_00a2;

    const PROFILE_PATH: &str = "entry/resources/base/profile/test_common.h";
    const MEDIA_PATH: &str = "entry/resources/base/media/icon.png";

    fn reference(res_type: ResType, id: u32) -> String {
        format!("${}:{id}", res_type.type_name())
    }

    fn locale_keys(language: &str, region: &str) -> [QualifierKey; 2] {
        [QualifierKey::language(language), QualifierKey::region(region)]
    }

    fn fixture() -> IndexWriter {
        let default_items = vec![
            Item::scalar(APP_NAME, ResType::String, "app_name", "App"),
            Item::scalar(GREETING, ResType::String, "greeting", "Hi"),
            Item::scalar(REF_ONE, ResType::String, "ref_one", &reference(ResType::String, APP_NAME)),
            Item::scalar(REF_TWO, ResType::String, "ref_two", &reference(ResType::String, REF_ONE)),
            Item::scalar(REF_THREE, ResType::String, "ref_three", &reference(ResType::String, REF_TWO)),
            Item::scalar(LOOP_A, ResType::String, "loop_a", &reference(ResType::String, LOOP_B)),
            Item::scalar(LOOP_B, ResType::String, "loop_b", &reference(ResType::String, LOOP_A)),
            Item::scalar(ARRAY_REF, ResType::String, "array_ref", &reference(ResType::StringArray, DAYS)),
            Item::scalar(DANGLING, ResType::String, "dangling", &reference(ResType::String, 999)),
            Item::scalar(
                WRONG_TYPE_REF,
                ResType::String,
                "wrong_type_ref",
                &reference(ResType::Color, APP_NAME),
            ),
            Item::scalar(LITERAL, ResType::String, "literal", "$aaaaa"),
            Item::scalar(TEMPLATE, ResType::String, "template", "%s is %d years old"),
            Item::array(
                DAYS,
                ResType::StringArray,
                "days",
                &["Mon", reference(ResType::String, APP_NAME).as_str()],
            ),
            Item::scalar(BOOL_TRUE, ResType::Boolean, "bool_true", "true"),
            Item::scalar(BOOL_FALSE, ResType::Boolean, "bool_false", "false"),
            Item::scalar(BOOL_BAD, ResType::Boolean, "bool_bad", "yes"),
            Item::scalar(INTEGER, ResType::Integer, "integer_1", "101"),
            Item::scalar(INT_REF, ResType::Integer, "integer_ref", &reference(ResType::Integer, INTEGER)),
            Item::array(
                INT_ARRAY,
                ResType::IntArray,
                "int_array",
                &["1", reference(ResType::Integer, INTEGER).as_str(), "3"],
            ),
            Item::scalar(FLOAT, ResType::Float, "float_1", "48vp"),
            Item::scalar(COLOR_ALPHA, ResType::Color, "color_alpha", "#10000000"),
            Item::scalar(COLOR_OPAQUE, ResType::Color, "color_opaque", "#191919"),
            Item::array(
                PATTERN_BASE,
                ResType::Pattern,
                "base",
                &[
                    "width",
                    "1",
                    "height",
                    "2",
                    "color",
                    reference(ResType::Color, COLOR_OPAQUE).as_str(),
                ],
            ),
            Item::array(
                PATTERN_CHILD,
                ResType::Pattern,
                "child",
                &[
                    reference(ResType::Pattern, PATTERN_BASE).as_str(),
                    "width",
                    "10",
                    "margin",
                    "3",
                ],
            ),
            Item::array(
                PATTERN_GRANDCHILD,
                ResType::Pattern,
                "grandchild",
                &[reference(ResType::Pattern, PATTERN_CHILD).as_str(), "depth", "5"],
            ),
            Item::array(
                PATTERN_ORPHAN,
                ResType::Pattern,
                "orphan",
                &[reference(ResType::Pattern, 424_242).as_str(), "a", "b"],
            ),
            Item::array(THEME_BASE, ResType::Theme, "base_theme", &["bg", "#ffffff"]),
            Item::array(
                THEME_CHILD,
                ResType::Theme,
                "child_theme",
                &[THEME_BASE.to_string().as_str(), "fg", "#000000"],
            ),
            Item::array(APPLES, ResType::Plurals, "apples", &["one", "%d apple", "other", "%d apples"]),
            Item::scalar(PROFILE, ResType::Profile, "test_common", PROFILE_PATH),
            Item::scalar(MEDIA, ResType::Media, "icon", MEDIA_PATH),
            Item::scalar(SAME_STRING, ResType::String, "same_name", "string"),
            Item::scalar(SAME_BOOL, ResType::Boolean, "same_name", "true"),
            Item::scalar(SAME_INT, ResType::Integer, "same_name", "100"),
        ];

        IndexWriter::new()
            .key(
                &locale_keys("en", "US"),
                vec![
                    Item::scalar(APP_NAME, ResType::String, "app_name", "App (US)"),
                    Item::scalar(GREETING, ResType::String, "greeting", "Howdy"),
                ],
            )
            .key(
                &locale_keys("en", "001"),
                vec![Item::scalar(GREETING, ResType::String, "greeting", "Hello")],
            )
            .key(
                &locale_keys("zh", "CN"),
                vec![
                    Item::scalar(APP_NAME, ResType::String, "app_name", "应用"),
                    Item::array(APPLES, ResType::Plurals, "apples", &["other", "%d个苹果"]),
                ],
            )
            .key(&[], default_items)
    }

    fn config(tag: &str) -> Configuration {
        Configuration::with_locale(Locale::parse(tag, '-').unwrap())
    }

    fn manager_with(root: &Path, config: Option<Configuration>) -> ResourceManager {
        let mut builder = ResourceManager::builder();
        if let Some(config) = config {
            builder = builder.config(config);
        }
        let manager = builder.build();
        manager
            .add_container(fixture().write_module(root, "entry"))
            .unwrap();
        manager
    }

    #[test]
    fn selects_per_locale_and_follows_update_config() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), Some(config("en-US")));
        assert_eq!(manager.get_string_by_id(APP_NAME).unwrap(), "App (US)");

        manager.update_config(&config("zh-CN")).unwrap();
        assert_eq!(manager.get_string_by_id(APP_NAME).unwrap(), "应用");
        assert_eq!(manager.get_string_by_name("app_name").unwrap(), "应用");

        manager.update_config(&config("fr-FR")).unwrap();
        assert_eq!(manager.get_string_by_id(APP_NAME).unwrap(), "App");
    }

    #[test]
    fn unset_configuration_selects_default() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), None);
        assert_eq!(manager.get_string_by_id(APP_NAME).unwrap(), "App");
        assert_eq!(manager.get_string_by_id(GREETING).unwrap(), "Hi");
    }

    #[test]
    fn regional_ancestry_picks_international_english() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), Some(config("en-US")));
        assert_eq!(manager.get_string_by_id(GREETING).unwrap(), "Howdy");

        manager.update_config(&config("en-GB")).unwrap();
        assert_eq!(manager.get_string_by_id(GREETING).unwrap(), "Hello");
        assert_eq!(manager.select_by_id(GREETING).unwrap().folder(), "en_001");
    }

    #[test]
    fn qualified_values_list_every_folder() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), None);
        let folders: Vec<_> = manager
            .qualified_values_by_name(ResType::String, "app_name")
            .into_iter()
            .map(|(folder, _)| folder)
            .collect();
        assert_eq!(folders, ["en_US", "zh_CN", "default"]);
        assert!(manager.qualified_values_by_name(ResType::Color, "app_name").is_empty());
    }

    #[test]
    fn references_resolve_through_chains() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), None);
        assert_eq!(manager.get_string_by_id(REF_ONE).unwrap(), "App");
        assert_eq!(manager.get_string_by_id(REF_TWO).unwrap(), "App");
        assert_eq!(manager.get_string_by_id(REF_THREE).unwrap(), "App");
        assert_eq!(manager.get_string_by_id(LITERAL).unwrap(), "$aaaaa");
        assert_eq!(manager.get_integer_by_id(INT_REF).unwrap(), 101);
    }

    #[test]
    fn reference_depth_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ResourceManager::builder().max_reference_depth(2).build();
        manager
            .add_container(fixture().write_module(dir.path(), "entry"))
            .unwrap();

        assert_eq!(manager.get_string_by_id(REF_TWO).unwrap(), "App");
        assert!(matches!(
            manager.get_string_by_id(REF_THREE),
            Err(Error::ReferenceTooDeep(_))
        ));

        let unbounded = manager_with(dir.path(), None);
        assert!(matches!(
            unbounded.get_string_by_id(LOOP_A),
            Err(Error::ReferenceTooDeep(_))
        ));
    }

    #[test]
    fn broken_references_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), None);
        assert!(matches!(
            manager.get_string_by_id(ARRAY_REF),
            Err(Error::ArrayReference(_))
        ));
        assert!(matches!(
            manager.get_string_by_id(DANGLING),
            Err(Error::DanglingReference(r)) if r == "$string:999"
        ));
        assert!(matches!(
            manager.get_string_by_id(WRONG_TYPE_REF),
            Err(Error::ReferenceTypeMismatch { actual: ResType::String, .. })
        ));
    }

    #[test]
    fn wrong_declared_type_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), None);
        let err = manager.get_string_by_id(BOOL_TRUE).unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(
            err,
            Error::TypeMismatch {
                expected: ResType::String,
                actual: ResType::Boolean,
                ..
            }
        ));
        assert!(manager.get_string_by_id(0x0200_0000).unwrap_err().is_not_found());
        assert!(manager.get_boolean_by_name("app_name").unwrap_err().is_not_found());
    }

    #[test]
    fn same_name_resolves_per_type() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), None);
        assert_eq!(manager.get_string_by_name("same_name").unwrap(), "string");
        assert!(manager.get_boolean_by_name("same_name").unwrap());
        assert_eq!(manager.get_integer_by_name("same_name").unwrap(), 100);
    }

    #[test]
    fn scalar_conversions() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), None);

        assert!(manager.get_boolean_by_id(BOOL_TRUE).unwrap());
        assert!(!manager.get_boolean_by_id(BOOL_FALSE).unwrap());
        assert!(matches!(
            manager.get_boolean_by_id(BOOL_BAD),
            Err(Error::InvalidValue { expected: "boolean", .. })
        ));

        assert_eq!(manager.get_integer_by_name("integer_1").unwrap(), 101);
        assert_eq!(manager.get_float_by_id(FLOAT).unwrap(), 48.0);
        assert_eq!(
            manager.get_float_with_unit_by_name("float_1").unwrap(),
            (48.0, "vp".to_owned())
        );
        assert_eq!(manager.get_color_by_id(COLOR_ALPHA).unwrap(), 268_435_456);
        assert_eq!(manager.get_color_by_name("color_opaque").unwrap(), 0xff19_1919);
    }

    #[test]
    fn arrays_resolve_each_element() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), None);
        assert_eq!(manager.get_string_array_by_id(DAYS).unwrap(), ["Mon", "App"]);
        assert_eq!(manager.get_int_array_by_name("int_array").unwrap(), [1, 101, 3]);
    }

    #[test]
    fn patterns_merge_along_parents() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), None);

        let base = manager.get_pattern_by_id(PATTERN_BASE).unwrap();
        assert_eq!(base.len(), 3);
        assert_eq!(base["color"], "#191919");

        let child = manager.get_pattern_by_id(PATTERN_CHILD).unwrap();
        assert_eq!(child.len(), 4);
        assert_eq!(child["width"], "10");
        assert_eq!(child["height"], "2");
        assert_eq!(child["margin"], "3");

        let grandchild = manager.get_pattern_by_name("grandchild").unwrap();
        assert_eq!(grandchild.len(), 5);
        assert_eq!(grandchild["depth"], "5");
        assert_eq!(grandchild["width"], "10");

        assert!(matches!(
            manager.get_pattern_by_id(PATTERN_ORPHAN),
            Err(Error::MissingParent(_))
        ));
    }

    #[test]
    fn theme_parent_may_be_a_bare_id() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), None);
        let theme = manager.get_theme_by_id(THEME_CHILD).unwrap();
        assert_eq!(theme.len(), 2);
        assert_eq!(theme["bg"], "#ffffff");
        assert_eq!(theme["fg"], "#000000");
    }

    #[test]
    fn plural_strings_follow_language_rules() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), Some(config("en-US")));
        assert_eq!(manager.get_plural_string_by_id(APPLES, 1).unwrap(), "%d apple");
        assert_eq!(
            manager
                .get_plural_string_format_by_id(APPLES, 1, &[FormatArg::Int(1)])
                .unwrap(),
            "1 apple"
        );
        assert_eq!(
            manager
                .get_plural_string_format_by_name("apples", 5, &[FormatArg::Int(5)])
                .unwrap(),
            "5 apples"
        );

        manager.update_config(&config("zh-CN")).unwrap();
        assert_eq!(
            manager
                .get_plural_string_format_by_id(APPLES, 1, &[FormatArg::Int(1)])
                .unwrap(),
            "1个苹果"
        );
        assert_eq!(manager.cached_plural_languages(), ["en", "zh"]);
    }

    #[test]
    fn string_format_substitutes_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), None);
        let text = manager
            .get_string_format_by_id(TEMPLATE, &[FormatArg::Str("Tom"), FormatArg::Int(3)])
            .unwrap();
        assert_eq!(text, "Tom is 3 years old");
        assert!(matches!(
            manager.get_string_format_by_name("template", &[FormatArg::Str("Tom")]),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn path_values_join_resource_root() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), None);
        assert_eq!(
            manager.get_profile_by_id(PROFILE).unwrap(),
            dir.path().join(PROFILE_PATH)
        );
        assert_eq!(
            manager.get_media_by_name("icon").unwrap(),
            dir.path().join(MEDIA_PATH)
        );
    }

    #[test]
    fn failed_reload_keeps_previous_generation() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), Some(config("en-US")));
        let extra = IndexWriter::new()
            .key(&[], vec![Item::scalar(0x0200_0000, ResType::String, "extra", "x")])
            .write_module(dir.path(), "extra");
        manager.add_container(&extra).unwrap();

        let before = manager.find_by_id(APP_NAME).unwrap();
        assert_eq!(manager.get_string_by_id(APP_NAME).unwrap(), "App (US)");

        fs::write(&extra, [0u8; 8]).unwrap();
        let err = manager.update_config(&config("zh-CN")).unwrap_err();
        assert!(matches!(
            &err,
            Error::ReloadFailed {
                path,
                source: LoadError::Table(TableError::Truncated { .. }),
            } if *path == extra
        ));

        assert_eq!(manager.config().locale().unwrap().to_string(), "en-Latn-US");
        assert!(Arc::ptr_eq(&before, &manager.find_by_id(APP_NAME).unwrap()));
        assert_eq!(manager.get_string_by_id(APP_NAME).unwrap(), "App (US)");
        assert_eq!(manager.get_string_by_id(0x0200_0000).unwrap(), "x");

        // Once the file is repaired the same update goes through.
        IndexWriter::new()
            .key(&[], vec![Item::scalar(0x0200_0000, ResType::String, "extra", "y")])
            .write_module(dir.path(), "extra");
        manager.update_config(&config("zh-CN")).unwrap();
        assert_eq!(manager.get_string_by_id(APP_NAME).unwrap(), "应用");
        assert_eq!(manager.get_string_by_id(0x0200_0000).unwrap(), "y");
    }

    #[test]
    fn name_selection_stays_in_the_owning_container() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), Some(config("en-US")));
        let shadow = IndexWriter::new()
            .key(&[], vec![Item::scalar(APP_NAME, ResType::String, "shadow_name", "Shadow")])
            .write_module(dir.path(), "shadow");
        manager.add_container(&shadow).unwrap();

        assert_eq!(manager.get_string_by_id(APP_NAME).unwrap(), "App (US)");
        assert_eq!(manager.get_string_by_name("shadow_name").unwrap(), "Shadow");
        assert_eq!(manager.get_string_by_name("app_name").unwrap(), "App (US)");
    }

    #[test]
    fn debug_lists_cached_plural_languages() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), Some(config("en-US")));
        manager.get_plural_string_by_id(APPLES, 2).unwrap();

        let debug = format!("{manager:?}");
        assert!(debug.starts_with("ResourceManager"), "{debug}");
        assert!(debug.contains(r#"plural_cache: ["en"]"#), "{debug}");
    }

    #[test]
    fn readers_see_whole_generations_during_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), Some(config("en-US")));
        let done = AtomicBool::new(false);

        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    while !done.load(Ordering::Acquire) {
                        let by_id = manager.get_string_by_id(APP_NAME).unwrap();
                        assert!(by_id == "App (US)" || by_id == "应用", "{by_id}");

                        let by_name = manager.get_string_by_name("app_name").unwrap();
                        assert!(by_name == "App (US)" || by_name == "应用", "{by_name}");

                        let apples = manager.get_plural_string_by_id(APPLES, 2).unwrap();
                        assert!(apples == "%d apples" || apples == "%d个苹果", "{apples}");
                    }
                });
            }

            scope.spawn(|| {
                for round in 0..50 {
                    let tag = if round % 2 == 0 { "zh-CN" } else { "en-US" };
                    manager.update_config(&config(tag)).unwrap();
                }
                done.store(true, Ordering::Release);
            });
        });

        assert_eq!(manager.get_string_by_id(APP_NAME).unwrap(), "App (US)");
    }

    #[test]
    fn unchanged_configuration_skips_reload() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(dir.path(), Some(config("en-US")));
        fs::remove_file(dir.path().join("entry/resources.index")).unwrap();

        manager.update_config(&config("en-US")).unwrap();
        assert_eq!(manager.get_string_by_id(APP_NAME).unwrap(), "App (US)");
        assert!(matches!(
            manager.update_config(&config("zh-CN")),
            Err(Error::ReloadFailed { source: LoadError::Io { .. }, .. })
        ));
    }

    #[test]
    fn loads_from_extracted_package() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.json"),
            br#"{"module": {"moduleName": "entry", "type": "entry"}}"#,
        )
        .unwrap();
        fixture().write_module(&dir.path().join("assets"), "entry");

        let manager = ResourceManager::builder().config(config("zh-CN")).build();
        manager
            .add_package(Arc::new(DirectoryPackage), dir.path())
            .unwrap();
        assert_eq!(manager.get_string_by_id(APP_NAME).unwrap(), "应用");
        assert_eq!(
            manager.get_media_by_id(MEDIA).unwrap(),
            dir.path().join("assets").join(MEDIA_PATH)
        );
        assert!(matches!(
            manager.add_package(Arc::new(DirectoryPackage), dir.path()),
            Err(Error::DuplicateContainer(_))
        ));

        manager.update_config(&config("en-US")).unwrap();
        assert_eq!(manager.get_string_by_id(APP_NAME).unwrap(), "App (US)");
    }
}
