//! Integration tests for rendering and loading filter templates
//!
//! Templates render against the fixture context in `common`, then load
//! through the document parser into an ItemFilter.

mod common;

use common::TestLoader;
use wraeblast_core::{ActionArg, ActionKind, ConditionKind, Operator, Visibility};
use wraeblast_sdk::{dumps, FilterLoaderBuilder, ItemFilterContext, SdkError};

// =============================================================================
// End-to-end Loading
// =============================================================================

const CURRENCY_TEMPLATE: &str = r#"
rules:
{% for row in options.thresholds.currencies.filter_rows() %}
  - name: "{{ row.item_name }}"
    conditions:
      BaseType: "{{ row.item_name }}"
    actions:
      SetTextColor: "{{ options.colormaps.currencies.pick(row.chaos_value) }}"
    tags: {{ options.thresholds.currencies.get_tags(row) }}
{% endfor %}
  - visibility: Hide
    conditions:
      Class: Currency
"#;

#[test]
fn test_threshold_rows_become_rules() {
    let filter = TestLoader::new().load(CURRENCY_TEMPLATE);

    let names: Vec<&str> = filter
        .rules
        .iter()
        .filter_map(|rule| rule.name.as_deref())
        .collect();
    assert_eq!(
        &names[..4],
        &["Exalted Orb", "Orb of Annulment", "Vaal Orb", "Chaos Orb"]
    );
    assert_eq!(filter.rules.len(), 5);
    assert_eq!(filter.rules[4].visibility, Visibility::Hide);
    assert!(filter.rules[3].tags.contains("QU4"));
}

#[test]
fn test_colormap_scaled_to_category_maximum() {
    let filter = TestLoader::new().load(CURRENCY_TEMPLATE);
    let exalted = &filter.rules[0];
    let color = exalted.actions[&ActionKind::SetTextColor].as_color().unwrap();
    // the most valuable currency sits at the end of Curl_20
    assert_eq!(color.hex(), "#340d35");
}

#[test]
fn test_loaded_filter_serializes() -> anyhow::Result<()> {
    let filter = TestLoader::new().loader().loads(CURRENCY_TEMPLATE, false)?;
    let text = dumps(&filter);
    assert!(text.starts_with("Show\n"));
    assert!(text.contains("BaseType \"Exalted Orb\""));
    assert!(text.contains("Hide\n    Class \"Currency\""));
    Ok(())
}

// =============================================================================
// Includes, Styles and Helpers
// =============================================================================

#[test]
fn test_included_styles_apply_by_tag() {
    let loader = TestLoader::new().with_template(
        "styles.yaml",
        r#"
presets:
  default: {}
styles:
  breach:
    actions:
      SetFontSize: 45
    tags: [breach]
"#,
    );
    let filter = loader.load(
        r#"{% include "styles.yaml" %}
rules:
{% for row in ctx.fragments %}
  - conditions:
      BaseType: "{{ row.item_name }}"
    tags: {{ get_item_tags(row) }}
{% endfor %}
"#,
    );

    assert_eq!(filter.rules.len(), 4);
    let chayula = &filter.rules[0];
    assert!(chayula.tags.contains("breach:chayula"));
    assert_eq!(
        chayula.actions[&ActionKind::SetFontSize].args,
        vec![ActionArg::Int(45)]
    );
    // Mortal Grief has no keyword tags
    assert!(filter.rules[1].tags.is_empty());
    assert!(!filter.rules[1].actions.contains_key(&ActionKind::SetFontSize));
    assert!(filter.rules[2].tags.contains("breach:xoph"));
    assert!(filter.rules[3].tags.contains("sacrifice"));
}

#[test]
fn test_iter_stacks_builds_stack_rules() {
    let filter = TestLoader::new().load(
        r#"
rules:
{% for op, size in iter_stacks(1, 3) %}
  - conditions:
      BaseType: "Chaos Orb"
      StackSize: {"{{ op }}": {{ size }}}
    tags: {{ get_stack_tags(size, 1) }}
{% endfor %}
"#,
    );

    assert_eq!(filter.rules.len(), 3);
    let ops: Vec<Operator> = filter
        .rules
        .iter()
        .map(|rule| rule.conditions[&ConditionKind::StackSize].op)
        .collect();
    assert_eq!(ops, vec![Operator::Exact, Operator::Exact, Operator::Ge]);
    let last_tags: Vec<&str> = filter.rules[2].tags.iter().map(String::as_str).collect();
    assert_eq!(last_tags, vec!["stacks", "stacks:1", "stacks:2", "stacks:3"]);
}

#[test]
fn test_check_visibility_global() {
    let rendered = TestLoader::new().render(
        "{% for row in ctx.currencies %}{% if check_visibility('currencies', row) %}{{ row }};{% endif %}{% endfor %}",
    );
    assert_eq!(rendered, "Exalted Orb;Orb of Annulment;Vaal Orb;Chaos Orb;");
}

#[test]
fn test_stacked_value_tags() {
    let rendered = TestLoader::new().render("{{ options.thresholds.currencies.get_tags(5.0, 4) }}");
    assert_eq!(rendered, r#"["Q4", "QU5", "D9", "P89"]"#);
}

#[test]
fn test_query_filter_reads_extra_fields() -> anyhow::Result<()> {
    let ctx = ItemFilterContext::from_json_str(
        r#"{"uniques": [{"item_name": "Tabula Rasa", "chaos_value": 10.0, "links": 6}]}"#,
    )?;
    let loader = FilterLoaderBuilder::new().with_context(ctx).build()?;
    let rendered = loader.render(
        "{% for row in ctx.uniques %}{{ row|q('links', 0) }} {{ row|q('variant', 'none') }}{% endfor %}",
    )?;
    assert_eq!(rendered, "6 none");
    Ok(())
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_pre_rendered_documents_skip_templating() -> anyhow::Result<()> {
    let filter = wraeblast_sdk::loads(
        "rules:\n  - visibility: Hide\n    tags: [\"{{ raw }}\"]\n",
        &common::context(),
        None,
        true,
    )?;
    assert!(filter.rules[0].tags.contains("{{ raw }}"));
    Ok(())
}

#[test]
fn test_invalid_document_is_a_parse_error() {
    let result = TestLoader::new()
        .loader()
        .loads("rules:\n  - conditions:\n      ItemLevl: {{ 3 }}\n", false);
    assert!(matches!(result, Err(SdkError::Parse(_))));
}

#[test]
fn test_missing_include_is_a_template_error() {
    let result = TestLoader::new()
        .loader()
        .render("{% include \"missing.yaml\" %}");
    assert!(matches!(result, Err(SdkError::Template(_))));
}

#[test]
fn test_unknown_threshold_method() {
    let result = TestLoader::new()
        .loader()
        .render("{{ options.thresholds.currencies.explode() }}");
    assert!(matches!(result, Err(SdkError::Template(_))));
}
