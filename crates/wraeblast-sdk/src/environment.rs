//! Template environment
//!
//! Builds the minijinja environment filter templates render in. Templates
//! see two globals backed by Rust objects:
//!
//! - `ctx`: category name to a list of rows (`ctx.currencies`), each row
//!   exposing `item_name`, `chaos_value`, its quantile ranks and any extra
//!   source field
//! - `options`: `options.thresholds.<category>` with `check_visibility`,
//!   `get_tags`, `get_dataframe_query` and `filter_rows` methods, and
//!   `options.colormaps.<category>` with a `pick` method
//!
//! plus the helper functions of [`crate::helpers`], the constant `e` and
//! the `q` filter. Colors cross the template boundary as hex strings.

use crate::colors::{self, Colormap};
use crate::config::{ColormapOptions, ItemFilterPrerenderOptions, RenderOptions};
use crate::helpers::{self, TextColorOptions, DEFAULT_STACK_INTERVAL};
use minijinja::value::{from_args, Enumerator, Kwargs, Object, ObjectRepr, Value};
use minijinja::{AutoEscape, Environment, Error, ErrorKind, State};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use wraeblast_core::{Color, Operator};
use wraeblast_insights::{ItemFilterContext, ItemRow, QuantileKind, QuantileLabel, TagSource, ThresholdOptions};

fn invalid(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::InvalidOperation, message.into())
}

fn wrap<E>(message: &str) -> impl FnOnce(E) -> Error + '_
where
    E: std::error::Error + Send + Sync + 'static,
{
    move |err| invalid(message).with_source(err)
}

/// Create the environment a template renders in
pub fn create_environment(
    ctx: Arc<ItemFilterContext>,
    options: Arc<ItemFilterPrerenderOptions>,
    render_options: &RenderOptions,
) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(minijinja::path_loader(render_options.search_path.clone()));
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_keep_trailing_newline(true);

    env.add_global("ctx", Value::from_object(ContextValue::new(ctx.clone())));
    env.add_global(
        "options",
        Value::from_object(OptionsValue::new(options, ctx)),
    );
    env.add_global("e", Value::from(std::f64::consts::E));

    env.add_function("change_brightness", change_brightness);
    env.add_function("colormap", colormap);
    env.add_function("colormap_pick", colormap_pick);
    env.add_function("get_item_tags", get_item_tags);
    env.add_function("get_quantile_threshold_tags", get_quantile_threshold_tags);
    env.add_function("get_stack_tags", get_stack_tags);
    env.add_function("iter_stacks", iter_stacks);
    env.add_function("nearest_named_color", nearest_named_color);
    env.add_function("normalize_skill_gem_name", normalize_skill_gem_name);
    env.add_function("round_down", round_down);
    env.add_function("text_color", text_color);
    env.add_function("check_visibility", check_visibility);
    env.add_filter("q", query);
    env
}

// ========== Argument conversion ==========

/// A color from a name, a hex string or a list of 3 or 4 channels
fn color_arg(value: &Value) -> Result<Color, Error> {
    if let Some(text) = value.as_str() {
        return text.parse::<Color>().map_err(wrap("invalid color"));
    }
    let channels = value
        .try_iter()?
        .map(i64::try_from)
        .collect::<Result<Vec<i64>, Error>>()?;
    Color::from_channels(&channels).map_err(wrap("invalid color"))
}

/// A colormap from a registry name, a `colormap()` result or a category colormap
fn colormap_arg(value: &Value) -> Result<Colormap, Error> {
    if let Some(name) = value.as_str() {
        return colors::get_colormap_by_name(name).map_err(wrap("unknown colormap"));
    }
    if let Some(colormap) = value.downcast_object_ref::<ColormapValue>() {
        return Ok(colormap.0.clone());
    }
    if let Some(options) = value.downcast_object_ref::<ColormapOptionsValue>() {
        return options.0.get_colormap().map_err(wrap("unknown colormap"));
    }
    Err(invalid(format!("expected a colormap, got {}", value.kind())))
}

fn row_arg(value: &Value) -> Result<&ItemRow, Error> {
    value
        .downcast_object_ref::<RowValue>()
        .map(|row| &row.0)
        .ok_or_else(|| invalid(format!("expected an item row, got {}", value.kind())))
}

fn item_name_arg(value: &Value) -> Result<String, Error> {
    if let Some(row) = value.downcast_object_ref::<RowValue>() {
        return Ok(row.0.item_name.clone());
    }
    if let Some(name) = value.as_str() {
        return Ok(name.to_string());
    }
    value
        .get_attr("item_name")?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid("expected an item row or name"))
}

fn operator_arg(value: Option<String>, default: Operator) -> Result<Operator, Error> {
    match value {
        Some(op) => op.parse::<Operator>().map_err(wrap("invalid operator")),
        None => Ok(default),
    }
}

fn rows_value(rows: impl IntoIterator<Item = ItemRow>) -> Value {
    Value::from_iter(rows.into_iter().map(|row| Value::from_object(RowValue(row))))
}

// ========== Helper functions ==========

fn change_brightness(color: Value, brightness: f64) -> Result<String, Error> {
    Ok(helpers::change_brightness(color_arg(&color)?, brightness).hex())
}

fn colormap(name: String, color_list: Vec<Value>) -> Result<Value, Error> {
    let color_list = color_list.iter().map(color_arg).collect::<Result<Vec<Color>, Error>>()?;
    let colormap = colors::linear_colormap_from_color_list(&name, &color_list)
        .map_err(wrap("invalid colormap"))?;
    Ok(Value::from_object(ColormapValue(colormap)))
}

fn colormap_pick(
    cmap: Value,
    value: f64,
    vmax: f64,
    vmin: Option<f64>,
    log_scale: Option<bool>,
) -> Result<String, Error> {
    let colormap = colormap_arg(&cmap)?;
    Ok(helpers::colormap_pick(
        &colormap,
        value,
        vmax,
        vmin.unwrap_or(1.0),
        log_scale.unwrap_or(true),
    )
    .hex())
}

fn get_item_tags(row: Value) -> Result<Vec<String>, Error> {
    Ok(helpers::get_item_tags(&item_name_arg(&row)?))
}

fn get_quantile_threshold_tags(
    quantile: String,
    value: Option<u32>,
    mask: Option<bool>,
) -> Result<Vec<String>, Error> {
    let label = match value {
        None => quantile.parse::<QuantileLabel>().map_err(wrap("invalid quantile"))?,
        Some(value) => {
            let kind = QuantileKind::from_column(&quantile)
                .ok_or_else(|| invalid(format!("unknown quantile '{}'", quantile)))?;
            if value == 0 || value > kind.buckets() {
                return Err(invalid(format!("{} {} is out of range", quantile, value)));
            }
            QuantileLabel::new(kind, value)
        }
    };
    Ok(helpers::get_quantile_threshold_tags(label, mask.unwrap_or(false)))
}

fn get_stack_tags(stack_size: u32, interval: Option<u32>) -> Vec<String> {
    helpers::get_stack_tags(stack_size, interval.unwrap_or(DEFAULT_STACK_INTERVAL))
}

fn iter_stacks(start: i64, end: i64, op: Option<String>, end_op: Option<String>) -> Result<Value, Error> {
    let op = operator_arg(op, Operator::Exact)?;
    let end_op = operator_arg(end_op, Operator::Ge)?;
    Ok(Value::from_iter(
        helpers::iter_stacks(start, end, op, end_op)
            .into_iter()
            .map(|(op, size)| Value::from(vec![Value::from(op.as_str()), Value::from(size)])),
    ))
}

fn nearest_named_color(
    cmap: Value,
    value_or_threshold: Value,
    vmax: Option<f64>,
    vmin: Option<f64>,
    log_scale: Option<bool>,
) -> Result<String, Error> {
    let colormap = colormap_arg(&cmap)?;
    let (value, log_scale) = match value_or_threshold.as_str() {
        Some(label) => {
            let label = label.parse::<QuantileLabel>().map_err(wrap("invalid quantile"))?;
            (helpers::quantile_position(label), false)
        }
        None => (f64::try_from(value_or_threshold.clone())?, log_scale.unwrap_or(true)),
    };
    let named = helpers::nearest_named_color(
        &colormap,
        value,
        vmax.unwrap_or(1.0),
        vmin.unwrap_or(0.0),
        log_scale,
    );
    Ok(named.as_str().to_string())
}

fn normalize_skill_gem_name(name: String) -> String {
    helpers::normalize_skill_gem_name(&name).to_string()
}

fn round_down(value: f64, k: i64) -> Result<i64, Error> {
    helpers::round_down(value, k).map_err(wrap("round_down failed"))
}

fn text_color(color: Value, kwargs: Kwargs) -> Result<String, Error> {
    let defaults = TextColorOptions::default();
    let dark_color: Option<Value> = kwargs.get("dark_color")?;
    let light_color: Option<Value> = kwargs.get("light_color")?;
    let options = TextColorOptions {
        lum_threshold: kwargs.get::<Option<f64>>("lum_threshold")?.unwrap_or(defaults.lum_threshold),
        dark_color: dark_color.as_ref().map(color_arg).transpose()?,
        light_color: light_color.as_ref().map(color_arg).transpose()?,
        monochrome: kwargs.get::<Option<bool>>("monochrome")?.unwrap_or(defaults.monochrome),
        lum_shift: kwargs.get::<Option<f64>>("lum_shift")?.unwrap_or(defaults.lum_shift),
    };
    kwargs.assert_all_used()?;
    Ok(helpers::text_color(color_arg(&color)?, &options).hex())
}

/// `check_visibility(category, row, stack_size=1)`
fn check_visibility(state: &State, category: String, row: Value, stack_size: Option<u32>) -> Result<bool, Error> {
    let options = state
        .lookup("options")
        .ok_or_else(|| invalid("options are not available"))?;
    let thresholds = options.get_attr("thresholds")?;
    let threshold = thresholds.get_attr(&category)?;
    let threshold = threshold
        .downcast_object_ref::<ThresholdValue>()
        .ok_or_else(|| invalid(format!("no threshold configured for '{}'", category)))?;
    Ok(threshold.check_visibility(row_arg(&row)?, stack_size.unwrap_or(1)))
}

/// `value|q("a.b.0", default)`: dotted attribute and index lookup
fn query(value: Value, path: String, default: Option<Value>) -> Value {
    let fallback = || default.clone().unwrap_or(Value::from(()));
    let mut current = value;
    for part in path.split('.').filter(|part| !part.is_empty()) {
        let next = match part.parse::<i64>() {
            Ok(index) => current.get_item(&Value::from(index)),
            Err(_) => current.get_attr(part),
        };
        match next {
            Ok(next) if !next.is_undefined() && !next.is_none() => current = next,
            _ => return fallback(),
        }
    }
    current
}

// ========== Template objects ==========

/// One priced item
#[derive(Debug)]
pub struct RowValue(pub ItemRow);

impl Object for RowValue {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let row = &self.0;
        match key.as_str()? {
            "item_name" => Some(Value::from(row.item_name.clone())),
            "chaos_value" => Some(Value::from(row.chaos_value)),
            "quartile" => Some(Value::from(row.quartile)),
            "quintile" => Some(Value::from(row.quintile)),
            "decile" => Some(Value::from(row.decile)),
            "percentile" => Some(Value::from(row.percentile)),
            "quantile_tags" => Some(Value::from(row.quantile_tags())),
            other => row.extra.get(other).map(Value::from_serialize),
        }
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result
    where
        Self: Sized + 'static,
    {
        f.write_str(&self.0.item_name)
    }
}

/// The economic context, one row list per category
#[derive(Debug)]
pub struct ContextValue {
    tables: BTreeMap<String, Value>,
}

impl ContextValue {
    pub fn new(ctx: Arc<ItemFilterContext>) -> Self {
        let tables = ctx
            .data
            .iter()
            .map(|(category, table)| (category.clone(), rows_value(table.rows().iter().cloned())))
            .collect();
        Self { tables }
    }
}

impl Object for ContextValue {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        self.tables.get(key.as_str()?).cloned()
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Values(self.tables.keys().map(|k| Value::from(k.clone())).collect())
    }
}

/// The prerender options of a render
#[derive(Debug)]
pub struct OptionsValue {
    thresholds: Value,
    colormaps: Value,
}

impl OptionsValue {
    pub fn new(options: Arc<ItemFilterPrerenderOptions>, ctx: Arc<ItemFilterContext>) -> Self {
        let thresholds = Value::from_iter(options.thresholds.keys().map(|category| {
            let threshold = ThresholdValue {
                category: category.clone(),
                options: options.clone(),
                ctx: ctx.clone(),
            };
            (category.clone(), Value::from_object(threshold))
        }));
        let colormaps = Value::from_iter(options.colormaps.iter().map(|(category, colormap)| {
            (category.clone(), Value::from_object(ColormapOptionsValue(colormap.clone())))
        }));
        Self {
            thresholds,
            colormaps,
        }
    }
}

impl Object for OptionsValue {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        match key.as_str()? {
            "thresholds" => Some(self.thresholds.clone()),
            "colormaps" => Some(self.colormaps.clone()),
            _ => None,
        }
    }
}

/// The threshold rule of one category
#[derive(Debug)]
pub struct ThresholdValue {
    category: String,
    options: Arc<ItemFilterPrerenderOptions>,
    ctx: Arc<ItemFilterContext>,
}

impl ThresholdValue {
    fn threshold(&self) -> Option<&ThresholdOptions> {
        self.options.thresholds.get(&self.category)
    }

    fn context(&self) -> Option<(&ItemFilterContext, &str)> {
        self.ctx
            .contains(&self.category)
            .then_some((self.ctx.as_ref(), self.category.as_str()))
    }

    fn check_visibility(&self, row: &ItemRow, stack_size: u32) -> bool {
        let table = self.ctx.data.get(&self.category);
        self.threshold()
            .map(|threshold| threshold.check_visibility(row, stack_size, table))
            .unwrap_or(false)
    }
}

impl Object for ThresholdValue {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let threshold = self.threshold()?;
        match (key.as_str()?, threshold) {
            ("category", _) => Some(Value::from(self.category.clone())),
            ("quantile", ThresholdOptions::Quantile(quantile)) => {
                Some(Value::from(quantile.quantile.to_string()))
            }
            ("visibility", ThresholdOptions::Tiered(tiered)) => Some(Value::from(tiered.visibility)),
            ("valuable", ThresholdOptions::Tiered(tiered)) => Some(Value::from(tiered.valuable)),
            ("highly_valuable", ThresholdOptions::Tiered(tiered)) => {
                Some(Value::from(tiered.highly_valuable))
            }
            ("extremely_valuable", ThresholdOptions::Tiered(tiered)) => {
                Some(Value::from(tiered.extremely_valuable))
            }
            _ => None,
        }
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        let threshold = self
            .threshold()
            .ok_or_else(|| invalid(format!("no threshold configured for '{}'", self.category)))?;
        match method {
            "check_visibility" => {
                let (row, stack_size): (Value, Option<u32>) = from_args(args)?;
                Ok(Value::from(self.check_visibility(row_arg(&row)?, stack_size.unwrap_or(1))))
            }
            "get_tags" => {
                let (subject, stack_size): (Value, Option<u32>) = from_args(args)?;
                let stack_size = stack_size.unwrap_or(1);
                let tags = match subject.downcast_object_ref::<RowValue>() {
                    Some(row) => threshold.get_tags(TagSource::Row(&row.0), stack_size, self.context()),
                    None => {
                        let value = f64::try_from(subject.clone())?;
                        threshold.get_tags(TagSource::Value(value), stack_size, self.context())
                    }
                }
                .map_err(wrap("tag lookup failed"))?;
                Ok(Value::from(tags))
            }
            "get_dataframe_query" => {
                let (inverted,): (Option<bool>,) = from_args(args)?;
                Ok(Value::from(
                    threshold.get_dataframe_query(inverted.unwrap_or(false)).to_string(),
                ))
            }
            "filter_rows" => {
                let (inverted,): (Option<bool>,) = from_args(args)?;
                let Some(table) = self.ctx.data.get(&self.category) else {
                    return Ok(Value::from(Vec::<Value>::new()));
                };
                Ok(rows_value(
                    threshold
                        .filter_rows(table, inverted.unwrap_or(false))
                        .into_iter()
                        .cloned(),
                ))
            }
            _ => Err(Error::from(ErrorKind::UnknownMethod)),
        }
    }
}

/// A colormap built by `colormap()`
#[derive(Debug)]
pub struct ColormapValue(pub Colormap);

impl Object for ColormapValue {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result
    where
        Self: Sized + 'static,
    {
        f.write_str(self.0.name())
    }
}

/// The colormap configured for one category
#[derive(Debug)]
pub struct ColormapOptionsValue(pub ColormapOptions);

impl Object for ColormapOptionsValue {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        match key.as_str()? {
            "name" => Some(Value::from(self.0.name.clone())),
            "vmin" => Some(Value::from(self.0.vmin)),
            "vmax" => Some(Value::from(self.0.vmax)),
            _ => None,
        }
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        match method {
            "pick" => {
                let (value, vmax, vmin, log_scale): (f64, Option<f64>, Option<f64>, Option<bool>) =
                    from_args(args)?;
                let color = self
                    .0
                    .pick(value, vmax, vmin, log_scale.unwrap_or(true))
                    .map_err(wrap("colormap pick failed"))?;
                Ok(Value::from(color.hex()))
            }
            _ => Err(Error::from(ErrorKind::UnknownMethod)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;
    use wraeblast_insights::ItemTable;

    fn environment() -> Environment<'static> {
        let ctx = ItemFilterContext::new().with_table(
            "currencies",
            ItemTable::from_prices([("Exalted Orb", 150.0), ("Chaos Orb", 1.0), ("Orb of Alchemy", 0.3)]),
        );
        let options = ItemFilterPrerenderOptions::with_defaults(None, Some(&ctx), true).unwrap();
        create_environment(Arc::new(ctx), Arc::new(options), &RenderOptions::default())
    }

    fn render(source: &str) -> String {
        environment().render_str(source, context! {}).unwrap()
    }

    #[test]
    fn test_rows_expose_fields() {
        assert_eq!(
            render("{% for row in ctx.currencies %}{{ row.item_name }}={{ row.quartile }};{% endfor %}"),
            "Exalted Orb=4;Chaos Orb=2;Orb of Alchemy=1;"
        );
    }

    #[test]
    fn test_context_enumerates_categories() {
        assert_eq!(render("{% for category in ctx %}{{ category }}{% endfor %}"), "currencies");
    }

    #[test]
    fn test_threshold_methods() {
        assert_eq!(
            render("{{ options.thresholds.currencies.get_dataframe_query() }}"),
            "quintile >= 4"
        );
        assert_eq!(render("{{ options.thresholds.currencies.quantile }}"), "QU4");
        assert_eq!(
            render(
                "{% for row in options.thresholds.currencies.filter_rows() %}{{ row }};{% endfor %}"
            ),
            "Exalted Orb;"
        );
    }

    #[test]
    fn test_helper_functions() {
        assert_eq!(render("{{ get_stack_tags(10) }}"), r#"["stacks", "stacks:5", "stacks:10"]"#);
        assert_eq!(render("{{ normalize_skill_gem_name('Anomalous Arc') }}"), "Arc");
        assert_eq!(render("{{ round_down(17, 5) }}"), "15");
        assert_eq!(render("{{ change_brightness('#ff0000', 0.25) }}"), "#800000");
        assert_eq!(render("{{ text_color('white', monochrome=true) }}"), "#000000");
        assert_eq!(
            render("{% for op, size in iter_stacks(1, 2) %}{{ op }}{{ size }} {% endfor %}"),
            "==1 >=2 "
        );
    }

    #[test]
    fn test_colormap_functions() {
        assert_eq!(
            render("{{ colormap_pick(colormap('bw', ['white', 'black']), 1, 30000) }}"),
            "#ffffff"
        );
        assert_eq!(
            render("{{ nearest_named_color(colormap('wr', ['white', 'red']), 'QU1') }}"),
            "White"
        );
        assert_eq!(render("{{ options.colormaps.uniques.name }}"), "Viridis_20");
    }

    #[test]
    fn test_query_filter() {
        assert_eq!(
            render("{{ {'a': {'b': [1, 2]}}|q('a.b.1') }}"),
            "2"
        );
        assert_eq!(render("{{ {'a': {}}|q('a.missing', 'fallback') }}"), "fallback");
    }

    #[test]
    fn test_invalid_color_fails_render() {
        let result = environment().render_str("{{ text_color('not-a-color') }}", context! {});
        assert!(result.is_err());
    }
}
