//! Action definitions and argument validation

use crate::error::{CoreError, Result};
use crate::types::{Color, NamedColor, Shape};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

keyword_enum! {
    /// Display or audio effect applied to a matching item
    pub enum ActionKind("action") {
        CustomAlertSound => "CustomAlertSound",
        DisableDropSound => "DisableDropSound",
        EnableDropSound => "EnableDropSound",
        MinimapIcon => "MinimapIcon",
        PlayAlertSound => "PlayAlertSound",
        PlayAlertSoundPositional => "PlayAlertSoundPositional",
        PlayEffect => "PlayEffect",
        SetBackgroundColor => "SetBackgroundColor",
        SetBorderColor => "SetBorderColor",
        SetFontSize => "SetFontSize",
        SetTextColor => "SetTextColor",
    }
}

impl ActionKind {
    /// Actions that take a single color argument
    pub fn is_color(&self) -> bool {
        matches!(
            self,
            ActionKind::SetBackgroundColor | ActionKind::SetBorderColor | ActionKind::SetTextColor
        )
    }

    /// Actions written as a bare keyword
    pub fn is_drop_sound(&self) -> bool {
        matches!(
            self,
            ActionKind::DisableDropSound | ActionKind::EnableDropSound
        )
    }

    /// Actions whose word arguments are written without quotes
    pub fn has_unquoted_args(&self) -> bool {
        matches!(self, ActionKind::MinimapIcon | ActionKind::PlayEffect)
    }
}

/// Enumerated keyword arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumArg {
    Color(NamedColor),
    Shape(Shape),
    /// Short-lived beam effect
    Temp,
    /// Disables an effect
    None,
}

impl EnumArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnumArg::Color(color) => color.as_str(),
            EnumArg::Shape(shape) => shape.as_str(),
            EnumArg::Temp => "Temp",
            EnumArg::None => "None",
        }
    }
}

impl FromStr for EnumArg {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Temp" => Ok(EnumArg::Temp),
            "None" => Ok(EnumArg::None),
            other => other
                .parse::<NamedColor>()
                .map(EnumArg::Color)
                .or_else(|_| other.parse::<Shape>().map(EnumArg::Shape)),
        }
    }
}

impl fmt::Display for EnumArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EnumArg {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EnumArg {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A single action argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionArg {
    Int(i64),
    String(String),
    Sequence(Vec<ActionArg>),
    Color(Color),
    Enum(EnumArg),
}

impl From<i64> for ActionArg {
    fn from(value: i64) -> Self {
        ActionArg::Int(value)
    }
}

impl From<&str> for ActionArg {
    fn from(value: &str) -> Self {
        ActionArg::String(value.to_string())
    }
}

impl From<Color> for ActionArg {
    fn from(value: Color) -> Self {
        ActionArg::Color(value)
    }
}

/// A display or audio effect with validated arguments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    pub kind: ActionKind,
    pub args: Vec<ActionArg>,
}

impl Action {
    /// Create an action, normalizing the arguments for its kind
    pub fn new(kind: ActionKind, args: Vec<ActionArg>) -> Result<Self> {
        let args = normalize_args(kind, args)?;
        Ok(Action { kind, args })
    }

    /// Single-color action
    pub fn color(kind: ActionKind, color: Color) -> Result<Self> {
        Action::new(kind, vec![ActionArg::Color(color)])
    }

    /// The color carried by a color action
    pub fn as_color(&self) -> Option<Color> {
        match self.args.as_slice() {
            [ActionArg::Color(color)] => Some(*color),
            _ => None,
        }
    }
}

/// Validate and normalize action arguments, shared with styles
pub fn normalize_args(kind: ActionKind, args: Vec<ActionArg>) -> Result<Vec<ActionArg>> {
    if kind.is_drop_sound() {
        return Ok(Vec::new());
    }
    if kind.is_color() {
        return Ok(vec![ActionArg::Color(to_color(kind, &args)?)]);
    }

    let args = flatten(args);
    let invalid = |message: String| CoreError::invalid(kind.as_str(), message);

    match kind {
        ActionKind::SetFontSize => match args.as_slice() {
            [size] => Ok(vec![ActionArg::Int(to_int(kind, size)?)]),
            _ => Err(invalid(format!("expected a font size, got {} args", args.len()))),
        },
        ActionKind::PlayAlertSound | ActionKind::PlayAlertSoundPositional => {
            let (id, volume) = match args.as_slice() {
                [id] => (id, None),
                [id, volume] => (id, Some(to_int(kind, volume)?)),
                _ => return Err(invalid(format!("expected 'id [volume]', got {} args", args.len()))),
            };
            let id = match id {
                ActionArg::Int(n) => ActionArg::Int(*n),
                ActionArg::String(s) => match s.trim().parse::<i64>() {
                    Ok(n) => ActionArg::Int(n),
                    Err(_) => ActionArg::String(s.clone()),
                },
                other => return Err(invalid(format!("invalid sound id {:?}", other))),
            };
            Ok(with_volume(id, volume))
        }
        ActionKind::CustomAlertSound => {
            let (path, volume) = match args.as_slice() {
                [path] => (path, None),
                [path, volume] => (path, Some(to_int(kind, volume)?)),
                _ => return Err(invalid(format!("expected 'path [volume]', got {} args", args.len()))),
            };
            match path {
                ActionArg::String(s) => Ok(with_volume(ActionArg::String(s.clone()), volume)),
                other => Err(invalid(format!("expected a sound file path, got {:?}", other))),
            }
        }
        ActionKind::MinimapIcon => match args.as_slice() {
            [size] => Ok(vec![ActionArg::Int(to_int(kind, size)?)]),
            [size, color, shape] => Ok(vec![
                ActionArg::Int(to_int(kind, size)?),
                ActionArg::Enum(EnumArg::Color(to_enum(kind, color)?)),
                ActionArg::Enum(EnumArg::Shape(to_enum(kind, shape)?)),
            ]),
            _ => Err(invalid(format!("expected 'size color shape', got {} args", args.len()))),
        },
        ActionKind::PlayEffect => {
            let (color, temp) = match args.as_slice() {
                [color] => (color, None),
                [color, temp] => (color, Some(temp)),
                _ => return Err(invalid(format!("expected 'color [Temp]', got {} args", args.len()))),
            };
            let color = match to_enum_arg(kind, color)? {
                arg @ (EnumArg::Color(_) | EnumArg::None) => arg,
                other => return Err(invalid(format!("expected an effect color, got {}", other))),
            };
            let mut normalized = vec![ActionArg::Enum(color)];
            if let Some(temp) = temp {
                match to_enum_arg(kind, temp)? {
                    EnumArg::Temp => normalized.push(ActionArg::Enum(EnumArg::Temp)),
                    other => return Err(invalid(format!("expected Temp, got {}", other))),
                }
            }
            Ok(normalized)
        }
        _ => Ok(args),
    }
}

fn flatten(args: Vec<ActionArg>) -> Vec<ActionArg> {
    match <[ActionArg; 1]>::try_from(args) {
        Ok([ActionArg::Sequence(inner)]) => flatten(inner),
        Ok([single]) => vec![single],
        Err(args) => args,
    }
}

fn with_volume(first: ActionArg, volume: Option<i64>) -> Vec<ActionArg> {
    let mut args = vec![first];
    if let Some(volume) = volume {
        args.push(ActionArg::Int(volume));
    }
    args
}

fn to_int(kind: ActionKind, arg: &ActionArg) -> Result<i64> {
    match arg {
        ActionArg::Int(n) => Ok(*n),
        ActionArg::String(s) => s
            .trim()
            .parse()
            .map_err(|_| CoreError::invalid(kind.as_str(), format!("expected an integer, got '{}'", s))),
        other => Err(CoreError::invalid(
            kind.as_str(),
            format!("expected an integer, got {:?}", other),
        )),
    }
}

fn to_enum_arg(kind: ActionKind, arg: &ActionArg) -> Result<EnumArg> {
    match arg {
        ActionArg::Enum(value) => Ok(*value),
        ActionArg::String(s) => s
            .parse()
            .map_err(|_| CoreError::invalid(kind.as_str(), format!("unknown keyword '{}'", s))),
        other => Err(CoreError::invalid(
            kind.as_str(),
            format!("expected a keyword, got {:?}", other),
        )),
    }
}

fn to_enum<T>(kind: ActionKind, arg: &ActionArg) -> Result<T>
where
    T: TryFrom<EnumArg>,
{
    let value = to_enum_arg(kind, arg)?;
    T::try_from(value)
        .map_err(|_| CoreError::invalid(kind.as_str(), format!("unexpected keyword '{}'", value)))
}

impl TryFrom<EnumArg> for NamedColor {
    type Error = EnumArg;

    fn try_from(value: EnumArg) -> std::result::Result<Self, Self::Error> {
        match value {
            EnumArg::Color(color) => Ok(color),
            other => Err(other),
        }
    }
}

impl TryFrom<EnumArg> for Shape {
    type Error = EnumArg;

    fn try_from(value: EnumArg) -> std::result::Result<Self, Self::Error> {
        match value {
            EnumArg::Shape(shape) => Ok(shape),
            other => Err(other),
        }
    }
}

fn to_color(kind: ActionKind, args: &[ActionArg]) -> Result<Color> {
    let invalid = || {
        CoreError::invalid(
            kind.as_str(),
            "color values must be a color name, a hex string or RGB(A) bytes",
        )
    };
    match args {
        [ActionArg::Color(color)] => Ok(*color),
        [ActionArg::String(s)] => s.parse(),
        [ActionArg::Enum(EnumArg::Color(named))] => Ok(Color::from(*named)),
        [ActionArg::Sequence(inner)] => to_color(kind, inner),
        channels if channels.len() == 3 || channels.len() == 4 => {
            let bytes = channels
                .iter()
                .map(|c| match c {
                    ActionArg::Int(n) => Ok(*n),
                    _ => Err(invalid()),
                })
                .collect::<Result<Vec<i64>>>()?;
            Color::from_channels(&bytes)
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_bytes() {
        let action = Action::new(
            ActionKind::SetTextColor,
            vec![ActionArg::Int(175), ActionArg::Int(96), ActionArg::Int(37)],
        )
        .unwrap();
        assert_eq!(action.as_color().unwrap().rgb_bytes(), [175, 96, 37]);
    }

    #[test]
    fn test_color_from_name_and_nested_sequence() {
        let action = Action::new(ActionKind::SetBorderColor, vec!["chaos".into()]).unwrap();
        assert_eq!(action.as_color().unwrap().rgb_bytes(), [208, 32, 144]);

        let nested = ActionArg::Sequence(vec![ActionArg::Int(0), ActionArg::Int(0), ActionArg::Int(0), ActionArg::Int(200)]);
        let action = Action::new(ActionKind::SetBackgroundColor, vec![nested]).unwrap();
        assert_eq!(action.as_color().unwrap().rgba_bytes(), [0, 0, 0, 200]);
    }

    #[test]
    fn test_color_rejects_wrong_arity() {
        let result = Action::new(ActionKind::SetTextColor, vec![ActionArg::Int(1), ActionArg::Int(2)]);
        assert!(matches!(result, Err(CoreError::InvalidValue { .. })));
    }

    #[test]
    fn test_drop_sound_has_no_args() {
        let action = Action::new(ActionKind::DisableDropSound, vec![ActionArg::Int(1)]).unwrap();
        assert!(action.args.is_empty());
    }

    #[test]
    fn test_font_size() {
        let action = Action::new(ActionKind::SetFontSize, vec!["45".into()]).unwrap();
        assert_eq!(action.args, vec![ActionArg::Int(45)]);
        assert!(Action::new(ActionKind::SetFontSize, vec!["large".into()]).is_err());
    }

    #[test]
    fn test_minimap_icon_keywords() {
        let action = Action::new(
            ActionKind::MinimapIcon,
            vec![ActionArg::Int(0), "Red".into(), "Star".into()],
        )
        .unwrap();
        assert_eq!(
            action.args,
            vec![
                ActionArg::Int(0),
                ActionArg::Enum(EnumArg::Color(NamedColor::Red)),
                ActionArg::Enum(EnumArg::Shape(Shape::Star)),
            ]
        );

        let swapped = Action::new(
            ActionKind::MinimapIcon,
            vec![ActionArg::Int(0), "Star".into(), "Red".into()],
        );
        assert!(swapped.is_err());
    }

    #[test]
    fn test_play_effect() {
        let action = Action::new(ActionKind::PlayEffect, vec!["Yellow".into(), "Temp".into()]).unwrap();
        assert_eq!(action.args.len(), 2);

        let action = Action::new(ActionKind::PlayEffect, vec!["None".into()]).unwrap();
        assert_eq!(action.args, vec![ActionArg::Enum(EnumArg::None)]);

        assert!(Action::new(ActionKind::PlayEffect, vec!["Circle".into()]).is_err());
    }

    #[test]
    fn test_alert_sounds() {
        let action = Action::new(ActionKind::PlayAlertSound, vec!["6".into(), ActionArg::Int(300)]).unwrap();
        assert_eq!(action.args, vec![ActionArg::Int(6), ActionArg::Int(300)]);

        let action = Action::new(ActionKind::PlayAlertSound, vec!["ShExalted".into()]).unwrap();
        assert_eq!(action.args, vec![ActionArg::String("ShExalted".into())]);

        let action =
            Action::new(ActionKind::CustomAlertSound, vec!["sounds/drop.mp3".into()]).unwrap();
        assert_eq!(action.args.len(), 1);
        assert!(Action::new(ActionKind::CustomAlertSound, vec![ActionArg::Int(3)]).is_err());
    }
}
