//! StyleProperties struct with typed Option<T> fields for every style field.
//!
//! This is the central style representation shared by the document's style
//! table, inline overrides and the resolver's output. `None` means "not set"
//! (inherited from the parent style or left to the default).
//!
//! Composite fields ([`Shadow`], [`Padding`]) merge sub-field by sub-field. A
//! composite whose sub-fields are all absent (`"shadow": {}`) is the explicit
//! clear sentinel: it resets whatever was inherited instead of inheriting it.

use serde::{Deserialize, Serialize};

/// Font weight names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FontWeight {
    UltraLight,
    Thin,
    Light,
    Regular,
    Medium,
    Semibold,
    Bold,
    Heavy,
    Black,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlignment {
    Leading,
    Center,
    Trailing,
}

/// A drop shadow. Every sub-field is optional so a child style can refine
/// a single aspect of an inherited shadow.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub color: Option<String>,
    pub radius: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl Shadow {
    /// All sub-fields absent: the clear sentinel.
    pub fn is_cleared(&self) -> bool {
        self.color.is_none() && self.radius.is_none() && self.x.is_none() && self.y.is_none()
    }

    fn merge(&self, other: &Shadow) -> Shadow {
        Shadow {
            color: merge_opt(&self.color, &other.color),
            radius: merge_opt(&self.radius, &other.radius),
            x: merge_opt(&self.x, &other.x),
            y: merge_opt(&self.y, &other.y),
        }
    }
}

/// Padding with per-edge values and axis shorthands.
///
/// A specific edge wins over its axis shorthand (`top` over `vertical`,
/// `leading` over `horizontal`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Padding {
    pub top: Option<f64>,
    pub bottom: Option<f64>,
    pub leading: Option<f64>,
    pub trailing: Option<f64>,
    pub horizontal: Option<f64>,
    pub vertical: Option<f64>,
}

impl Padding {
    /// Uniform padding on all four edges.
    pub fn all(value: f64) -> Self {
        Self {
            top: Some(value),
            bottom: Some(value),
            leading: Some(value),
            trailing: Some(value),
            ..Self::default()
        }
    }

    /// All sub-fields absent: the clear sentinel.
    pub fn is_cleared(&self) -> bool {
        self.top.is_none()
            && self.bottom.is_none()
            && self.leading.is_none()
            && self.trailing.is_none()
            && self.horizontal.is_none()
            && self.vertical.is_none()
    }

    pub fn top_value(&self) -> Option<f64> {
        self.top.or(self.vertical)
    }

    pub fn bottom_value(&self) -> Option<f64> {
        self.bottom.or(self.vertical)
    }

    pub fn leading_value(&self) -> Option<f64> {
        self.leading.or(self.horizontal)
    }

    pub fn trailing_value(&self) -> Option<f64> {
        self.trailing.or(self.horizontal)
    }

    /// An axis shorthand on `other` replaces the inherited edges on that axis,
    /// so a more specific `vertical` is not shadowed by an ancestor's `top`.
    fn merge(&self, other: &Padding) -> Padding {
        let base = Padding {
            top: self.top.filter(|_| other.vertical.is_none()),
            bottom: self.bottom.filter(|_| other.vertical.is_none()),
            leading: self.leading.filter(|_| other.horizontal.is_none()),
            trailing: self.trailing.filter(|_| other.horizontal.is_none()),
            ..self.clone()
        };
        Padding {
            top: merge_opt(&base.top, &other.top),
            bottom: merge_opt(&base.bottom, &other.bottom),
            leading: merge_opt(&base.leading, &other.leading),
            trailing: merge_opt(&base.trailing, &other.trailing),
            horizontal: merge_opt(&base.horizontal, &other.horizontal),
            vertical: merge_opt(&base.vertical, &other.vertical),
        }
    }
}

/// All style fields for a node. Each field is `Option<T>`; None means unset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProperties {
    // Font
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<FontWeight>,

    // Colors
    pub text_color: Option<String>,
    pub background_color: Option<String>,
    pub tint_color: Option<String>,
    pub opacity: Option<f64>,

    // Text
    pub text_alignment: Option<TextAlignment>,

    // Border
    pub corner_radius: Option<f64>,
    pub border_width: Option<f64>,
    pub border_color: Option<String>,

    // Spacing
    pub spacing: Option<f64>,
    pub padding: Option<Padding>,

    // Sizing
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub min_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,

    // Shadow
    pub shadow: Option<Shadow>,
}

/// Pick `other` if set, otherwise keep `base`.
fn merge_opt<T: Clone>(base: &Option<T>, other: &Option<T>) -> Option<T> {
    if other.is_some() {
        other.clone()
    } else {
        base.clone()
    }
}

/// Composite merge: absent keeps the base, the clear sentinel resets to
/// `None`, anything else refines the base sub-field by sub-field.
fn merge_composite<T: Clone>(
    base: &Option<T>,
    other: &Option<T>,
    is_cleared: impl Fn(&T) -> bool,
    merge: impl Fn(&T, &T) -> T,
) -> Option<T> {
    match (base, other) {
        (_, None) => base.clone(),
        (_, Some(o)) if is_cleared(o) => None,
        (None, Some(o)) => Some(o.clone()),
        (Some(b), Some(o)) => Some(merge(b, o)),
    }
}

impl StyleProperties {
    /// Create a new `StyleProperties` with all fields set to `None`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `other` on top of `self`. For each field, if `other` has a value
    /// use it; otherwise keep `self`'s value. `self` is the less specific
    /// layer (ancestor style), `other` the more specific one.
    pub fn merge(&self, other: &StyleProperties) -> StyleProperties {
        StyleProperties {
            font_family: merge_opt(&self.font_family, &other.font_family),
            font_size: merge_opt(&self.font_size, &other.font_size),
            font_weight: merge_opt(&self.font_weight, &other.font_weight),

            text_color: merge_opt(&self.text_color, &other.text_color),
            background_color: merge_opt(&self.background_color, &other.background_color),
            tint_color: merge_opt(&self.tint_color, &other.tint_color),
            opacity: merge_opt(&self.opacity, &other.opacity),

            text_alignment: merge_opt(&self.text_alignment, &other.text_alignment),

            corner_radius: merge_opt(&self.corner_radius, &other.corner_radius),
            border_width: merge_opt(&self.border_width, &other.border_width),
            border_color: merge_opt(&self.border_color, &other.border_color),

            spacing: merge_opt(&self.spacing, &other.spacing),
            padding: merge_composite(
                &self.padding,
                &other.padding,
                Padding::is_cleared,
                Padding::merge,
            ),

            width: merge_opt(&self.width, &other.width),
            height: merge_opt(&self.height, &other.height),
            min_width: merge_opt(&self.min_width, &other.min_width),
            min_height: merge_opt(&self.min_height, &other.min_height),
            max_width: merge_opt(&self.max_width, &other.max_width),
            max_height: merge_opt(&self.max_height, &other.max_height),

            shadow: merge_composite(&self.shadow, &other.shadow, Shadow::is_cleared, Shadow::merge),
        }
    }

    /// Returns `true` if all fields are `None` (no properties set).
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
