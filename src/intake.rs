//! Validation of the spawn form.
//!
//! The form holds raw control values exactly as the user left them. [`SpawnForm::submit`] turns them
//! into a [`SpawnRequest`] or flags the offending control; a rejected submit never reaches the editor.

use thiserror::Error;

use crate::shape::ShapeKind;

pub const PLACEHOLDER_LABEL: &str = "Geometry";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeSelection {
    #[default]
    Placeholder,
    Shape(ShapeKind),
}

impl ShapeSelection {
    pub fn label(self) -> &'static str {
        match self {
            ShapeSelection::Placeholder => PLACEHOLDER_LABEL,
            ShapeSelection::Shape(kind) => kind.label(),
        }
    }
}

/// Control that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Shape,
    Scale,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntakeError {
    #[error("choose a geometry")]
    NoShapeSelected,
    #[error("scale is required")]
    EmptyScale,
    #[error("scale '{raw}' is not a number")]
    InvalidScale { raw: String },
    #[error("scale must be a positive number, got {value}")]
    NonPositiveScale { value: f32 },
}

impl IntakeError {
    pub fn field(&self) -> FormField {
        match self {
            IntakeError::NoShapeSelected => FormField::Shape,
            IntakeError::EmptyScale | IntakeError::InvalidScale { .. } | IntakeError::NonPositiveScale { .. } => {
                FormField::Scale
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub shape: ShapeKind,
    pub scale: f32,
}

#[derive(Debug, Clone)]
pub struct SpawnForm {
    pub selection: ShapeSelection,
    pub scale_text: String,
    shape_invalid: bool,
    scale_invalid: bool,
}

impl Default for SpawnForm {
    fn default() -> Self {
        Self::new("1")
    }
}

impl SpawnForm {
    pub fn new(scale_text: impl Into<String>) -> Self {
        Self {
            selection: ShapeSelection::Placeholder,
            scale_text: scale_text.into(),
            shape_invalid: false,
            scale_invalid: false,
        }
    }

    pub fn shape_invalid(&self) -> bool {
        self.shape_invalid
    }

    pub fn scale_invalid(&self) -> bool {
        self.scale_invalid
    }

    pub fn select(&mut self, selection: ShapeSelection) {
        self.selection = selection;
        self.field_edited(FormField::Shape);
    }

    pub fn set_scale_text(&mut self, text: impl Into<String>) {
        self.scale_text = text.into();
        self.field_edited(FormField::Scale);
    }

    /// Clears the flag of a control the user has just edited.
    pub fn field_edited(&mut self, field: FormField) {
        match field {
            FormField::Shape => self.shape_invalid = false,
            FormField::Scale => self.scale_invalid = false,
        }
    }

    pub fn submit(&mut self) -> Result<SpawnRequest, IntakeError> {
        self.shape_invalid = false;
        self.scale_invalid = false;
        let result = self.validate();
        if let Err(err) = &result {
            match err.field() {
                FormField::Shape => self.shape_invalid = true,
                FormField::Scale => self.scale_invalid = true,
            }
        }
        result
    }

    fn validate(&self) -> Result<SpawnRequest, IntakeError> {
        let shape = match self.selection {
            ShapeSelection::Placeholder => return Err(IntakeError::NoShapeSelected),
            ShapeSelection::Shape(kind) => kind,
        };
        let raw = self.scale_text.trim();
        if raw.is_empty() {
            return Err(IntakeError::EmptyScale);
        }
        let scale: f32 = raw.parse().map_err(|_| IntakeError::InvalidScale { raw: raw.to_string() })?;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(IntakeError::NonPositiveScale { value: scale });
        }
        Ok(SpawnRequest { shape, scale })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(selection: ShapeSelection, scale: &str) -> SpawnForm {
        let mut form = SpawnForm::new(scale);
        form.select(selection);
        form
    }

    #[test]
    fn placeholder_flags_only_shape() {
        let mut form = form(ShapeSelection::Placeholder, "1");
        assert_eq!(form.submit(), Err(IntakeError::NoShapeSelected));
        assert!(form.shape_invalid());
        assert!(!form.scale_invalid());
    }

    #[test]
    fn placeholder_wins_over_empty_scale() {
        let mut form = form(ShapeSelection::Placeholder, "");
        assert_eq!(form.submit(), Err(IntakeError::NoShapeSelected));
        assert!(form.shape_invalid());
        assert!(!form.scale_invalid());
    }

    #[test]
    fn blank_scale_flags_only_scale() {
        let mut form = form(ShapeSelection::Shape(ShapeKind::Sphere), "   ");
        assert_eq!(form.submit(), Err(IntakeError::EmptyScale));
        assert!(form.scale_invalid());
        assert!(!form.shape_invalid());
    }

    #[test]
    fn rejects_text_and_non_positive_scales() {
        let mut text = form(ShapeSelection::Shape(ShapeKind::Box), "big");
        assert_eq!(text.submit(), Err(IntakeError::InvalidScale { raw: "big".into() }));

        for raw in ["0", "-2", "inf", "NaN"] {
            let mut form = form(ShapeSelection::Shape(ShapeKind::Box), raw);
            let err = form.submit().unwrap_err();
            assert!(matches!(err, IntakeError::NonPositiveScale { .. }), "{raw}: {err:?}");
            assert!(form.scale_invalid());
        }
    }

    #[test]
    fn valid_submit_clears_previous_flags() {
        let mut form = form(ShapeSelection::Placeholder, "2");
        assert!(form.submit().is_err());
        form.select(ShapeSelection::Shape(ShapeKind::Torus));
        assert!(!form.shape_invalid());
        let request = form.submit().expect("valid form");
        assert_eq!(request, SpawnRequest { shape: ShapeKind::Torus, scale: 2.0 });
        assert!(!form.shape_invalid() && !form.scale_invalid());
    }

    #[test]
    fn editing_a_field_clears_its_flag() {
        let mut form = form(ShapeSelection::Shape(ShapeKind::Ring), "");
        assert!(form.submit().is_err());
        form.set_scale_text("0.5");
        assert!(!form.scale_invalid());
        assert_eq!(form.submit().map(|r| r.scale), Ok(0.5));
    }

    #[test]
    fn scale_text_is_trimmed() {
        let mut form = form(ShapeSelection::Shape(ShapeKind::Cone), " 3.5 ");
        assert_eq!(form.submit().map(|r| r.scale), Ok(3.5));
    }
}
