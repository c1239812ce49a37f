//! Declarative field rules per record kind.

use crate::model::record::RecordKind;

/// Default applied to an absent `status`.
pub const DEFAULT_STATUS: &str = "PENDING";
/// Minimum `title` length in characters.
pub const MIN_TITLE_CHARS: usize = 2;

/// Declared runtime type of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    String,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::String => "string",
        }
    }
}

/// Rule set for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
    pub nullable: bool,
    /// Minimum character count, string fields only.
    pub min_chars: Option<usize>,
    /// Substituted when the key is absent. Never applied to explicit values.
    pub default: Option<&'static str>,
}

impl FieldSpec {
    const fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: false,
            nullable: false,
            min_chars: None,
            default: None,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub const fn string(name: &'static str) -> Self {
        Self::new(name, FieldType::String)
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    pub const fn min_chars(self, min: usize) -> Self {
        Self {
            min_chars: Some(min),
            ..self
        }
    }

    pub const fn default_value(self, value: &'static str) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }
}

const ID: FieldSpec = FieldSpec::integer("id");
const TITLE: FieldSpec = FieldSpec::string("title")
    .required()
    .min_chars(MIN_TITLE_CHARS);
const DESCRIPTION: FieldSpec = FieldSpec::string("description").nullable();
const STATUS: FieldSpec = FieldSpec::string("status").default_value(DEFAULT_STATUS);
const DUE_DATE: FieldSpec = FieldSpec::string("due_date").nullable();

const TASK_FIELDS: &[FieldSpec] = &[
    ID,
    FieldSpec::integer("user_id").nullable(),
    FieldSpec::integer("team_id").nullable(),
    TITLE,
    DESCRIPTION,
    STATUS,
    DUE_DATE,
];

const SUB_TASK_FIELDS: &[FieldSpec] = &[
    ID,
    FieldSpec::integer("task_id").required(),
    TITLE,
    DESCRIPTION,
    STATUS,
    DUE_DATE,
];

const TODO_FIELDS: &[FieldSpec] = &[
    ID,
    FieldSpec::integer("user_id").nullable(),
    FieldSpec::integer("team_id").nullable(),
    TITLE,
    DESCRIPTION,
    STATUS,
    DUE_DATE,
];

/// Returns the ordered field rules for `kind`.
pub fn fields_for(kind: RecordKind) -> &'static [FieldSpec] {
    match kind {
        RecordKind::Task => TASK_FIELDS,
        RecordKind::SubTask => SUB_TASK_FIELDS,
        RecordKind::Todo => TODO_FIELDS,
    }
}

#[cfg(test)]
mod tests {
    use super::{fields_for, FieldType, DEFAULT_STATUS};
    use crate::model::record::RecordKind;

    #[test]
    fn every_kind_requires_title_and_defaults_status() {
        for kind in RecordKind::ALL {
            let fields = fields_for(kind);
            let title = fields
                .iter()
                .find(|spec| spec.name == "title")
                .expect("title rule");
            assert!(title.required);
            assert_eq!(title.min_chars, Some(2));

            let status = fields
                .iter()
                .find(|spec| spec.name == "status")
                .expect("status rule");
            assert!(!status.required);
            assert!(!status.nullable);
            assert_eq!(status.default, Some(DEFAULT_STATUS));
        }
    }

    #[test]
    fn sub_task_parent_is_required_and_not_nullable() {
        let task_id = fields_for(RecordKind::SubTask)
            .iter()
            .find(|spec| spec.name == "task_id")
            .expect("task_id rule");
        assert_eq!(task_id.ty, FieldType::Integer);
        assert!(task_id.required);
        assert!(!task_id.nullable);
    }

    #[test]
    fn field_names_are_unique_per_kind() {
        for kind in RecordKind::ALL {
            let fields = fields_for(kind);
            for (index, spec) in fields.iter().enumerate() {
                assert!(
                    fields[index + 1..].iter().all(|other| other.name != spec.name),
                    "duplicate field `{}` for {kind}",
                    spec.name
                );
            }
        }
    }
}
