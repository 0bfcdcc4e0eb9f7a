#![forbid(unsafe_code)]

use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layout {
    RowMajor,
    ColMajor,
}

impl Layout {
    /// CBLAS enumeration value.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::RowMajor => 101,
            Self::ColMajor => 102,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transpose {
    No,
    Yes,
    Conjugate,
}

impl Transpose {
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::No => 111,
            Self::Yes => 112,
            Self::Conjugate => 113,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Triangle {
    Upper,
    Lower,
}

impl Triangle {
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Upper => 121,
            Self::Lower => 122,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Left => 141,
            Self::Right => 142,
        }
    }
}

/// Shape parameters of a single sub-case.
///
/// Produced by the parameter-grid generator and treated as read-only by the harness; failure
/// records keep their own copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arguments {
    pub m: usize,
    pub n: usize,
    pub k: usize,
    pub layout: Layout,
    pub a_transpose: Transpose,
    pub b_transpose: Transpose,
    pub side: Side,
    pub triangle: Triangle,
    pub x_inc: usize,
    pub y_inc: usize,
    pub x_offset: usize,
    pub y_offset: usize,
    pub a_ld: usize,
    pub b_ld: usize,
    pub c_ld: usize,
    pub a_offset: usize,
    pub b_offset: usize,
    pub c_offset: usize,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            m: 0,
            n: 0,
            k: 0,
            layout: Layout::RowMajor,
            a_transpose: Transpose::No,
            b_transpose: Transpose::No,
            side: Side::Left,
            triangle: Triangle::Upper,
            x_inc: 1,
            y_inc: 1,
            x_offset: 0,
            y_offset: 0,
            a_ld: 0,
            b_ld: 0,
            c_ld: 0,
            a_offset: 0,
            b_offset: 0,
            c_offset: 0,
        }
    }
}

impl Arguments {
    /// Value of a single field as printed in failure details. Enumerations print their CBLAS code.
    #[must_use]
    pub fn field_value(&self, field: ArgField) -> i64 {
        let as_i64 = |value: usize| i64::try_from(value).unwrap_or(i64::MAX);
        match field {
            ArgField::M => as_i64(self.m),
            ArgField::N => as_i64(self.n),
            ArgField::K => as_i64(self.k),
            ArgField::Layout => i64::from(self.layout.code()),
            ArgField::ATranspose => i64::from(self.a_transpose.code()),
            ArgField::BTranspose => i64::from(self.b_transpose.code()),
            ArgField::Side => i64::from(self.side.code()),
            ArgField::Triangle => i64::from(self.triangle.code()),
            ArgField::XInc => as_i64(self.x_inc),
            ArgField::YInc => as_i64(self.y_inc),
            ArgField::XOffset => as_i64(self.x_offset),
            ArgField::YOffset => as_i64(self.y_offset),
            ArgField::ALeadDim => as_i64(self.a_ld),
            ArgField::BLeadDim => as_i64(self.b_ld),
            ArgField::CLeadDim => as_i64(self.c_ld),
            ArgField::AOffset => as_i64(self.a_offset),
            ArgField::BOffset => as_i64(self.b_offset),
            ArgField::COffset => as_i64(self.c_offset),
        }
    }

    /// `name=value` token for one field.
    #[must_use]
    pub fn render(&self, field: ArgField) -> String {
        format!("{}={}", field.name(), self.field_value(field))
    }
}

/// Printable fields of [`Arguments`]. Declaration order is the order fields are printed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArgField {
    M,
    N,
    K,
    Layout,
    ATranspose,
    BTranspose,
    Side,
    Triangle,
    XInc,
    YInc,
    XOffset,
    YOffset,
    ALeadDim,
    BLeadDim,
    CLeadDim,
    AOffset,
    BOffset,
    COffset,
}

impl ArgField {
    pub const ALL: [Self; 18] = [
        Self::M,
        Self::N,
        Self::K,
        Self::Layout,
        Self::ATranspose,
        Self::BTranspose,
        Self::Side,
        Self::Triangle,
        Self::XInc,
        Self::YInc,
        Self::XOffset,
        Self::YOffset,
        Self::ALeadDim,
        Self::BLeadDim,
        Self::CLeadDim,
        Self::AOffset,
        Self::BOffset,
        Self::COffset,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::M => "m",
            Self::N => "n",
            Self::K => "k",
            Self::Layout => "layout",
            Self::ATranspose => "transA",
            Self::BTranspose => "transB",
            Self::Side => "side",
            Self::Triangle => "triangle",
            Self::XInc => "incx",
            Self::YInc => "incy",
            Self::XOffset => "offx",
            Self::YOffset => "offy",
            Self::ALeadDim => "lda",
            Self::BLeadDim => "ldb",
            Self::CLeadDim => "ldc",
            Self::AOffset => "offa",
            Self::BOffset => "offb",
            Self::COffset => "offc",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    pub fn parse_list<'a, I>(names: I) -> Result<Vec<Self>, ArgsError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .map(|name| Self::parse(name).ok_or_else(|| ArgsError::UnknownField(name.to_string())))
            .collect()
    }
}

impl fmt::Display for ArgField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgsError {
    UnknownField(String),
}

impl ArgsError {
    #[must_use]
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::UnknownField(_) => "args_unknown_field",
        }
    }
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField(name) => write!(f, "unknown argument field '{name}'"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[cfg(test)]
mod tests {
    use super::{ArgField, Arguments, ArgsError, Layout, Side, Transpose, Triangle};

    #[test]
    fn field_names_resolve_back_to_fields() {
        for field in ArgField::ALL {
            assert_eq!(ArgField::parse(field.name()), Some(field));
        }
        assert_eq!(ArgField::parse("lda"), Some(ArgField::ALeadDim));
        assert_eq!(ArgField::parse("LDA"), None);
    }

    #[test]
    fn all_fields_are_in_print_order() {
        let mut sorted = ArgField::ALL;
        sorted.sort();
        assert_eq!(sorted, ArgField::ALL);
    }

    #[test]
    fn parse_list_rejects_unknown_names() {
        let fields = ArgField::parse_list(["n", "incx", "offx"]).expect("known names");
        assert_eq!(fields, vec![ArgField::N, ArgField::XInc, ArgField::XOffset]);

        let err = ArgField::parse_list(["n", "alpha"]).expect_err("alpha is not a shape field");
        assert_eq!(err, ArgsError::UnknownField("alpha".to_string()));
        assert_eq!(err.reason_code(), "args_unknown_field");
    }

    #[test]
    fn enumerations_render_as_cblas_codes() {
        let args = Arguments {
            m: 7,
            layout: Layout::ColMajor,
            a_transpose: Transpose::Conjugate,
            side: Side::Right,
            triangle: Triangle::Lower,
            ..Arguments::default()
        };
        assert_eq!(args.render(ArgField::M), "m=7");
        assert_eq!(args.render(ArgField::Layout), "layout=102");
        assert_eq!(args.render(ArgField::ATranspose), "transA=113");
        assert_eq!(args.render(ArgField::BTranspose), "transB=111");
        assert_eq!(args.render(ArgField::Side), "side=142");
        assert_eq!(args.render(ArgField::Triangle), "triangle=122");
        assert_eq!(args.render(ArgField::XInc), "incx=1");
    }

    #[test]
    fn arguments_serialize_with_field_names() {
        let args = Arguments {
            n: 4,
            a_ld: 8,
            ..Arguments::default()
        };
        let value = serde_json::to_value(args).expect("serialize");
        assert_eq!(value["n"], 4);
        assert_eq!(value["a_ld"], 8);
        assert_eq!(value["layout"], "RowMajor");
    }
}
