/// The SSA type lattice consumed by the engine.
///
/// `Int`/`Uint` are fixed at 64 bits — see `WIDTH` — and are lifted to
/// mathematical integers with explicit range axioms rather than modeled
/// with sound bit-width overflow (Non-goal).
use std::fmt;

/// Fixed width for `Int`/`Uint`, per the data model.
pub const WIDTH: u32 = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    Int,
    Uint,
    Bool,
    Float64,
    Complex128,
    String,
    Pointer(Box<Ty>),
    Slice(Box<Ty>),
    Struct(Vec<(String, Ty)>),
    Named(String, Box<Ty>),
}

impl Ty {
    /// The underlying structural type, unwrapping `Named`.
    pub fn underlying(&self) -> &Ty {
        match self {
            Ty::Named(_, inner) => inner.underlying(),
            other => other,
        }
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.underlying(), Ty::Struct(_))
    }

    pub fn as_pointer_elem(&self) -> Option<&Ty> {
        match self {
            Ty::Pointer(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_slice_elem(&self) -> Option<&Ty> {
        match self {
            Ty::Slice(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_struct_fields(&self) -> Option<&[(String, Ty)]> {
        match self.underlying() {
            Ty::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Stable key used to key per-type heap arrays — interned by structure
    /// for anonymous structs, by declared name for `Named` types (named
    /// structs take precedence so structurally-equal-but-nominally-distinct
    /// types don't collide, per the re-architecture notes).
    pub fn heap_key(&self) -> String {
        match self {
            Ty::Named(name, _) => name.clone(),
            other => format!("{other}"),
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Int => write!(f, "int"),
            Ty::Uint => write!(f, "uint"),
            Ty::Bool => write!(f, "bool"),
            Ty::Float64 => write!(f, "float64"),
            Ty::Complex128 => write!(f, "complex128"),
            Ty::String => write!(f, "string"),
            Ty::Pointer(t) => write!(f, "*{t}"),
            Ty::Slice(t) => write!(f, "[]{t}"),
            Ty::Struct(fields) => {
                write!(f, "struct{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{name}:{ty}")?;
                }
                write!(f, "}}")
            }
            Ty::Named(name, _) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_go_style_printable_form() {
        assert_eq!(Ty::Pointer(Box::new(Ty::Int)).to_string(), "*int");
        assert_eq!(Ty::Slice(Box::new(Ty::Int)).to_string(), "[]int");
    }

    #[test]
    fn named_struct_heap_key_uses_declared_name_not_structure() {
        let underlying = Ty::Struct(vec![("Age".into(), Ty::Int)]);
        let named = Ty::Named("Person".into(), Box::new(underlying.clone()));
        assert_eq!(named.heap_key(), "Person");
        assert_ne!(named.heap_key(), underlying.heap_key());
    }
}
