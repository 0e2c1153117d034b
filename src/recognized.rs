/// A value that was either recognized as a known variant `T`, or is an
/// unrecognized raw value `Raw`.
///
/// Table kinds in a dump are open-ended: a newer game build can introduce a
/// movement handler we have no typed representation for. The raw value is
/// kept so callers can log it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognized<T, Raw = String> {
    Known(T),
    Unknown(Raw),
}
