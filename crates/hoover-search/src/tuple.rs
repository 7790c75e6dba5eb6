/// Renders a multi-valued attribute (MVA) literal for inline interpolation
/// into a Manticore `INSERT` statement.
///
/// Manticore's MySQL-protocol client does not support binding MVA columns
/// as parameters, so these values must be rendered directly into the SQL
/// text. Taking `&[u64]` rather than `&str` makes it a compile error to
/// route an untrusted string through this path -- the only values that can
/// ever reach here are interned term IDs, never raw text.
pub fn repr_manticore_tuple(values: &[u64]) -> String {
    let mut out = String::with_capacity(values.len() * 8 + 2);
    out.push('(');
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&v.to_string());
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tuple() {
        assert_eq!(repr_manticore_tuple(&[]), "()");
    }

    #[test]
    fn single_value() {
        assert_eq!(repr_manticore_tuple(&[42]), "(42)");
    }

    #[test]
    fn multiple_values_comma_joined() {
        assert_eq!(repr_manticore_tuple(&[1, 2, 3]), "(1,2,3)");
    }
}
