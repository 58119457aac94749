/// Compute effective limit with precedence: local arg -> global flag -> fallback.
#[must_use]
pub fn effective_limit(local: Option<u32>, global: Option<u32>, fallback: u32) -> u32 {
    local.or(global).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::effective_limit;

    #[rstest]
    #[case(Some(5), Some(10), 5)]
    #[case(None, Some(10), 10)]
    #[case(None, None, 20)]
    fn precedence(#[case] local: Option<u32>, #[case] global: Option<u32>, #[case] expected: u32) {
        assert_eq!(effective_limit(local, global, 20), expected);
    }
}
